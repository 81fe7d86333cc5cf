use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use url::form_urlencoded;

use crate::attach::{Applied, AttachError, CollectionRequest, attach, attach_shared};
use crate::expression::Filtering;
use crate::fields::{FieldSelection, FieldSelectionParseError, parse_field_selection};
use crate::operation::{Operation, OperationKind};
use crate::pagination::{
    PageTokenDecoder, Pagination, PaginationConfig, PaginationError, parse_pagination,
};
use crate::parse_filter::{FilterParseError, parse_filtering};
use crate::search::{Searching, parse_searching};
use crate::sort::{SortParseError, Sorting, parse_sorting};

pub const SORT_KEY: &str = "_order_by";
pub const FIELDS_KEY: &str = "_fields";
pub const FILTER_KEY: &str = "_filter";
pub const SEARCH_KEY: &str = "_fts";
pub const SEARCH_FIELDS_KEY: &str = "_fts_fields";
pub const LIMIT_KEY: &str = "_limit";
pub const OFFSET_KEY: &str = "_offset";
pub const PAGE_TOKEN_KEY: &str = "_page_token";

/// A syntax error in one collection operator.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    Sorting(SortParseError),
    FieldSelection(FieldSelectionParseError),
    Filtering(FilterParseError),
    Searching(FieldSelectionParseError),
    Pagination(PaginationError),
}

impl QueryError {
    pub fn kind(&self) -> OperationKind {
        match self {
            QueryError::Sorting(_) => OperationKind::Sorting,
            QueryError::FieldSelection(_) => OperationKind::FieldSelection,
            QueryError::Filtering(_) => OperationKind::Filtering,
            QueryError::Searching(_) => OperationKind::Searching,
            QueryError::Pagination(_) => OperationKind::Pagination,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Sorting(e) => write!(f, "{e}"),
            QueryError::FieldSelection(e) => write!(f, "{e}"),
            QueryError::Filtering(e) => write!(f, "{e}"),
            QueryError::Searching(e) => write!(f, "search fields: {e}"),
            QueryError::Pagination(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Every collection operation found in one query string, at most one of
/// each kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionOperations {
    pub sorting: Option<Sorting>,
    pub field_selection: Option<FieldSelection>,
    pub filtering: Option<Filtering>,
    pub searching: Option<Searching>,
    pub pagination: Option<Pagination>,
}

impl CollectionOperations {
    pub fn is_empty(&self) -> bool {
        self.sorting.is_none()
            && self.field_selection.is_none()
            && self.filtering.is_none()
            && self.searching.is_none()
            && self.pagination.is_none()
    }

    pub fn into_operations(self) -> Vec<Operation> {
        let mut ops = Vec::new();
        ops.extend(self.sorting.map(Operation::Sorting));
        ops.extend(self.field_selection.map(Operation::FieldSelection));
        ops.extend(self.filtering.map(Operation::Filtering));
        ops.extend(self.searching.map(Operation::Searching));
        ops.extend(self.pagination.map(Operation::Pagination));
        ops
    }

    /// Attach every operation to `request`, each independently.
    pub fn attach_to<R: CollectionRequest + ?Sized>(
        self,
        request: &mut R,
    ) -> Vec<(OperationKind, Applied)> {
        self.into_operations()
            .into_iter()
            .map(|op| (op.kind(), attach(request, op)))
            .collect()
    }

    /// Like [`attach_to`](Self::attach_to), through a shared handle.
    pub fn attach_to_shared<R: CollectionRequest>(
        self,
        request: &mut Arc<R>,
    ) -> Result<Vec<(OperationKind, Applied)>, AttachError> {
        self.into_operations()
            .into_iter()
            .map(|op| {
                let kind = op.kind();
                attach_shared(request, op).map(|applied| (kind, applied))
            })
            .collect()
    }
}

/// Result of parsing a query string. Operators are parsed independently, so
/// a bad `_filter` does not stop `_order_by` from being parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    pub operations: CollectionOperations,
    pub errors: Vec<QueryError>,
}

impl ParsedQuery {
    /// Fail on the first syntax error, if any.
    pub fn into_result(self) -> Result<CollectionOperations, QueryError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.operations),
        }
    }
}

/// Extract collection operators from a raw URL query string
/// (`_order_by=name&_limit=10`). A leading `?` is allowed; unknown keys are
/// ignored and the first occurrence of a repeated key wins.
pub fn parse_query(
    query: &str,
    config: &PaginationConfig,
    decoder: &dyn PageTokenDecoder,
) -> ParsedQuery {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut values: HashMap<String, String> = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        values.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    let get = |key: &str| values.get(key).map(String::as_str).unwrap_or("");

    let mut parsed = ParsedQuery::default();
    let ops = &mut parsed.operations;
    let errors = &mut parsed.errors;

    match parse_sorting(get(SORT_KEY)) {
        Ok(v) => ops.sorting = v,
        Err(e) => errors.push(QueryError::Sorting(e)),
    }
    match parse_field_selection(get(FIELDS_KEY)) {
        Ok(v) => ops.field_selection = v,
        Err(e) => errors.push(QueryError::FieldSelection(e)),
    }
    match parse_filtering(get(FILTER_KEY)) {
        Ok(v) => ops.filtering = v,
        Err(e) => errors.push(QueryError::Filtering(e)),
    }
    let search_fields = values.get(SEARCH_FIELDS_KEY).map(String::as_str);
    match parse_searching(get(SEARCH_KEY), search_fields) {
        Ok(v) => ops.searching = v,
        Err(e) => errors.push(QueryError::Searching(e)),
    }
    match parse_pagination(
        get(LIMIT_KEY),
        get(OFFSET_KEY),
        get(PAGE_TOKEN_KEY),
        config,
        decoder,
    ) {
        Ok(v) => ops.pagination = v,
        Err(e) => errors.push(QueryError::Pagination(e)),
    }

    parsed
}
