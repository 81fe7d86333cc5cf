pub use bson::Bson;

mod attach;
mod expression;
mod fields;
mod operation;
mod operator;
mod params;
mod parse_filter;
mod pagination;
mod path;
mod search;
mod sort;

pub use attach::{
    Applied, AttachError, CollectionRequest, ReceiveFieldSelection, ReceiveFiltering,
    ReceivePagination, ReceiveSearching, ReceiveSorting, attach, attach_shared,
};
pub use expression::{Condition, Expression, Filtering};
pub use fields::{FieldSelection, FieldSelectionParseError, FieldTree, parse_field_selection};
pub use operation::{Operation, OperationKind};
pub use operator::Operator;
pub use params::{
    CollectionOperations, FIELDS_KEY, FILTER_KEY, LIMIT_KEY, OFFSET_KEY, PAGE_TOKEN_KEY, ParsedQuery,
    QueryError, SEARCH_FIELDS_KEY, SEARCH_KEY, SORT_KEY, parse_query,
};
pub use parse_filter::{FilterParseError, parse_filtering};
pub use pagination::{
    OpaqueTokenDecoder, PageToken, PageTokenDecoder, Pagination, PaginationConfig,
    PaginationError, PaginationMode, parse_pagination,
};
pub use path::FieldPath;
pub use search::{Searching, parse_searching};
pub use sort::{Sort, SortDirection, SortParseError, Sorting, parse_sorting};
