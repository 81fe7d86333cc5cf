use serde::{Deserialize, Serialize};

use crate::fields::{FieldSelection, FieldSelectionParseError, parse_field_selection};

/// Full-text search request.
///
/// `query` is passed through verbatim for downstream matching. `fields`
/// restricts which fields take part; `None` means every searchable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Searching {
    pub query: String,
    pub fields: Option<FieldSelection>,
}

/// Parse a search value plus an optional comma-separated field restriction.
///
/// Blank text means no search, regardless of the restriction.
pub fn parse_searching(
    text: &str,
    fields: Option<&str>,
) -> Result<Option<Searching>, FieldSelectionParseError> {
    let query = text.trim();
    if query.is_empty() {
        return Ok(None);
    }

    let fields = match fields {
        Some(raw) => parse_field_selection(raw)?,
        None => None,
    };

    Ok(Some(Searching {
        query: query.to_string(),
        fields,
    }))
}
