use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: FieldPath,
    pub direction: SortDirection,
}

/// Ordered sort criteria. The first entry is the primary sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorting {
    pub criteria: Vec<Sort>,
}

impl fmt::Display for Sorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sort) in self.criteria.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if sort.direction == SortDirection::Desc {
                f.write_str("-")?;
            }
            write!(f, "{}", sort.field)?;
        }
        Ok(())
    }
}

/// Parse error for sort expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct SortParseError(pub String);

impl fmt::Display for SortParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sort parse error: {}", self.0)
    }
}

impl std::error::Error for SortParseError {}

/// Parse a sort expression like `name,-age` or `name asc,age desc`.
///
/// Returns `Ok(None)` for blank input. Tokens are separated by `,`; a token
/// is either `field`, `-field`, or `field asc|desc`.
pub fn parse_sorting(input: &str) -> Result<Option<Sorting>, SortParseError> {
    if input.trim().is_empty() {
        return Ok(None);
    }

    let mut criteria = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(SortParseError("empty sort field".into()));
        }
        let sort = parse_token(token)?;
        if !seen.insert(sort.field.clone()) {
            return Err(SortParseError(format!("duplicate sort field: {}", sort.field)));
        }
        criteria.push(sort);
    }

    Ok(Some(Sorting { criteria }))
}

fn parse_token(token: &str) -> Result<Sort, SortParseError> {
    let mut words = token.split_whitespace();
    let first = words
        .next()
        .ok_or_else(|| SortParseError("empty sort field".into()))?;
    let keyword = words.next();
    if words.next().is_some() {
        return Err(SortParseError(format!("malformed sort field: {token}")));
    }

    let (name, prefixed) = match first.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (first, false),
    };
    if name.is_empty() {
        return Err(SortParseError(format!("missing field name in: {token}")));
    }

    let direction = match keyword {
        None if prefixed => SortDirection::Desc,
        None => SortDirection::Asc,
        Some(_) if prefixed => {
            return Err(SortParseError(format!("conflicting sort direction in: {token}")));
        }
        Some(kw) if kw.eq_ignore_ascii_case("asc") => SortDirection::Asc,
        Some(kw) if kw.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        Some(kw) => return Err(SortParseError(format!("unknown sort direction: {kw}"))),
    };

    Ok(Sort {
        field: FieldPath::from(name),
        direction,
    })
}
