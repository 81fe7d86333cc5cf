use std::fmt;
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when no limit (or a zero limit) is given.
    pub default_limit: u32,
    /// Larger limits are clamped to this value.
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 1000,
            max_limit: 5000,
        }
    }
}

/// Decoded page token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageToken {
    /// Start token-based pagination from the first page.
    First,
    /// Resume from an opaque position issued by the backend.
    Resume(String),
}

/// Decodes the raw `_page_token` value. Injected so backends can use their
/// own token format.
pub trait PageTokenDecoder: Send + Sync {
    fn decode(&self, raw: &str) -> Result<PageToken, PaginationError>;
}

/// Accepts any printable token verbatim; `null` requests the first page.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueTokenDecoder;

impl PageTokenDecoder for OpaqueTokenDecoder {
    fn decode(&self, raw: &str) -> Result<PageToken, PaginationError> {
        if raw == "null" {
            return Ok(PageToken::First);
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(PaginationError::MalformedToken(raw.to_string()));
        }
        Ok(PageToken::Resume(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: Option<u64>,
    pub page_token: Option<PageToken>,
}

/// Which pagination strategy applies. Offset wins when both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode<'a> {
    Offset(u64),
    Token(&'a PageToken),
}

impl Pagination {
    pub fn mode(&self) -> PaginationMode<'_> {
        match (self.offset, &self.page_token) {
            (Some(offset), _) => PaginationMode::Offset(offset),
            (None, Some(token)) => PaginationMode::Token(token),
            (None, None) => PaginationMode::Offset(0),
        }
    }

    /// Whether the caller asked for the first page.
    pub fn is_first_page(&self) -> bool {
        match self.mode() {
            PaginationMode::Offset(offset) => offset == 0,
            PaginationMode::Token(token) => *token == PageToken::First,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaginationError {
    InvalidLimit(String),
    InvalidOffset(String),
    MalformedToken(String),
}

impl fmt::Display for PaginationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationError::InvalidLimit(msg) => write!(f, "pagination: limit - {msg}"),
            PaginationError::InvalidOffset(msg) => write!(f, "pagination: offset - {msg}"),
            PaginationError::MalformedToken(raw) => {
                write!(f, "pagination: page token - malformed token {raw:?}")
            }
        }
    }
}

impl std::error::Error for PaginationError {}

/// Parse the `_limit`, `_offset` and `_page_token` values.
///
/// Blank values are treated as absent; if all three are absent there is no
/// pagination. A missing or zero limit takes `config.default_limit`, and a
/// limit above `config.max_limit` is clamped rather than rejected.
pub fn parse_pagination(
    limit: &str,
    offset: &str,
    page_token: &str,
    config: &PaginationConfig,
    decoder: &dyn PageTokenDecoder,
) -> Result<Option<Pagination>, PaginationError> {
    let (limit, offset, page_token) = (limit.trim(), offset.trim(), page_token.trim());
    if limit.is_empty() && offset.is_empty() && page_token.is_empty() {
        return Ok(None);
    }

    let limit = match parse_non_negative(limit).map_err(PaginationError::InvalidLimit)? {
        None | Some(0) => config.default_limit,
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
    }
    .min(config.max_limit);

    let offset = parse_non_negative(offset).map_err(PaginationError::InvalidOffset)?;

    let page_token = if page_token.is_empty() {
        None
    } else {
        Some(decoder.decode(page_token)?)
    };

    Ok(Some(Pagination {
        limit,
        offset,
        page_token,
    }))
}

/// Parse a non-negative integer. Values too large for `u64` saturate.
fn parse_non_negative(raw: &str) -> Result<Option<u64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Some(rest) = raw.strip_prefix('-') {
        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err("negative value".into());
        }
        return Err(format!("invalid number {raw:?}"));
    }
    match raw.parse::<u64>() {
        Ok(n) => Ok(Some(n)),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(Some(u64::MAX)),
        Err(_) => Err(format!("invalid number {raw:?}")),
    }
}
