use std::fmt;

use http::StatusCode;
use serde::Serialize;
use strata_query::{AttachError, QueryError};

/// Call outcome classification returned to the HTTP caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    InvalidArgument,
    NotFound,
    Internal,
    Unimplemented,
    Unavailable,
}

impl Code {
    pub fn as_str(self) -> &'static str {
        match self {
            Code::InvalidArgument => "invalid_argument",
            Code::NotFound => "not_found",
            Code::Internal => "internal",
            Code::Unimplemented => "unimplemented",
            Code::Unavailable => "unavailable",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(Code::Unimplemented, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Code::Unavailable, message)
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl From<QueryError> for Status {
    fn from(e: QueryError) -> Self {
        Status::invalid_argument(e.to_string())
    }
}

impl From<AttachError> for Status {
    fn from(e: AttachError) -> Self {
        Status::internal(e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid value for {key}: {value:?}")]
    Config { key: &'static str, value: String },

    #[error("registering {prefix}: {source}")]
    Register {
        prefix: String,
        #[source]
        source: Status,
    },

    #[error("duplicate route {method} {path}")]
    DuplicateRoute { method: http::Method, path: String },
}
