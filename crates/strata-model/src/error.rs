use std::fmt;

/// Why a segment could not be walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// A non-final segment names a scalar field.
    NotAssociation,
    /// The final segment names an association.
    EndsOnAssociation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    EmptyPath,
    FieldNotFound { field: String, model: String },
    InvalidTraversal {
        field: String,
        model: String,
        reason: Traversal,
    },
    /// Only one association hop is supported. Carries the segment count.
    UnsupportedDepth(usize),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::EmptyPath => write!(f, "empty field path"),
            ResolveError::FieldNotFound { field, model } => {
                write!(f, "field '{field}' not found on {model}")
            }
            ResolveError::InvalidTraversal {
                field,
                model,
                reason: Traversal::NotAssociation,
            } => write!(f, "invalid traversal: '{field}' on {model} is not an association"),
            ResolveError::InvalidTraversal {
                field,
                model,
                reason: Traversal::EndsOnAssociation,
            } => write!(
                f,
                "invalid traversal: '{field}' on {model} is an association, path must end on a scalar"
            ),
            ResolveError::UnsupportedDepth(n) => {
                write!(f, "field path has {n} segments, at most one association hop is supported")
            }
        }
    }
}

impl std::error::Error for ResolveError {}
