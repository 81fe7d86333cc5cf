use std::fmt;

use serde::{Deserialize, Serialize};

/// A dotted field path such as `child.name`.
///
/// Paths are opaque at parse time. Nothing here checks that a segment names a
/// real field; that only happens when the path is resolved against a model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub const SEPARATOR: char = '.';

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into segments. An empty path has zero segments.
    pub fn segments(&self) -> Vec<&str> {
        if self.0.is_empty() {
            return Vec::new();
        }
        self.0.split(Self::SEPARATOR).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
