use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

/// Set of field paths to include in a response.
///
/// An empty selection means "all fields", which is not the same thing as a
/// selection that happens to list every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    pub fields: BTreeSet<FieldPath>,
}

impl FieldSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_all(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `path` is part of the projection. A selected parent covers
    /// all of its children (`child` covers `child.name`).
    pub fn includes(&self, path: &str) -> bool {
        if self.is_all() {
            return true;
        }
        self.fields.iter().any(|f| {
            let f = f.as_str();
            path == f
                || path
                    .strip_prefix(f)
                    .is_some_and(|rest| rest.starts_with(FieldPath::SEPARATOR))
        })
    }

    /// Nested view of the selected paths.
    pub fn tree(&self) -> HashMap<String, FieldTree> {
        let mut root = HashMap::new();
        for path in &self.fields {
            insert_path(&mut root, path, path.as_str());
        }
        root
    }
}

/// A tree of dotted field paths.
///
/// Given `["foo.bar", "foo.baz", "name"]`, builds:
/// ```text
/// { "foo": Branch({ "bar": Leaf("foo.bar"), "baz": Leaf("foo.baz") }),
///   "name": Leaf("name") }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTree {
    /// Take the whole field. Carries the original full path.
    Leaf(FieldPath),
    /// Recurse into sub-fields.
    Branch(HashMap<String, FieldTree>),
}

fn insert_path(map: &mut HashMap<String, FieldTree>, full_path: &FieldPath, remaining: &str) {
    match remaining.split_once(FieldPath::SEPARATOR) {
        None => {
            // A leaf wins over a branch: "foo" and "foo.bar" selects all of foo.
            map.insert(remaining.to_string(), FieldTree::Leaf(full_path.clone()));
        }
        Some((top, rest)) => {
            let entry = map
                .entry(top.to_string())
                .or_insert_with(|| FieldTree::Branch(HashMap::new()));
            if let FieldTree::Branch(children) = entry {
                insert_path(children, full_path, rest);
            }
        }
    }
}

/// Parse error for field selections.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelectionParseError(pub String);

impl fmt::Display for FieldSelectionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field selection parse error: {}", self.0)
    }
}

impl std::error::Error for FieldSelectionParseError {}

/// Parse a comma-separated list of field paths. Blank input is absent.
pub fn parse_field_selection(
    input: &str,
) -> Result<Option<FieldSelection>, FieldSelectionParseError> {
    if input.trim().is_empty() {
        return Ok(None);
    }

    let mut fields = BTreeSet::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(FieldSelectionParseError("empty field name".into()));
        }
        fields.insert(FieldPath::from(token));
    }

    Ok(Some(FieldSelection { fields }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(input: &str) -> FieldSelection {
        parse_field_selection(input).unwrap().unwrap()
    }

    #[test]
    fn splits_and_trims() {
        let sel = select("name, age ,child.name");
        let fields: Vec<&str> = sel.fields.iter().map(FieldPath::as_str).collect();
        assert_eq!(fields, vec!["age", "child.name", "name"]);
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(select("name,name").fields.len(), 1);
    }

    #[test]
    fn blank_is_absent() {
        assert_eq!(parse_field_selection(" ").unwrap(), None);
    }

    #[test]
    fn empty_token_errors() {
        let err = parse_field_selection("name,").unwrap_err();
        assert!(err.0.contains("empty"), "{}", err.0);
    }

    #[test]
    fn empty_selection_includes_everything() {
        let sel = FieldSelection::all();
        assert!(sel.is_all());
        assert!(sel.includes("anything.at.all"));
    }

    #[test]
    fn parent_covers_children() {
        let sel = select("child");
        assert!(sel.includes("child"));
        assert!(sel.includes("child.name"));
        assert!(!sel.includes("children"));
        assert!(!sel.includes("name"));
    }

    #[test]
    fn tree_groups_nested_paths() {
        let tree = select("name,address.city,address.zip").tree();
        assert_eq!(tree.get("name"), Some(&FieldTree::Leaf("name".into())));
        match tree.get("address") {
            Some(FieldTree::Branch(addr)) => {
                assert_eq!(addr.get("city"), Some(&FieldTree::Leaf("address.city".into())));
                assert_eq!(addr.get("zip"), Some(&FieldTree::Leaf("address.zip".into())));
            }
            other => panic!("expected Branch for address, got {:?}", other),
        }
    }

    #[test]
    fn leaf_overrides_branch() {
        let tree = select("foo.bar,foo").tree();
        assert_eq!(tree.get("foo"), Some(&FieldTree::Leaf("foo".into())));
    }
}
