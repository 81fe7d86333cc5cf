use std::collections::BTreeSet;
use std::sync::Arc;

use convert_case::{Case, Casing};
use serde::Serialize;
use strata_query::{
    Expression, FieldPath, FieldSelection, Filtering, Searching, SortDirection, Sorting,
};

use crate::Model;
use crate::classify::is_model;
use crate::description::{FieldDescription, FieldType, ModelDescription, ScalarKind};
use crate::error::{ResolveError, Traversal};
use crate::registry::Registry;

/// A field path mapped onto storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
    /// Qualified column: `table.column` on the root model, `alias.column`
    /// through an association.
    pub column: String,
    /// Declared name of the traversed association, if any.
    pub association: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSort {
    pub column: String,
    pub direction: SortDirection,
}

/// A resolved operation plus the associations it needs joined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution<T> {
    pub value: T,
    pub joins: BTreeSet<String>,
}

impl<T> Resolution<T> {
    fn new(value: T, joins: BTreeSet<String>) -> Self {
        Self { value, joins }
    }
}

/// Resolves field paths against one root model.
pub struct Resolver<'r> {
    registry: &'r Registry,
    root: Arc<ModelDescription>,
}

impl<'r> Resolver<'r> {
    pub fn new<M: Model>(registry: &'r Registry) -> Self {
        Self {
            registry,
            root: registry.describe::<M>(),
        }
    }

    pub fn root(&self) -> &ModelDescription {
        &self.root
    }

    /// Resolve a dotted path to its qualified column.
    ///
    /// The root's columns are qualified by its table. One association hop
    /// is allowed, and columns reached through it are qualified by the
    /// association's field name (`child.name`), not the associated table.
    pub fn field_path(&self, path: &str) -> Result<ResolvedField, ResolveError> {
        let path = FieldPath::from(path);
        let segments = path.segments();

        match segments.as_slice() {
            [] => Err(ResolveError::EmptyPath),
            [name] => {
                let field = find(&self.root, name)?;
                terminal(&self.root, field)?;
                Ok(ResolvedField {
                    column: format!("{}.{}", self.root.table, field.column),
                    association: None,
                })
            }
            [assoc, name] => {
                let hop = find(&self.root, assoc)?;
                let target = self.descend(hop)?;
                let field = find(&target, name)?;
                terminal(&target, field)?;
                Ok(ResolvedField {
                    column: format!("{}.{}", alias(hop), field.column),
                    association: Some(hop.name.clone()),
                })
            }
            _ => Err(ResolveError::UnsupportedDepth(segments.len())),
        }
    }

    pub fn sorting(&self, sorting: &Sorting) -> Result<Resolution<Vec<ResolvedSort>>, ResolveError> {
        let mut joins = BTreeSet::new();
        let mut out = Vec::with_capacity(sorting.criteria.len());
        for sort in &sorting.criteria {
            let resolved = self.field_path(sort.field.as_str())?;
            joins.extend(resolved.association);
            out.push(ResolvedSort {
                column: resolved.column,
                direction: sort.direction,
            });
        }
        Ok(Resolution::new(out, joins))
    }

    /// Projected columns. Selecting everything yields every scalar column of
    /// the root; selecting an association yields all of its scalar columns.
    pub fn field_selection(
        &self,
        selection: &FieldSelection,
    ) -> Result<Resolution<Vec<String>>, ResolveError> {
        if selection.is_all() {
            return Ok(Resolution::new(
                self.root_columns(|_| true),
                BTreeSet::new(),
            ));
        }

        let mut joins = BTreeSet::new();
        let mut columns = Vec::new();
        for path in &selection.fields {
            for resolved in self.expand(path)? {
                joins.extend(resolved.association);
                push_unique(&mut columns, resolved.column);
            }
        }
        Ok(Resolution::new(columns, joins))
    }

    /// The filter tree with every field path replaced by its column.
    pub fn filtering(
        &self,
        filtering: &Filtering,
    ) -> Result<Resolution<Expression<String>>, ResolveError> {
        let mut joins = BTreeSet::new();
        let root = filtering.root.try_map_fields(&mut |path: &FieldPath| {
            let resolved = self.field_path(path.as_str())?;
            joins.extend(resolved.association);
            Ok::<_, ResolveError>(resolved.column)
        })?;
        Ok(Resolution::new(root, joins))
    }

    /// Columns to search. Without a restriction, every string column of the
    /// root takes part.
    pub fn searching(&self, searching: &Searching) -> Result<Resolution<Vec<String>>, ResolveError> {
        match &searching.fields {
            Some(fields) if !fields.is_all() => self.field_selection(fields),
            _ => Ok(Resolution::new(
                self.root_columns(|ty| *ty == FieldType::Scalar(ScalarKind::String)),
                BTreeSet::new(),
            )),
        }
    }

    fn descend(&self, hop: &FieldDescription) -> Result<Arc<ModelDescription>, ResolveError> {
        match hop.ty.model_ref() {
            Some(model) => Ok(self.registry.describe_ref(model)),
            _ => Err(ResolveError::InvalidTraversal {
                field: hop.name.clone(),
                model: self.root.name.clone(),
                reason: Traversal::NotAssociation,
            }),
        }
    }

    fn expand(&self, path: &FieldPath) -> Result<Vec<ResolvedField>, ResolveError> {
        if let [segment] = path.segments().as_slice() {
            let field = find(&self.root, segment)?;
            if is_model(&field.ty) {
                let target = self.descend(field)?;
                return Ok(target
                    .fields
                    .iter()
                    .filter(|f| !is_model(&f.ty))
                    .map(|f| ResolvedField {
                        column: format!("{}.{}", alias(field), f.column),
                        association: Some(field.name.clone()),
                    })
                    .collect());
            }
        }
        Ok(vec![self.field_path(path.as_str())?])
    }

    fn root_columns(&self, keep: impl Fn(&FieldType) -> bool) -> Vec<String> {
        self.root
            .fields
            .iter()
            .filter(|f| !is_model(&f.ty) && keep(f.ty.base()))
            .map(|f| format!("{}.{}", self.root.table, f.column))
            .collect()
    }
}

/// Resolve `path` against `M` using the process-wide registry.
pub fn resolve_field_path<M: Model>(path: &str) -> Result<ResolvedField, ResolveError> {
    Resolver::new::<M>(Registry::global()).field_path(path)
}

fn find<'a>(model: &'a ModelDescription, segment: &str) -> Result<&'a FieldDescription, ResolveError> {
    model.lookup(segment).ok_or_else(|| ResolveError::FieldNotFound {
        field: segment.to_string(),
        model: model.name.clone(),
    })
}

fn terminal(model: &ModelDescription, field: &FieldDescription) -> Result<(), ResolveError> {
    if is_model(&field.ty) {
        return Err(ResolveError::InvalidTraversal {
            field: field.name.clone(),
            model: model.name.clone(),
            reason: Traversal::EndsOnAssociation,
        });
    }
    Ok(())
}

fn alias(association: &FieldDescription) -> String {
    association.name.to_case(Case::Snake)
}

fn push_unique(columns: &mut Vec<String>, column: String) {
    if !columns.contains(&column) {
        columns.push(column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owner;
    struct Pet;

    impl Model for Owner {
        fn describe() -> ModelDescription {
            ModelDescription::new("Owner")
                .field("Name", FieldType::of::<String>())
                .field("BestFriend", FieldType::model::<Pet>())
        }
    }

    impl Model for Pet {
        fn describe() -> ModelDescription {
            ModelDescription::new("Pet").field("Name", FieldType::of::<String>())
        }
    }

    #[test]
    fn alias_is_snake_case_of_association_field() {
        let registry = Registry::new();
        let resolver = Resolver::new::<Owner>(&registry);
        let resolved = resolver.field_path("best_friend.name").unwrap();
        assert_eq!(resolved.column, "best_friend.name");
        assert_eq!(resolved.association.as_deref(), Some("BestFriend"));
    }

    #[test]
    fn association_described_lazily() {
        let registry = Registry::new();
        let resolver = Resolver::new::<Owner>(&registry);
        assert_eq!(registry.len(), 1);
        resolver.field_path("best_friend.name").unwrap();
        assert_eq!(registry.len(), 2);
    }
}
