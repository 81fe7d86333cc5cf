use std::any::TypeId;
use std::fmt;

use convert_case::{Case, Casing};
use serde::Serialize;

use crate::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Bool,
    Bytes,
}

/// Well-known types that are composite in memory but stored as one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Timestamp,
    Duration,
    Uuid,
    Decimal,
    ObjectId,
}

/// Handle to another model's description, resolved lazily through a
/// [`Registry`](crate::Registry).
#[derive(Clone, Copy)]
pub struct ModelRef {
    type_id: TypeId,
    type_name: &'static str,
    describe: fn() -> ModelDescription,
}

impl ModelRef {
    pub fn of<M: Model>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            type_name: std::any::type_name::<M>(),
            describe: M::describe,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn derive(&self) -> ModelDescription {
        (self.describe)()
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelRef").field(&self.type_name).finish()
    }
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ModelRef {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarKind),
    Value(ValueKind),
    Model(ModelRef),
    /// Nullable or boxed form of the inner type.
    Optional(Box<FieldType>),
    List(Box<FieldType>),
}

impl FieldType {
    pub fn model<M: Model>() -> Self {
        FieldType::Model(ModelRef::of::<M>())
    }

    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    /// The innermost type, with `Optional` and `List` wrappers removed.
    pub fn base(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) | FieldType::List(inner) => inner.base(),
            other => other,
        }
    }

    /// The referenced model, if the base type is one.
    pub fn model_ref(&self) -> Option<&ModelRef> {
        match self.base() {
            FieldType::Model(r) => Some(r),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    /// Declared field name, e.g. `Child`.
    pub name: String,
    /// Storage column: the override if one was declared, otherwise the
    /// snake_case form of `name`.
    pub column: String,
    pub ty: FieldType,
}

/// Static storage metadata for one model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescription {
    pub name: String,
    pub table: String,
    pub fields: Vec<FieldDescription>,
}

impl ModelDescription {
    /// Start a description. The table defaults to the snake_case model name
    /// with an `s` appended (`Human` -> `humans`). No English plural rules are
    /// applied, so `Child` gives `childs`; declare irregular tables with
    /// [`table`](Self::table).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = format!("{}s", name.to_case(Case::Snake));
        Self {
            name,
            table,
            fields: Vec::new(),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
        let name = name.into();
        let column = name.to_case(Case::Snake);
        self.push(name, column, ty)
    }

    /// Declare a field stored under an explicit column name.
    pub fn field_with_column(
        self,
        name: impl Into<String>,
        column: impl Into<String>,
        ty: FieldType,
    ) -> Self {
        self.push(name.into(), column.into(), ty)
    }

    fn push(mut self, name: String, column: String, ty: FieldType) -> Self {
        self.fields.push(FieldDescription { name, column, ty });
        self
    }

    /// Find the field a path segment refers to. Matches the declared name
    /// exactly or the PascalCase form of the segment (`first_name` ->
    /// `FirstName`).
    pub fn lookup(&self, segment: &str) -> Option<&FieldDescription> {
        if segment.is_empty() {
            return None;
        }
        self.fields.iter().find(|f| f.name == segment).or_else(|| {
            let pascal = segment.to_case(Case::Pascal);
            self.fields.iter().find(|f| f.name == pascal)
        })
    }
}
