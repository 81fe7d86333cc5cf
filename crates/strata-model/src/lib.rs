mod classify;
mod description;
mod error;
mod registry;
mod resolve;

pub use classify::{FieldTyped, is_model};
pub use description::{FieldDescription, FieldType, ModelDescription, ModelRef, ScalarKind, ValueKind};
pub use error::{ResolveError, Traversal};
pub use registry::Registry;
pub use resolve::{Resolution, ResolvedField, ResolvedSort, Resolver, resolve_field_path};

/// A storage-backed entity with a statically declared field table.
pub trait Model: 'static {
    fn describe() -> ModelDescription;
}
