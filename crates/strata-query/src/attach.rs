use std::fmt;
use std::sync::Arc;

use crate::expression::Filtering;
use crate::fields::FieldSelection;
use crate::operation::{Operation, OperationKind};
use crate::pagination::Pagination;
use crate::search::Searching;
use crate::sort::Sorting;

pub trait ReceiveSorting {
    fn set_sorting(&mut self, sorting: Sorting);
}

pub trait ReceiveFieldSelection {
    fn set_field_selection(&mut self, fields: FieldSelection);
}

pub trait ReceiveFiltering {
    fn set_filtering(&mut self, filtering: Filtering);
}

pub trait ReceiveSearching {
    fn set_searching(&mut self, searching: Searching);
}

pub trait ReceivePagination {
    fn set_pagination(&mut self, pagination: Pagination);
}

/// An outgoing request that may carry collection operations.
///
/// Every accessor defaults to `None`, so a request type only overrides the
/// capabilities it actually has:
///
/// ```ignore
/// impl ReceiveFiltering for ListUsers {
///     fn set_filtering(&mut self, filtering: Filtering) {
///         self.filter = Some(filtering);
///     }
/// }
///
/// impl CollectionRequest for ListUsers {
///     fn filtering(&mut self) -> Option<&mut dyn ReceiveFiltering> {
///         Some(self)
///     }
/// }
/// ```
pub trait CollectionRequest {
    fn sorting(&mut self) -> Option<&mut dyn ReceiveSorting> {
        None
    }

    fn field_selection(&mut self) -> Option<&mut dyn ReceiveFieldSelection> {
        None
    }

    fn filtering(&mut self) -> Option<&mut dyn ReceiveFiltering> {
        None
    }

    fn searching(&mut self) -> Option<&mut dyn ReceiveSearching> {
        None
    }

    fn pagination(&mut self) -> Option<&mut dyn ReceivePagination> {
        None
    }
}

/// Outcome of attaching one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Attached,
    /// The request has no capability for this kind of operation.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    /// The request is shared and cannot be mutated in place.
    Immutable(OperationKind),
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachError::Immutable(kind) => {
                write!(f, "cannot attach {kind}: request is not mutable")
            }
        }
    }
}

impl std::error::Error for AttachError {}

/// Attach `op` to `request` if the request can carry that kind of operation.
///
/// Attaching the same kind twice overwrites the earlier value.
pub fn attach<R: CollectionRequest + ?Sized>(request: &mut R, op: Operation) -> Applied {
    let applied = match op {
        Operation::Sorting(s) => request.sorting().map(|r| r.set_sorting(s)),
        Operation::FieldSelection(fs) => request.field_selection().map(|r| r.set_field_selection(fs)),
        Operation::Filtering(f) => request.filtering().map(|r| r.set_filtering(f)),
        Operation::Searching(s) => request.searching().map(|r| r.set_searching(s)),
        Operation::Pagination(p) => request.pagination().map(|r| r.set_pagination(p)),
    };
    match applied {
        Some(()) => Applied::Attached,
        None => Applied::Ignored,
    }
}

/// Attach through a shared handle. Fails if the request is aliased.
pub fn attach_shared<R: CollectionRequest>(
    request: &mut Arc<R>,
    op: Operation,
) -> Result<Applied, AttachError> {
    let kind = op.kind();
    let request = Arc::get_mut(request).ok_or(AttachError::Immutable(kind))?;
    Ok(attach(request, op))
}
