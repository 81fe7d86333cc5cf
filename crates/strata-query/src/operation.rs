use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expression::Filtering;
use crate::fields::FieldSelection;
use crate::pagination::Pagination;
use crate::search::Searching;
use crate::sort::Sorting;

/// One parsed collection operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Sorting(Sorting),
    FieldSelection(FieldSelection),
    Filtering(Filtering),
    Searching(Searching),
    Pagination(Pagination),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Sorting,
    FieldSelection,
    Filtering,
    Searching,
    Pagination,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Sorting(_) => OperationKind::Sorting,
            Operation::FieldSelection(_) => OperationKind::FieldSelection,
            Operation::Filtering(_) => OperationKind::Filtering,
            Operation::Searching(_) => OperationKind::Searching,
            Operation::Pagination(_) => OperationKind::Pagination,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Sorting => "sorting",
            OperationKind::FieldSelection => "field selection",
            OperationKind::Filtering => "filtering",
            OperationKind::Searching => "searching",
            OperationKind::Pagination => "pagination",
        })
    }
}

impl From<Sorting> for Operation {
    fn from(op: Sorting) -> Self {
        Operation::Sorting(op)
    }
}

impl From<FieldSelection> for Operation {
    fn from(op: FieldSelection) -> Self {
        Operation::FieldSelection(op)
    }
}

impl From<Filtering> for Operation {
    fn from(op: Filtering) -> Self {
        Operation::Filtering(op)
    }
}

impl From<Searching> for Operation {
    fn from(op: Searching) -> Self {
        Operation::Searching(op)
    }
}

impl From<Pagination> for Operation {
    fn from(op: Pagination) -> Self {
        Operation::Pagination(op)
    }
}
