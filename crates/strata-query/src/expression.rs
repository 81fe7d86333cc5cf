use std::fmt;

use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::operator::Operator;
use crate::path::FieldPath;

/// A single comparison: `field <operator> value`.
///
/// Generic over the field reference so the same tree can carry raw field
/// paths after parsing and resolved columns after model resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition<F = FieldPath> {
    pub field: F,
    pub operator: Operator,
    pub value: Bson,
}

/// Boolean expression tree over comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression<F = FieldPath> {
    Condition(Condition<F>),
    And(Vec<Expression<F>>),
    Or(Vec<Expression<F>>),
    Not(Box<Expression<F>>),
}

impl<F> Expression<F> {
    /// Visit every comparison leaf, left to right.
    pub fn conditions(&self) -> Vec<&Condition<F>> {
        let mut out = Vec::new();
        collect_conditions(self, &mut out);
        out
    }

    /// Rebuild the tree with every field reference mapped through `f`.
    /// Stops at the first error.
    pub fn try_map_fields<G, E>(
        &self,
        f: &mut impl FnMut(&F) -> Result<G, E>,
    ) -> Result<Expression<G>, E> {
        Ok(match self {
            Expression::Condition(c) => Expression::Condition(Condition {
                field: f(&c.field)?,
                operator: c.operator,
                value: c.value.clone(),
            }),
            Expression::And(children) => Expression::And(
                children
                    .iter()
                    .map(|c| c.try_map_fields(f))
                    .collect::<Result<_, _>>()?,
            ),
            Expression::Or(children) => Expression::Or(
                children
                    .iter()
                    .map(|c| c.try_map_fields(f))
                    .collect::<Result<_, _>>()?,
            ),
            Expression::Not(inner) => Expression::Not(Box::new(inner.try_map_fields(f)?)),
        })
    }
}

fn collect_conditions<'a, F>(expr: &'a Expression<F>, out: &mut Vec<&'a Condition<F>>) {
    match expr {
        Expression::Condition(c) => out.push(c),
        Expression::And(children) | Expression::Or(children) => {
            for child in children {
                collect_conditions(child, out);
            }
        }
        Expression::Not(inner) => collect_conditions(inner, out),
    }
}

impl<F: fmt::Display> fmt::Display for Expression<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Condition(c) => write!(f, "{} {} {}", c.field, c.operator, c.value),
            Expression::And(children) => write_joined(f, children, " and "),
            Expression::Or(children) => write_joined(f, children, " or "),
            Expression::Not(inner) => write!(f, "not ({inner})"),
        }
    }
}

fn write_joined<F: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    children: &[Expression<F>],
    sep: &str,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}

/// A parsed `_filter` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filtering {
    pub root: Expression,
}

impl Filtering {
    pub fn field_paths(&self) -> Vec<&FieldPath> {
        self.root.conditions().into_iter().map(|c| &c.field).collect()
    }
}
