use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    IEq,
    Match,
    NoMatch,
    Contains,
    StartsWith,
    In,
}

impl Operator {
    /// Look up a comparison keyword (`eq`, `ge`, `contains`, ...).
    pub fn from_keyword(word: &str) -> Option<Self> {
        let op = match word.to_ascii_lowercase().as_str() {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "gt" => Operator::Gt,
            "ge" => Operator::Gte,
            "lt" => Operator::Lt,
            "le" => Operator::Lte,
            "ieq" => Operator::IEq,
            "match" => Operator::Match,
            "nomatch" => Operator::NoMatch,
            "contains" => Operator::Contains,
            "starts_with" => Operator::StartsWith,
            "in" => Operator::In,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::IEq => ":=",
            Operator::Match => "~",
            Operator::NoMatch => "!~",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::In => "in",
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }

    /// Operators whose right operand must be a string literal.
    pub fn requires_string(self) -> bool {
        matches!(
            self,
            Operator::IEq
                | Operator::Match
                | Operator::NoMatch
                | Operator::Contains
                | Operator::StartsWith
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
