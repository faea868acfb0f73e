use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConditionError;

/// Comparison and pattern operators a condition can carry.
///
/// The enumeration is closed: every operator has a defined negation (used
/// by De Morgan rewrites) and a defined evaluation rule in both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    Regex,
    NotRegex,
    In,
    NotIn,
}

impl Operator {
    /// The De Morgan dual of this operator.
    pub fn negated(self) -> Operator {
        match self {
            Operator::Eq => Operator::Ne,
            Operator::Ne => Operator::Eq,
            Operator::Gt => Operator::Lte,
            Operator::Gte => Operator::Lt,
            Operator::Lt => Operator::Gte,
            Operator::Lte => Operator::Gt,
            Operator::Like => Operator::NotLike,
            Operator::NotLike => Operator::Like,
            Operator::Regex => Operator::NotRegex,
            Operator::NotRegex => Operator::Regex,
            Operator::In => Operator::NotIn,
            Operator::NotIn => Operator::In,
        }
    }

    /// The SQL token, also used by `to_words`.
    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::Regex => "regexp",
            Operator::NotRegex => "not regexp",
            Operator::In => "in",
            Operator::NotIn => "not in",
        }
    }

    /// Operators whose value must be a list.
    pub fn wants_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// Operators that tolerate a list value. `Eq`/`Ne` keep their spelling
    /// and are rewritten to `In`/`NotIn` at evaluation time.
    pub fn accepts_list(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::In | Operator::NotIn
        )
    }

    /// Pattern operators bypass the resolver's value-encoding hook: the
    /// pattern is matched against the stored representation, not an
    /// encoded one.
    pub fn skips_encoding(self) -> bool {
        matches!(
            self,
            Operator::Like | Operator::NotLike | Operator::Regex | Operator::NotRegex
        )
    }
}

impl FromStr for Operator {
    type Err = ConditionError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let op = match token.to_ascii_lowercase().as_str() {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "like" => Operator::Like,
            "not like" => Operator::NotLike,
            "regexp" => Operator::Regex,
            "not regexp" => Operator::NotRegex,
            "in" => Operator::In,
            "not in" => Operator::NotIn,
            _ => return Err(ConditionError::InvalidOperator(token.to_string())),
        };
        Ok(op)
    }
}
