use std::fmt;

use crate::operator::Operator;

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionError {
    /// The operator token is not part of the closed enumeration.
    InvalidOperator(String),
    /// The value shape (scalar vs list) is incompatible with the operator.
    IncompatibleValue { operator: Operator, detail: String },
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOperator(token) => write!(f, "invalid operator: {token}"),
            Self::IncompatibleValue { operator, detail } => {
                write!(f, "incompatible value for {}: {detail}", operator.token())
            }
        }
    }
}

impl std::error::Error for ConditionError {}
