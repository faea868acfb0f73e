use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::error::ConditionError;
use crate::operator::Operator;

/// A leaf predicate: field, operator, value.
///
/// The value is plain `Bson`; `Bson::Array` is the list shape used by
/// `in`/`not in` (and tolerated by `=`/`!=`, which are rewritten to the
/// list form at evaluation time — the spelling stored here never changes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Bson,
}

impl Condition {
    /// Build a condition, validating the value shape against the operator.
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Bson>,
    ) -> Result<Condition, ConditionError> {
        let value = value.into();
        let is_list = matches!(value, Bson::Array(_));
        if operator.wants_list() && !is_list {
            return Err(ConditionError::IncompatibleValue {
                operator,
                detail: "expected a list value".into(),
            });
        }
        if is_list && !operator.accepts_list() {
            return Err(ConditionError::IncompatibleValue {
                operator,
                detail: "list value is not allowed".into(),
            });
        }
        Ok(Condition {
            field: field.into(),
            operator,
            value,
        })
    }

    /// Like [`Condition::new`] but takes the operator's token spelling.
    pub fn parse(
        field: impl Into<String>,
        token: &str,
        value: impl Into<Bson>,
    ) -> Result<Condition, ConditionError> {
        Condition::new(field, token.parse()?, value)
    }

    /// The same predicate with the operator replaced by its De Morgan dual.
    pub fn negated(&self) -> Condition {
        Condition {
            field: self.field.clone(),
            operator: self.operator.negated(),
            value: self.value.clone(),
        }
    }

    /// Human-readable rendering: `field token value`.
    pub fn to_words(&self) -> String {
        format!(
            "{} {} {}",
            self.field,
            self.operator.token(),
            format_value(&self.value)
        )
    }
}

/// Display form of a condition value used by `to_words`.
pub(crate) fn format_value(value: &Bson) -> String {
    match value {
        Bson::Null => "null".to_string(),
        Bson::String(s) => format!("'{s}'"),
        Bson::Boolean(b) => b.to_string(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        Bson::Array(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("({})", inner.join(", "))
        }
        other => format!("{other}"),
    }
}
