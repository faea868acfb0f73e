use std::fmt;

use sift_query::ConditionError;

#[derive(Debug)]
pub enum DbError {
    /// Condition construction failed (invalid operator, bad value shape).
    Condition(ConditionError),
    /// A template placeholder has no bound argument.
    UnresolvedTag(String),
    /// A condition references a field the resolver cannot map to a column.
    UnresolvedField(String),
    /// Field/table/join alias collision within one statement.
    DuplicateAlias(String),
    /// Where/having mixed through one call path.
    MixedConditionKind(String),
    /// The backend does not implement the requested operation.
    UnsupportedOperation(String),
    /// Malformed query input (bad pattern, non-identifier operand, ...).
    InvalidQuery(String),
    /// Execution failed inside the caller-provided driver. Rendering
    /// failures never use this kind; a driver error is a runtime data
    /// error, not a programming error.
    Driver(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Condition(e) => write!(f, "condition error: {e}"),
            DbError::UnresolvedTag(tag) => write!(f, "unresolved template tag: {tag}"),
            DbError::UnresolvedField(field) => write!(f, "unresolved field: {field}"),
            DbError::DuplicateAlias(alias) => write!(f, "duplicate alias: {alias}"),
            DbError::MixedConditionKind(msg) => write!(f, "mixed condition kind: {msg}"),
            DbError::UnsupportedOperation(msg) => write!(f, "unsupported operation: {msg}"),
            DbError::InvalidQuery(msg) => write!(f, "invalid query: {msg}"),
            DbError::Driver(msg) => write!(f, "driver error: {msg}"),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Condition(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConditionError> for DbError {
    fn from(e: ConditionError) -> Self {
        DbError::Condition(e)
    }
}

impl From<regex::Error> for DbError {
    fn from(e: regex::Error) -> Self {
        DbError::InvalidQuery(format!("invalid pattern: {e}"))
    }
}
