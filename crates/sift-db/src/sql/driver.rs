use bson::{Bson, Document};

use crate::error::DbError;

use super::Param;

/// The narrow contract with the connection layer. The engine renders;
/// the driver executes. Driver failures come back unchanged inside
/// [`DbError::Driver`].
pub trait Driver {
    /// Run a row-returning statement.
    fn select(&self, sql: &str, params: &[Param]) -> Result<Vec<Document>, DbError>;

    /// Run a statement for its side effect; returns the affected-row
    /// count.
    fn execute(&self, sql: &str, params: &[Param]) -> Result<u64, DbError>;
}

/// The result of executing a statement: rows for a select, an affected
/// count for everything else.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    rows: Vec<Document>,
    affected: u64,
}

impl RowSet {
    pub(crate) fn from_rows(rows: Vec<Document>) -> RowSet {
        let affected = rows.len() as u64;
        RowSet { rows, affected }
    }

    pub(crate) fn from_affected(affected: u64) -> RowSet {
        RowSet {
            rows: Vec::new(),
            affected,
        }
    }

    /// All rows, consuming the set.
    pub fn rows(self) -> Vec<Document> {
        self.rows
    }

    /// The first row, if any.
    pub fn row(&self) -> Option<&Document> {
        self.rows.first()
    }

    /// The first column of the first row — the scalar shape.
    pub fn one(&self) -> Option<&Bson> {
        self.rows.first().and_then(|row| row.iter().next()).map(|(_, v)| v)
    }

    pub fn count(&self) -> u64 {
        self.affected
    }
}
