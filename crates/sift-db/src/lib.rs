mod error;
pub mod memory;
pub mod sql;

pub use bson::{Bson, Document};
pub use error::DbError;
pub use memory::{Aggregate, Query};
pub use sql::{Driver, Expression, JoinKind, Operand, Rendered, RowSet, Statement};

#[cfg(feature = "bench-internals")]
pub mod bench {
    pub use crate::memory::matcher::{Matcher, compile};
}
