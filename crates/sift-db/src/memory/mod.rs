//! The in-memory backend: evaluates the shared condition tree directly
//! against rows, with multi-key sorting, windowing and aggregation. No
//! SQL is involved; both backends must select the same rows for the
//! same tree.

mod aggregate;
mod eval;
pub(crate) mod matcher;
mod query;
mod sort;

pub use aggregate::Aggregate;
pub use query::Query;
