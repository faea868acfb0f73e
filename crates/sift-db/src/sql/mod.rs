//! The SQL text backend: a template-driven expression renderer and a
//! statement composer over the shared condition tree. Rendering produces
//! parameterized SQL; execution goes through the caller-provided
//! [`Driver`].

mod driver;
mod escape;
mod expression;
mod operand;
mod predicate;
mod statement;

pub use driver::{Driver, RowSet};
pub use expression::{Expression, Rendered};
pub use operand::Operand;
pub use statement::{JoinKind, Statement};

/// One bound parameter: placeholder name (`:a`, `:b`, ...) and value.
pub type Param = (String, bson::Bson);
