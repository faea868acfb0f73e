mod condition;
mod error;
mod operator;
mod resolver;
mod scope;
mod sort;

pub use condition::Condition;
pub use error::ConditionError;
pub use operator::Operator;
pub use resolver::{FieldMap, FieldResolver, IdentityResolver};
pub use scope::{Junction, Scope, ScopeNode};
pub use sort::{Sort, SortDirection};
