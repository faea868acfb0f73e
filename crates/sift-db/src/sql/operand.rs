use bson::Bson;

use super::expression::Expression;
use super::statement::Statement;

/// A template argument: the SQL-side value domain.
///
/// `Value` operands are parameter-bound (or identifier-quoted, depending
/// on the placeholder that consumes them); `Ident` operands always render
/// as soft-escaped identifiers; `Expr` and `Stmt` render their own SQL
/// inline, sharing the parent's placeholder counter so parameter names
/// never collide across nesting levels.
#[derive(Debug)]
pub enum Operand {
    Value(Bson),
    Ident(String),
    Expr(Expression),
    Stmt(Box<Statement>),
}

impl Operand {
    pub fn null() -> Operand {
        Operand::Value(Bson::Null)
    }

    pub fn ident(name: impl Into<String>) -> Operand {
        Operand::Ident(name.into())
    }
}

impl From<Bson> for Operand {
    fn from(value: Bson) -> Self {
        Operand::Value(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Value(Bson::String(value.to_string()))
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Value(Bson::String(value))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Value(Bson::Int32(value))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Value(Bson::Int64(value))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Value(Bson::Double(value))
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Value(Bson::Boolean(value))
    }
}

impl From<Vec<Bson>> for Operand {
    fn from(value: Vec<Bson>) -> Self {
        Operand::Value(Bson::Array(value))
    }
}

impl From<Expression> for Operand {
    fn from(expr: Expression) -> Self {
        Operand::Expr(expr)
    }
}

impl From<Statement> for Operand {
    fn from(stmt: Statement) -> Self {
        Operand::Stmt(Box::new(stmt))
    }
}
