use bson::Bson;
use sift_query::{Condition, ConditionError, FieldResolver, Operator, Scope, ScopeNode};

use crate::error::DbError;

use super::expression::Expression;
use super::operand::Operand;

/// Render a condition tree into an expression fragment, or `None` when
/// the tree is empty. Shares `to_words`'s parenthesization rule: a
/// compound child of a compound parent is wrapped, nothing else is.
pub(crate) fn scope_expr(
    scope: &Scope,
    resolver: &dyn FieldResolver,
) -> Result<Option<Expression>, DbError> {
    let compound = scope.is_compound();
    let mut template = String::new();
    let mut children = Vec::new();

    for child in &scope.children {
        let child_expr = match node_expr(child, resolver)? {
            Some(e) => e,
            None => continue, // empty nested scope: no constraint
        };
        if !children.is_empty() {
            template.push(' ');
            template.push_str(scope.junction.word());
            template.push(' ');
        }
        let tag = format!("c{}", children.len());
        if compound && child.is_compound() {
            template.push_str(&format!("({{{tag}}})"));
        } else {
            template.push_str(&format!("{{{tag}}}"));
        }
        children.push((tag, child_expr));
    }

    if children.is_empty() {
        return Ok(None);
    }
    let mut expr = Expression::new(template);
    for (tag, child_expr) in children {
        expr = expr.with(tag, child_expr);
    }
    Ok(Some(expr))
}

pub(crate) fn node_expr(
    node: &ScopeNode,
    resolver: &dyn FieldResolver,
) -> Result<Option<Expression>, DbError> {
    match node {
        ScopeNode::Condition(cond) => condition_expr(cond, resolver).map(Some),
        ScopeNode::Scope(scope) => scope_expr(scope, resolver),
    }
}

/// Render one leaf condition: resolve the field, run the value through
/// the resolver's encoding hook (unless the operator skips it), then emit
/// the operator's SQL shape with the value parameter-bound.
pub(crate) fn condition_expr(
    cond: &Condition,
    resolver: &dyn FieldResolver,
) -> Result<Expression, DbError> {
    let column = resolve(&cond.field, resolver)?;
    let value = if cond.operator.skips_encoding() {
        cond.value.clone()
    } else {
        resolver.encode(&cond.field, cond.value.clone())
    };

    if let Bson::Array(items) = value {
        // Lists route through the in/not-in shape; `=`/`!=` are rewritten
        // here at render time, their stored spelling is untouched.
        if !cond.operator.accepts_list() {
            return Err(DbError::Condition(ConditionError::IncompatibleValue {
                operator: cond.operator,
                detail: "list value is not allowed".into(),
            }));
        }
        let negate = matches!(cond.operator, Operator::Ne | Operator::NotIn);
        return Ok(list_expr(&column, items, negate));
    }

    if cond.operator.wants_list() {
        return Err(DbError::Condition(ConditionError::IncompatibleValue {
            operator: cond.operator,
            detail: "expected a list value".into(),
        }));
    }

    match (cond.operator, &value) {
        (Operator::Eq, Bson::Null) => Ok(Expression::new("{field} is null").with("field", Operand::ident(column))),
        (Operator::Ne, Bson::Null) => Ok(Expression::new("{field} is not null").with("field", Operand::ident(column))),
        (op, _) => Ok(operand_expr(&column, op, Operand::Value(value))),
    }
}

fn operand_expr(column: &str, operator: Operator, value: Operand) -> Expression {
    Expression::new(format!("{{field}} {} [value]", operator.token()))
        .with("field", Operand::ident(column))
        .with("value", value)
}

fn list_expr(column: &str, items: Vec<Bson>, negate: bool) -> Expression {
    if items.is_empty() {
        // `in ()` is not valid SQL; the documented policy is a tautology.
        return if negate {
            Expression::new("1 = 1")
        } else {
            Expression::new("1 = 0")
        };
    }
    let token = if negate { "not in" } else { "in" };
    let slots: Vec<&str> = items.iter().map(|_| "[]").collect();
    let mut expr = Expression::new(format!("{{field}} {token} ({})", slots.join(", ")))
        .with("field", Operand::ident(column));
    for item in items {
        expr = expr.arg(item);
    }
    expr
}

pub(crate) fn resolve(field: &str, resolver: &dyn FieldResolver) -> Result<String, DbError> {
    resolver
        .resolve(field)
        .ok_or_else(|| DbError::UnresolvedField(field.to_string()))
}
