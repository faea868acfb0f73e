use sift_query::{
    Condition, FieldResolver, IdentityResolver, Operator, ScopeNode, SortDirection,
};

use crate::error::DbError;

use super::driver::{Driver, RowSet};
use super::escape::{self, EscapeMode};
use super::expression::{Expression, RenderContext, Rendered, render_operand};
use super::operand::Operand;
use super::predicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "join",
            JoinKind::Left => "left join",
        }
    }
}

#[derive(Debug)]
struct Join {
    kind: JoinKind,
    table: String,
    alias: Option<String>,
    on: Expression,
}

/// A condition attached to a statement's where/having list.
#[derive(Debug)]
enum SqlCond {
    /// A subtree of the shared condition vocabulary.
    Node(ScopeNode),
    /// A condition whose right-hand side is an SQL-level operand
    /// (sub-select, raw expression, scalar).
    Value {
        field: String,
        operator: Operator,
        value: Operand,
    },
    /// A raw fragment, trusted as already-valid SQL.
    Raw(Expression),
}

impl SqlCond {
    fn is_compound(&self) -> bool {
        matches!(self, SqlCond::Node(node) if node.is_compound())
    }
}

#[derive(Debug)]
struct OrderSpec {
    field: String,
    direction: SortDirection,
    suffix: Option<String>,
}

/// Composes clause fragments into a full SQL statement.
///
/// Fallible adders validate eagerly and return `Result<Self>`, so a
/// malformed statement never reaches the renderer. Clauses render in
/// template order through one shared context, which keeps placeholder
/// names sequential across the whole statement — nested sub-selects
/// included. A statement is itself an [`Operand`], so it can appear as a
/// condition value or as a table.
#[derive(Debug)]
pub struct Statement {
    mode: Mode,
    fields: Vec<(Operand, Option<String>)>,
    tables: Vec<(Operand, Option<String>)>,
    joins: Vec<Join>,
    wheres: Vec<SqlCond>,
    havings: Vec<SqlCond>,
    sets: Vec<(String, Operand)>,
    group: Vec<String>,
    order: Vec<OrderSpec>,
    limit: Option<(u64, u64)>,
    distinct: bool,
    wrap: bool,
    resolver: Box<dyn FieldResolver>,
}

impl Statement {
    pub fn select() -> Statement {
        Statement::new(Mode::Select)
    }

    pub fn insert() -> Statement {
        Statement::new(Mode::Insert)
    }

    pub fn update() -> Statement {
        Statement::new(Mode::Update)
    }

    pub fn delete() -> Statement {
        Statement::new(Mode::Delete)
    }

    fn new(mode: Mode) -> Statement {
        Statement {
            mode,
            fields: Vec::new(),
            tables: Vec::new(),
            joins: Vec::new(),
            wheres: Vec::new(),
            havings: Vec::new(),
            sets: Vec::new(),
            group: Vec::new(),
            order: Vec::new(),
            limit: None,
            distinct: false,
            wrap: true,
            resolver: Box::new(IdentityResolver),
        }
    }

    // ── Field list ──────────────────────────────────────────────

    pub fn field(self, field: impl Into<String>) -> Result<Statement, DbError> {
        self.push_field(Operand::ident(field), None)
    }

    pub fn field_as(
        self,
        field: impl Into<String>,
        alias: impl Into<String>,
    ) -> Result<Statement, DbError> {
        self.push_field(Operand::ident(field), Some(alias.into()))
    }

    /// A computed field: any operand (expression, sub-select) plus an
    /// optional alias.
    pub fn field_expr(
        self,
        expr: impl Into<Operand>,
        alias: Option<&str>,
    ) -> Result<Statement, DbError> {
        self.push_field(expr.into(), alias.map(str::to_string))
    }

    fn push_field(mut self, expr: Operand, alias: Option<String>) -> Result<Statement, DbError> {
        if let Some(alias) = &alias {
            if self.fields.iter().any(|(_, a)| a.as_deref() == Some(alias)) {
                return Err(DbError::DuplicateAlias(alias.clone()));
            }
        }
        self.fields.push((expr, alias));
        Ok(self)
    }

    // ── Table list / joins ──────────────────────────────────────

    pub fn table(self, table: impl Into<String>) -> Result<Statement, DbError> {
        self.push_table(Operand::ident(table), None)
    }

    pub fn table_as(
        self,
        table: impl Into<String>,
        alias: impl Into<String>,
    ) -> Result<Statement, DbError> {
        self.push_table(Operand::ident(table), Some(alias.into()))
    }

    /// A sub-query as a table. Requires an alias unless the statement is
    /// a select.
    pub fn table_sub(self, sub: Statement, alias: Option<&str>) -> Result<Statement, DbError> {
        if alias.is_none() && self.mode != Mode::Select {
            return Err(DbError::InvalidQuery(
                "a sub-query table requires an alias".into(),
            ));
        }
        self.push_table(Operand::from(sub), alias.map(str::to_string))
    }

    fn push_table(mut self, table: Operand, alias: Option<String>) -> Result<Statement, DbError> {
        if let Some(alias) = &alias {
            self.check_table_alias(alias)?;
        }
        self.tables.push((table, alias));
        Ok(self)
    }

    pub fn join(self, table: impl Into<String>, on: Expression) -> Result<Statement, DbError> {
        self.push_join(JoinKind::Left, table.into(), None, on)
    }

    pub fn join_as(
        self,
        kind: JoinKind,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: Expression,
    ) -> Result<Statement, DbError> {
        self.push_join(kind, table.into(), Some(alias.into()), on)
    }

    fn push_join(
        mut self,
        kind: JoinKind,
        table: String,
        alias: Option<String>,
        on: Expression,
    ) -> Result<Statement, DbError> {
        // Joins are keyed by their alias, or the table name without one.
        let key = alias.clone().unwrap_or_else(|| table.clone());
        self.check_table_alias(&key)?;
        self.joins.push(Join {
            kind,
            table,
            alias,
            on,
        });
        Ok(self)
    }

    /// Tables and joins share one alias namespace.
    fn check_table_alias(&self, alias: &str) -> Result<(), DbError> {
        let table_hit = self.tables.iter().any(|(_, a)| a.as_deref() == Some(alias));
        let join_hit = self
            .joins
            .iter()
            .any(|j| j.alias.as_deref().unwrap_or(&j.table) == alias);
        if table_hit || join_hit {
            return Err(DbError::DuplicateAlias(alias.to_string()));
        }
        Ok(())
    }

    // ── Conditions ──────────────────────────────────────────────

    /// Attach a subtree of the shared condition vocabulary to the where
    /// clause.
    pub fn where_node(mut self, node: impl Into<ScopeNode>) -> Statement {
        self.wheres.push(SqlCond::Node(node.into()));
        self
    }

    /// A condition with an SQL-level right-hand side: a scalar, a raw
    /// expression, or a sub-select.
    pub fn where_cond(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Operand>,
    ) -> Statement {
        self.wheres.push(SqlCond::Value {
            field: field.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// A raw where fragment, trusted as already-valid SQL.
    pub fn where_expr(mut self, expr: Expression) -> Statement {
        self.wheres.push(SqlCond::Raw(expr));
        self
    }

    pub fn having_node(self, node: impl Into<ScopeNode>) -> Result<Statement, DbError> {
        let mut this = self.check_having()?;
        this.havings.push(SqlCond::Node(node.into()));
        Ok(this)
    }

    pub fn having_cond(
        self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Operand>,
    ) -> Result<Statement, DbError> {
        let mut this = self.check_having()?;
        this.havings.push(SqlCond::Value {
            field: field.into(),
            operator,
            value: value.into(),
        });
        Ok(this)
    }

    pub fn having_expr(self, expr: Expression) -> Result<Statement, DbError> {
        let mut this = self.check_having()?;
        this.havings.push(SqlCond::Raw(expr));
        Ok(this)
    }

    /// Having exists only on selects; the where/having split must not be
    /// mixed through one call path.
    fn check_having(self) -> Result<Statement, DbError> {
        if self.mode != Mode::Select {
            return Err(DbError::MixedConditionKind(
                "having conditions are only valid on a select".into(),
            ));
        }
        Ok(self)
    }

    // ── Assignments, grouping, ordering, windowing ──────────────

    /// An insert/update assignment.
    pub fn set(
        mut self,
        field: impl Into<String>,
        value: impl Into<Operand>,
    ) -> Result<Statement, DbError> {
        if matches!(self.mode, Mode::Select | Mode::Delete) {
            return Err(DbError::UnsupportedOperation(
                "set is only valid on insert/update".into(),
            ));
        }
        self.sets.push((field.into(), value.into()));
        Ok(self)
    }

    pub fn group(mut self, field: impl Into<String>) -> Statement {
        self.group.push(field.into());
        self
    }

    pub fn order(self, field: impl Into<String>) -> Statement {
        self.push_order(field.into(), SortDirection::Asc, None)
    }

    pub fn order_desc(self, field: impl Into<String>) -> Statement {
        self.push_order(field.into(), SortDirection::Desc, None)
    }

    /// Ordering with a trusted suffix such as `nulls last`.
    pub fn order_with(
        self,
        field: impl Into<String>,
        direction: SortDirection,
        suffix: impl Into<String>,
    ) -> Statement {
        self.push_order(field.into(), direction, Some(suffix.into()))
    }

    fn push_order(
        mut self,
        field: String,
        direction: SortDirection,
        suffix: Option<String>,
    ) -> Statement {
        self.order.push(OrderSpec {
            field,
            direction,
            suffix,
        });
        self
    }

    pub fn limit(mut self, count: u64, offset: u64) -> Statement {
        self.limit = Some((count, offset));
        self
    }

    pub fn distinct(mut self) -> Statement {
        self.distinct = true;
        self
    }

    /// Whether the statement is parenthesized when consumed as a
    /// sub-query. Defaults to true; turn off for dialects that reject
    /// doubly-parenthesized compounds (SQLite unions).
    pub fn wrap(mut self, wrap: bool) -> Statement {
        self.wrap = wrap;
        self
    }

    pub fn with_resolver(mut self, resolver: impl FieldResolver + 'static) -> Statement {
        self.resolver = Box::new(resolver);
        self
    }

    // ── Rendering / execution ───────────────────────────────────

    pub fn render(&self) -> Result<Rendered, DbError> {
        let mut ctx = RenderContext::new(false);
        let sql = self.render_into(&mut ctx)?;
        Ok(Rendered {
            sql,
            params: ctx.params,
        })
    }

    /// SQL with parameters inlined as escaped literals. Display only.
    pub fn to_debug_sql(&self) -> Result<String, DbError> {
        let mut ctx = RenderContext::new(true);
        self.render_into(&mut ctx)
    }

    pub fn execute(&self, driver: &dyn Driver) -> Result<RowSet, DbError> {
        let rendered = self.render()?;
        tracing::debug!(sql = %rendered.sql, params = rendered.params.len(), "executing statement");
        match self.mode {
            Mode::Select => Ok(RowSet::from_rows(
                driver.select(&rendered.sql, &rendered.params)?,
            )),
            _ => Ok(RowSet::from_affected(
                driver.execute(&rendered.sql, &rendered.params)?,
            )),
        }
    }

    pub(crate) fn wants_parens(&self) -> bool {
        self.wrap
    }

    /// Clauses are appended in template order; parameters bind in the
    /// order they appear in the finished text.
    pub(crate) fn render_into(&self, ctx: &mut RenderContext) -> Result<String, DbError> {
        tracing::debug!(mode = ?self.mode, "rendering statement");
        match self.mode {
            Mode::Select => {
                let mut sql = String::from("select");
                if self.distinct {
                    sql.push_str(" distinct");
                }
                sql.push_str(&self.render_fields(ctx)?);
                sql.push_str(&self.render_from(ctx)?);
                sql.push_str(&self.render_joins(ctx)?);
                sql.push_str(&self.render_conds("where", &self.wheres, ctx)?);
                sql.push_str(&self.render_group());
                sql.push_str(&self.render_conds("having", &self.havings, ctx)?);
                sql.push_str(&self.render_order());
                sql.push_str(&self.render_limit());
                Ok(sql)
            }
            Mode::Insert => {
                let mut sql = format!(
                    "insert into {} (",
                    escape::identifier_soft(&self.main_table()?)
                );
                sql.push_str(&self.render_set_fields()?);
                sql.push_str(") values (");
                sql.push_str(&self.render_set_values(ctx)?);
                sql.push(')');
                Ok(sql)
            }
            Mode::Update => {
                let mut sql = format!("update {} set ", escape::identifier_soft(&self.main_table()?));
                sql.push_str(&self.render_assignments(ctx)?);
                sql.push_str(&self.render_conds("where", &self.wheres, ctx)?);
                Ok(sql)
            }
            Mode::Delete => {
                let mut sql = format!("delete from {}", escape::identifier_soft(&self.main_table()?));
                sql.push_str(&self.render_conds("where", &self.wheres, ctx)?);
                Ok(sql)
            }
        }
    }

    // ── Clause rendering ────────────────────────────────────────

    fn render_fields(&self, ctx: &mut RenderContext) -> Result<String, DbError> {
        if self.fields.is_empty() {
            return Ok(" *".to_string());
        }
        let mut parts = Vec::new();
        for (operand, alias) in &self.fields {
            let mut part = render_operand(operand, EscapeMode::IdentifierSoft, ctx)?;
            if let Some(alias) = alias {
                part.push(' ');
                part.push_str(&escape::identifier(alias));
            }
            parts.push(part);
        }
        Ok(format!(" {}", parts.join(", ")))
    }

    fn render_from(&self, ctx: &mut RenderContext) -> Result<String, DbError> {
        if self.tables.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::new();
        for (operand, alias) in &self.tables {
            let mut part = render_operand(operand, EscapeMode::IdentifierSoft, ctx)?;
            if let Some(alias) = alias {
                part.push(' ');
                part.push_str(&escape::identifier(alias));
            }
            parts.push(part);
        }
        Ok(format!(" from {}", parts.join(", ")))
    }

    fn render_joins(&self, ctx: &mut RenderContext) -> Result<String, DbError> {
        let mut sql = String::new();
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.kind.keyword());
            sql.push(' ');
            sql.push_str(&escape::identifier_soft(&join.table));
            if let Some(alias) = &join.alias {
                sql.push(' ');
                sql.push_str(&escape::identifier(alias));
            }
            sql.push_str(" on ");
            sql.push_str(&join.on.render_into(ctx)?);
        }
        Ok(sql)
    }

    fn render_conds(
        &self,
        keyword: &str,
        conds: &[SqlCond],
        ctx: &mut RenderContext,
    ) -> Result<String, DbError> {
        let mut parts = Vec::new();
        for cond in conds {
            let sql = match cond {
                SqlCond::Node(node) => {
                    match predicate::node_expr(node, self.resolver.as_ref())? {
                        Some(expr) => expr.render_into(ctx)?,
                        None => continue, // empty scope: no constraint
                    }
                }
                SqlCond::Value {
                    field,
                    operator,
                    value,
                } => match value {
                    // A scalar right-hand side follows the full condition
                    // path: encoding hook, null shape, list rewrite.
                    Operand::Value(scalar) => {
                        let cond = Condition {
                            field: field.clone(),
                            operator: *operator,
                            value: scalar.clone(),
                        };
                        predicate::condition_expr(&cond, self.resolver.as_ref())?
                            .render_into(ctx)?
                    }
                    other => {
                        let column = predicate::resolve(field, self.resolver.as_ref())?;
                        let rhs = render_operand(other, EscapeMode::Param, ctx)?;
                        format!(
                            "{} {} {}",
                            escape::identifier_soft(&column),
                            operator.token(),
                            rhs
                        )
                    }
                },
                SqlCond::Raw(expr) => expr.render_into(ctx)?,
            };
            // Multiple top-level conditions form a compound AND list, so
            // a compound member is parenthesized, same as to_words.
            if conds.len() > 1 && cond.is_compound() {
                parts.push(format!("({sql})"));
            } else {
                parts.push(sql);
            }
        }
        if parts.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" {keyword} {}", parts.join(" and ")))
    }

    fn render_group(&self) -> String {
        if self.group.is_empty() {
            return String::new();
        }
        let fields: Vec<String> = self
            .group
            .iter()
            .map(|f| escape::identifier_soft(f))
            .collect();
        format!(" group by {}", fields.join(", "))
    }

    fn render_order(&self) -> String {
        if self.order.is_empty() {
            return String::new();
        }
        let mut items = Vec::new();
        for spec in &self.order {
            let mut item = escape::identifier_soft(&spec.field);
            if spec.direction == SortDirection::Desc {
                item.push_str(" desc");
            }
            if let Some(suffix) = &spec.suffix {
                item.push(' ');
                item.push_str(suffix);
            }
            items.push(item);
        }
        format!(" order by {}", items.join(", "))
    }

    fn render_limit(&self) -> String {
        match self.limit {
            None => String::new(),
            Some((count, 0)) => format!(" limit {count}"),
            Some((count, offset)) => format!(" limit {count} offset {offset}"),
        }
    }

    fn render_assignments(&self, ctx: &mut RenderContext) -> Result<String, DbError> {
        if self.sets.is_empty() {
            return Err(DbError::InvalidQuery("no assignments to render".into()));
        }
        let mut parts = Vec::new();
        for (field, value) in &self.sets {
            parts.push(format!(
                "{} = {}",
                escape::identifier_soft(field),
                render_operand(value, EscapeMode::Param, ctx)?
            ));
        }
        Ok(parts.join(", "))
    }

    fn render_set_fields(&self) -> Result<String, DbError> {
        if self.sets.is_empty() {
            return Err(DbError::InvalidQuery("no assignments to render".into()));
        }
        let fields: Vec<String> = self
            .sets
            .iter()
            .map(|(f, _)| escape::identifier_soft(f))
            .collect();
        Ok(fields.join(", "))
    }

    fn render_set_values(&self, ctx: &mut RenderContext) -> Result<String, DbError> {
        let mut parts = Vec::new();
        for (_, value) in &self.sets {
            parts.push(render_operand(value, EscapeMode::Param, ctx)?);
        }
        Ok(parts.join(", "))
    }

    fn main_table(&self) -> Result<String, DbError> {
        match self.tables.first() {
            Some((Operand::Ident(name), _)) => Ok(name.clone()),
            Some(_) => Err(DbError::InvalidQuery(
                "this statement requires a named table".into(),
            )),
            None => Err(DbError::InvalidQuery("statement has no table".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Bson, bson};
    use sift_query::{FieldMap, Scope};

    #[test]
    fn bare_select_renders_star() {
        let rendered = Statement::select().table("user").unwrap().render().unwrap();
        assert_eq!(rendered.sql, "select * from \"user\"");
        assert!(rendered.params.is_empty());
    }

    #[test]
    fn select_with_fields_aliases_and_window() {
        let rendered = Statement::select()
            .field("name")
            .unwrap()
            .field_as("surname", "family")
            .unwrap()
            .table_as("user", "u")
            .unwrap()
            .order_desc("name")
            .limit(2, 1)
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "select \"name\", \"surname\" \"family\" from \"user\" \"u\" order by \"name\" desc limit 2 offset 1"
        );
    }

    #[test]
    fn where_nodes_bind_parameters_in_clause_order() {
        let rendered = Statement::select()
            .table("user")
            .unwrap()
            .where_node(Condition::new("age", Operator::Gt, 6).unwrap())
            .where_node(("city", "Paris"))
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "select * from \"user\" where \"age\" > :a and \"city\" = :b"
        );
        assert_eq!(rendered.params[0], (":a".to_string(), Bson::Int32(6)));
        assert_eq!(
            rendered.params[1],
            (":b".to_string(), Bson::String("Paris".into()))
        );
    }

    #[test]
    fn compound_where_member_is_parenthesized() {
        let either = Scope::any([("a", 1), ("b", 1)]);
        let rendered = Statement::select()
            .table("t")
            .unwrap()
            .where_node(either)
            .where_node(("c", 2))
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "select * from \"t\" where (\"a\" = :a or \"b\" = :b) and \"c\" = :c"
        );
    }

    #[test]
    fn duplicate_field_alias_fails_fast() {
        let err = Statement::select()
            .field_as("a", "x")
            .unwrap()
            .field_as("b", "x")
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateAlias(a) if a == "x"));
    }

    #[test]
    fn duplicate_table_alias_fails_across_joins() {
        let err = Statement::select()
            .table_as("user", "u")
            .unwrap()
            .join_as(
                JoinKind::Left,
                "address",
                "u",
                Expression::new("{l} = {r}").with("l", Operand::ident("u.address_id")).with("r", Operand::ident("u.id")),
            )
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateAlias(a) if a == "u"));
    }

    #[test]
    fn join_renders_on_expression() {
        let rendered = Statement::select()
            .table_as("user", "u")
            .unwrap()
            .join_as(
                JoinKind::Left,
                "address",
                "a",
                Expression::new("{l} = {r}")
                    .with("l", Operand::ident("a.id"))
                    .with("r", Operand::ident("u.address_id")),
            )
            .unwrap()
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "select * from \"user\" \"u\" left join \"address\" \"a\" on \"a\".\"id\" = \"u\".\"address_id\""
        );
    }

    #[test]
    fn having_on_update_is_a_mixed_condition_kind() {
        let err = Statement::update()
            .table("user")
            .unwrap()
            .having_node(("a", 1))
            .unwrap_err();
        assert!(matches!(err, DbError::MixedConditionKind(_)));
    }

    #[test]
    fn sub_select_as_condition_value() {
        let sub = Statement::select()
            .field("id")
            .unwrap()
            .table("banned")
            .unwrap();
        let rendered = Statement::select()
            .table("user")
            .unwrap()
            .where_cond("id", Operator::NotIn, sub)
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "select * from \"user\" where \"id\" not in (select \"id\" from \"banned\")"
        );
    }

    #[test]
    fn unwrapped_sub_statement_renders_bare() {
        let sub = Statement::select().table("t").unwrap().wrap(false);
        let rendered = Statement::select()
            .table_sub(sub, Some("s"))
            .unwrap()
            .render()
            .unwrap();
        assert_eq!(rendered.sql, "select * from select * from \"t\" \"s\"");
    }

    #[test]
    fn sub_query_table_requires_alias_outside_select() {
        let sub = Statement::select().table("t").unwrap();
        let err = Statement::update().table_sub(sub, None).unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery(_)));
    }

    #[test]
    fn sub_select_parameters_share_the_counter() {
        let sub = Statement::select()
            .field("id")
            .unwrap()
            .table("orders")
            .unwrap()
            .where_node(Condition::new("total", Operator::Gt, 100).unwrap());
        let rendered = Statement::select()
            .table("user")
            .unwrap()
            .where_node(Condition::new("active", Operator::Eq, true).unwrap())
            .where_cond("id", Operator::In, sub)
            .where_node(Condition::new("age", Operator::Gte, 18).unwrap())
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "select * from \"user\" where \"active\" = :a and \"id\" in (select \"id\" from \"orders\" where \"total\" > :b) and \"age\" >= :c"
        );
        let names: Vec<&str> = rendered.params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec![":a", ":b", ":c"]);
    }

    #[test]
    fn insert_renders_fields_and_values() {
        let rendered = Statement::insert()
            .table("user")
            .unwrap()
            .set("name", "Ada")
            .unwrap()
            .set("age", 36)
            .unwrap()
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "insert into \"user\" (\"name\", \"age\") values (:a, :b)"
        );
        assert_eq!(rendered.params.len(), 2);
    }

    #[test]
    fn update_renders_assignments_then_where() {
        let rendered = Statement::update()
            .table("user")
            .unwrap()
            .set("name", "Ada")
            .unwrap()
            .where_node(("id", 7))
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "update \"user\" set \"name\" = :a where \"id\" = :b"
        );
    }

    #[test]
    fn delete_renders_where() {
        let rendered = Statement::delete()
            .table("user")
            .unwrap()
            .where_node(Condition::new("age", Operator::Lt, 18).unwrap())
            .render()
            .unwrap();
        assert_eq!(rendered.sql, "delete from \"user\" where \"age\" < :a");
    }

    #[test]
    fn set_on_select_is_unsupported() {
        let err = Statement::select().set("a", 1).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedOperation(_)));
    }

    #[test]
    fn fields_resolve_through_the_statement_resolver() {
        let rendered = Statement::select()
            .table("user")
            .unwrap()
            .with_resolver(FieldMap::new().map("name", "full_name"))
            .where_node(("name", "Ada"))
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "select * from \"user\" where \"full_name\" = :a"
        );

        let err = Statement::select()
            .table("user")
            .unwrap()
            .with_resolver(FieldMap::new())
            .where_node(("name", "Ada"))
            .render()
            .unwrap_err();
        assert!(matches!(err, DbError::UnresolvedField(f) if f == "name"));
    }

    #[test]
    fn empty_in_list_renders_tautology_through_statement() {
        let rendered = Statement::select()
            .table("t")
            .unwrap()
            .where_node(Condition::new("id", Operator::In, bson!([])).unwrap())
            .render()
            .unwrap();
        assert_eq!(rendered.sql, "select * from \"t\" where 1 = 0");
    }

    #[test]
    fn debug_sql_inlines_literals() {
        let sql = Statement::select()
            .table("user")
            .unwrap()
            .where_node(("name", "o'clock"))
            .where_node(Condition::new("age", Operator::Gte, 21).unwrap())
            .to_debug_sql()
            .unwrap();
        assert_eq!(
            sql,
            "select * from \"user\" where \"name\" = 'o''clock' and \"age\" >= 21"
        );
    }

    #[test]
    fn order_suffix_is_appended() {
        let rendered = Statement::select()
            .table("t")
            .unwrap()
            .order_with("score", SortDirection::Desc, "nulls last")
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "select * from \"t\" order by \"score\" desc nulls last"
        );
    }

    #[test]
    fn group_and_having_render_after_where() {
        let rendered = Statement::select()
            .field("city")
            .unwrap()
            .field_expr(Expression::new("count(*)"), Some("n"))
            .unwrap()
            .table("user")
            .unwrap()
            .where_node(Condition::new("active", Operator::Eq, true).unwrap())
            .group("city")
            .having_expr(Expression::new("count(*) > []").arg(10))
            .unwrap()
            .render()
            .unwrap();
        assert_eq!(
            rendered.sql,
            "select \"city\", count(*) \"n\" from \"user\" where \"active\" = :a group by \"city\" having count(*) > :b"
        );
    }
}
