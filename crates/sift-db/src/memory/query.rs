use bson::{Bson, Document};
use sift_query::{FieldResolver, IdentityResolver, Junction, Scope, ScopeNode, Sort};

use crate::error::DbError;

use super::aggregate::{self, Aggregate};
use super::eval;
use super::matcher;
use super::sort;

/// An in-memory query plan: an owned row source, a root AND scope, sort
/// keys and a window. Built once, consumed by exactly one terminal —
/// the backing source is handed over, so a consumed plan cannot run
/// twice.
///
/// Filtering walks rows lazily; sorting, counting and aggregation drain
/// the source first. That pre-materialization is the documented
/// exception to laziness, not a bug.
#[derive(Debug)]
pub struct Query {
    rows: Vec<Document>,
    scope: Scope,
    sorts: Vec<Sort>,
    limit: Option<(usize, usize)>,
    resolver: Box<dyn FieldResolver>,
}

impl Query {
    pub fn new(rows: impl IntoIterator<Item = Document>) -> Query {
        Query {
            rows: rows.into_iter().collect(),
            scope: Scope::new(Junction::And),
            sorts: Vec::new(),
            limit: None,
            resolver: Box::new(IdentityResolver),
        }
    }

    /// Add a condition (or whole subtree) to the root AND scope.
    pub fn filter(mut self, node: impl Into<ScopeNode>) -> Query {
        self.scope.add(node);
        self
    }

    /// Append a sort key; earlier keys win, later keys break ties.
    pub fn sort(mut self, sort: Sort) -> Query {
        self.sorts.push(sort);
        self
    }

    /// Window the result to `[offset, offset + count)`.
    pub fn limit(mut self, count: usize, offset: usize) -> Query {
        self.limit = Some((count, offset));
        self
    }

    pub fn with_resolver(mut self, resolver: impl FieldResolver + 'static) -> Query {
        self.resolver = Box::new(resolver);
        self
    }

    // ── Terminals ───────────────────────────────────────────────

    /// Filtered, sorted, windowed rows keyed by row id: the `_id` field
    /// when the row has one, its source position otherwise.
    pub fn rows(self) -> Result<Vec<(Bson, Document)>, DbError> {
        let rows = self.select()?;
        Ok(rows
            .into_iter()
            .map(|(idx, doc)| {
                let id = doc
                    .get("_id")
                    .cloned()
                    .unwrap_or(Bson::Int64(idx as i64));
                (id, doc)
            })
            .collect())
    }

    /// The first row of the result, if any.
    pub fn row(self) -> Result<Option<Document>, DbError> {
        let mut rows = self.select()?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.swap_remove(0).1))
    }

    /// One scalar: the named column of the first result row.
    pub fn one(self, field: &str) -> Result<Option<Bson>, DbError> {
        let field = field.to_string();
        Ok(self
            .row()?
            .and_then(|doc| eval::get_path(&doc, &field).cloned()))
    }

    /// Whether any row matches. Stops at the first hit.
    pub fn exists(self) -> Result<bool, DbError> {
        let matcher = matcher::compile_scope(&self.scope, self.resolver.as_ref())?;
        Ok(self.rows.iter().any(|row| matcher.matches(row)))
    }

    /// Matching-row count. Counts the filtered set, not the window —
    /// `select count(*)` parity.
    pub fn count(self) -> Result<usize, DbError> {
        let matcher = matcher::compile_scope(&self.scope, self.resolver.as_ref())?;
        Ok(self.rows.iter().filter(|row| matcher.matches(row)).count())
    }

    /// Reduce one column of the filtered rows.
    pub fn aggregate(self, aggregate: Aggregate, field: &str) -> Result<Bson, DbError> {
        let column = self
            .resolver
            .resolve(field)
            .ok_or_else(|| DbError::UnresolvedField(field.to_string()))?;
        let matcher = matcher::compile_scope(&self.scope, self.resolver.as_ref())?;
        let matched: Vec<Document> = self
            .rows
            .into_iter()
            .filter(|row| matcher.matches(row))
            .collect();
        Ok(aggregate::reduce(&matched, &column, aggregate))
    }

    // ── Mutation terminals ──────────────────────────────────────

    /// Append a row; conditions do not apply.
    pub fn insert(mut self, doc: Document) -> Vec<Document> {
        self.rows.push(doc);
        self.rows
    }

    /// Shallow-merge `patch` into every matching row. Returns the full
    /// row set plus the changed-row count.
    pub fn update(self, patch: Document) -> Result<(Vec<Document>, usize), DbError> {
        let matcher = matcher::compile_scope(&self.scope, self.resolver.as_ref())?;
        let mut rows = self.rows;
        let mut changed = 0usize;
        for row in rows.iter_mut() {
            if !matcher.matches(row) {
                continue;
            }
            for (key, value) in patch.iter() {
                row.insert(key.clone(), value.clone());
            }
            changed += 1;
        }
        Ok((rows, changed))
    }

    /// Drop every matching row. Returns the surviving rows plus the
    /// removed-row count.
    pub fn delete(self) -> Result<(Vec<Document>, usize), DbError> {
        let matcher = matcher::compile_scope(&self.scope, self.resolver.as_ref())?;
        let before = self.rows.len();
        let rows: Vec<Document> = self
            .rows
            .into_iter()
            .filter(|row| !matcher.matches(row))
            .collect();
        let removed = before - rows.len();
        Ok((rows, removed))
    }

    // ── Pipeline ────────────────────────────────────────────────

    /// Filter, then sort, then window. Rows keep their source position.
    fn select(self) -> Result<Vec<(usize, Document)>, DbError> {
        tracing::debug!(rows = self.rows.len(), "executing in-memory query");
        let matcher = matcher::compile_scope(&self.scope, self.resolver.as_ref())?;
        let mut rows: Vec<(usize, Document)> = self
            .rows
            .into_iter()
            .enumerate()
            .filter(|(_, row)| matcher.matches(row))
            .collect();
        sort::sort_rows(&mut rows, &self.sorts);
        if let Some((count, offset)) = self.limit {
            rows = rows
                .into_iter()
                .skip(offset)
                .take(count)
                .collect();
        }
        Ok(rows)
    }
}
