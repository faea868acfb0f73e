use std::collections::BTreeMap;

use bson::Bson;

use crate::error::DbError;

use super::Param;
use super::escape::{self, EscapeMode};
use super::operand::Operand;

/// A template plus its arguments, compiled to SQL text on `render`.
///
/// The template is scanned left to right. `[tag]`/`[]` placeholders
/// parameter-escape their argument; `{tag}`/`{}` identifier-escape it.
/// Unnamed placeholders consume positional arguments in declaration
/// order; named placeholders look up the tag. Placeholders inside
/// single/double/backtick-quoted runs are never substituted, so SQL
/// string constants embedded in a template stay intact.
#[derive(Debug, Default)]
pub struct Expression {
    template: String,
    positional: Vec<Operand>,
    named: BTreeMap<String, Operand>,
}

/// The output of a render: SQL text plus the ordered parameter bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub sql: String,
    pub params: Vec<Param>,
}

impl Expression {
    pub fn new(template: impl Into<String>) -> Expression {
        Expression {
            template: template.into(),
            positional: Vec::new(),
            named: BTreeMap::new(),
        }
    }

    /// Bind the next `[]`/`{}` placeholder.
    pub fn arg(mut self, value: impl Into<Operand>) -> Expression {
        self.positional.push(value.into());
        self
    }

    /// Bind a `[tag]`/`{tag}` placeholder.
    pub fn with(mut self, tag: impl Into<String>, value: impl Into<Operand>) -> Expression {
        self.named.insert(tag.into(), value.into());
        self
    }

    /// Render to SQL text and an ordered parameter list. Placeholder
    /// names (`:a`, `:b`, ... `:z`, `:aa`, ...) are allocated in render
    /// order from the render root; a failed render produces nothing —
    /// bindings live in the render context, never in the expression.
    pub fn render(&self) -> Result<Rendered, DbError> {
        let mut ctx = RenderContext::new(false);
        let sql = self.render_into(&mut ctx)?;
        Ok(Rendered {
            sql,
            params: ctx.params,
        })
    }

    /// The debug rendering: parameters inlined as escaped literals.
    /// Display only — never hand this to a driver.
    pub fn to_debug_sql(&self) -> Result<String, DbError> {
        let mut ctx = RenderContext::new(true);
        self.render_into(&mut ctx)
    }

    pub(crate) fn render_into(&self, ctx: &mut RenderContext) -> Result<String, DbError> {
        tracing::trace!(template = %self.template, "rendering expression");
        let mut out = String::with_capacity(self.template.len());
        let mut state = QuoteState::Normal;
        let mut next_positional = 0usize;
        let mut chars = self.template.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            match state {
                QuoteState::Normal => match c {
                    '\'' => {
                        state = QuoteState::Single;
                        out.push(c);
                    }
                    '"' => {
                        state = QuoteState::Double;
                        out.push(c);
                    }
                    '`' => {
                        state = QuoteState::Backtick;
                        out.push(c);
                    }
                    '[' | '{' => {
                        let close = if c == '[' { ']' } else { '}' };
                        let mut lookahead = chars.clone();
                        let mut tag = String::new();
                        while let Some(&(_, t)) = lookahead.peek() {
                            if t.is_ascii_alphanumeric() || t == '_' {
                                tag.push(t);
                                lookahead.next();
                            } else {
                                break;
                            }
                        }
                        let closed = matches!(lookahead.peek(), Some(&(_, t)) if t == close);
                        if !closed {
                            // Not a placeholder; keep the bracket literal.
                            out.push(c);
                            continue;
                        }
                        lookahead.next();
                        chars = lookahead;

                        let operand = if tag.is_empty() {
                            let operand =
                                self.positional.get(next_positional).ok_or_else(|| {
                                    DbError::UnresolvedTag(format!(
                                        "positional argument {next_positional}"
                                    ))
                                })?;
                            next_positional += 1;
                            operand
                        } else {
                            self.named
                                .get(&tag)
                                .ok_or_else(|| DbError::UnresolvedTag(tag.clone()))?
                        };
                        let mode = if c == '[' {
                            EscapeMode::Param
                        } else {
                            EscapeMode::Identifier
                        };
                        out.push_str(&render_operand(operand, mode, ctx)?);
                    }
                    _ => out.push(c),
                },
                // A doubled quote toggles out and straight back in, which
                // suppresses placeholders across it exactly like staying
                // inside the literal would.
                QuoteState::Single => {
                    if c == '\'' {
                        state = QuoteState::Normal;
                    }
                    out.push(c);
                }
                QuoteState::Double => {
                    if c == '"' {
                        state = QuoteState::Normal;
                    }
                    out.push(c);
                }
                QuoteState::Backtick => {
                    if c == '`' {
                        state = QuoteState::Normal;
                    }
                    out.push(c);
                }
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Normal,
    Single,
    Double,
    Backtick,
}

/// Per-render state: the parameter list and the placeholder counter.
/// Nested expressions and sub-statements share one context, keeping
/// placeholder names globally unique within the rendered statement.
pub(crate) struct RenderContext {
    pub(crate) params: Vec<Param>,
    next: u32,
    inline: bool,
}

impl RenderContext {
    pub(crate) fn new(inline: bool) -> RenderContext {
        RenderContext {
            params: Vec::new(),
            next: 0,
            inline,
        }
    }

    /// Allocate the next placeholder for `value`, or inline the escaped
    /// literal in debug mode.
    fn bind(&mut self, value: Bson) -> String {
        if self.inline {
            return escape::literal(&value);
        }
        let name = format!(":{}", alpha(self.next));
        self.next += 1;
        self.params.push((name.clone(), value));
        name
    }
}

/// Spreadsheet-style base-26 names: 0 → "a", 25 → "z", 26 → "aa".
fn alpha(mut n: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'a' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    letters.into_iter().collect()
}

pub(crate) fn render_operand(
    operand: &Operand,
    requested: EscapeMode,
    ctx: &mut RenderContext,
) -> Result<String, DbError> {
    // Nested expressions and sub-statements are already-rendered SQL;
    // they always take the no-escape path, whatever the placeholder
    // asked for.
    let mode = match operand {
        Operand::Expr(_) | Operand::Stmt(_) => EscapeMode::None,
        _ => requested,
    };
    match (operand, mode) {
        (Operand::Expr(expr), _) => expr.render_into(ctx),
        (Operand::Stmt(stmt), _) => {
            let sql = stmt.render_into(ctx)?;
            if stmt.wants_parens() {
                Ok(format!("({sql})"))
            } else {
                Ok(sql)
            }
        }
        (Operand::Ident(name), EscapeMode::None) => Ok(name.clone()),
        (Operand::Ident(name), _) => Ok(escape::identifier_soft(name)),
        (Operand::Value(value), EscapeMode::Param) => Ok(ctx.bind(value.clone())),
        (Operand::Value(value), EscapeMode::Identifier) => match value {
            Bson::String(s) => Ok(escape::identifier(s)),
            other => Err(DbError::InvalidQuery(format!(
                "cannot escape {other} as an identifier"
            ))),
        },
        (Operand::Value(value), EscapeMode::IdentifierSoft) => match value {
            Bson::String(s) => Ok(escape::identifier_soft(s)),
            other => Err(DbError::InvalidQuery(format!(
                "cannot escape {other} as an identifier"
            ))),
        },
        (Operand::Value(value), EscapeMode::None) => match value {
            Bson::String(s) => Ok(s.clone()),
            other => Ok(escape::literal(other)),
        },
    }
}
