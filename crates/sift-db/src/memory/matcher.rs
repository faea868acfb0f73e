use std::cmp::Ordering;

use bson::{Bson, Document};
use regex::{Regex, RegexBuilder};
use sift_query::{Condition, ConditionError, FieldResolver, Junction, Operator, Scope, ScopeNode};

use crate::error::DbError;

use super::eval;

/// A condition tree compiled for row matching: fields resolved, values
/// encoded, patterns compiled. Compilation happens once per query;
/// matching is infallible per row.
#[derive(Debug)]
pub enum Matcher {
    /// AND over children. Every child is evaluated on every row — no
    /// short-circuit — because condition evaluation order is observable
    /// for value sources with side effects.
    All(Vec<Matcher>),
    /// OR over children; stops at the first hit.
    Any(Vec<Matcher>),
    /// `=` / `!=` with a scalar value.
    Eq {
        column: String,
        value: Bson,
        negate: bool,
    },
    /// Ordering comparison.
    Cmp {
        column: String,
        predicate: fn(Ordering) -> bool,
        value: Bson,
    },
    /// `in` / `not in`, and the list form of `=` / `!=`.
    InList {
        column: String,
        values: Vec<Bson>,
        negate: bool,
    },
    /// `like` / `not like` / `regexp` / `not regexp`, compiled.
    Pattern {
        column: String,
        regex: Regex,
        negate: bool,
    },
    /// Test-only probe recording whether it was evaluated.
    #[cfg(test)]
    Probe {
        hits: std::rc::Rc<std::cell::Cell<usize>>,
        result: bool,
    },
}

/// Compile a node of the shared condition tree.
pub fn compile(node: &ScopeNode, resolver: &dyn FieldResolver) -> Result<Matcher, DbError> {
    match node {
        ScopeNode::Condition(cond) => compile_condition(cond, resolver),
        ScopeNode::Scope(scope) => compile_scope(scope, resolver),
    }
}

pub(crate) fn compile_scope(
    scope: &Scope,
    resolver: &dyn FieldResolver,
) -> Result<Matcher, DbError> {
    let children: Vec<Matcher> = scope
        .children
        .iter()
        .map(|child| compile(child, resolver))
        .collect::<Result<_, _>>()?;
    Ok(match scope.junction {
        Junction::And => Matcher::All(children),
        Junction::Or => Matcher::Any(children),
    })
}

fn compile_condition(cond: &Condition, resolver: &dyn FieldResolver) -> Result<Matcher, DbError> {
    let column = resolver
        .resolve(&cond.field)
        .ok_or_else(|| DbError::UnresolvedField(cond.field.clone()))?;
    let value = if cond.operator.skips_encoding() {
        cond.value.clone()
    } else {
        resolver.encode(&cond.field, cond.value.clone())
    };

    if let Bson::Array(items) = value {
        // The list form of `=`/`!=` evaluates as `in`/`not in`; the
        // condition itself keeps its spelling.
        if !cond.operator.accepts_list() {
            return Err(DbError::Condition(ConditionError::IncompatibleValue {
                operator: cond.operator,
                detail: "list value is not allowed".into(),
            }));
        }
        return Ok(Matcher::InList {
            column,
            values: items,
            negate: matches!(cond.operator, Operator::Ne | Operator::NotIn),
        });
    }
    if cond.operator.wants_list() {
        return Err(DbError::Condition(ConditionError::IncompatibleValue {
            operator: cond.operator,
            detail: "expected a list value".into(),
        }));
    }

    let matcher = match cond.operator {
        Operator::Eq | Operator::Ne => Matcher::Eq {
            column,
            value,
            negate: cond.operator == Operator::Ne,
        },
        Operator::Gt => Matcher::Cmp {
            column,
            predicate: |o| o == Ordering::Greater,
            value,
        },
        Operator::Gte => Matcher::Cmp {
            column,
            predicate: |o| o != Ordering::Less,
            value,
        },
        Operator::Lt => Matcher::Cmp {
            column,
            predicate: |o| o == Ordering::Less,
            value,
        },
        Operator::Lte => Matcher::Cmp {
            column,
            predicate: |o| o != Ordering::Greater,
            value,
        },
        Operator::Like | Operator::NotLike => Matcher::Pattern {
            column,
            regex: like_regex(&value)?,
            negate: cond.operator == Operator::NotLike,
        },
        Operator::Regex | Operator::NotRegex => Matcher::Pattern {
            column,
            regex: body_regex(&value)?,
            negate: cond.operator == Operator::NotRegex,
        },
        // List operators were handled above.
        Operator::In | Operator::NotIn => unreachable!("list shape validated"),
    };
    Ok(matcher)
}

/// SQL wildcard pattern → anchored case-insensitive regex: `%` becomes
/// a lazy any-run, everything else is literal.
fn like_regex(value: &Bson) -> Result<Regex, DbError> {
    let pattern = match value {
        Bson::String(s) => s,
        other => {
            return Err(DbError::InvalidQuery(format!(
                "like pattern must be a string, got {other}"
            )));
        }
    };
    let body = regex::escape(pattern).replace('%', ".*?");
    Ok(RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .build()?)
}

/// The raw value is the regex body, matched unanchored.
fn body_regex(value: &Bson) -> Result<Regex, DbError> {
    let body = match value {
        Bson::String(s) => s,
        other => {
            return Err(DbError::InvalidQuery(format!(
                "regexp pattern must be a string, got {other}"
            )));
        }
    };
    Ok(RegexBuilder::new(body).build()?)
}

impl Matcher {
    pub fn matches(&self, row: &Document) -> bool {
        match self {
            Matcher::All(children) => {
                // Deliberately evaluates every child before combining;
                // see the enum docs.
                let mut all = true;
                for child in children {
                    if !child.matches(row) {
                        all = false;
                    }
                }
                all
            }
            Matcher::Any(children) => children.iter().any(|child| child.matches(row)),
            Matcher::Eq {
                column,
                value,
                negate,
            } => {
                let hit = match eval::get_path(row, column) {
                    // Null query value matches missing/null fields.
                    None => matches!(value, Bson::Null),
                    Some(stored) => eval::value_eq(stored, value),
                };
                hit != *negate
            }
            Matcher::Cmp {
                column,
                predicate,
                value,
            } => eval::value_cmp(eval::get_path(row, column), value, *predicate),
            Matcher::InList {
                column,
                values,
                negate,
            } => {
                // The empty list matches nothing, so its negation
                // matches everything — same tautology the SQL renderer
                // emits.
                let hit = match eval::get_path(row, column) {
                    None => values.iter().any(|v| matches!(v, Bson::Null)),
                    Some(stored) => values.iter().any(|v| eval::value_eq(stored, v)),
                };
                hit != *negate
            }
            Matcher::Pattern {
                column,
                regex,
                negate,
            } => {
                let hit = eval::get_path(row, column)
                    .and_then(eval::value_text)
                    .is_some_and(|text| regex.is_match(&text));
                hit != *negate
            }
            #[cfg(test)]
            Matcher::Probe { hits, result } => {
                hits.set(hits.get() + 1);
                *result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{bson, doc};
    use sift_query::IdentityResolver;
    use std::cell::Cell;
    use std::rc::Rc;

    fn matcher(cond: Condition) -> Matcher {
        compile(&ScopeNode::Condition(cond), &IdentityResolver).unwrap()
    }

    #[test]
    fn like_translates_wildcards_only() {
        let m = matcher(Condition::new("name", Operator::Like, "a%c").unwrap());
        assert!(m.matches(&doc! { "name": "abc" }));
        assert!(m.matches(&doc! { "name": "ac" }));
        assert!(m.matches(&doc! { "name": "AbC" })); // case-insensitive
        assert!(!m.matches(&doc! { "name": "abd" }));
        // The pattern is anchored over the full string.
        assert!(!m.matches(&doc! { "name": "xabc" }));
    }

    #[test]
    fn like_escapes_regex_metacharacters() {
        let m = matcher(Condition::new("code", Operator::Like, "a.b%").unwrap());
        assert!(m.matches(&doc! { "code": "a.b123" }));
        assert!(!m.matches(&doc! { "code": "aXb123" }));
    }

    #[test]
    fn like_matches_numbers_through_their_text_form() {
        let m = matcher(Condition::new("zip", Operator::Like, "78%").unwrap());
        assert!(m.matches(&doc! { "zip": 78701_i32 }));
        assert!(!m.matches(&doc! { "zip": 90210_i32 }));
    }

    #[test]
    fn regexp_matches_unanchored() {
        let m = matcher(Condition::new("name", Operator::Regex, "^A").unwrap());
        assert!(m.matches(&doc! { "name": "Ada" }));
        assert!(!m.matches(&doc! { "name": "Grace" }));

        let m = matcher(Condition::new("name", Operator::NotRegex, "^A").unwrap());
        assert!(!m.matches(&doc! { "name": "Ada" }));
        assert!(m.matches(&doc! { "name": "Grace" }));
    }

    #[test]
    fn invalid_regexp_fails_at_compile_time() {
        let cond = Condition::new("name", Operator::Regex, "[oops").unwrap();
        let err = compile(&ScopeNode::Condition(cond), &IdentityResolver).unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery(_)));
    }

    #[test]
    fn eq_with_null_matches_missing_and_null() {
        let m = matcher(Condition::new("gone", Operator::Eq, Bson::Null).unwrap());
        assert!(m.matches(&doc! { "other": 1 }));
        assert!(m.matches(&doc! { "gone": Bson::Null }));
        assert!(!m.matches(&doc! { "gone": 0 }));
    }

    #[test]
    fn eq_list_value_behaves_as_in() {
        let m = matcher(Condition::new("id", Operator::Eq, bson!([1, 3])).unwrap());
        assert!(m.matches(&doc! { "id": 3 }));
        assert!(!m.matches(&doc! { "id": 2 }));
    }

    #[test]
    fn empty_in_matches_nothing_and_not_in_everything() {
        let m = matcher(Condition::new("id", Operator::In, bson!([])).unwrap());
        assert!(!m.matches(&doc! { "id": 1 }));

        let m = matcher(Condition::new("id", Operator::NotIn, bson!([])).unwrap());
        assert!(m.matches(&doc! { "id": 1 }));
    }

    #[test]
    fn unresolved_field_fails_at_compile_time() {
        let cond = Condition::new("nope", Operator::Eq, 1).unwrap();
        let err = compile(&ScopeNode::Condition(cond), &sift_query::FieldMap::new()).unwrap_err();
        assert!(matches!(err, DbError::UnresolvedField(f) if f == "nope"));
    }

    // The AND/OR evaluation asymmetry is intentional and observable:
    // AND computes every child even when an early one is already false,
    // OR stops at the first true child. Do not "fix" the AND branch.
    #[test]
    fn and_evaluates_every_child() {
        let hits = Rc::new(Cell::new(0));
        let m = Matcher::All(vec![
            Matcher::Probe {
                hits: hits.clone(),
                result: false,
            },
            Matcher::Probe {
                hits: hits.clone(),
                result: true,
            },
            Matcher::Probe {
                hits: hits.clone(),
                result: true,
            },
        ]);
        assert!(!m.matches(&doc! {}));
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn or_short_circuits_on_the_first_hit() {
        let hits = Rc::new(Cell::new(0));
        let m = Matcher::Any(vec![
            Matcher::Probe {
                hits: hits.clone(),
                result: true,
            },
            Matcher::Probe {
                hits: hits.clone(),
                result: true,
            },
        ]);
        assert!(m.matches(&doc! {}));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn negated_scope_inverts_row_matches() {
        let scope = Scope::all([
            ScopeNode::Condition(Condition::new("a", Operator::Gt, 5).unwrap()),
            ScopeNode::Condition(Condition::new("b", Operator::Like, "x%").unwrap()),
        ]);
        let m = compile_scope(&scope, &IdentityResolver).unwrap();
        let n = compile_scope(&scope.negated(), &IdentityResolver).unwrap();
        for row in [
            doc! { "a": 6, "b": "xy" },
            doc! { "a": 6, "b": "zy" },
            doc! { "a": 3, "b": "xy" },
            doc! { "a": 3, "b": "zy" },
        ] {
            assert_ne!(m.matches(&row), n.matches(&row), "{row:?}");
        }
    }
}
