use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::operator::Operator;

/// AND/OR combinator of a [`Scope`].
///
/// Only meaningful when the scope holds more than one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Junction {
    And,
    Or,
}

impl Junction {
    pub fn flipped(self) -> Junction {
        match self {
            Junction::And => Junction::Or,
            Junction::Or => Junction::And,
        }
    }

    /// The lowercase word used by `to_words` and the SQL renderer.
    pub fn word(self) -> &'static str {
        match self {
            Junction::And => "and",
            Junction::Or => "or",
        }
    }
}

/// A node of the condition tree: a leaf [`Condition`] or a compound
/// [`Scope`]. Both sides carry the same capability set — negate,
/// simplify, render to words — so a node substitutes for either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeNode {
    Condition(Condition),
    Scope(Scope),
}

impl ScopeNode {
    /// A node is compound when it joins more than one child.
    pub fn is_compound(&self) -> bool {
        match self {
            ScopeNode::Condition(_) => false,
            ScopeNode::Scope(scope) => scope.is_compound(),
        }
    }

    /// De Morgan negation of the subtree rooted here.
    pub fn negated(&self) -> ScopeNode {
        match self {
            ScopeNode::Condition(cond) => ScopeNode::Condition(cond.negated()),
            ScopeNode::Scope(scope) => ScopeNode::Scope(scope.negated()),
        }
    }

    /// Collapse single-child scopes, recursively. A condition simplifies
    /// to itself.
    pub fn simplify(&self) -> ScopeNode {
        match self {
            ScopeNode::Condition(_) => self.clone(),
            ScopeNode::Scope(scope) => scope.simplify(),
        }
    }

    pub fn to_words(&self) -> String {
        match self {
            ScopeNode::Condition(cond) => cond.to_words(),
            ScopeNode::Scope(scope) => scope.to_words(),
        }
    }
}

impl From<Condition> for ScopeNode {
    fn from(cond: Condition) -> Self {
        ScopeNode::Condition(cond)
    }
}

impl From<Scope> for ScopeNode {
    fn from(scope: Scope) -> Self {
        ScopeNode::Scope(scope)
    }
}

/// `(field, value)` shorthand for an equality condition. Equality accepts
/// every value shape, so this normalization cannot fail.
impl<F: Into<String>, V: Into<Bson>> From<(F, V)> for ScopeNode {
    fn from((field, value): (F, V)) -> Self {
        ScopeNode::Condition(Condition {
            field: field.into(),
            operator: Operator::Eq,
            value: value.into(),
        })
    }
}

/// A compound boolean node joining child conditions with AND/OR.
///
/// Mutable while being built (`add`), read-only during evaluation. Cloning
/// deep-copies the whole subtree; there is no shared state between a clone
/// and its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub junction: Junction,
    pub children: Vec<ScopeNode>,
}

impl Scope {
    pub fn new(junction: Junction) -> Scope {
        Scope {
            junction,
            children: Vec::new(),
        }
    }

    /// An AND scope over the given nodes.
    pub fn all<I, N>(items: I) -> Scope
    where
        I: IntoIterator<Item = N>,
        N: Into<ScopeNode>,
    {
        Scope {
            junction: Junction::And,
            children: items.into_iter().map(Into::into).collect(),
        }
    }

    /// An OR scope over the given nodes.
    pub fn any<I, N>(items: I) -> Scope
    where
        I: IntoIterator<Item = N>,
        N: Into<ScopeNode>,
    {
        Scope {
            junction: Junction::Or,
            children: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Append one child. Construction-time mutability only; callers must
    /// not append while an evaluation is in flight.
    pub fn add(&mut self, node: impl Into<ScopeNode>) -> &mut Scope {
        self.children.push(node.into());
        self
    }

    /// Drop every child in place, expressing "no constraint" without
    /// rebuilding the object.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_compound(&self) -> bool {
        self.children.len() > 1
    }

    /// De Morgan: flip the junction, negate every child. Applying twice
    /// yields the original tree.
    pub fn negated(&self) -> Scope {
        Scope {
            junction: self.junction.flipped(),
            children: self.children.iter().map(ScopeNode::negated).collect(),
        }
    }

    /// A scope with exactly one child collapses to that child's own
    /// simplification; anything else keeps its shape with simplified
    /// children.
    pub fn simplify(&self) -> ScopeNode {
        if self.children.len() == 1 {
            return self.children[0].simplify();
        }
        ScopeNode::Scope(Scope {
            junction: self.junction,
            children: self.children.iter().map(ScopeNode::simplify).collect(),
        })
    }

    /// Deterministic human-readable boolean expression. A compound child
    /// is parenthesized only when the parent is compound too.
    pub fn to_words(&self) -> String {
        let compound = self.is_compound();
        let parts: Vec<String> = self
            .children
            .iter()
            .map(|child| {
                let words = child.to_words();
                if compound && child.is_compound() {
                    format!("({words})")
                } else {
                    words
                }
            })
            .collect();
        parts.join(&format!(" {} ", self.junction.word()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::bson;

    fn cond(field: &str, op: Operator, value: impl Into<Bson>) -> Condition {
        Condition::new(field, op, value).unwrap()
    }

    #[test]
    fn shorthand_tuples_normalize_to_equality() {
        let scope = Scope::any([("a", 1), ("b", 1)]);
        assert_eq!(scope.to_words(), "a = 1 or b = 1");
    }

    #[test]
    fn compound_child_of_compound_parent_is_parenthesized() {
        let inner = Scope::any([("a", 1), ("b", 1)]);
        let outer = Scope::all([
            ScopeNode::from(inner),
            ScopeNode::from(("c", 2)),
        ]);
        assert_eq!(outer.to_words(), "(a = 1 or b = 1) and c = 2");
    }

    #[test]
    fn single_child_parent_adds_no_parentheses() {
        let inner = Scope::any([("a", 1), ("b", 1)]);
        let outer = Scope::all([ScopeNode::from(inner)]);
        assert_eq!(outer.to_words(), "a = 1 or b = 1");
    }

    #[test]
    fn empty_scope_renders_empty() {
        assert_eq!(Scope::new(Junction::And).to_words(), "");
    }

    #[test]
    fn negation_flips_junction_and_children() {
        let scope = Scope::all([
            ScopeNode::from(cond("a", Operator::Gt, 5)),
            ScopeNode::from(cond("b", Operator::Like, "x%")),
        ]);
        let neg = scope.negated();
        assert_eq!(neg.junction, Junction::Or);
        assert_eq!(neg.to_words(), "a <= 5 or b not like 'x%'");
    }

    #[test]
    fn double_negation_is_identity() {
        let scope = Scope::any([
            ScopeNode::from(cond("a", Operator::In, bson!([1, 2]))),
            ScopeNode::from(Scope::all([("b", 1), ("c", 2)])),
        ]);
        assert_eq!(scope.negated().negated(), scope);
    }

    #[test]
    fn simplify_collapses_single_child_chains() {
        let leaf = cond("a", Operator::Eq, 1);
        let inner = Scope::all([ScopeNode::from(leaf.clone())]);
        let outer = Scope::any([ScopeNode::from(inner)]);
        assert_eq!(outer.simplify(), ScopeNode::Condition(leaf));
    }

    #[test]
    fn simplify_keeps_compound_shape() {
        let scope = Scope::all([("a", 1), ("b", 2)]);
        let simplified = scope.simplify();
        assert!(matches!(simplified, ScopeNode::Scope(s) if s.is_compound()));
    }

    #[test]
    fn clear_empties_in_place() {
        let mut scope = Scope::all([("a", 1), ("b", 2)]);
        assert!(scope.is_compound());
        scope.clear();
        assert!(scope.is_empty());
        assert!(!scope.is_compound());
    }

    #[test]
    fn add_appends_in_declaration_order() {
        let mut scope = Scope::new(Junction::Or);
        scope.add(("a", 1));
        scope.add(cond("b", Operator::Gt, 2));
        assert_eq!(scope.to_words(), "a = 1 or b > 2");
    }

    #[test]
    fn tree_round_trips_through_serde() {
        let scope = Scope::all([
            ScopeNode::from(cond("a", Operator::Gte, 5)),
            ScopeNode::from(Scope::any([
                ScopeNode::from(("b", "x")),
                ScopeNode::from(("c", 2)),
            ])),
        ]);
        let json = serde_json::to_string(&scope).unwrap();
        let back: Scope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scope);
    }
}
