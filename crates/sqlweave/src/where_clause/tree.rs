use super::op::{Op, Quantifier};
use crate::value::Value;

/// Logical combinator keys of a where tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    And,
    Or,
    Not,
}

impl Combinator {
    /// JSON key (`"$and"`, ...) of the combinator.
    pub fn key(self) -> &'static str {
        match self {
            Combinator::And => "$and",
            Combinator::Or => "$or",
            Combinator::Not => "$not",
        }
    }

    pub fn from_key(key: &str) -> Option<Combinator> {
        match key {
            "$and" => Some(Combinator::And),
            "$or" => Some(Combinator::Or),
            "$not" => Some(Combinator::Not),
            _ => None,
        }
    }
}

/// Joining operator for sibling results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub(crate) fn separator(self) -> &'static str {
        match self {
            Logic::And => " AND ",
            Logic::Or => " OR ",
        }
    }
}

/// A boolean where tree.
///
/// # Example
/// ```ignore
/// use sqlweave::where_clause::{Op, Predicate, Where};
///
/// // (status = 'active' AND (age >= 18 OR role = 'admin'))
/// let tree = Where::all([
///     Where::eq("status", "active"),
///     Where::or([
///         Where::leaf("age", Predicate::op(Op::Gte, 18)),
///         Where::eq("role", "admin"),
///     ]),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// Each element is compiled on its own, then the results are joined with
    /// the enclosing operator (`AND` unless inside `$or`).
    Sequence(Vec<Where>),
    /// Entries of a key/value mapping, joined with the enclosing operator.
    Group(Vec<Where>),
    /// `$and`, `$or` or `$not` applied to a subtree.
    Combinator(Combinator, Box<Where>),
    /// An attribute compared against a predicate.
    Leaf(String, Predicate),
    /// Pre-built SQL, handed straight to the part handler.
    Fragment(Fragment),
}

impl Default for Where {
    fn default() -> Self {
        Where::Group(Vec::new())
    }
}

impl Where {
    /// A tree that compiles to nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn leaf(attribute: impl Into<String>, predicate: impl Into<Predicate>) -> Self {
        Where::Leaf(attribute.into(), predicate.into())
    }

    /// `attribute = value` (or `IS NULL` / `IN (...)`, depending on the value).
    pub fn eq(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Where::Leaf(attribute.into(), Predicate::Value(value.into()))
    }

    /// Mapping of attribute leaves and combinators.
    pub fn group(entries: impl IntoIterator<Item = Where>) -> Self {
        Where::Group(entries.into_iter().collect())
    }

    /// `$and: [...]`
    pub fn all(items: impl IntoIterator<Item = Where>) -> Self {
        Where::Combinator(Combinator::And, Box::new(Where::Sequence(items.into_iter().collect())))
    }

    /// `$or: [...]`
    pub fn or(items: impl IntoIterator<Item = Where>) -> Self {
        Where::Combinator(Combinator::Or, Box::new(Where::Sequence(items.into_iter().collect())))
    }

    /// `$not: inner`
    pub fn not(inner: Where) -> Self {
        Where::Combinator(Combinator::Not, Box::new(inner))
    }

    /// Raw SQL fragment.
    pub fn literal(sql: impl Into<String>) -> Self {
        Where::Fragment(Fragment::Literal(sql.into()))
    }

    /// Whether the tree contains no leaves or fragments at all.
    pub fn is_vacuous(&self) -> bool {
        match self {
            Where::Sequence(items) | Where::Group(items) => items.iter().all(Where::is_vacuous),
            Where::Combinator(_, inner) => inner.is_vacuous(),
            Where::Leaf(..) | Where::Fragment(_) => false,
        }
    }
}

/// Pre-built SQL accepted anywhere in a where tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Raw SQL, inserted verbatim.
    Literal(String),
    /// `left op right` over arbitrary operands, e.g. `lower(name) = 'bob'`.
    Compare { left: Value, op: Op, right: Value },
}

/// Right-hand side of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Operator chosen from the value: lists mean `IN`, null means `IS`, otherwise `=`.
    Value(Value),
    Op(Op, Value),
    /// `op ANY (...)` / `op ALL (...)`. A list renders as a `VALUES` table.
    Quantified(Op, Quantifier, Value),
    /// Every nested predicate holds.
    All(Vec<Predicate>),
    /// At least one nested predicate holds.
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn op(op: Op, value: impl Into<Value>) -> Self {
        Predicate::Op(op, value.into())
    }

    pub fn any_of(op: Op, values: impl Into<Value>) -> Self {
        Predicate::Quantified(op, Quantifier::Any, values.into())
    }

    pub fn all_of(op: Op, values: impl Into<Value>) -> Self {
        Predicate::Quantified(op, Quantifier::All, values.into())
    }

    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }
}

impl From<Value> for Predicate {
    fn from(value: Value) -> Self {
        Predicate::Value(value)
    }
}

impl From<(Op, Value)> for Predicate {
    fn from((op, value): (Op, Value)) -> Self {
        Predicate::Op(op, value)
    }
}
