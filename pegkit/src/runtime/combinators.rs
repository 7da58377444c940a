use super::errors::RuntimeError;
use super::executor::{Context, Rule, RuleSet};
use std::fmt;
use std::sync::Arc;

/// Semantic action attached to an expression with [`action`]
///
/// Receives the matched value and the parsing context (read-only), and returns the value to use instead.
pub type Mapper<V> = Arc<dyn Fn(V, &Context<V>) -> Result<V, RuntimeError> + Send + Sync>;

/// Single-character test used by [`char_class`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Exact match
    Equal(char),

    /// Inclusive range
    Between(char, char),
}

impl Predicate {
    /// Check if a character satisfies the predicate
    pub fn test(self, c: char) -> bool {
        match self {
            Self::Equal(expected) => c == expected,
            Self::Between(min, max) => c >= min && c <= max,
        }
    }
}

/// Target of a rule reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleRef {
    /// Index in the [rule set](RuleSet)
    Index(usize),

    /// Name that did not match any declared rule when the grammar was linked
    Unresolved(String),
}

/// A parsing expression
///
/// Expressions are built with the constructor functions of this module and run with [`Expr::parse`].
pub enum Expr<V> {
    Any,
    Char {
        predicates: Vec<Predicate>,
        negated: bool,
    },
    Literal(String),
    Sequence(Vec<Expr<V>>),
    Choice(Vec<Expr<V>>),
    Many(Box<Expr<V>>),
    One(Box<Expr<V>>),
    Text(Box<Expr<V>>),
    Optional(Box<Expr<V>>),
    And(Box<Expr<V>>),
    Not(Box<Expr<V>>),
    Action(Box<Expr<V>>, Mapper<V>),
    Ref(RuleRef),
}

// Actions are shared, so cloning never requires the values to be cloneable
impl<V> Clone for Expr<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Any => Self::Any,
            Self::Char {
                predicates,
                negated,
            } => Self::Char {
                predicates: predicates.clone(),
                negated: *negated,
            },
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Sequence(exprs) => Self::Sequence(exprs.clone()),
            Self::Choice(exprs) => Self::Choice(exprs.clone()),
            Self::Many(expr) => Self::Many(expr.clone()),
            Self::One(expr) => Self::One(expr.clone()),
            Self::Text(expr) => Self::Text(expr.clone()),
            Self::Optional(expr) => Self::Optional(expr.clone()),
            Self::And(expr) => Self::And(expr.clone()),
            Self::Not(expr) => Self::Not(expr.clone()),
            Self::Action(expr, mapper) => Self::Action(expr.clone(), Arc::clone(mapper)),
            Self::Ref(target) => Self::Ref(target.clone()),
        }
    }
}

impl<V> fmt::Debug for Expr<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Any => write!(f, "Any"),
            Self::Char {
                predicates,
                negated,
            } => f
                .debug_struct("Char")
                .field("predicates", predicates)
                .field("negated", negated)
                .finish(),
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Sequence(exprs) => f.debug_tuple("Sequence").field(exprs).finish(),
            Self::Choice(exprs) => f.debug_tuple("Choice").field(exprs).finish(),
            Self::Many(expr) => f.debug_tuple("Many").field(expr).finish(),
            Self::One(expr) => f.debug_tuple("One").field(expr).finish(),
            Self::Text(expr) => f.debug_tuple("Text").field(expr).finish(),
            Self::Optional(expr) => f.debug_tuple("Optional").field(expr).finish(),
            Self::And(expr) => f.debug_tuple("And").field(expr).finish(),
            Self::Not(expr) => f.debug_tuple("Not").field(expr).finish(),
            Self::Action(expr, _) => f.debug_tuple("Action").field(expr).finish(),
            Self::Ref(target) => f.debug_tuple("Ref").field(target).finish(),
        }
    }
}

/// Match any single character
pub fn any<V>() -> Expr<V> {
    Expr::Any
}

/// Predicate matching exactly one character
pub fn equal(value: char) -> Predicate {
    Predicate::Equal(value)
}

/// Predicate matching an inclusive range of characters
pub fn between(min: char, max: char) -> Predicate {
    Predicate::Between(min, max)
}

/// Match a single character satisfying any of the predicates (or none of them, if `negated` is set)
///
/// Fails at the end of input in both modes.
pub fn char_class<V>(predicates: Vec<Predicate>, negated: bool) -> Expr<V> {
    Expr::Char {
        predicates,
        negated,
    }
}

/// Match a literal string
pub fn string<V>(value: impl Into<String>) -> Expr<V> {
    Expr::Literal(value.into())
}

/// Match all expressions in order
pub fn sequence<V>(exprs: Vec<Expr<V>>) -> Expr<V> {
    Expr::Sequence(exprs)
}

/// Match the first expression that succeeds, in declaration order
pub fn choice<V>(exprs: Vec<Expr<V>>) -> Expr<V> {
    Expr::Choice(exprs)
}

/// Match an expression zero or more times
pub fn many<V>(expr: Expr<V>) -> Expr<V> {
    Expr::Many(Box::new(expr))
}

/// Match an expression one or more times
pub fn one<V>(expr: Expr<V>) -> Expr<V> {
    Expr::One(Box::new(expr))
}

/// Match an expression and produce the exact text it consumed
pub fn text<V>(expr: Expr<V>) -> Expr<V> {
    Expr::Text(Box::new(expr))
}

/// Match an expression, or nothing
pub fn optional<V>(expr: Expr<V>) -> Expr<V> {
    Expr::Optional(Box::new(expr))
}

/// Positive lookahead (never consumes input)
pub fn and<V>(expr: Expr<V>) -> Expr<V> {
    Expr::And(Box::new(expr))
}

/// Negative lookahead (never consumes input)
pub fn not<V>(expr: Expr<V>) -> Expr<V> {
    Expr::Not(Box::new(expr))
}

/// Replace the value of a successful match
pub fn action<V, F>(expr: Expr<V>, mapper: F) -> Expr<V>
where
    F: Fn(V, &Context<V>) -> Result<V, RuntimeError> + Send + Sync + 'static,
{
    Expr::Action(Box::new(expr), Arc::new(mapper))
}

/// Refer to the rule at the given index of the rule set
///
/// The rule is looked up only when the reference runs, so rules may refer to themselves or to rules declared later.
pub fn reference<V>(index: usize) -> Expr<V> {
    Expr::Ref(RuleRef::Index(index))
}

/// Refer to a rule that does not exist
///
/// Running this expression raises [`RuntimeError::UnresolvedRule`].
pub fn unresolved<V>(name: impl Into<String>) -> Expr<V> {
    Expr::Ref(RuleRef::Unresolved(name.into()))
}

/// Build the top-level driver for a list of rules, the first one being the entry point
pub fn parser<V>(rules: Vec<Rule<V>>) -> RuleSet<V> {
    RuleSet::new(rules)
}
