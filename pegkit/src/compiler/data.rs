use crate::generators::peg::{gen_peg, gen_peg_expr};
use crate::runtime::Predicate;
use std::fmt;

/// Grammar compiled by [`parse_peg`](super::parse_peg)
///
/// Immutable once built: it can be [bound](PegGrammar::bind) to actions any number of times, or handed to
/// the [generators](crate::generators).
#[derive(Debug, Clone, PartialEq)]
pub struct PegGrammar {
    /// Verbatim content of the leading code block, without its braces
    pub(crate) preamble: Option<String>,

    /// Rules, in declaration order
    pub(crate) rules: Vec<PegRule>,

    /// Was a distributable module requested when compiling?
    pub(crate) module: bool,
}

impl PegGrammar {
    /// Get the preamble's content, if any
    pub fn preamble(&self) -> Option<&str> {
        self.preamble.as_deref()
    }

    /// Get the rules in declaration order
    pub fn rules(&self) -> &[PegRule] {
        &self.rules
    }

    /// Get the entry point (the first declared rule)
    pub fn entry(&self) -> &PegRule {
        // The grammar production requires at least one rule
        &self.rules[0]
    }

    /// Find a rule by name
    pub fn rule(&self, name: &str) -> Option<&PegRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Get the position of a rule in the declaration order
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name == name)
    }

    /// Was the grammar compiled with [module output](super::CompileOptions::module) requested?
    pub fn is_module(&self) -> bool {
        self.module
    }
}

impl fmt::Display for PegGrammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", gen_peg(self))
    }
}

/// A named grammar rule
#[derive(Debug, Clone, PartialEq)]
pub struct PegRule {
    pub(crate) name: String,
    pub(crate) expr: PegExpr,
}

impl PegRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &PegExpr {
        &self.expr
    }
}

/// Compiled expression of a rule
#[derive(Debug, Clone, PartialEq)]
pub enum PegExpr {
    /// `.`
    Any,

    /// `[...]`
    Class {
        predicates: Vec<Predicate>,
        negated: bool,
    },

    /// Quoted string
    Literal {
        /// Source text, quotes and escapes included
        raw: String,

        /// Text to match
        value: String,
    },

    /// Reference to a rule by name (resolved when the grammar is bound)
    Ref(String),

    Sequence(Vec<PegExpr>),

    /// Ordered choice (`/`)
    Choice(Vec<PegExpr>),

    /// `*`
    Many(Box<PegExpr>),

    /// `+`
    One(Box<PegExpr>),

    /// `?`
    Optional(Box<PegExpr>),

    /// `&`
    And(Box<PegExpr>),

    /// `!`
    Not(Box<PegExpr>),

    /// `$`
    Text(Box<PegExpr>),

    /// Expression followed by a `{ ... }` code block
    Action {
        expr: Box<PegExpr>,
        bindings: Bindings,

        /// Block content, without the outer braces
        code: String,
    },
}

impl fmt::Display for PegExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", gen_peg_expr(self))
    }
}

/// Names an action's code block can use to refer to captured values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bindings {
    None,

    /// A single labeled expression: the name is bound to the whole matched value
    Whole(String),

    /// A sequence: each name is bound to the value at the given position
    Positional(Vec<(String, usize)>),
}

impl Bindings {
    /// Get the bound names, in binding order
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::None => vec![],
            Self::Whole(name) => vec![name.as_str()],
            Self::Positional(names) => names.iter().map(|(name, _)| name.as_str()).collect(),
        }
    }
}
