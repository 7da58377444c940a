//! Values threaded through the compiler's own grammar.

use super::data::{Bindings, PegExpr, PegGrammar, PegRule};
use crate::runtime::{NodeValue, Predicate, RuntimeError};

/// Value produced by the compiler's productions
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Syntax {
    Null,
    Text(String),
    List(Vec<Syntax>),
    Predicate(Predicate),
    Fragment(Fragment),
    Rule(PegRule),
    Grammar(PegGrammar),
}

impl NodeValue for Syntax {
    fn null() -> Self {
        Self::Null
    }

    fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    fn list(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl Syntax {
    pub fn into_text(self) -> Result<String, RuntimeError> {
        match self {
            Self::Text(text) => Ok(text),
            other => Err(unexpected("text", &other)),
        }
    }

    pub fn into_list(self) -> Result<Vec<Syntax>, RuntimeError> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(unexpected("list", &other)),
        }
    }

    pub fn into_predicate(self) -> Result<Predicate, RuntimeError> {
        match self {
            Self::Predicate(pred) => Ok(pred),
            other => Err(unexpected("predicate", &other)),
        }
    }

    pub fn into_fragment(self) -> Result<Fragment, RuntimeError> {
        match self {
            Self::Fragment(fragment) => Ok(fragment),
            other => Err(unexpected("expression", &other)),
        }
    }

    pub fn into_rule(self) -> Result<PegRule, RuntimeError> {
        match self {
            Self::Rule(rule) => Ok(rule),
            other => Err(unexpected("rule", &other)),
        }
    }

    /// Split a sequence's value into exactly `N` members
    pub fn into_members<const N: usize>(self) -> Result<[Syntax; N], RuntimeError> {
        let items = self.into_list()?;
        let len = items.len();

        let mut members = items.into_iter();
        let array = [(); N].map(|_| members.next().unwrap_or(Syntax::Null));

        if len == N {
            Ok(array)
        } else {
            Err(RuntimeError::action(format!(
                "expected a sequence of {} members, found {}",
                N, len
            )))
        }
    }
}

fn unexpected(expected: &str, found: &Syntax) -> RuntimeError {
    RuntimeError::action(format!("expected {}, found {:?}", expected, found))
}

/// A compiled expression, with the label information actions need
///
/// Labels only matter to the closest enclosing action: wrapping a fragment in a quantifier or a lookahead
/// drops them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fragment {
    pub expr: PegExpr,

    /// Set by `name:expr`
    pub label: Option<String>,

    /// Set by multi-member sequences: the label of each member, if any
    pub members: Option<Vec<Option<String>>>,
}

impl Fragment {
    /// A fragment without any label information
    pub fn plain(expr: PegExpr) -> Self {
        Self {
            expr,
            label: None,
            members: None,
        }
    }

    /// Compute the names an action on this fragment binds
    pub fn bindings(&self) -> Bindings {
        if let Some(label) = &self.label {
            return Bindings::Whole(label.clone());
        }

        let positional: Vec<_> = self
            .members
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(index, label)| label.as_ref().map(|label| (label.clone(), index)))
            .collect();

        if positional.is_empty() {
            Bindings::None
        } else {
            Bindings::Positional(positional)
        }
    }
}

impl From<PegExpr> for Syntax {
    fn from(expr: PegExpr) -> Self {
        Self::Fragment(Fragment::plain(expr))
    }
}
