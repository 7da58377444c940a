use std::collections::HashMap;
use std::fmt;

/// Value produced by a [parser](super::Expr)
///
/// Combinators only build three shapes by themselves: the empty value, a piece of text and an ordered
/// sequence of values. Anything else comes from [semantic actions](super::action).
pub trait NodeValue: Sized {
    /// Empty, no-value success (optional members that did not match, lookaheads)
    fn null() -> Self;

    /// Matched or captured text
    fn text(text: &str) -> Self;

    /// Ordered composition of sub-values (sequences, repetitions)
    fn list(items: Vec<Self>) -> Self;
}

/// Caller-supplied fields, visible to semantic actions through the [`Context`](super::Context)
pub type Extensions<V> = HashMap<String, V>;

/// Value type of grammars compiled from PEG source
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    List(Vec<Value>),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Is this the empty value?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Get the value as a float (integers are converted)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Get a copy of the n-th item of a list
    ///
    /// Returns [`Value::Null`] if the value is not a list or the index is out of bounds.
    pub fn at(&self, index: usize) -> Value {
        self.as_list()
            .and_then(|items| items.get(index))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Concatenate all text found in the value, depth-first
    ///
    /// Handy for repetitions of single characters, e.g. `["4", "2"]` gives `"42"`.
    pub fn concat_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::List(items) => items.iter().for_each(|item| item.collect_text(out)),
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) => {}
        }
    }
}

impl NodeValue for Value {
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

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Text(text) => write!(f, "{:?}", text),
            Self::List(items) => write!(
                f,
                "[{}]",
                items
                    .iter()
                    .map(|item| item.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
