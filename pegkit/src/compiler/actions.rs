use super::data::Bindings;
use crate::runtime::{Context, RuntimeError, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Function run when the expression of an action matched
pub type Handler =
    Arc<dyn Fn(&Captures, &Context<Value>) -> Result<Value, RuntimeError> + Send + Sync>;

/// Registry of the handlers a grammar's code blocks stand for
///
/// Each handler is registered under the text of its code block. Surrounding whitespace is ignored, so
/// `{ sum }` and `{sum}` refer to the same handler.
#[derive(Clone, Default)]
pub struct Actions {
    handlers: HashMap<String, Handler>,
}

impl Actions {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler (builder-style)
    pub fn with<F>(mut self, code: &str, handler: F) -> Self
    where
        F: Fn(&Captures, &Context<Value>) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.register(code, handler);
        self
    }

    /// Register a handler, replacing the previous one for the same code block
    pub fn register<F>(&mut self, code: &str, handler: F)
    where
        F: Fn(&Captures, &Context<Value>) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.handlers
            .insert(code.trim().to_string(), Arc::new(handler));
    }

    /// Get the handler registered for a code block
    pub fn get(&self, code: &str) -> Option<&Handler> {
        self.handlers.get(code.trim())
    }
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut codes: Vec<_> = self.handlers.keys().collect();
        codes.sort();

        f.debug_struct("Actions").field("handlers", &codes).finish()
    }
}

/// Values captured by an action's expression
pub struct Captures {
    node: Value,
    names: HashMap<String, Value>,
}

impl Captures {
    /// Bind the labels of an action to the matched value
    ///
    /// A single labeled expression binds its name to the whole value, while the labels of a sequence's members
    /// are bound to the values at their positions.
    pub fn new(node: Value, bindings: &Bindings) -> Self {
        let names = match bindings {
            Bindings::None => HashMap::new(),
            Bindings::Whole(name) => {
                let mut names = HashMap::new();
                names.insert(name.clone(), node.clone());
                names
            }
            Bindings::Positional(labels) => labels
                .iter()
                .map(|(name, index)| (name.clone(), node.at(*index)))
                .collect(),
        };

        Self { node, names }
    }

    /// Get the whole matched value
    pub fn node(&self) -> &Value {
        &self.node
    }

    /// Get the value bound to a label
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names.get(name)
    }

    /// Get the value bound to a label, failing the parse if there is none
    pub fn value(&self, name: &str) -> Result<&Value, RuntimeError> {
        self.get(name)
            .ok_or_else(|| RuntimeError::action(format!("no value is labeled [{}]", name)))
    }
}
