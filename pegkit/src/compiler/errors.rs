use crate::generators::GeneratorError;
use crate::runtime::RuntimeError;
use thiserror::Error;

/// Error raised while compiling a grammar
#[derive(Debug, Error)]
pub enum CompileError {
    /// The grammar's source is not valid PEG
    #[error("Syntax error")]
    Syntax,

    /// Two rules were declared with the same name
    #[error("Another rule was already declared with the name [{0}]")]
    DuplicateRule(String),

    /// An action's expression binds the same label twice
    #[error("Label [{label}] is bound more than once in rule [{rule}]")]
    DuplicateLabel { rule: String, label: String },

    /// The compiler's own grammar raised a fault
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// A generator rejected the grammar
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// A module was requested but the crate was built without the `rustgen` feature
    #[error("Module output requires the 'rustgen' feature")]
    ModuleOutputUnavailable,
}

/// Error raised while [binding](super::PegGrammar::bind) a grammar to its actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A code block has no registered handler
    #[error("No action registered for code block {{{code}}} in rule [{rule}]")]
    MissingAction { rule: String, code: String },
}
