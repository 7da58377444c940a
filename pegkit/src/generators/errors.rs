use thiserror::Error;

/// Error raised by a generator that cannot express a grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// An action's code block is not valid Rust
    #[error("Invalid code block in rule [{rule}]: {message}")]
    InvalidCode { rule: String, message: String },

    /// The preamble is not valid Rust
    #[error("Invalid preamble: {0}")]
    InvalidPreamble(String),

    /// A label can't be used as a Rust identifier
    #[error("Label [{0}] is not a valid identifier")]
    InvalidLabel(String),
}
