use thiserror::Error;

/// Fatal fault raised while running a parser
///
/// Unlike a failed match, which is recovered from by the enclosing combinator, a fault aborts the whole parse:
/// retrying another alternative cannot fix it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A reference to a rule that was never declared was invoked
    #[error("Rule [{0}] was not found")]
    UnresolvedRule(String),

    /// A reference pointed past the end of the rule set
    #[error("Rule #{0} does not exist in this rule set")]
    MissingRule(usize),

    /// A semantic action gave up
    #[error("Semantic action failed: {0}")]
    Action(String),
}

impl RuntimeError {
    /// Create an error for a failing semantic action
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action(message.into())
    }
}

/// Error returned by the [top-level driver](super::RuleSet::parse)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The entry rule did not match, or did not consume the whole input
    #[error("Syntax error")]
    Syntax,

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
