//! # Combinator Runtime
//!
//! Building blocks for backtracking PEG parsers. Expressions are built with the constructor functions
//! ([`any`], [`string`], [`sequence`], [`choice`], ...) and executed against a [`Context`].
//!
//! A failed match is not an error: it is `Ok(None)`, and the enclosing combinator restores the cursor before
//! trying something else. Only faults that retrying cannot fix (unresolved rules, failing actions) use the
//! error channel.
//!
//! ```rust
//! use pegkit::runtime::*;
//!
//! // number = [0-9]+
//! let rules: RuleSet<Value> = parser(vec![Rule::new(
//!     "number",
//!     text(one(char_class(vec![between('0', '9')], false))),
//! )]);
//!
//! assert_eq!(rules.parse("42", &Extensions::new()), Ok(Value::from("42")));
//! assert_eq!(rules.parse("42a", &Extensions::new()), Err(ParseError::Syntax));
//! ```

mod combinators;
mod data;
mod errors;
mod executor;

pub use combinators::*;
pub use data::*;
pub use errors::*;
pub use executor::*;
