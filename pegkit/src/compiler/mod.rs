//! # Grammar Compiler
//!
//! This module contains the compiler, which turns PEG grammars into [`PegGrammar`] trees.
//!
//! The compiler is itself a parser built from the [combinator runtime](`crate::runtime`). Its output can then be
//! either [bound](`PegGrammar::bind`) to a set of [`Actions`] to get an executable parser, or handed to the
//! [generators](`crate::generators`).
//!
//! ```rust
//! use pegkit::compiler::{parse_peg, Actions};
//! use pegkit::runtime::{Extensions, RuntimeError, Value};
//!
//! let grammar = parse_peg(r#"
//!     Sum = left:Digit "+" right:Digit { sum }
//!     Digit = [0-9]
//! "#).unwrap();
//!
//! let actions = Actions::new().with("sum", |captures, _| {
//!     let digit = |name: &str| -> Result<i64, RuntimeError> {
//!         let text = captures.value(name)?.concat_text();
//!         text.parse().map_err(|_| RuntimeError::action("not a digit"))
//!     };
//!
//!     Ok(Value::Int(digit("left")? + digit("right")?))
//! });
//!
//! let parser = grammar.bind(&actions).unwrap();
//! assert_eq!(parser.parse("2+3", &Extensions::new()), Ok(Value::Int(5)));
//! ```

mod actions;
mod data;
mod errors;
mod lexical;
mod linker;
mod parser;
mod syntax;
pub(crate) mod utils;

pub use actions::*;
pub use data::*;
pub use errors::*;
pub use parser::{compile, parse_peg, CompileOptions, Compiled};
pub use utils::rule_symbol;
