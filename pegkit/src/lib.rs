//! # pegkit
//!
//! pegkit is a small PEG (Parsing Expression Grammar) compiler. It reads a grammar written in a compact textual
//! DSL and produces a backtracking parser for the language that grammar describes.
//!
//! It is made of two layers:
//!
//! * A [combinator runtime](`runtime`), with the primitives parsers are built from (character and literal
//!   matching, sequences, ordered choices, repetitions, lookaheads, captures, semantic actions and lazy rule
//!   references)
//! * A [grammar compiler](`compiler`), itself written with the runtime, which parses the DSL
//!
//! Compiled grammars can be [bound](`compiler::PegGrammar::bind`) to their actions to get a parser at runtime, or
//! turned into a standalone Rust module by the [generators](`generators`) (`rustgen` feature).
//!
//! ## Usage
//!
//! ```rust
//! use pegkit::compiler::{parse_peg, Actions};
//! use pegkit::runtime::{Extensions, ParseError, Value};
//!
//! // 1. Define the grammar
//! static GRAMMAR: &str = r#"
//! // Comma-separated list of words
//! List = first:Word rest:("," _ Word)* { list }
//! Word = $[a-z]+
//! _ = " "*
//! "#;
//!
//! // 2. Compile the grammar
//! let grammar = parse_peg(GRAMMAR).unwrap_or_else(|err| panic!("{}", err));
//!
//! // 3. Provide the code blocks' implementation
//! let actions = Actions::new().with("list", |captures, _| {
//!     let mut words = vec![captures.value("first")?.clone()];
//!
//!     for item in captures.value("rest")?.as_list().unwrap_or_default() {
//!         words.push(item.at(2));
//!     }
//!
//!     Ok(Value::List(words))
//! });
//!
//! // 4. Link the grammar to get a parser
//! let parser = grammar.bind(&actions).unwrap_or_else(|err| panic!("{}", err));
//!
//! // 5. Play with the parsed content!
//! assert_eq!(
//!     parser.parse("a, bc,d", &Extensions::new()),
//!     Ok(Value::List(vec!["a".into(), "bc".into(), "d".into()]))
//! );
//!
//! assert_eq!(parser.parse("a,", &Extensions::new()), Err(ParseError::Syntax));
//! ```

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]

pub mod compiler;
pub mod generators;
pub mod runtime;
