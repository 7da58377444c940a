//! # Generators
//!
//! This module contains generators for [already-compiled grammars](`super::compiler::parse_peg`).

mod errors;
pub mod peg;

#[cfg(feature = "rustgen")]
pub mod rust;

pub use errors::*;
pub use peg::gen_peg;

#[cfg(feature = "rustgen")]
pub use self::rust::*;
