//! # PSL Abstract Syntax Tree
//!
//! Parse tree built by the parser and consumed by the state resolver. Every
//! render-state field is optional here; values become concrete only after
//! inheritance chains are merged and defaults applied.

mod tree;

pub use tree::*;
