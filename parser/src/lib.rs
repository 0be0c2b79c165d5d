//! # PSL Parser
//!
//! Recursive-descent parser turning a token stream into a shared
//! [psl_ast::ParseTree]. Parsing is error-tolerant: a bad token is reported
//! and skipped rather than aborting, so one run surfaces every syntax error
//! in a file and the tree stays usable for whatever did parse.

mod parser;

pub use parser::parse;

#[cfg(test)]
mod tests;
