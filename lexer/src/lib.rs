//! # PSL Lexer
//!
//! Turns pipeline-set description source text into a flat token stream.
//! Scanning never aborts: problems are reported through the logging
//! callback and the scanner continues so one run surfaces every error.

mod scanner;

pub use scanner::scan;

#[cfg(test)]
mod tests;
