//! # PSL Text
//!
//! Support for managing source text, diagnostics and tokens

mod keywords;
mod location;
mod logging;
mod tokens;

pub use keywords::*;
pub use location::*;
pub use logging::*;
pub use tokens::*;
