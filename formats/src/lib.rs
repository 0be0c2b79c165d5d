//! # PSL Formats
//!
//! Shared graphics enumerations and the versioned pipeline-set binary file
//! layout. Both the converter and a runtime loader depend on this crate, so
//! every type here has a stable byte representation.

mod file;
mod graphics;

pub use file::*;
pub use graphics::*;
