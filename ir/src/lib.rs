//! # PSL Intermediate Representation
//!
//! Types shared between the resolver, the shader compiler seam and the
//! binary encoder: the fully-resolved state tree with every default applied,
//! and the per-stage compilation artifacts with their descriptor reflection.

mod artifacts;
mod compiler;
mod resolved;

pub use artifacts::*;
pub use compiler::*;
pub use resolved::*;
