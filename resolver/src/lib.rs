//! # PSL Resolver
//!
//! Flattens the parse tree's inheritance chains into a
//! [psl_ir::ResolvedStateTree]: parent fields are merged most-derived-first,
//! unset render state receives hard defaults, and every pass's shader-block
//! dependency graph collapses into one flattened source string. Abstract
//! objects exist only to be inherited from and are never emitted.

mod resolver;

pub use resolver::resolve;
