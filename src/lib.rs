//! # PSL
//!
//! This is a meta crate that re-exports all the sub libraries and provides
//! the batch conversion driver

pub use psl_ast as ast;
pub use psl_formats as formats;
pub use psl_ir as ir;
pub use psl_lexer as lexer;
pub use psl_output as output;
pub use psl_parser as parser;
pub use psl_resolver as resolver;
pub use psl_text as text;

pub use psl_formats::{PipelineType, ShaderStage};
pub use psl_ir::{CompileRequest, ShaderCompiler};
pub use psl_output::PipelineOutput;
pub use psl_text::{Logger, StdLogger};

mod conditioner;

pub use conditioner::{wildcard_match, Conditioner};
