//! Shader compiler seam

use crate::{CompileRequest, StageArtifacts};
use psl_formats::{ShaderStage, SourceLanguage};

/// Failure to compile one shader stage
#[derive(thiserror::Error, Debug)]
pub enum CompileError {
    #[error("source language {0:?} is not supported by this compiler")]
    UnsupportedLanguage(SourceLanguage),

    #[error("stage {0:?} is not supported by this compiler")]
    UnsupportedStage(ShaderStage),

    #[error("entry point '{entry_point}' failed to compile: {message}")]
    Compilation {
        entry_point: String,
        message: String,
    },

    #[error("reflection failed for entry point '{entry_point}': {message}")]
    Reflection {
        entry_point: String,
        message: String,
    },
}

/// Turns one stage's source into bytecode plus descriptor reflection.
///
/// The front end is agnostic to the backing toolchain; callers plug in
/// whatever compiler their target needs.
pub trait ShaderCompiler {
    fn compile(&self, request: CompileRequest) -> Result<StageArtifacts, CompileError>;
}
