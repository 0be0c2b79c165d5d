//! Compiled shader artifacts and descriptor reflection

use psl_formats::{BindingType, ShaderStage, ShaderStageFlags, SourceLanguage};

/// One descriptor set as reported by shader reflection
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct DescriptorSetReflection {
    pub set_index: u32,
    pub bindings: Vec<DescriptorBindingReflection>,
}

/// One descriptor binding as reported by shader reflection
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct DescriptorBindingReflection {
    pub binding_index: u32,
    /// Array length; 1 for a plain binding
    pub count: u32,
    pub binding_type: BindingType,
    pub stages: ShaderStageFlags,
    /// Source-level name, when reflection preserved one
    pub name: Option<String>,
}

/// Output of compiling one shader stage
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct StageArtifacts {
    pub stage: ShaderStage,
    pub bytecode: Vec<u8>,
    /// Optional debug build of the same stage
    pub debug_data: Vec<u8>,
    /// Content hash reported by the compiler, used by caching hosts
    pub hash: u64,
    pub descriptor_sets: Vec<DescriptorSetReflection>,
}

/// All compiled stages of one pass
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct PassArtifacts {
    pub stages: Vec<StageArtifacts>,
}

/// All compiled passes of one configuration, in pass order
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ConfigurationArtifacts {
    pub passes: Vec<PassArtifacts>,
}

/// All compiled configurations of one pipeline set, in configuration order
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct GraphicsArtifacts {
    pub configurations: Vec<ConfigurationArtifacts>,
}

/// The single compiled compute stage of a compute set
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ComputeArtifacts {
    pub stage: StageArtifacts,
}

/// One stage handed to a [crate::ShaderCompiler]
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub entry_point: &'a str,
    pub stage: ShaderStage,
    pub language: SourceLanguage,
    pub code: &'a str,
}
