//! Parse tree type definitions

use psl_formats::{
    BlendFactor, BlendOperation, ColorMask, CompareOperation, CullMode, GeometryType,
    ParameterType, PolygonFillMode, SourceLanguage, TOTAL_STAGE_COUNT,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Most color attachments one pass may declare
pub const MAX_ATTACHMENT_COUNT: usize = 32;

/// How an object relates to its parent
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ParentKind {
    /// Copy missing structured fields only; stops shader-code propagation
    Inherit,
    /// Duplicate the parent wholesale, shader code included
    Clone,
}

/// Reference to a named parent object of the same kind
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ParentLink {
    pub name: String,
    pub kind: ParentKind,
}

/// Blend state of one color attachment, all fields optional until resolve
#[derive(PartialEq, Debug, Clone, Default)]
pub struct AttachmentState {
    pub color_mask: Option<ColorMask>,
    pub blend_color_operation: Option<BlendOperation>,
    pub blend_color_factor_src: Option<BlendFactor>,
    pub blend_color_factor_dst: Option<BlendFactor>,
    pub blend_alpha_operation: Option<BlendOperation>,
    pub blend_alpha_factor_src: Option<BlendFactor>,
    pub blend_alpha_factor_dst: Option<BlendFactor>,
}

/// Render state as written in the source, all fields optional until resolve
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RenderState {
    pub geometry_type: Option<GeometryType>,
    pub polygon_fill_mode: Option<PolygonFillMode>,
    pub cull_mode: Option<CullMode>,
    pub depth_compare_op: Option<CompareOperation>,
    pub is_depth_test_enabled: Option<bool>,
    pub is_depth_write_enabled: Option<bool>,
    pub is_depth_bias_enabled: Option<bool>,
    pub is_depth_clamp_enabled: Option<bool>,
    pub is_stencil_enabled: Option<bool>,
    pub depth_bias_constant_factor: Option<f32>,
    pub depth_bias_slope_factor: Option<f32>,
    pub depth_bias_clamp: Option<f32>,
    pub attachments: Vec<AttachmentState>,
    /// Set when `attachments: { ... }` declared a single attachment to be
    /// replicated to every color target
    pub broadcast_first_attachment: bool,
}

/// A named, reusable fragment of shader source
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ShaderBlock {
    pub language: SourceLanguage,
    pub required_blocks: Vec<String>,
    pub code: String,
    /// Entry point names indexed by shader stage; empty means unused
    pub stage_entry_points: [String; TOTAL_STAGE_COUNT],
    pub parent: Option<ParentLink>,
}

/// One graphics pipeline declaration inside a configuration
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Pass {
    pub source_path: PathBuf,
    pub is_abstract: bool,
    pub parent: Option<ParentLink>,
    pub render_state: RenderState,
    pub shader_block: ShaderBlock,
    pub render_queue: Option<String>,
}

/// A tagged variant of a pipeline set
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Configuration {
    pub source_path: PathBuf,
    pub is_abstract: bool,
    pub parent: Option<ParentLink>,
    pub tags: Vec<String>,
    pub passes: BTreeMap<String, Pass>,
}

/// Declared material parameter with a textual default value
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct MaterialParameter {
    pub parameter_type: ParameterType,
    pub name: String,
    pub default_value: String,
}

/// Top-level graphics pipeline declaration
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PipelineSet {
    pub source_path: PathBuf,
    pub is_abstract: bool,
    pub parent: Option<ParentLink>,
    pub parameters: Vec<MaterialParameter>,
    pub configurations: BTreeMap<String, Configuration>,
}

/// Top-level compute pipeline declaration
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ComputeSet {
    pub source_path: PathBuf,
    pub shader_block: ShaderBlock,
}

/// All declarations accumulated from one file and its includes.
///
/// Entries are created on first mention so forward references across files
/// are legal; existence is checked at resolve time, not parse time.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ParseTree {
    pub pipeline_sets: BTreeMap<String, PipelineSet>,
    pub compute_sets: BTreeMap<String, ComputeSet>,
    pub generic_configurations: BTreeMap<String, Configuration>,
    pub generic_passes: BTreeMap<String, Pass>,
    pub generic_shader_blocks: BTreeMap<String, ShaderBlock>,
}

/// Common surface of declarations handled by the parser's shared
/// object-declaration path
pub trait ObjectDeclaration: Default {
    fn set_source_path(&mut self, path: &Path);
    fn set_is_abstract(&mut self, is_abstract: bool);
    fn set_parent(&mut self, parent: ParentLink);
}

impl ObjectDeclaration for Pass {
    fn set_source_path(&mut self, path: &Path) {
        self.source_path = path.to_path_buf();
    }

    fn set_is_abstract(&mut self, is_abstract: bool) {
        self.is_abstract = is_abstract;
    }

    fn set_parent(&mut self, parent: ParentLink) {
        self.parent = Some(parent);
    }
}

impl ObjectDeclaration for Configuration {
    fn set_source_path(&mut self, path: &Path) {
        self.source_path = path.to_path_buf();
    }

    fn set_is_abstract(&mut self, is_abstract: bool) {
        self.is_abstract = is_abstract;
    }

    fn set_parent(&mut self, parent: ParentLink) {
        self.parent = Some(parent);
    }
}

impl ObjectDeclaration for PipelineSet {
    fn set_source_path(&mut self, path: &Path) {
        self.source_path = path.to_path_buf();
    }

    fn set_is_abstract(&mut self, is_abstract: bool) {
        self.is_abstract = is_abstract;
    }

    fn set_parent(&mut self, parent: ParentLink) {
        self.parent = Some(parent);
    }
}
