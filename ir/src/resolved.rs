//! Fully-resolved pipeline state, every field concrete

use psl_formats::{
    BlendFactor, BlendOperation, ColorMask, CompareOperation, CullMode, GeometryType,
    ParameterType, PolygonFillMode, SourceLanguage, TOTAL_STAGE_COUNT,
};
use std::path::PathBuf;

/// Blend state of one color attachment after defaults were applied
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ResolvedAttachment {
    pub color_mask: ColorMask,
    pub blend_color_operation: BlendOperation,
    pub blend_color_factor_src: BlendFactor,
    pub blend_color_factor_dst: BlendFactor,
    pub blend_alpha_operation: BlendOperation,
    pub blend_alpha_factor_src: BlendFactor,
    pub blend_alpha_factor_dst: BlendFactor,
}

impl Default for ResolvedAttachment {
    fn default() -> ResolvedAttachment {
        ResolvedAttachment {
            color_mask: ColorMask::RGBA,
            blend_color_operation: BlendOperation::None,
            blend_color_factor_src: BlendFactor::Zero,
            blend_color_factor_dst: BlendFactor::Zero,
            blend_alpha_operation: BlendOperation::None,
            blend_alpha_factor_src: BlendFactor::Zero,
            blend_alpha_factor_dst: BlendFactor::Zero,
        }
    }
}

/// Complete render state of one pass
#[derive(PartialEq, Debug, Clone)]
pub struct ResolvedRenderState {
    pub geometry_type: GeometryType,
    pub polygon_fill_mode: PolygonFillMode,
    pub cull_mode: CullMode,
    pub depth_compare_op: CompareOperation,
    pub is_depth_test_enabled: bool,
    pub is_depth_write_enabled: bool,
    pub is_depth_bias_enabled: bool,
    pub is_depth_clamp_enabled: bool,
    pub is_stencil_enabled: bool,
    pub depth_bias_constant_factor: f32,
    pub depth_bias_slope_factor: f32,
    pub depth_bias_clamp: f32,
    pub attachments: Vec<ResolvedAttachment>,
    pub broadcast_first_attachment: bool,
}

impl Default for ResolvedRenderState {
    fn default() -> ResolvedRenderState {
        ResolvedRenderState {
            geometry_type: GeometryType::Triangles,
            polygon_fill_mode: PolygonFillMode::Fill,
            cull_mode: CullMode::Back,
            depth_compare_op: CompareOperation::GreaterOrEqual,
            is_depth_test_enabled: true,
            is_depth_write_enabled: true,
            is_depth_bias_enabled: false,
            is_depth_clamp_enabled: false,
            is_stencil_enabled: false,
            depth_bias_constant_factor: 0.0,
            depth_bias_slope_factor: 0.0,
            depth_bias_clamp: 0.0,
            attachments: vec![ResolvedAttachment::default()],
            broadcast_first_attachment: true,
        }
    }
}

/// One pass with its merged state and collapsed shader source
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ResolvedPass {
    pub name: String,
    pub render_queue: Option<String>,
    pub render_state: ResolvedRenderState,
    pub language: SourceLanguage,
    pub code: String,
    /// Entry point names indexed by stage; empty means the stage is unused
    pub stage_entry_points: [String; TOTAL_STAGE_COUNT],
}

/// One configuration with its renderer tags and resolved passes
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ResolvedConfiguration {
    pub name: String,
    pub tags: Vec<String>,
    pub passes: Vec<ResolvedPass>,
}

/// Declared material parameter carried through to the output file
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ResolvedParameter {
    pub parameter_type: ParameterType,
    pub name: String,
    pub default_value: String,
}

/// One concrete pipeline set ready for compilation
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ResolvedPipelineSet {
    pub name: String,
    pub source_path: PathBuf,
    pub parameters: Vec<ResolvedParameter>,
    pub configurations: Vec<ResolvedConfiguration>,
}

/// One concrete compute set ready for compilation
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ResolvedComputeSet {
    pub name: String,
    pub source_path: PathBuf,
    pub language: SourceLanguage,
    pub code: String,
    pub entry_point: String,
}

/// Everything that survived resolution; abstract objects are gone and all
/// inheritance chains are flattened
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ResolvedStateTree {
    pub pipeline_sets: Vec<ResolvedPipelineSet>,
    pub compute_sets: Vec<ResolvedComputeSet>,
}
