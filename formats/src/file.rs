//! Binary pipeline-set file layout, version 1.
//!
//! A file is a 4-byte magic code, a [FileHeader], eleven densely packed
//! header arrays and one variable-length blob region. The header records a
//! `(byte offset from file start, element count)` pair per section; sections
//! are laid out in the field order declared on [FileHeader]. All values are
//! little-endian and every struct is `Pod` so a reader can locate a section
//! from the offset table and cast bytes directly.

use bytemuck::{Pod, Zeroable};

/// Magic code identifying a pipeline-set file
pub const FILE_MAGIC: [u8; 4] = *b"GPSF";

/// Current format version
pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 0;
pub const VERSION_PATCH: u8 = 0;

/// Pass flag bits packed into [PassHeader::flags]
pub const PASS_FLAG_DEPTH_BIAS: u8 = 1 << 0;
pub const PASS_FLAG_DEPTH_CLAMP: u8 = 1 << 1;
pub const PASS_FLAG_DEPTH_TEST: u8 = 1 << 2;
pub const PASS_FLAG_DEPTH_WRITE: u8 = 1 << 3;
pub const PASS_FLAG_STENCIL: u8 = 1 << 4;
/// The source declared one attachment to be replicated to every color target
pub const PASS_FLAG_BROADCAST_ATTACHMENT: u8 = 1 << 5;

/// Location of one section: byte offset from the start of the file and the
/// number of elements (bytes for the blob section)
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct SectionRange {
    pub offset: u32,
    pub count: u32,
}

/// Fixed-size file header directly following the magic code.
///
/// Section ranges are declared in the order the sections appear in the file;
/// the per-struct size bytes let a reader reject files written with a
/// different layout revision.
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Debug, Clone, Copy)]
pub struct FileHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub version_patch: u8,
    pub header_size: u8,
    pub graphics_pipeline_size: u8,
    pub compute_pipeline_size: u8,
    pub material_parameter_size: u8,
    pub material_resource_size: u8,
    pub graphics_configuration_size: u8,
    pub compute_configuration_size: u8,
    pub pass_size: u8,
    pub stage_size: u8,
    pub attachment_size: u8,
    pub descriptor_set_size: u8,
    pub descriptor_binding_size: u8,
    pub _pad: u8,
    pub graphics_pipelines: SectionRange,
    pub compute_pipelines: SectionRange,
    pub material_parameters: SectionRange,
    pub material_resources: SectionRange,
    pub graphics_configurations: SectionRange,
    pub compute_configurations: SectionRange,
    pub passes: SectionRange,
    pub shader_stages: SectionRange,
    pub attachments: SectionRange,
    pub descriptor_sets: SectionRange,
    pub descriptor_bindings: SectionRange,
    pub blob: SectionRange,
}

impl FileHeader {
    /// Make a header with the current version and struct sizes and an empty
    /// section table
    pub fn new() -> FileHeader {
        FileHeader {
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            version_patch: VERSION_PATCH,
            header_size: std::mem::size_of::<FileHeader>() as u8,
            graphics_pipeline_size: std::mem::size_of::<GraphicsPipelineHeader>() as u8,
            compute_pipeline_size: std::mem::size_of::<ComputePipelineHeader>() as u8,
            material_parameter_size: std::mem::size_of::<MaterialParameterHeader>() as u8,
            material_resource_size: std::mem::size_of::<MaterialResourceHeader>() as u8,
            graphics_configuration_size: std::mem::size_of::<GraphicsConfigurationHeader>() as u8,
            compute_configuration_size: std::mem::size_of::<ComputeConfigurationHeader>() as u8,
            pass_size: std::mem::size_of::<PassHeader>() as u8,
            stage_size: std::mem::size_of::<ShaderStageHeader>() as u8,
            attachment_size: std::mem::size_of::<AttachmentHeader>() as u8,
            descriptor_set_size: std::mem::size_of::<DescriptorSetHeader>() as u8,
            descriptor_binding_size: std::mem::size_of::<DescriptorBindingHeader>() as u8,
            _pad: 0,
            graphics_pipelines: SectionRange::default(),
            compute_pipelines: SectionRange::default(),
            material_parameters: SectionRange::default(),
            material_resources: SectionRange::default(),
            graphics_configurations: SectionRange::default(),
            compute_configurations: SectionRange::default(),
            passes: SectionRange::default(),
            shader_stages: SectionRange::default(),
            attachments: SectionRange::default(),
            descriptor_sets: SectionRange::default(),
            descriptor_bindings: SectionRange::default(),
            blob: SectionRange::default(),
        }
    }
}

impl Default for FileHeader {
    fn default() -> FileHeader {
        FileHeader::new()
    }
}

/// Top-level graphics pipeline entry
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct GraphicsPipelineHeader {
    pub name_offset: u32,
    pub configuration_start: u16,
    pub configuration_count: u16,
    pub material_parameter_start: u16,
    pub material_parameter_count: u16,
    pub material_resource_start: u16,
    pub material_resource_count: u16,
}

/// Top-level compute pipeline entry
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct ComputePipelineHeader {
    pub name_offset: u32,
    pub configuration_start: u16,
    pub configuration_count: u16,
}

/// Declared material parameter with its default value in the blob
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct MaterialParameterHeader {
    pub name_offset: u32,
    pub default_value_offset: u32,
    pub parameter_type: u8,
    pub _pad: [u8; 3],
}

/// Named shader resource a material is expected to supply
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct MaterialResourceHeader {
    pub name_offset: u32,
    pub set_index: u8,
    pub binding_index: u8,
    pub _pad: [u8; 2],
}

/// One tagged variant of a graphics pipeline, indexing into the pass array
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct GraphicsConfigurationHeader {
    pub name_offset: u32,
    pub pass_start: u16,
    pub pass_count: u16,
}

/// One variant of a compute pipeline, indexing into the shared stage and
/// descriptor arrays
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct ComputeConfigurationHeader {
    pub shader_stage_start: u16,
    pub shader_stage_count: u16,
    pub descriptor_set_start: u16,
    pub descriptor_set_count: u16,
    pub descriptor_binding_start: u16,
    pub descriptor_binding_count: u16,
}

/// One concrete graphics pipeline: full render state plus positional ranges
/// into the stage, attachment and descriptor arrays.
///
/// Enumerated render-state fields store the raw discriminant of the matching
/// enum in [crate::graphics].
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Debug, Clone, Copy, Default)]
pub struct PassHeader {
    pub pipeline_name_offset: u32,
    pub render_queue_offset: u32,
    pub depth_bias_constant_factor: f32,
    pub depth_bias_slope_factor: f32,
    pub depth_bias_clamp: f32,
    pub shader_stage_start: u16,
    pub shader_stage_count: u16,
    pub attachment_start: u16,
    pub attachment_count: u16,
    pub descriptor_set_start: u16,
    pub descriptor_set_count: u16,
    pub descriptor_binding_start: u16,
    pub descriptor_binding_count: u16,
    pub geometry_type: u8,
    pub polygon_fill_mode: u8,
    pub cull_mode: u8,
    pub depth_compare_op: u8,
    pub flags: u8,
    pub _pad: [u8; 3],
}

/// One compiled shader stage with its bytecode in the blob
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct ShaderStageHeader {
    pub code_offset: u32,
    pub code_size: u32,
    pub stage: u8,
    pub _pad: [u8; 3],
}

/// Blend state of one color attachment
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct AttachmentHeader {
    pub color_mask: u8,
    pub blend_color_operation: u8,
    pub blend_color_factor_src: u8,
    pub blend_color_factor_dst: u8,
    pub blend_alpha_operation: u8,
    pub blend_alpha_factor_src: u8,
    pub blend_alpha_factor_dst: u8,
    pub _pad: u8,
}

/// Consolidated descriptor set covering a range of bindings
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct DescriptorSetHeader {
    pub set_index: u32,
    pub binding_start: u32,
    pub binding_count: u32,
}

/// Consolidated descriptor binding with the OR of all using stages
#[repr(C)]
#[derive(Pod, Zeroable, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct DescriptorBindingHeader {
    pub binding_index: u32,
    pub count: u32,
    pub name_offset: u32,
    pub binding_type: u8,
    pub stage_flags: u8,
    pub _pad: [u8; 2],
}

/// Blob offset used when a header has no name to point at
pub const NO_BLOB_ENTRY: u32 = u32::MAX;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn struct_sizes_are_stable() {
        assert_eq!(size_of::<FileHeader>(), 112);
        assert_eq!(size_of::<GraphicsPipelineHeader>(), 16);
        assert_eq!(size_of::<ComputePipelineHeader>(), 8);
        assert_eq!(size_of::<MaterialParameterHeader>(), 12);
        assert_eq!(size_of::<MaterialResourceHeader>(), 8);
        assert_eq!(size_of::<GraphicsConfigurationHeader>(), 8);
        assert_eq!(size_of::<ComputeConfigurationHeader>(), 12);
        assert_eq!(size_of::<PassHeader>(), 44);
        assert_eq!(size_of::<ShaderStageHeader>(), 12);
        assert_eq!(size_of::<AttachmentHeader>(), 8);
        assert_eq!(size_of::<DescriptorSetHeader>(), 12);
        assert_eq!(size_of::<DescriptorBindingHeader>(), 16);
    }

    #[test]
    fn header_records_current_sizes() {
        let header = FileHeader::new();
        assert_eq!(header.header_size as usize, size_of::<FileHeader>());
        assert_eq!(header.pass_size as usize, size_of::<PassHeader>());
        assert_eq!(header.version_major, VERSION_MAJOR);
    }
}
