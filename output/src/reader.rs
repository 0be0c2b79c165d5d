//! Reference reader for the binary pipeline-set layout.
//!
//! Mirrors what a runtime loader does: validate the magic code, version and
//! struct sizes, then lift each section out of the byte buffer. Sections are
//! read element by element with unaligned pod reads so the buffer needs no
//! particular alignment.

use bytemuck::Pod;
use psl_formats::{
    AttachmentHeader, ComputeConfigurationHeader, ComputePipelineHeader, DescriptorBindingHeader,
    DescriptorSetHeader, FileHeader, GraphicsConfigurationHeader, GraphicsPipelineHeader,
    MaterialParameterHeader, MaterialResourceHeader, PassHeader, SectionRange, ShaderStageHeader,
    FILE_MAGIC, VERSION_MAJOR,
};
use std::mem::size_of;

/// Failure to read a pipeline-set file
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("file is too small to hold a header")]
    Truncated,

    #[error("bad magic code")]
    BadMagic,

    #[error("unsupported format version {0}.{1}.{2}")]
    UnsupportedVersion(u8, u8, u8),

    #[error("struct size mismatch for section '{0}'")]
    LayoutMismatch(&'static str),

    #[error("section '{0}' lies outside the file")]
    OutOfBounds(&'static str),

    #[error("blob offset {0} lies outside the blob")]
    BadBlobOffset(u32),

    #[error("blob string at {0} is not terminated")]
    UnterminatedString(u32),

    #[error("blob string at {0} is not valid UTF-8")]
    InvalidString(u32),
}

/// A fully decoded pipeline-set file
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PipelineFile {
    pub graphics_pipelines: Vec<GraphicsPipelineHeader>,
    pub compute_pipelines: Vec<ComputePipelineHeader>,
    pub material_parameters: Vec<MaterialParameterHeader>,
    pub material_resources: Vec<MaterialResourceHeader>,
    pub graphics_configurations: Vec<GraphicsConfigurationHeader>,
    pub compute_configurations: Vec<ComputeConfigurationHeader>,
    pub passes: Vec<PassHeader>,
    pub shader_stages: Vec<ShaderStageHeader>,
    pub attachments: Vec<AttachmentHeader>,
    pub descriptor_sets: Vec<DescriptorSetHeader>,
    pub descriptor_bindings: Vec<DescriptorBindingHeader>,
    pub blob: Vec<u8>,
}

impl PipelineFile {
    pub fn read(bytes: &[u8]) -> Result<PipelineFile, ReadError> {
        let header_end = FILE_MAGIC.len() + size_of::<FileHeader>();
        if bytes.len() < header_end {
            return Err(ReadError::Truncated);
        }
        if bytes[..FILE_MAGIC.len()] != FILE_MAGIC {
            return Err(ReadError::BadMagic);
        }

        let header: FileHeader =
            bytemuck::pod_read_unaligned(&bytes[FILE_MAGIC.len()..header_end]);
        if header.version_major != VERSION_MAJOR {
            return Err(ReadError::UnsupportedVersion(
                header.version_major,
                header.version_minor,
                header.version_patch,
            ));
        }
        check_size::<FileHeader>(header.header_size, "file header")?;
        check_size::<GraphicsPipelineHeader>(header.graphics_pipeline_size, "graphics pipelines")?;
        check_size::<ComputePipelineHeader>(header.compute_pipeline_size, "compute pipelines")?;
        check_size::<MaterialParameterHeader>(
            header.material_parameter_size,
            "material parameters",
        )?;
        check_size::<MaterialResourceHeader>(header.material_resource_size, "material resources")?;
        check_size::<GraphicsConfigurationHeader>(
            header.graphics_configuration_size,
            "graphics configurations",
        )?;
        check_size::<ComputeConfigurationHeader>(
            header.compute_configuration_size,
            "compute configurations",
        )?;
        check_size::<PassHeader>(header.pass_size, "passes")?;
        check_size::<ShaderStageHeader>(header.stage_size, "shader stages")?;
        check_size::<AttachmentHeader>(header.attachment_size, "attachments")?;
        check_size::<DescriptorSetHeader>(header.descriptor_set_size, "descriptor sets")?;
        check_size::<DescriptorBindingHeader>(
            header.descriptor_binding_size,
            "descriptor bindings",
        )?;

        Ok(PipelineFile {
            graphics_pipelines: read_section(bytes, header.graphics_pipelines, "graphics pipelines")?,
            compute_pipelines: read_section(bytes, header.compute_pipelines, "compute pipelines")?,
            material_parameters: read_section(bytes, header.material_parameters, "material parameters")?,
            material_resources: read_section(bytes, header.material_resources, "material resources")?,
            graphics_configurations: read_section(
                bytes,
                header.graphics_configurations,
                "graphics configurations",
            )?,
            compute_configurations: read_section(
                bytes,
                header.compute_configurations,
                "compute configurations",
            )?,
            passes: read_section(bytes, header.passes, "passes")?,
            shader_stages: read_section(bytes, header.shader_stages, "shader stages")?,
            attachments: read_section(bytes, header.attachments, "attachments")?,
            descriptor_sets: read_section(bytes, header.descriptor_sets, "descriptor sets")?,
            descriptor_bindings: read_section(
                bytes,
                header.descriptor_bindings,
                "descriptor bindings",
            )?,
            blob: read_blob(bytes, header.blob)?,
        })
    }

    /// Read a null-terminated string at a blob-relative offset
    pub fn blob_str(&self, offset: u32) -> Result<&str, ReadError> {
        let start = offset as usize;
        let tail = self
            .blob
            .get(start..)
            .ok_or(ReadError::BadBlobOffset(offset))?;
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(ReadError::UnterminatedString(offset))?;
        std::str::from_utf8(&tail[..end]).map_err(|_| ReadError::InvalidString(offset))
    }

    /// Read a byte range at a blob-relative offset
    pub fn blob_bytes(&self, offset: u32, size: u32) -> Result<&[u8], ReadError> {
        let start = offset as usize;
        let end = start
            .checked_add(size as usize)
            .ok_or(ReadError::BadBlobOffset(offset))?;
        self.blob
            .get(start..end)
            .ok_or(ReadError::BadBlobOffset(offset))
    }
}

fn check_size<T>(recorded: u8, name: &'static str) -> Result<(), ReadError> {
    if recorded as usize != size_of::<T>() {
        return Err(ReadError::LayoutMismatch(name));
    }
    Ok(())
}

fn read_section<T: Pod>(
    bytes: &[u8],
    range: SectionRange,
    name: &'static str,
) -> Result<Vec<T>, ReadError> {
    let element_size = size_of::<T>();
    let start = range.offset as usize;
    let length = (range.count as usize)
        .checked_mul(element_size)
        .ok_or(ReadError::OutOfBounds(name))?;
    let end = start
        .checked_add(length)
        .ok_or(ReadError::OutOfBounds(name))?;
    let section = bytes.get(start..end).ok_or(ReadError::OutOfBounds(name))?;
    Ok(section
        .chunks_exact(element_size)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

fn read_blob(bytes: &[u8], range: SectionRange) -> Result<Vec<u8>, ReadError> {
    let start = range.offset as usize;
    let end = start
        .checked_add(range.count as usize)
        .ok_or(ReadError::OutOfBounds("blob"))?;
    Ok(bytes
        .get(start..end)
        .ok_or(ReadError::OutOfBounds("blob"))?
        .to_vec())
}
