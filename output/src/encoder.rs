//! Serialization of resolved pipeline sets into the binary file layout

use psl_formats::{
    AttachmentHeader, ComputeConfigurationHeader, ComputePipelineHeader, DescriptorBindingHeader,
    DescriptorSetHeader, FileHeader, GraphicsConfigurationHeader, GraphicsPipelineHeader,
    MaterialParameterHeader, MaterialResourceHeader, PassHeader, PipelineType, SectionRange,
    ShaderStage, ShaderStageHeader, FILE_MAGIC, NO_BLOB_ENTRY, PASS_FLAG_BROADCAST_ATTACHMENT,
    PASS_FLAG_DEPTH_BIAS, PASS_FLAG_DEPTH_CLAMP, PASS_FLAG_DEPTH_TEST, PASS_FLAG_DEPTH_WRITE,
    PASS_FLAG_STENCIL,
};
use psl_ir::{
    ComputeArtifacts, DescriptorBindingReflection, GraphicsArtifacts, ResolvedComputeSet,
    ResolvedPass, ResolvedPipelineSet, StageArtifacts,
};
use std::collections::BTreeSet;

/// Failure to serialize one pipeline or compute set
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error(
        "pipeline set '{set}' resolved to {resolved} configurations but {artifacts} were compiled"
    )]
    ConfigurationCountMismatch {
        set: String,
        resolved: usize,
        artifacts: usize,
    },

    #[error(
        "configuration '{configuration}' resolved to {resolved} passes but {artifacts} were compiled"
    )]
    PassCountMismatch {
        configuration: String,
        resolved: usize,
        artifacts: usize,
    },

    #[error("pass '{pass}' has no compiled bytecode for stage {stage:?}")]
    MissingStage { pass: String, stage: ShaderStage },

    #[error("pass '{pass}' received bytecode for stage {stage:?} which declares no entry point")]
    UnexpectedStage { pass: String, stage: ShaderStage },

    #[error("compute set '{set}' received bytecode for stage {stage:?} instead of compute")]
    WrongComputeStage { set: String, stage: ShaderStage },

    #[error("section '{0}' does not fit in a 16-bit index")]
    SectionOverflow(&'static str),
}

/// One finished binary artifact, ready to be written by the driver
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct PipelineOutput {
    pub name: String,
    pub pipeline_type: PipelineType,
    pub content: Vec<u8>,
}

/// Section accumulator; the vectors become the file's parallel arrays in
/// the order they are declared on [FileHeader]
#[derive(Default)]
struct Sections {
    graphics_pipelines: Vec<GraphicsPipelineHeader>,
    compute_pipelines: Vec<ComputePipelineHeader>,
    material_parameters: Vec<MaterialParameterHeader>,
    material_resources: Vec<MaterialResourceHeader>,
    graphics_configurations: Vec<GraphicsConfigurationHeader>,
    compute_configurations: Vec<ComputeConfigurationHeader>,
    passes: Vec<PassHeader>,
    shader_stages: Vec<ShaderStageHeader>,
    attachments: Vec<AttachmentHeader>,
    descriptor_sets: Vec<DescriptorSetHeader>,
    descriptor_bindings: Vec<DescriptorBindingHeader>,
    blob: Vec<u8>,
    /// Guard against emitting the same material resource twice
    seen_resources: BTreeSet<(u32, u32, String)>,
}

impl Sections {
    fn push_string(&mut self, text: &str) -> u32 {
        let offset = self.blob.len() as u32;
        self.blob.extend_from_slice(text.as_bytes());
        self.blob.push(0);
        offset
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.blob.len() as u32;
        self.blob.extend_from_slice(bytes);
        offset
    }

    /// Merge one stage's reflected descriptor data into the accumulator.
    /// Bindings matched by `(set, binding)` index have their stage masks
    /// OR'ed; unmatched bindings are appended.
    fn consolidate_stage(
        sets: &mut Vec<(u32, Vec<DescriptorBindingReflection>)>,
        stage: &StageArtifacts,
    ) {
        for reflected in &stage.descriptor_sets {
            let bindings = match sets.iter_mut().find(|(index, _)| *index == reflected.set_index) {
                Some((_, bindings)) => bindings,
                None => {
                    sets.push((reflected.set_index, Vec::new()));
                    match sets.last_mut() {
                        Some((_, bindings)) => bindings,
                        None => continue,
                    }
                }
            };
            for binding in &reflected.bindings {
                match bindings
                    .iter_mut()
                    .find(|b| b.binding_index == binding.binding_index)
                {
                    Some(existing) => existing.stages |= binding.stages,
                    None => bindings.push(binding.clone()),
                }
            }
        }
    }

    /// Write consolidated descriptor data and return the pass-relative
    /// `(set start, set count, binding start, binding count)` ranges
    fn encode_descriptors(
        &mut self,
        stages: &[&StageArtifacts],
        collect_resources: bool,
    ) -> Result<(u16, u16, u16, u16), OutputError> {
        let mut consolidated: Vec<(u32, Vec<DescriptorBindingReflection>)> = Vec::new();
        for stage in stages {
            Sections::consolidate_stage(&mut consolidated, stage);
        }
        consolidated.sort_by_key(|(index, _)| *index);

        let set_start = index16(self.descriptor_sets.len(), "descriptor sets")?;
        let binding_start = index16(self.descriptor_bindings.len(), "descriptor bindings")?;

        for (set_index, bindings) in &consolidated {
            self.descriptor_sets.push(DescriptorSetHeader {
                set_index: *set_index,
                binding_start: self.descriptor_bindings.len() as u32,
                binding_count: bindings.len() as u32,
            });
            for binding in bindings {
                let name_offset = match &binding.name {
                    Some(name) => self.push_string(name),
                    None => NO_BLOB_ENTRY,
                };
                if collect_resources && binding.binding_type.is_material_resource() {
                    if let Some(name) = &binding.name {
                        let key = (*set_index, binding.binding_index, name.clone());
                        if self.seen_resources.insert(key) {
                            let resource_name = self.push_string(name);
                            self.material_resources.push(MaterialResourceHeader {
                                name_offset: resource_name,
                                set_index: *set_index as u8,
                                binding_index: binding.binding_index as u8,
                                _pad: [0; 2],
                            });
                        }
                    }
                }
                self.descriptor_bindings.push(DescriptorBindingHeader {
                    binding_index: binding.binding_index,
                    count: binding.count,
                    name_offset,
                    binding_type: binding.binding_type as u8,
                    stage_flags: binding.stages.0,
                    _pad: [0; 2],
                });
            }
        }

        let set_count = index16(self.descriptor_sets.len() - set_start as usize, "descriptor sets")?;
        let binding_count = index16(
            self.descriptor_bindings.len() - binding_start as usize,
            "descriptor bindings",
        )?;
        Ok((set_start, set_count, binding_start, binding_count))
    }

    /// Lay the accumulated sections out behind the magic code and header
    fn assemble(self) -> Vec<u8> {
        let mut header = FileHeader::new();
        let mut offset = (FILE_MAGIC.len() + std::mem::size_of::<FileHeader>()) as u32;

        fn place<T: bytemuck::Pod>(offset: &mut u32, items: &[T]) -> SectionRange {
            let range = SectionRange {
                offset: *offset,
                count: items.len() as u32,
            };
            *offset += (items.len() * std::mem::size_of::<T>()) as u32;
            range
        }

        header.graphics_pipelines = place(&mut offset, &self.graphics_pipelines);
        header.compute_pipelines = place(&mut offset, &self.compute_pipelines);
        header.material_parameters = place(&mut offset, &self.material_parameters);
        header.material_resources = place(&mut offset, &self.material_resources);
        header.graphics_configurations = place(&mut offset, &self.graphics_configurations);
        header.compute_configurations = place(&mut offset, &self.compute_configurations);
        header.passes = place(&mut offset, &self.passes);
        header.shader_stages = place(&mut offset, &self.shader_stages);
        header.attachments = place(&mut offset, &self.attachments);
        header.descriptor_sets = place(&mut offset, &self.descriptor_sets);
        header.descriptor_bindings = place(&mut offset, &self.descriptor_bindings);
        header.blob = SectionRange {
            offset,
            count: self.blob.len() as u32,
        };

        let mut content = Vec::with_capacity((offset as usize) + self.blob.len());
        content.extend_from_slice(&FILE_MAGIC);
        content.extend_from_slice(bytemuck::bytes_of(&header));
        content.extend_from_slice(bytemuck::cast_slice(&self.graphics_pipelines));
        content.extend_from_slice(bytemuck::cast_slice(&self.compute_pipelines));
        content.extend_from_slice(bytemuck::cast_slice(&self.material_parameters));
        content.extend_from_slice(bytemuck::cast_slice(&self.material_resources));
        content.extend_from_slice(bytemuck::cast_slice(&self.graphics_configurations));
        content.extend_from_slice(bytemuck::cast_slice(&self.compute_configurations));
        content.extend_from_slice(bytemuck::cast_slice(&self.passes));
        content.extend_from_slice(bytemuck::cast_slice(&self.shader_stages));
        content.extend_from_slice(bytemuck::cast_slice(&self.attachments));
        content.extend_from_slice(bytemuck::cast_slice(&self.descriptor_sets));
        content.extend_from_slice(bytemuck::cast_slice(&self.descriptor_bindings));
        content.extend_from_slice(&self.blob);
        content
    }
}

fn index16(value: usize, section: &'static str) -> Result<u16, OutputError> {
    u16::try_from(value).map_err(|_| OutputError::SectionOverflow(section))
}

fn pass_flags(pass: &ResolvedPass) -> u8 {
    let state = &pass.render_state;
    let mut flags = 0;
    if state.is_depth_bias_enabled {
        flags |= PASS_FLAG_DEPTH_BIAS;
    }
    if state.is_depth_clamp_enabled {
        flags |= PASS_FLAG_DEPTH_CLAMP;
    }
    if state.is_depth_test_enabled {
        flags |= PASS_FLAG_DEPTH_TEST;
    }
    if state.is_depth_write_enabled {
        flags |= PASS_FLAG_DEPTH_WRITE;
    }
    if state.is_stencil_enabled {
        flags |= PASS_FLAG_STENCIL;
    }
    if state.broadcast_first_attachment {
        flags |= PASS_FLAG_BROADCAST_ATTACHMENT;
    }
    flags
}

/// Collect a pass's stage artifacts in stage order, checking that compiled
/// stages and declared entry points line up exactly
fn ordered_stages<'a>(
    pass_name: &str,
    entry_points: &[String],
    stages: &'a [StageArtifacts],
) -> Result<Vec<&'a StageArtifacts>, OutputError> {
    for artifact in stages {
        if entry_points
            .get(artifact.stage.index())
            .map_or(true, |entry| entry.is_empty())
        {
            return Err(OutputError::UnexpectedStage {
                pass: pass_name.to_string(),
                stage: artifact.stage,
            });
        }
    }

    let mut ordered = Vec::with_capacity(stages.len());
    for stage in ShaderStage::ALL {
        let entry_point = &entry_points[stage.index()];
        if entry_point.is_empty() {
            continue;
        }
        match stages.iter().find(|artifact| artifact.stage == stage) {
            Some(artifact) => ordered.push(artifact),
            None => {
                return Err(OutputError::MissingStage {
                    pass: pass_name.to_string(),
                    stage,
                })
            }
        }
    }
    Ok(ordered)
}

fn encode_pass(
    sections: &mut Sections,
    pass: &ResolvedPass,
    stages: &[&StageArtifacts],
) -> Result<PassHeader, OutputError> {
    let shader_stage_start = index16(sections.shader_stages.len(), "shader stages")?;
    for artifact in stages {
        let code_offset = sections.push_bytes(&artifact.bytecode);
        sections.shader_stages.push(ShaderStageHeader {
            code_offset,
            code_size: artifact.bytecode.len() as u32,
            stage: artifact.stage as u8,
            _pad: [0; 3],
        });
    }
    let shader_stage_count = index16(stages.len(), "shader stages")?;

    let attachment_start = index16(sections.attachments.len(), "attachments")?;
    for attachment in &pass.render_state.attachments {
        sections.attachments.push(AttachmentHeader {
            color_mask: attachment.color_mask.0,
            blend_color_operation: attachment.blend_color_operation as u8,
            blend_color_factor_src: attachment.blend_color_factor_src as u8,
            blend_color_factor_dst: attachment.blend_color_factor_dst as u8,
            blend_alpha_operation: attachment.blend_alpha_operation as u8,
            blend_alpha_factor_src: attachment.blend_alpha_factor_src as u8,
            blend_alpha_factor_dst: attachment.blend_alpha_factor_dst as u8,
            _pad: 0,
        });
    }
    let attachment_count = index16(pass.render_state.attachments.len(), "attachments")?;

    let (descriptor_set_start, descriptor_set_count, descriptor_binding_start, descriptor_binding_count) =
        sections.encode_descriptors(stages, true)?;

    let pipeline_name_offset = sections.push_string(&pass.name);
    let render_queue_offset = match &pass.render_queue {
        Some(queue) => sections.push_string(queue),
        None => NO_BLOB_ENTRY,
    };

    let state = &pass.render_state;
    Ok(PassHeader {
        pipeline_name_offset,
        render_queue_offset,
        depth_bias_constant_factor: state.depth_bias_constant_factor,
        depth_bias_slope_factor: state.depth_bias_slope_factor,
        depth_bias_clamp: state.depth_bias_clamp,
        shader_stage_start,
        shader_stage_count,
        attachment_start,
        attachment_count,
        descriptor_set_start,
        descriptor_set_count,
        descriptor_binding_start,
        descriptor_binding_count,
        geometry_type: state.geometry_type as u8,
        polygon_fill_mode: state.polygon_fill_mode as u8,
        cull_mode: state.cull_mode as u8,
        depth_compare_op: state.depth_compare_op as u8,
        flags: pass_flags(pass),
        _pad: [0; 3],
    })
}

/// Serialize one resolved pipeline set and its compiled stages into a
/// single binary artifact
pub fn output_pipeline_set(
    set: &ResolvedPipelineSet,
    artifacts: &GraphicsArtifacts,
) -> Result<PipelineOutput, OutputError> {
    if artifacts.configurations.len() != set.configurations.len() {
        return Err(OutputError::ConfigurationCountMismatch {
            set: set.name.clone(),
            resolved: set.configurations.len(),
            artifacts: artifacts.configurations.len(),
        });
    }

    let mut sections = Sections::default();

    for (config, config_artifacts) in set.configurations.iter().zip(&artifacts.configurations) {
        if config_artifacts.passes.len() != config.passes.len() {
            return Err(OutputError::PassCountMismatch {
                configuration: config.name.clone(),
                resolved: config.passes.len(),
                artifacts: config_artifacts.passes.len(),
            });
        }

        let pass_start = index16(sections.passes.len(), "passes")?;
        for (pass, pass_artifacts) in config.passes.iter().zip(&config_artifacts.passes) {
            let stages = ordered_stages(&pass.name, &pass.stage_entry_points, &pass_artifacts.stages)?;
            let header = encode_pass(&mut sections, pass, &stages)?;
            sections.passes.push(header);
        }

        let name_offset = sections.push_string(&config.name);
        sections.graphics_configurations.push(GraphicsConfigurationHeader {
            name_offset,
            pass_start,
            pass_count: index16(config.passes.len(), "passes")?,
        });
    }

    let parameter_count = index16(set.parameters.len(), "material parameters")?;
    for parameter in &set.parameters {
        let name_offset = sections.push_string(&parameter.name);
        let default_value_offset = sections.push_string(&parameter.default_value);
        sections.material_parameters.push(MaterialParameterHeader {
            name_offset,
            default_value_offset,
            parameter_type: parameter.parameter_type as u8,
            _pad: [0; 3],
        });
    }

    let name_offset = sections.push_string(&set.name);
    sections.graphics_pipelines.push(GraphicsPipelineHeader {
        name_offset,
        configuration_start: 0,
        configuration_count: index16(set.configurations.len(), "configurations")?,
        material_parameter_start: 0,
        material_parameter_count: parameter_count,
        material_resource_start: 0,
        material_resource_count: index16(sections.material_resources.len(), "material resources")?,
    });

    Ok(PipelineOutput {
        name: set.name.clone(),
        pipeline_type: PipelineType::Graphics,
        content: sections.assemble(),
    })
}

/// Serialize one resolved compute set and its single compiled stage
pub fn output_compute_set(
    compute: &ResolvedComputeSet,
    artifacts: &ComputeArtifacts,
) -> Result<PipelineOutput, OutputError> {
    if artifacts.stage.stage != ShaderStage::Compute {
        return Err(OutputError::WrongComputeStage {
            set: compute.name.clone(),
            stage: artifacts.stage.stage,
        });
    }

    let mut sections = Sections::default();

    let code_offset = sections.push_bytes(&artifacts.stage.bytecode);
    sections.shader_stages.push(ShaderStageHeader {
        code_offset,
        code_size: artifacts.stage.bytecode.len() as u32,
        stage: ShaderStage::Compute as u8,
        _pad: [0; 3],
    });

    let (descriptor_set_start, descriptor_set_count, descriptor_binding_start, descriptor_binding_count) =
        sections.encode_descriptors(&[&artifacts.stage], false)?;

    sections.compute_configurations.push(ComputeConfigurationHeader {
        shader_stage_start: 0,
        shader_stage_count: 1,
        descriptor_set_start,
        descriptor_set_count,
        descriptor_binding_start,
        descriptor_binding_count,
    });

    let name_offset = sections.push_string(&compute.name);
    sections.compute_pipelines.push(ComputePipelineHeader {
        name_offset,
        configuration_start: 0,
        configuration_count: 1,
    });

    Ok(PipelineOutput {
        name: compute.name.clone(),
        pipeline_type: PipelineType::Compute,
        content: sections.assemble(),
    })
}
