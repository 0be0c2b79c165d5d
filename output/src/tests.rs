use crate::{output_compute_set, output_pipeline_set, OutputError, PipelineFile};
use psl_formats::{
    BindingType, PipelineType, ShaderStage, SourceLanguage, NO_BLOB_ENTRY,
    PASS_FLAG_BROADCAST_ATTACHMENT, PASS_FLAG_DEPTH_TEST, PASS_FLAG_DEPTH_WRITE,
};
use psl_ir::{
    ComputeArtifacts, ConfigurationArtifacts, DescriptorBindingReflection,
    DescriptorSetReflection, GraphicsArtifacts, PassArtifacts, ResolvedComputeSet,
    ResolvedConfiguration, ResolvedParameter, ResolvedPass, ResolvedPipelineSet, StageArtifacts,
};

fn stage_artifacts(stage: ShaderStage, bytecode: &[u8]) -> StageArtifacts {
    StageArtifacts {
        stage,
        bytecode: bytecode.to_vec(),
        debug_data: Vec::new(),
        hash: 0,
        descriptor_sets: Vec::new(),
    }
}

fn reflected_binding(stage: ShaderStage, binding_type: BindingType, name: &str) -> DescriptorSetReflection {
    DescriptorSetReflection {
        set_index: 0,
        bindings: vec![DescriptorBindingReflection {
            binding_index: 0,
            count: 1,
            binding_type,
            stages: stage.bit(),
            name: Some(name.to_string()),
        }],
    }
}

fn pass(name: &str, queue: Option<&str>, stages: &[ShaderStage]) -> ResolvedPass {
    let mut pass = ResolvedPass {
        name: name.to_string(),
        render_queue: queue.map(str::to_string),
        language: SourceLanguage::Glsl,
        code: "void main(){}".to_string(),
        ..ResolvedPass::default()
    };
    for stage in stages {
        pass.stage_entry_points[stage.index()] = "main".to_string();
    }
    pass
}

fn two_pass_set() -> (ResolvedPipelineSet, GraphicsArtifacts) {
    let set = ResolvedPipelineSet {
        name: "M".to_string(),
        source_path: "m.pset".into(),
        parameters: vec![ResolvedParameter {
            parameter_type: psl_formats::ParameterType::Color,
            name: "tint".to_string(),
            default_value: "white".to_string(),
        }],
        configurations: vec![ResolvedConfiguration {
            name: "Default".to_string(),
            tags: vec!["forward".to_string()],
            passes: vec![
                pass("P0", Some("Opaque"), &[ShaderStage::Vertex, ShaderStage::Fragment]),
                pass("P1", None, &[ShaderStage::Vertex, ShaderStage::Fragment]),
            ],
        }],
    };

    let artifacts = GraphicsArtifacts {
        configurations: vec![ConfigurationArtifacts {
            passes: vec![
                PassArtifacts {
                    stages: vec![
                        stage_artifacts(ShaderStage::Vertex, b"vs0"),
                        stage_artifacts(ShaderStage::Fragment, b"fs0"),
                    ],
                },
                PassArtifacts {
                    stages: vec![
                        stage_artifacts(ShaderStage::Vertex, b"vs1"),
                        stage_artifacts(ShaderStage::Fragment, b"fs1"),
                    ],
                },
            ],
        }],
    };

    (set, artifacts)
}

#[test]
fn binary_round_trip() {
    let (set, artifacts) = two_pass_set();
    let output = output_pipeline_set(&set, &artifacts).unwrap();
    assert_eq!(output.name, "M");
    assert_eq!(output.pipeline_type, PipelineType::Graphics);

    let file = PipelineFile::read(&output.content).unwrap();
    assert_eq!(file.graphics_pipelines.len(), 1);
    assert_eq!(file.graphics_configurations.len(), 1);
    assert_eq!(file.passes.len(), 2);
    assert_eq!(file.shader_stages.len(), 4);

    let pipeline = &file.graphics_pipelines[0];
    assert_eq!(file.blob_str(pipeline.name_offset).unwrap(), "M");
    assert_eq!(pipeline.configuration_count, 1);
    assert_eq!(pipeline.material_parameter_count, 1);

    let config = &file.graphics_configurations[0];
    assert_eq!(file.blob_str(config.name_offset).unwrap(), "Default");
    assert_eq!(config.pass_start, 0);
    assert_eq!(config.pass_count, 2);

    let p0 = &file.passes[0];
    assert_eq!(file.blob_str(p0.pipeline_name_offset).unwrap(), "P0");
    assert_eq!(file.blob_str(p0.render_queue_offset).unwrap(), "Opaque");
    let p1 = &file.passes[1];
    assert_eq!(file.blob_str(p1.pipeline_name_offset).unwrap(), "P1");
    assert_eq!(p1.render_queue_offset, NO_BLOB_ENTRY);

    let expected_bytecode: [&[u8]; 4] = [b"vs0", b"fs0", b"vs1", b"fs1"];
    for (header, expected) in file.shader_stages.iter().zip(expected_bytecode) {
        assert_eq!(
            file.blob_bytes(header.code_offset, header.code_size).unwrap(),
            expected
        );
    }
    assert_eq!(file.shader_stages[0].stage, ShaderStage::Vertex as u8);
    assert_eq!(file.shader_stages[1].stage, ShaderStage::Fragment as u8);

    // Default render state flags: depth test + write on, broadcast on
    let expected_flags = PASS_FLAG_DEPTH_TEST | PASS_FLAG_DEPTH_WRITE | PASS_FLAG_BROADCAST_ATTACHMENT;
    assert_eq!(p0.flags, expected_flags);
    assert_eq!(p1.flags, expected_flags);

    let parameter = &file.material_parameters[0];
    assert_eq!(file.blob_str(parameter.name_offset).unwrap(), "tint");
    assert_eq!(file.blob_str(parameter.default_value_offset).unwrap(), "white");
}

#[test]
fn descriptor_consolidation_merges_stage_bits() {
    let (set, mut artifacts) = two_pass_set();
    artifacts.configurations[0].passes[0].stages[0].descriptor_sets =
        vec![reflected_binding(ShaderStage::Vertex, BindingType::UniformBuffer, "globals")];
    artifacts.configurations[0].passes[0].stages[1].descriptor_sets =
        vec![reflected_binding(ShaderStage::Fragment, BindingType::UniformBuffer, "globals")];

    let output = output_pipeline_set(&set, &artifacts).unwrap();
    let file = PipelineFile::read(&output.content).unwrap();

    let p0 = &file.passes[0];
    assert_eq!(p0.descriptor_set_count, 1);
    assert_eq!(p0.descriptor_binding_count, 1);

    let binding = &file.descriptor_bindings[p0.descriptor_binding_start as usize];
    assert_eq!(binding.binding_index, 0);
    assert_eq!(
        binding.stage_flags,
        (ShaderStage::Vertex.bit() | ShaderStage::Fragment.bit()).0
    );
    assert_eq!(file.blob_str(binding.name_offset).unwrap(), "globals");

    // Uniform buffers are not material resources
    assert!(file.material_resources.is_empty());
}

#[test]
fn named_textures_become_material_resources() {
    let (set, mut artifacts) = two_pass_set();
    artifacts.configurations[0].passes[0].stages[1].descriptor_sets =
        vec![reflected_binding(ShaderStage::Fragment, BindingType::Texture, "albedo")];

    let output = output_pipeline_set(&set, &artifacts).unwrap();
    let file = PipelineFile::read(&output.content).unwrap();

    assert_eq!(file.material_resources.len(), 1);
    let resource = &file.material_resources[0];
    assert_eq!(file.blob_str(resource.name_offset).unwrap(), "albedo");
    assert_eq!(resource.set_index, 0);
    assert_eq!(resource.binding_index, 0);
    assert_eq!(file.graphics_pipelines[0].material_resource_count, 1);
}

#[test]
fn missing_stage_is_an_error() {
    let (set, mut artifacts) = two_pass_set();
    artifacts.configurations[0].passes[0].stages.pop();

    match output_pipeline_set(&set, &artifacts) {
        Err(OutputError::MissingStage { pass, stage }) => {
            assert_eq!(pass, "P0");
            assert_eq!(stage, ShaderStage::Fragment);
        }
        other => panic!("expected MissingStage, got {other:?}"),
    }
}

#[test]
fn unexpected_stage_is_an_error() {
    let (set, mut artifacts) = two_pass_set();
    artifacts.configurations[0].passes[0]
        .stages
        .push(stage_artifacts(ShaderStage::Geometry, b"gs"));

    assert!(matches!(
        output_pipeline_set(&set, &artifacts),
        Err(OutputError::UnexpectedStage { .. })
    ));
}

#[test]
fn pass_count_mismatch_is_an_error() {
    let (set, mut artifacts) = two_pass_set();
    artifacts.configurations[0].passes.pop();

    assert!(matches!(
        output_pipeline_set(&set, &artifacts),
        Err(OutputError::PassCountMismatch { .. })
    ));
}

#[test]
fn compute_round_trip() {
    let compute = ResolvedComputeSet {
        name: "Blur".to_string(),
        source_path: "blur.pset".into(),
        language: SourceLanguage::Glsl,
        code: "void cs(){}".to_string(),
        entry_point: "cs_main".to_string(),
    };
    let mut stage = stage_artifacts(ShaderStage::Compute, b"cs");
    stage.descriptor_sets =
        vec![reflected_binding(ShaderStage::Compute, BindingType::StorageImage, "target")];
    let artifacts = ComputeArtifacts { stage };

    let output = output_compute_set(&compute, &artifacts).unwrap();
    assert_eq!(output.pipeline_type, PipelineType::Compute);

    let file = PipelineFile::read(&output.content).unwrap();
    assert!(file.graphics_pipelines.is_empty());
    assert_eq!(file.compute_pipelines.len(), 1);
    assert_eq!(file.compute_configurations.len(), 1);
    assert_eq!(file.shader_stages.len(), 1);

    let pipeline = &file.compute_pipelines[0];
    assert_eq!(file.blob_str(pipeline.name_offset).unwrap(), "Blur");

    let config = &file.compute_configurations[0];
    assert_eq!(config.shader_stage_count, 1);
    assert_eq!(config.descriptor_binding_count, 1);

    let stage = &file.shader_stages[0];
    assert_eq!(stage.stage, ShaderStage::Compute as u8);
    assert_eq!(file.blob_bytes(stage.code_offset, stage.code_size).unwrap(), b"cs");
}

#[test]
fn wrong_compute_stage_is_an_error() {
    let compute = ResolvedComputeSet {
        name: "Blur".to_string(),
        ..ResolvedComputeSet::default()
    };
    let artifacts = ComputeArtifacts {
        stage: stage_artifacts(ShaderStage::Vertex, b"vs"),
    };

    assert!(matches!(
        output_compute_set(&compute, &artifacts),
        Err(OutputError::WrongComputeStage { .. })
    ));
}

#[test]
fn reader_rejects_garbage() {
    assert!(matches!(PipelineFile::read(b"nope"), Err(crate::ReadError::Truncated)));

    let mut bytes = vec![0u8; 200];
    bytes[..4].copy_from_slice(b"XXXX");
    assert!(matches!(PipelineFile::read(&bytes), Err(crate::ReadError::BadMagic)));
}
