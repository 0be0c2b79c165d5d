//! End-to-end batch conversion through the driver

use psl::formats::{CullMode, ShaderStage, PASS_FLAG_DEPTH_TEST, PASS_FLAG_DEPTH_WRITE};
use psl::ir::{CompileError, StageArtifacts};
use psl::output::PipelineFile;
use psl::text::MemoryLogger;
use psl::{CompileRequest, Conditioner, PipelineOutput, PipelineType, ShaderCompiler};
use std::fs;
use std::path::Path;

/// Compiler stub that emits the request back as bytecode so tests can see
/// exactly what was compiled
struct EchoCompiler;

impl ShaderCompiler for EchoCompiler {
    fn compile(&self, request: CompileRequest) -> Result<StageArtifacts, CompileError> {
        let bytecode = format!("{}|{}", request.entry_point, request.code).into_bytes();
        Ok(StageArtifacts {
            stage: request.stage,
            hash: bytecode.len() as u64,
            bytecode,
            debug_data: Vec::new(),
            descriptor_sets: Vec::new(),
        })
    }
}

/// Compiler stub that refuses one entry point by name
struct FailingCompiler(&'static str);

impl ShaderCompiler for FailingCompiler {
    fn compile(&self, request: CompileRequest) -> Result<StageArtifacts, CompileError> {
        if request.entry_point == self.0 {
            return Err(CompileError::Compilation {
                entry_point: request.entry_point.to_string(),
                message: "refused".to_string(),
            });
        }
        EchoCompiler.compile(request)
    }
}

fn write_source(dir: &Path, name: &str, source: &str) {
    fs::write(dir.join(name), source).unwrap();
}

fn convert(
    logger: &MemoryLogger,
    compiler: &dyn ShaderCompiler,
    files: &[&Path],
) -> (bool, Vec<PipelineOutput>) {
    let mut conditioner = Conditioner::new(logger, compiler);
    for file in files {
        conditioner.add_file(*file);
    }
    let mut outputs = Vec::new();
    let success = conditioner.convert(&mut |output| {
        outputs.push(output);
        Ok(())
    });
    (success, outputs)
}

#[test]
fn end_to_end_scenario() {
    let dir = tempfile::tempdir().unwrap();
    write_source(
        dir.path(),
        "m.pset",
        r#"pipelineSet "M" {
            configuration "Default" {
                pass "P0" {
                    shaderEntrypoint: vertex main
                    shaderGlsl { void main(){} }
                    properties { cull: back }
                }
            }
        }"#,
    );

    let logger = MemoryLogger::new();
    let (success, outputs) = convert(&logger, &EchoCompiler, &[&dir.path().join("m.pset")]);
    assert!(success, "unexpected errors: {:?}", logger.events());
    assert_eq!(outputs.len(), 1);

    let output = &outputs[0];
    assert_eq!(output.name, "M");
    assert_eq!(output.pipeline_type, PipelineType::Graphics);

    let file = PipelineFile::read(&output.content).unwrap();
    assert_eq!(file.graphics_pipelines.len(), 1);
    assert_eq!(file.passes.len(), 1);

    let pass = &file.passes[0];
    assert_eq!(file.blob_str(pass.pipeline_name_offset).unwrap(), "P0");
    assert_eq!(pass.cull_mode, CullMode::Back as u8);
    assert_ne!(pass.flags & PASS_FLAG_DEPTH_TEST, 0);
    assert_ne!(pass.flags & PASS_FLAG_DEPTH_WRITE, 0);

    // One vertex stage, compiled from the flattened inline body
    assert_eq!(pass.shader_stage_count, 1);
    let stage = &file.shader_stages[pass.shader_stage_start as usize];
    assert_eq!(stage.stage, ShaderStage::Vertex as u8);
    assert_eq!(
        file.blob_bytes(stage.code_offset, stage.code_size).unwrap(),
        b"main| void main(){} "
    );
}

#[test]
fn includes_are_followed() {
    let dir = tempfile::tempdir().unwrap();
    write_source(
        dir.path(),
        "base.pset",
        r#"pass abstract "Base" {
            shaderEntrypoint: vertex main
            shaderGlsl { X }
        }"#,
    );
    write_source(
        dir.path(),
        "main.pset",
        r#"include "base.pset"
           pipelineSet "M" {
               configuration "Default" {
                   pass "P" clones "Base" { }
               }
           }"#,
    );

    let logger = MemoryLogger::new();
    let (success, outputs) = convert(&logger, &EchoCompiler, &[&dir.path().join("main.pset")]);
    assert!(success, "unexpected errors: {:?}", logger.events());
    assert_eq!(outputs.len(), 1);

    let file = PipelineFile::read(&outputs[0].content).unwrap();
    let stage = &file.shader_stages[0];
    assert_eq!(
        file.blob_bytes(stage.code_offset, stage.code_size).unwrap(),
        b"main| X "
    );
}

#[test]
fn include_cycles_terminate() {
    let dir = tempfile::tempdir().unwrap();
    write_source(dir.path(), "a.pset", r#"include "b.pset""#);
    write_source(dir.path(), "b.pset", r#"include "a.pset""#);

    let logger = MemoryLogger::new();
    let (success, outputs) = convert(&logger, &EchoCompiler, &[&dir.path().join("a.pset")]);
    assert!(success);
    assert!(outputs.is_empty());
}

#[test]
fn failing_object_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_source(
        dir.path(),
        "two.pset",
        r#"pipelineSet "Bad" {
               configuration "Default" {
                   pass "P" {
                       shaderEntrypoint: vertex badEntry
                       shaderGlsl { a }
                   }
               }
           }
           pipelineSet "Good" {
               configuration "Default" {
                   pass "P" {
                       shaderEntrypoint: vertex main
                       shaderGlsl { b }
                   }
               }
           }"#,
    );

    let logger = MemoryLogger::new();
    let (success, outputs) = convert(
        &logger,
        &FailingCompiler("badEntry"),
        &[&dir.path().join("two.pset")],
    );
    assert!(!success);
    assert!(logger.has_errors());
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].name, "Good");
}

#[test]
fn inheritance_cycle_produces_errors_and_no_output() {
    let dir = tempfile::tempdir().unwrap();
    write_source(
        dir.path(),
        "cycle.pset",
        r#"pipelineSet "A" inherits "B" { }
           pipelineSet "B" inherits "A" { }"#,
    );

    let logger = MemoryLogger::new();
    let (success, outputs) = convert(&logger, &EchoCompiler, &[&dir.path().join("cycle.pset")]);
    assert!(!success);
    assert!(logger.has_errors());
    assert!(outputs.is_empty());
}

#[test]
fn missing_file_is_reported() {
    let logger = MemoryLogger::new();
    let (success, outputs) = convert(&logger, &EchoCompiler, &[Path::new("does-not-exist.pset")]);
    assert!(!success);
    assert!(logger.has_errors());
    assert!(outputs.is_empty());
}

#[test]
fn directory_scan_honors_the_pattern() {
    let dir = tempfile::tempdir().unwrap();
    write_source(
        dir.path(),
        "one.pset",
        r#"computeSet "C1" { shaderEntrypoint: compute main shaderGlsl { a } }"#,
    );
    write_source(
        dir.path(),
        "two.pset",
        r#"computeSet "C2" { shaderEntrypoint: compute main shaderGlsl { b } }"#,
    );
    write_source(dir.path(), "notes.txt", "not a pipeline");

    let logger = MemoryLogger::new();
    let mut conditioner = Conditioner::new(&logger, &EchoCompiler);
    conditioner.add_directory(dir.path(), "*.pset").unwrap();

    let mut outputs = Vec::new();
    let success = conditioner.convert(&mut |output| {
        outputs.push(output);
        Ok(())
    });
    assert!(success, "unexpected errors: {:?}", logger.events());

    let mut names: Vec<&str> = outputs.iter().map(|o| o.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["C1", "C2"]);
    assert!(outputs.iter().all(|o| o.pipeline_type == PipelineType::Compute));
}

#[test]
fn write_failures_are_reported_per_object() {
    let dir = tempfile::tempdir().unwrap();
    write_source(
        dir.path(),
        "c.pset",
        r#"computeSet "C" { shaderEntrypoint: compute main shaderGlsl { a } }"#,
    );

    let logger = MemoryLogger::new();
    let mut conditioner = Conditioner::new(&logger, &EchoCompiler);
    conditioner.add_file(dir.path().join("c.pset"));

    let success = conditioner.convert(&mut |_| {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
    });
    assert!(!success);
    assert!(logger.has_errors());
}
