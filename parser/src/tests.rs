use crate::parse;
use psl_ast::{ParentKind, ParseTree};
use psl_formats::{
    BlendFactor, BlendOperation, ColorMask, CullMode, ParameterType, ShaderStage, SourceLanguage,
};
use psl_text::MemoryLogger;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

struct ParseOutcome {
    tree: ParseTree,
    includes: BTreeSet<PathBuf>,
    success: bool,
    logger: MemoryLogger,
}

fn parse_source(source: &str) -> ParseOutcome {
    let logger = MemoryLogger::new();
    let path = Path::new("test.pset");
    let tokens = psl_lexer::scan(source, path, &logger);
    let mut tree = ParseTree::default();
    let mut includes = BTreeSet::new();
    let success = parse(&tokens, path, &logger, &mut tree, &mut includes);
    ParseOutcome {
        tree,
        includes,
        success,
        logger,
    }
}

fn parse_ok(source: &str) -> ParseTree {
    let outcome = parse_source(source);
    assert!(
        outcome.success,
        "unexpected parse errors: {:?}",
        outcome.logger.events()
    );
    outcome.tree
}

#[test]
fn parse_empty_source() {
    let tree = parse_ok("");
    assert_eq!(tree, ParseTree::default());
}

#[test]
fn parse_include_directive() {
    let outcome = parse_source("include \"common.pset\"");
    assert!(outcome.success);
    assert!(outcome.includes.contains(Path::new("common.pset")));
}

#[test]
fn parse_minimal_pipeline_set() {
    let tree = parse_ok(
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

    let set = &tree.pipeline_sets["M"];
    assert!(!set.is_abstract);
    let config = &set.configurations["Default"];
    let pass = &config.passes["P0"];
    assert_eq!(
        pass.shader_block.stage_entry_points[ShaderStage::Vertex.index()],
        "main"
    );
    assert_eq!(pass.shader_block.language, SourceLanguage::Glsl);
    assert_eq!(pass.shader_block.code, " void main(){} ");
    assert_eq!(pass.render_state.cull_mode, Some(CullMode::Back));
}

#[test]
fn parse_abstract_and_parents() {
    let tree = parse_ok(
        r#"pass abstract "Base" { }
           pass "D1" inherits "Base" { }
           pass "D2" clones "Base" { }"#,
    );

    assert!(tree.generic_passes["Base"].is_abstract);
    let d1 = tree.generic_passes["D1"].parent.as_ref().unwrap();
    assert_eq!(d1.name, "Base");
    assert_eq!(d1.kind, ParentKind::Inherit);
    let d2 = tree.generic_passes["D2"].parent.as_ref().unwrap();
    assert_eq!(d2.kind, ParentKind::Clone);
}

#[test]
fn parse_geometry_stage_entry_point() {
    // "geometry" is also the render-state key; after shaderEntrypoint it
    // must read as the geometry stage
    let tree = parse_ok(
        r#"pass "P" {
            shaderEntrypoint: geometry gsMain
            properties { geometry: triangleStrips }
        }"#,
    );
    let pass = &tree.generic_passes["P"];
    assert_eq!(
        pass.shader_block.stage_entry_points[ShaderStage::Geometry.index()],
        "gsMain"
    );
    assert_eq!(
        pass.render_state.geometry_type,
        Some(psl_formats::GeometryType::TriangleStrips)
    );
}

#[test]
fn parse_depth_bias_variants() {
    let bool_form = parse_ok(r#"pass "P" { properties { depthBias: false } }"#);
    assert_eq!(
        bool_form.generic_passes["P"]
            .render_state
            .is_depth_bias_enabled,
        Some(false)
    );

    let numbers = parse_ok(r#"pass "P" { properties { depthBias: 1.25, 2, 3 } }"#);
    let state = &numbers.generic_passes["P"].render_state;
    assert_eq!(state.is_depth_bias_enabled, Some(true));
    assert_eq!(state.depth_bias_constant_factor, Some(1.25));
    assert_eq!(state.depth_bias_slope_factor, Some(2.0));
    assert_eq!(state.depth_bias_clamp, Some(3.0));

    let bare = parse_ok(r#"pass "P" { properties { depthBias: 1 2 } }"#);
    let state = &bare.generic_passes["P"].render_state;
    assert_eq!(state.is_depth_bias_enabled, Some(true));
    assert_eq!(state.depth_bias_constant_factor, Some(1.0));
    assert_eq!(state.depth_bias_slope_factor, Some(2.0));
    assert_eq!(state.depth_bias_clamp, None);
}

#[test]
fn parse_single_attachment_broadcasts() {
    let tree = parse_ok(
        r#"pass "P" {
            properties {
                attachments: { colorMask: rg blendPreset: translucent }
            }
        }"#,
    );
    let state = &tree.generic_passes["P"].render_state;
    assert!(state.broadcast_first_attachment);
    assert_eq!(state.attachments.len(), 1);
    let attachment = &state.attachments[0];
    assert_eq!(
        attachment.color_mask,
        Some(ColorMask::RED | ColorMask::GREEN)
    );
    assert_eq!(attachment.blend_color_operation, Some(BlendOperation::Add));
    assert_eq!(
        attachment.blend_color_factor_dst,
        Some(BlendFactor::OneMinusSrcAlpha)
    );
    assert_eq!(attachment.blend_alpha_factor_dst, Some(BlendFactor::Zero));
}

#[test]
fn parse_attachment_list() {
    let tree = parse_ok(
        r#"pass "P" {
            properties {
                attachments: [
                    { colorMask: rgba },
                    { blendColor: add one zero }
                ]
            }
        }"#,
    );
    let state = &tree.generic_passes["P"].render_state;
    assert!(!state.broadcast_first_attachment);
    assert_eq!(state.attachments.len(), 2);
    assert_eq!(state.attachments[0].color_mask, Some(ColorMask::RGBA));
    assert_eq!(
        state.attachments[1].blend_color_operation,
        Some(BlendOperation::Add)
    );
    assert_eq!(
        state.attachments[1].blend_color_factor_src,
        Some(BlendFactor::One)
    );
    assert_eq!(
        state.attachments[1].blend_color_factor_dst,
        Some(BlendFactor::Zero)
    );
}

#[test]
fn color_mask_rejects_unknown_characters() {
    let outcome = parse_source(r#"pass "P" { properties { attachments: { colorMask: rgbx } } }"#);
    assert!(!outcome.success);
    // The valid characters still contribute
    assert_eq!(
        outcome.tree.generic_passes["P"].render_state.attachments[0].color_mask,
        Some(ColorMask::RED | ColorMask::GREEN | ColorMask::BLUE)
    );
}

#[test]
fn parse_shader_block_with_requirements() {
    let tree = parse_ok(
        r#"shaderBlock lighting {
            requiresBlocks: [ math, shadows ]
            shaderGlsl { vec3 light(); }
        }"#,
    );
    let block = &tree.generic_shader_blocks["lighting"];
    assert_eq!(block.required_blocks, vec!["math", "shadows"]);
    assert_eq!(block.language, SourceLanguage::Glsl);
    // Referenced blocks are not created implicitly
    assert!(!tree.generic_shader_blocks.contains_key("math"));
}

#[test]
fn shader_language_must_not_change() {
    let outcome = parse_source(
        r#"shaderBlock b {
            shaderGlsl { a }
            shaderHlsl { b }
        }"#,
    );
    assert!(!outcome.success);
    let block = &outcome.tree.generic_shader_blocks["b"];
    assert_eq!(block.language, SourceLanguage::Glsl);
    assert_eq!(block.code, " a ");
}

#[test]
fn parse_configuration_tags_and_render_queue() {
    let tree = parse_ok(
        r#"configuration "Forward" {
            rendererTags: "forward" "mobile"
            pass "P" {
                renderQueue: "Opaque"
            }
        }"#,
    );
    let config = &tree.generic_configurations["Forward"];
    assert_eq!(config.tags, vec!["forward", "mobile"]);
    assert_eq!(
        config.passes["P"].render_queue.as_deref(),
        Some("Opaque")
    );
}

#[test]
fn parse_compute_set() {
    let tree = parse_ok(
        r#"computeSet "Blur" {
            shaderEntrypoint: compute csMain
            requiresBlocks: [ math ]
            shaderGlsl { void cs(){} }
        }"#,
    );
    let compute = &tree.compute_sets["Blur"];
    assert_eq!(
        compute.shader_block.stage_entry_points[ShaderStage::Compute.index()],
        "csMain"
    );
    assert_eq!(compute.shader_block.required_blocks, vec!["math"]);
}

#[test]
fn parse_material_parameters() {
    let tree = parse_ok(
        r#"pipelineSet "M" {
            parameters {
                parameterColor tint: white,
                parameterFloat roughness: 0.5
            }
        }"#,
    );
    let parameters = &tree.pipeline_sets["M"].parameters;
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].parameter_type, ParameterType::Color);
    assert_eq!(parameters[0].name, "tint");
    assert_eq!(parameters[0].default_value, "white");
    assert_eq!(parameters[1].parameter_type, ParameterType::Float);
    assert_eq!(parameters[1].default_value, "0.5");
}

#[test]
fn unexpected_tokens_are_skipped_not_fatal() {
    let outcome = parse_source(
        r#"pipelineSet "M" {
            ; ; ;
            configuration "Default" { }
        }"#,
    );
    assert!(!outcome.success);
    // The configuration after the bad tokens still parses
    assert!(outcome.tree.pipeline_sets["M"]
        .configurations
        .contains_key("Default"));
}

#[test]
fn forward_references_create_pool_entries() {
    let tree = parse_ok(r#"pass "D" inherits "NotYetSeen" { }"#);
    assert!(tree.generic_passes.contains_key("D"));
    // The parent is recorded by name only; existence is checked at resolve
    assert_eq!(
        tree.generic_passes["D"].parent.as_ref().unwrap().name,
        "NotYetSeen"
    );
}
