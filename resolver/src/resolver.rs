//! Inheritance chain merging, render-state defaulting and shader-block
//! collapse

use psl_ast::{
    AttachmentState, ComputeSet, Configuration, ParentKind, ParentLink, ParseTree, Pass,
    PipelineSet, RenderState, ShaderBlock,
};
use psl_formats::{
    BlendFactor, BlendOperation, ColorMask, CompareOperation, CullMode, GeometryType,
    PolygonFillMode, ShaderStage, SourceLanguage,
};
use psl_ir::{
    ResolvedAttachment, ResolvedComputeSet, ResolvedConfiguration, ResolvedParameter,
    ResolvedPass, ResolvedPipelineSet, ResolvedRenderState, ResolvedStateTree,
};
use psl_text::{LogEvent, LogSource, Logger, Severity};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Longest inheritance chain an object may have before resolution gives up
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Flatten every non-abstract object in the parse tree.
///
/// Objects with broken parent chains (unknown parent, cycle, excessive
/// depth) are reported and skipped; the remaining objects still resolve, so
/// one batch surfaces every resolve error at once.
pub fn resolve(tree: &ParseTree, logger: &dyn Logger) -> ResolvedStateTree {
    let mut resolved = ResolvedStateTree::default();

    for (name, set) in &tree.pipeline_sets {
        if set.is_abstract {
            continue;
        }
        if let Some(set) = resolve_pipeline_set(name, set, tree, logger) {
            resolved.pipeline_sets.push(set);
        }
    }

    for (name, compute) in &tree.compute_sets {
        if let Some(compute) = resolve_compute_set(name, compute, tree, logger) {
            resolved.compute_sets.push(compute);
        }
    }

    resolved
}

fn error(logger: &dyn Logger, path: &Path, message: &str) {
    logger.log(LogEvent::file(
        Severity::Error,
        LogSource::Resolver,
        message,
        path,
    ));
}

/// Walk an object's parent chain, most derived first. Returns `None` after
/// reporting a cycle, an unknown parent, or a chain deeper than
/// [MAX_INHERITANCE_DEPTH].
fn collect_chain<'t, T>(
    name: &str,
    root: &'t T,
    lookup: impl Fn(&str) -> Option<&'t T>,
    parent_of: impl Fn(&'t T) -> Option<&'t ParentLink>,
    path: &Path,
    logger: &dyn Logger,
) -> Option<Vec<&'t T>> {
    let mut visited = BTreeSet::new();
    visited.insert(name.to_string());

    let mut chain = vec![root];
    let mut current = root;

    while let Some(link) = parent_of(current) {
        if !visited.insert(link.name.clone()) {
            let message = format!("Cyclical dependency detected while resolving '{name}'");
            error(logger, path, &message);
            return None;
        }
        if chain.len() >= MAX_INHERITANCE_DEPTH {
            let message = format!(
                "Inheritance chain of '{name}' is deeper than {MAX_INHERITANCE_DEPTH}"
            );
            error(logger, path, &message);
            return None;
        }
        let parent = match lookup(&link.name) {
            Some(parent) => parent,
            None => {
                let message = format!("Unknown parent '{}' of '{}'", link.name, name);
                error(logger, path, &message);
                return None;
            }
        };
        chain.push(parent);
        current = parent;
    }

    Some(chain)
}

/// Merge a collected chain into one object, most derived first. Scalar
/// fields are first writer wins; shader code and block requirements
/// accumulate, with code propagation stopping at the first `inherits` link
/// (`clones` links keep it flowing).
fn flatten_chain<T: Clone>(
    chain: &[&T],
    parent_of: impl Fn(&T) -> Option<&ParentLink>,
    merge: impl Fn(&mut T, &T, bool),
) -> T {
    let mut merged = chain[0].clone();
    let mut copy_code = true;

    for index in 1..chain.len() {
        if let Some(link) = parent_of(chain[index - 1]) {
            if link.kind == ParentKind::Inherit {
                copy_code = false;
            }
        }
        merge(&mut merged, chain[index], copy_code);
    }

    merged
}

fn merge_option<T: Clone>(dest: &mut Option<T>, src: &Option<T>) {
    if dest.is_none() {
        *dest = src.clone();
    }
}

fn merge_render_state(dest: &mut RenderState, src: &RenderState) {
    merge_option(&mut dest.geometry_type, &src.geometry_type);
    merge_option(&mut dest.polygon_fill_mode, &src.polygon_fill_mode);
    merge_option(&mut dest.cull_mode, &src.cull_mode);
    merge_option(&mut dest.depth_compare_op, &src.depth_compare_op);
    merge_option(&mut dest.is_depth_test_enabled, &src.is_depth_test_enabled);
    merge_option(&mut dest.is_depth_write_enabled, &src.is_depth_write_enabled);
    merge_option(&mut dest.is_depth_bias_enabled, &src.is_depth_bias_enabled);
    merge_option(&mut dest.is_depth_clamp_enabled, &src.is_depth_clamp_enabled);
    merge_option(&mut dest.is_stencil_enabled, &src.is_stencil_enabled);
    merge_option(
        &mut dest.depth_bias_constant_factor,
        &src.depth_bias_constant_factor,
    );
    merge_option(
        &mut dest.depth_bias_slope_factor,
        &src.depth_bias_slope_factor,
    );
    merge_option(&mut dest.depth_bias_clamp, &src.depth_bias_clamp);

    if dest.attachments.is_empty() && !src.attachments.is_empty() {
        dest.attachments = src.attachments.clone();
        dest.broadcast_first_attachment = src.broadcast_first_attachment;
    }
}

fn merge_shader_block(dest: &mut ShaderBlock, src: &ShaderBlock, copy_code: bool) {
    if dest.language == SourceLanguage::Unset {
        dest.language = src.language;
    }
    // Block requirements union across the whole chain
    for name in &src.required_blocks {
        if !dest.required_blocks.contains(name) {
            dest.required_blocks.push(name.clone());
        }
    }
    for (dest_entry, src_entry) in dest.stage_entry_points.iter_mut().zip(&src.stage_entry_points)
    {
        if dest_entry.is_empty() {
            *dest_entry = src_entry.clone();
        }
    }
    if copy_code {
        dest.code.push_str(&src.code);
    }
}

fn merge_pass(dest: &mut Pass, src: &Pass, copy_code: bool) {
    merge_render_state(&mut dest.render_state, &src.render_state);
    merge_shader_block(&mut dest.shader_block, &src.shader_block, copy_code);
    merge_option(&mut dest.render_queue, &src.render_queue);
}

fn merge_configuration(dest: &mut Configuration, src: &Configuration, copy_code: bool) {
    if dest.tags.is_empty() {
        dest.tags = src.tags.clone();
    }
    for (name, pass) in &src.passes {
        match dest.passes.get_mut(name) {
            Some(existing) => merge_pass(existing, pass, copy_code),
            None => {
                let mut copied = pass.clone();
                if !copy_code {
                    copied.shader_block.code.clear();
                }
                dest.passes.insert(name.clone(), copied);
            }
        }
    }
}

fn merge_pipeline_set(dest: &mut PipelineSet, src: &PipelineSet, copy_code: bool) {
    if dest.parameters.is_empty() {
        dest.parameters = src.parameters.clone();
    }
    for (name, config) in &src.configurations {
        match dest.configurations.get_mut(name) {
            Some(existing) => merge_configuration(existing, config, copy_code),
            None => {
                let mut copied = config.clone();
                if !copy_code {
                    for pass in copied.passes.values_mut() {
                        pass.shader_block.code.clear();
                    }
                }
                dest.configurations.insert(name.clone(), copied);
            }
        }
    }
}

fn resolve_pipeline_set(
    name: &str,
    set: &PipelineSet,
    tree: &ParseTree,
    logger: &dyn Logger,
) -> Option<ResolvedPipelineSet> {
    let chain = collect_chain(
        name,
        set,
        |n| tree.pipeline_sets.get(n),
        |s: &PipelineSet| s.parent.as_ref(),
        &set.source_path,
        logger,
    )?;
    let merged = flatten_chain(&chain, |s| s.parent.as_ref(), merge_pipeline_set);

    let mut resolved = ResolvedPipelineSet {
        name: name.to_string(),
        source_path: set.source_path.clone(),
        parameters: merged
            .parameters
            .iter()
            .map(|p| ResolvedParameter {
                parameter_type: p.parameter_type,
                name: p.name.clone(),
                default_value: p.default_value.clone(),
            })
            .collect(),
        configurations: Vec::new(),
    };

    for (config_name, config) in &merged.configurations {
        if config.is_abstract {
            continue;
        }
        if let Some(config) =
            resolve_configuration(config_name, config, &merged.configurations, tree, logger)
        {
            resolved.configurations.push(config);
        }
    }

    Some(resolved)
}

fn resolve_configuration(
    name: &str,
    config: &Configuration,
    siblings: &BTreeMap<String, Configuration>,
    tree: &ParseTree,
    logger: &dyn Logger,
) -> Option<ResolvedConfiguration> {
    // Parents come from the surrounding pipeline set first, then from the
    // generic pool
    let chain = collect_chain(
        name,
        config,
        |n| siblings.get(n).or_else(|| tree.generic_configurations.get(n)),
        |c: &Configuration| c.parent.as_ref(),
        &config.source_path,
        logger,
    )?;
    let merged = flatten_chain(&chain, |c| c.parent.as_ref(), merge_configuration);

    let mut resolved = ResolvedConfiguration {
        name: name.to_string(),
        tags: merged.tags.clone(),
        passes: Vec::new(),
    };

    for (pass_name, pass) in &merged.passes {
        if pass.is_abstract {
            continue;
        }
        if let Some(pass) = resolve_pass(pass_name, pass, &merged.passes, tree, logger) {
            resolved.passes.push(pass);
        }
    }

    Some(resolved)
}

fn resolve_pass(
    name: &str,
    pass: &Pass,
    siblings: &BTreeMap<String, Pass>,
    tree: &ParseTree,
    logger: &dyn Logger,
) -> Option<ResolvedPass> {
    let chain = collect_chain(
        name,
        pass,
        |n| siblings.get(n).or_else(|| tree.generic_passes.get(n)),
        |p: &Pass| p.parent.as_ref(),
        &pass.source_path,
        logger,
    )?;
    let merged = flatten_chain(&chain, |p| p.parent.as_ref(), merge_pass);

    let (language, code) = collapse_shader_code(
        &merged.shader_block,
        &tree.generic_shader_blocks,
        &merged.source_path,
        logger,
    );

    Some(ResolvedPass {
        name: name.to_string(),
        render_queue: merged.render_queue.clone(),
        render_state: apply_render_state_defaults(&merged.render_state),
        language,
        code,
        stage_entry_points: merged.shader_block.stage_entry_points.clone(),
    })
}

fn resolve_compute_set(
    name: &str,
    compute: &ComputeSet,
    tree: &ParseTree,
    logger: &dyn Logger,
) -> Option<ResolvedComputeSet> {
    let (language, code) = collapse_shader_code(
        &compute.shader_block,
        &tree.generic_shader_blocks,
        &compute.source_path,
        logger,
    );

    let entry_point = compute.shader_block.stage_entry_points[ShaderStage::Compute.index()].clone();
    if entry_point.is_empty() {
        let message = format!("Compute set '{name}' has no compute entry point");
        error(logger, &compute.source_path, &message);
        return None;
    }

    Some(ResolvedComputeSet {
        name: name.to_string(),
        source_path: compute.source_path.clone(),
        language,
        code,
        entry_point,
    })
}

/// Concatenate required blocks depth first, each exactly once, then the
/// object's own code last
fn collapse_shader_code(
    block: &ShaderBlock,
    pool: &BTreeMap<String, ShaderBlock>,
    path: &Path,
    logger: &dyn Logger,
) -> (SourceLanguage, String) {
    let mut collapsed = String::new();
    let mut language = SourceLanguage::Unset;
    let mut processed = BTreeSet::new();

    for name in &block.required_blocks {
        append_block(
            name,
            pool,
            &mut processed,
            &mut collapsed,
            &mut language,
            path,
            logger,
        );
    }

    if block.language != SourceLanguage::Unset {
        if language != SourceLanguage::Unset && language != block.language {
            error(logger, path, "Shader blocks mix GLSL and HLSL code");
        }
        language = block.language;
    }
    collapsed.push_str(&block.code);

    (language, collapsed)
}

fn append_block(
    name: &str,
    pool: &BTreeMap<String, ShaderBlock>,
    processed: &mut BTreeSet<String>,
    out: &mut String,
    language: &mut SourceLanguage,
    path: &Path,
    logger: &dyn Logger,
) {
    if !processed.insert(name.to_string()) {
        return;
    }

    let block = match pool.get(name) {
        Some(block) => block,
        None => {
            let message = format!("Unknown shader block '{name}'");
            error(logger, path, &message);
            return;
        }
    };

    for dep in &block.required_blocks {
        append_block(dep, pool, processed, out, language, path, logger);
    }

    if block.language != SourceLanguage::Unset {
        if *language == SourceLanguage::Unset {
            *language = block.language;
        } else if *language != block.language {
            let message = format!("Shader block '{name}' changes code type");
            error(logger, path, &message);
            return;
        }
    }
    out.push_str(&block.code);
}

fn apply_attachment_defaults(attachment: &AttachmentState) -> ResolvedAttachment {
    ResolvedAttachment {
        color_mask: attachment.color_mask.unwrap_or(ColorMask::RGBA),
        blend_color_operation: attachment
            .blend_color_operation
            .unwrap_or(BlendOperation::None),
        blend_color_factor_src: attachment.blend_color_factor_src.unwrap_or(BlendFactor::Zero),
        blend_color_factor_dst: attachment.blend_color_factor_dst.unwrap_or(BlendFactor::Zero),
        blend_alpha_operation: attachment
            .blend_alpha_operation
            .unwrap_or(BlendOperation::None),
        blend_alpha_factor_src: attachment.blend_alpha_factor_src.unwrap_or(BlendFactor::Zero),
        blend_alpha_factor_dst: attachment.blend_alpha_factor_dst.unwrap_or(BlendFactor::Zero),
    }
}

fn apply_render_state_defaults(state: &RenderState) -> ResolvedRenderState {
    let mut attachments: Vec<ResolvedAttachment> = state
        .attachments
        .iter()
        .map(apply_attachment_defaults)
        .collect();
    let mut broadcast = state.broadcast_first_attachment;

    // A pass with no attachments still renders to one default target
    if attachments.is_empty() {
        attachments.push(ResolvedAttachment::default());
        broadcast = true;
    }

    ResolvedRenderState {
        geometry_type: state.geometry_type.unwrap_or(GeometryType::Triangles),
        polygon_fill_mode: state.polygon_fill_mode.unwrap_or(PolygonFillMode::Fill),
        cull_mode: state.cull_mode.unwrap_or(CullMode::Back),
        depth_compare_op: state
            .depth_compare_op
            .unwrap_or(CompareOperation::GreaterOrEqual),
        is_depth_test_enabled: state.is_depth_test_enabled.unwrap_or(true),
        is_depth_write_enabled: state.is_depth_write_enabled.unwrap_or(true),
        is_depth_bias_enabled: state.is_depth_bias_enabled.unwrap_or(false),
        is_depth_clamp_enabled: state.is_depth_clamp_enabled.unwrap_or(false),
        is_stencil_enabled: state.is_stencil_enabled.unwrap_or(false),
        depth_bias_constant_factor: state.depth_bias_constant_factor.unwrap_or(0.0),
        depth_bias_slope_factor: state.depth_bias_slope_factor.unwrap_or(0.0),
        depth_bias_clamp: state.depth_bias_clamp.unwrap_or(0.0),
        attachments,
        broadcast_first_attachment: broadcast,
    }
}
