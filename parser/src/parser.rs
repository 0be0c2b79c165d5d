//! Recursive-descent parser for the pipeline-set description language

use psl_ast::{
    AttachmentState, ComputeSet, Configuration, MaterialParameter, ObjectDeclaration, ParentKind,
    ParentLink, ParseTree, Pass, PipelineSet, RenderState, ShaderBlock, MAX_ATTACHMENT_COUNT,
};
use psl_formats::{
    BlendFactor, BlendOperation, BlendPreset, ColorMask, CompareOperation, CullMode, GeometryType,
    ParameterType, PolygonFillMode, ShaderStage, SourceLanguage, TOTAL_STAGE_COUNT,
};
use psl_text::{
    Column, Line, LogEvent, LogSource, Logger, Severity, Token, TokenData, TokenList,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Parse one file's token stream into the shared parse tree.
///
/// `include_queue` receives the paths named by `include` directives; the
/// surrounding driver resolves and scans them later. Returns `false` if any
/// syntax error was reported; the tree may still be partially populated.
pub fn parse(
    tokens: &TokenList,
    path: &Path,
    logger: &dyn Logger,
    tree: &mut ParseTree,
    include_queue: &mut BTreeSet<PathBuf>,
) -> bool {
    let mut cur = Cursor {
        tokens,
        pos: 0,
        path,
        logger,
        has_error: false,
    };

    while let Some(token) = cur.peek() {
        match &token.token {
            Token::Include => {
                cur.advance();
                if let Some(include) =
                    cur.expect_text(Some("Expected a string after the keyword 'include'"))
                {
                    include_queue.insert(PathBuf::from(include));
                }
            }
            Token::PipelineSet => {
                parse_pipeline_set(&mut cur, &mut tree.pipeline_sets, &mut tree.generic_shader_blocks)
            }
            Token::ComputeSet => parse_compute_set(&mut cur, &mut tree.compute_sets),
            Token::ShaderBlock => parse_shader_block(&mut cur, &mut tree.generic_shader_blocks),
            Token::Configuration => parse_configuration(
                &mut cur,
                &mut tree.generic_configurations,
                &mut tree.generic_shader_blocks,
            ),
            Token::Pass => {
                parse_pass(&mut cur, &mut tree.generic_passes, &mut tree.generic_shader_blocks)
            }
            _ => cur.skip_unexpected(),
        }
    }

    !cur.has_error
}

struct Cursor<'a> {
    tokens: &'a [TokenData],
    pos: usize,
    path: &'a Path,
    logger: &'a dyn Logger,
    has_error: bool,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a TokenData> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Position to attach a diagnostic to: the current token, or the last
    /// token when the stream has run out
    fn position(&self) -> Option<(Line, Column)> {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| (t.line, t.column))
    }

    fn error(&mut self, message: &str) {
        self.has_error = true;
        let event = match self.position() {
            Some((line, column)) => LogEvent::at(
                Severity::Error,
                LogSource::Parser,
                message,
                self.path,
                line,
                column,
            ),
            None => LogEvent::file(Severity::Error, LogSource::Parser, message, self.path),
        };
        self.logger.log(event);
    }

    /// Report the current token as unexpected without consuming it
    fn report_unexpected(&mut self) {
        let message = match self.peek() {
            Some(token) => format!("Unexpected token: {}", token.token),
            None => "Unexpected end of file".to_string(),
        };
        self.error(&message);
    }

    /// Report the current token as unexpected and skip past it
    fn skip_unexpected(&mut self) {
        self.report_unexpected();
        self.advance();
    }

    /// Consume the current token if it equals `expected`. With a message,
    /// a mismatch is reported; the cursor never advances past a mismatch.
    fn expect(&mut self, expected: &Token, message: Option<&str>) -> bool {
        match self.peek() {
            Some(token) if token.token == *expected => {
                self.advance();
                true
            }
            Some(token) => {
                if let Some(message) = message {
                    let full = format!("{} - found {}", message, token.token);
                    self.error(&full);
                }
                false
            }
            None => {
                if let Some(message) = message {
                    let full = format!("{} - found end of file", message);
                    self.error(&full);
                }
                false
            }
        }
    }

    fn expect_colon(&mut self, message: &str) -> bool {
        self.expect(&Token::Colon, Some(message))
    }

    /// Consume the current token if the extractor accepts it
    fn expect_match<T>(
        &mut self,
        message: Option<&str>,
        extract: impl Fn(&Token) -> Option<T>,
    ) -> Option<T> {
        match self.peek() {
            Some(token) => match extract(&token.token) {
                Some(value) => {
                    self.advance();
                    Some(value)
                }
                None => {
                    if let Some(message) = message {
                        let full = format!("{} - found {}", message, token.token);
                        self.error(&full);
                    }
                    None
                }
            },
            None => {
                if let Some(message) = message {
                    let full = format!("{} - found end of file", message);
                    self.error(&full);
                }
                None
            }
        }
    }

    fn expect_text(&mut self, message: Option<&str>) -> Option<String> {
        self.expect_match(message, |t| match t {
            Token::Text(text) => Some(text.clone()),
            _ => None,
        })
    }

    fn expect_identifier(&mut self, message: Option<&str>) -> Option<String> {
        self.expect_match(message, |t| match t {
            Token::Identifier(name) => Some(name.clone()),
            _ => None,
        })
    }

    fn expect_boolean(&mut self, message: Option<&str>) -> Option<bool> {
        self.expect_match(message, |t| match t {
            Token::Boolean(value) => Some(*value),
            _ => None,
        })
    }

    fn expect_number(&mut self, message: Option<&str>) -> Option<f32> {
        self.expect_match(message, |t| match t {
            Token::Number(value) => Some(*value),
            _ => None,
        })
    }

    /// Stage values; the `geometry` render-state key doubles as the
    /// geometry stage here
    fn expect_stage(&mut self, message: Option<&str>) -> Option<ShaderStage> {
        self.expect_match(message, |t| match t {
            Token::Stage(stage) => Some(*stage),
            Token::GeometryKey => Some(ShaderStage::Geometry),
            _ => None,
        })
    }

    /// Fill-mode values; the `fill` render-state key doubles as solid fill
    fn expect_fill_mode(&mut self, message: Option<&str>) -> Option<PolygonFillMode> {
        self.expect_match(message, |t| match t {
            Token::FillModeValue(mode) => Some(*mode),
            Token::FillKey => Some(PolygonFillMode::Fill),
            _ => None,
        })
    }

    fn expect_cull_mode(&mut self, message: Option<&str>) -> Option<CullMode> {
        self.expect_match(message, |t| match t {
            Token::CullModeValue(mode) => Some(*mode),
            _ => None,
        })
    }

    fn expect_compare_op(&mut self, message: Option<&str>) -> Option<CompareOperation> {
        self.expect_match(message, |t| match t {
            Token::CompareOperationValue(op) => Some(*op),
            _ => None,
        })
    }

    fn expect_geometry_type(&mut self, message: Option<&str>) -> Option<GeometryType> {
        self.expect_match(message, |t| match t {
            Token::GeometryTypeValue(geometry) => Some(*geometry),
            _ => None,
        })
    }

    fn expect_blend_op(&mut self) -> Option<BlendOperation> {
        self.expect_match(Some("Expected a blend operation"), |t| match t {
            Token::BlendOperationValue(op) => Some(*op),
            _ => None,
        })
    }

    fn expect_blend_factor(&mut self) -> Option<BlendFactor> {
        self.expect_match(Some("Expected a blend factor"), |t| match t {
            Token::BlendFactorValue(factor) => Some(*factor),
            _ => None,
        })
    }

    fn expect_blend_preset(&mut self) -> Option<BlendPreset> {
        self.expect_match(
            Some("Expected a blend preset (opaque, translucent, additive, multiplicative, or premultiply)"),
            |t| match t {
                Token::BlendPresetValue(preset) => Some(*preset),
                _ => None,
            },
        )
    }

    fn expect_parameter_type(&mut self) -> Option<ParameterType> {
        self.expect_match(Some("Expected a parameter type"), |t| match t {
            Token::ParameterTypeValue(parameter_type) => Some(*parameter_type),
            _ => None,
        })
    }
}

/// Shared front of every named declaration: optional `abstract`, quoted
/// name, optional `inherits`/`clones` parent, opening brace. The pool entry
/// is created on first mention so later files may reference it first.
fn handle_object_declaration<'m, T: ObjectDeclaration>(
    cur: &mut Cursor,
    map: &'m mut BTreeMap<String, T>,
) -> Option<&'m mut T> {
    let is_abstract = cur.expect(&Token::Abstract, None);

    let name = match cur.expect_text(Some("Expected a quoted object name")) {
        Some(name) => name,
        None => return None,
    };

    let entry = map.entry(name).or_default();
    entry.set_is_abstract(is_abstract);
    entry.set_source_path(cur.path);

    if cur.expect(&Token::Inherits, None) {
        match cur.expect_text(Some("Expected a quoted parent name after 'inherits'")) {
            Some(parent) => entry.set_parent(ParentLink {
                name: parent,
                kind: ParentKind::Inherit,
            }),
            None => cur.report_unexpected(),
        }
    } else if cur.expect(&Token::Clones, None) {
        match cur.expect_text(Some("Expected a quoted parent name after 'clones'")) {
            Some(parent) => entry.set_parent(ParentLink {
                name: parent,
                kind: ParentKind::Clone,
            }),
            None => cur.report_unexpected(),
        }
    }

    cur.expect(&Token::LeftBrace, Some("Expected an open curly brace '{'"));
    Some(entry)
}

/// `shaderEntrypoint: <stage> <identifier>`
fn parse_shader_entrypoint(cur: &mut Cursor, entry_points: &mut [String; TOTAL_STAGE_COUNT]) {
    cur.advance();
    if !cur.expect_colon("Expected a colon after 'shaderEntrypoint'") {
        return;
    }
    let stage = match cur.expect_stage(Some("Expected a stage after 'shaderEntrypoint:'")) {
        Some(stage) => stage,
        None => return,
    };
    if let Some(name) =
        cur.expect_identifier(Some("Expected an identifier after 'shaderEntrypoint: {stage}'"))
    {
        entry_points[stage.index()] = name;
    }
}

/// Inline `shaderGlsl { ... }` / `shaderHlsl { ... }` capture. A block's
/// language is fixed by its first code fragment.
fn parse_shader(cur: &mut Cursor, block: &mut ShaderBlock, language: SourceLanguage) {
    let code = match cur.peek() {
        Some(TokenData {
            token: Token::ShaderGlsl(code) | Token::ShaderHlsl(code),
            ..
        }) => code.clone(),
        _ => return,
    };
    cur.advance();

    if block.language == SourceLanguage::Unset {
        block.language = language;
        block.code.push_str(&code);
    } else if block.language == language {
        block.code.push_str(&code);
    } else {
        cur.error("Shader block changed code type");
    }
}

/// `requiresBlocks: [a, b, c]` (the colon is optional)
fn parse_requires_blocks(cur: &mut Cursor, names: &mut Vec<String>) {
    cur.advance();
    cur.expect(&Token::Colon, None);
    cur.expect(
        &Token::LeftSquareBracket,
        Some("Expected an open square brace '['"),
    );

    let mut last_was_name = false;
    while let Some(token) = cur.peek() {
        match &token.token {
            Token::RightSquareBracket => {
                cur.advance();
                return;
            }
            Token::Identifier(name) => {
                if last_was_name {
                    cur.error("Expected a comma before another identifier");
                }
                names.push(name.clone());
                cur.advance();
                last_was_name = true;
            }
            Token::Comma => {
                if !last_was_name {
                    cur.error("Expected an identifier before a comma");
                }
                cur.advance();
                last_was_name = false;
            }
            _ => cur.skip_unexpected(),
        }
    }
}

/// Simple `key: value` render-state properties. Returns false if the
/// current token is not a recognized property key.
fn parse_property(cur: &mut Cursor, state: &mut RenderState) -> bool {
    let token = match cur.peek() {
        Some(token) => &token.token,
        None => return false,
    };

    match token {
        Token::CullKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'cull'") {
                if let Some(mode) = cur.expect_cull_mode(Some("Expected a cull mode after 'cull:'"))
                {
                    state.cull_mode = Some(mode);
                }
            }
            true
        }
        Token::DepthBiasKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'depthBias'") {
                parse_depth_bias(cur, state);
            }
            true
        }
        Token::DepthWriteKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'depthWrite'") {
                if let Some(value) =
                    cur.expect_boolean(Some("Expected a boolean after 'depthWrite:'"))
                {
                    state.is_depth_write_enabled = Some(value);
                }
            }
            true
        }
        Token::DepthTestKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'depthTest'") {
                if let Some(value) =
                    cur.expect_boolean(Some("Expected a boolean after 'depthTest:'"))
                {
                    state.is_depth_test_enabled = Some(value);
                }
            }
            true
        }
        Token::DepthClampKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'depthClamp'") {
                if let Some(value) =
                    cur.expect_boolean(Some("Expected a boolean after 'depthClamp:'"))
                {
                    state.is_depth_clamp_enabled = Some(value);
                }
            }
            true
        }
        Token::DepthCompareOpKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'depthCompareOp'") {
                if let Some(op) =
                    cur.expect_compare_op(Some("Expected a comparison operator after 'depthCompareOp:'"))
                {
                    state.depth_compare_op = Some(op);
                }
            }
            true
        }
        Token::GeometryKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'geometry'") {
                if let Some(geometry) =
                    cur.expect_geometry_type(Some("Expected a geometry type after 'geometry:'"))
                {
                    state.geometry_type = Some(geometry);
                }
            }
            true
        }
        Token::FillKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'fill'") {
                if let Some(mode) = cur.expect_fill_mode(Some("Expected a fill mode after 'fill:'"))
                {
                    state.polygon_fill_mode = Some(mode);
                }
            }
            true
        }
        _ => false,
    }
}

/// `depthBias` is overloaded: a boolean toggles the flag, while one to
/// three numbers (comma-separated or bare) set constant factor, slope
/// factor and clamp while implicitly enabling the flag.
fn parse_depth_bias(cur: &mut Cursor, state: &mut RenderState) {
    if let Some(enabled) = cur.expect_boolean(None) {
        state.is_depth_bias_enabled = Some(enabled);
        return;
    }

    if let Some(constant) = cur.expect_number(None) {
        state.depth_bias_constant_factor = Some(constant);
        if cur.expect(&Token::Comma, None) {
            if let Some(slope) = cur.expect_number(Some("Expected a number after ','")) {
                state.depth_bias_slope_factor = Some(slope);
                if cur.expect(&Token::Comma, None) {
                    if let Some(clamp) = cur.expect_number(Some("Expected a number after ','")) {
                        state.depth_bias_clamp = Some(clamp);
                    }
                }
            }
        } else if let Some(slope) = cur.expect_number(None) {
            state.depth_bias_slope_factor = Some(slope);
            if let Some(clamp) = cur.expect_number(None) {
                state.depth_bias_clamp = Some(clamp);
            }
        }
    }

    state.is_depth_bias_enabled = Some(true);
}

/// Expand a blend preset into its exact six-field blend state
fn apply_blend_preset(attachment: &mut AttachmentState, preset: BlendPreset) {
    let (color_op, alpha_op, color_src, color_dst, alpha_src, alpha_dst) = match preset {
        BlendPreset::Opaque => (
            BlendOperation::None,
            BlendOperation::None,
            BlendFactor::One,
            BlendFactor::One,
            BlendFactor::One,
            BlendFactor::One,
        ),
        BlendPreset::Translucent => (
            BlendOperation::Add,
            BlendOperation::Add,
            BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha,
            BlendFactor::One,
            BlendFactor::Zero,
        ),
        BlendPreset::Additive => (
            BlendOperation::Add,
            BlendOperation::Add,
            BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha,
            BlendFactor::One,
            BlendFactor::OneMinusSrcAlpha,
        ),
        BlendPreset::Multiplicative => (
            BlendOperation::Multiply,
            BlendOperation::Multiply,
            BlendFactor::One,
            BlendFactor::One,
            BlendFactor::One,
            BlendFactor::One,
        ),
        BlendPreset::Premultiply => (
            BlendOperation::Add,
            BlendOperation::Add,
            BlendFactor::One,
            BlendFactor::OneMinusSrcAlpha,
            BlendFactor::One,
            BlendFactor::OneMinusSrcAlpha,
        ),
    };

    attachment.blend_color_operation = Some(color_op);
    attachment.blend_alpha_operation = Some(alpha_op);
    attachment.blend_color_factor_src = Some(color_src);
    attachment.blend_color_factor_dst = Some(color_dst);
    attachment.blend_alpha_factor_src = Some(alpha_src);
    attachment.blend_alpha_factor_dst = Some(alpha_dst);
}

/// `{operation} {srcFactor} {dstFactor}`, each field optional once the
/// previous one matched
fn parse_blend(
    cur: &mut Cursor,
    op: &mut Option<BlendOperation>,
    src: &mut Option<BlendFactor>,
    dst: &mut Option<BlendFactor>,
) {
    if let Some(operation) = cur.expect_blend_op() {
        *op = Some(operation);
        if let Some(factor) = cur.expect_blend_factor() {
            *src = Some(factor);
            if let Some(factor) = cur.expect_blend_factor() {
                *dst = Some(factor);
            }
        }
    }
}

/// `colorMask: rgba` decomposed character by character
fn parse_color_mask(cur: &mut Cursor, attachment: &mut AttachmentState) {
    if !cur.expect_colon("Expected a colon after 'colorMask'") {
        return;
    }
    let mask_text = match cur.expect_identifier(Some(
        "Expected an identifier such as 'rgba' after 'colorMask:'",
    )) {
        Some(text) => text,
        None => return,
    };

    let mut mask = ColorMask::NONE;
    for c in mask_text.chars() {
        match c {
            'r' | 'R' => mask |= ColorMask::RED,
            'g' | 'G' => mask |= ColorMask::GREEN,
            'b' | 'B' => mask |= ColorMask::BLUE,
            'a' | 'A' => mask |= ColorMask::ALPHA,
            _ => {
                let message = format!(
                    "Expected only a combination of 'r', 'g', 'b', 'a' in 'colorMask' - found {}",
                    mask_text
                );
                cur.error(&message);
            }
        }
    }

    attachment.color_mask = Some(mask);
}

/// Per-attachment keys. Returns false if the current token is not one.
fn parse_attachment_property(cur: &mut Cursor, attachment: &mut AttachmentState) -> bool {
    let token = match cur.peek() {
        Some(token) => &token.token,
        None => return false,
    };

    match token {
        Token::ColorMaskKey => {
            cur.advance();
            parse_color_mask(cur, attachment);
            true
        }
        Token::BlendPresetKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'blendPreset'") {
                if let Some(preset) = cur.expect_blend_preset() {
                    apply_blend_preset(attachment, preset);
                }
            }
            true
        }
        Token::BlendColorKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'blendColor'") {
                let mut op = attachment.blend_color_operation;
                let mut src = attachment.blend_color_factor_src;
                let mut dst = attachment.blend_color_factor_dst;
                parse_blend(cur, &mut op, &mut src, &mut dst);
                attachment.blend_color_operation = op;
                attachment.blend_color_factor_src = src;
                attachment.blend_color_factor_dst = dst;
            }
            true
        }
        Token::BlendAlphaKey => {
            cur.advance();
            if cur.expect_colon("Expected a colon after 'blendAlpha'") {
                let mut op = attachment.blend_alpha_operation;
                let mut src = attachment.blend_alpha_factor_src;
                let mut dst = attachment.blend_alpha_factor_dst;
                parse_blend(cur, &mut op, &mut src, &mut dst);
                attachment.blend_alpha_operation = op;
                attachment.blend_alpha_factor_src = src;
                attachment.blend_alpha_factor_dst = dst;
            }
            true
        }
        _ => false,
    }
}

/// `attachments: { ... }` broadcasts one attachment to every color target;
/// `attachments: [ {...}, {...} ]` lists them explicitly, capped at
/// [MAX_ATTACHMENT_COUNT].
fn parse_attachments(cur: &mut Cursor, state: &mut RenderState) {
    cur.expect_colon("Expected a colon ':' after 'attachments'");

    if cur.expect(&Token::LeftBrace, None) {
        let mut attachment = AttachmentState::default();
        while cur.peek().is_some() {
            if cur.expect(&Token::RightBrace, None) {
                break;
            }
            if !parse_attachment_property(cur, &mut attachment) {
                cur.skip_unexpected();
            }
        }
        state.attachments = vec![attachment];
        state.broadcast_first_attachment = true;
    } else if cur.expect(&Token::LeftSquareBracket, None) {
        let mut attachments = Vec::new();
        while cur.peek().is_some() {
            if cur.expect(&Token::RightSquareBracket, None) {
                break;
            }
            if cur.expect(&Token::LeftBrace, None) {
                if attachments.len() == MAX_ATTACHMENT_COUNT {
                    cur.error("Too many attachments");
                    break;
                }
                attachments.push(AttachmentState::default());
                if let Some(attachment) = attachments.last_mut() {
                    while cur.peek().is_some() {
                        if cur.expect(&Token::RightBrace, None) {
                            break;
                        }
                        if !parse_attachment_property(cur, attachment) {
                            cur.skip_unexpected();
                        }
                    }
                }
                if cur.expect(&Token::Comma, None) {
                    continue;
                }
                if cur.expect(&Token::RightSquareBracket, None) {
                    break;
                }
                cur.skip_unexpected();
                break;
            } else {
                cur.skip_unexpected();
                break;
            }
        }
        state.broadcast_first_attachment = false;
        state.attachments = attachments;
    } else {
        cur.error("Expected an opening curly brace '{' or square brace '[' after 'attachments:'");
    }
}

/// `properties { ... }` body of a pass
fn parse_render_state(cur: &mut Cursor, state: &mut RenderState) {
    cur.advance();
    if !cur.expect(&Token::LeftBrace, Some("Expected an open curly brace '{'")) {
        return;
    }

    while let Some(token) = cur.peek() {
        match &token.token {
            Token::RightBrace => {
                cur.advance();
                return;
            }
            Token::Attachments => {
                cur.advance();
                parse_attachments(cur, state);
            }
            _ => {
                if !parse_property(cur, state) {
                    cur.skip_unexpected();
                }
            }
        }
    }
}

/// `shaderBlock name { ... }`, also legal nested inside passes and other
/// shader blocks; always lands in the generic block pool
fn parse_shader_block(cur: &mut Cursor, blocks: &mut BTreeMap<String, ShaderBlock>) {
    cur.advance();

    let name = match cur.expect_identifier(Some("Expected a name after 'shaderBlock'")) {
        Some(name) => name,
        None => return,
    };

    blocks.entry(name.clone()).or_default();

    if cur.expect(&Token::Inherits, None) {
        if let Some(parent) = cur.expect_text(Some("Expected a quoted parent name after 'inherits'"))
        {
            if let Some(block) = blocks.get_mut(&name) {
                block.parent = Some(ParentLink {
                    name: parent,
                    kind: ParentKind::Inherit,
                });
            }
        }
    } else if cur.expect(&Token::Clones, None) {
        if let Some(parent) = cur.expect_text(Some("Expected a quoted parent name after 'clones'"))
        {
            if let Some(block) = blocks.get_mut(&name) {
                block.parent = Some(ParentLink {
                    name: parent,
                    kind: ParentKind::Clone,
                });
            }
        }
    }

    cur.expect(&Token::LeftBrace, Some("Expected an open curly brace '{'"));

    while let Some(token) = cur.peek() {
        match &token.token {
            Token::RightBrace => {
                cur.advance();
                return;
            }
            Token::ShaderBlock => {
                parse_shader_block(cur, blocks);
            }
            _ => {
                let Some(block) = blocks.get_mut(&name) else {
                    return;
                };
                match &cur.peek().map(|t| &t.token) {
                    Some(Token::ShaderEntrypoint) => {
                        parse_shader_entrypoint(cur, &mut block.stage_entry_points)
                    }
                    Some(Token::RequiresBlocks) => {
                        parse_requires_blocks(cur, &mut block.required_blocks)
                    }
                    Some(Token::ShaderGlsl(_)) => parse_shader(cur, block, SourceLanguage::Glsl),
                    Some(Token::ShaderHlsl(_)) => parse_shader(cur, block, SourceLanguage::Hlsl),
                    _ => cur.skip_unexpected(),
                }
            }
        }
    }
}

/// `pass "name" { ... }`, nested in a configuration or generic at top level
fn parse_pass(
    cur: &mut Cursor,
    passes: &mut BTreeMap<String, Pass>,
    blocks: &mut BTreeMap<String, ShaderBlock>,
) {
    cur.advance();

    let pass = match handle_object_declaration(cur, passes) {
        Some(pass) => pass,
        None => return,
    };

    while let Some(token) = cur.peek() {
        match &token.token {
            Token::RightBrace => {
                cur.advance();
                return;
            }
            Token::ShaderEntrypoint => {
                parse_shader_entrypoint(cur, &mut pass.shader_block.stage_entry_points)
            }
            Token::ShaderBlock => parse_shader_block(cur, blocks),
            Token::Properties => parse_render_state(cur, &mut pass.render_state),
            Token::RequiresBlocks => {
                parse_requires_blocks(cur, &mut pass.shader_block.required_blocks)
            }
            Token::ShaderGlsl(_) => parse_shader(cur, &mut pass.shader_block, SourceLanguage::Glsl),
            Token::ShaderHlsl(_) => parse_shader(cur, &mut pass.shader_block, SourceLanguage::Hlsl),
            Token::RenderQueue => {
                cur.advance();
                cur.expect_colon("Expected a colon after 'renderQueue'");
                if let Some(queue) =
                    cur.expect_text(Some("Expected a quoted name after 'renderQueue:'"))
                {
                    pass.render_queue = Some(queue);
                }
            }
            _ => cur.skip_unexpected(),
        }
    }
}

/// `configuration "name" { ... }`, nested in a pipeline set or generic
fn parse_configuration(
    cur: &mut Cursor,
    configurations: &mut BTreeMap<String, Configuration>,
    blocks: &mut BTreeMap<String, ShaderBlock>,
) {
    cur.advance();

    let config = match handle_object_declaration(cur, configurations) {
        Some(config) => config,
        None => return,
    };

    while let Some(token) = cur.peek() {
        match &token.token {
            Token::RightBrace => {
                cur.advance();
                return;
            }
            Token::Pass => parse_pass(cur, &mut config.passes, blocks),
            Token::RendererTags => {
                cur.advance();
                if cur.expect_colon("Expected a colon ':' after 'rendererTags'") {
                    while let Some(tag) = cur.expect_text(None) {
                        config.tags.push(tag);
                    }
                }
            }
            _ => cur.skip_unexpected(),
        }
    }
}

/// One `parameter<Type> name: default` entry
fn parse_parameter(cur: &mut Cursor, parameters: &mut Vec<MaterialParameter>) {
    let parameter_type = match cur.expect_parameter_type() {
        Some(parameter_type) => parameter_type,
        None => return,
    };

    let name = match cur.expect_identifier(Some("Expected a parameter name")) {
        Some(name) => name,
        None => return,
    };

    cur.expect_colon("Expected a colon ':' between parameter name and default value");

    let default_value = cur.expect_match(Some("Expected a default value"), |t| match t {
        Token::Identifier(text) | Token::Text(text) => Some(text.clone()),
        Token::Number(value) => Some(value.to_string()),
        Token::Boolean(value) => Some(value.to_string()),
        _ => None,
    });

    parameters.push(MaterialParameter {
        parameter_type,
        name,
        default_value: default_value.unwrap_or_default(),
    });
}

/// `parameters { parameter<Type> name: default, ... }`
fn parse_parameters(cur: &mut Cursor, parameters: &mut Vec<MaterialParameter>) {
    cur.advance();
    cur.expect(&Token::LeftBrace, Some("Expected an open curly brace '{'"));

    let mut requires_comma = false;
    while let Some(token) = cur.peek() {
        match &token.token {
            Token::RightBrace => {
                cur.advance();
                return;
            }
            Token::Comma => {
                cur.advance();
                requires_comma = false;
            }
            Token::ParameterTypeValue(_) => {
                if requires_comma {
                    cur.error("Expected a comma before this parameter");
                }
                parse_parameter(cur, parameters);
                requires_comma = true;
            }
            _ => cur.skip_unexpected(),
        }
    }
}

/// `pipelineSet "name" { ... }`
fn parse_pipeline_set(
    cur: &mut Cursor,
    sets: &mut BTreeMap<String, PipelineSet>,
    blocks: &mut BTreeMap<String, ShaderBlock>,
) {
    cur.advance();

    let set = match handle_object_declaration(cur, sets) {
        Some(set) => set,
        None => return,
    };

    while let Some(token) = cur.peek() {
        match &token.token {
            Token::RightBrace => {
                cur.advance();
                return;
            }
            Token::Parameters => parse_parameters(cur, &mut set.parameters),
            Token::Configuration => parse_configuration(cur, &mut set.configurations, blocks),
            _ => cur.skip_unexpected(),
        }
    }
}

/// `computeSet "name" { ... }`
fn parse_compute_set(cur: &mut Cursor, compute_sets: &mut BTreeMap<String, ComputeSet>) {
    cur.advance();

    let name = match cur.expect_text(Some("Expected a quoted name after 'computeSet'")) {
        Some(name) => name,
        None => return,
    };

    let compute_set = compute_sets.entry(name).or_default();
    compute_set.source_path = cur.path.to_path_buf();

    cur.expect(&Token::LeftBrace, Some("Expected an open curly brace '{'"));

    while let Some(token) = cur.peek() {
        match &token.token {
            Token::RightBrace => {
                cur.advance();
                return;
            }
            Token::ShaderEntrypoint => {
                parse_shader_entrypoint(cur, &mut compute_set.shader_block.stage_entry_points)
            }
            Token::RequiresBlocks => {
                parse_requires_blocks(cur, &mut compute_set.shader_block.required_blocks)
            }
            Token::ShaderGlsl(_) => {
                parse_shader(cur, &mut compute_set.shader_block, SourceLanguage::Glsl)
            }
            Token::ShaderHlsl(_) => {
                parse_shader(cur, &mut compute_set.shader_block, SourceLanguage::Hlsl)
            }
            _ => cur.skip_unexpected(),
        }
    }
}
