//! Token definitions for the pipeline-set description language

use crate::{Column, Line};
use psl_formats::{
    BlendFactor, BlendOperation, BlendPreset, CompareOperation, CullMode, GeometryType,
    ParameterType, PolygonFillMode, ShaderStage,
};

/// A single lexical token with its payload
#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    /// Byte sequence the scanner could not form a token from
    Invalid,

    Identifier(String),
    Text(String),
    Number(f32),
    Boolean(bool),

    Colon,
    Semicolon,
    Comma,
    LeftSquareBracket,
    RightSquareBracket,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,

    /// Raw shader source captured after a `shaderGlsl` keyword
    ShaderGlsl(String),
    /// Raw shader source captured after a `shaderHlsl` keyword
    ShaderHlsl(String),

    Include,
    PipelineSet,
    ComputeSet,
    ShaderBlock,
    Configuration,
    Pass,
    Abstract,
    Inherits,
    Clones,
    Properties,
    Parameters,
    RequiresBlocks,
    ShaderEntrypoint,
    RendererTags,
    RenderQueue,
    Attachments,

    ColorMaskKey,
    CullKey,
    DepthBiasKey,
    DepthWriteKey,
    DepthTestKey,
    DepthClampKey,
    DepthCompareOpKey,
    BlendColorKey,
    BlendAlphaKey,
    BlendPresetKey,
    /// The `geometry` keyword: render-state key, also accepted as the
    /// geometry shader stage after `shaderEntrypoint:`
    GeometryKey,
    /// The `fill` keyword: render-state key, also accepted as the solid
    /// fill-mode value
    FillKey,

    Stage(ShaderStage),
    GeometryTypeValue(GeometryType),
    FillModeValue(PolygonFillMode),
    CullModeValue(CullMode),
    CompareOperationValue(CompareOperation),
    BlendOperationValue(BlendOperation),
    BlendFactorValue(BlendFactor),
    BlendPresetValue(BlendPreset),
    ParameterTypeValue(ParameterType),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Token::Invalid => write!(f, "invalid characters"),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Text(text) => write!(f, "string \"{}\"", text),
            Token::Number(value) => write!(f, "number {}", value),
            Token::Boolean(value) => write!(f, "boolean {}", value),
            Token::Colon => write!(f, "':'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Comma => write!(f, "','"),
            Token::LeftSquareBracket => write!(f, "'['"),
            Token::RightSquareBracket => write!(f, "']'"),
            Token::LeftBrace => write!(f, "'{{'"),
            Token::RightBrace => write!(f, "'}}'"),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::ShaderGlsl(_) => write!(f, "glsl shader code"),
            Token::ShaderHlsl(_) => write!(f, "hlsl shader code"),
            Token::Include => write!(f, "'include'"),
            Token::PipelineSet => write!(f, "'pipelineSet'"),
            Token::ComputeSet => write!(f, "'computeSet'"),
            Token::ShaderBlock => write!(f, "'shaderBlock'"),
            Token::Configuration => write!(f, "'configuration'"),
            Token::Pass => write!(f, "'pass'"),
            Token::Abstract => write!(f, "'abstract'"),
            Token::Inherits => write!(f, "'inherits'"),
            Token::Clones => write!(f, "'clones'"),
            Token::Properties => write!(f, "'properties'"),
            Token::Parameters => write!(f, "'parameters'"),
            Token::RequiresBlocks => write!(f, "'requiresBlocks'"),
            Token::ShaderEntrypoint => write!(f, "'shaderEntrypoint'"),
            Token::RendererTags => write!(f, "'rendererTags'"),
            Token::RenderQueue => write!(f, "'renderQueue'"),
            Token::Attachments => write!(f, "'attachments'"),
            Token::ColorMaskKey => write!(f, "'colorMask'"),
            Token::CullKey => write!(f, "'cull'"),
            Token::DepthBiasKey => write!(f, "'depthBias'"),
            Token::DepthWriteKey => write!(f, "'depthWrite'"),
            Token::DepthTestKey => write!(f, "'depthTest'"),
            Token::DepthClampKey => write!(f, "'depthClamp'"),
            Token::DepthCompareOpKey => write!(f, "'depthCompareOp'"),
            Token::BlendColorKey => write!(f, "'blendColor'"),
            Token::BlendAlphaKey => write!(f, "'blendAlpha'"),
            Token::BlendPresetKey => write!(f, "'blendPreset'"),
            Token::GeometryKey => write!(f, "'geometry'"),
            Token::FillKey => write!(f, "'fill'"),
            Token::Stage(stage) => write!(f, "shader stage {:?}", stage),
            Token::GeometryTypeValue(value) => write!(f, "geometry type {:?}", value),
            Token::FillModeValue(value) => write!(f, "fill mode {:?}", value),
            Token::CullModeValue(value) => write!(f, "cull mode {:?}", value),
            Token::CompareOperationValue(value) => write!(f, "compare operation {:?}", value),
            Token::BlendOperationValue(value) => write!(f, "blend operation {:?}", value),
            Token::BlendFactorValue(value) => write!(f, "blend factor {:?}", value),
            Token::BlendPresetValue(value) => write!(f, "blend preset {:?}", value),
            Token::ParameterTypeValue(value) => write!(f, "parameter type {:?}", value),
        }
    }
}

/// A token paired with the position it was scanned at
#[derive(PartialEq, Debug, Clone)]
pub struct TokenData {
    pub token: Token,
    pub line: Line,
    pub column: Column,
}

impl TokenData {
    pub fn new(token: Token, line: Line, column: Column) -> TokenData {
        TokenData {
            token,
            line,
            column,
        }
    }
}

/// Flat stream of tokens for one source file
pub type TokenList = Vec<TokenData>;
