//! Static keyword table for the pipeline-set description language

use crate::Token;
use once_cell::sync::Lazy;
use psl_formats::{
    BlendFactor, BlendOperation, BlendPreset, CompareOperation, CullMode, GeometryType,
    ParameterType, PolygonFillMode, ShaderStage,
};
use std::collections::HashMap;

/// Keyword starting an inline GLSL code block, handled by the scanner before
/// the keyword table since it switches to brace-counted capture
pub const SHADER_GLSL_KEYWORD: &str = "shaderGlsl";

/// Keyword starting an inline HLSL code block
pub const SHADER_HLSL_KEYWORD: &str = "shaderHlsl";

/// Find the token for a keyword, or `None` for a plain identifier
pub fn lookup_keyword(identifier: &str) -> Option<Token> {
    KEYWORDS.get(identifier).cloned()
}

static KEYWORDS: Lazy<HashMap<&'static str, Token>> = Lazy::new(|| {
    HashMap::from([
        // Structure
        ("include", Token::Include),
        ("pipelineSet", Token::PipelineSet),
        ("computeSet", Token::ComputeSet),
        ("shaderBlock", Token::ShaderBlock),
        ("configuration", Token::Configuration),
        ("pass", Token::Pass),
        ("abstract", Token::Abstract),
        ("inherits", Token::Inherits),
        ("clones", Token::Clones),
        ("properties", Token::Properties),
        ("parameters", Token::Parameters),
        ("requiresBlocks", Token::RequiresBlocks),
        ("shaderEntrypoint", Token::ShaderEntrypoint),
        ("rendererTags", Token::RendererTags),
        ("renderQueue", Token::RenderQueue),
        ("attachments", Token::Attachments),
        // Render state keys
        ("colorMask", Token::ColorMaskKey),
        ("cull", Token::CullKey),
        ("depthBias", Token::DepthBiasKey),
        ("depthWrite", Token::DepthWriteKey),
        ("depthTest", Token::DepthTestKey),
        ("depthClamp", Token::DepthClampKey),
        ("depthCompareOp", Token::DepthCompareOpKey),
        ("blendColor", Token::BlendColorKey),
        ("blendAlpha", Token::BlendAlphaKey),
        ("blendPreset", Token::BlendPresetKey),
        ("geometry", Token::GeometryKey),
        ("fill", Token::FillKey),
        // Geometry types
        ("points", Token::GeometryTypeValue(GeometryType::Points)),
        ("lines", Token::GeometryTypeValue(GeometryType::Lines)),
        ("lineStrips", Token::GeometryTypeValue(GeometryType::LineStrips)),
        ("lineLoops", Token::GeometryTypeValue(GeometryType::LineLoops)),
        (
            "triangleStrips",
            Token::GeometryTypeValue(GeometryType::TriangleStrips),
        ),
        (
            "triangleFans",
            Token::GeometryTypeValue(GeometryType::TriangleFans),
        ),
        ("triangles", Token::GeometryTypeValue(GeometryType::Triangles)),
        (
            "linesAdjacency",
            Token::GeometryTypeValue(GeometryType::LinesAdjacency),
        ),
        (
            "trianglesAdjacency",
            Token::GeometryTypeValue(GeometryType::TrianglesAdjacency),
        ),
        (
            "triangleStripsAdjacency",
            Token::GeometryTypeValue(GeometryType::TriangleStripsAdjacency),
        ),
        ("patches", Token::GeometryTypeValue(GeometryType::Patches)),
        // Fill modes ("fill" doubles as the render-state key above)
        ("point", Token::FillModeValue(PolygonFillMode::Point)),
        ("line", Token::FillModeValue(PolygonFillMode::Line)),
        // Compare operations
        ("never", Token::CompareOperationValue(CompareOperation::Never)),
        ("less", Token::CompareOperationValue(CompareOperation::Less)),
        ("equal", Token::CompareOperationValue(CompareOperation::Equal)),
        (
            "lessOrEqual",
            Token::CompareOperationValue(CompareOperation::LessOrEqual),
        ),
        (
            "greater",
            Token::CompareOperationValue(CompareOperation::Greater),
        ),
        (
            "notEqual",
            Token::CompareOperationValue(CompareOperation::NotEqual),
        ),
        (
            "greaterOrEqual",
            Token::CompareOperationValue(CompareOperation::GreaterOrEqual),
        ),
        (
            "always",
            Token::CompareOperationValue(CompareOperation::Always),
        ),
        // Cull modes
        ("none", Token::CullModeValue(CullMode::None)),
        ("front", Token::CullModeValue(CullMode::Front)),
        ("back", Token::CullModeValue(CullMode::Back)),
        ("both", Token::CullModeValue(CullMode::Both)),
        // Blend presets
        ("opaque", Token::BlendPresetValue(BlendPreset::Opaque)),
        (
            "translucent",
            Token::BlendPresetValue(BlendPreset::Translucent),
        ),
        ("additive", Token::BlendPresetValue(BlendPreset::Additive)),
        (
            "multiplicative",
            Token::BlendPresetValue(BlendPreset::Multiplicative),
        ),
        (
            "premultiply",
            Token::BlendPresetValue(BlendPreset::Premultiply),
        ),
        // Blend factors
        ("zero", Token::BlendFactorValue(BlendFactor::Zero)),
        ("one", Token::BlendFactorValue(BlendFactor::One)),
        ("srcColor", Token::BlendFactorValue(BlendFactor::SrcColor)),
        (
            "oneMinusSrcColor",
            Token::BlendFactorValue(BlendFactor::OneMinusSrcColor),
        ),
        ("dstColor", Token::BlendFactorValue(BlendFactor::DstColor)),
        (
            "oneMinusDstColor",
            Token::BlendFactorValue(BlendFactor::OneMinusDstColor),
        ),
        ("srcAlpha", Token::BlendFactorValue(BlendFactor::SrcAlpha)),
        (
            "oneMinusSrcAlpha",
            Token::BlendFactorValue(BlendFactor::OneMinusSrcAlpha),
        ),
        ("dstAlpha", Token::BlendFactorValue(BlendFactor::DstAlpha)),
        (
            "oneMinusDstAlpha",
            Token::BlendFactorValue(BlendFactor::OneMinusDstAlpha),
        ),
        (
            "constantColor",
            Token::BlendFactorValue(BlendFactor::ConstantColor),
        ),
        (
            "oneMinusConstantColor",
            Token::BlendFactorValue(BlendFactor::OneMinusConstantColor),
        ),
        (
            "constantAlpha",
            Token::BlendFactorValue(BlendFactor::ConstantAlpha),
        ),
        (
            "oneMinusConstantAlpha",
            Token::BlendFactorValue(BlendFactor::OneMinusConstantAlpha),
        ),
        (
            "srcAlphaSaturate",
            Token::BlendFactorValue(BlendFactor::SrcAlphaSaturate),
        ),
        ("src1Color", Token::BlendFactorValue(BlendFactor::Src1Color)),
        (
            "oneMinusSrc1Color",
            Token::BlendFactorValue(BlendFactor::OneMinusSrc1Color),
        ),
        ("src1Alpha", Token::BlendFactorValue(BlendFactor::Src1Alpha)),
        (
            "oneMinusSrc1Alpha",
            Token::BlendFactorValue(BlendFactor::OneMinusSrc1Alpha),
        ),
        // Blend operations ("zero" stays a blend factor)
        ("off", Token::BlendOperationValue(BlendOperation::None)),
        ("add", Token::BlendOperationValue(BlendOperation::Add)),
        ("subtract", Token::BlendOperationValue(BlendOperation::Subtract)),
        (
            "reverseSubtract",
            Token::BlendOperationValue(BlendOperation::ReverseSubtract),
        ),
        ("minimum", Token::BlendOperationValue(BlendOperation::Minimum)),
        ("maximum", Token::BlendOperationValue(BlendOperation::Maximum)),
        ("source", Token::BlendOperationValue(BlendOperation::Source)),
        (
            "destination",
            Token::BlendOperationValue(BlendOperation::Destination),
        ),
        (
            "sourceOver",
            Token::BlendOperationValue(BlendOperation::SourceOver),
        ),
        (
            "destinationOver",
            Token::BlendOperationValue(BlendOperation::DestinationOver),
        ),
        ("sourceIn", Token::BlendOperationValue(BlendOperation::SourceIn)),
        (
            "destinationIn",
            Token::BlendOperationValue(BlendOperation::DestinationIn),
        ),
        ("sourceOut", Token::BlendOperationValue(BlendOperation::SourceOut)),
        (
            "destinationOut",
            Token::BlendOperationValue(BlendOperation::DestinationOut),
        ),
        (
            "sourceAtop",
            Token::BlendOperationValue(BlendOperation::SourceAtop),
        ),
        (
            "destinationAtop",
            Token::BlendOperationValue(BlendOperation::DestinationAtop),
        ),
        ("xor", Token::BlendOperationValue(BlendOperation::Xor)),
        ("multiply", Token::BlendOperationValue(BlendOperation::Multiply)),
        ("screen", Token::BlendOperationValue(BlendOperation::Screen)),
        ("overlay", Token::BlendOperationValue(BlendOperation::Overlay)),
        ("darken", Token::BlendOperationValue(BlendOperation::Darken)),
        ("lighten", Token::BlendOperationValue(BlendOperation::Lighten)),
        (
            "colorDodge",
            Token::BlendOperationValue(BlendOperation::ColorDodge),
        ),
        ("colorBurn", Token::BlendOperationValue(BlendOperation::ColorBurn)),
        ("hardLight", Token::BlendOperationValue(BlendOperation::HardLight)),
        ("softLight", Token::BlendOperationValue(BlendOperation::SoftLight)),
        (
            "difference",
            Token::BlendOperationValue(BlendOperation::Difference),
        ),
        ("exclusion", Token::BlendOperationValue(BlendOperation::Exclusion)),
        ("invert", Token::BlendOperationValue(BlendOperation::Invert)),
        ("invertRGB", Token::BlendOperationValue(BlendOperation::InvertRgb)),
        (
            "linearDodge",
            Token::BlendOperationValue(BlendOperation::LinearDodge),
        ),
        (
            "linearBurn",
            Token::BlendOperationValue(BlendOperation::LinearBurn),
        ),
        (
            "vividLight",
            Token::BlendOperationValue(BlendOperation::VividLight),
        ),
        (
            "linearLight",
            Token::BlendOperationValue(BlendOperation::LinearLight),
        ),
        ("pinLight", Token::BlendOperationValue(BlendOperation::PinLight)),
        ("hardMix", Token::BlendOperationValue(BlendOperation::HardMix)),
        ("hslHue", Token::BlendOperationValue(BlendOperation::HslHue)),
        (
            "hslSaturation",
            Token::BlendOperationValue(BlendOperation::HslSaturation),
        ),
        ("hslColor", Token::BlendOperationValue(BlendOperation::HslColor)),
        (
            "hslLuminosity",
            Token::BlendOperationValue(BlendOperation::HslLuminosity),
        ),
        ("plus", Token::BlendOperationValue(BlendOperation::Plus)),
        (
            "plusClamped",
            Token::BlendOperationValue(BlendOperation::PlusClamped),
        ),
        (
            "plusClampedAlpha",
            Token::BlendOperationValue(BlendOperation::PlusClampedAlpha),
        ),
        ("plusDark", Token::BlendOperationValue(BlendOperation::PlusDark)),
        ("minus", Token::BlendOperationValue(BlendOperation::Minus)),
        (
            "minusClamped",
            Token::BlendOperationValue(BlendOperation::MinusClamped),
        ),
        ("contrast", Token::BlendOperationValue(BlendOperation::Contrast)),
        ("invertOVG", Token::BlendOperationValue(BlendOperation::InvertOvg)),
        ("red", Token::BlendOperationValue(BlendOperation::Red)),
        ("green", Token::BlendOperationValue(BlendOperation::Green)),
        ("blue", Token::BlendOperationValue(BlendOperation::Blue)),
        // Shader stages ("geometry" doubles as the render-state key above)
        ("vertex", Token::Stage(ShaderStage::Vertex)),
        (
            "tesselationEvaluation",
            Token::Stage(ShaderStage::TesselationEvaluation),
        ),
        (
            "tesselationControl",
            Token::Stage(ShaderStage::TesselationControl),
        ),
        ("fragment", Token::Stage(ShaderStage::Fragment)),
        ("task", Token::Stage(ShaderStage::Task)),
        ("mesh", Token::Stage(ShaderStage::Mesh)),
        ("compute", Token::Stage(ShaderStage::Compute)),
        // Booleans
        ("true", Token::Boolean(true)),
        ("false", Token::Boolean(false)),
        // Material parameter types
        ("parameterBool", Token::ParameterTypeValue(ParameterType::Bool)),
        ("parameterInt", Token::ParameterTypeValue(ParameterType::Int)),
        ("parameterUint", Token::ParameterTypeValue(ParameterType::Uint)),
        ("parameterFloat", Token::ParameterTypeValue(ParameterType::Float)),
        (
            "parameterDouble",
            Token::ParameterTypeValue(ParameterType::Double),
        ),
        ("parameterVec2", Token::ParameterTypeValue(ParameterType::Vec2)),
        ("parameterVec3", Token::ParameterTypeValue(ParameterType::Vec3)),
        ("parameterVec4", Token::ParameterTypeValue(ParameterType::Vec4)),
        ("parameterColor", Token::ParameterTypeValue(ParameterType::Color)),
        (
            "parameterTexture",
            Token::ParameterTypeValue(ParameterType::Texture),
        ),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_resolve() {
        assert_eq!(lookup_keyword("pipelineSet"), Some(Token::PipelineSet));
        assert_eq!(
            lookup_keyword("back"),
            Some(Token::CullModeValue(CullMode::Back))
        );
        assert_eq!(
            lookup_keyword("oneMinusSrcAlpha"),
            Some(Token::BlendFactorValue(BlendFactor::OneMinusSrcAlpha))
        );
        assert_eq!(lookup_keyword("true"), Some(Token::Boolean(true)));
        assert_eq!(lookup_keyword("not_a_keyword"), None);
    }

    #[test]
    fn zero_is_a_blend_factor_not_an_operation() {
        assert_eq!(
            lookup_keyword("zero"),
            Some(Token::BlendFactorValue(BlendFactor::Zero))
        );
        assert_eq!(
            lookup_keyword("off"),
            Some(Token::BlendOperationValue(BlendOperation::None))
        );
    }
}
