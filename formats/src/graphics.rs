//! Closed graphics-state enumerations shared between the converter and the
//! runtime loader. Discriminants are part of the binary format and must not
//! be reordered.

use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Number of graphics-capable shader stages
pub const GRAPHICS_STAGE_COUNT: usize = 7;

/// Total number of shader stages including compute
pub const TOTAL_STAGE_COUNT: usize = 8;

/// A single shader pipeline stage
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[repr(u8)]
pub enum ShaderStage {
    Vertex = 0,
    TesselationEvaluation,
    TesselationControl,
    Geometry,
    Fragment,
    Task,
    Mesh,
    Compute,
}

impl ShaderStage {
    /// All stages in index order
    pub const ALL: [ShaderStage; TOTAL_STAGE_COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::TesselationEvaluation,
        ShaderStage::TesselationControl,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
        ShaderStage::Task,
        ShaderStage::Mesh,
        ShaderStage::Compute,
    ];

    /// Get the stage for a zero based index
    pub fn from_index(index: usize) -> Option<ShaderStage> {
        ShaderStage::ALL.get(index).copied()
    }

    /// Get the zero based index for the stage
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get the bit used to mark this stage in a [ShaderStageFlags] mask
    pub fn bit(self) -> ShaderStageFlags {
        ShaderStageFlags(1 << self as u8)
    }
}

/// Bit mask of [ShaderStage] values
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Hash)]
#[repr(transparent)]
pub struct ShaderStageFlags(pub u8);

impl ShaderStageFlags {
    pub const NONE: ShaderStageFlags = ShaderStageFlags(0);
    pub const ALL_GRAPHICS: ShaderStageFlags = ShaderStageFlags(0x7f);
    pub const ALL: ShaderStageFlags = ShaderStageFlags(0xff);

    /// Check if every bit in the given mask is set
    pub fn contains(self, other: ShaderStageFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ShaderStageFlags {
    type Output = ShaderStageFlags;

    fn bitor(self, rhs: ShaderStageFlags) -> ShaderStageFlags {
        ShaderStageFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ShaderStageFlags {
    fn bitor_assign(&mut self, rhs: ShaderStageFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ShaderStageFlags {
    type Output = ShaderStageFlags;

    fn bitand(self, rhs: ShaderStageFlags) -> ShaderStageFlags {
        ShaderStageFlags(self.0 & rhs.0)
    }
}

/// Kind of resource a descriptor binding refers to
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum BindingType {
    UniformBuffer = 0,
    Texture,
    RenderTexture,
    DepthTexture,
    StorageImage,
}

impl BindingType {
    /// Whether a binding of this type is exposed as a named material resource
    pub fn is_material_resource(self) -> bool {
        !matches!(self, BindingType::UniformBuffer)
    }
}

/// Primitive assembly mode
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum GeometryType {
    Points = 0,
    Lines,
    LineStrips,
    LineLoops,
    TriangleStrips,
    TriangleFans,
    Triangles,
    LinesAdjacency,
    TrianglesAdjacency,
    TriangleStripsAdjacency,
    Patches,
}

/// Rasterizer fill mode
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum PolygonFillMode {
    Point = 0,
    Line,
    Fill,
}

/// Face culling mode
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum CullMode {
    None = 0,
    Front,
    Back,
    Both,
}

/// Depth / stencil comparison function
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum CompareOperation {
    Never = 0,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

/// Blend equation applied to a color or alpha channel
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum BlendOperation {
    None = 0,
    Add,
    Subtract,
    ReverseSubtract,
    Minimum,
    Maximum,
    Zero,
    Source,
    Destination,
    SourceOver,
    DestinationOver,
    SourceIn,
    DestinationIn,
    SourceOut,
    DestinationOut,
    SourceAtop,
    DestinationAtop,
    Xor,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Invert,
    InvertRgb,
    LinearDodge,
    LinearBurn,
    VividLight,
    LinearLight,
    PinLight,
    HardMix,
    HslHue,
    HslSaturation,
    HslColor,
    HslLuminosity,
    Plus,
    PlusClamped,
    PlusClampedAlpha,
    PlusDark,
    Minus,
    MinusClamped,
    Contrast,
    InvertOvg,
    Red,
    Green,
    Blue,
}

/// Multiplier applied to a blend input
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum BlendFactor {
    Zero = 0,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
    Src1Color,
    OneMinusSrc1Color,
    Src1Alpha,
    OneMinusSrc1Alpha,
}

/// Mask of color channels written by an attachment
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
#[repr(transparent)]
pub struct ColorMask(pub u8);

impl ColorMask {
    pub const NONE: ColorMask = ColorMask(0);
    pub const RED: ColorMask = ColorMask(0x1);
    pub const GREEN: ColorMask = ColorMask(0x2);
    pub const BLUE: ColorMask = ColorMask(0x4);
    pub const ALPHA: ColorMask = ColorMask(0x8);
    pub const RGBA: ColorMask = ColorMask(0xf);
}

impl BitOr for ColorMask {
    type Output = ColorMask;

    fn bitor(self, rhs: ColorMask) -> ColorMask {
        ColorMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ColorMask {
    fn bitor_assign(&mut self, rhs: ColorMask) {
        self.0 |= rhs.0;
    }
}

/// Named shortcut expanding to a full blend state
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BlendPreset {
    Opaque,
    Translucent,
    Additive,
    Multiplicative,
    Premultiply,
}

/// Source language a shader block is written in
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum SourceLanguage {
    #[default]
    Unset,
    Glsl,
    Hlsl,
}

/// Declared type of a material parameter
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum ParameterType {
    Bool = 0,
    Int,
    Uint,
    Float,
    Double,
    Vec2,
    Vec3,
    Vec4,
    Color,
    Texture,
}

/// Kind of pipeline a produced artifact contains
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum PipelineType {
    Graphics = 0,
    Compute,
}
