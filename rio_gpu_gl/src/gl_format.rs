//! Translation of engine enums and formats to OpenGL values
//!
//! Pure functions only; nothing in here touches a GL context.

use rio_gpu::rio::gpu::{
    BlendEquation, BlendFactor, CompareFunc, CullingMode, IndexFormat, PolygonMode, PrimitiveMode,
    StencilOp, TexMipFilterMode,
    TexWrapMode, TexXYFilterMode, TextureFormat, VertexComponentKind, VertexFormat,
    COMPONENT_A, COMPONENT_B, COMPONENT_G, COMPONENT_ONE, COMPONENT_R, COMPONENT_ZERO,
    comp_map_components,
};

// Extension and compatibility enums that glow does not name
pub const CLAMP: u32 = 0x2900;
pub const MIRROR_CLAMP_EXT: u32 = 0x8742;
pub const MIRROR_CLAMP_TO_EDGE_EXT: u32 = 0x8743;
pub const MIRROR_CLAMP_TO_BORDER_EXT: u32 = 0x8912;
pub const TEXTURE_MAX_ANISOTROPY_EXT: u32 = 0x84FE;
pub const COMPRESSED_RGBA_S3TC_DXT1_EXT: u32 = 0x83F1;
pub const COMPRESSED_RGBA_S3TC_DXT3_EXT: u32 = 0x83F2;
pub const COMPRESSED_RGBA_S3TC_DXT5_EXT: u32 = 0x83F3;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT1_EXT: u32 = 0x8C4D;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT3_EXT: u32 = 0x8C4E;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT5_EXT: u32 = 0x8C4F;

/// GL storage and upload description of a texture format
///
/// `format` and `ty` are zero for block-compressed formats, which upload through
/// `glCompressedTexImage2D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlTextureFormat {
    pub internal_format: i32,
    pub format: u32,
    pub ty: u32,
}

const fn tex(internal_format: u32, format: u32, ty: u32) -> Option<GlTextureFormat> {
    Some(GlTextureFormat { internal_format: internal_format as i32, format, ty })
}

const fn compressed(internal_format: u32) -> Option<GlTextureFormat> {
    tex(internal_format, 0, 0)
}

/// GL format triple of a texture format, `None` for formats GL cannot store (D24_S8_FLOAT)
pub fn texture_format_to_gl(format: TextureFormat) -> Option<GlTextureFormat> {
    use TextureFormat::*;
    match format {
        R8_UNORM => tex(glow::R8, glow::RED, glow::UNSIGNED_BYTE),
        R8_UINT => tex(glow::R8UI, glow::RED_INTEGER, glow::UNSIGNED_BYTE),
        R8_SNORM => tex(glow::R8_SNORM, glow::RED, glow::BYTE),
        R8_SINT => tex(glow::R8I, glow::RED_INTEGER, glow::BYTE),
        DEPTH_R16_UNORM => tex(glow::DEPTH_COMPONENT16, glow::DEPTH_COMPONENT, glow::UNSIGNED_SHORT),
        R8G8_UNORM => tex(glow::RG8, glow::RG, glow::UNSIGNED_BYTE),
        R8G8_UINT => tex(glow::RG8UI, glow::RG_INTEGER, glow::UNSIGNED_BYTE),
        R8G8_SNORM => tex(glow::RG8_SNORM, glow::RG, glow::BYTE),
        R8G8_SINT => tex(glow::RG8I, glow::RG_INTEGER, glow::BYTE),
        R5G6B5_UNORM => tex(glow::RGB565, glow::RGB, glow::UNSIGNED_SHORT_5_6_5),
        R5G5B5A1_UNORM => tex(glow::RGB5_A1, glow::RGBA, glow::UNSIGNED_SHORT_5_5_5_1),
        R4G4B4A4_UNORM => tex(glow::RGBA4, glow::RGBA, glow::UNSIGNED_SHORT_4_4_4_4),
        R32_UINT => tex(glow::R32UI, glow::RED_INTEGER, glow::UNSIGNED_INT),
        DEPTH_R32_FLOAT => tex(glow::DEPTH_COMPONENT32F, glow::DEPTH_COMPONENT, glow::FLOAT),
        D24_S8_UNORM => tex(glow::DEPTH24_STENCIL8, glow::DEPTH_STENCIL, glow::UNSIGNED_INT_24_8),
        D24_S8_FLOAT => None,
        R10G10B10A2_UNORM => tex(glow::RGB10_A2, glow::RGBA, glow::UNSIGNED_INT_2_10_10_10_REV),
        R10G10B10A2_UINT => tex(glow::RGB10_A2UI, glow::RGBA_INTEGER, glow::UNSIGNED_INT_2_10_10_10_REV),
        R8G8B8A8_UNORM => tex(glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
        R8G8B8A8_UINT => tex(glow::RGBA8UI, glow::RGBA_INTEGER, glow::UNSIGNED_BYTE),
        R8G8B8A8_SNORM => tex(glow::RGBA8_SNORM, glow::RGBA, glow::BYTE),
        R8G8B8A8_SINT => tex(glow::RGBA8I, glow::RGBA_INTEGER, glow::BYTE),
        R8G8B8A8_SRGB => tex(glow::SRGB8_ALPHA8, glow::RGBA, glow::UNSIGNED_BYTE),
        D32_FLOAT_S8_UINT_X24 => tex(
            glow::DEPTH32F_STENCIL8,
            glow::DEPTH_STENCIL,
            glow::FLOAT_32_UNSIGNED_INT_24_8_REV,
        ),
        BC1_UNORM => compressed(COMPRESSED_RGBA_S3TC_DXT1_EXT),
        BC1_SRGB => compressed(COMPRESSED_SRGB_ALPHA_S3TC_DXT1_EXT),
        BC2_UNORM => compressed(COMPRESSED_RGBA_S3TC_DXT3_EXT),
        BC2_SRGB => compressed(COMPRESSED_SRGB_ALPHA_S3TC_DXT3_EXT),
        BC3_UNORM => compressed(COMPRESSED_RGBA_S3TC_DXT5_EXT),
        BC3_SRGB => compressed(COMPRESSED_SRGB_ALPHA_S3TC_DXT5_EXT),
        BC4_UNORM => compressed(glow::COMPRESSED_RED_RGTC1),
        BC4_SNORM => compressed(glow::COMPRESSED_SIGNED_RED_RGTC1),
        BC5_UNORM => compressed(glow::COMPRESSED_RG_RGTC2),
        BC5_SNORM => compressed(glow::COMPRESSED_SIGNED_RG_RGTC2),
    }
}

/// Swizzle source for one component selector of a component map
pub fn component_to_gl(component: u8) -> i32 {
    let value = match component {
        COMPONENT_R => glow::RED,
        COMPONENT_G => glow::GREEN,
        COMPONENT_B => glow::BLUE,
        COMPONENT_A => glow::ALPHA,
        COMPONENT_ZERO => glow::ZERO,
        COMPONENT_ONE => glow::ONE,
        _ => glow::ZERO,
    };
    value as i32
}

/// `TEXTURE_SWIZZLE_RGBA` values for a component map
pub fn comp_map_to_gl_swizzle(comp_map: u32) -> [i32; 4] {
    comp_map_components(comp_map).map(component_to_gl)
}

/// How `glVertexAttrib*Pointer` reads one vertex format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlVertexFormat {
    pub size: i32,
    pub data_type: u32,
    pub normalized: bool,
    /// Read through `glVertexAttribIPointer`
    pub integer: bool,
}

pub fn vertex_format_to_gl(format: VertexFormat) -> GlVertexFormat {
    use VertexFormat::*;
    let kind = format.kind();
    let signed = matches!(
        kind,
        VertexComponentKind::Snorm | VertexComponentKind::Sint | VertexComponentKind::SintToFloat
    );

    let data_type = match format {
        R10G11B11_FLOAT => glow::UNSIGNED_INT_10F_11F_11F_REV,
        R10G10B10A2_UNORM | R10G10B10A2_UINT => glow::UNSIGNED_INT_2_10_10_10_REV,
        R10G10B10A2_SNORM | R10G10B10A2_SINT => glow::INT_2_10_10_10_REV,
        R16_FLOAT | R16G16_FLOAT | R16G16B16A16_FLOAT => glow::HALF_FLOAT,
        R32_FLOAT | R32G32_FLOAT | R32G32B32_FLOAT | R32G32B32A32_FLOAT => glow::FLOAT,
        _ => match (format.component_byte_size(), signed) {
            (Some(1), false) => glow::UNSIGNED_BYTE,
            (Some(1), true) => glow::BYTE,
            (Some(2), false) => glow::UNSIGNED_SHORT,
            (Some(2), true) => glow::SHORT,
            (_, false) => glow::UNSIGNED_INT,
            (_, true) => glow::INT,
        },
    };

    GlVertexFormat {
        size: format.component_count() as i32,
        data_type,
        normalized: matches!(kind, VertexComponentKind::Unorm | VertexComponentKind::Snorm),
        // Packed integer formats have no integer pointer path
        integer: matches!(kind, VertexComponentKind::Uint | VertexComponentKind::Sint)
            && !format.is_packed(),
    }
}

pub fn compare_func_to_gl(func: CompareFunc) -> u32 {
    match func {
        CompareFunc::Never => glow::NEVER,
        CompareFunc::Less => glow::LESS,
        CompareFunc::Equal => glow::EQUAL,
        CompareFunc::LessEqual => glow::LEQUAL,
        CompareFunc::Greater => glow::GREATER,
        CompareFunc::NotEqual => glow::NOTEQUAL,
        CompareFunc::GreaterEqual => glow::GEQUAL,
        CompareFunc::Always => glow::ALWAYS,
    }
}

pub fn blend_factor_to_gl(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        BlendFactor::DstColor => glow::DST_COLOR,
        BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlphaSaturate => glow::SRC_ALPHA_SATURATE,
        BlendFactor::ConstantColor => glow::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => glow::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => glow::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => glow::ONE_MINUS_CONSTANT_ALPHA,
    }
}

pub fn blend_equation_to_gl(equation: BlendEquation) -> u32 {
    match equation {
        BlendEquation::Add => glow::FUNC_ADD,
        BlendEquation::Sub => glow::FUNC_SUBTRACT,
        BlendEquation::Min => glow::MIN,
        BlendEquation::Max => glow::MAX,
        BlendEquation::ReverseSub => glow::FUNC_REVERSE_SUBTRACT,
    }
}

pub fn stencil_op_to_gl(op: StencilOp) -> u32 {
    match op {
        StencilOp::Keep => glow::KEEP,
        StencilOp::Zero => glow::ZERO,
        StencilOp::Replace => glow::REPLACE,
        StencilOp::Incr => glow::INCR,
        StencilOp::Decr => glow::DECR,
        StencilOp::Invert => glow::INVERT,
        StencilOp::IncrWrap => glow::INCR_WRAP,
        StencilOp::DecrWrap => glow::DECR_WRAP,
    }
}

pub fn primitive_mode_to_gl(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Points => glow::POINTS,
        PrimitiveMode::Lines => glow::LINES,
        PrimitiveMode::LineStrip => glow::LINE_STRIP,
        PrimitiveMode::LineLoop => glow::LINE_LOOP,
        PrimitiveMode::Triangles => glow::TRIANGLES,
        PrimitiveMode::TriangleFan => glow::TRIANGLE_FAN,
        PrimitiveMode::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveMode::LinesAdjacency => glow::LINES_ADJACENCY,
        PrimitiveMode::LineStripAdjacency => glow::LINE_STRIP_ADJACENCY,
        PrimitiveMode::TrianglesAdjacency => glow::TRIANGLES_ADJACENCY,
        PrimitiveMode::TriangleStripAdjacency => glow::TRIANGLE_STRIP_ADJACENCY,
    }
}

pub fn index_format_to_gl(format: IndexFormat) -> u32 {
    match format {
        IndexFormat::U16 => glow::UNSIGNED_SHORT,
        IndexFormat::U32 => glow::UNSIGNED_INT,
    }
}

pub fn polygon_mode_to_gl(mode: PolygonMode) -> u32 {
    match mode {
        PolygonMode::Point => glow::POINT,
        PolygonMode::Line => glow::LINE,
        PolygonMode::Fill => glow::FILL,
    }
}

/// Face passed to `glCullFace`, `None` when culling is disabled
pub fn cull_face_to_gl(mode: CullingMode) -> Option<u32> {
    match mode {
        CullingMode::Front => Some(glow::FRONT),
        CullingMode::Back => Some(glow::BACK),
        CullingMode::All => Some(glow::FRONT_AND_BACK),
        CullingMode::None => None,
    }
}

pub fn wrap_mode_to_gl(mode: TexWrapMode) -> u32 {
    match mode {
        TexWrapMode::Repeat => glow::REPEAT,
        TexWrapMode::Mirror => glow::MIRRORED_REPEAT,
        TexWrapMode::Clamp => glow::CLAMP_TO_EDGE,
        TexWrapMode::MirrorOnce => MIRROR_CLAMP_TO_EDGE_EXT,
        TexWrapMode::ClampHalfBorder => CLAMP,
        TexWrapMode::MirrorOnceHalfBorder => MIRROR_CLAMP_EXT,
        TexWrapMode::ClampBorder => glow::CLAMP_TO_BORDER,
        TexWrapMode::MirrorOnceBorder => MIRROR_CLAMP_TO_BORDER_EXT,
    }
}

/// `TEXTURE_MIN_FILTER` value combining the texel and mip filters
pub fn min_filter_to_gl(min: TexXYFilterMode, mip: TexMipFilterMode) -> u32 {
    match (min, mip) {
        (TexXYFilterMode::Point, TexMipFilterMode::None) => glow::NEAREST,
        (TexXYFilterMode::Point, TexMipFilterMode::Point) => glow::NEAREST_MIPMAP_NEAREST,
        (TexXYFilterMode::Point, TexMipFilterMode::Linear) => glow::NEAREST_MIPMAP_LINEAR,
        (TexXYFilterMode::Linear, TexMipFilterMode::None) => glow::LINEAR,
        (TexXYFilterMode::Linear, TexMipFilterMode::Point) => glow::LINEAR_MIPMAP_NEAREST,
        (TexXYFilterMode::Linear, TexMipFilterMode::Linear) => glow::LINEAR_MIPMAP_LINEAR,
    }
}

pub fn mag_filter_to_gl(mag: TexXYFilterMode) -> u32 {
    match mag {
        TexXYFilterMode::Point => glow::NEAREST,
        TexXYFilterMode::Linear => glow::LINEAR,
    }
}

#[cfg(test)]
#[path = "gl_format_tests.rs"]
mod tests;
