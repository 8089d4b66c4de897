//! GX2 register values for the backend-neutral enums
//!
//! Pure translation functions; the register model and the device only ever see the values
//! produced here.

use bitflags::bitflags;
use rio_gpu::rio::gpu::{
    BlendEquation, BlendFactor, Color4f, CompareFunc, IndexFormat, PolygonMode, PrimitiveMode,
    StencilOp, TexAnisoRatio, TexMipFilterMode, TexWrapMode, TexXYFilterMode,
};

bitflags! {
    /// Caches flushed by `GX2Invalidate`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Gx2Invalidate: u32 {
        const ATTRIBUTE_BUFFER = 0x01;
        const TEXTURE = 0x02;
        const UNIFORM_BLOCK = 0x04;
        const SHADER = 0x08;
        const COLOR_BUFFER = 0x10;
        const DEPTH_BUFFER = 0x20;
        const CPU = 0x40;
        const CPU_ATTRIBUTE_BUFFER = Self::CPU.bits() | Self::ATTRIBUTE_BUFFER.bits();
        const CPU_TEXTURE = Self::CPU.bits() | Self::TEXTURE.bits();
        const CPU_UNIFORM_BLOCK = Self::CPU.bits() | Self::UNIFORM_BLOCK.bits();
        const CPU_SHADER = Self::CPU.bits() | Self::SHADER.bits();
    }
}

bitflags! {
    /// Depth/stencil planes touched by a GX2 clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Gx2ClearFlags: u32 {
        const DEPTH = 1;
        const STENCIL = 2;
    }
}

pub const CHANNEL_MASK_R: u8 = 1;
pub const CHANNEL_MASK_G: u8 = 2;
pub const CHANNEL_MASK_B: u8 = 4;
pub const CHANNEL_MASK_A: u8 = 8;

pub const LOGIC_OP_COPY: u32 = 0xCC;
pub const FRONT_FACE_CCW: u32 = 0;

/// Shader mode switch parameters (GPR and stack budgets per stage)
pub const SHADER_MODE_VS_GPRS: u32 = 48;
pub const SHADER_MODE_VS_STACK: u32 = 64;
pub const SHADER_MODE_GS_GPRS: u32 = 0;
pub const SHADER_MODE_GS_STACK: u32 = 0;
pub const SHADER_MODE_PS_GPRS: u32 = 200;
pub const SHADER_MODE_PS_STACK: u32 = 192;

/// Texture sampler units per stage
pub const SAMPLER_UNIT_NUM: u32 = 18;
/// Uniform block binding points per stage
pub const UNIFORM_BLOCK_NUM: u32 = 16;
/// 32-bit uniform registers per stage
pub const UNIFORM_REGISTER_WORDS: usize = 1024;

/// Heap alignments
pub const SHADER_ALIGNMENT: u32 = 0x100;
pub const UNIFORM_BLOCK_ALIGNMENT: u32 = rio_gpu::rio::gpu::UNIFORM_BLOCK_ALIGNMENT;
pub const VERTEX_BUFFER_ALIGNMENT: u32 = rio_gpu::rio::gpu::VERTEX_ALIGNMENT;
pub const INDEX_BUFFER_ALIGNMENT: u32 = rio_gpu::rio::gpu::INDEX_ALIGNMENT;
pub const TEXTURE_ALIGNMENT: u32 = 0x800;

pub fn primitive_mode(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Points => 0x01,
        PrimitiveMode::Lines => 0x02,
        PrimitiveMode::LineStrip => 0x03,
        PrimitiveMode::Triangles => 0x04,
        PrimitiveMode::TriangleFan => 0x05,
        PrimitiveMode::TriangleStrip => 0x06,
        PrimitiveMode::LinesAdjacency => 0x0A,
        PrimitiveMode::LineStripAdjacency => 0x0B,
        PrimitiveMode::TrianglesAdjacency => 0x0C,
        PrimitiveMode::TriangleStripAdjacency => 0x0D,
        PrimitiveMode::LineLoop => 0x12,
    }
}

/// Big-endian index types
pub fn index_type(format: IndexFormat) -> u32 {
    match format {
        IndexFormat::U16 => 4,
        IndexFormat::U32 => 9,
    }
}

pub fn compare_func(func: CompareFunc) -> u32 {
    match func {
        CompareFunc::Never => 0,
        CompareFunc::Less => 1,
        CompareFunc::Equal => 2,
        CompareFunc::LessEqual => 3,
        CompareFunc::Greater => 4,
        CompareFunc::NotEqual => 5,
        CompareFunc::GreaterEqual => 6,
        CompareFunc::Always => 7,
    }
}

pub fn stencil_function(op: StencilOp) -> u32 {
    match op {
        StencilOp::Keep => 0,
        StencilOp::Zero => 1,
        StencilOp::Replace => 2,
        StencilOp::Incr => 3,
        StencilOp::Decr => 4,
        StencilOp::Invert => 5,
        StencilOp::IncrWrap => 6,
        StencilOp::DecrWrap => 7,
    }
}

/// Constant-color factors select the SRC1 blend modes, as the engine always has
pub fn blend_mode(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => 0,
        BlendFactor::One => 1,
        BlendFactor::SrcColor => 2,
        BlendFactor::OneMinusSrcColor => 3,
        BlendFactor::SrcAlpha => 4,
        BlendFactor::OneMinusSrcAlpha => 5,
        BlendFactor::DstAlpha => 6,
        BlendFactor::OneMinusDstAlpha => 7,
        BlendFactor::DstColor => 8,
        BlendFactor::OneMinusDstColor => 9,
        BlendFactor::SrcAlphaSaturate => 10,
        BlendFactor::ConstantColor => 15,
        BlendFactor::OneMinusConstantColor => 16,
        BlendFactor::ConstantAlpha => 17,
        BlendFactor::OneMinusConstantAlpha => 18,
    }
}

pub fn blend_combine_mode(equation: BlendEquation) -> u32 {
    match equation {
        BlendEquation::Add => 0,
        BlendEquation::Sub => 1,
        BlendEquation::Min => 2,
        BlendEquation::Max => 3,
        BlendEquation::ReverseSub => 4,
    }
}

pub fn polygon_mode(mode: PolygonMode) -> u32 {
    match mode {
        PolygonMode::Point => 0,
        PolygonMode::Line => 1,
        PolygonMode::Fill => 2,
    }
}

pub fn tex_clamp(mode: TexWrapMode) -> u32 {
    match mode {
        TexWrapMode::Repeat => 0,
        TexWrapMode::Mirror => 1,
        TexWrapMode::Clamp => 2,
        TexWrapMode::MirrorOnce => 3,
        TexWrapMode::ClampHalfBorder => 4,
        TexWrapMode::MirrorOnceHalfBorder => 5,
        TexWrapMode::ClampBorder => 6,
        TexWrapMode::MirrorOnceBorder => 7,
    }
}

pub fn tex_xy_filter(filter: TexXYFilterMode) -> u32 {
    match filter {
        TexXYFilterMode::Point => 0,
        TexXYFilterMode::Linear => 1,
    }
}

pub fn tex_mip_filter(filter: TexMipFilterMode) -> u32 {
    match filter {
        TexMipFilterMode::None => 0,
        TexMipFilterMode::Point => 1,
        TexMipFilterMode::Linear => 2,
    }
}

pub fn tex_aniso_ratio(ratio: TexAnisoRatio) -> u32 {
    match ratio {
        TexAnisoRatio::Ratio1To1 => 0,
        TexAnisoRatio::Ratio2To1 => 1,
        TexAnisoRatio::Ratio4To1 => 2,
        TexAnisoRatio::Ratio8To1 => 3,
        TexAnisoRatio::Ratio16To1 => 4,
    }
}

pub const TEX_BORDER_TRANSPARENT_BLACK: u32 = 0;
pub const TEX_BORDER_BLACK: u32 = 1;
pub const TEX_BORDER_WHITE: u32 = 2;
pub const TEX_BORDER_VARIABLE: u32 = 3;

/// Border type for a border color; anything but the three fixed colors is `VARIABLE`
pub fn tex_border_type(color: Color4f) -> u32 {
    if color == Color4f::new(0.0, 0.0, 0.0, 1.0) {
        TEX_BORDER_BLACK
    } else if color == Color4f::ONE {
        TEX_BORDER_WHITE
    } else if color == Color4f::ZERO {
        TEX_BORDER_TRANSPARENT_BLACK
    } else {
        TEX_BORDER_VARIABLE
    }
}

#[cfg(test)]
#[path = "gx2_tests.rs"]
mod tests;
