//! Shared graphics enums and small value types
//!
//! Fixed-function knobs used by render states, samplers and render buffers. The enums are
//! backend neutral; each backend owns the translation to its own register or GL values.

use bitflags::bitflags;
use glam::Vec4;

/// RGBA color with f32 components
pub type Color4f = Vec4;

/// Maximum number of simultaneously bound color render targets
pub const RENDER_TARGET_MAX_NUM: usize = 8;

/// Graphics backend family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// GX2-class console GPU
    Cafe,
    /// Desktop OpenGL 3.3+
    Gl,
}

/// Depth, stencil and sampler comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Which faces get culled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullingMode {
    Front,
    Back,
    None,
    All,
}

impl CullingMode {
    /// (cull front, cull back)
    pub fn face_enables(self) -> (bool, bool) {
        match self {
            CullingMode::Front => (true, false),
            CullingMode::Back => (false, true),
            CullingMode::None => (false, false),
            CullingMode::All => (true, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    DstColor,
    OneMinusDstColor,
    SrcAlphaSaturate,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendEquation {
    Add,
    Sub,
    Min,
    Max,
    ReverseSub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    /// Increment, clamped
    Incr,
    /// Decrement, clamped
    Decr,
    Invert,
    IncrWrap,
    DecrWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    Point,
    Line,
    Fill,
}

/// Constant-buffer access mode of a shader program
///
/// Only `UniformRegister` and `UniformBlock` can be activated. The geometry and compute modes
/// exist so that binaries declaring them are recognized (and rejected) instead of misread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderMode {
    UniformRegister,
    UniformBlock,
    GeometryShader,
    ComputeShader,
    /// No mode (GL, or "adopt whatever the binary declares" when loading)
    Invalid,
}

impl ShaderMode {
    /// Decode a mode word stored in a shader binary
    pub fn from_raw(raw: u32) -> Option<ShaderMode> {
        match raw {
            0 => Some(ShaderMode::UniformRegister),
            1 => Some(ShaderMode::UniformBlock),
            2 => Some(ShaderMode::GeometryShader),
            3 => Some(ShaderMode::ComputeShader),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            ShaderMode::UniformRegister => 0,
            ShaderMode::UniformBlock => 1,
            ShaderMode::GeometryShader => 2,
            ShaderMode::ComputeShader => 3,
            ShaderMode::Invalid => 4,
        }
    }

    /// Whether a context can switch to this mode
    pub fn is_activatable(self) -> bool {
        matches!(self, ShaderMode::UniformRegister | ShaderMode::UniformBlock)
    }
}

bitflags! {
    /// Shader stages a resource is bound to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStage: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
    }
}

/// Viewport rectangle plus depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
}

impl Viewport {
    /// `(0, 0, width, height)` with the full `0..1` depth range
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            near: 0.0,
            far: 1.0,
        }
    }
}

/// Scissor rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scissor {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Scissor {
    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

#[cfg(test)]
#[path = "graphics_tests.rs"]
mod tests;
