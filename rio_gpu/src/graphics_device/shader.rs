//! Shader program sources and reflection queries

use crate::graphics_device::ShaderHandle;

/// Program pair handed to the device for compilation
#[derive(Debug, Clone, Copy)]
pub enum ShaderSource<'a> {
    /// Precompiled GFD container holding one vertex and one pixel shader
    Binary(&'a [u8]),
    /// GLSL source for both stages
    Glsl { vertex: &'a str, fragment: &'a str },
}

/// Result of compiling a program pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledShader {
    pub handle: ShaderHandle,
    /// Raw (vertex, pixel) mode words declared by a binary; `None` when the backend has no modes
    pub modes: Option<(u32, u32)>,
}

/// Kind of shader variable a location lookup targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderVariable {
    VertexAttrib,
    VertexSampler,
    FragmentSampler,
    VertexUniform,
    FragmentUniform,
    VertexUniformBlock,
    FragmentUniformBlock,
}
