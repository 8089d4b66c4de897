//! Shader - a linked vertex/fragment program pair
//!
//! Cafe programs come from a `.gsh` binary and carry a shader mode that must be activated
//! before the program is bound. GL programs are compiled from GLSL and have no mode.

use crate::context::GraphicsContext;
use crate::error::{RioError, RioResult};
use crate::graphics_device::{CompiledShader, ShaderHandle, ShaderSource, ShaderVariable};
use crate::gpu::graphics::{Backend, ShaderMode};
use crate::gpu::uniform::{UniformArrayData, UniformData};
use crate::{engine_debug, engine_error};

#[derive(Debug)]
pub struct Shader {
    handle: ShaderHandle,
    mode: ShaderMode,
}

/// Check the (vertex, pixel) mode words of a binary against the requested mode
///
/// With `expected == Invalid` the vertex shader's mode is adopted.
fn resolve_mode(modes: Option<(u32, u32)>, expected: ShaderMode) -> Result<ShaderMode, String> {
    let Some((vertex_raw, pixel_raw)) = modes else {
        return Ok(ShaderMode::Invalid);
    };
    let vertex = ShaderMode::from_raw(vertex_raw)
        .ok_or_else(|| format!("unknown vertex shader mode {}", vertex_raw))?;
    let pixel = ShaderMode::from_raw(pixel_raw)
        .ok_or_else(|| format!("unknown pixel shader mode {}", pixel_raw))?;

    let mode = if expected == ShaderMode::Invalid {
        if !vertex.is_activatable() {
            return Err(format!("vertex shader mode {:?} cannot be activated", vertex));
        }
        vertex
    } else if vertex != expected {
        return Err(format!("vertex shader mode {:?}, expected {:?}", vertex, expected));
    } else {
        expected
    };

    if pixel != mode {
        return Err(format!("pixel shader mode {:?}, expected {:?}", pixel, mode));
    }
    Ok(mode)
}

impl Shader {
    /// Load `{shader_dir}/{base}.gsh` (Cafe) or `{shader_dir}/{base}.vert` + `.frag` (GL)
    pub fn load(ctx: &mut GraphicsContext, base: &str, expected_mode: ShaderMode) -> RioResult<Self> {
        match ctx.backend() {
            Backend::Cafe => {
                let path = ctx.config().shader_path(base, "gsh");
                let bytes = ctx.load_file(&path)?;
                engine_debug!("rio::gpu::Shader", "Loading shader \"{}\"", path);
                Self::load_binary(ctx, &bytes, expected_mode)
            }
            Backend::Gl => {
                let vertex = Self::load_text(ctx, &ctx.config().shader_path(base, "vert"))?;
                let fragment = Self::load_text(ctx, &ctx.config().shader_path(base, "frag"))?;
                engine_debug!("rio::gpu::Shader", "Loading shader \"{}\"", base);
                Self::compile(ctx, ShaderSource::Glsl { vertex: &vertex, fragment: &fragment }, expected_mode)
            }
        }
    }

    /// Create from a shader binary already in memory
    pub fn load_binary(ctx: &mut GraphicsContext, bytes: &[u8], expected_mode: ShaderMode) -> RioResult<Self> {
        Self::compile(ctx, ShaderSource::Binary(bytes), expected_mode)
    }

    /// Create from GLSL sources already in memory
    pub fn from_glsl(ctx: &mut GraphicsContext, vertex: &str, fragment: &str) -> RioResult<Self> {
        Self::compile(ctx, ShaderSource::Glsl { vertex, fragment }, ShaderMode::Invalid)
    }

    fn load_text(ctx: &GraphicsContext, path: &str) -> RioResult<String> {
        let bytes = ctx.load_file(path)?;
        String::from_utf8(bytes).map_err(|_| {
            engine_error!("rio::gpu::Shader", "{} is not valid UTF-8", path);
            RioError::InvalidAsset(format!("{}: not valid UTF-8", path))
        })
    }

    fn compile(ctx: &mut GraphicsContext, source: ShaderSource<'_>, expected: ShaderMode) -> RioResult<Self> {
        let CompiledShader { handle, modes } = ctx.device_mut().compile_shader(source)?;
        match resolve_mode(modes, expected) {
            Ok(mode) => Ok(Self { handle, mode }),
            Err(message) => {
                engine_error!("rio::gpu::Shader", "Shader mode mismatch: {}", message);
                ctx.device_mut().destroy_shader(handle)?;
                Err(RioError::InvalidAsset(message))
            }
        }
    }

    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }

    /// Mode declared by the program (`Invalid` on GL)
    pub fn mode(&self) -> ShaderMode {
        self.mode
    }

    // ===== LOCATIONS =====

    fn location(&self, ctx: &GraphicsContext, variable: ShaderVariable, name: &str) -> Option<u32> {
        ctx.device().shader_location(self.handle, variable, name)
    }

    pub fn vertex_attrib_location(&self, ctx: &GraphicsContext, name: &str) -> Option<u32> {
        self.location(ctx, ShaderVariable::VertexAttrib, name)
    }

    pub fn vertex_sampler_location(&self, ctx: &GraphicsContext, name: &str) -> Option<u32> {
        self.location(ctx, ShaderVariable::VertexSampler, name)
    }

    pub fn fragment_sampler_location(&self, ctx: &GraphicsContext, name: &str) -> Option<u32> {
        self.location(ctx, ShaderVariable::FragmentSampler, name)
    }

    pub fn vertex_uniform_location(&self, ctx: &GraphicsContext, name: &str) -> Option<u32> {
        self.location(ctx, ShaderVariable::VertexUniform, name)
    }

    pub fn fragment_uniform_location(&self, ctx: &GraphicsContext, name: &str) -> Option<u32> {
        self.location(ctx, ShaderVariable::FragmentUniform, name)
    }

    pub fn vertex_uniform_block_index(&self, ctx: &GraphicsContext, name: &str) -> Option<u32> {
        self.location(ctx, ShaderVariable::VertexUniformBlock, name)
    }

    pub fn fragment_uniform_block_index(&self, ctx: &GraphicsContext, name: &str) -> Option<u32> {
        self.location(ctx, ShaderVariable::FragmentUniformBlock, name)
    }

    // ===== BIND / UNIFORMS =====

    /// Activate the program's mode (if any) and bind both stages
    pub fn bind(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        if self.mode != ShaderMode::Invalid {
            ctx.set_shader_mode(self.mode, false)?;
        }
        ctx.device_mut().bind_shader(self.handle)
    }

    /// Write `value` at each present location; the bound program receives it
    pub fn set_uniform<T: UniformData + ?Sized>(
        &self,
        ctx: &mut GraphicsContext,
        vs_location: Option<u32>,
        fs_location: Option<u32>,
        value: &T,
    ) -> RioResult<()> {
        if vs_location.is_none() && fs_location.is_none() {
            return Ok(());
        }
        ctx.device_mut()
            .set_uniform(vs_location, fs_location, &value.to_uniform())
    }

    /// Write an array of vec4 values starting at each present location
    pub fn set_uniform_array<T: UniformArrayData>(
        &self,
        ctx: &mut GraphicsContext,
        vs_location: Option<u32>,
        fs_location: Option<u32>,
        values: &[T],
    ) -> RioResult<()> {
        if (vs_location.is_none() && fs_location.is_none()) || values.is_empty() {
            return Ok(());
        }
        ctx.device_mut()
            .set_uniform(vs_location, fs_location, &T::to_uniform_array(values))
    }

    pub fn destroy(self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().destroy_shader(self.handle)
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
