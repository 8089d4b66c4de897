//! GlGraphicsDevice - GraphicsDevice implementation over OpenGL 3.3+ through glow
//!
//! Every decision about which GL calls to make comes from `gl_plan` and `gl_format`; this file
//! only owns the GL objects and executes the plans against the context.

use std::any::Any;
use std::fmt;
use glow::HasContext;
use slotmap::SlotMap;
use rio_gpu::rio::{RioError, RioResult};
use rio_gpu::rio::device::{
    BufferUpload, ClearRequest, ColorTargetHandle, CompiledShader, DepthTargetHandle,
    GraphicsDevice, Indices, PipelineState, PrimitiveMode, RenderBufferHandle, RenderStateGroups, SamplerBinding,
    SamplerHandle, ShaderHandle, ShaderSource, ShaderVariable, TextureHandle, TextureSource,
    UniformBlockHandle, VertexAttributeDesc, VertexBufferBinding, VertexBufferHandle,
    VertexLayoutHandle,
};
use rio_gpu::rio::gpu::{
    Backend, SamplerDirty, SamplerState, Scissor, ShaderMode, ShaderStage, Surface, SurfaceData,
    UniformValue, Viewport, RENDER_TARGET_MAX_NUM,
};
use rio_gpu::{engine_debug, engine_error, engine_info, engine_trace};
use crate::gl_debug::{gl_error_name, record_gl_error};
use crate::gl_format::{comp_map_to_gl_swizzle, texture_format_to_gl, GlTextureFormat};
use crate::gl_plan::{
    arrays_call, attrib_pointers, buffer_write, clear_plan, draw_buffer_list, elements_call,
    level_uploads, pipeline_plan, resolve_location, sampler_plan, uniform_call, BufferWrite,
    DrawCall, GlCall, LevelSource, SamplerParam, UniformCall, SPARE_TEXTURE_UNIT,
    TEXTURE_UNIT_MAX,
};

const SOURCE: &str = "rio::gl";

/// GL device options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlConfig {
    /// Drain `glGetError` after every device operation and fail on the first error
    pub debug_checks: bool,
}

impl Default for GlConfig {
    fn default() -> Self {
        Self {
            debug_checks: cfg!(feature = "gl-debug-checks"),
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug)]
struct GlTexture {
    texture: glow::NativeTexture,
    surface: Surface,
    comp_map: u32,
    /// False for textures created over externally owned data
    self_allocated: bool,
}

#[derive(Debug)]
struct GlBuffer {
    buffer: glow::NativeBuffer,
    size: usize,
    stride: u32,
}

#[derive(Debug)]
struct GlProgram {
    program: glow::NativeProgram,
}

#[derive(Debug, Default)]
struct GlRenderTarget {
    link: Option<(TextureHandle, Surface)>,
    mip_level: u32,
}

#[derive(Debug)]
struct GlRenderBuffer {
    framebuffer: glow::NativeFramebuffer,
    draw_buffers: [bool; RENDER_TARGET_MAX_NUM],
}

fn stale(kind: &str) -> RioError {
    RioError::InvalidResource(format!("unknown {} handle", kind))
}

fn contract(message: String) -> RioError {
    engine_error!(SOURCE, "{}", message);
    RioError::ContractViolation(message)
}

fn backend_error(message: String) -> RioError {
    engine_error!(SOURCE, "{}", message);
    RioError::BackendError(message)
}

fn location(raw: u32) -> glow::NativeUniformLocation {
    glow::NativeUniformLocation(raw)
}

/// Bytes of one level inside caller-provided surface data
fn level_bytes<'a>(data: &'a SurfaceData, source: &LevelSource) -> Option<&'a [u8]> {
    match source {
        LevelSource::Image(range) => data.image().get(range.clone()),
        LevelSource::Mipmaps(range) => data.mipmaps()?.get(range.clone()),
    }
}

fn level_len(source: &LevelSource) -> usize {
    match source {
        LevelSource::Image(range) | LevelSource::Mipmaps(range) => range.len(),
    }
}

// ============================================================================
// Device
// ============================================================================

pub struct GlGraphicsDevice {
    gl: glow::Context,
    config: GlConfig,
    current_render_buffer: Option<RenderBufferHandle>,
    bound_program: Option<ShaderHandle>,
    textures: SlotMap<TextureHandle, GlTexture>,
    samplers: SlotMap<SamplerHandle, glow::NativeSampler>,
    vertex_buffers: SlotMap<VertexBufferHandle, GlBuffer>,
    vertex_layouts: SlotMap<VertexLayoutHandle, glow::NativeVertexArray>,
    uniform_blocks: SlotMap<UniformBlockHandle, GlBuffer>,
    shaders: SlotMap<ShaderHandle, GlProgram>,
    color_targets: SlotMap<ColorTargetHandle, GlRenderTarget>,
    depth_targets: SlotMap<DepthTargetHandle, GlRenderTarget>,
    render_buffers: SlotMap<RenderBufferHandle, GlRenderBuffer>,
    /// Element buffer the indices of each indexed draw are streamed into
    index_buffer: Option<glow::NativeBuffer>,
}

impl fmt::Debug for GlGraphicsDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlGraphicsDevice")
            .field("config", &self.config)
            .field("textures", &self.textures.len())
            .field("shaders", &self.shaders.len())
            .field("render_buffers", &self.render_buffers.len())
            .finish()
    }
}

impl GlGraphicsDevice {
    /// Wrap a current GL context
    pub fn new(gl: glow::Context, config: GlConfig) -> RioResult<Self> {
        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        let renderer = unsafe { gl.get_parameter_string(glow::RENDERER) };
        engine_info!(SOURCE, "OpenGL {} on {}", version, renderer);
        if config.debug_checks {
            engine_debug!(SOURCE, "glGetError checks enabled");
        }

        let device = Self {
            gl,
            config,
            current_render_buffer: None,
            bound_program: None,
            textures: SlotMap::with_key(),
            samplers: SlotMap::with_key(),
            vertex_buffers: SlotMap::with_key(),
            vertex_layouts: SlotMap::with_key(),
            uniform_blocks: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            color_targets: SlotMap::with_key(),
            depth_targets: SlotMap::with_key(),
            render_buffers: SlotMap::with_key(),
            index_buffer: None,
        };
        device.check("context setup")?;
        Ok(device)
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    pub fn config(&self) -> &GlConfig {
        &self.config
    }

    pub fn texture_object(&self, texture: TextureHandle) -> Option<glow::NativeTexture> {
        self.textures.get(texture).map(|t| t.texture)
    }

    pub fn program_object(&self, shader: ShaderHandle) -> Option<glow::NativeProgram> {
        self.shaders.get(shader).map(|s| s.program)
    }

    pub fn vertex_array_object(&self, layout: VertexLayoutHandle) -> Option<glow::NativeVertexArray> {
        self.vertex_layouts.get(layout).copied()
    }

    pub fn bound_shader(&self) -> Option<ShaderHandle> {
        self.bound_program
    }

    pub fn current_render_buffer(&self) -> Option<RenderBufferHandle> {
        self.current_render_buffer
    }

    /// Drain the GL error queue after `operation`
    fn check(&self, operation: &str) -> RioResult<()> {
        if !self.config.debug_checks {
            return Ok(());
        }
        let mut first = None;
        loop {
            let code = unsafe { self.gl.get_error() };
            if code == glow::NO_ERROR {
                break;
            }
            record_gl_error(operation, code);
            first.get_or_insert(code);
        }
        match first {
            Some(code) => Err(RioError::BackendError(format!(
                "{} raised {}",
                operation,
                gl_error_name(code)
            ))),
            None => Ok(()),
        }
    }

    fn execute(&self, calls: &[GlCall]) {
        let gl = &self.gl;
        for call in calls {
            unsafe {
                match *call {
                    GlCall::Enable(cap) => gl.enable(cap),
                    GlCall::Disable(cap) => gl.disable(cap),
                    GlCall::EnableIndexed(cap, index) => gl.enable_draw_buffer(cap, index),
                    GlCall::DisableIndexed(cap, index) => gl.disable_draw_buffer(cap, index),
                    GlCall::DepthMask(write) => gl.depth_mask(write),
                    GlCall::DepthFunc(func) => gl.depth_func(func),
                    GlCall::StencilFunc { func, reference, mask } => gl.stencil_func(func, reference, mask),
                    GlCall::StencilOp { fail, zfail, zpass } => gl.stencil_op(fail, zfail, zpass),
                    GlCall::StencilMask(mask) => gl.stencil_mask(mask),
                    GlCall::CullFace(face) => gl.cull_face(face),
                    GlCall::PolygonMode(mode) => gl.polygon_mode(glow::FRONT_AND_BACK, mode),
                    GlCall::BlendFuncSeparate { target: None, src_rgb, dst_rgb, src_alpha, dst_alpha } => {
                        gl.blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha)
                    }
                    GlCall::BlendFuncSeparate { target: Some(target), src_rgb, dst_rgb, src_alpha, dst_alpha } => {
                        gl.blend_func_separate_draw_buffer(target, src_rgb, dst_rgb, src_alpha, dst_alpha)
                    }
                    GlCall::BlendEquationSeparate { target: None, rgb, alpha } => {
                        gl.blend_equation_separate(rgb, alpha)
                    }
                    GlCall::BlendEquationSeparate { target: Some(target), rgb, alpha } => {
                        gl.blend_equation_separate_draw_buffer(target, rgb, alpha)
                    }
                    GlCall::BlendColor([r, g, b, a]) => gl.blend_color(r, g, b, a),
                    GlCall::ColorMask { target: None, mask: [r, g, b, a] } => gl.color_mask(r, g, b, a),
                    GlCall::ColorMask { target: Some(target), mask: [r, g, b, a] } => {
                        gl.color_mask_draw_buffer(target, r, g, b, a)
                    }
                    GlCall::DrawBuffer(buffer) => gl.draw_buffer(buffer),
                    GlCall::ClearColor([r, g, b, a]) => gl.clear_color(r, g, b, a),
                    GlCall::ClearDepth(depth) => gl.clear_depth_f32(depth),
                    GlCall::ClearStencil(stencil) => gl.clear_stencil(stencil),
                    GlCall::Clear(mask) => gl.clear(mask),
                }
            }
        }
    }

    fn bind_texture_storage(&self, texture: glow::NativeTexture, comp_map: u32) {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.tex_parameter_i32_slice(
                glow::TEXTURE_2D,
                glow::TEXTURE_SWIZZLE_RGBA,
                &comp_map_to_gl_swizzle(comp_map),
            );
        }
    }

    /// Allocate and fill every level of the texture bound to TEXTURE_2D
    fn upload_levels(&self, surface: &Surface, format: GlTextureFormat, data: Option<&SurfaceData>) {
        let gl = &self.gl;
        let compressed = surface.format.is_compressed();
        unsafe {
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_BASE_LEVEL, 0);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAX_LEVEL,
                surface.mip_levels.saturating_sub(1) as i32,
            );
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        }

        for upload in level_uploads(surface) {
            let bytes = data.and_then(|data| level_bytes(data, &upload.source));
            let (width, height) = (upload.width as i32, upload.height as i32);
            unsafe {
                if compressed {
                    // Compressed storage cannot be allocated without contents
                    let zeroed;
                    let bytes = match bytes {
                        Some(bytes) => bytes,
                        None => {
                            zeroed = vec![0u8; level_len(&upload.source)];
                            &zeroed
                        }
                    };
                    gl.compressed_tex_image_2d(
                        glow::TEXTURE_2D,
                        upload.level as i32,
                        format.internal_format,
                        width,
                        height,
                        0,
                        bytes.len() as i32,
                        bytes,
                    );
                } else {
                    gl.tex_image_2d(
                        glow::TEXTURE_2D,
                        upload.level as i32,
                        format.internal_format,
                        width,
                        height,
                        0,
                        format.format,
                        format.ty,
                        glow::PixelUnpackData::Slice(bytes),
                    );
                }
            }
        }
    }

    fn write_buffer(
        &self,
        target: u32,
        entry: &GlBuffer,
        data: &[u8],
        mode: BufferUpload,
    ) -> usize {
        let write = match buffer_write(mode) {
            BufferWrite::SubData if entry.size != data.len() => buffer_write(BufferUpload::Reallocate),
            write => write,
        };
        unsafe {
            self.gl.bind_buffer(target, Some(entry.buffer));
            match write {
                BufferWrite::SubData => self.gl.buffer_sub_data_u8_slice(target, 0, data),
                BufferWrite::Data { usage } => self.gl.buffer_data_u8_slice(target, data, usage),
            }
        }
        data.len()
    }

    fn write_buffer_range(&self, target: u32, entry: &GlBuffer, kind: &str, offset: u32, data: &[u8]) -> RioResult<()> {
        let end = offset as usize + data.len();
        if end > entry.size {
            return Err(contract(format!(
                "{} update of {} bytes at {} overruns its {} bytes",
                kind,
                data.len(),
                offset,
                entry.size
            )));
        }
        unsafe {
            self.gl.bind_buffer(target, Some(entry.buffer));
            self.gl.buffer_sub_data_u8_slice(target, offset as i32, data);
        }
        Ok(())
    }

    fn compile_stage(&self, stage: u32, label: &str, source: &str) -> RioResult<glow::NativeShader> {
        unsafe {
            let shader = self.gl.create_shader(stage).map_err(backend_error)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                let message = format!("{} shader failed to compile: {}", label, log.trim_end());
                engine_error!(SOURCE, "{}", message);
                return Err(RioError::InvalidAsset(message));
            }
            Ok(shader)
        }
    }

    fn link_program(&self, vertex: &str, fragment: &str) -> RioResult<glow::NativeProgram> {
        let vs = self.compile_stage(glow::VERTEX_SHADER, "vertex", vertex)?;
        let fs = match self.compile_stage(glow::FRAGMENT_SHADER, "fragment", fragment) {
            Ok(fs) => fs,
            Err(err) => {
                unsafe { self.gl.delete_shader(vs) };
                return Err(err);
            }
        };

        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(message) => {
                    self.gl.delete_shader(vs);
                    self.gl.delete_shader(fs);
                    return Err(backend_error(message));
                }
            };
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, fs);
            self.gl.link_program(program);
            self.gl.detach_shader(program, vs);
            self.gl.detach_shader(program, fs);
            self.gl.delete_shader(vs);
            self.gl.delete_shader(fs);

            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                let message = format!("program failed to link: {}", log.trim_end());
                engine_error!(SOURCE, "{}", message);
                return Err(RioError::InvalidAsset(message));
            }

            // Block i is bound at binding point i
            let blocks = self.gl.get_program_parameter_i32(program, glow::ACTIVE_UNIFORM_BLOCKS);
            for index in 0..blocks.max(0) as u32 {
                self.gl.uniform_block_binding(program, index, index);
            }
            Ok(program)
        }
    }

    fn framebuffer_of(&self, buffer: RenderBufferHandle) -> RioResult<glow::NativeFramebuffer> {
        self.render_buffers
            .get(buffer)
            .map(|b| b.framebuffer)
            .ok_or_else(|| stale("render buffer"))
    }

    /// Texture object and level a linked target writes to
    fn target_attachment(
        &self,
        target: Option<&GlRenderTarget>,
        kind: &str,
    ) -> RioResult<(glow::NativeTexture, Surface, u32)> {
        let target = target.ok_or_else(|| stale(kind))?;
        let (texture, surface) = target
            .link
            .ok_or_else(|| contract(format!("{} is not linked to a texture", kind)))?;
        let texture = self.textures.get(texture).ok_or_else(|| stale("texture"))?.texture;
        Ok((texture, surface, target.mip_level))
    }

    fn attach_color(&self, target: ColorTargetHandle, index: u32) -> RioResult<Surface> {
        if index as usize >= RENDER_TARGET_MAX_NUM {
            return Err(contract(format!("render target index {} out of range", index)));
        }
        let (texture, surface, mip) = self.target_attachment(self.color_targets.get(target), "color target")?;
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0 + index,
                glow::TEXTURE_2D,
                Some(texture),
                mip as i32,
            );
        }
        Ok(surface)
    }

    fn attach_depth(&self, target: DepthTargetHandle) -> RioResult<Surface> {
        let (texture, surface, mip) = self.target_attachment(self.depth_targets.get(target), "depth target")?;
        let attachment = if surface.format.has_stencil(Backend::Gl) {
            glow::DEPTH_STENCIL_ATTACHMENT
        } else {
            glow::DEPTH_ATTACHMENT
        };
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                attachment,
                glow::TEXTURE_2D,
                Some(texture),
                mip as i32,
            );
        }
        Ok(surface)
    }

    /// Frame buffer the next attachment goes to
    fn current_framebuffer(&self) -> RioResult<glow::NativeFramebuffer> {
        let buffer = self
            .current_render_buffer
            .ok_or_else(|| contract("no render buffer bound".to_string()))?;
        self.framebuffer_of(buffer)
    }

    /// Rebind whatever frame buffer was current before a clear or read
    fn restore_framebuffer(&self) {
        let framebuffer = self
            .current_render_buffer
            .and_then(|buffer| self.render_buffers.get(buffer))
            .map(|b| b.framebuffer);
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer) };
    }

    fn draw(&self, call: DrawCall) {
        let gl = &self.gl;
        unsafe {
            match call {
                DrawCall::Arrays { mode, first, count } => gl.draw_arrays(mode, first, count),
                DrawCall::ArraysInstanced { mode, first, count, instances } => {
                    gl.draw_arrays_instanced(mode, first, count, instances)
                }
                DrawCall::Elements { mode, count, ty } => gl.draw_elements(mode, count, ty, 0),
                DrawCall::ElementsInstanced { mode, count, ty, instances } => {
                    gl.draw_elements_instanced(mode, count, ty, 0, instances)
                }
            }
        }
    }

    fn set_uniform_call(&self, loc: &glow::NativeUniformLocation, call: &UniformCall) -> RioResult<()> {
        let gl = &self.gl;
        let loc = Some(loc);
        unsafe {
            match call {
                UniformCall::Float { components, values } => match components {
                    1 => gl.uniform_1_f32_slice(loc, values),
                    2 => gl.uniform_2_f32_slice(loc, values),
                    3 => gl.uniform_3_f32_slice(loc, values),
                    4 => gl.uniform_4_f32_slice(loc, values),
                    n => return Err(contract(format!("float uniform with {} components", n))),
                },
                UniformCall::Int { components, values } => match components {
                    1 => gl.uniform_1_i32_slice(loc, values),
                    2 => gl.uniform_2_i32_slice(loc, values),
                    3 => gl.uniform_3_i32_slice(loc, values),
                    4 => gl.uniform_4_i32_slice(loc, values),
                    n => return Err(contract(format!("int uniform with {} components", n))),
                },
                UniformCall::Uint { components, values } => match components {
                    1 => gl.uniform_1_u32_slice(loc, values),
                    2 => gl.uniform_2_u32_slice(loc, values),
                    3 => gl.uniform_3_u32_slice(loc, values),
                    4 => gl.uniform_4_u32_slice(loc, values),
                    n => return Err(contract(format!("uint uniform with {} components", n))),
                },
                UniformCall::Matrix { columns, rows, values } => match (columns, rows) {
                    (2, 2) => gl.uniform_matrix_2_f32_slice(loc, false, values),
                    (3, 3) => gl.uniform_matrix_3_f32_slice(loc, false, values),
                    (4, 4) => gl.uniform_matrix_4_f32_slice(loc, false, values),
                    (2, 3) => gl.uniform_matrix_2x3_f32_slice(loc, false, values),
                    (3, 2) => gl.uniform_matrix_3x2_f32_slice(loc, false, values),
                    (2, 4) => gl.uniform_matrix_2x4_f32_slice(loc, false, values),
                    (4, 2) => gl.uniform_matrix_4x2_f32_slice(loc, false, values),
                    (3, 4) => gl.uniform_matrix_3x4_f32_slice(loc, false, values),
                    (4, 3) => gl.uniform_matrix_4x3_f32_slice(loc, false, values),
                    (c, r) => return Err(contract(format!("{}x{} matrix uniform", c, r))),
                },
            }
        }
        Ok(())
    }
}

impl GraphicsDevice for GlGraphicsDevice {
    fn backend(&self) -> Backend {
        Backend::Gl
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn swaps_uniform_words(&self) -> bool {
        false
    }

    // ===== TEXTURES =====

    fn create_texture(
        &mut self,
        surface: &Surface,
        comp_map: u32,
        source: TextureSource<'_>,
    ) -> RioResult<TextureHandle> {
        let format = texture_format_to_gl(surface.format)
            .ok_or_else(|| contract(format!("{:?} has no OpenGL storage", surface.format)))?;
        let texture = unsafe { self.gl.create_texture() }.map_err(backend_error)?;

        self.bind_texture_storage(texture, comp_map);
        let data = match source {
            TextureSource::Data(data) | TextureSource::External(data) => Some(data),
            TextureSource::Empty => None,
        };
        self.upload_levels(surface, format, data);
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, None) };

        if let Err(err) = self.check("create texture") {
            unsafe { self.gl.delete_texture(texture) };
            return Err(err);
        }
        engine_debug!(
            SOURCE,
            "Created texture {}x{} {:?} ({} mips)",
            surface.width,
            surface.height,
            surface.format,
            surface.mip_levels
        );
        Ok(self.textures.insert(GlTexture {
            texture,
            surface: *surface,
            comp_map,
            self_allocated: source.is_self_allocated(),
        }))
    }

    fn set_texture_comp_map(&mut self, texture: TextureHandle, comp_map: u32) -> RioResult<()> {
        let entry = self.textures.get_mut(texture).ok_or_else(|| stale("texture"))?;
        entry.comp_map = comp_map;
        let object = entry.texture;
        self.bind_texture_storage(object, comp_map);
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, None) };
        self.check("set texture swizzle")
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> RioResult<()> {
        let entry = self.textures.remove(texture).ok_or_else(|| stale("texture"))?;
        // The GL copy is always ours, even when the source data is not
        if !entry.self_allocated {
            engine_trace!(SOURCE, "Releasing GL copy of external {:?} texture", entry.surface.format);
        }
        unsafe { self.gl.delete_texture(entry.texture) };
        Ok(())
    }

    // ===== SAMPLERS =====

    fn create_sampler(&mut self) -> RioResult<SamplerHandle> {
        let sampler = unsafe { self.gl.create_sampler() }.map_err(backend_error)?;
        Ok(self.samplers.insert(sampler))
    }

    fn update_sampler(
        &mut self,
        sampler: SamplerHandle,
        state: &SamplerState,
        dirty: SamplerDirty,
    ) -> RioResult<()> {
        let object = *self.samplers.get(sampler).ok_or_else(|| stale("sampler"))?;
        for param in sampler_plan(state, dirty) {
            unsafe {
                match param {
                    SamplerParam::Int(name, value) => self.gl.sampler_parameter_i32(object, name, value),
                    SamplerParam::Float(name, value) => self.gl.sampler_parameter_f32(object, name, value),
                    SamplerParam::Color(name, color) => {
                        self.gl.sampler_parameter_f32_slice(object, name, &color)
                    }
                }
            }
        }
        self.check("update sampler")
    }

    fn bind_sampler(
        &mut self,
        sampler: SamplerHandle,
        _state: &SamplerState,
        texture: TextureHandle,
        binding: SamplerBinding,
    ) -> RioResult<()> {
        let object = *self.samplers.get(sampler).ok_or_else(|| stale("sampler"))?;
        let texture = self.textures.get(texture).ok_or_else(|| stale("texture"))?.texture;
        if binding.slot >= TEXTURE_UNIT_MAX {
            return Err(contract(format!(
                "texture unit {} out of range (max {})",
                binding.slot,
                TEXTURE_UNIT_MAX - 1
            )));
        }
        let loc = resolve_location(binding.vertex, binding.fragment).map_err(|err| {
            engine_error!(SOURCE, "{}", err);
            err
        })?;

        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + binding.slot);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.bind_sampler(binding.slot, Some(object));
            if let Some(loc) = loc {
                self.gl.uniform_1_i32(Some(&location(loc)), binding.slot as i32);
            }
            self.gl.active_texture(glow::TEXTURE0 + SPARE_TEXTURE_UNIT);
        }
        self.check("bind sampler")
    }

    fn destroy_sampler(&mut self, sampler: SamplerHandle) -> RioResult<()> {
        let object = self.samplers.remove(sampler).ok_or_else(|| stale("sampler"))?;
        unsafe { self.gl.delete_sampler(object) };
        Ok(())
    }

    // ===== VERTEX INPUT =====

    fn create_vertex_buffer(&mut self, slot: u32) -> RioResult<VertexBufferHandle> {
        engine_trace!(SOURCE, "Vertex buffer for slot {}", slot);
        let buffer = unsafe { self.gl.create_buffer() }.map_err(backend_error)?;
        Ok(self.vertex_buffers.insert(GlBuffer { buffer, size: 0, stride: 0 }))
    }

    fn upload_vertex_buffer(
        &mut self,
        buffer: VertexBufferHandle,
        data: &[u8],
        stride: u32,
        mode: BufferUpload,
        _invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.vertex_buffers.get(buffer).ok_or_else(|| stale("vertex buffer"))?;
        let size = self.write_buffer(glow::ARRAY_BUFFER, entry, data, mode);
        if let Some(entry) = self.vertex_buffers.get_mut(buffer) {
            entry.size = size;
            entry.stride = stride;
        }
        self.check("upload vertex buffer")
    }

    fn update_vertex_buffer(
        &mut self,
        buffer: VertexBufferHandle,
        offset: u32,
        data: &[u8],
        _invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.vertex_buffers.get(buffer).ok_or_else(|| stale("vertex buffer"))?;
        self.write_buffer_range(glow::ARRAY_BUFFER, entry, "vertex buffer", offset, data)?;
        self.check("update vertex buffer")
    }

    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferHandle) -> RioResult<()> {
        let entry = self.vertex_buffers.remove(buffer).ok_or_else(|| stale("vertex buffer"))?;
        unsafe { self.gl.delete_buffer(entry.buffer) };
        Ok(())
    }

    fn create_vertex_layout(&mut self) -> RioResult<VertexLayoutHandle> {
        let vao = unsafe { self.gl.create_vertex_array() }.map_err(backend_error)?;
        Ok(self.vertex_layouts.insert(vao))
    }

    fn build_vertex_layout(
        &mut self,
        layout: VertexLayoutHandle,
        attributes: &[VertexAttributeDesc],
        buffers: &[VertexBufferBinding],
    ) -> RioResult<()> {
        let vao = *self.vertex_layouts.get(layout).ok_or_else(|| stale("vertex layout"))?;
        let mut objects = Vec::with_capacity(buffers.len());
        for binding in buffers {
            let entry = self.vertex_buffers.get(binding.buffer).ok_or_else(|| stale("vertex buffer"))?;
            objects.push((binding.slot, entry.buffer, entry.stride));
        }
        let pointers = attrib_pointers(attributes, |slot| {
            objects.iter().find(|(s, _, _)| *s == slot).map(|(_, _, stride)| *stride)
        })
        .map_err(|err| {
            engine_error!(SOURCE, "{}", err);
            err
        })?;

        unsafe {
            self.gl.bind_vertex_array(Some(vao));
            for (slot, buffer, _) in &objects {
                self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(*buffer));
                for pointer in pointers.iter().filter(|p| p.slot == *slot) {
                    self.gl.enable_vertex_attrib_array(pointer.location);
                    if pointer.integer {
                        self.gl.vertex_attrib_pointer_i32(
                            pointer.location,
                            pointer.size,
                            pointer.data_type,
                            pointer.stride,
                            pointer.offset,
                        );
                    } else {
                        self.gl.vertex_attrib_pointer_f32(
                            pointer.location,
                            pointer.size,
                            pointer.data_type,
                            pointer.normalized,
                            pointer.stride,
                            pointer.offset,
                        );
                    }
                }
            }
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        engine_trace!(SOURCE, "Vertex layout with {} attribute pointers", pointers.len());
        self.check("build vertex layout")
    }

    fn bind_vertex_layout(
        &mut self,
        layout: VertexLayoutHandle,
        _buffers: &[VertexBufferBinding],
    ) -> RioResult<()> {
        // Buffer bindings live in the VAO
        let vao = *self.vertex_layouts.get(layout).ok_or_else(|| stale("vertex layout"))?;
        unsafe { self.gl.bind_vertex_array(Some(vao)) };
        self.check("bind vertex layout")
    }

    fn destroy_vertex_layout(&mut self, layout: VertexLayoutHandle) -> RioResult<()> {
        let vao = self.vertex_layouts.remove(layout).ok_or_else(|| stale("vertex layout"))?;
        unsafe { self.gl.delete_vertex_array(vao) };
        Ok(())
    }

    // ===== UNIFORM BLOCKS =====

    fn create_uniform_block(&mut self) -> RioResult<UniformBlockHandle> {
        let buffer = unsafe { self.gl.create_buffer() }.map_err(backend_error)?;
        Ok(self.uniform_blocks.insert(GlBuffer { buffer, size: 0, stride: 0 }))
    }

    fn upload_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        data: &[u8],
        mode: BufferUpload,
        _invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.uniform_blocks.get(block).ok_or_else(|| stale("uniform block"))?;
        let size = self.write_buffer(glow::UNIFORM_BUFFER, entry, data, mode);
        if let Some(entry) = self.uniform_blocks.get_mut(block) {
            entry.size = size;
        }
        self.check("upload uniform block")
    }

    fn update_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        offset: u32,
        data: &[u8],
        _invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.uniform_blocks.get(block).ok_or_else(|| stale("uniform block"))?;
        self.write_buffer_range(glow::UNIFORM_BUFFER, entry, "uniform block", offset, data)?;
        self.check("update uniform block")
    }

    fn bind_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        stage: ShaderStage,
        vs_index: Option<u32>,
        fs_index: Option<u32>,
    ) -> RioResult<()> {
        let buffer = self.uniform_blocks.get(block).ok_or_else(|| stale("uniform block"))?.buffer;
        let index = if stage.contains(ShaderStage::VERTEX) {
            vs_index
        } else if stage.contains(ShaderStage::FRAGMENT) {
            fs_index
        } else {
            return Ok(());
        };
        let index = index.ok_or_else(|| contract(format!("no block index for stage {:?}", stage)))?;
        unsafe {
            self.gl.bind_buffer(glow::UNIFORM_BUFFER, Some(buffer));
            self.gl.bind_buffer_base(glow::UNIFORM_BUFFER, index, Some(buffer));
        }
        self.check("bind uniform block")
    }

    fn destroy_uniform_block(&mut self, block: UniformBlockHandle) -> RioResult<()> {
        let entry = self.uniform_blocks.remove(block).ok_or_else(|| stale("uniform block"))?;
        unsafe { self.gl.delete_buffer(entry.buffer) };
        Ok(())
    }

    // ===== SHADERS =====

    fn compile_shader(&mut self, source: ShaderSource<'_>) -> RioResult<CompiledShader> {
        let (vertex, fragment) = match source {
            ShaderSource::Glsl { vertex, fragment } => (vertex, fragment),
            ShaderSource::Binary(_) => {
                let message = "OpenGL cannot load GFD shader binaries".to_string();
                engine_error!(SOURCE, "{}", message);
                return Err(RioError::InvalidAsset(message));
            }
        };
        let program = self.link_program(vertex, fragment)?;
        self.check("compile shader")?;
        engine_debug!(SOURCE, "Linked program {:?}", program);
        Ok(CompiledShader {
            handle: self.shaders.insert(GlProgram { program }),
            modes: None,
        })
    }

    fn shader_location(
        &self,
        shader: ShaderHandle,
        variable: ShaderVariable,
        name: &str,
    ) -> Option<u32> {
        let program = self.shaders.get(shader)?.program;
        unsafe {
            match variable {
                ShaderVariable::VertexAttrib => self.gl.get_attrib_location(program, name),
                ShaderVariable::VertexSampler
                | ShaderVariable::FragmentSampler
                | ShaderVariable::VertexUniform
                | ShaderVariable::FragmentUniform => {
                    self.gl.get_uniform_location(program, name).map(|loc| loc.0)
                }
                ShaderVariable::VertexUniformBlock | ShaderVariable::FragmentUniformBlock => {
                    self.gl.get_uniform_block_index(program, name)
                }
            }
        }
    }

    fn set_shader_mode(&mut self, _mode: ShaderMode) -> RioResult<()> {
        Ok(())
    }

    fn bind_shader(&mut self, shader: ShaderHandle) -> RioResult<()> {
        let program = self.shaders.get(shader).ok_or_else(|| stale("shader"))?.program;
        unsafe { self.gl.use_program(Some(program)) };
        self.bound_program = Some(shader);
        self.check("bind shader")
    }

    fn set_uniform(
        &mut self,
        vs_location: Option<u32>,
        fs_location: Option<u32>,
        value: &UniformValue<'_>,
    ) -> RioResult<()> {
        let loc = resolve_location(vs_location, fs_location).map_err(|err| {
            engine_error!(SOURCE, "{}", err);
            err
        })?;
        let Some(loc) = loc else {
            return Ok(());
        };
        self.set_uniform_call(&location(loc), &uniform_call(value))?;
        self.check("set uniform")
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) -> RioResult<()> {
        let entry = self.shaders.remove(shader).ok_or_else(|| stale("shader"))?;
        if self.bound_program == Some(shader) {
            unsafe { self.gl.use_program(None) };
            self.bound_program = None;
        }
        unsafe { self.gl.delete_program(entry.program) };
        Ok(())
    }

    // ===== PIPELINE STATE =====

    fn apply_pipeline_state(
        &mut self,
        state: &PipelineState,
        groups: RenderStateGroups,
    ) -> RioResult<()> {
        self.execute(&pipeline_plan(state, groups));
        self.check("apply pipeline state")
    }

    // ===== RENDER TARGETS =====

    fn create_color_target(&mut self) -> RioResult<ColorTargetHandle> {
        Ok(self.color_targets.insert(GlRenderTarget::default()))
    }

    fn link_color_target(
        &mut self,
        target: ColorTargetHandle,
        texture: TextureHandle,
        surface: &Surface,
    ) -> RioResult<()> {
        if !self.textures.contains_key(texture) {
            return Err(stale("texture"));
        }
        let entry = self.color_targets.get_mut(target).ok_or_else(|| stale("color target"))?;
        entry.link = Some((texture, *surface));
        Ok(())
    }

    fn init_color_target(&mut self, target: ColorTargetHandle, mip_level: u32) -> RioResult<()> {
        let entry = self.color_targets.get_mut(target).ok_or_else(|| stale("color target"))?;
        entry.mip_level = mip_level;
        Ok(())
    }

    fn bind_color_target(&mut self, target: ColorTargetHandle, index: u32) -> RioResult<()> {
        self.current_framebuffer()?;
        self.attach_color(target, index)?;
        self.check("bind color target")
    }

    fn invalidate_color_target(&mut self, target: ColorTargetHandle) -> RioResult<()> {
        if !self.color_targets.contains_key(target) {
            return Err(stale("color target"));
        }
        engine_trace!(SOURCE, "Color target invalidation is implicit on OpenGL");
        Ok(())
    }

    fn destroy_color_target(&mut self, target: ColorTargetHandle) -> RioResult<()> {
        self.color_targets.remove(target).ok_or_else(|| stale("color target"))?;
        Ok(())
    }

    fn create_depth_target(&mut self) -> RioResult<DepthTargetHandle> {
        Ok(self.depth_targets.insert(GlRenderTarget::default()))
    }

    fn link_depth_target(
        &mut self,
        target: DepthTargetHandle,
        texture: TextureHandle,
        surface: &Surface,
    ) -> RioResult<()> {
        if !self.textures.contains_key(texture) {
            return Err(stale("texture"));
        }
        let entry = self.depth_targets.get_mut(target).ok_or_else(|| stale("depth target"))?;
        entry.link = Some((texture, *surface));
        Ok(())
    }

    fn init_depth_target(&mut self, target: DepthTargetHandle, mip_level: u32) -> RioResult<()> {
        let entry = self.depth_targets.get_mut(target).ok_or_else(|| stale("depth target"))?;
        entry.mip_level = mip_level;
        Ok(())
    }

    fn bind_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()> {
        self.current_framebuffer()?;
        self.attach_depth(target)?;
        self.check("bind depth target")
    }

    fn invalidate_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()> {
        if !self.depth_targets.contains_key(target) {
            return Err(stale("depth target"));
        }
        engine_trace!(SOURCE, "Depth target invalidation is implicit on OpenGL");
        Ok(())
    }

    fn destroy_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()> {
        self.depth_targets.remove(target).ok_or_else(|| stale("depth target"))?;
        Ok(())
    }

    // ===== FRAME BUFFERS =====

    fn create_render_buffer(&mut self) -> RioResult<RenderBufferHandle> {
        let framebuffer = unsafe { self.gl.create_framebuffer() }.map_err(backend_error)?;
        Ok(self.render_buffers.insert(GlRenderBuffer {
            framebuffer,
            draw_buffers: [false; RENDER_TARGET_MAX_NUM],
        }))
    }

    fn bind_render_buffer(&mut self, buffer: RenderBufferHandle) -> RioResult<()> {
        let framebuffer = self.framebuffer_of(buffer)?;
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer)) };
        self.current_render_buffer = Some(buffer);
        self.check("bind render buffer")
    }

    fn set_draw_buffers(
        &mut self,
        buffer: RenderBufferHandle,
        attachments: [bool; RENDER_TARGET_MAX_NUM],
    ) -> RioResult<()> {
        let entry = self.render_buffers.get_mut(buffer).ok_or_else(|| stale("render buffer"))?;
        entry.draw_buffers = attachments;
        let framebuffer = entry.framebuffer;
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            self.gl.draw_buffers(&draw_buffer_list(attachments));
        }
        self.restore_framebuffer();
        self.check("set draw buffers")
    }

    fn set_viewport(&mut self, viewport: &Viewport) -> RioResult<()> {
        unsafe {
            self.gl.viewport(
                viewport.x as i32,
                viewport.y as i32,
                viewport.width as i32,
                viewport.height as i32,
            );
            self.gl.depth_range_f32(viewport.near, viewport.far);
        }
        self.check("set viewport")
    }

    fn set_scissor(&mut self, scissor: &Scissor) -> RioResult<()> {
        unsafe {
            self.gl.enable(glow::SCISSOR_TEST);
            self.gl.scissor(scissor.x, scissor.y, scissor.width as i32, scissor.height as i32);
        }
        self.check("set scissor")
    }

    fn clear(&mut self, buffer: RenderBufferHandle, request: &ClearRequest) -> RioResult<()> {
        let entry = self.render_buffers.get(buffer).ok_or_else(|| stale("render buffer"))?;
        let (framebuffer, draw_buffers) = (entry.framebuffer, entry.draw_buffers);
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer)) };

        // Clear the whole target level, not the caller's viewport
        let mut extent = None;
        if let Some((target, index)) = request.color {
            let surface = self.attach_color(target, index)?;
            extent = Some((surface, self.color_targets.get(target).map_or(0, |t| t.mip_level)));
        }
        if let Some(target) = request.depth {
            let surface = self.attach_depth(target)?;
            if extent.is_none() {
                extent = Some((surface, self.depth_targets.get(target).map_or(0, |t| t.mip_level)));
            }
        }
        if let Some((surface, level)) = extent {
            let (width, height) = (surface.level_width(level) as i32, surface.level_height(level) as i32);
            unsafe {
                self.gl.viewport(0, 0, width, height);
                self.gl.scissor(0, 0, width, height);
            }
        }

        self.execute(&clear_plan(request));
        unsafe { self.gl.draw_buffers(&draw_buffer_list(draw_buffers)) };
        self.restore_framebuffer();
        self.check("clear")
    }

    fn read_color_target(
        &mut self,
        buffer: RenderBufferHandle,
        target: ColorTargetHandle,
        index: u32,
        pixels: &mut [u8],
    ) -> RioResult<()> {
        let framebuffer = self.framebuffer_of(buffer)?;
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer)) };
        let surface = self.attach_color(target, index)?;
        let level = self.color_targets.get(target).map_or(0, |t| t.mip_level);
        let format = texture_format_to_gl(surface.format)
            .filter(|f| f.format != 0)
            .ok_or_else(|| contract(format!("{:?} cannot be read back", surface.format)))?;

        unsafe {
            self.gl.read_buffer(glow::COLOR_ATTACHMENT0 + index);
            self.gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            self.gl.read_pixels(
                0,
                0,
                surface.level_width(level) as i32,
                surface.level_height(level) as i32,
                format.format,
                format.ty,
                glow::PixelPackData::Slice(Some(pixels)),
            );
        }
        self.restore_framebuffer();
        self.check("read color target")
    }

    fn destroy_render_buffer(&mut self, buffer: RenderBufferHandle) -> RioResult<()> {
        let entry = self.render_buffers.remove(buffer).ok_or_else(|| stale("render buffer"))?;
        if self.current_render_buffer == Some(buffer) {
            self.current_render_buffer = None;
            unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, None) };
        }
        unsafe { self.gl.delete_framebuffer(entry.framebuffer) };
        Ok(())
    }

    // ===== DRAW =====

    fn draw_arrays(
        &mut self,
        mode: PrimitiveMode,
        first: u32,
        count: u32,
        instance_count: u32,
    ) -> RioResult<()> {
        let call = arrays_call(mode, first, count, instance_count)
            .inspect_err(|err| engine_error!(SOURCE, "{}", err))?;
        self.draw(call);
        self.check("draw arrays")
    }

    fn draw_elements(
        &mut self,
        mode: PrimitiveMode,
        indices: Indices<'_>,
        instance_count: u32,
    ) -> RioResult<()> {
        let call = elements_call(mode, indices.format(), indices.len(), instance_count)
            .inspect_err(|err| engine_error!(SOURCE, "{}", err))?;
        let buffer = match self.index_buffer {
            Some(buffer) => buffer,
            None => {
                let buffer = unsafe { self.gl.create_buffer() }.map_err(backend_error)?;
                self.index_buffer = Some(buffer);
                buffer
            }
        };
        // The element buffer binding belongs to the bound vertex array
        unsafe {
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, &indices.to_bytes(false), glow::STREAM_DRAW);
        }
        self.draw(call);
        self.check("draw elements")
    }
}
