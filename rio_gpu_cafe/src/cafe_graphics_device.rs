//! CafeGraphicsDevice - GraphicsDevice implementation over the GX2 model
//!
//! Resources live in slotmaps; everything the GPU would read (texture images, vertex and uniform
//! buffers, shader and fetch programs) is stored in the MEM2 heap at a real address, and every
//! GX2 call is issued through the `Gx2Context` recorder.

use std::any::Any;
use slotmap::SlotMap;
use rio_gpu::rio::{RioError, RioResult};
use rio_gpu::rio::device::{
    BlendTargets, BufferUpload, ClearFlags, ClearRequest, ColorTargetHandle, CompiledShader,
    DepthTargetHandle, GraphicsDevice, Indices, PipelineState, PrimitiveMode, RenderBufferHandle, RenderStateGroups,
    SamplerBinding, SamplerHandle, ShaderHandle, ShaderSource, ShaderVariable, TextureHandle,
    TextureSource, UniformBlockHandle, VertexAttributeDesc, VertexBufferBinding,
    VertexBufferHandle, VertexLayoutHandle,
};
use rio_gpu::rio::gpu::{
    Backend, Color4f, CompareFunc, PolygonMode, SamplerDirty, SamplerState, Scissor, ShaderMode, ShaderStage,
    Surface, SurfaceData, TextureFormat, TexWrapMode, TexXYFilterMode, UniformValue, Viewport,
    RENDER_TARGET_MAX_NUM,
};
use rio_gpu::{engine_debug, engine_ensure, engine_error, engine_trace};
use crate::fetch_shader::{build_fetch_shader, FetchShader};
use crate::gfd::{self, GfdShaderFile};
use crate::gx2::{self, Gx2ClearFlags, Gx2Invalidate};
use crate::gx2_state::{
    AttribBuffer, BlendControl, ColorControl, DepthStencilControl, Gx2Context, Gx2Stage,
    PolygonControl, StencilMask,
};
use crate::mem2_heap::Mem2Heap;
use crate::sampler_regs::SamplerRegs;

const SOURCE: &str = "rio::cafe";

/// MEM2 window of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CafeConfig {
    pub mem2_base: u32,
    pub mem2_size: u32,
}

impl Default for CafeConfig {
    fn default() -> Self {
        Self {
            mem2_base: 0x1000_0000,
            mem2_size: 0x2000_0000,
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug)]
struct CafeTexture {
    surface: Surface,
    comp_map: u32,
    image: u32,
    mipmaps: Option<u32>,
    /// Memory the device neither allocated nor may free
    external: Option<SurfaceData>,
}

#[derive(Debug, Default)]
struct CafeBuffer {
    addr: Option<u32>,
    size: u32,
    stride: u32,
}

#[derive(Debug, Default)]
struct CafeVertexLayout {
    fetch: Option<FetchShader>,
    addr: Option<u32>,
}

#[derive(Debug)]
struct CafeShader {
    binary: GfdShaderFile,
    vertex_program: u32,
    pixel_program: u32,
}

/// Texture surface a render target writes to
#[derive(Debug, Clone, Copy)]
struct TargetLink {
    texture: TextureHandle,
    surface: Surface,
    image: u32,
    mipmaps: Option<u32>,
}

#[derive(Debug, Default)]
struct CafeRenderTarget {
    link: Option<TargetLink>,
    /// Mip level the register block was initialized for
    view_mip: Option<u32>,
}

#[derive(Debug, Default)]
struct CafeRenderBuffer {
    draw_buffers: [bool; RENDER_TARGET_MAX_NUM],
}

fn stale(kind: &str) -> RioError {
    RioError::InvalidResource(format!("unknown {} handle", kind))
}

fn contract(message: String) -> RioError {
    engine_error!(SOURCE, "{}", message);
    RioError::ContractViolation(message)
}

/// Present stage locations of a binding
fn stages(vertex: Option<u32>, pixel: Option<u32>) -> impl Iterator<Item = (Gx2Stage, u32)> {
    vertex
        .map(|unit| (Gx2Stage::Vertex, unit))
        .into_iter()
        .chain(pixel.map(|unit| (Gx2Stage::Pixel, unit)))
}

// ============================================================================
// Device
// ============================================================================

#[derive(Debug)]
pub struct CafeGraphicsDevice {
    gx2: Gx2Context,
    heap: Mem2Heap,
    current_render_buffer: Option<RenderBufferHandle>,
    textures: SlotMap<TextureHandle, CafeTexture>,
    samplers: SlotMap<SamplerHandle, SamplerRegs>,
    vertex_buffers: SlotMap<VertexBufferHandle, CafeBuffer>,
    vertex_layouts: SlotMap<VertexLayoutHandle, CafeVertexLayout>,
    uniform_blocks: SlotMap<UniformBlockHandle, CafeBuffer>,
    shaders: SlotMap<ShaderHandle, CafeShader>,
    color_targets: SlotMap<ColorTargetHandle, CafeRenderTarget>,
    depth_targets: SlotMap<DepthTargetHandle, CafeRenderTarget>,
    render_buffers: SlotMap<RenderBufferHandle, CafeRenderBuffer>,
    /// MEM2 copy of the indices of the last indexed draw
    index_scratch: CafeBuffer,
}

impl CafeGraphicsDevice {
    pub fn new(config: CafeConfig) -> Self {
        engine_debug!(
            SOURCE,
            "MEM2 heap at {:#010x}, {} bytes",
            config.mem2_base,
            config.mem2_size
        );
        Self {
            gx2: Gx2Context::new(),
            heap: Mem2Heap::new(config.mem2_base, config.mem2_size),
            current_render_buffer: None,
            textures: SlotMap::with_key(),
            samplers: SlotMap::with_key(),
            vertex_buffers: SlotMap::with_key(),
            vertex_layouts: SlotMap::with_key(),
            uniform_blocks: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            color_targets: SlotMap::with_key(),
            depth_targets: SlotMap::with_key(),
            render_buffers: SlotMap::with_key(),
            index_scratch: CafeBuffer::default(),
        }
    }

    /// Recorded GX2 calls and the register state they left
    pub fn gx2(&self) -> &Gx2Context {
        &self.gx2
    }

    pub fn gx2_mut(&mut self) -> &mut Gx2Context {
        &mut self.gx2
    }

    pub fn heap(&self) -> &Mem2Heap {
        &self.heap
    }

    pub fn current_render_buffer(&self) -> Option<RenderBufferHandle> {
        self.current_render_buffer
    }

    pub fn draw_buffers(&self, buffer: RenderBufferHandle) -> Option<[bool; RENDER_TARGET_MAX_NUM]> {
        self.render_buffers.get(buffer).map(|b| b.draw_buffers)
    }

    /// MEM2 address of a texture's base image
    pub fn texture_address(&self, texture: TextureHandle) -> Option<u32> {
        self.textures.get(texture).map(|t| t.image)
    }

    pub fn texture_comp_map(&self, texture: TextureHandle) -> Option<u32> {
        self.textures.get(texture).map(|t| t.comp_map)
    }

    pub fn sampler_regs(&self, sampler: SamplerHandle) -> Option<&SamplerRegs> {
        self.samplers.get(sampler)
    }

    pub fn vertex_buffer_bytes(&self, buffer: VertexBufferHandle) -> Option<&[u8]> {
        let addr = self.vertex_buffers.get(buffer)?.addr?;
        self.heap.read(addr)
    }

    pub fn fetch_shader(&self, layout: VertexLayoutHandle) -> Option<&FetchShader> {
        self.vertex_layouts.get(layout)?.fetch.as_ref()
    }

    /// Uniform block contents as stored in MEM2 (GPU byte order)
    pub fn uniform_block_bytes(&self, block: UniformBlockHandle) -> Option<&[u8]> {
        let addr = self.uniform_blocks.get(block)?.addr?;
        self.heap.read(addr)
    }

    /// Index data of the last indexed draw as stored in MEM2 (big-endian)
    pub fn index_bytes(&self) -> Option<&[u8]> {
        let bytes = self.heap.read(self.index_scratch.addr?)?;
        bytes.get(..self.index_scratch.size as usize)
    }

    pub fn shader_binary(&self, shader: ShaderHandle) -> Option<&GfdShaderFile> {
        self.shaders.get(shader).map(|s| &s.binary)
    }

    /// Copy `data` into a buffer, reallocating when asked to or when it has no storage yet
    fn upload_buffer(
        heap: &mut Mem2Heap,
        entry: &mut CafeBuffer,
        data: &[u8],
        mode: BufferUpload,
        align: u32,
    ) -> RioResult<u32> {
        match entry.addr {
            Some(addr) if mode == BufferUpload::Update && entry.size as usize == data.len() => {
                heap.write(addr, 0, data)?;
                Ok(addr)
            }
            previous => {
                if let Some(addr) = previous {
                    heap.free(addr)?;
                    entry.addr = None;
                }
                let addr = heap.alloc_with(data, align)?;
                entry.addr = Some(addr);
                entry.size = data.len() as u32;
                Ok(addr)
            }
        }
    }

    fn update_buffer(
        heap: &mut Mem2Heap,
        entry: &CafeBuffer,
        kind: &str,
        offset: u32,
        data: &[u8],
    ) -> RioResult<u32> {
        let addr = entry.addr.ok_or_else(|| contract(format!("{} has no storage yet", kind)))?;
        heap.write(addr, offset as usize, data)?;
        Ok(addr)
    }

    fn link_target(&self, texture: TextureHandle, surface: &Surface) -> RioResult<TargetLink> {
        let entry = self.textures.get(texture).ok_or_else(|| stale("texture"))?;
        Ok(TargetLink { texture, surface: *surface, image: entry.image, mipmaps: entry.mipmaps })
    }

    /// Bytes of `level` of a render target's surface
    fn level_bytes(&self, link: &TargetLink, level: u32) -> Option<&[u8]> {
        if let Some(external) = self.textures.get(link.texture).and_then(|t| t.external.as_ref()) {
            return match level {
                0 => Some(external.image()),
                _ => external.mipmaps()?.get(link.surface.mip_level_range(level)?),
            };
        }
        match level {
            0 => self.heap.read(link.image),
            _ => self.heap.read(link.mipmaps?)?.get(link.surface.mip_level_range(level)?),
        }
    }

    fn level_bytes_mut(&mut self, link: &TargetLink, level: u32) -> Option<&mut [u8]> {
        match level {
            0 => self.heap.bytes_mut(link.image),
            _ => {
                let range = link.surface.mip_level_range(level)?;
                self.heap.bytes_mut(link.mipmaps?)?.get_mut(range)
            }
        }
    }

    /// Write the clear color into the target's memory for the 8-bit UNORM formats
    fn fill_color(&mut self, link: &TargetLink, level: u32, color: Color4f) {
        let channels: usize = match link.surface.format {
            TextureFormat::R8_UNORM => 1,
            TextureFormat::R8G8_UNORM => 2,
            TextureFormat::R8G8B8A8_UNORM | TextureFormat::R8G8B8A8_SRGB => 4,
            other => {
                engine_trace!(SOURCE, "clear of {:?} not mirrored into MEM2", other);
                return;
            }
        };
        let texel: Vec<u8> = color
            .to_array()
            .iter()
            .take(channels)
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();
        if let Some(bytes) = self.level_bytes_mut(link, level) {
            for chunk in bytes.chunks_exact_mut(channels) {
                chunk.copy_from_slice(&texel);
            }
        }
    }

    fn uniform_words(value: &UniformValue<'_>) -> Vec<u32> {
        fn padded(words: impl Iterator<Item = u32>) -> Vec<u32> {
            let mut words: Vec<u32> = words.collect();
            let registers = words.len().div_ceil(4).max(1);
            words.resize(registers * 4, 0);
            words
        }
        match value {
            UniformValue::Float(v) => padded(v.iter().map(|f| f.to_bits())),
            UniformValue::Int(v) => padded(v.iter().map(|i| *i as u32)),
            UniformValue::Uint(v) => padded(v.iter().copied()),
            UniformValue::Matrix(m) => (0..m.columns as usize)
                .flat_map(|c| m.column(c))
                .map(f32::to_bits)
                .collect(),
            UniformValue::Vec4Array(v) => bytemuck::cast_slice(v).to_vec(),
            UniformValue::IVec4Array(v) => bytemuck::cast_slice(v).to_vec(),
            UniformValue::UVec4Array(v) => bytemuck::cast_slice(v).to_vec(),
        }
    }

    // ===== PIPELINE STATE GROUPS =====

    fn apply_depth_stencil(&mut self, state: &PipelineState) {
        let ds = &state.depth_stencil;
        let func = gx2::compare_func(ds.stencil_func);
        let zpass = gx2::stencil_function(ds.stencil_op_zpass);
        let zfail = gx2::stencil_function(ds.stencil_op_zfail);
        let fail = gx2::stencil_function(ds.stencil_op_fail);
        self.gx2.set_depth_stencil_control(DepthStencilControl {
            depth_test: ds.depth_test_enable,
            depth_write: ds.depth_write_enable,
            depth_func: gx2::compare_func(ds.depth_func),
            stencil_test: ds.stencil_test_enable,
            back_stencil_test: ds.stencil_test_enable,
            front_func: func,
            front_zpass: zpass,
            front_zfail: zfail,
            front_fail: fail,
            back_func: func,
            back_zpass: zpass,
            back_zfail: zfail,
            back_fail: fail,
        });
        self.gx2.set_stencil_mask(StencilMask {
            front_mask: ds.stencil_mask,
            front_write_mask: ds.stencil_mask,
            front_ref: ds.stencil_ref,
            back_mask: ds.stencil_mask,
            back_write_mask: ds.stencil_mask,
            back_ref: ds.stencil_ref,
        });
    }

    fn apply_culling(&mut self, state: &PipelineState) {
        let raster = &state.raster;
        let (cull_front, cull_back) = raster.culling_mode.face_enables();
        let mode = gx2::polygon_mode(raster.polygon_mode);
        self.gx2.set_polygon_control(PolygonControl {
            front_face: gx2::FRONT_FACE_CCW,
            cull_front,
            cull_back,
            polygon_mode_enable: raster.polygon_mode != PolygonMode::Fill,
            front_mode: mode,
            back_mode: mode,
            offset_front: raster.polygon_offset_enable,
            offset_back: raster.polygon_offset_enable,
            offset_point_line: raster.polygon_offset_point_line_enable,
        });
    }

    fn apply_blend(&mut self, state: &PipelineState) {
        self.gx2.set_color_control(ColorControl {
            logic_op: gx2::LOGIC_OP_COPY,
            blend_enable_mask: state.blend.enable_mask(),
            multi_write: false,
            color_write: state.blend.any_color_write(),
        });
        let targets = match state.blend {
            BlendTargets::Single { .. } => 1,
            BlendTargets::Multiple { .. } => RENDER_TARGET_MAX_NUM,
        };
        for target in 0..targets {
            let expression = state.blend.expression(target);
            self.gx2.set_blend_control(
                target as u32,
                BlendControl {
                    color_src: gx2::blend_mode(expression.src_rgb),
                    color_dst: gx2::blend_mode(expression.dst_rgb),
                    color_combine: gx2::blend_combine_mode(expression.equation_rgb),
                    separate_alpha: true,
                    alpha_src: gx2::blend_mode(expression.src_alpha),
                    alpha_dst: gx2::blend_mode(expression.dst_alpha),
                    alpha_combine: gx2::blend_combine_mode(expression.equation_alpha),
                },
            );
        }
    }

    fn apply_color_mask(&mut self, state: &PipelineState) {
        let mut masks = [0u8; RENDER_TARGET_MAX_NUM];
        match state.blend {
            BlendTargets::Single { .. } => masks[0] = state.blend.channel_mask(0),
            BlendTargets::Multiple { .. } => {
                for (target, mask) in masks.iter_mut().enumerate() {
                    *mask = state.blend.channel_mask(target);
                }
            }
        }
        self.gx2.set_target_channel_masks(masks);
    }
}

impl Default for CafeGraphicsDevice {
    fn default() -> Self {
        Self::new(CafeConfig::default())
    }
}

impl GraphicsDevice for CafeGraphicsDevice {
    fn backend(&self) -> Backend {
        Backend::Cafe
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn swaps_uniform_words(&self) -> bool {
        true
    }

    // ===== TEXTURES =====

    fn create_texture(
        &mut self,
        surface: &Surface,
        comp_map: u32,
        source: TextureSource<'_>,
    ) -> RioResult<TextureHandle> {
        let has_mips = surface.mip_levels > 1 && surface.mipmap_size > 0;
        let texture = match source {
            TextureSource::Data(data) => {
                let image = self.heap.alloc(surface.image_size, gx2::TEXTURE_ALIGNMENT)?;
                let image_len = data.image().len().min(surface.image_size as usize);
                self.heap.write(image, 0, &data.image()[..image_len])?;
                self.gx2.invalidate(Gx2Invalidate::CPU_TEXTURE, image, surface.image_size);

                let mipmaps = if has_mips {
                    let mips = self.heap.alloc(surface.mipmap_size, gx2::TEXTURE_ALIGNMENT)?;
                    if let Some(bytes) = data.mipmaps() {
                        let len = bytes.len().min(surface.mipmap_size as usize);
                        self.heap.write(mips, 0, &bytes[..len])?;
                    }
                    self.gx2.invalidate(Gx2Invalidate::CPU_TEXTURE, mips, surface.mipmap_size);
                    Some(mips)
                } else {
                    None
                };
                CafeTexture { surface: *surface, comp_map, image, mipmaps, external: None }
            }
            TextureSource::Empty => {
                let image = self.heap.alloc(surface.image_size, gx2::TEXTURE_ALIGNMENT)?;
                self.gx2.invalidate(Gx2Invalidate::TEXTURE, image, surface.image_size);
                let mipmaps = if has_mips {
                    let mips = self.heap.alloc(surface.mipmap_size, gx2::TEXTURE_ALIGNMENT)?;
                    self.gx2.invalidate(Gx2Invalidate::TEXTURE, mips, surface.mipmap_size);
                    Some(mips)
                } else {
                    None
                };
                CafeTexture { surface: *surface, comp_map, image, mipmaps, external: None }
            }
            TextureSource::External(data) => {
                let image = self.heap.foreign_address(data.image().len());
                let mipmaps = data.mipmaps().map(|m| self.heap.foreign_address(m.len()));
                CafeTexture {
                    surface: *surface,
                    comp_map,
                    image,
                    mipmaps,
                    external: Some(data.clone()),
                }
            }
        };
        self.gx2.init_texture_regs(texture.image, comp_map);
        engine_debug!(
            SOURCE,
            "Created texture {}x{} {:?} ({} mips) at {:#010x}",
            surface.width,
            surface.height,
            surface.format,
            surface.mip_levels,
            texture.image
        );
        Ok(self.textures.insert(texture))
    }

    fn set_texture_comp_map(&mut self, texture: TextureHandle, comp_map: u32) -> RioResult<()> {
        let entry = self.textures.get_mut(texture).ok_or_else(|| stale("texture"))?;
        entry.comp_map = comp_map;
        let image = entry.image;
        self.gx2.init_texture_regs(image, comp_map);
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> RioResult<()> {
        let entry = self.textures.remove(texture).ok_or_else(|| stale("texture"))?;
        if entry.external.is_none() {
            self.heap.free(entry.image)?;
            if let Some(mips) = entry.mipmaps {
                self.heap.free(mips)?;
            }
        }
        Ok(())
    }

    // ===== SAMPLERS =====

    fn create_sampler(&mut self) -> RioResult<SamplerHandle> {
        Ok(self.samplers.insert(SamplerRegs::init(TexWrapMode::Clamp, TexXYFilterMode::Linear)))
    }

    fn update_sampler(
        &mut self,
        sampler: SamplerHandle,
        state: &SamplerState,
        dirty: SamplerDirty,
    ) -> RioResult<()> {
        let regs = self.samplers.get_mut(sampler).ok_or_else(|| stale("sampler"))?;
        if dirty.contains(SamplerDirty::FILTER) {
            regs.set_xy_filter(state.mag_filter, state.min_filter, state.max_aniso);
            regs.set_zm_filter(state.mip_filter);
        }
        if dirty.contains(SamplerDirty::WRAP) {
            regs.set_clamping(state.wrap_x, state.wrap_y, state.wrap_z);
        }
        if dirty.contains(SamplerDirty::BORDER_COLOR) {
            regs.set_border_type(gx2::tex_border_type(state.border_color));
        }
        if dirty.contains(SamplerDirty::LOD) {
            regs.set_lod(state.min_lod, state.max_lod, state.lod_bias);
        }
        if dirty.contains(SamplerDirty::DEPTH_COMPARE) {
            // The compare function is encoded whether or not comparison is enabled
            regs.set_depth_compare(state.depth_compare_func);
        }
        Ok(())
    }

    fn bind_sampler(
        &mut self,
        sampler: SamplerHandle,
        state: &SamplerState,
        texture: TextureHandle,
        binding: SamplerBinding,
    ) -> RioResult<()> {
        let regs = *self.samplers.get(sampler).ok_or_else(|| stale("sampler"))?;
        let image = self.textures.get(texture).ok_or_else(|| stale("texture"))?.image;
        for (stage, unit) in stages(binding.vertex, binding.fragment) {
            if regs.has_border {
                self.gx2.set_sampler_border_color(stage, unit, state.border_color.to_array())?;
            }
            self.gx2.set_texture(stage, unit, image)?;
            self.gx2.set_sampler(stage, unit, regs.words)?;
        }
        Ok(())
    }

    fn destroy_sampler(&mut self, sampler: SamplerHandle) -> RioResult<()> {
        self.samplers.remove(sampler).ok_or_else(|| stale("sampler"))?;
        Ok(())
    }

    // ===== VERTEX INPUT =====

    fn create_vertex_buffer(&mut self, slot: u32) -> RioResult<VertexBufferHandle> {
        engine_trace!(SOURCE, "Vertex buffer for slot {}", slot);
        Ok(self.vertex_buffers.insert(CafeBuffer::default()))
    }

    fn upload_vertex_buffer(
        &mut self,
        buffer: VertexBufferHandle,
        data: &[u8],
        stride: u32,
        mode: BufferUpload,
        invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.vertex_buffers.get_mut(buffer).ok_or_else(|| stale("vertex buffer"))?;
        entry.stride = stride;
        let addr = Self::upload_buffer(&mut self.heap, entry, data, mode, gx2::VERTEX_BUFFER_ALIGNMENT)?;
        if invalidate {
            self.gx2.invalidate(Gx2Invalidate::CPU_ATTRIBUTE_BUFFER, addr, data.len() as u32);
        }
        Ok(())
    }

    fn update_vertex_buffer(
        &mut self,
        buffer: VertexBufferHandle,
        offset: u32,
        data: &[u8],
        invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.vertex_buffers.get(buffer).ok_or_else(|| stale("vertex buffer"))?;
        let addr = Self::update_buffer(&mut self.heap, entry, "vertex buffer", offset, data)?;
        if invalidate {
            self.gx2.invalidate(Gx2Invalidate::CPU_ATTRIBUTE_BUFFER, addr + offset, data.len() as u32);
        }
        Ok(())
    }

    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferHandle) -> RioResult<()> {
        let entry = self.vertex_buffers.remove(buffer).ok_or_else(|| stale("vertex buffer"))?;
        if let Some(addr) = entry.addr {
            self.heap.free(addr)?;
        }
        Ok(())
    }

    fn create_vertex_layout(&mut self) -> RioResult<VertexLayoutHandle> {
        Ok(self.vertex_layouts.insert(CafeVertexLayout::default()))
    }

    fn build_vertex_layout(
        &mut self,
        layout: VertexLayoutHandle,
        attributes: &[VertexAttributeDesc],
        _buffers: &[VertexBufferBinding],
    ) -> RioResult<()> {
        let entry = self.vertex_layouts.get_mut(layout).ok_or_else(|| stale("vertex layout"))?;
        let fetch = build_fetch_shader(attributes)?;
        if let Some(previous) = entry.addr.take() {
            self.heap.free(previous)?;
        }
        let addr = self.heap.alloc_with(&fetch.program, gx2::SHADER_ALIGNMENT)?;
        self.gx2.invalidate(Gx2Invalidate::CPU_SHADER, addr, fetch.size());
        engine_trace!(
            SOURCE,
            "Fetch shader for {} attributes at {:#010x}",
            fetch.attrib_count,
            addr
        );
        entry.addr = Some(addr);
        entry.fetch = Some(fetch);
        Ok(())
    }

    fn bind_vertex_layout(
        &mut self,
        layout: VertexLayoutHandle,
        buffers: &[VertexBufferBinding],
    ) -> RioResult<()> {
        let entry = self.vertex_layouts.get(layout).ok_or_else(|| stale("vertex layout"))?;
        let (Some(fetch), Some(program)) = (entry.fetch.as_ref(), entry.addr) else {
            return Err(contract("vertex layout was never built".to_string()));
        };
        let (size, attrib_count) = (fetch.size(), fetch.attrib_count);

        for binding in buffers {
            let buffer = self.vertex_buffers.get(binding.buffer).ok_or_else(|| stale("vertex buffer"))?;
            let addr = buffer
                .addr
                .ok_or_else(|| contract(format!("vertex buffer in slot {} has no data", binding.slot)))?;
            let attrib = AttribBuffer { size: buffer.size, stride: buffer.stride, addr };
            self.gx2.set_attrib_buffer(binding.slot, attrib)?;
        }
        self.gx2.set_fetch_shader(program, size, attrib_count);
        Ok(())
    }

    fn destroy_vertex_layout(&mut self, layout: VertexLayoutHandle) -> RioResult<()> {
        let entry = self.vertex_layouts.remove(layout).ok_or_else(|| stale("vertex layout"))?;
        if let Some(addr) = entry.addr {
            self.heap.free(addr)?;
        }
        Ok(())
    }

    // ===== UNIFORM BLOCKS =====

    fn create_uniform_block(&mut self) -> RioResult<UniformBlockHandle> {
        Ok(self.uniform_blocks.insert(CafeBuffer::default()))
    }

    fn upload_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        data: &[u8],
        mode: BufferUpload,
        invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.uniform_blocks.get_mut(block).ok_or_else(|| stale("uniform block"))?;
        let addr = Self::upload_buffer(&mut self.heap, entry, data, mode, gx2::UNIFORM_BLOCK_ALIGNMENT)?;
        if invalidate {
            self.gx2.invalidate(Gx2Invalidate::CPU_UNIFORM_BLOCK, addr, data.len() as u32);
        }
        Ok(())
    }

    fn update_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        offset: u32,
        data: &[u8],
        invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.uniform_blocks.get(block).ok_or_else(|| stale("uniform block"))?;
        let addr = Self::update_buffer(&mut self.heap, entry, "uniform block", offset, data)?;
        if invalidate {
            self.gx2.invalidate(Gx2Invalidate::CPU_UNIFORM_BLOCK, addr + offset, data.len() as u32);
        }
        Ok(())
    }

    fn bind_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        stage: ShaderStage,
        vs_index: Option<u32>,
        fs_index: Option<u32>,
    ) -> RioResult<()> {
        let entry = self.uniform_blocks.get(block).ok_or_else(|| stale("uniform block"))?;
        let size = entry.size;
        let addr = entry
            .addr
            .ok_or_else(|| contract("uniform block bound before any upload".to_string()))?;

        if stage.contains(ShaderStage::VERTEX) {
            let index = vs_index
                .ok_or_else(|| contract("vertex stage set without a vertex block index".to_string()))?;
            self.gx2.set_uniform_block(Gx2Stage::Vertex, index, size, addr)?;
        }
        if stage.contains(ShaderStage::FRAGMENT) {
            let index = fs_index
                .ok_or_else(|| contract("fragment stage set without a fragment block index".to_string()))?;
            self.gx2.set_uniform_block(Gx2Stage::Pixel, index, size, addr)?;
        }
        Ok(())
    }

    fn destroy_uniform_block(&mut self, block: UniformBlockHandle) -> RioResult<()> {
        let entry = self.uniform_blocks.remove(block).ok_or_else(|| stale("uniform block"))?;
        if let Some(addr) = entry.addr {
            self.heap.free(addr)?;
        }
        Ok(())
    }

    // ===== SHADERS =====

    fn compile_shader(&mut self, source: ShaderSource<'_>) -> RioResult<CompiledShader> {
        let bytes = match source {
            ShaderSource::Binary(bytes) => bytes,
            ShaderSource::Glsl { .. } => {
                let message = "GLSL sources cannot be compiled for Cafe".to_string();
                engine_error!(SOURCE, "{}", message);
                return Err(RioError::InvalidAsset(message));
            }
        };
        let binary = gfd::parse(bytes).inspect_err(|err| {
            engine_error!(SOURCE, "Shader binary rejected: {}", err);
        })?;

        let vertex_program = self.heap.alloc_with(&binary.vertex.program, gx2::SHADER_ALIGNMENT)?;
        self.gx2.invalidate(Gx2Invalidate::CPU_SHADER, vertex_program, binary.vertex.program.len() as u32);
        let pixel_program = match self.heap.alloc_with(&binary.pixel.program, gx2::SHADER_ALIGNMENT) {
            Ok(addr) => addr,
            Err(err) => {
                self.heap.free(vertex_program)?;
                return Err(err);
            }
        };
        self.gx2.invalidate(Gx2Invalidate::CPU_SHADER, pixel_program, binary.pixel.program.len() as u32);

        let modes = (binary.vertex.mode, binary.pixel.mode);
        engine_debug!(
            SOURCE,
            "Loaded shader: vertex {} bytes at {:#010x}, pixel {} bytes at {:#010x}",
            binary.vertex.program.len(),
            vertex_program,
            binary.pixel.program.len(),
            pixel_program
        );
        let handle = self.shaders.insert(CafeShader { binary, vertex_program, pixel_program });
        Ok(CompiledShader { handle, modes: Some(modes) })
    }

    fn shader_location(&self, shader: ShaderHandle, variable: ShaderVariable, name: &str) -> Option<u32> {
        let binary = &self.shaders.get(shader)?.binary;
        let (vs, ps) = (&binary.vertex, &binary.pixel);
        match variable {
            ShaderVariable::VertexAttrib => vs.attrib_vars.iter().find(|v| v.name == name).map(|v| v.location),
            ShaderVariable::VertexSampler => vs.sampler_vars.iter().find(|v| v.name == name).map(|v| v.location),
            ShaderVariable::FragmentSampler => ps.sampler_vars.iter().find(|v| v.name == name).map(|v| v.location),
            ShaderVariable::VertexUniform => vs.uniform_vars.iter().find(|v| v.name == name).map(|v| v.offset),
            ShaderVariable::FragmentUniform => ps.uniform_vars.iter().find(|v| v.name == name).map(|v| v.offset),
            ShaderVariable::VertexUniformBlock => vs.uniform_blocks.iter().find(|b| b.name == name).map(|b| b.offset),
            ShaderVariable::FragmentUniformBlock => ps.uniform_blocks.iter().find(|b| b.name == name).map(|b| b.offset),
        }
    }

    fn set_shader_mode(&mut self, mode: ShaderMode) -> RioResult<()> {
        engine_ensure!(mode.is_activatable(), SOURCE, "shader mode {:?} cannot be activated", mode);
        engine_trace!(SOURCE, "Shader mode -> {:?}", mode);
        self.gx2.set_shader_mode_ex(mode.raw());
        Ok(())
    }

    fn bind_shader(&mut self, shader: ShaderHandle) -> RioResult<()> {
        let entry = self.shaders.get(shader).ok_or_else(|| stale("shader"))?;
        let (vertex, pixel) = (entry.vertex_program, entry.pixel_program);
        self.gx2.set_shader(Gx2Stage::Vertex, vertex);
        self.gx2.set_shader(Gx2Stage::Pixel, pixel);
        Ok(())
    }

    fn set_uniform(
        &mut self,
        vs_location: Option<u32>,
        fs_location: Option<u32>,
        value: &UniformValue<'_>,
    ) -> RioResult<()> {
        let words = Self::uniform_words(value);
        for (stage, offset) in stages(vs_location, fs_location) {
            self.gx2.set_uniform_reg(stage, offset, &words)?;
        }
        Ok(())
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) -> RioResult<()> {
        let entry = self.shaders.remove(shader).ok_or_else(|| stale("shader"))?;
        self.heap.free(entry.vertex_program)?;
        self.heap.free(entry.pixel_program)?;
        Ok(())
    }

    // ===== PIPELINE STATE =====

    fn apply_pipeline_state(&mut self, state: &PipelineState, groups: RenderStateGroups) -> RioResult<()> {
        if groups.contains(RenderStateGroups::DEPTH_STENCIL) {
            self.apply_depth_stencil(state);
        }
        if groups.contains(RenderStateGroups::CULLING) {
            self.apply_culling(state);
        }
        if groups.contains(RenderStateGroups::BLEND) {
            self.apply_blend(state);
        }
        if groups.contains(RenderStateGroups::BLEND_CONSTANT) {
            self.gx2.set_blend_constant_color(state.blend_constant_color.to_array());
        }
        if groups.contains(RenderStateGroups::ALPHA_TEST) {
            self.gx2.set_alpha_test(false, gx2::compare_func(CompareFunc::Always), 0.0);
        }
        if groups.contains(RenderStateGroups::COLOR_MASK) {
            self.apply_color_mask(state);
        }
        if groups.contains(RenderStateGroups::ALPHA_TEST) {
            self.gx2.set_alpha_to_mask(false);
        }
        Ok(())
    }

    // ===== RENDER TARGETS =====

    fn create_color_target(&mut self) -> RioResult<ColorTargetHandle> {
        Ok(self.color_targets.insert(CafeRenderTarget::default()))
    }

    fn link_color_target(
        &mut self,
        target: ColorTargetHandle,
        texture: TextureHandle,
        surface: &Surface,
    ) -> RioResult<()> {
        let link = self.link_target(texture, surface)?;
        let entry = self.color_targets.get_mut(target).ok_or_else(|| stale("color target"))?;
        entry.link = Some(link);
        entry.view_mip = None;
        Ok(())
    }

    fn init_color_target(&mut self, target: ColorTargetHandle, mip_level: u32) -> RioResult<()> {
        let entry = self.color_targets.get_mut(target).ok_or_else(|| stale("color target"))?;
        let link = entry.link.ok_or_else(|| contract("color target has no texture".to_string()))?;
        entry.view_mip = Some(mip_level);
        self.gx2.init_color_buffer_regs(link.image, mip_level);
        Ok(())
    }

    fn bind_color_target(&mut self, target: ColorTargetHandle, index: u32) -> RioResult<()> {
        let entry = self.color_targets.get(target).ok_or_else(|| stale("color target"))?;
        let link = entry.link.ok_or_else(|| contract("color target has no texture".to_string()))?;
        self.gx2.set_color_buffer(link.image, index)
    }

    fn invalidate_color_target(&mut self, target: ColorTargetHandle) -> RioResult<()> {
        let entry = self.color_targets.get(target).ok_or_else(|| stale("color target"))?;
        if let Some(link) = entry.link {
            self.gx2.invalidate(Gx2Invalidate::COLOR_BUFFER, link.image, link.surface.image_size);
            if let Some(mips) = link.mipmaps {
                self.gx2.invalidate(Gx2Invalidate::COLOR_BUFFER, mips, link.surface.mipmap_size);
            }
        }
        Ok(())
    }

    fn destroy_color_target(&mut self, target: ColorTargetHandle) -> RioResult<()> {
        self.color_targets.remove(target).ok_or_else(|| stale("color target"))?;
        Ok(())
    }

    fn create_depth_target(&mut self) -> RioResult<DepthTargetHandle> {
        Ok(self.depth_targets.insert(CafeRenderTarget::default()))
    }

    fn link_depth_target(
        &mut self,
        target: DepthTargetHandle,
        texture: TextureHandle,
        surface: &Surface,
    ) -> RioResult<()> {
        let link = self.link_target(texture, surface)?;
        let entry = self.depth_targets.get_mut(target).ok_or_else(|| stale("depth target"))?;
        entry.link = Some(link);
        entry.view_mip = None;
        Ok(())
    }

    fn init_depth_target(&mut self, target: DepthTargetHandle, mip_level: u32) -> RioResult<()> {
        let entry = self.depth_targets.get_mut(target).ok_or_else(|| stale("depth target"))?;
        let link = entry.link.ok_or_else(|| contract("depth target has no texture".to_string()))?;
        entry.view_mip = Some(mip_level);
        // Hi-Z stays disabled; clear values default to depth 1.0, stencil 0
        self.gx2.init_depth_buffer_regs(link.image, mip_level);
        Ok(())
    }

    fn bind_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()> {
        let entry = self.depth_targets.get(target).ok_or_else(|| stale("depth target"))?;
        let link = entry.link.ok_or_else(|| contract("depth target has no texture".to_string()))?;
        self.gx2.set_depth_buffer(link.image);
        Ok(())
    }

    fn invalidate_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()> {
        let entry = self.depth_targets.get(target).ok_or_else(|| stale("depth target"))?;
        if let Some(link) = entry.link {
            self.gx2.invalidate(Gx2Invalidate::DEPTH_BUFFER, link.image, link.surface.image_size);
            if let Some(mips) = link.mipmaps {
                self.gx2.invalidate(Gx2Invalidate::DEPTH_BUFFER, mips, link.surface.mipmap_size);
            }
        }
        Ok(())
    }

    fn destroy_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()> {
        self.depth_targets.remove(target).ok_or_else(|| stale("depth target"))?;
        Ok(())
    }

    // ===== FRAME BUFFERS =====

    fn create_render_buffer(&mut self) -> RioResult<RenderBufferHandle> {
        Ok(self.render_buffers.insert(CafeRenderBuffer::default()))
    }

    fn bind_render_buffer(&mut self, buffer: RenderBufferHandle) -> RioResult<()> {
        self.render_buffers.get(buffer).ok_or_else(|| stale("render buffer"))?;
        self.current_render_buffer = Some(buffer);
        Ok(())
    }

    fn set_draw_buffers(
        &mut self,
        buffer: RenderBufferHandle,
        attachments: [bool; RENDER_TARGET_MAX_NUM],
    ) -> RioResult<()> {
        let entry = self.render_buffers.get_mut(buffer).ok_or_else(|| stale("render buffer"))?;
        entry.draw_buffers = attachments;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: &Viewport) -> RioResult<()> {
        self.gx2.set_viewport(
            viewport.x,
            viewport.y,
            viewport.width,
            viewport.height,
            viewport.near,
            viewport.far,
        );
        Ok(())
    }

    fn set_scissor(&mut self, scissor: &Scissor) -> RioResult<()> {
        self.gx2.set_scissor(
            scissor.x.max(0) as u32,
            scissor.y.max(0) as u32,
            scissor.width,
            scissor.height,
        );
        Ok(())
    }

    fn clear(&mut self, buffer: RenderBufferHandle, request: &ClearRequest) -> RioResult<()> {
        self.render_buffers.get(buffer).ok_or_else(|| stale("render buffer"))?;

        let color = match request.color {
            Some((target, _)) if request.flags.contains(ClearFlags::COLOR) => {
                let entry = self.color_targets.get(target).ok_or_else(|| stale("color target"))?;
                match entry.link {
                    Some(link) => Some((link, entry.view_mip.unwrap_or(0))),
                    None => return Err(contract("cleared color target has no texture".to_string())),
                }
            }
            _ => None,
        };

        let mut ds_flags = Gx2ClearFlags::empty();
        if request.flags.contains(ClearFlags::DEPTH) {
            ds_flags |= Gx2ClearFlags::DEPTH;
        }
        if request.flags.contains(ClearFlags::STENCIL) {
            ds_flags |= Gx2ClearFlags::STENCIL;
        }
        let depth = match request.depth {
            Some(target) if !ds_flags.is_empty() => {
                let entry = self.depth_targets.get(target).ok_or_else(|| stale("depth target"))?;
                match entry.link {
                    Some(link) => Some(link.image),
                    None => return Err(contract("cleared depth target has no texture".to_string())),
                }
            }
            _ => None,
        };

        let color_value = request.color_value.to_array();
        match (color, depth) {
            (Some((link, _)), Some(depth_image)) => self.gx2.clear_buffers_ex(
                link.image,
                depth_image,
                color_value,
                request.depth_value,
                request.stencil_value,
                ds_flags,
            ),
            (Some((link, _)), None) => self.gx2.clear_color(link.image, color_value),
            (None, Some(depth_image)) => self.gx2.clear_depth_stencil_ex(
                depth_image,
                request.depth_value,
                request.stencil_value,
                ds_flags,
            ),
            (None, None) => {}
        }
        if let Some((link, level)) = color {
            self.fill_color(&link, level, request.color_value);
        }
        Ok(())
    }

    fn read_color_target(
        &mut self,
        buffer: RenderBufferHandle,
        target: ColorTargetHandle,
        _index: u32,
        pixels: &mut [u8],
    ) -> RioResult<()> {
        self.render_buffers.get(buffer).ok_or_else(|| stale("render buffer"))?;
        let entry = self.color_targets.get(target).ok_or_else(|| stale("color target"))?;
        let level = entry.view_mip.unwrap_or(0);
        let link = entry.link.ok_or_else(|| contract("read from a color target without a texture".to_string()))?;
        self.gx2.draw_done();
        let bytes = self.level_bytes(&link, level).ok_or_else(|| {
            RioError::InvalidResource(format!("no memory behind color target image {:#010x}", link.image))
        })?;
        let len = bytes.len().min(pixels.len());
        pixels[..len].copy_from_slice(&bytes[..len]);
        Ok(())
    }

    fn destroy_render_buffer(&mut self, buffer: RenderBufferHandle) -> RioResult<()> {
        self.render_buffers.remove(buffer).ok_or_else(|| stale("render buffer"))?;
        if self.current_render_buffer == Some(buffer) {
            self.current_render_buffer = None;
        }
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
        self.gx2.draw_ex(gx2::primitive_mode(mode), count, first, instance_count);
        Ok(())
    }

    fn draw_elements(
        &mut self,
        mode: PrimitiveMode,
        indices: Indices<'_>,
        instance_count: u32,
    ) -> RioResult<()> {
        let bytes = indices.to_bytes(true);
        let upload = BufferUpload::for_sizes(self.index_scratch.size as usize, bytes.len());
        let addr = Self::upload_buffer(
            &mut self.heap,
            &mut self.index_scratch,
            &bytes,
            upload,
            gx2::INDEX_BUFFER_ALIGNMENT,
        )?;
        self.gx2.invalidate(Gx2Invalidate::CPU_ATTRIBUTE_BUFFER, addr, bytes.len() as u32);
        self.gx2.draw_indexed_ex(
            gx2::primitive_mode(mode),
            indices.len() as u32,
            gx2::index_type(indices.format()),
            addr,
            instance_count,
        )
    }
}

#[cfg(test)]
#[path = "cafe_graphics_device_tests.rs"]
mod tests;
