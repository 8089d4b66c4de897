//! Mock GraphicsDevice for unit tests (no GPU required)
//!
//! Every call is appended to `commands` as a short string, and the data a real backend would
//! keep (uniform block bytes, vertex layouts, the last pipeline state) is stored for inspection.

use std::any::Any;
use slotmap::SlotMap;
use rustc_hash::FxHashMap;
use crate::config::GraphicsConfig;
use crate::context::GraphicsContext;
use crate::error::{RioError, RioResult};
use crate::file_device::MemoryFileDevice;
use crate::graphics_device::{
    BufferUpload, ClearRequest, ColorTargetHandle, CompiledShader, DepthTargetHandle,
    GraphicsDevice, Indices, PipelineState, PrimitiveMode, RenderBufferHandle, RenderStateGroups, SamplerBinding,
    SamplerHandle, ShaderHandle, ShaderSource, ShaderVariable, TextureHandle, TextureSource,
    UniformBlockHandle, VertexAttributeDesc, VertexBufferBinding, VertexBufferHandle,
    VertexLayoutHandle,
};
use crate::gpu::{
    Backend, SamplerDirty, SamplerState, Scissor, ShaderMode, ShaderStage, Surface,
    UniformValue, Viewport, RENDER_TARGET_MAX_NUM,
};

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockTexture {
    pub surface: Surface,
    pub comp_map: u32,
    pub self_allocated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockBuffer {
    pub data: Vec<u8>,
    pub stride: u32,
    pub reallocations: u32,
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

#[derive(Debug)]
pub struct MockGraphicsDevice {
    pub commands: Vec<String>,
    pub backend: Backend,
    pub swap_uniform_words: bool,
    /// Raw (vertex, pixel) modes returned by `compile_shader`
    pub shader_modes: Option<(u32, u32)>,
    /// Lookup table for `shader_location`
    pub locations: FxHashMap<(ShaderVariable, String), u32>,
    pub last_pipeline_state: Option<PipelineState>,
    /// Indices of the last `draw_elements`, widened to u32
    pub last_indices: Option<Vec<u32>>,
    pub textures: SlotMap<TextureHandle, MockTexture>,
    pub samplers: SlotMap<SamplerHandle, ()>,
    pub vertex_buffers: SlotMap<VertexBufferHandle, MockBuffer>,
    pub vertex_layouts: SlotMap<VertexLayoutHandle, Vec<VertexAttributeDesc>>,
    pub uniform_blocks: SlotMap<UniformBlockHandle, MockBuffer>,
    pub shaders: SlotMap<ShaderHandle, ()>,
    pub color_targets: SlotMap<ColorTargetHandle, Option<Surface>>,
    pub depth_targets: SlotMap<DepthTargetHandle, Option<Surface>>,
    pub render_buffers: SlotMap<RenderBufferHandle, ()>,
}

impl MockGraphicsDevice {
    pub fn new(backend: Backend) -> Self {
        Self {
            commands: Vec::new(),
            backend,
            swap_uniform_words: backend == Backend::Cafe,
            shader_modes: match backend {
                Backend::Cafe => Some((1, 1)),
                Backend::Gl => None,
            },
            locations: FxHashMap::default(),
            last_pipeline_state: None,
            last_indices: None,
            textures: SlotMap::with_key(),
            samplers: SlotMap::with_key(),
            vertex_buffers: SlotMap::with_key(),
            vertex_layouts: SlotMap::with_key(),
            uniform_blocks: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            color_targets: SlotMap::with_key(),
            depth_targets: SlotMap::with_key(),
            render_buffers: SlotMap::with_key(),
        }
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    fn record(&mut self, command: String) {
        self.commands.push(command);
    }
}

fn stale(kind: &str) -> RioError {
    RioError::InvalidResource(format!("unknown {} handle", kind))
}

// ============================================================================
// Test helpers
// ============================================================================

/// Context over a fresh mock device and an empty in-memory file device
pub fn mock_context(backend: Backend) -> GraphicsContext {
    mock_context_with_files(backend, MemoryFileDevice::new())
}

pub fn mock_context_with_files(backend: Backend, files: MemoryFileDevice) -> GraphicsContext {
    GraphicsContext::with_file_device(
        Box::new(MockGraphicsDevice::new(backend)),
        GraphicsConfig::default(),
        Box::new(files),
    )
}

/// The mock behind a context created by `mock_context`
pub fn mock(ctx: &GraphicsContext) -> &MockGraphicsDevice {
    ctx.device_as::<MockGraphicsDevice>()
        .expect("context does not hold a MockGraphicsDevice")
}

pub fn mock_mut(ctx: &mut GraphicsContext) -> &mut MockGraphicsDevice {
    ctx.device_as_mut::<MockGraphicsDevice>()
        .expect("context does not hold a MockGraphicsDevice")
}

impl GraphicsDevice for MockGraphicsDevice {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn swaps_uniform_words(&self) -> bool {
        self.swap_uniform_words
    }

    // ===== TEXTURES =====

    fn create_texture(
        &mut self,
        surface: &Surface,
        comp_map: u32,
        source: TextureSource<'_>,
    ) -> RioResult<TextureHandle> {
        let kind = match source {
            TextureSource::Data(_) => "data",
            TextureSource::Empty => "empty",
            TextureSource::External(_) => "external",
        };
        self.record(format!(
            "create_texture {}x{} {:?} mips={} source={}",
            surface.width, surface.height, surface.format, surface.mip_levels, kind
        ));
        Ok(self.textures.insert(MockTexture {
            surface: *surface,
            comp_map,
            self_allocated: source.is_self_allocated(),
        }))
    }

    fn set_texture_comp_map(&mut self, texture: TextureHandle, comp_map: u32) -> RioResult<()> {
        let entry = self.textures.get_mut(texture).ok_or_else(|| stale("texture"))?;
        entry.comp_map = comp_map;
        self.record(format!("set_texture_comp_map {:#010x}", comp_map));
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> RioResult<()> {
        let entry = self.textures.remove(texture).ok_or_else(|| stale("texture"))?;
        self.record(format!("destroy_texture self_allocated={}", entry.self_allocated));
        Ok(())
    }

    // ===== SAMPLERS =====

    fn create_sampler(&mut self) -> RioResult<SamplerHandle> {
        self.record("create_sampler".to_string());
        Ok(self.samplers.insert(()))
    }

    fn update_sampler(
        &mut self,
        sampler: SamplerHandle,
        _state: &SamplerState,
        dirty: SamplerDirty,
    ) -> RioResult<()> {
        self.samplers.get(sampler).ok_or_else(|| stale("sampler"))?;
        self.record(format!("update_sampler dirty={:#04x}", dirty.bits()));
        Ok(())
    }

    fn bind_sampler(
        &mut self,
        sampler: SamplerHandle,
        _state: &SamplerState,
        texture: TextureHandle,
        binding: SamplerBinding,
    ) -> RioResult<()> {
        self.samplers.get(sampler).ok_or_else(|| stale("sampler"))?;
        self.textures.get(texture).ok_or_else(|| stale("texture"))?;
        self.record(format!(
            "bind_sampler vs={:?} fs={:?} slot={}",
            binding.vertex, binding.fragment, binding.slot
        ));
        Ok(())
    }

    fn destroy_sampler(&mut self, sampler: SamplerHandle) -> RioResult<()> {
        self.samplers.remove(sampler).ok_or_else(|| stale("sampler"))?;
        self.record("destroy_sampler".to_string());
        Ok(())
    }

    // ===== VERTEX INPUT =====

    fn create_vertex_buffer(&mut self, slot: u32) -> RioResult<VertexBufferHandle> {
        self.record(format!("create_vertex_buffer slot={}", slot));
        Ok(self.vertex_buffers.insert(MockBuffer::default()))
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
        entry.data = data.to_vec();
        entry.stride = stride;
        if mode == BufferUpload::Reallocate {
            entry.reallocations += 1;
        }
        self.record(format!(
            "upload_vertex_buffer size={} stride={} mode={:?} invalidate={}",
            data.len(), stride, mode, invalidate
        ));
        Ok(())
    }

    fn update_vertex_buffer(
        &mut self,
        buffer: VertexBufferHandle,
        offset: u32,
        data: &[u8],
        invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.vertex_buffers.get_mut(buffer).ok_or_else(|| stale("vertex buffer"))?;
        let start = offset as usize;
        entry.data[start..start + data.len()].copy_from_slice(data);
        self.record(format!(
            "update_vertex_buffer offset={} size={} invalidate={}",
            offset, data.len(), invalidate
        ));
        Ok(())
    }

    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferHandle) -> RioResult<()> {
        self.vertex_buffers.remove(buffer).ok_or_else(|| stale("vertex buffer"))?;
        self.record("destroy_vertex_buffer".to_string());
        Ok(())
    }

    fn create_vertex_layout(&mut self) -> RioResult<VertexLayoutHandle> {
        self.record("create_vertex_layout".to_string());
        Ok(self.vertex_layouts.insert(Vec::new()))
    }

    fn build_vertex_layout(
        &mut self,
        layout: VertexLayoutHandle,
        attributes: &[VertexAttributeDesc],
        buffers: &[VertexBufferBinding],
    ) -> RioResult<()> {
        let entry = self.vertex_layouts.get_mut(layout).ok_or_else(|| stale("vertex layout"))?;
        *entry = attributes.to_vec();
        let slots: Vec<u32> = buffers.iter().map(|b| b.slot).collect();
        self.record(format!(
            "build_vertex_layout attributes={} slots={:?}",
            attributes.len(), slots
        ));
        Ok(())
    }

    fn bind_vertex_layout(
        &mut self,
        layout: VertexLayoutHandle,
        buffers: &[VertexBufferBinding],
    ) -> RioResult<()> {
        self.vertex_layouts.get(layout).ok_or_else(|| stale("vertex layout"))?;
        let slots: Vec<u32> = buffers.iter().map(|b| b.slot).collect();
        self.record(format!("bind_vertex_layout slots={:?}", slots));
        Ok(())
    }

    fn destroy_vertex_layout(&mut self, layout: VertexLayoutHandle) -> RioResult<()> {
        self.vertex_layouts.remove(layout).ok_or_else(|| stale("vertex layout"))?;
        self.record("destroy_vertex_layout".to_string());
        Ok(())
    }

    // ===== UNIFORM BLOCKS =====

    fn create_uniform_block(&mut self) -> RioResult<UniformBlockHandle> {
        self.record("create_uniform_block".to_string());
        Ok(self.uniform_blocks.insert(MockBuffer::default()))
    }

    fn upload_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        data: &[u8],
        mode: BufferUpload,
        invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.uniform_blocks.get_mut(block).ok_or_else(|| stale("uniform block"))?;
        entry.data = data.to_vec();
        if mode == BufferUpload::Reallocate {
            entry.reallocations += 1;
        }
        self.record(format!(
            "upload_uniform_block size={} mode={:?} invalidate={}",
            data.len(), mode, invalidate
        ));
        Ok(())
    }

    fn update_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        offset: u32,
        data: &[u8],
        invalidate: bool,
    ) -> RioResult<()> {
        let entry = self.uniform_blocks.get_mut(block).ok_or_else(|| stale("uniform block"))?;
        let start = offset as usize;
        entry.data[start..start + data.len()].copy_from_slice(data);
        self.record(format!(
            "update_uniform_block offset={} size={} invalidate={}",
            offset, data.len(), invalidate
        ));
        Ok(())
    }

    fn bind_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        stage: ShaderStage,
        vs_index: Option<u32>,
        fs_index: Option<u32>,
    ) -> RioResult<()> {
        self.uniform_blocks.get(block).ok_or_else(|| stale("uniform block"))?;
        self.record(format!(
            "bind_uniform_block stage={} vs={:?} fs={:?}",
            stage.bits(), vs_index, fs_index
        ));
        Ok(())
    }

    fn destroy_uniform_block(&mut self, block: UniformBlockHandle) -> RioResult<()> {
        self.uniform_blocks.remove(block).ok_or_else(|| stale("uniform block"))?;
        self.record("destroy_uniform_block".to_string());
        Ok(())
    }

    // ===== SHADERS =====

    fn compile_shader(&mut self, source: ShaderSource<'_>) -> RioResult<CompiledShader> {
        match source {
            ShaderSource::Binary(bytes) => {
                self.record(format!("compile_shader binary size={}", bytes.len()))
            }
            ShaderSource::Glsl { vertex, fragment } => self.record(format!(
                "compile_shader glsl vertex={} fragment={}",
                vertex.len(), fragment.len()
            )),
        }
        Ok(CompiledShader {
            handle: self.shaders.insert(()),
            modes: self.shader_modes,
        })
    }

    fn shader_location(
        &self,
        shader: ShaderHandle,
        variable: ShaderVariable,
        name: &str,
    ) -> Option<u32> {
        self.shaders.get(shader)?;
        self.locations.get(&(variable, name.to_string())).copied()
    }

    fn set_shader_mode(&mut self, mode: ShaderMode) -> RioResult<()> {
        self.record(format!("set_shader_mode {:?}", mode));
        Ok(())
    }

    fn bind_shader(&mut self, shader: ShaderHandle) -> RioResult<()> {
        self.shaders.get(shader).ok_or_else(|| stale("shader"))?;
        self.record("bind_shader".to_string());
        Ok(())
    }

    fn set_uniform(
        &mut self,
        vs_location: Option<u32>,
        fs_location: Option<u32>,
        value: &UniformValue<'_>,
    ) -> RioResult<()> {
        self.record(format!(
            "set_uniform vs={:?} fs={:?} words={}",
            vs_location, fs_location, value.word_count()
        ));
        Ok(())
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) -> RioResult<()> {
        self.shaders.remove(shader).ok_or_else(|| stale("shader"))?;
        self.record("destroy_shader".to_string());
        Ok(())
    }

    // ===== PIPELINE STATE =====

    fn apply_pipeline_state(
        &mut self,
        state: &PipelineState,
        groups: RenderStateGroups,
    ) -> RioResult<()> {
        self.last_pipeline_state = Some(*state);
        self.record(format!("apply_pipeline_state groups={:#04x}", groups.bits()));
        Ok(())
    }

    // ===== RENDER TARGETS =====

    fn create_color_target(&mut self) -> RioResult<ColorTargetHandle> {
        self.record("create_color_target".to_string());
        Ok(self.color_targets.insert(None))
    }

    fn link_color_target(
        &mut self,
        target: ColorTargetHandle,
        _texture: TextureHandle,
        surface: &Surface,
    ) -> RioResult<()> {
        let entry = self.color_targets.get_mut(target).ok_or_else(|| stale("color target"))?;
        *entry = Some(*surface);
        self.record(format!("link_color_target {}x{}", surface.width, surface.height));
        Ok(())
    }

    fn init_color_target(&mut self, target: ColorTargetHandle, mip_level: u32) -> RioResult<()> {
        self.color_targets.get(target).ok_or_else(|| stale("color target"))?;
        self.record(format!("init_color_target mip={}", mip_level));
        Ok(())
    }

    fn bind_color_target(&mut self, target: ColorTargetHandle, index: u32) -> RioResult<()> {
        self.color_targets.get(target).ok_or_else(|| stale("color target"))?;
        self.record(format!("bind_color_target index={}", index));
        Ok(())
    }

    fn invalidate_color_target(&mut self, target: ColorTargetHandle) -> RioResult<()> {
        self.color_targets.get(target).ok_or_else(|| stale("color target"))?;
        self.record("invalidate_color_target".to_string());
        Ok(())
    }

    fn destroy_color_target(&mut self, target: ColorTargetHandle) -> RioResult<()> {
        self.color_targets.remove(target).ok_or_else(|| stale("color target"))?;
        self.record("destroy_color_target".to_string());
        Ok(())
    }

    fn create_depth_target(&mut self) -> RioResult<DepthTargetHandle> {
        self.record("create_depth_target".to_string());
        Ok(self.depth_targets.insert(None))
    }

    fn link_depth_target(
        &mut self,
        target: DepthTargetHandle,
        _texture: TextureHandle,
        surface: &Surface,
    ) -> RioResult<()> {
        let entry = self.depth_targets.get_mut(target).ok_or_else(|| stale("depth target"))?;
        *entry = Some(*surface);
        self.record(format!("link_depth_target {}x{}", surface.width, surface.height));
        Ok(())
    }

    fn init_depth_target(&mut self, target: DepthTargetHandle, mip_level: u32) -> RioResult<()> {
        self.depth_targets.get(target).ok_or_else(|| stale("depth target"))?;
        self.record(format!("init_depth_target mip={}", mip_level));
        Ok(())
    }

    fn bind_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()> {
        self.depth_targets.get(target).ok_or_else(|| stale("depth target"))?;
        self.record("bind_depth_target".to_string());
        Ok(())
    }

    fn invalidate_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()> {
        self.depth_targets.get(target).ok_or_else(|| stale("depth target"))?;
        self.record("invalidate_depth_target".to_string());
        Ok(())
    }

    fn destroy_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()> {
        self.depth_targets.remove(target).ok_or_else(|| stale("depth target"))?;
        self.record("destroy_depth_target".to_string());
        Ok(())
    }

    // ===== FRAME BUFFERS =====

    fn create_render_buffer(&mut self) -> RioResult<RenderBufferHandle> {
        self.record("create_render_buffer".to_string());
        Ok(self.render_buffers.insert(()))
    }

    fn bind_render_buffer(&mut self, buffer: RenderBufferHandle) -> RioResult<()> {
        self.render_buffers.get(buffer).ok_or_else(|| stale("render buffer"))?;
        self.record("bind_render_buffer".to_string());
        Ok(())
    }

    fn set_draw_buffers(
        &mut self,
        buffer: RenderBufferHandle,
        attachments: [bool; RENDER_TARGET_MAX_NUM],
    ) -> RioResult<()> {
        self.render_buffers.get(buffer).ok_or_else(|| stale("render buffer"))?;
        let mask = attachments
            .iter()
            .enumerate()
            .fold(0u32, |mask, (i, on)| mask | ((*on as u32) << i));
        self.record(format!("set_draw_buffers mask={:#04x}", mask));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: &Viewport) -> RioResult<()> {
        self.record(format!(
            "set_viewport {} {} {} {} {} {}",
            viewport.x, viewport.y, viewport.width, viewport.height, viewport.near, viewport.far
        ));
        Ok(())
    }

    fn set_scissor(&mut self, scissor: &Scissor) -> RioResult<()> {
        self.record(format!(
            "set_scissor {} {} {} {}",
            scissor.x, scissor.y, scissor.width, scissor.height
        ));
        Ok(())
    }

    fn clear(&mut self, buffer: RenderBufferHandle, request: &ClearRequest) -> RioResult<()> {
        self.render_buffers.get(buffer).ok_or_else(|| stale("render buffer"))?;
        self.record(format!(
            "clear flags={:#x} color_index={:?} depth={}",
            request.flags.bits(),
            request.color.map(|(_, index)| index),
            request.depth.is_some()
        ));
        Ok(())
    }

    fn read_color_target(
        &mut self,
        buffer: RenderBufferHandle,
        target: ColorTargetHandle,
        index: u32,
        pixels: &mut [u8],
    ) -> RioResult<()> {
        self.render_buffers.get(buffer).ok_or_else(|| stale("render buffer"))?;
        self.color_targets.get(target).ok_or_else(|| stale("color target"))?;
        pixels.fill(0xAB);
        self.record(format!("read_color_target index={} size={}", index, pixels.len()));
        Ok(())
    }

    fn destroy_render_buffer(&mut self, buffer: RenderBufferHandle) -> RioResult<()> {
        self.render_buffers.remove(buffer).ok_or_else(|| stale("render buffer"))?;
        self.record("destroy_render_buffer".to_string());
        Ok(())
    }

    fn draw_arrays(
        &mut self,
        mode: PrimitiveMode,
        first: u32,
        count: u32,
        instance_count: u32,
    ) -> RioResult<()> {
        self.record(format!(
            "draw_arrays {:?} first={} count={} instances={}",
            mode, first, count, instance_count
        ));
        Ok(())
    }

    fn draw_elements(
        &mut self,
        mode: PrimitiveMode,
        indices: Indices<'_>,
        instance_count: u32,
    ) -> RioResult<()> {
        self.record(format!(
            "draw_elements {:?} {:?} count={} instances={}",
            mode,
            indices.format(),
            indices.len(),
            instance_count
        ));
        self.last_indices = Some(match indices {
            Indices::U16(indices) => indices.iter().map(|&i| u32::from(i)).collect(),
            Indices::U32(indices) => indices.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
