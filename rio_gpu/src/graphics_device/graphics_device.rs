//! GraphicsDevice trait - backend interface of the GPU layer
//!
//! Resources are referred to by typed slotmap keys. The core types (`Texture2D`,
//! `VertexArray`, `RenderState`, ...) keep their own state, validate caller contracts and then
//! hand the device exactly the data it needs; the device owns everything that lives in backend
//! memory (GL objects, GX2 register blocks, MEM2 allocations).

use std::any::Any;
use slotmap::new_key_type;
use crate::error::RioResult;
use crate::graphics_device::{
    BufferUpload, ClearRequest, CompiledShader, Indices, PipelineState, PrimitiveMode, RenderStateGroups,
    SamplerBinding, ShaderSource, ShaderVariable, TextureSource, VertexAttributeDesc,
    VertexBufferBinding,
};
use crate::gpu::{
    Backend, SamplerDirty, SamplerState, Scissor, ShaderMode, ShaderStage, Surface,
    UniformValue, Viewport,
};

new_key_type! {
    /// Backend texture object
    pub struct TextureHandle;
    /// Backend sampler object
    pub struct SamplerHandle;
    /// Backend vertex buffer
    pub struct VertexBufferHandle;
    /// Backend vertex layout (VAO on GL, fetch shader on Cafe)
    pub struct VertexLayoutHandle;
    /// Backend uniform buffer
    pub struct UniformBlockHandle;
    /// Linked vertex + fragment program
    pub struct ShaderHandle;
    /// Color buffer view over a texture surface
    pub struct ColorTargetHandle;
    /// Depth buffer view over a texture surface
    pub struct DepthTargetHandle;
    /// Frame buffer grouping render targets
    pub struct RenderBufferHandle;
}

/// Backend interface
///
/// Implemented by `CafeGraphicsDevice` (GX2 model) and `GlGraphicsDevice` (OpenGL through glow).
/// Every method may fail with `RioError::InvalidResource` when given a stale handle.
pub trait GraphicsDevice {
    /// Which backend family this is (drives format capabilities and shader file naming)
    fn backend(&self) -> Backend;

    /// Downcast access to the concrete device
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Whether uniform block words must be stored byte-swapped
    fn swaps_uniform_words(&self) -> bool;

    // ===== TEXTURES =====

    /// Create a 2D texture with the given layout and component map
    fn create_texture(
        &mut self,
        surface: &Surface,
        comp_map: u32,
        source: TextureSource<'_>,
    ) -> RioResult<TextureHandle>;

    /// Replace the swizzle of an existing texture
    fn set_texture_comp_map(&mut self, texture: TextureHandle, comp_map: u32) -> RioResult<()>;

    /// Destroy a texture, releasing its storage only if the device allocated it
    fn destroy_texture(&mut self, texture: TextureHandle) -> RioResult<()>;

    // ===== SAMPLERS =====

    fn create_sampler(&mut self) -> RioResult<SamplerHandle>;

    /// Push the state groups flagged in `dirty` to the backend sampler
    fn update_sampler(
        &mut self,
        sampler: SamplerHandle,
        state: &SamplerState,
        dirty: SamplerDirty,
    ) -> RioResult<()>;

    /// Bind a texture/sampler pair at the locations in `binding`
    fn bind_sampler(
        &mut self,
        sampler: SamplerHandle,
        state: &SamplerState,
        texture: TextureHandle,
        binding: SamplerBinding,
    ) -> RioResult<()>;

    fn destroy_sampler(&mut self, sampler: SamplerHandle) -> RioResult<()>;

    // ===== VERTEX INPUT =====

    fn create_vertex_buffer(&mut self, slot: u32) -> RioResult<VertexBufferHandle>;

    /// Replace the whole contents of a vertex buffer
    fn upload_vertex_buffer(
        &mut self,
        buffer: VertexBufferHandle,
        data: &[u8],
        stride: u32,
        mode: BufferUpload,
        invalidate: bool,
    ) -> RioResult<()>;

    /// Overwrite `data.len()` bytes at `offset`
    fn update_vertex_buffer(
        &mut self,
        buffer: VertexBufferHandle,
        offset: u32,
        data: &[u8],
        invalidate: bool,
    ) -> RioResult<()>;

    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferHandle) -> RioResult<()>;

    fn create_vertex_layout(&mut self) -> RioResult<VertexLayoutHandle>;

    /// (Re)build a layout from attributes listed in slot order, then stream order
    fn build_vertex_layout(
        &mut self,
        layout: VertexLayoutHandle,
        attributes: &[VertexAttributeDesc],
        buffers: &[VertexBufferBinding],
    ) -> RioResult<()>;

    fn bind_vertex_layout(
        &mut self,
        layout: VertexLayoutHandle,
        buffers: &[VertexBufferBinding],
    ) -> RioResult<()>;

    fn destroy_vertex_layout(&mut self, layout: VertexLayoutHandle) -> RioResult<()>;

    // ===== UNIFORM BLOCKS =====

    fn create_uniform_block(&mut self) -> RioResult<UniformBlockHandle>;

    /// Replace the whole block (data already in GPU byte order)
    fn upload_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        data: &[u8],
        mode: BufferUpload,
        invalidate: bool,
    ) -> RioResult<()>;

    /// Overwrite part of the block (data already in GPU byte order)
    fn update_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        offset: u32,
        data: &[u8],
        invalidate: bool,
    ) -> RioResult<()>;

    /// Bind the block for the stages in `stage`
    fn bind_uniform_block(
        &mut self,
        block: UniformBlockHandle,
        stage: ShaderStage,
        vs_index: Option<u32>,
        fs_index: Option<u32>,
    ) -> RioResult<()>;

    fn destroy_uniform_block(&mut self, block: UniformBlockHandle) -> RioResult<()>;

    // ===== SHADERS =====

    /// Compile and link a program pair
    fn compile_shader(&mut self, source: ShaderSource<'_>) -> RioResult<CompiledShader>;

    /// Location, register offset or block index of a named variable
    fn shader_location(
        &self,
        shader: ShaderHandle,
        variable: ShaderVariable,
        name: &str,
    ) -> Option<u32>;

    /// Switch the constant-buffer access mode (no-op for backends without modes)
    fn set_shader_mode(&mut self, mode: ShaderMode) -> RioResult<()>;

    fn bind_shader(&mut self, shader: ShaderHandle) -> RioResult<()>;

    /// Write a uniform of the bound program at the given stage locations
    fn set_uniform(
        &mut self,
        vs_location: Option<u32>,
        fs_location: Option<u32>,
        value: &UniformValue<'_>,
    ) -> RioResult<()>;

    fn destroy_shader(&mut self, shader: ShaderHandle) -> RioResult<()>;

    // ===== PIPELINE STATE =====

    /// Apply the requested groups of `state`
    fn apply_pipeline_state(
        &mut self,
        state: &PipelineState,
        groups: RenderStateGroups,
    ) -> RioResult<()>;

    // ===== RENDER TARGETS =====

    fn create_color_target(&mut self) -> RioResult<ColorTargetHandle>;

    /// Point a color target at a texture surface
    fn link_color_target(
        &mut self,
        target: ColorTargetHandle,
        texture: TextureHandle,
        surface: &Surface,
    ) -> RioResult<()>;

    /// Recompute the target's register block for `mip_level`
    fn init_color_target(&mut self, target: ColorTargetHandle, mip_level: u32) -> RioResult<()>;

    /// Bind at render-target index `index`
    fn bind_color_target(&mut self, target: ColorTargetHandle, index: u32) -> RioResult<()>;

    /// Invalidate GPU caches covering the target's image and mip chain
    fn invalidate_color_target(&mut self, target: ColorTargetHandle) -> RioResult<()>;

    fn destroy_color_target(&mut self, target: ColorTargetHandle) -> RioResult<()>;

    fn create_depth_target(&mut self) -> RioResult<DepthTargetHandle>;

    fn link_depth_target(
        &mut self,
        target: DepthTargetHandle,
        texture: TextureHandle,
        surface: &Surface,
    ) -> RioResult<()>;

    fn init_depth_target(&mut self, target: DepthTargetHandle, mip_level: u32) -> RioResult<()>;

    fn bind_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()>;

    fn invalidate_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()>;

    fn destroy_depth_target(&mut self, target: DepthTargetHandle) -> RioResult<()>;

    // ===== FRAME BUFFERS =====

    fn create_render_buffer(&mut self) -> RioResult<RenderBufferHandle>;

    fn bind_render_buffer(&mut self, buffer: RenderBufferHandle) -> RioResult<()>;

    /// Enable drawing into the color attachments flagged `true`
    fn set_draw_buffers(
        &mut self,
        buffer: RenderBufferHandle,
        attachments: [bool; crate::gpu::RENDER_TARGET_MAX_NUM],
    ) -> RioResult<()>;

    fn set_viewport(&mut self, viewport: &Viewport) -> RioResult<()>;

    fn set_scissor(&mut self, scissor: &Scissor) -> RioResult<()>;

    fn clear(&mut self, buffer: RenderBufferHandle, request: &ClearRequest) -> RioResult<()>;

    /// Copy the pixels of a color target into `pixels` (after the GPU is done drawing)
    fn read_color_target(
        &mut self,
        buffer: RenderBufferHandle,
        target: ColorTargetHandle,
        index: u32,
        pixels: &mut [u8],
    ) -> RioResult<()>;

    fn destroy_render_buffer(&mut self, buffer: RenderBufferHandle) -> RioResult<()>;

    // ===== DRAW =====

    /// Draw `count` vertices starting at `first`, `instance_count` times, through the bound
    /// vertex layout, shader and render state
    fn draw_arrays(
        &mut self,
        mode: PrimitiveMode,
        first: u32,
        count: u32,
        instance_count: u32,
    ) -> RioResult<()>;

    /// Draw every index of `indices`, `instance_count` times
    ///
    /// The device copies the indices into memory the GPU reads (index alignment applies
    /// there); the slice may be dropped once the call returns.
    fn draw_elements(
        &mut self,
        mode: PrimitiveMode,
        indices: Indices<'_>,
        instance_count: u32,
    ) -> RioResult<()>;
}
