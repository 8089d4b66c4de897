//! VertexBuffer - vertex data bound to a fixed attribute-buffer slot
//!
//! The slot is chosen at creation and never changes. A `VertexArray` references the buffer by
//! slot; uploads can happen before or after the array is processed.

use crate::context::GraphicsContext;
use crate::error::RioResult;
use crate::graphics_device::{BufferUpload, VertexBufferHandle};
use crate::{engine_debug, engine_ensure};

/// Number of attribute-buffer slots
pub const VERTEX_BUFFER_SLOT_NUM: u32 = 16;

#[derive(Debug)]
pub struct VertexBuffer {
    handle: VertexBufferHandle,
    slot: u32,
    stride: u32,
    size: u32,
}

impl VertexBuffer {
    pub fn new(ctx: &mut GraphicsContext, slot: u32) -> RioResult<Self> {
        engine_ensure!(
            slot < VERTEX_BUFFER_SLOT_NUM,
            "rio::gpu::VertexBuffer",
            "buffer slot {} out of range (max {})",
            slot,
            VERTEX_BUFFER_SLOT_NUM - 1
        );
        let handle = ctx.device_mut().create_vertex_buffer(slot)?;
        engine_debug!("rio::gpu::VertexBuffer", "Created vertex buffer at slot {}", slot);
        Ok(Self { handle, slot, stride: 0, size: 0 })
    }

    pub fn handle(&self) -> VertexBufferHandle {
        self.handle
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Bytes per vertex of the last upload
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Byte size of the last whole-buffer upload
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Replace the whole contents
    pub fn set_data(&mut self, ctx: &mut GraphicsContext, data: &[u8], stride: u32) -> RioResult<()> {
        self.upload(ctx, data, stride, false)
    }

    /// Replace the whole contents and invalidate the GPU attribute cache over them
    pub fn set_data_invalidate(
        &mut self,
        ctx: &mut GraphicsContext,
        data: &[u8],
        stride: u32,
    ) -> RioResult<()> {
        self.upload(ctx, data, stride, true)
    }

    /// Overwrite `data.len()` bytes at `offset` without changing the size
    pub fn set_sub_data(&mut self, ctx: &mut GraphicsContext, offset: u32, data: &[u8]) -> RioResult<()> {
        self.update(ctx, offset, data, false)
    }

    pub fn set_sub_data_invalidate(
        &mut self,
        ctx: &mut GraphicsContext,
        offset: u32,
        data: &[u8],
    ) -> RioResult<()> {
        self.update(ctx, offset, data, true)
    }

    fn upload(
        &mut self,
        ctx: &mut GraphicsContext,
        data: &[u8],
        stride: u32,
        invalidate: bool,
    ) -> RioResult<()> {
        engine_ensure!(!data.is_empty(), "rio::gpu::VertexBuffer", "vertex data is empty");
        engine_ensure!(stride != 0, "rio::gpu::VertexBuffer", "vertex stride is zero");
        let mode = BufferUpload::for_sizes(self.size as usize, data.len());
        ctx.device_mut()
            .upload_vertex_buffer(self.handle, data, stride, mode, invalidate)?;
        self.size = data.len() as u32;
        self.stride = stride;
        Ok(())
    }

    fn update(
        &mut self,
        ctx: &mut GraphicsContext,
        offset: u32,
        data: &[u8],
        invalidate: bool,
    ) -> RioResult<()> {
        let end = offset as u64 + data.len() as u64;
        engine_ensure!(
            end <= self.size as u64,
            "rio::gpu::VertexBuffer",
            "sub data {}..{} exceeds buffer size {}",
            offset,
            end,
            self.size
        );
        if data.is_empty() {
            return Ok(());
        }
        ctx.device_mut()
            .update_vertex_buffer(self.handle, offset, data, invalidate)
    }

    pub fn destroy(self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().destroy_vertex_buffer(self.handle)
    }
}

#[cfg(test)]
#[path = "vertex_buffer_tests.rs"]
mod tests;
