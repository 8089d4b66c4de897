//! Drawer - draw calls over the currently bound vertex array, shader and render state
//!
//! Also carries the alignments the GPU requires of memory it reads directly: vertex
//! buffers, index data and uniform blocks.

use crate::context::GraphicsContext;
use crate::error::RioResult;
use crate::{engine_ensure, engine_trace};

pub use crate::graphics_device::{IndexFormat, Indices, PrimitiveMode};

/// Alignment of vertex buffer storage
pub const VERTEX_ALIGNMENT: u32 = 0x40;
/// Alignment of index data
pub const INDEX_ALIGNMENT: u32 = 0x20;
/// Alignment of uniform block storage
pub const UNIFORM_BLOCK_ALIGNMENT: u32 = 0x100;

/// Stateless draw entry points
pub struct Drawer;

impl Drawer {
    /// Draw `count` vertices starting at vertex `first`
    pub fn draw_arrays(
        ctx: &mut GraphicsContext,
        mode: PrimitiveMode,
        count: u32,
        first: u32,
    ) -> RioResult<()> {
        Self::draw_arrays_instanced(ctx, mode, count, 1, first)
    }

    pub fn draw_arrays_instanced(
        ctx: &mut GraphicsContext,
        mode: PrimitiveMode,
        count: u32,
        instance_count: u32,
        first: u32,
    ) -> RioResult<()> {
        engine_ensure!(
            first.checked_add(count).is_some(),
            "rio::gpu::Drawer",
            "vertex range {}+{} overflows",
            first,
            count
        );
        engine_trace!(
            "rio::gpu::Drawer",
            "{:?}: {} vertices from {} x{}",
            mode,
            count,
            first,
            instance_count
        );
        ctx.device_mut().draw_arrays(mode, first, count, instance_count)
    }

    /// Draw the first `count` entries of `indices`
    pub fn draw_elements<'a>(
        ctx: &mut GraphicsContext,
        mode: PrimitiveMode,
        count: u32,
        indices: impl Into<Indices<'a>>,
    ) -> RioResult<()> {
        Self::draw_elements_instanced(ctx, mode, count, indices, 1)
    }

    pub fn draw_elements_instanced<'a>(
        ctx: &mut GraphicsContext,
        mode: PrimitiveMode,
        count: u32,
        indices: impl Into<Indices<'a>>,
        instance_count: u32,
    ) -> RioResult<()> {
        let indices = indices.into();
        engine_ensure!(
            count as usize <= indices.len(),
            "rio::gpu::Drawer",
            "{} indices requested from an array of {}",
            count,
            indices.len()
        );
        let used = indices.first(count as usize).unwrap_or(indices);
        engine_trace!(
            "rio::gpu::Drawer",
            "{:?}: {} {:?} indices x{}",
            mode,
            count,
            used.format(),
            instance_count
        );
        ctx.device_mut().draw_elements(mode, used, instance_count)
    }
}

#[cfg(test)]
#[path = "drawer_tests.rs"]
mod tests;
