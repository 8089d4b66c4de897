//! RenderBuffer - up to eight color targets plus one depth target rendered together
//!
//! The buffer owns the targets placed in it. `bind` makes it the current frame buffer with a
//! full-size viewport; `clear` and `read` work on one color index at a time.

use crate::context::GraphicsContext;
use crate::error::RioResult;
use crate::graphics_device::{ClearFlags, ClearRequest, RenderBufferHandle};
use crate::gpu::graphics::{Color4f, Scissor, Viewport, RENDER_TARGET_MAX_NUM};
use crate::gpu::render_target::{RenderTargetColor, RenderTargetDepth};
use crate::{engine_ensure, engine_trace};

#[derive(Debug)]
pub struct RenderBuffer {
    handle: RenderBufferHandle,
    width: u32,
    height: u32,
    scissor: Scissor,
    color: [Option<RenderTargetColor>; RENDER_TARGET_MAX_NUM],
    depth: Option<RenderTargetDepth>,
}

fn check_index(index: usize) -> RioResult<()> {
    engine_ensure!(
        index < RENDER_TARGET_MAX_NUM,
        "rio::gpu::RenderBuffer",
        "color index {} out of range (max {})",
        index,
        RENDER_TARGET_MAX_NUM - 1
    );
    Ok(())
}

impl RenderBuffer {
    /// 1x1 buffer without targets
    pub fn new(ctx: &mut GraphicsContext) -> RioResult<Self> {
        Self::with_size(ctx, 1, 1)
    }

    pub fn with_size(ctx: &mut GraphicsContext, width: u32, height: u32) -> RioResult<Self> {
        let handle = ctx.device_mut().create_render_buffer()?;
        Ok(Self {
            handle,
            width,
            height,
            scissor: Scissor::full(width, height),
            color: Default::default(),
            depth: None,
        })
    }

    pub fn handle(&self) -> RenderBufferHandle {
        self.handle
    }

    // ===== SIZE / SCISSOR =====

    /// Resize; the scissor is reset to the full area
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.scissor = Scissor::full(width, height);
    }

    /// (width, height)
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_scissor(&mut self, scissor: Scissor) {
        self.scissor = scissor;
    }

    pub fn scissor(&self) -> Scissor {
        self.scissor
    }

    // ===== TARGETS =====

    /// Place `target` at color `index`, returning the target it replaces
    pub fn set_render_target_color(
        &mut self,
        target: RenderTargetColor,
        index: usize,
    ) -> RioResult<Option<RenderTargetColor>> {
        check_index(index)?;
        Ok(self.color[index].replace(target))
    }

    pub fn clear_render_target_color(&mut self, index: usize) -> Option<RenderTargetColor> {
        self.color.get_mut(index).and_then(Option::take)
    }

    pub fn render_target_color(&self, index: usize) -> Option<&RenderTargetColor> {
        self.color.get(index)?.as_ref()
    }

    pub fn render_target_color_mut(&mut self, index: usize) -> Option<&mut RenderTargetColor> {
        self.color.get_mut(index)?.as_mut()
    }

    pub fn set_render_target_depth(&mut self, target: RenderTargetDepth) -> Option<RenderTargetDepth> {
        self.depth.replace(target)
    }

    pub fn clear_render_target_depth(&mut self) -> Option<RenderTargetDepth> {
        self.depth.take()
    }

    pub fn render_target_depth(&self) -> Option<&RenderTargetDepth> {
        self.depth.as_ref()
    }

    pub fn render_target_depth_mut(&mut self) -> Option<&mut RenderTargetDepth> {
        self.depth.as_mut()
    }

    // ===== BIND / CLEAR / READ =====

    /// Make this the current frame buffer with a full-size viewport and the stored scissor
    pub fn bind(&mut self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.set_viewport(Viewport::full(self.width, self.height))?;
        ctx.set_scissor(self.scissor)?;
        ctx.device_mut().bind_render_buffer(self.handle)?;

        let mut attachments = [false; RENDER_TARGET_MAX_NUM];
        for (index, target) in self.color.iter_mut().enumerate() {
            if let Some(target) = target {
                target.bind(ctx, index as u32)?;
                attachments[index] = true;
            }
        }
        ctx.device_mut().set_draw_buffers(self.handle, attachments)?;

        if let Some(depth) = self.depth.as_mut() {
            depth.bind(ctx)?;
        }
        Ok(())
    }

    /// Clear the buffers selected by `flags`
    ///
    /// Depth and stencil are only cleared together with color index 0; flags whose target is
    /// missing are dropped. The context's viewport and scissor are restored afterwards.
    pub fn clear(
        &mut self,
        ctx: &mut GraphicsContext,
        index: usize,
        flags: ClearFlags,
        color: Color4f,
        depth: f32,
        stencil: u8,
    ) -> RioResult<()> {
        check_index(index)?;
        let mut flags = flags & ClearFlags::ALL;
        if self.color[index].is_none() {
            flags.remove(ClearFlags::COLOR);
        }
        if self.depth.is_none() || index != 0 {
            flags.remove(ClearFlags::DEPTH_STENCIL);
        }
        if flags.is_empty() {
            return Ok(());
        }

        let color_target = match self.color[index].as_mut() {
            Some(target) if flags.contains(ClearFlags::COLOR) => {
                target.update(ctx)?;
                Some((target.handle(), index as u32))
            }
            _ => None,
        };
        let depth_target = match self.depth.as_mut() {
            Some(target) if flags.intersects(ClearFlags::DEPTH_STENCIL) => {
                target.update(ctx)?;
                Some(target.handle())
            }
            _ => None,
        };

        engine_trace!("rio::gpu::RenderBuffer", "clear index {} flags {:?}", index, flags);
        let request = ClearRequest {
            color: color_target,
            depth: depth_target,
            flags,
            color_value: color,
            depth_value: depth,
            stencil_value: stencil,
        };
        let viewport = ctx.viewport();
        let scissor = ctx.scissor();
        ctx.device_mut().clear(self.handle, &request)?;
        if let Some(viewport) = viewport {
            ctx.set_viewport(viewport)?;
        }
        if let Some(scissor) = scissor {
            ctx.set_scissor(scissor)?;
        }
        Ok(())
    }

    /// Clear color index 0 plus depth and stencil with the usual defaults
    pub fn clear_all(&mut self, ctx: &mut GraphicsContext, color: Color4f) -> RioResult<()> {
        self.clear(ctx, 0, ClearFlags::ALL, color, 1.0, 0)
    }

    /// Copy the contents of color `index` into `pixels`
    ///
    /// Returns `false` when no target sits at `index`.
    pub fn read(&mut self, ctx: &mut GraphicsContext, index: usize, pixels: &mut [u8]) -> RioResult<bool> {
        check_index(index)?;
        let Some(target) = self.color[index].as_mut() else {
            return Ok(false);
        };
        if let Some(surface) = target.surface() {
            let level = target.mip_level();
            let needed = surface.level_width(level) as usize
                * surface.level_height(level) as usize
                * surface.format.pixel_byte_size() as usize;
            engine_ensure!(
                pixels.len() >= needed,
                "rio::gpu::RenderBuffer",
                "pixel buffer holds {} bytes, {} needed",
                pixels.len(),
                needed
            );
        }
        target.update(ctx)?;
        ctx.device_mut()
            .read_color_target(self.handle, target.handle(), index as u32, pixels)?;
        Ok(true)
    }

    /// Destroy the buffer and every target it owns
    pub fn destroy(self, ctx: &mut GraphicsContext) -> RioResult<()> {
        for target in self.color.into_iter().flatten() {
            target.destroy(ctx)?;
        }
        if let Some(depth) = self.depth {
            depth.destroy(ctx)?;
        }
        ctx.device_mut().destroy_render_buffer(self.handle)
    }
}

#[cfg(test)]
#[path = "render_buffer_tests.rs"]
mod tests;
