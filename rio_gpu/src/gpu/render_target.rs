//! Render targets - color and depth views over a texture surface
//!
//! Linking or changing the mip level only marks the backend register block stale. The block
//! is recomputed on the next bind and reused by every bind after that.

use crate::context::GraphicsContext;
use crate::error::{RioError, RioResult};
use crate::graphics_device::{ColorTargetHandle, DepthTargetHandle, TextureHandle};
use crate::gpu::graphics::RENDER_TARGET_MAX_NUM;
use crate::gpu::surface::{Surface, MIP_LEVELS_MAX};
use crate::gpu::texture::Texture2D;
use crate::{engine_ensure, engine_error};

fn check_mip_level(source: &str, level: u32) -> RioResult<()> {
    engine_ensure!(
        level < MIP_LEVELS_MAX,
        source,
        "mip level {} out of range (max {})",
        level,
        MIP_LEVELS_MAX - 1
    );
    Ok(())
}

/// Surface the target renders into, or a contract error when nothing is linked
fn linked_surface(source: &str, surface: Option<&Surface>) -> RioResult<Surface> {
    match surface {
        Some(surface) => Ok(*surface),
        None => {
            engine_error!(source, "render target has no linked texture");
            Err(RioError::ContractViolation("render target has no linked texture".to_string()))
        }
    }
}

// ============================================================================
// Color
// ============================================================================

#[derive(Debug)]
pub struct RenderTargetColor {
    handle: ColorTargetHandle,
    texture: Option<TextureHandle>,
    surface: Option<Surface>,
    mip_level: u32,
    update_regs: bool,
}

impl RenderTargetColor {
    pub fn new(ctx: &mut GraphicsContext) -> RioResult<Self> {
        let handle = ctx.device_mut().create_color_target()?;
        Ok(Self { handle, texture: None, surface: None, mip_level: 0, update_regs: true })
    }

    pub fn handle(&self) -> ColorTargetHandle {
        self.handle
    }

    /// Render into `texture`; its format must be color renderable on this backend
    pub fn link_texture_2d(&mut self, ctx: &mut GraphicsContext, texture: &Texture2D) -> RioResult<()> {
        let format = texture.format();
        engine_ensure!(
            format.is_usable_as_render_target_color(ctx.backend()),
            "rio::gpu::RenderTargetColor",
            "{:?} cannot be used as a color target",
            format
        );
        self.link_native_texture_2d(ctx, *texture.surface(), texture.handle())
    }

    /// Render into an externally described surface
    pub fn link_native_texture_2d(
        &mut self,
        ctx: &mut GraphicsContext,
        surface: Surface,
        texture: TextureHandle,
    ) -> RioResult<()> {
        ctx.device_mut().link_color_target(self.handle, texture, &surface)?;
        self.texture = Some(texture);
        self.surface = Some(surface);
        self.update_regs = true;
        Ok(())
    }

    pub fn linked_texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Select the mip level rendered to; the target goes stale only when the level changes
    pub fn set_mip_level(&mut self, level: u32) -> RioResult<()> {
        check_mip_level("rio::gpu::RenderTargetColor", level)?;
        if level != self.mip_level {
            self.mip_level = level;
            self.update_regs = true;
        }
        Ok(())
    }

    pub fn mip_level(&self) -> u32 {
        self.mip_level
    }

    /// Whether the next bind recomputes the register block
    pub fn needs_update(&self) -> bool {
        self.update_regs
    }

    /// Recompute the register block if it is stale
    pub fn update(&mut self, ctx: &mut GraphicsContext) -> RioResult<()> {
        if self.update_regs {
            let surface = linked_surface("rio::gpu::RenderTargetColor", self.surface.as_ref())?;
            engine_ensure!(
                self.mip_level < surface.mip_levels,
                "rio::gpu::RenderTargetColor",
                "mip level {} not present (texture has {})",
                self.mip_level,
                surface.mip_levels
            );
            ctx.device_mut().init_color_target(self.handle, self.mip_level)?;
            self.update_regs = false;
        }
        Ok(())
    }

    /// Bind as color target `index`
    pub fn bind(&mut self, ctx: &mut GraphicsContext, index: u32) -> RioResult<()> {
        engine_ensure!(
            (index as usize) < RENDER_TARGET_MAX_NUM,
            "rio::gpu::RenderTargetColor",
            "color target index {} out of range",
            index
        );
        self.update(ctx)?;
        ctx.device_mut().bind_color_target(self.handle, index)
    }

    /// Flush GPU caches so the rendered contents can be sampled
    pub fn invalidate_gpu_cache(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().invalidate_color_target(self.handle)
    }

    pub fn destroy(self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().destroy_color_target(self.handle)
    }
}

// ============================================================================
// Depth
// ============================================================================

#[derive(Debug)]
pub struct RenderTargetDepth {
    handle: DepthTargetHandle,
    texture: Option<TextureHandle>,
    surface: Option<Surface>,
    mip_level: u32,
    update_regs: bool,
    has_stencil: bool,
}

impl RenderTargetDepth {
    pub fn new(ctx: &mut GraphicsContext) -> RioResult<Self> {
        let handle = ctx.device_mut().create_depth_target()?;
        Ok(Self {
            handle,
            texture: None,
            surface: None,
            mip_level: 0,
            update_regs: true,
            has_stencil: false,
        })
    }

    pub fn handle(&self) -> DepthTargetHandle {
        self.handle
    }

    /// Render depth into `texture`; its format must be depth renderable on this backend
    pub fn link_texture_2d(&mut self, ctx: &mut GraphicsContext, texture: &Texture2D) -> RioResult<()> {
        let format = texture.format();
        engine_ensure!(
            format.is_usable_as_render_target_depth(ctx.backend()),
            "rio::gpu::RenderTargetDepth",
            "{:?} cannot be used as a depth target",
            format
        );
        self.link_native_texture_2d(ctx, *texture.surface(), texture.handle())
    }

    /// Stencil presence follows the surface format
    pub fn link_native_texture_2d(
        &mut self,
        ctx: &mut GraphicsContext,
        surface: Surface,
        texture: TextureHandle,
    ) -> RioResult<()> {
        ctx.device_mut().link_depth_target(self.handle, texture, &surface)?;
        self.texture = Some(texture);
        self.surface = Some(surface);
        self.has_stencil = surface.format.has_stencil(ctx.backend());
        self.update_regs = true;
        Ok(())
    }

    pub fn linked_texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn has_stencil(&self) -> bool {
        self.has_stencil
    }

    pub fn set_mip_level(&mut self, level: u32) -> RioResult<()> {
        check_mip_level("rio::gpu::RenderTargetDepth", level)?;
        if level != self.mip_level {
            self.mip_level = level;
            self.update_regs = true;
        }
        Ok(())
    }

    pub fn mip_level(&self) -> u32 {
        self.mip_level
    }

    pub fn needs_update(&self) -> bool {
        self.update_regs
    }

    pub fn update(&mut self, ctx: &mut GraphicsContext) -> RioResult<()> {
        if self.update_regs {
            let surface = linked_surface("rio::gpu::RenderTargetDepth", self.surface.as_ref())?;
            engine_ensure!(
                self.mip_level < surface.mip_levels,
                "rio::gpu::RenderTargetDepth",
                "mip level {} not present (texture has {})",
                self.mip_level,
                surface.mip_levels
            );
            ctx.device_mut().init_depth_target(self.handle, self.mip_level)?;
            self.update_regs = false;
        }
        Ok(())
    }

    pub fn bind(&mut self, ctx: &mut GraphicsContext) -> RioResult<()> {
        self.update(ctx)?;
        ctx.device_mut().bind_depth_target(self.handle)
    }

    pub fn invalidate_gpu_cache(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().invalidate_depth_target(self.handle)
    }

    pub fn destroy(self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().destroy_depth_target(self.handle)
    }
}

#[cfg(test)]
#[path = "render_target_tests.rs"]
mod tests;
