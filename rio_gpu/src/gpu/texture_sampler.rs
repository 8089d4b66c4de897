//! TextureSampler2D - sampling state for a 2D texture
//!
//! Setters only record the new value and flag its group dirty. The backend sampler is
//! synchronized by `update` (called implicitly by every bind), which pushes only the groups
//! that changed since the last synchronization.

use bitflags::bitflags;
use glam::Vec4;
use crate::context::GraphicsContext;
use crate::error::{RioError, RioResult};
use crate::graphics_device::{SamplerBinding, SamplerHandle, TextureHandle};
use crate::gpu::graphics::{Color4f, CompareFunc};
use crate::gpu::texture::Texture2D;
use crate::{engine_debug, engine_ensure, engine_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexXYFilterMode {
    Point,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexMipFilterMode {
    /// Sample the base level only
    None,
    Point,
    Linear,
}

/// Maximum anisotropic filtering ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexAnisoRatio {
    Ratio1To1,
    Ratio2To1,
    Ratio4To1,
    Ratio8To1,
    Ratio16To1,
}

impl TexAnisoRatio {
    pub fn max_samples(self) -> u32 {
        match self {
            TexAnisoRatio::Ratio1To1 => 1,
            TexAnisoRatio::Ratio2To1 => 2,
            TexAnisoRatio::Ratio4To1 => 4,
            TexAnisoRatio::Ratio8To1 => 8,
            TexAnisoRatio::Ratio16To1 => 16,
        }
    }
}

/// Texture coordinate addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexWrapMode {
    Repeat,
    Mirror,
    /// Clamp to edge
    Clamp,
    /// Mirror once, then clamp to edge
    MirrorOnce,
    /// Clamp halfway into the border
    ClampHalfBorder,
    MirrorOnceHalfBorder,
    /// Clamp to the border color
    ClampBorder,
    MirrorOnceBorder,
}

bitflags! {
    /// Sampler state groups awaiting synchronization with the backend
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SamplerDirty: u8 {
        const FILTER = 1 << 0;
        const WRAP = 1 << 1;
        const BORDER_COLOR = 1 << 2;
        const LOD = 1 << 3;
        const DEPTH_COMPARE = 1 << 4;
    }
}

/// Full sampler state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    pub mag_filter: TexXYFilterMode,
    pub min_filter: TexXYFilterMode,
    pub mip_filter: TexMipFilterMode,
    pub max_aniso: TexAnisoRatio,
    pub wrap_x: TexWrapMode,
    pub wrap_y: TexWrapMode,
    pub wrap_z: TexWrapMode,
    pub border_color: Color4f,
    pub min_lod: f32,
    pub max_lod: f32,
    pub lod_bias: f32,
    pub depth_compare_enable: bool,
    pub depth_compare_func: CompareFunc,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            mag_filter: TexXYFilterMode::Linear,
            min_filter: TexXYFilterMode::Linear,
            mip_filter: TexMipFilterMode::Linear,
            max_aniso: TexAnisoRatio::Ratio1To1,
            wrap_x: TexWrapMode::Clamp,
            wrap_y: TexWrapMode::Clamp,
            wrap_z: TexWrapMode::Clamp,
            border_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            min_lod: 0.0,
            max_lod: 14.0,
            lod_bias: 0.0,
            depth_compare_enable: false,
            depth_compare_func: CompareFunc::Never,
        }
    }
}

/// Sampler for 2D textures
#[derive(Debug)]
pub struct TextureSampler2D {
    handle: SamplerHandle,
    state: SamplerState,
    dirty: SamplerDirty,
    texture: Option<TextureHandle>,
}

impl TextureSampler2D {
    /// Create a sampler in the default state, every group pending
    pub fn new(ctx: &mut GraphicsContext) -> RioResult<Self> {
        let handle = ctx.device_mut().create_sampler()?;
        engine_debug!("rio::gpu::TextureSampler2D", "Created sampler {:?}", handle);
        Ok(Self {
            handle,
            state: SamplerState::default(),
            dirty: SamplerDirty::all(),
            texture: None,
        })
    }

    pub fn handle(&self) -> SamplerHandle {
        self.handle
    }

    pub fn state(&self) -> &SamplerState {
        &self.state
    }

    /// Groups changed since the last `update`
    pub fn dirty(&self) -> SamplerDirty {
        self.dirty
    }

    // ===== TEXTURE LINK =====

    /// Sample `texture` on the next bind (the sampler does not keep it alive)
    pub fn link_texture_2d(&mut self, texture: &Texture2D) {
        self.texture = Some(texture.handle());
    }

    pub fn link_texture_handle(&mut self, texture: TextureHandle) {
        self.texture = Some(texture);
    }

    pub fn unlink_texture(&mut self) {
        self.texture = None;
    }

    pub fn linked_texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// A sampler can only be bound once it has a texture
    pub fn is_bindable(&self) -> bool {
        self.texture.is_some()
    }

    // ===== FILTER =====

    pub fn set_mag_filter(&mut self, filter: TexXYFilterMode) {
        self.state.mag_filter = filter;
        self.dirty |= SamplerDirty::FILTER;
    }

    pub fn set_min_filter(&mut self, filter: TexXYFilterMode) {
        self.state.min_filter = filter;
        self.dirty |= SamplerDirty::FILTER;
    }

    pub fn set_mip_filter(&mut self, filter: TexMipFilterMode) {
        self.state.mip_filter = filter;
        self.dirty |= SamplerDirty::FILTER;
    }

    pub fn set_max_anisotropy(&mut self, ratio: TexAnisoRatio) {
        self.state.max_aniso = ratio;
        self.dirty |= SamplerDirty::FILTER;
    }

    pub fn set_filter(
        &mut self,
        mag: TexXYFilterMode,
        min: TexXYFilterMode,
        mip: TexMipFilterMode,
        aniso: TexAnisoRatio,
    ) {
        self.state.mag_filter = mag;
        self.state.min_filter = min;
        self.state.mip_filter = mip;
        self.state.max_aniso = aniso;
        self.dirty |= SamplerDirty::FILTER;
    }

    pub fn mag_filter(&self) -> TexXYFilterMode {
        self.state.mag_filter
    }

    pub fn min_filter(&self) -> TexXYFilterMode {
        self.state.min_filter
    }

    pub fn mip_filter(&self) -> TexMipFilterMode {
        self.state.mip_filter
    }

    pub fn max_anisotropy(&self) -> TexAnisoRatio {
        self.state.max_aniso
    }

    // ===== WRAP =====

    pub fn set_wrap_x(&mut self, mode: TexWrapMode) {
        self.state.wrap_x = mode;
        self.dirty |= SamplerDirty::WRAP;
    }

    pub fn set_wrap_y(&mut self, mode: TexWrapMode) {
        self.state.wrap_y = mode;
        self.dirty |= SamplerDirty::WRAP;
    }

    pub fn set_wrap_z(&mut self, mode: TexWrapMode) {
        self.state.wrap_z = mode;
        self.dirty |= SamplerDirty::WRAP;
    }

    pub fn set_wrap(&mut self, x: TexWrapMode, y: TexWrapMode, z: TexWrapMode) {
        self.state.wrap_x = x;
        self.state.wrap_y = y;
        self.state.wrap_z = z;
        self.dirty |= SamplerDirty::WRAP;
    }

    pub fn wrap(&self) -> (TexWrapMode, TexWrapMode, TexWrapMode) {
        (self.state.wrap_x, self.state.wrap_y, self.state.wrap_z)
    }

    // ===== BORDER / LOD / DEPTH COMPARE =====

    pub fn set_border_color(&mut self, color: Color4f) {
        self.state.border_color = color;
        self.dirty |= SamplerDirty::BORDER_COLOR;
    }

    pub fn border_color(&self) -> Color4f {
        self.state.border_color
    }

    pub fn set_lod(&mut self, min_lod: f32, max_lod: f32, bias: f32) {
        self.state.min_lod = min_lod;
        self.state.max_lod = max_lod;
        self.state.lod_bias = bias;
        self.dirty |= SamplerDirty::LOD;
    }

    /// (min, max, bias)
    pub fn lod(&self) -> (f32, f32, f32) {
        (self.state.min_lod, self.state.max_lod, self.state.lod_bias)
    }

    pub fn set_depth_compare_enable(&mut self, enable: bool) {
        self.state.depth_compare_enable = enable;
        self.dirty |= SamplerDirty::DEPTH_COMPARE;
    }

    pub fn set_depth_compare_func(&mut self, func: CompareFunc) {
        self.state.depth_compare_func = func;
        self.dirty |= SamplerDirty::DEPTH_COMPARE;
    }

    pub fn depth_compare_enable(&self) -> bool {
        self.state.depth_compare_enable
    }

    pub fn depth_compare_func(&self) -> CompareFunc {
        self.state.depth_compare_func
    }

    // ===== BACKEND SYNC =====

    /// Push the dirty groups to the backend and clear them
    pub fn update(&mut self, ctx: &mut GraphicsContext) -> RioResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }
        ctx.device_mut().update_sampler(self.handle, &self.state, self.dirty)?;
        self.dirty = SamplerDirty::empty();
        Ok(())
    }

    fn bind_at(&mut self, ctx: &mut GraphicsContext, binding: SamplerBinding) -> RioResult<()> {
        let Some(texture) = self.texture else {
            let message = "sampler has no linked texture".to_string();
            engine_error!("rio::gpu::TextureSampler2D", "{}", message);
            return Err(RioError::ContractViolation(message));
        };
        self.update(ctx)?;
        ctx.device_mut().bind_sampler(self.handle, &self.state, texture, binding)
    }

    /// Bind for the vertex stage at `location` (texture unit `slot` on GL)
    pub fn bind_vertex(&mut self, ctx: &mut GraphicsContext, location: u32, slot: u32) -> RioResult<()> {
        self.bind_at(ctx, SamplerBinding { vertex: Some(location), fragment: None, slot })
    }

    /// Bind for the fragment stage at `location` (texture unit `slot` on GL)
    pub fn bind_fragment(&mut self, ctx: &mut GraphicsContext, location: u32, slot: u32) -> RioResult<()> {
        self.bind_at(ctx, SamplerBinding { vertex: None, fragment: Some(location), slot })
    }

    /// Bind for every stage whose location is present
    pub fn bind(
        &mut self,
        ctx: &mut GraphicsContext,
        vs_location: Option<u32>,
        fs_location: Option<u32>,
        slot: u32,
    ) -> RioResult<()> {
        engine_ensure!(
            vs_location.is_some() || fs_location.is_some(),
            "rio::gpu::TextureSampler2D",
            "bind needs at least one sampler location"
        );
        self.bind_at(ctx, SamplerBinding { vertex: vs_location, fragment: fs_location, slot })
    }

    /// Bind for the vertex stage if `location` is present and a texture is linked
    pub fn try_bind_vertex(
        &mut self,
        ctx: &mut GraphicsContext,
        location: Option<u32>,
        slot: u32,
    ) -> RioResult<bool> {
        match location {
            Some(location) if self.is_bindable() => {
                self.bind_vertex(ctx, location, slot)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Bind for the fragment stage if `location` is present and a texture is linked
    pub fn try_bind_fragment(
        &mut self,
        ctx: &mut GraphicsContext,
        location: Option<u32>,
        slot: u32,
    ) -> RioResult<bool> {
        match location {
            Some(location) if self.is_bindable() => {
                self.bind_fragment(ctx, location, slot)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Try the vertex stage first; the fragment stage is only tried if that did not bind
    pub fn try_bind(
        &mut self,
        ctx: &mut GraphicsContext,
        vs_location: Option<u32>,
        fs_location: Option<u32>,
        slot: u32,
    ) -> RioResult<bool> {
        Ok(self.try_bind_vertex(ctx, vs_location, slot)?
            || self.try_bind_fragment(ctx, fs_location, slot)?)
    }

    pub fn destroy(self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().destroy_sampler(self.handle)
    }
}

#[cfg(test)]
#[path = "texture_sampler_tests.rs"]
mod tests;
