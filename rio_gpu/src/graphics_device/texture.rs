//! Texture creation sources and sampler binding points

use crate::gpu::SurfaceData;

/// Where the pixels of a new texture come from
#[derive(Debug, Clone, Copy)]
pub enum TextureSource<'a> {
    /// Upload (or copy into device memory) the given data; the device owns its storage
    Data(&'a SurfaceData),
    /// Allocate storage without initial contents; the device owns its storage
    Empty,
    /// Wrap memory owned by someone else; the device must never free it
    External(&'a SurfaceData),
}

impl TextureSource<'_> {
    /// Whether the device allocates (and later frees) the storage
    pub fn is_self_allocated(&self) -> bool {
        !matches!(self, TextureSource::External(_))
    }
}

/// Sampler locations a texture/sampler pair is bound to
///
/// `slot` is the texture unit on GL; Cafe binds directly at the stage locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerBinding {
    pub vertex: Option<u32>,
    pub fragment: Option<u32>,
    pub slot: u32,
}
