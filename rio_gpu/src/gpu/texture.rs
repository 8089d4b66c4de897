//! Texture2D - a sampled 2D image
//!
//! Three ways to get one:
//! - **load / from_file_bytes**: a packaged `.rtx` file; the texture keeps the file blob and
//!   its surface data points into it
//! - **new_empty**: storage without contents, typically a render target
//! - **from_native**: wrap a surface whose memory belongs to someone else; destroying the
//!   texture never frees that memory

use std::sync::Arc;
use crate::context::GraphicsContext;
use crate::error::RioResult;
use crate::graphics_device::{TextureHandle, TextureSource};
use crate::gpu::surface::{Surface, SurfaceData};
use crate::gpu::texture_file::{NativeFormat, TextureFile};
use crate::gpu::texture_format::TextureFormat;
use crate::{engine_debug, engine_ensure, engine_error};

/// Externally owned surface to wrap in a `Texture2D`
#[derive(Debug, Clone)]
pub struct NativeTexture2D {
    pub surface: Surface,
    pub comp_map: u32,
    pub data: SurfaceData,
}

#[derive(Debug)]
pub struct Texture2D {
    handle: TextureHandle,
    surface: Surface,
    data: Option<SurfaceData>,
    comp_map: u32,
    native_format: NativeFormat,
    self_allocated: bool,
}

impl Texture2D {
    /// Load `{texture_dir}/{name}.rtx` through the context's file device
    pub fn load(ctx: &mut GraphicsContext, name: &str) -> RioResult<Self> {
        let path = ctx.config().texture_path(name);
        let bytes = ctx.load_file(&path)?;
        engine_debug!("rio::gpu::Texture2D", "Loading texture \"{}\"", path);
        Self::from_file_bytes(ctx, bytes)
    }

    /// Create from the bytes of a packaged texture; the texture takes the blob
    pub fn from_file_bytes(ctx: &mut GraphicsContext, bytes: Vec<u8>) -> RioResult<Self> {
        let file = TextureFile::parse(&bytes)?;
        let blob: Arc<[u8]> = Arc::from(bytes);
        let data = SurfaceData::new(blob, file.image_range(), file.mipmap_range())?;

        let handle = ctx
            .device_mut()
            .create_texture(&file.surface, file.comp_map, TextureSource::Data(&data))?;

        Ok(Self {
            handle,
            surface: file.surface,
            data: Some(data),
            comp_map: file.comp_map,
            native_format: file.native_format,
            self_allocated: true,
        })
    }

    /// Allocate a texture without contents
    pub fn new_empty(
        ctx: &mut GraphicsContext,
        format: TextureFormat,
        width: u32,
        height: u32,
        mip_levels: u32,
    ) -> RioResult<Self> {
        let surface = Surface::new(format, width, height, mip_levels)
            .inspect_err(|err| engine_error!("rio::gpu::Texture2D", "new_empty: {}", err))?;
        let comp_map = format.default_comp_map();
        let handle = ctx
            .device_mut()
            .create_texture(&surface, comp_map, TextureSource::Empty)?;

        Ok(Self {
            handle,
            surface,
            data: None,
            comp_map,
            native_format: NativeFormat::default(),
            self_allocated: true,
        })
    }

    /// Wrap an externally owned surface (copied by value, never freed here)
    ///
    /// The surface layout must match its format and size, and `data` must hold at least
    /// `image_size` (and `mipmap_size`) bytes.
    pub fn from_native(ctx: &mut GraphicsContext, native: &NativeTexture2D) -> RioResult<Self> {
        let surface = &native.surface;
        surface
            .check_layout()
            .inspect_err(|err| engine_error!("rio::gpu::Texture2D", "from_native: {}", err))?;
        engine_ensure!(
            native.data.image().len() >= surface.image_size as usize,
            "rio::gpu::Texture2D",
            "native image holds {} bytes, surface needs {}",
            native.data.image().len(),
            surface.image_size
        );
        let mip_len = native.data.mipmaps().map_or(0, <[u8]>::len);
        engine_ensure!(
            mip_len >= surface.mipmap_size as usize,
            "rio::gpu::Texture2D",
            "native mip chain holds {} bytes, surface needs {}",
            mip_len,
            surface.mipmap_size
        );

        let handle = ctx.device_mut().create_texture(
            &native.surface,
            native.comp_map,
            TextureSource::External(&native.data),
        )?;

        Ok(Self {
            handle,
            surface: native.surface,
            data: Some(native.data.clone()),
            comp_map: native.comp_map,
            native_format: NativeFormat::default(),
            self_allocated: false,
        })
    }

    /// Replace the component map and re-initialize the backend texture state
    pub fn set_comp_map(&mut self, ctx: &mut GraphicsContext, comp_map: u32) -> RioResult<()> {
        ctx.device_mut().set_texture_comp_map(self.handle, comp_map)?;
        self.comp_map = comp_map;
        Ok(())
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn width(&self) -> u32 {
        self.surface.width
    }

    pub fn height(&self) -> u32 {
        self.surface.height
    }

    pub fn mip_levels(&self) -> u32 {
        self.surface.mip_levels
    }

    pub fn format(&self) -> TextureFormat {
        self.surface.format
    }

    pub fn comp_map(&self) -> u32 {
        self.comp_map
    }

    pub fn data(&self) -> Option<&SurfaceData> {
        self.data.as_ref()
    }

    /// GL upload triple recorded in the source file (zero otherwise)
    pub fn native_format(&self) -> NativeFormat {
        self.native_format
    }

    /// Whether destroying the texture releases its storage
    pub fn is_self_allocated(&self) -> bool {
        self.self_allocated
    }

    pub fn destroy(self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().destroy_texture(self.handle)
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
