//! Surface layout: dimensions, format and mip-chain offsets
//!
//! The mip chain is stored separately from the base image. Level `L >= 1` starts at
//! `mip_level_offsets[L - 1]` inside the mip chain; level 0 is the base image.

use std::ops::Range;
use std::sync::Arc;
use crate::error::{RioError, RioResult};
use crate::gpu::texture_format::TextureFormat;

/// Maximum number of mip levels (a 8192×8192 surface down to 1×1)
pub const MIP_LEVELS_MAX: u32 = 14;

/// Largest supported surface width or height
pub const SURFACE_DIMENSION_MAX: u32 = 8192;

/// Layout of a 2D surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    /// Number of mip levels, base included (1..=14)
    pub mip_levels: u32,
    pub format: TextureFormat,
    /// Size of the base image in bytes
    pub image_size: u32,
    /// Size of the whole mip chain (levels 1..) in bytes
    pub mipmap_size: u32,
    /// Offset of level `L` in the mip chain at index `L - 1`
    pub mip_level_offsets: [u32; 13],
}

impl Surface {
    /// Compute the full layout of a surface (mip count clamped to 1..=14)
    ///
    /// Width and height must both lie in `1..=SURFACE_DIMENSION_MAX`. The returned
    /// error is a `ContractViolation` and is not logged here.
    pub fn new(format: TextureFormat, width: u32, height: u32, mip_levels: u32) -> RioResult<Self> {
        let dimensions = 1..=SURFACE_DIMENSION_MAX;
        if !dimensions.contains(&width) || !dimensions.contains(&height) {
            return Err(RioError::ContractViolation(format!(
                "surface size {}x{} outside 1..={}",
                width, height, SURFACE_DIMENSION_MAX
            )));
        }
        let overflow = || {
            RioError::ContractViolation(format!(
                "{:?} surface of {}x{} does not fit 32-bit sizes",
                format, width, height
            ))
        };

        let mip_levels = mip_levels.clamp(1, MIP_LEVELS_MAX);
        let mut mip_level_offsets = [0u32; 13];
        let image_size = Self::calc_image_size(format, width, height).ok_or_else(overflow)?;
        let mipmap_size = Self::calc_mipmap_size(format, width, height, mip_levels, &mut mip_level_offsets)
            .ok_or_else(overflow)?;
        Ok(Self {
            width,
            height,
            mip_levels,
            format,
            image_size,
            mipmap_size,
            mip_level_offsets,
        })
    }

    /// Byte size of one `width × height` image of `format`, `None` on 32-bit overflow
    pub fn calc_image_size(format: TextureFormat, width: u32, height: u32) -> Option<u32> {
        let bpp = format.pixel_byte_size();
        let (columns, rows) = if format.is_compressed() {
            (width.div_ceil(4), height.div_ceil(4))
        } else {
            (width, height)
        };
        columns.checked_mul(rows)?.checked_mul(bpp)
    }

    /// Byte size of mip levels `1..mip_levels`, filling `offsets` with each level's start
    ///
    /// Entries past the last level are left zero. `None` on 32-bit overflow.
    pub fn calc_mipmap_size(
        format: TextureFormat,
        width: u32,
        height: u32,
        mip_levels: u32,
        offsets: &mut [u32; 13],
    ) -> Option<u32> {
        *offsets = [0; 13];
        let mip_levels = mip_levels.clamp(1, MIP_LEVELS_MAX);

        let mut size: u32 = 0;
        for level in 1..mip_levels {
            offsets[(level - 1) as usize] = size;
            let level_size = Self::calc_image_size(
                format,
                (width >> level).max(1),
                (height >> level).max(1),
            )?;
            size = size.checked_add(level_size)?;
        }
        Some(size)
    }

    /// Check that the stored sizes and used mip offsets match the layout computed
    /// from format, dimensions and mip count
    ///
    /// Offsets past the last level are ignored. Errors are `ContractViolation`s and
    /// are not logged here.
    pub fn check_layout(&self) -> RioResult<()> {
        if !(1..=MIP_LEVELS_MAX).contains(&self.mip_levels) {
            return Err(RioError::ContractViolation(format!(
                "mip count {} outside 1..={}",
                self.mip_levels, MIP_LEVELS_MAX
            )));
        }
        let computed = Self::new(self.format, self.width, self.height, self.mip_levels)?;

        if self.image_size != computed.image_size {
            return Err(RioError::ContractViolation(format!(
                "image size {} does not match {} for {:?} {}x{}",
                self.image_size, computed.image_size, self.format, self.width, self.height
            )));
        }
        if self.mipmap_size != computed.mipmap_size {
            return Err(RioError::ContractViolation(format!(
                "mip chain size {} does not match {} for {} levels",
                self.mipmap_size, computed.mipmap_size, self.mip_levels
            )));
        }
        let used = (self.mip_levels - 1) as usize;
        if self.mip_level_offsets[..used] != computed.mip_level_offsets[..used] {
            return Err(RioError::ContractViolation(format!(
                "mip offsets {:?} do not match {:?}",
                &self.mip_level_offsets[..used],
                &computed.mip_level_offsets[..used]
            )));
        }
        Ok(())
    }

    pub fn level_width(&self, level: u32) -> u32 {
        (self.width >> level).max(1)
    }

    pub fn level_height(&self, level: u32) -> u32 {
        (self.height >> level).max(1)
    }

    /// Byte range of mip level `level >= 1` inside the mip chain
    pub fn mip_level_range(&self, level: u32) -> Option<Range<usize>> {
        if level == 0 || level >= self.mip_levels {
            return None;
        }
        let start = self.mip_level_offsets[(level - 1) as usize];
        let end = if level + 1 < self.mip_levels {
            self.mip_level_offsets[level as usize]
        } else {
            self.mipmap_size
        };
        Some(start as usize..end as usize)
    }
}

/// Pixel data of a surface: the base image and optional mip chain as ranges into one blob
///
/// A texture loaded from a file keeps the whole file alive and points into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceData {
    blob: Arc<[u8]>,
    image: Range<usize>,
    mipmaps: Option<Range<usize>>,
}

impl SurfaceData {
    /// Wrap regions of `blob`, rejecting ranges outside it
    pub fn new(blob: Arc<[u8]>, image: Range<usize>, mipmaps: Option<Range<usize>>) -> RioResult<Self> {
        let fits = |range: &Range<usize>| range.start <= range.end && range.end <= blob.len();
        if !fits(&image) {
            return Err(RioError::InvalidAsset(format!(
                "image region {:?} outside a {}-byte blob", image, blob.len()
            )));
        }
        if let Some(mips) = &mipmaps {
            if !fits(mips) {
                return Err(RioError::InvalidAsset(format!(
                    "mip chain region {:?} outside a {}-byte blob", mips, blob.len()
                )));
            }
        }
        Ok(Self { blob, image, mipmaps })
    }

    /// Base image followed by an optional mip chain, each in its own allocation
    pub fn from_parts(image: &[u8], mipmaps: Option<&[u8]>) -> Self {
        let mut bytes = Vec::with_capacity(image.len() + mipmaps.map_or(0, |m| m.len()));
        bytes.extend_from_slice(image);
        let mip_range = mipmaps.map(|m| {
            bytes.extend_from_slice(m);
            image.len()..image.len() + m.len()
        });
        Self {
            blob: Arc::from(bytes),
            image: 0..image.len(),
            mipmaps: mip_range,
        }
    }

    pub fn image(&self) -> &[u8] {
        &self.blob[self.image.clone()]
    }

    pub fn mipmaps(&self) -> Option<&[u8]> {
        self.mipmaps.as_ref().map(|range| &self.blob[range.clone()])
    }

    pub fn blob(&self) -> &Arc<[u8]> {
        &self.blob
    }
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
