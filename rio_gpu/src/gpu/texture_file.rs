//! Packaged texture file (`.rtx`) reader and writer
//!
//! Little-endian, 0x80-byte header followed by the base image and the mip chain at the
//! offsets the header records. Offsets are relative to the start of the file.

use crate::error::{RioError, RioResult};
use crate::gpu::surface::{Surface, MIP_LEVELS_MAX};
use crate::gpu::texture_format::TextureFormat;
use crate::engine_error;

pub const TEXTURE_FILE_MAGIC: u32 = 0x5101_382D;
pub const TEXTURE_FILE_VERSION_MIN: u32 = 0x0100_0000;
pub const TEXTURE_FILE_VERSION_CURRENT: u32 = 0x0100_0000;
pub const TEXTURE_FILE_HEADER_SIZE: usize = 0x80;

const OFFSET_WIDTH: usize = 0x00;
const OFFSET_HEIGHT: usize = 0x04;
const OFFSET_MIP_LEVELS: usize = 0x08;
const OFFSET_FORMAT: usize = 0x0C;
const OFFSET_NATIVE_INTERNAL_FORMAT: usize = 0x10;
const OFFSET_NATIVE_FORMAT: usize = 0x14;
const OFFSET_NATIVE_TYPE: usize = 0x18;
const OFFSET_IMAGE_SIZE: usize = 0x1C;
const OFFSET_IMAGE_OFFSET: usize = 0x20;
const OFFSET_MIPMAP_SIZE: usize = 0x24;
const OFFSET_MIPMAP_OFFSET: usize = 0x28;
const OFFSET_MIP_LEVEL_OFFSETS: usize = 0x2C;
const OFFSET_COMP_MAP: usize = 0x70;
const OFFSET_MAGIC: usize = 0x74;
const OFFSET_VERSION: usize = 0x78;

/// GL upload triple stored in the file (zero when the file was written for Cafe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeFormat {
    pub internal_format: i32,
    pub format: u32,
    pub ty: u32,
}

/// Parsed `.rtx` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureFile {
    pub surface: Surface,
    pub comp_map: u32,
    pub native_format: NativeFormat,
    pub image_offset: u32,
    pub mipmap_offset: u32,
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn invalid(message: String) -> RioError {
    engine_error!("rio::gpu::TextureFile", "{}", message);
    RioError::InvalidAsset(message)
}

impl TextureFile {
    /// Parse and validate the header of a packaged texture
    ///
    /// The recorded sizes and mip offsets must match the layout computed from format,
    /// width, height and mip count, and the image and mip-chain regions must lie inside
    /// `bytes`.
    pub fn parse(bytes: &[u8]) -> RioResult<TextureFile> {
        if bytes.len() < TEXTURE_FILE_HEADER_SIZE {
            return Err(invalid(format!(
                "texture file is {} bytes, shorter than its 0x80-byte header", bytes.len()
            )));
        }

        let magic = read_u32(bytes, OFFSET_MAGIC);
        if magic != TEXTURE_FILE_MAGIC {
            return Err(invalid(format!("bad texture magic {:#010X}", magic)));
        }

        let version = read_u32(bytes, OFFSET_VERSION);
        if !(TEXTURE_FILE_VERSION_MIN..=TEXTURE_FILE_VERSION_CURRENT).contains(&version) {
            return Err(invalid(format!("unsupported texture version {:#010X}", version)));
        }

        let raw_format = read_u32(bytes, OFFSET_FORMAT);
        let format = TextureFormat::from_raw(raw_format)
            .ok_or_else(|| invalid(format!("unknown texture format code {:#X}", raw_format)))?;

        let mip_levels = read_u32(bytes, OFFSET_MIP_LEVELS);
        if mip_levels == 0 || mip_levels > MIP_LEVELS_MAX {
            return Err(invalid(format!("mip level count {} outside 1..=14", mip_levels)));
        }

        let mut mip_level_offsets = [0u32; 13];
        for (i, offset) in mip_level_offsets.iter_mut().enumerate() {
            *offset = read_u32(bytes, OFFSET_MIP_LEVEL_OFFSETS + i * 4);
        }

        let surface = Surface {
            width: read_u32(bytes, OFFSET_WIDTH),
            height: read_u32(bytes, OFFSET_HEIGHT),
            mip_levels,
            format,
            image_size: read_u32(bytes, OFFSET_IMAGE_SIZE),
            mipmap_size: read_u32(bytes, OFFSET_MIPMAP_SIZE),
            mip_level_offsets,
        };

        let file = TextureFile {
            surface,
            comp_map: read_u32(bytes, OFFSET_COMP_MAP),
            native_format: NativeFormat {
                internal_format: read_u32(bytes, OFFSET_NATIVE_INTERNAL_FORMAT) as i32,
                format: read_u32(bytes, OFFSET_NATIVE_FORMAT),
                ty: read_u32(bytes, OFFSET_NATIVE_TYPE),
            },
            image_offset: read_u32(bytes, OFFSET_IMAGE_OFFSET),
            mipmap_offset: read_u32(bytes, OFFSET_MIPMAP_OFFSET),
        };

        surface.check_layout().map_err(|err| match err {
            RioError::ContractViolation(detail) => invalid(format!("texture header: {}", detail)),
            other => other,
        })?;

        let image_end = file.image_offset as u64 + surface.image_size as u64;
        if image_end > bytes.len() as u64 {
            return Err(invalid(format!(
                "image region ends at {:#X} beyond a {:#X}-byte file", image_end, bytes.len()
            )));
        }
        if surface.mip_levels > 1 {
            let mip_end = file.mipmap_offset as u64 + surface.mipmap_size as u64;
            if mip_end > bytes.len() as u64 {
                return Err(invalid(format!(
                    "mip chain ends at {:#X} beyond a {:#X}-byte file", mip_end, bytes.len()
                )));
            }
        }

        Ok(file)
    }

    /// Byte range of the base image in the file
    pub fn image_range(&self) -> std::ops::Range<usize> {
        let start = self.image_offset as usize;
        start..start + self.surface.image_size as usize
    }

    /// Byte range of the mip chain in the file, `None` for single-level surfaces
    pub fn mipmap_range(&self) -> Option<std::ops::Range<usize>> {
        if self.surface.mip_levels <= 1 {
            return None;
        }
        let start = self.mipmap_offset as usize;
        Some(start..start + self.surface.mipmap_size as usize)
    }

    /// Package a surface: header, base image, then the mip chain
    pub fn write(
        surface: &Surface,
        comp_map: u32,
        native_format: NativeFormat,
        image: &[u8],
        mipmaps: Option<&[u8]>,
    ) -> RioResult<Vec<u8>> {
        surface.check_layout()?;
        if image.len() != surface.image_size as usize {
            return Err(RioError::ContractViolation(format!(
                "image is {} bytes, surface expects {}", image.len(), surface.image_size
            )));
        }
        let mipmaps = mipmaps.unwrap_or(&[]);
        let expected_mips = if surface.mip_levels > 1 { surface.mipmap_size as usize } else { 0 };
        if mipmaps.len() != expected_mips {
            return Err(RioError::ContractViolation(format!(
                "mip chain is {} bytes, surface expects {}", mipmaps.len(), expected_mips
            )));
        }

        let image_offset = TEXTURE_FILE_HEADER_SIZE;
        let mipmap_offset = image_offset + image.len();
        let mut bytes = vec![0u8; mipmap_offset + mipmaps.len()];

        write_u32(&mut bytes, OFFSET_WIDTH, surface.width);
        write_u32(&mut bytes, OFFSET_HEIGHT, surface.height);
        write_u32(&mut bytes, OFFSET_MIP_LEVELS, surface.mip_levels);
        write_u32(&mut bytes, OFFSET_FORMAT, surface.format.raw());
        write_u32(&mut bytes, OFFSET_NATIVE_INTERNAL_FORMAT, native_format.internal_format as u32);
        write_u32(&mut bytes, OFFSET_NATIVE_FORMAT, native_format.format);
        write_u32(&mut bytes, OFFSET_NATIVE_TYPE, native_format.ty);
        write_u32(&mut bytes, OFFSET_IMAGE_SIZE, surface.image_size);
        write_u32(&mut bytes, OFFSET_IMAGE_OFFSET, image_offset as u32);
        write_u32(&mut bytes, OFFSET_MIPMAP_SIZE, expected_mips as u32);
        write_u32(
            &mut bytes,
            OFFSET_MIPMAP_OFFSET,
            if expected_mips > 0 { mipmap_offset as u32 } else { 0 },
        );
        for (i, offset) in surface.mip_level_offsets.iter().enumerate() {
            write_u32(&mut bytes, OFFSET_MIP_LEVEL_OFFSETS + i * 4, *offset);
        }
        write_u32(&mut bytes, OFFSET_COMP_MAP, comp_map);
        write_u32(&mut bytes, OFFSET_MAGIC, TEXTURE_FILE_MAGIC);
        write_u32(&mut bytes, OFFSET_VERSION, TEXTURE_FILE_VERSION_CURRENT);

        bytes[image_offset..mipmap_offset].copy_from_slice(image);
        bytes[mipmap_offset..].copy_from_slice(mipmaps);
        Ok(bytes)
    }
}

#[cfg(test)]
#[path = "texture_file_tests.rs"]
mod tests;
