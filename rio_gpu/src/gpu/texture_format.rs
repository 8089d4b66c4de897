//! Pixel formats and their fixed properties
//!
//! Format codes are the console surface-format codes: the low 6 bits select the bit-depth
//! family and the upper bits the numeric interpretation (`0x100` uint, `0x200` snorm,
//! `0x300` sint, `0x400` sRGB, `0x800` float depth). Every query here is a pure function of
//! the code, plus the backend for the render-target capability queries.

use crate::gpu::graphics::Backend;

/// Texture pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum TextureFormat {
    R8_UNORM = 0x001,
    R8_UINT = 0x101,
    R8_SNORM = 0x201,
    R8_SINT = 0x301,
    DEPTH_R16_UNORM = 0x005,
    R8G8_UNORM = 0x007,
    R8G8_UINT = 0x107,
    R8G8_SNORM = 0x207,
    R8G8_SINT = 0x307,
    R5G6B5_UNORM = 0x008,
    R5G5B5A1_UNORM = 0x00A,
    R4G4B4A4_UNORM = 0x00B,
    R32_UINT = 0x10D,
    DEPTH_R32_FLOAT = 0x80E,
    D24_S8_UNORM = 0x011,
    D24_S8_FLOAT = 0x811,
    R10G10B10A2_UNORM = 0x019,
    R10G10B10A2_UINT = 0x119,
    R8G8B8A8_UNORM = 0x01A,
    R8G8B8A8_UINT = 0x11A,
    R8G8B8A8_SNORM = 0x21A,
    R8G8B8A8_SINT = 0x31A,
    R8G8B8A8_SRGB = 0x41A,
    D32_FLOAT_S8_UINT_X24 = 0x81C,
    BC1_UNORM = 0x031,
    BC1_SRGB = 0x431,
    BC2_UNORM = 0x032,
    BC2_SRGB = 0x432,
    BC3_UNORM = 0x033,
    BC3_SRGB = 0x433,
    BC4_UNORM = 0x034,
    BC4_SNORM = 0x234,
    BC5_UNORM = 0x035,
    BC5_SNORM = 0x235,
}

/// Default component maps, indexed by `code & 0x3F`
///
/// Byte 3 selects the red source, byte 0 the alpha source: 0..3 = R,G,B,A, 4 = zero, 5 = one.
const DEFAULT_COMP_MAP: [u32; 54] = [
    0x04040405, 0x00040405, 0x00010405, 0x04040405,
    0x04040405, 0x00040405, 0x00040405, 0x00010405,
    0x00010205, 0x00010205, 0x00010203, 0x00010203,
    0x03020100, 0x00040405, 0x00040405, 0x00010405,
    0x00010405, 0x04040405, 0x04040405, 0x04040405,
    0x04040405, 0x04040405, 0x00010205, 0x04040405,
    0x04040405, 0x00010203, 0x00010203, 0x03020100,
    0x00010405, 0x00010405, 0x00010405, 0x00010203,
    0x00010203, 0x04040405, 0x00010203, 0x00010203,
    0x04040405, 0x04040405, 0x04040405, 0x00010205,
    0x00010205, 0x00040405, 0x00010405, 0x00010205,
    0x04040405, 0x04040405, 0x04040405, 0x00010205,
    0x00010205, 0x00010203, 0x00010203, 0x00010203,
    0x00040405, 0x00010405,
];

/// Component selector values stored in each byte of a component map
pub const COMPONENT_R: u8 = 0;
pub const COMPONENT_G: u8 = 1;
pub const COMPONENT_B: u8 = 2;
pub const COMPONENT_A: u8 = 3;
pub const COMPONENT_ZERO: u8 = 4;
pub const COMPONENT_ONE: u8 = 5;

/// Pack four component selectors (red source first) into a component map
pub const fn comp_map(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32
}

/// Split a component map into its (red, green, blue, alpha) source selectors
pub fn comp_map_components(map: u32) -> [u8; 4] {
    map.to_be_bytes()
}

impl TextureFormat {
    /// Every format, in code order of the families
    pub const ALL: [TextureFormat; 34] = [
        TextureFormat::R8_UNORM,
        TextureFormat::R8_UINT,
        TextureFormat::R8_SNORM,
        TextureFormat::R8_SINT,
        TextureFormat::DEPTH_R16_UNORM,
        TextureFormat::R8G8_UNORM,
        TextureFormat::R8G8_UINT,
        TextureFormat::R8G8_SNORM,
        TextureFormat::R8G8_SINT,
        TextureFormat::R5G6B5_UNORM,
        TextureFormat::R5G5B5A1_UNORM,
        TextureFormat::R4G4B4A4_UNORM,
        TextureFormat::R32_UINT,
        TextureFormat::DEPTH_R32_FLOAT,
        TextureFormat::D24_S8_UNORM,
        TextureFormat::D24_S8_FLOAT,
        TextureFormat::R10G10B10A2_UNORM,
        TextureFormat::R10G10B10A2_UINT,
        TextureFormat::R8G8B8A8_UNORM,
        TextureFormat::R8G8B8A8_UINT,
        TextureFormat::R8G8B8A8_SNORM,
        TextureFormat::R8G8B8A8_SINT,
        TextureFormat::R8G8B8A8_SRGB,
        TextureFormat::D32_FLOAT_S8_UINT_X24,
        TextureFormat::BC1_UNORM,
        TextureFormat::BC1_SRGB,
        TextureFormat::BC2_UNORM,
        TextureFormat::BC2_SRGB,
        TextureFormat::BC3_UNORM,
        TextureFormat::BC3_SRGB,
        TextureFormat::BC4_UNORM,
        TextureFormat::BC4_SNORM,
        TextureFormat::BC5_UNORM,
        TextureFormat::BC5_SNORM,
    ];

    /// Decode a format code, rejecting unknown codes
    pub fn from_raw(raw: u32) -> Option<TextureFormat> {
        Self::ALL.iter().copied().find(|format| format.raw() == raw)
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Bytes per pixel, or per 4×4 block for compressed formats
    pub fn pixel_byte_size(self) -> u32 {
        use TextureFormat::*;
        match self {
            R8_UNORM | R8_UINT | R8_SNORM | R8_SINT => 1,

            DEPTH_R16_UNORM
            | R8G8_UNORM | R8G8_UINT | R8G8_SNORM | R8G8_SINT
            | R5G6B5_UNORM | R5G5B5A1_UNORM | R4G4B4A4_UNORM => 2,

            R32_UINT | DEPTH_R32_FLOAT
            | D24_S8_UNORM | D24_S8_FLOAT
            | R10G10B10A2_UNORM | R10G10B10A2_UINT
            | R8G8B8A8_UNORM | R8G8B8A8_UINT | R8G8B8A8_SNORM | R8G8B8A8_SINT | R8G8B8A8_SRGB => 4,

            D32_FLOAT_S8_UINT_X24
            | BC1_UNORM | BC1_SRGB
            | BC4_UNORM | BC4_SNORM => 8,

            BC2_UNORM | BC2_SRGB
            | BC3_UNORM | BC3_SRGB
            | BC5_UNORM | BC5_SNORM => 16,
        }
    }

    /// Block-compressed (BC1..BC5)
    pub fn is_compressed(self) -> bool {
        use TextureFormat::*;
        matches!(
            self,
            BC1_UNORM | BC1_SRGB | BC2_UNORM | BC2_SRGB | BC3_UNORM | BC3_SRGB
                | BC4_UNORM | BC4_SNORM | BC5_UNORM | BC5_SNORM
        )
    }

    pub fn is_usable_as_render_target_color(self, backend: Backend) -> bool {
        use TextureFormat::*;
        match self {
            R8_UNORM | R8_UINT | R8_SNORM | R8_SINT
            | R8G8_UNORM | R8G8_UINT | R8G8_SNORM | R8G8_SINT
            | R5G6B5_UNORM | R5G5B5A1_UNORM | R4G4B4A4_UNORM
            | R32_UINT
            | R8G8B8A8_UNORM | R8G8B8A8_UINT | R8G8B8A8_SNORM | R8G8B8A8_SINT | R8G8B8A8_SRGB
            | R10G10B10A2_UNORM | R10G10B10A2_UINT => true,
            DEPTH_R16_UNORM | DEPTH_R32_FLOAT => backend == Backend::Cafe,
            _ => false,
        }
    }

    pub fn is_usable_as_render_target_depth(self, backend: Backend) -> bool {
        use TextureFormat::*;
        match self {
            DEPTH_R16_UNORM | DEPTH_R32_FLOAT | D24_S8_UNORM | D32_FLOAT_S8_UINT_X24 => true,
            D24_S8_FLOAT => backend == Backend::Cafe,
            _ => false,
        }
    }

    pub fn has_stencil(self, backend: Backend) -> bool {
        use TextureFormat::*;
        match self {
            D24_S8_UNORM | D32_FLOAT_S8_UINT_X24 => true,
            D24_S8_FLOAT => backend == Backend::Cafe,
            _ => false,
        }
    }

    /// Swizzle a texture of this format gets unless told otherwise
    pub fn default_comp_map(self) -> u32 {
        DEFAULT_COMP_MAP[(self.raw() & 0x3F) as usize]
    }
}

#[cfg(test)]
#[path = "texture_format_tests.rs"]
mod tests;
