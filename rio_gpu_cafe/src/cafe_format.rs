//! Vertex attribute formats as the fetch hardware sees them
//!
//! An attribute format code carries the data layout in its low byte and the numeric
//! interpretation in the upper bits: `0x100` integer, `0x200` signed, `0x800` scaled to float.

use rio_gpu::rio::gpu::VertexFormat;

/// Destination masks: byte 3 feeds X ... byte 0 feeds W (0..3 = source component, 4 = 0, 5 = 1)
pub const MASK_X001: u32 = 0x0004_0405;
pub const MASK_XY01: u32 = 0x0001_0405;
pub const MASK_XYZ1: u32 = 0x0001_0205;
pub const MASK_XYZW: u32 = 0x0001_0203;

/// Destination mask per data layout (`code & 0xFF`)
const FORMAT_MASK: [u32; 20] = [
    MASK_X001, MASK_XY01, MASK_X001, MASK_X001, MASK_XY01,
    MASK_X001, MASK_X001, MASK_XY01, MASK_XY01, MASK_XYZ1,
    MASK_XYZW, MASK_XYZW, MASK_XY01, MASK_XY01, MASK_XYZW,
    MASK_XYZW, MASK_XYZ1, MASK_XYZ1, MASK_XYZW, MASK_XYZW,
];

const SCALED: u32 = 0x800;
const INTEGER: u32 = 0x100;
const SIGNED: u32 = 0x200;

/// Attribute format code of a vertex format
pub fn attrib_format(format: VertexFormat) -> u32 {
    use VertexFormat::*;
    match format {
        R8_UNORM => 0x000,
        R8G8_UNORM => 0x004,
        R8G8B8A8_UNORM => 0x00A,
        R8_UINT => INTEGER,
        R8G8_UINT => INTEGER | 0x004,
        R8G8B8A8_UINT => INTEGER | 0x00A,
        R8_UINT_TO_FLOAT => SCALED,
        R8G8_UINT_TO_FLOAT => SCALED | 0x004,
        R8G8B8A8_UINT_TO_FLOAT => SCALED | 0x00A,
        R8_SNORM => SIGNED,
        R8G8_SNORM => SIGNED | 0x004,
        R8G8B8A8_SNORM => SIGNED | 0x00A,
        R8_SINT => SIGNED | INTEGER,
        R8G8_SINT => SIGNED | INTEGER | 0x004,
        R8G8B8A8_SINT => SIGNED | INTEGER | 0x00A,
        R8_SINT_TO_FLOAT => SCALED | SIGNED,
        R8G8_SINT_TO_FLOAT => SCALED | SIGNED | 0x004,
        R8G8B8A8_SINT_TO_FLOAT => SCALED | SIGNED | 0x00A,

        R10G11B11_FLOAT => SCALED | 0x009,
        R10G10B10A2_UNORM => 0x00B,
        R10G10B10A2_UINT => INTEGER | 0x00B,
        R10G10B10A2_SNORM => SIGNED | 0x00B,
        R10G10B10A2_SINT => SIGNED | INTEGER | 0x00B,

        R16_UNORM => 0x002,
        R16G16_UNORM => 0x007,
        R16G16B16A16_UNORM => 0x00E,
        R16_UINT => INTEGER | 0x002,
        R16G16_UINT => INTEGER | 0x007,
        R16G16B16A16_UINT => INTEGER | 0x00E,
        R16_UINT_TO_FLOAT => SCALED | 0x002,
        R16G16_UINT_TO_FLOAT => SCALED | 0x007,
        R16G16B16A16_UINT_TO_FLOAT => SCALED | 0x00E,
        R16_SNORM => SIGNED | 0x002,
        R16G16_SNORM => SIGNED | 0x007,
        R16G16B16A16_SNORM => SIGNED | 0x00E,
        R16_SINT => SIGNED | INTEGER | 0x002,
        R16G16_SINT => SIGNED | INTEGER | 0x007,
        R16G16B16A16_SINT => SIGNED | INTEGER | 0x00E,
        R16_SINT_TO_FLOAT => SCALED | SIGNED | 0x002,
        R16G16_SINT_TO_FLOAT => SCALED | SIGNED | 0x007,
        R16G16B16A16_SINT_TO_FLOAT => SCALED | SIGNED | 0x00E,
        R16_FLOAT => SCALED | 0x003,
        R16G16_FLOAT => SCALED | 0x008,
        R16G16B16A16_FLOAT => SCALED | 0x00F,

        R32_UINT => INTEGER | 0x005,
        R32G32_UINT => INTEGER | 0x00C,
        R32G32B32_UINT => INTEGER | 0x010,
        R32G32B32A32_UINT => INTEGER | 0x012,
        R32_SINT => SIGNED | INTEGER | 0x005,
        R32G32_SINT => SIGNED | INTEGER | 0x00C,
        R32G32B32_SINT => SIGNED | INTEGER | 0x010,
        R32G32B32A32_SINT => SIGNED | INTEGER | 0x012,
        R32_FLOAT => SCALED | 0x006,
        R32G32_FLOAT => SCALED | 0x00D,
        R32G32B32_FLOAT => SCALED | 0x011,
        R32G32B32A32_FLOAT => SCALED | 0x013,
    }
}

/// Destination mask of an attribute format code
pub fn attrib_mask(code: u32) -> u32 {
    FORMAT_MASK
        .get((code & 0xFF) as usize)
        .copied()
        .unwrap_or(MASK_XYZW)
}

/// Data layout (hardware data format) of a code
pub(crate) fn data_format(code: u32) -> u32 {
    code & 0x3F
}

/// Numeric format: 0 normalized, 1 integer, 2 scaled
pub(crate) fn num_format(code: u32) -> u32 {
    if code & SCALED != 0 {
        2
    } else if code & INTEGER != 0 {
        1
    } else {
        0
    }
}

pub(crate) fn is_signed(code: u32) -> bool {
    code & SIGNED != 0
}

#[cfg(test)]
#[path = "cafe_format_tests.rs"]
mod tests;
