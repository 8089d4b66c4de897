//! Unit tests for cafe_format.rs

use super::*;

#[test]
fn test_float_formats_use_hardware_codes() {
    assert_eq!(attrib_format(VertexFormat::R32_FLOAT), 0x806);
    assert_eq!(attrib_format(VertexFormat::R32G32_FLOAT), 0x80D);
    assert_eq!(attrib_format(VertexFormat::R32G32B32_FLOAT), 0x811);
    assert_eq!(attrib_format(VertexFormat::R32G32B32A32_FLOAT), 0x813);
}

#[test]
fn test_integer_and_signed_bits() {
    assert_eq!(attrib_format(VertexFormat::R8G8B8A8_UINT), 0x10A);
    assert_eq!(attrib_format(VertexFormat::R16G16_SINT), 0x307);
    assert_eq!(attrib_format(VertexFormat::R8_SINT_TO_FLOAT), 0xA00);
    assert_eq!(attrib_format(VertexFormat::R10G10B10A2_SINT), 0x30B);
}

#[test]
fn test_every_format_has_a_mask_entry() {
    for format in VertexFormat::ALL {
        let code = attrib_format(format);
        assert!(((code & 0xFF) as usize) < FORMAT_MASK.len(), "{:?}", format);
    }
}

#[test]
fn test_masks_follow_component_count() {
    assert_eq!(attrib_mask(attrib_format(VertexFormat::R32_FLOAT)), MASK_X001);
    assert_eq!(attrib_mask(attrib_format(VertexFormat::R16G16_FLOAT)), MASK_XY01);
    assert_eq!(attrib_mask(attrib_format(VertexFormat::R32G32B32_FLOAT)), MASK_XYZ1);
    assert_eq!(attrib_mask(attrib_format(VertexFormat::R8G8B8A8_UNORM)), MASK_XYZW);
    assert_eq!(attrib_mask(attrib_format(VertexFormat::R10G11B11_FLOAT)), MASK_XYZ1);
}

#[test]
fn test_num_format_classification() {
    assert_eq!(num_format(0x80D), 2);
    assert_eq!(num_format(0x10A), 1);
    assert_eq!(num_format(0x20A), 0);
    assert!(is_signed(0x30B));
    assert!(!is_signed(0x10B));
    assert_eq!(data_format(0x813), 0x13);
}
