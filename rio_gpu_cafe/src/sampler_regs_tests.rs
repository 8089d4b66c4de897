//! Unit tests for sampler_regs.rs

use super::*;

#[test]
fn test_init_clamp_linear() {
    let regs = SamplerRegs::init(TexWrapMode::Clamp, TexXYFilterMode::Linear);
    assert_eq!(regs.clamp_x(), 2);
    assert_eq!(regs.clamp_y(), 2);
    assert_eq!(regs.clamp_z(), 2);
    assert_eq!(regs.mag_filter(), 1);
    assert_eq!(regs.min_filter(), 1);
    assert_eq!(regs.aniso_ratio(), 0);
    assert!(!regs.has_border);
}

#[test]
fn test_fields_do_not_overlap() {
    let mut regs = SamplerRegs::init(TexWrapMode::Repeat, TexXYFilterMode::Point);
    regs.set_clamping(TexWrapMode::MirrorOnceBorder, TexWrapMode::Repeat, TexWrapMode::Mirror);
    regs.set_depth_compare(CompareFunc::Always);
    regs.set_zm_filter(TexMipFilterMode::Linear);
    assert_eq!(regs.clamp_x(), 7);
    assert_eq!(regs.clamp_y(), 0);
    assert_eq!(regs.clamp_z(), 1);
    assert_eq!(regs.depth_compare(), 7);
    assert_eq!(regs.mip_filter(), 2);
    assert_eq!(regs.mag_filter(), 0);
}

#[test]
fn test_anisotropy_sets_filter_bit() {
    let mut regs = SamplerRegs::init(TexWrapMode::Clamp, TexXYFilterMode::Linear);
    regs.set_xy_filter(TexXYFilterMode::Linear, TexXYFilterMode::Point, TexAnisoRatio::Ratio8To1);
    assert_eq!(regs.mag_filter(), 3);
    assert_eq!(regs.min_filter(), 2);
    assert_eq!(regs.aniso_ratio(), 3);
}

#[test]
fn test_variable_border_marks_has_border() {
    let mut regs = SamplerRegs::init(TexWrapMode::Clamp, TexXYFilterMode::Linear);
    regs.set_border_type(gx2::TEX_BORDER_VARIABLE);
    assert!(regs.has_border);
    assert_eq!(regs.border_type(), 3);
    regs.set_border_type(gx2::TEX_BORDER_WHITE);
    assert!(!regs.has_border);
}

#[test]
fn test_lod_fixed_point() {
    let mut regs = SamplerRegs::init(TexWrapMode::Clamp, TexXYFilterMode::Linear);
    regs.set_lod(1.5, 20.0, -1.0);
    assert_eq!(regs.min_lod_raw(), 96);
    assert_eq!(regs.max_lod_raw(), 1023);
    assert_eq!(regs.lod_bias_raw(), 0xFC0);
}
