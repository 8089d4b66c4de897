//! Unit tests for gx2.rs
//!
//! Pure enum translations, no device involved.

use super::*;
use glam::Vec4;

// ============================================================================
// PIPELINE ENUMS
// ============================================================================

#[test]
fn test_compare_func_is_ordered_like_the_hardware() {
    assert_eq!(compare_func(CompareFunc::Never), 0);
    assert_eq!(compare_func(CompareFunc::LessEqual), 3);
    assert_eq!(compare_func(CompareFunc::NotEqual), 5);
    assert_eq!(compare_func(CompareFunc::Always), 7);
}

#[test]
fn test_stencil_functions() {
    assert_eq!(stencil_function(StencilOp::Keep), 0);
    assert_eq!(stencil_function(StencilOp::Incr), 3);
    assert_eq!(stencil_function(StencilOp::Invert), 5);
    assert_eq!(stencil_function(StencilOp::DecrWrap), 7);
}

#[test]
fn test_constant_blend_factors_use_src1_modes() {
    assert_eq!(blend_mode(BlendFactor::SrcAlpha), 4);
    assert_eq!(blend_mode(BlendFactor::OneMinusSrcAlpha), 5);
    assert_eq!(blend_mode(BlendFactor::ConstantColor), 15);
    assert_eq!(blend_mode(BlendFactor::OneMinusConstantAlpha), 18);
}

#[test]
fn test_blend_combine_and_polygon_modes() {
    assert_eq!(blend_combine_mode(BlendEquation::ReverseSub), 4);
    assert_eq!(polygon_mode(PolygonMode::Fill), 2);
    assert_eq!(polygon_mode(PolygonMode::Point), 0);
}

// ============================================================================
// SAMPLER ENUMS
// ============================================================================

#[test]
fn test_tex_clamp_modes() {
    assert_eq!(tex_clamp(TexWrapMode::Repeat), 0);
    assert_eq!(tex_clamp(TexWrapMode::Clamp), 2);
    assert_eq!(tex_clamp(TexWrapMode::MirrorOnceBorder), 7);
}

#[test]
fn test_border_type_from_color() {
    assert_eq!(tex_border_type(Vec4::new(0.0, 0.0, 0.0, 1.0)), TEX_BORDER_BLACK);
    assert_eq!(tex_border_type(Vec4::ONE), TEX_BORDER_WHITE);
    assert_eq!(tex_border_type(Vec4::ZERO), TEX_BORDER_TRANSPARENT_BLACK);
    assert_eq!(tex_border_type(Vec4::new(0.5, 0.0, 0.0, 1.0)), TEX_BORDER_VARIABLE);
}

#[test]
fn test_invalidate_cpu_variants_include_cpu_bit() {
    assert_eq!(Gx2Invalidate::CPU_UNIFORM_BLOCK.bits(), 0x44);
    assert_eq!(Gx2Invalidate::CPU_ATTRIBUTE_BUFFER.bits(), 0x41);
    assert!(Gx2Invalidate::CPU_SHADER.contains(Gx2Invalidate::SHADER));
}

// ============================================================================
// DRAW ENUMS
// ============================================================================

#[test]
fn test_primitive_modes_and_index_types() {
    assert_eq!(primitive_mode(PrimitiveMode::Triangles), 0x04);
    assert_eq!(primitive_mode(PrimitiveMode::TriangleStrip), 0x06);
    assert_eq!(primitive_mode(PrimitiveMode::LineLoop), 0x12);
    assert_eq!(index_type(IndexFormat::U16), 4);
    assert_eq!(index_type(IndexFormat::U32), 9);
}

#[test]
fn test_heap_alignments_match_core_layer() {
    assert_eq!(VERTEX_BUFFER_ALIGNMENT, 0x40);
    assert_eq!(INDEX_BUFFER_ALIGNMENT, 0x20);
    assert_eq!(UNIFORM_BLOCK_ALIGNMENT, 0x100);
}
