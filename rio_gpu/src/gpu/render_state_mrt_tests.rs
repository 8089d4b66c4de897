//! Unit tests for render_state_mrt.rs

use crate::error::RioError;
use crate::graphics_device::mock_graphics_device::{mock, mock_context};
use crate::graphics_device::BlendTargets;
use crate::gpu::{Backend, BlendEquation, BlendFactor, RenderStateMRT};

#[test]
fn test_defaults() {
    let state = RenderStateMRT::new();
    assert_eq!(state.blend_enable_mask(), 0xFF);
    assert_eq!(state.color_mask(), 0xFFFF_FFFF);
    assert!((0..8).all(|t| state.blend_enable(t)));
    assert!(!state.blend_enable(8));
    assert_eq!(state.target_color_mask(7), Some([true; 4]));
}

// ============================================================================
// COLOR MASK
// ============================================================================

#[test]
fn test_color_mask_packs_nibble_per_target() {
    let mut state = RenderStateMRT::new();
    state.set_color_mask_packed(0);

    state.set_color_mask(0, true, false, false, true).unwrap();
    assert_eq!(state.color_mask(), 0x0000_0009);

    state.set_color_mask(3, false, true, true, false).unwrap();
    assert_eq!(state.color_mask(), 0x0000_6009);
    assert_eq!(state.target_color_mask(3), Some([false, true, true, false]));

    state.set_color_mask(0, false, false, false, false).unwrap();
    assert_eq!(state.color_mask(), 0x0000_6000);
}

#[test]
fn test_target_out_of_range_rejected() {
    let mut state = RenderStateMRT::new();
    let before = state;

    assert!(matches!(
        state.set_color_mask(8, true, true, true, true),
        Err(RioError::ContractViolation(_))
    ));
    assert!(state.set_blend_enable(8, false).is_err());
    assert!(state.set_blend_factor(9, BlendFactor::One, BlendFactor::One).is_err());
    assert!(state.set_blend_equation(8, BlendEquation::Min).is_err());
    assert_eq!(state, before);
    assert_eq!(state.target_color_mask(8), None);
    assert!(state.blend_expression(8).is_none());
}

// ============================================================================
// BLEND
// ============================================================================

#[test]
fn test_per_target_blend() {
    let mut state = RenderStateMRT::new();
    state.set_blend_enable(2, false).unwrap();
    state.set_blend_factor_separate(
        1,
        BlendFactor::One,
        BlendFactor::Zero,
        BlendFactor::SrcColor,
        BlendFactor::DstColor,
    )
    .unwrap();
    state.set_blend_equation_separate(1, BlendEquation::Sub, BlendEquation::Max).unwrap();

    assert_eq!(state.blend_enable_mask(), 0xFB);
    let expression = state.blend_expression(1).unwrap();
    assert_eq!(expression.src_rgb, BlendFactor::One);
    assert_eq!(expression.dst_alpha, BlendFactor::DstColor);
    assert_eq!(expression.equation_alpha, BlendEquation::Max);
    assert_eq!(state.blend_expression(0).unwrap().src_rgb, BlendFactor::SrcAlpha);
}

#[test]
fn test_pipeline_state_is_multiple() {
    let mut ctx = mock_context(Backend::Cafe);
    let mut state = RenderStateMRT::new();
    state.set_blend_enable_mask(0x05);
    state.set_color_mask_packed(0x0000_00F3);
    state.apply_color_mask(&mut ctx).unwrap();

    let applied = mock(&ctx).last_pipeline_state.unwrap();
    assert!(matches!(applied.blend, BlendTargets::Multiple { enable_mask: 0x05, .. }));
    assert_eq!(applied.blend.channel_mask(0), 0x3);
    assert_eq!(applied.blend.channel_mask(1), 0xF);
    assert_eq!(applied.blend.channel_mask(2), 0x0);
    assert!(applied.blend.target_enabled(2));
    assert!(!applied.blend.target_enabled(1));
    assert_eq!(mock(&ctx).commands, vec!["apply_pipeline_state groups=0x02"]);
}
