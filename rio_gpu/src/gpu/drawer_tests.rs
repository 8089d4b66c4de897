//! Unit tests for drawer.rs

use crate::error::RioError;
use crate::graphics_device::mock_graphics_device::{mock, mock_context};
use crate::gpu::{Backend, Drawer, Indices, PrimitiveMode};
use crate::gpu::{INDEX_ALIGNMENT, UNIFORM_BLOCK_ALIGNMENT, VERTEX_ALIGNMENT};

// ============================================================================
// ARRAYS
// ============================================================================

#[test]
fn test_draw_arrays_is_single_instance() {
    let mut ctx = mock_context(Backend::Cafe);
    Drawer::draw_arrays(&mut ctx, PrimitiveMode::TriangleStrip, 4, 0).unwrap();
    Drawer::draw_arrays_instanced(&mut ctx, PrimitiveMode::Triangles, 6, 10, 3).unwrap();

    assert_eq!(
        mock(&ctx).commands,
        vec![
            "draw_arrays TriangleStrip first=0 count=4 instances=1",
            "draw_arrays Triangles first=3 count=6 instances=10",
        ]
    );
}

#[test]
fn test_draw_arrays_rejects_overflowing_range() {
    let mut ctx = mock_context(Backend::Gl);
    let result = Drawer::draw_arrays(&mut ctx, PrimitiveMode::Points, 2, u32::MAX);
    assert!(matches!(result, Err(RioError::ContractViolation(_))));
    assert!(mock(&ctx).commands.is_empty());
}

// ============================================================================
// ELEMENTS
// ============================================================================

#[test]
fn test_draw_elements_passes_requested_prefix() {
    let mut ctx = mock_context(Backend::Gl);
    let indices: [u16; 6] = [0, 1, 2, 2, 1, 3];

    Drawer::draw_elements(&mut ctx, PrimitiveMode::Triangles, 3, &indices[..]).unwrap();

    assert_eq!(mock(&ctx).commands, vec!["draw_elements Triangles U16 count=3 instances=1"]);
    assert_eq!(mock(&ctx).last_indices, Some(vec![0, 1, 2]));
}

#[test]
fn test_draw_elements_instanced_u32() {
    let mut ctx = mock_context(Backend::Cafe);
    let indices: Vec<u32> = vec![7, 8, 9, 70000];

    Drawer::draw_elements_instanced(&mut ctx, PrimitiveMode::LineStrip, 4, indices.as_slice(), 5).unwrap();

    assert_eq!(mock(&ctx).commands, vec!["draw_elements LineStrip U32 count=4 instances=5"]);
    assert_eq!(mock(&ctx).last_indices, Some(indices));
}

#[test]
fn test_draw_elements_rejects_short_index_array() {
    let mut ctx = mock_context(Backend::Cafe);
    let indices: [u16; 3] = [0, 1, 2];

    let result = Drawer::draw_elements(&mut ctx, PrimitiveMode::Triangles, 6, &indices[..]);

    assert!(matches!(result, Err(RioError::ContractViolation(_))));
    assert!(mock(&ctx).commands.is_empty());
}

#[test]
fn test_index_bytes_follow_requested_order() {
    let indices = Indices::U16(&[0x0102, 0x0304]);
    assert_eq!(indices.to_bytes(true), vec![0x01, 0x02, 0x03, 0x04]);
    assert_eq!(indices.to_bytes(false), vec![0x02, 0x01, 0x04, 0x03]);
    assert_eq!(Indices::U32(&[1]).to_bytes(true), vec![0, 0, 0, 1]);
    assert_eq!(indices.first(3), None);
}

#[test]
fn test_alignment_constants() {
    assert_eq!(VERTEX_ALIGNMENT, 0x40);
    assert_eq!(INDEX_ALIGNMENT, 0x20);
    assert_eq!(UNIFORM_BLOCK_ALIGNMENT, 0x100);
}
