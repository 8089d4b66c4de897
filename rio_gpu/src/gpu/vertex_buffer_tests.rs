//! Unit tests for vertex_buffer.rs

use crate::error::RioError;
use crate::graphics_device::mock_graphics_device::{mock, mock_context};
use crate::gpu::{Backend, VertexBuffer};

#[test]
fn test_slot_range() {
    let mut ctx = mock_context(Backend::Cafe);
    assert!(VertexBuffer::new(&mut ctx, 15).is_ok());
    assert!(matches!(VertexBuffer::new(&mut ctx, 16), Err(RioError::ContractViolation(_))));
}

#[test]
fn test_set_data_reallocates_only_on_size_change() {
    let mut ctx = mock_context(Backend::Gl);
    let mut buffer = VertexBuffer::new(&mut ctx, 0).unwrap();

    buffer.set_data(&mut ctx, &[0; 48], 12).unwrap();
    buffer.set_data(&mut ctx, &[1; 48], 12).unwrap();
    buffer.set_data_invalidate(&mut ctx, &[2; 96], 24).unwrap();

    assert_eq!((buffer.size(), buffer.stride()), (96, 24));
    assert_eq!(
        mock(&ctx).commands[1..],
        [
            "upload_vertex_buffer size=48 stride=12 mode=Reallocate invalidate=false",
            "upload_vertex_buffer size=48 stride=12 mode=Update invalidate=false",
            "upload_vertex_buffer size=96 stride=24 mode=Reallocate invalidate=true",
        ]
    );
}

#[test]
fn test_set_data_rejects_empty_or_zero_stride() {
    let mut ctx = mock_context(Backend::Cafe);
    let mut buffer = VertexBuffer::new(&mut ctx, 1).unwrap();
    assert!(buffer.set_data(&mut ctx, &[], 4).is_err());
    assert!(buffer.set_data(&mut ctx, &[0; 4], 0).is_err());
    assert_eq!(buffer.size(), 0);
}

// ============================================================================
// SUB DATA
// ============================================================================

#[test]
fn test_set_sub_data_within_bounds() {
    let mut ctx = mock_context(Backend::Cafe);
    let mut buffer = VertexBuffer::new(&mut ctx, 2).unwrap();
    buffer.set_data(&mut ctx, &[0; 16], 8).unwrap();

    buffer.set_sub_data(&mut ctx, 8, &[7; 8]).unwrap();

    let stored = &mock(&ctx).vertex_buffers[buffer.handle()].data;
    assert_eq!(&stored[..8], &[0; 8]);
    assert_eq!(&stored[8..], &[7; 8]);
}

#[test]
fn test_set_sub_data_out_of_bounds() {
    let mut ctx = mock_context(Backend::Cafe);
    let mut buffer = VertexBuffer::new(&mut ctx, 2).unwrap();
    buffer.set_data(&mut ctx, &[0; 16], 8).unwrap();

    let result = buffer.set_sub_data_invalidate(&mut ctx, 12, &[0; 8]);
    assert!(matches!(result, Err(RioError::ContractViolation(_))));
}
