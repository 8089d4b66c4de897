//! Unit tests for render_buffer.rs

use glam::Vec4;
use crate::context::GraphicsContext;
use crate::graphics_device::mock_graphics_device::{mock, mock_context, mock_mut};
use crate::graphics_device::ClearFlags;
use crate::gpu::{
    Backend, RenderBuffer, RenderTargetColor, RenderTargetDepth, Scissor, Texture2D,
    TextureFormat, Viewport,
};

// ============================================================================
// HELPERS
// ============================================================================

fn color_target(ctx: &mut GraphicsContext, width: u32, height: u32) -> RenderTargetColor {
    let texture = Texture2D::new_empty(ctx, TextureFormat::R8G8B8A8_UNORM, width, height, 1).unwrap();
    let mut target = RenderTargetColor::new(ctx).unwrap();
    target.link_texture_2d(ctx, &texture).unwrap();
    target
}

fn depth_target(ctx: &mut GraphicsContext, width: u32, height: u32) -> RenderTargetDepth {
    let texture = Texture2D::new_empty(ctx, TextureFormat::D24_S8_UNORM, width, height, 1).unwrap();
    let mut target = RenderTargetDepth::new(ctx).unwrap();
    target.link_texture_2d(ctx, &texture).unwrap();
    target
}

fn full_buffer(ctx: &mut GraphicsContext) -> RenderBuffer {
    let mut buffer = RenderBuffer::with_size(ctx, 32, 16).unwrap();
    let target = color_target(ctx, 32, 16);
    buffer.set_render_target_color(target, 0).unwrap();
    let target = color_target(ctx, 32, 16);
    buffer.set_render_target_color(target, 2).unwrap();
    let depth = depth_target(ctx, 32, 16);
    buffer.set_render_target_depth(depth);
    mock_mut(ctx).clear_commands();
    buffer
}

// ============================================================================
// SIZE
// ============================================================================

#[test]
fn test_default_size_and_scissor_reset() {
    let mut ctx = mock_context(Backend::Cafe);
    let mut buffer = RenderBuffer::new(&mut ctx).unwrap();
    assert_eq!(buffer.size(), (1, 1));

    buffer.set_scissor(Scissor { x: 1, y: 1, width: 0, height: 0 });
    buffer.set_size(640, 480);
    assert_eq!(buffer.scissor(), Scissor::full(640, 480));
}

#[test]
fn test_color_index_out_of_range() {
    let mut ctx = mock_context(Backend::Cafe);
    let mut buffer = RenderBuffer::new(&mut ctx).unwrap();
    let target = color_target(&mut ctx, 4, 4);
    assert!(buffer.set_render_target_color(target, 8).is_err());
    assert!(buffer.render_target_color(8).is_none());
}

// ============================================================================
// BIND
// ============================================================================

#[test]
fn test_bind_sequence() {
    let mut ctx = mock_context(Backend::Gl);
    let mut buffer = full_buffer(&mut ctx);

    buffer.bind(&mut ctx).unwrap();

    assert_eq!(
        mock(&ctx).commands,
        vec![
            "set_viewport 0 0 32 16 0 1",
            "set_scissor 0 0 32 16",
            "bind_render_buffer",
            "init_color_target mip=0",
            "bind_color_target index=0",
            "init_color_target mip=0",
            "bind_color_target index=2",
            "set_draw_buffers mask=0x05",
            "init_depth_target mip=0",
            "bind_depth_target",
        ]
    );
    assert_eq!(ctx.viewport(), Some(Viewport::full(32, 16)));
}

// ============================================================================
// CLEAR
// ============================================================================

#[test]
fn test_clear_drops_depth_for_nonzero_index() {
    let mut ctx = mock_context(Backend::Cafe);
    let mut buffer = full_buffer(&mut ctx);

    buffer.clear(&mut ctx, 2, ClearFlags::ALL, Vec4::ZERO, 1.0, 0).unwrap();

    let clears: Vec<_> = mock(&ctx).commands.iter().filter(|c| c.starts_with("clear")).cloned().collect();
    assert_eq!(clears, vec!["clear flags=0x1 color_index=Some(2) depth=false"]);
}

#[test]
fn test_clear_drops_missing_color() {
    let mut ctx = mock_context(Backend::Cafe);
    let mut buffer = full_buffer(&mut ctx);

    buffer.clear(&mut ctx, 1, ClearFlags::COLOR, Vec4::ONE, 1.0, 0).unwrap();
    assert!(mock(&ctx).commands.is_empty());

    buffer.clear_all(&mut ctx, Vec4::ONE).unwrap();
    assert_eq!(
        mock(&ctx).commands.last().unwrap(),
        "clear flags=0x7 color_index=Some(0) depth=true"
    );
}

#[test]
fn test_clear_depth_only() {
    let mut ctx = mock_context(Backend::Cafe);
    let mut buffer = RenderBuffer::with_size(&mut ctx, 8, 8).unwrap();
    let depth = depth_target(&mut ctx, 8, 8);
    buffer.set_render_target_depth(depth);
    mock_mut(&mut ctx).clear_commands();

    buffer.clear(&mut ctx, 0, ClearFlags::ALL, Vec4::ZERO, 0.5, 3).unwrap();
    assert_eq!(
        mock(&ctx).commands,
        vec!["init_depth_target mip=0", "clear flags=0x6 color_index=None depth=true"]
    );
}

#[test]
fn test_clear_restores_viewport_and_scissor() {
    let mut ctx = mock_context(Backend::Gl);
    let mut buffer = full_buffer(&mut ctx);
    ctx.set_viewport(Viewport::full(100, 50)).unwrap();
    ctx.set_scissor(Scissor::full(100, 50)).unwrap();
    mock_mut(&mut ctx).clear_commands();

    buffer.clear(&mut ctx, 0, ClearFlags::COLOR, Vec4::ZERO, 1.0, 0).unwrap();

    let commands = &mock(&ctx).commands;
    assert_eq!(commands[commands.len() - 2], "set_viewport 0 0 100 50 0 1");
    assert_eq!(commands[commands.len() - 1], "set_scissor 0 0 100 50");
}

// ============================================================================
// READ / DESTROY
// ============================================================================

#[test]
fn test_read() {
    let mut ctx = mock_context(Backend::Gl);
    let mut buffer = full_buffer(&mut ctx);
    let mut pixels = vec![0u8; 32 * 16 * 4];

    assert!(buffer.read(&mut ctx, 0, &mut pixels).unwrap());
    assert!(pixels.iter().all(|p| *p == 0xAB));
    assert!(!buffer.read(&mut ctx, 1, &mut pixels).unwrap());

    let mut small = vec![0u8; 16];
    assert!(buffer.read(&mut ctx, 2, &mut small).is_err());
}

#[test]
fn test_destroy_releases_owned_targets() {
    let mut ctx = mock_context(Backend::Cafe);
    let buffer = full_buffer(&mut ctx);
    buffer.destroy(&mut ctx).unwrap();

    let device = mock(&ctx);
    assert!(device.color_targets.is_empty());
    assert!(device.depth_targets.is_empty());
    assert!(device.render_buffers.is_empty());
}
