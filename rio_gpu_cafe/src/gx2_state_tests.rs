//! Unit tests for gx2_state.rs

use super::*;

#[test]
fn test_commands_are_recorded_in_call_order() {
    let mut gx2 = Gx2Context::new();
    gx2.set_shader_mode_ex(1);
    gx2.set_alpha_to_mask(false);
    gx2.draw_done();

    let commands = gx2.commands();
    assert_eq!(commands.len(), 3);
    assert!(matches!(
        commands[0],
        Gx2Command::SetShaderModeEx { mode: 1, vs_gprs: 48, vs_stack: 64, ps_gprs: 200, ps_stack: 192, .. }
    ));
    assert_eq!(commands[1], Gx2Command::SetAlphaToMask { enable: false });
    assert_eq!(commands[2], Gx2Command::DrawDone);
    assert_eq!(gx2.registers().shader_mode, Some(1));
}

#[test]
fn test_take_commands_keeps_registers() {
    let mut gx2 = Gx2Context::new();
    gx2.set_target_channel_masks([0xF, 0, 0, 0, 0, 0, 0, 0]);
    let taken = gx2.take_commands();
    assert_eq!(taken.len(), 1);
    assert!(gx2.commands().is_empty());
    assert_eq!(gx2.registers().channel_masks[0], 0xF);
}

// ============================================================================
// UNIFORM REGISTERS
// ============================================================================

#[test]
fn test_uniform_reg_writes_land_at_offset() {
    let mut gx2 = Gx2Context::new();
    gx2.set_uniform_reg(Gx2Stage::Pixel, 8, &[1, 2, 3, 4]).unwrap();
    let regs = gx2.registers().uniform_regs(Gx2Stage::Pixel);
    assert_eq!(&regs[8..12], &[1, 2, 3, 4]);
    assert_eq!(regs[7], 0);
    assert!(gx2.registers().uniform_regs(Gx2Stage::Vertex).iter().all(|w| *w == 0));
}

#[test]
fn test_uniform_reg_overrun_is_rejected() {
    let mut gx2 = Gx2Context::new();
    let result = gx2.set_uniform_reg(Gx2Stage::Vertex, 1022, &[0; 4]);
    assert!(matches!(result, Err(RioError::ContractViolation(_))));
    assert!(gx2.commands().is_empty());
}

// ============================================================================
// BINDING TABLES
// ============================================================================

#[test]
fn test_texture_and_sampler_units_are_per_stage() {
    let mut gx2 = Gx2Context::new();
    gx2.set_texture(Gx2Stage::Vertex, 3, 0x1000).unwrap();
    gx2.set_sampler(Gx2Stage::Pixel, 3, [1, 2, 3]).unwrap();
    assert_eq!(gx2.registers().texture(Gx2Stage::Vertex, 3), Some(0x1000));
    assert_eq!(gx2.registers().texture(Gx2Stage::Pixel, 3), None);
    assert_eq!(gx2.registers().sampler(Gx2Stage::Pixel, 3), Some([1, 2, 3]));
    assert!(gx2.set_texture(Gx2Stage::Pixel, 18, 0).is_err());
}

#[test]
fn test_uniform_block_and_render_target_ranges() {
    let mut gx2 = Gx2Context::new();
    gx2.set_uniform_block(Gx2Stage::Vertex, 15, 64, 0x2000).unwrap();
    assert_eq!(gx2.registers().uniform_block(Gx2Stage::Vertex, 15), Some((64, 0x2000)));
    assert!(gx2.set_uniform_block(Gx2Stage::Vertex, 16, 64, 0x2000).is_err());
    gx2.set_color_buffer(0x3000, 7).unwrap();
    assert!(gx2.set_color_buffer(0x3000, 8).is_err());
    assert!(gx2.set_attrib_buffer(16, AttribBuffer { size: 4, stride: 4, addr: 0 }).is_err());
}

// ============================================================================
// DRAW
// ============================================================================

#[test]
fn test_draw_calls_are_recorded() {
    let mut gx2 = Gx2Context::new();
    gx2.draw_ex(4, 6, 2, 1);
    gx2.draw_indexed_ex(6, 4, 4, 0x4020, 3).unwrap();

    assert_eq!(
        gx2.commands(),
        &[
            Gx2Command::DrawEx { mode: 4, count: 6, first: 2, instances: 1 },
            Gx2Command::DrawIndexedEx { mode: 6, count: 4, index_type: 4, addr: 0x4020, base_vertex: 0, instances: 3 },
        ]
    );
}

#[test]
fn test_unaligned_index_data_is_rejected() {
    let mut gx2 = Gx2Context::new();
    let result = gx2.draw_indexed_ex(4, 3, 9, 0x4010, 1);
    assert!(matches!(result, Err(RioError::ContractViolation(_))));
    assert!(gx2.commands().is_empty());
}
