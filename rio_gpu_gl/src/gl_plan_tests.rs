//! Unit tests for gl_plan.rs

use super::*;
use glam::{IVec4, Vec4};
use rio_gpu::rio::device::{ColorTargetHandle, DepthTargetHandle};
use rio_gpu::rio::gpu::{
    BlendFactor, CullingMode, Mtx23f, RenderState, RenderStateMRT, TexAnisoRatio, TextureFormat,
    UniformData, VertexFormat,
};
use slotmap::KeyData;

fn color_handle() -> ColorTargetHandle {
    ColorTargetHandle::from(KeyData::from_ffi(1))
}

fn depth_handle() -> DepthTargetHandle {
    DepthTargetHandle::from(KeyData::from_ffi(1))
}

fn clear_request(flags: ClearFlags, depth: bool) -> ClearRequest {
    ClearRequest {
        color: Some((color_handle(), 2)),
        depth: depth.then(depth_handle),
        flags,
        color_value: Vec4::new(0.25, 0.5, 0.75, 1.0),
        depth_value: 1.0,
        stencil_value: 7,
    }
}

// ============================================================================
// PIPELINE STATE
// ============================================================================

#[test]
fn test_default_state_full_plan() {
    let state = RenderState::default().pipeline_state();
    let calls = pipeline_plan(&state, RenderStateGroups::ALL);

    assert_eq!(calls[0], GlCall::Enable(glow::DEPTH_TEST));
    assert_eq!(calls[1], GlCall::DepthMask(true));
    assert_eq!(calls[2], GlCall::DepthFunc(glow::LEQUAL));
    assert_eq!(calls[3], GlCall::Disable(glow::STENCIL_TEST));
    assert!(calls.contains(&GlCall::CullFace(glow::BACK)));
    assert!(calls.contains(&GlCall::PolygonMode(glow::FILL)));
    assert!(calls.contains(&GlCall::Enable(glow::BLEND)));
    assert!(calls.contains(&GlCall::BlendColor([1.0, 1.0, 1.0, 1.0])));
    assert!(calls.contains(&GlCall::ColorMask { target: None, mask: [true; 4] }));
    assert_eq!(calls.last(), Some(&GlCall::Disable(glow::SAMPLE_ALPHA_TO_COVERAGE)));
}

#[test]
fn test_group_order() {
    let state = RenderState::default().pipeline_state();
    let calls = pipeline_plan(&state, RenderStateGroups::ALL);
    let position = |call: &GlCall| calls.iter().position(|c| c == call).unwrap();

    let depth = position(&GlCall::Enable(glow::DEPTH_TEST));
    let cull = position(&GlCall::Enable(glow::CULL_FACE));
    let blend = position(&GlCall::Enable(glow::BLEND));
    let constant = position(&GlCall::BlendColor([1.0; 4]));
    let mask = position(&GlCall::ColorMask { target: None, mask: [true; 4] });
    assert!(depth < cull && cull < blend && blend < constant && constant < mask);
}

#[test]
fn test_color_mask_group_touches_nothing_else() {
    let mut render_state = RenderState::default();
    render_state.set_color_mask(true, false, true, false);
    let calls = pipeline_plan(&render_state.pipeline_state(), RenderStateGroups::COLOR_MASK);
    assert_eq!(calls, vec![GlCall::ColorMask { target: None, mask: [true, false, true, false] }]);
}

#[test]
fn test_culling_none_disables_cull_face() {
    let mut render_state = RenderState::default();
    render_state.set_culling_mode(CullingMode::None);
    render_state.set_polygon_offset_enable(false, true);
    let calls = pipeline_plan(&render_state.pipeline_state(), RenderStateGroups::CULLING);
    assert_eq!(calls[0], GlCall::Disable(glow::CULL_FACE));
    assert!(!calls.iter().any(|c| matches!(c, GlCall::CullFace(_))));
    assert!(calls.contains(&GlCall::Disable(glow::POLYGON_OFFSET_FILL)));
    assert!(calls.contains(&GlCall::Enable(glow::POLYGON_OFFSET_POINT)));
    assert!(calls.contains(&GlCall::Enable(glow::POLYGON_OFFSET_LINE)));
}

#[test]
fn test_blend_factors_are_translated() {
    let mut render_state = RenderState::default();
    render_state.set_blend_factor(BlendFactor::One, BlendFactor::Zero);
    let calls = pipeline_plan(&render_state.pipeline_state(), RenderStateGroups::BLEND);
    assert!(calls.contains(&GlCall::BlendFuncSeparate {
        target: None,
        src_rgb: glow::ONE,
        dst_rgb: glow::ZERO,
        src_alpha: glow::ONE,
        dst_alpha: glow::ZERO,
    }));
}

#[test]
fn test_mrt_blend_and_mask_per_target() {
    let mut mrt = RenderStateMRT::new();
    mrt.set_blend_enable_mask(0b0000_0101);
    mrt.set_color_mask(1, true, false, false, true).unwrap();
    let calls = pipeline_plan(
        &mrt.pipeline_state(),
        RenderStateGroups::BLEND | RenderStateGroups::COLOR_MASK,
    );

    assert!(calls.contains(&GlCall::EnableIndexed(glow::BLEND, 0)));
    assert!(calls.contains(&GlCall::DisableIndexed(glow::BLEND, 1)));
    assert!(calls.contains(&GlCall::EnableIndexed(glow::BLEND, 2)));
    let funcs = calls
        .iter()
        .filter(|c| matches!(c, GlCall::BlendFuncSeparate { target: Some(_), .. }))
        .count();
    assert_eq!(funcs, RENDER_TARGET_MAX_NUM);
    assert!(calls.contains(&GlCall::ColorMask { target: Some(1), mask: [true, false, false, true] }));
    assert!(calls.contains(&GlCall::ColorMask { target: Some(7), mask: [true; 4] }));
}

// ============================================================================
// SAMPLERS
// ============================================================================

#[test]
fn test_sampler_plan_only_dirty_groups() {
    let state = SamplerState::default();
    let params = sampler_plan(&state, SamplerDirty::WRAP);
    assert_eq!(
        params,
        vec![
            SamplerParam::Int(glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32),
            SamplerParam::Int(glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32),
            SamplerParam::Int(glow::TEXTURE_WRAP_R, glow::CLAMP_TO_EDGE as i32),
        ]
    );
    assert!(sampler_plan(&state, SamplerDirty::empty()).is_empty());
}

#[test]
fn test_sampler_filter_and_aniso() {
    let state = SamplerState { max_aniso: TexAnisoRatio::Ratio8To1, ..SamplerState::default() };
    let params = sampler_plan(&state, SamplerDirty::FILTER);
    assert!(params.contains(&SamplerParam::Int(
        glow::TEXTURE_MIN_FILTER,
        glow::LINEAR_MIPMAP_LINEAR as i32
    )));
    assert!(params.contains(&SamplerParam::Float(TEXTURE_MAX_ANISOTROPY_EXT, 8.0)));
}

#[test]
fn test_depth_compare_plan() {
    let mut state = SamplerState::default();
    let off = sampler_plan(&state, SamplerDirty::DEPTH_COMPARE);
    assert_eq!(off, vec![SamplerParam::Int(glow::TEXTURE_COMPARE_MODE, glow::NONE as i32)]);

    state.depth_compare_enable = true;
    state.depth_compare_func = rio_gpu::rio::gpu::CompareFunc::Less;
    let on = sampler_plan(&state, SamplerDirty::DEPTH_COMPARE);
    assert_eq!(on.len(), 2);
    assert_eq!(on[1], SamplerParam::Int(glow::TEXTURE_COMPARE_FUNC, glow::LESS as i32));
}

#[test]
fn test_border_and_lod() {
    let state = SamplerState::default();
    let params = sampler_plan(&state, SamplerDirty::BORDER_COLOR | SamplerDirty::LOD);
    assert_eq!(params[0], SamplerParam::Color(glow::TEXTURE_BORDER_COLOR, [0.0, 0.0, 0.0, 1.0]));
    assert!(params.contains(&SamplerParam::Float(glow::TEXTURE_MAX_LOD, 14.0)));
}

// ============================================================================
// CLEAR / DRAW BUFFERS
// ============================================================================

#[test]
fn test_clear_color_only() {
    let calls = clear_plan(&clear_request(ClearFlags::COLOR, false));
    assert_eq!(
        calls,
        vec![
            GlCall::DrawBuffer(glow::COLOR_ATTACHMENT0 + 2),
            GlCall::ClearColor([0.25, 0.5, 0.75, 1.0]),
            GlCall::Clear(glow::COLOR_BUFFER_BIT),
        ]
    );
}

#[test]
fn test_clear_depth_stencil_forces_write_masks() {
    let mut request = clear_request(ClearFlags::DEPTH_STENCIL, true);
    request.color = None;
    let calls = clear_plan(&request);
    assert!(calls.contains(&GlCall::DepthMask(true)));
    assert!(calls.contains(&GlCall::StencilMask(0xFF)));
    assert!(calls.contains(&GlCall::ClearStencil(7)));
    assert_eq!(
        calls.last(),
        Some(&GlCall::Clear(glow::DEPTH_BUFFER_BIT | glow::STENCIL_BUFFER_BIT))
    );
}

#[test]
fn test_clear_without_targets_is_empty() {
    let mut request = clear_request(ClearFlags::DEPTH, false);
    request.color = None;
    assert!(clear_plan(&request).is_empty());
}

#[test]
fn test_draw_buffer_list() {
    let mut attachments = [false; RENDER_TARGET_MAX_NUM];
    attachments[0] = true;
    attachments[3] = true;
    let list = draw_buffer_list(attachments);
    assert_eq!(list[0], glow::COLOR_ATTACHMENT0);
    assert_eq!(list[1], glow::NONE);
    assert_eq!(list[3], glow::COLOR_ATTACHMENT0 + 3);
}

// ============================================================================
// BUFFERS / UNIFORMS
// ============================================================================

#[test]
fn test_same_size_upload_reuses_storage() {
    assert_eq!(buffer_write(BufferUpload::for_sizes(64, 64)), BufferWrite::SubData);
    assert_eq!(
        buffer_write(BufferUpload::for_sizes(64, 128)),
        BufferWrite::Data { usage: glow::DYNAMIC_DRAW }
    );
}

#[test]
fn test_resolve_location() {
    assert_eq!(resolve_location(Some(3), Some(3)).unwrap(), Some(3));
    assert_eq!(resolve_location(None, Some(5)).unwrap(), Some(5));
    assert_eq!(resolve_location(None, None).unwrap(), None);
    assert!(matches!(resolve_location(Some(1), Some(2)), Err(RioError::ContractViolation(_))));
}

#[test]
fn test_uniform_call_shapes() {
    let v = Vec4::new(1.0, 2.0, 3.0, 4.0);
    assert_eq!(
        uniform_call(&v.to_uniform()),
        UniformCall::Float { components: 4, values: vec![1.0, 2.0, 3.0, 4.0] }
    );

    let m = Mtx23f::new([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    assert_eq!(
        uniform_call(&m.to_uniform()),
        UniformCall::Matrix { columns: 3, rows: 2, values: vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0] }
    );

    let array = [IVec4::new(1, 2, 3, 4), IVec4::new(5, 6, 7, 8)];
    match uniform_call(&UniformValue::IVec4Array(&array)) {
        UniformCall::Int { components, values } => {
            assert_eq!(components, 4);
            assert_eq!(values.len(), 8);
        }
        other => panic!("unexpected {:?}", other),
    }
}

// ============================================================================
// VERTEX ATTRIBUTES / TEXTURE LEVELS
// ============================================================================

#[test]
fn test_attrib_pointers() {
    let attributes = [
        VertexAttributeDesc { location: 0, format: VertexFormat::R32G32B32_FLOAT, offset: 0, buffer_slot: 0 },
        VertexAttributeDesc { location: 2, format: VertexFormat::R16G16_UINT, offset: 12, buffer_slot: 0 },
    ];
    let pointers = attrib_pointers(&attributes, |slot| (slot == 0).then_some(16)).unwrap();
    assert_eq!(pointers.len(), 2);
    assert_eq!(pointers[0].stride, 16);
    assert!(!pointers[0].integer);
    assert!(pointers[1].integer);
    assert_eq!(pointers[1].offset, 12);
}

#[test]
fn test_attrib_pointer_without_buffer_is_rejected() {
    let attributes =
        [VertexAttributeDesc { location: 0, format: VertexFormat::R32_FLOAT, offset: 0, buffer_slot: 3 }];
    let result = attrib_pointers(&attributes, |_| None);
    assert!(matches!(result, Err(RioError::ContractViolation(_))));
}

#[test]
fn test_level_uploads() {
    let surface = Surface::new(TextureFormat::R8G8B8A8_UNORM, 8, 4, 3).unwrap();
    let uploads = level_uploads(&surface);
    assert_eq!(uploads.len(), 3);
    assert_eq!(uploads[0].source, LevelSource::Image(0..128));
    assert_eq!((uploads[1].width, uploads[1].height), (4, 2));
    assert_eq!(uploads[1].source, LevelSource::Mipmaps(0..32));
    assert_eq!((uploads[2].width, uploads[2].height), (2, 1));
    assert_eq!(uploads[2].source, LevelSource::Mipmaps(32..40));
}

// ============================================================================
// DRAW CALLS
// ============================================================================

#[test]
fn test_single_instance_uses_plain_entry_points() {
    assert_eq!(
        arrays_call(PrimitiveMode::Triangles, 3, 6, 1).unwrap(),
        DrawCall::Arrays { mode: glow::TRIANGLES, first: 3, count: 6 }
    );
    assert_eq!(
        elements_call(PrimitiveMode::LineStrip, IndexFormat::U16, 4, 1).unwrap(),
        DrawCall::Elements { mode: glow::LINE_STRIP, count: 4, ty: glow::UNSIGNED_SHORT }
    );
}

#[test]
fn test_instanced_draws() {
    assert_eq!(
        arrays_call(PrimitiveMode::TriangleStrip, 0, 4, 8).unwrap(),
        DrawCall::ArraysInstanced { mode: glow::TRIANGLE_STRIP, first: 0, count: 4, instances: 8 }
    );
    assert_eq!(
        elements_call(PrimitiveMode::Triangles, IndexFormat::U32, 36, 2).unwrap(),
        DrawCall::ElementsInstanced { mode: glow::TRIANGLES, count: 36, ty: glow::UNSIGNED_INT, instances: 2 }
    );
}

#[test]
fn test_counts_beyond_gl_range_rejected() {
    assert!(matches!(
        arrays_call(PrimitiveMode::Points, 0, u32::MAX, 1),
        Err(RioError::ContractViolation(_))
    ));
    assert!(elements_call(PrimitiveMode::Points, IndexFormat::U16, 3, 1 << 31).is_err());
}
