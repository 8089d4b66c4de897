//! Unit tests for gl_format.rs
//!
//! Pure translation tables, no GL context needed.

use super::*;
use rio_gpu::rio::gpu::{comp_map, Backend};
use rustc_hash::FxHashSet;

// ============================================================================
// TEXTURE FORMATS
// ============================================================================

#[test]
fn test_every_format_but_d24_s8_float_maps() {
    for format in TextureFormat::ALL {
        let mapped = texture_format_to_gl(format);
        if format == TextureFormat::D24_S8_FLOAT {
            assert!(mapped.is_none());
        } else {
            assert!(mapped.is_some(), "{:?} has no GL mapping", format);
        }
    }
}

#[test]
fn test_internal_formats_never_alias() {
    let mut seen = FxHashSet::default();
    for format in TextureFormat::ALL {
        if let Some(gl) = texture_format_to_gl(format) {
            assert!(seen.insert(gl.internal_format), "{:?} aliases another format", format);
        }
    }
}

#[test]
fn test_compressed_formats_have_no_upload_type() {
    // Stays in lock-step with TextureFormat::is_compressed
    for format in TextureFormat::ALL {
        let Some(gl) = texture_format_to_gl(format) else { continue };
        assert_eq!(format.is_compressed(), gl.format == 0 && gl.ty == 0, "{:?}", format);
    }
}

#[test]
fn test_common_formats() {
    assert_eq!(
        texture_format_to_gl(TextureFormat::R8G8B8A8_UNORM),
        Some(GlTextureFormat {
            internal_format: glow::RGBA8 as i32,
            format: glow::RGBA,
            ty: glow::UNSIGNED_BYTE,
        })
    );
    assert_eq!(
        texture_format_to_gl(TextureFormat::R8G8B8A8_SRGB).map(|f| f.internal_format),
        Some(glow::SRGB8_ALPHA8 as i32)
    );
    assert_eq!(
        texture_format_to_gl(TextureFormat::D24_S8_UNORM).map(|f| (f.format, f.ty)),
        Some((glow::DEPTH_STENCIL, glow::UNSIGNED_INT_24_8))
    );
    assert_eq!(
        texture_format_to_gl(TextureFormat::BC1_UNORM).map(|f| f.internal_format),
        Some(COMPRESSED_RGBA_S3TC_DXT1_EXT as i32)
    );
}

#[test]
fn test_integer_formats_upload_as_integer() {
    for format in TextureFormat::ALL {
        let Some(gl) = texture_format_to_gl(format) else { continue };
        let integer_upload = matches!(
            gl.format,
            glow::RED_INTEGER | glow::RG_INTEGER | glow::RGBA_INTEGER
        );
        let integer_code = matches!(format.raw() & 0xF00, 0x100 | 0x300)
            && format.is_usable_as_render_target_color(Backend::Gl);
        assert_eq!(integer_upload, integer_code, "{:?}", format);
    }
}

// ============================================================================
// SWIZZLE
// ============================================================================

#[test]
fn test_identity_swizzle() {
    let swizzle = comp_map_to_gl_swizzle(comp_map(0, 1, 2, 3));
    assert_eq!(
        swizzle,
        [glow::RED as i32, glow::GREEN as i32, glow::BLUE as i32, glow::ALPHA as i32]
    );
}

#[test]
fn test_default_r8_swizzle_fills_zero_and_one() {
    // R8 default map is R, 0, 0, 1
    let swizzle = comp_map_to_gl_swizzle(TextureFormat::R8_UNORM.default_comp_map());
    assert_eq!(
        swizzle,
        [glow::RED as i32, glow::ZERO as i32, glow::ZERO as i32, glow::ONE as i32]
    );
}

// ============================================================================
// VERTEX FORMATS
// ============================================================================

#[test]
fn test_vertex_sizes_match_component_counts() {
    for format in VertexFormat::ALL {
        assert_eq!(vertex_format_to_gl(format).size as u32, format.component_count(), "{:?}", format);
    }
}

#[test]
fn test_vertex_float_formats() {
    let gl = vertex_format_to_gl(VertexFormat::R32G32B32_FLOAT);
    assert_eq!(gl, GlVertexFormat { size: 3, data_type: glow::FLOAT, normalized: false, integer: false });
    assert_eq!(vertex_format_to_gl(VertexFormat::R16G16_FLOAT).data_type, glow::HALF_FLOAT);
}

#[test]
fn test_vertex_normalized_and_integer_flags() {
    let unorm = vertex_format_to_gl(VertexFormat::R8G8B8A8_UNORM);
    assert!(unorm.normalized && !unorm.integer);
    assert_eq!(unorm.data_type, glow::UNSIGNED_BYTE);

    let sint = vertex_format_to_gl(VertexFormat::R16G16_SINT);
    assert!(!sint.normalized && sint.integer);
    assert_eq!(sint.data_type, glow::SHORT);

    let to_float = vertex_format_to_gl(VertexFormat::R8_UINT_TO_FLOAT);
    assert!(!to_float.normalized && !to_float.integer);

    assert!(vertex_format_to_gl(VertexFormat::R32G32B32A32_UINT).integer);
    assert_eq!(vertex_format_to_gl(VertexFormat::R32_SINT).data_type, glow::INT);
}

#[test]
fn test_packed_vertex_formats() {
    let uint = vertex_format_to_gl(VertexFormat::R10G10B10A2_UINT);
    assert_eq!(uint.data_type, glow::UNSIGNED_INT_2_10_10_10_REV);
    assert!(!uint.integer);

    let snorm = vertex_format_to_gl(VertexFormat::R10G10B10A2_SNORM);
    assert_eq!(snorm.data_type, glow::INT_2_10_10_10_REV);
    assert!(snorm.normalized);

    let float = vertex_format_to_gl(VertexFormat::R10G11B11_FLOAT);
    assert_eq!(float.size, 3);
    assert_eq!(float.data_type, glow::UNSIGNED_INT_10F_11F_11F_REV);
}

// ============================================================================
// STATE ENUMS
// ============================================================================

#[test]
fn test_state_enums() {
    assert_eq!(compare_func_to_gl(CompareFunc::LessEqual), glow::LEQUAL);
    assert_eq!(compare_func_to_gl(CompareFunc::NotEqual), glow::NOTEQUAL);
    assert_eq!(blend_factor_to_gl(BlendFactor::OneMinusSrcAlpha), glow::ONE_MINUS_SRC_ALPHA);
    assert_eq!(blend_equation_to_gl(BlendEquation::ReverseSub), glow::FUNC_REVERSE_SUBTRACT);
    assert_eq!(stencil_op_to_gl(StencilOp::IncrWrap), glow::INCR_WRAP);
    assert_eq!(polygon_mode_to_gl(PolygonMode::Line), glow::LINE);
    assert_eq!(cull_face_to_gl(CullingMode::All), Some(glow::FRONT_AND_BACK));
    assert_eq!(cull_face_to_gl(CullingMode::None), None);
}

#[test]
fn test_sampler_enums() {
    assert_eq!(wrap_mode_to_gl(TexWrapMode::Clamp), glow::CLAMP_TO_EDGE);
    assert_eq!(wrap_mode_to_gl(TexWrapMode::ClampHalfBorder), CLAMP);
    assert_eq!(wrap_mode_to_gl(TexWrapMode::MirrorOnceBorder), MIRROR_CLAMP_TO_BORDER_EXT);
    assert_eq!(
        min_filter_to_gl(TexXYFilterMode::Linear, TexMipFilterMode::Point),
        glow::LINEAR_MIPMAP_NEAREST
    );
    assert_eq!(min_filter_to_gl(TexXYFilterMode::Point, TexMipFilterMode::None), glow::NEAREST);
    assert_eq!(mag_filter_to_gl(TexXYFilterMode::Point), glow::NEAREST);
}

#[test]
fn test_draw_enums() {
    assert_eq!(primitive_mode_to_gl(PrimitiveMode::TriangleStrip), glow::TRIANGLE_STRIP);
    assert_eq!(primitive_mode_to_gl(PrimitiveMode::LineLoop), glow::LINE_LOOP);
    assert_eq!(primitive_mode_to_gl(PrimitiveMode::TrianglesAdjacency), glow::TRIANGLES_ADJACENCY);
    assert_eq!(index_format_to_gl(IndexFormat::U16), glow::UNSIGNED_SHORT);
    assert_eq!(index_format_to_gl(IndexFormat::U32), glow::UNSIGNED_INT);
}
