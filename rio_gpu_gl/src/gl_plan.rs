//! GL call plans
//!
//! The device never decides *what* to send to GL while it holds the context: pipeline state,
//! sampler updates, clears, draws, buffer writes, uniform writes and vertex attribute pointers are first
//! turned into plain values here, then executed one by one. Keeping the decisions pure lets them
//! be tested without a GL context.

use std::ops::Range;
use rio_gpu::rio::{RioError, RioResult};
use rio_gpu::rio::device::{
    BlendTargets, BufferUpload, ClearFlags, ClearRequest, PipelineState, RenderStateGroups,
    VertexAttributeDesc,
};
use rio_gpu::rio::gpu::{
    BlendExpression, IndexFormat, PrimitiveMode, SamplerDirty, SamplerState, Surface,
    UniformValue, RENDER_TARGET_MAX_NUM,
};
use crate::gl_format::{
    blend_equation_to_gl, blend_factor_to_gl, compare_func_to_gl, cull_face_to_gl,
    index_format_to_gl, mag_filter_to_gl, min_filter_to_gl, polygon_mode_to_gl,
    primitive_mode_to_gl, stencil_op_to_gl, vertex_format_to_gl, wrap_mode_to_gl,
    TEXTURE_MAX_ANISOTROPY_EXT,
};

/// Texture unit left active after a sampler bind so later texture binds do not disturb it
pub const SPARE_TEXTURE_UNIT: u32 = 16;

/// Number of texture units a sampler may be bound to
pub const TEXTURE_UNIT_MAX: u32 = 16;

/// One context-global GL call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlCall {
    Enable(u32),
    Disable(u32),
    /// `glEnablei(cap, index)`
    EnableIndexed(u32, u32),
    DisableIndexed(u32, u32),
    DepthMask(bool),
    DepthFunc(u32),
    StencilFunc { func: u32, reference: i32, mask: u32 },
    StencilOp { fail: u32, zfail: u32, zpass: u32 },
    StencilMask(u32),
    CullFace(u32),
    PolygonMode(u32),
    BlendFuncSeparate { target: Option<u32>, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32 },
    BlendEquationSeparate { target: Option<u32>, rgb: u32, alpha: u32 },
    BlendColor([f32; 4]),
    ColorMask { target: Option<u32>, mask: [bool; 4] },
    DrawBuffer(u32),
    ClearColor([f32; 4]),
    ClearDepth(f32),
    ClearStencil(i32),
    Clear(u32),
}

fn enable_if(cap: u32, enable: bool) -> GlCall {
    if enable {
        GlCall::Enable(cap)
    } else {
        GlCall::Disable(cap)
    }
}

fn blend_calls(target: Option<u32>, expression: &BlendExpression) -> [GlCall; 2] {
    [
        GlCall::BlendFuncSeparate {
            target,
            src_rgb: blend_factor_to_gl(expression.src_rgb),
            dst_rgb: blend_factor_to_gl(expression.dst_rgb),
            src_alpha: blend_factor_to_gl(expression.src_alpha),
            dst_alpha: blend_factor_to_gl(expression.dst_alpha),
        },
        GlCall::BlendEquationSeparate {
            target,
            rgb: blend_equation_to_gl(expression.equation_rgb),
            alpha: blend_equation_to_gl(expression.equation_alpha),
        },
    ]
}

fn channel_bits(mask: u8) -> [bool; 4] {
    [mask & 1 != 0, mask & 2 != 0, mask & 4 != 0, mask & 8 != 0]
}

/// Calls applying the requested groups, in the order GL state is normally set
pub fn pipeline_plan(state: &PipelineState, groups: RenderStateGroups) -> Vec<GlCall> {
    let mut calls = Vec::new();

    if groups.contains(RenderStateGroups::DEPTH_STENCIL) {
        let ds = &state.depth_stencil;
        calls.push(enable_if(glow::DEPTH_TEST, ds.depth_test_enable));
        calls.push(GlCall::DepthMask(ds.depth_write_enable));
        calls.push(GlCall::DepthFunc(compare_func_to_gl(ds.depth_func)));
        calls.push(enable_if(glow::STENCIL_TEST, ds.stencil_test_enable));
        calls.push(GlCall::StencilFunc {
            func: compare_func_to_gl(ds.stencil_func),
            reference: ds.stencil_ref,
            mask: ds.stencil_mask,
        });
        calls.push(GlCall::StencilOp {
            fail: stencil_op_to_gl(ds.stencil_op_fail),
            zfail: stencil_op_to_gl(ds.stencil_op_zfail),
            zpass: stencil_op_to_gl(ds.stencil_op_zpass),
        });
    }

    if groups.contains(RenderStateGroups::CULLING) {
        let raster = &state.raster;
        match cull_face_to_gl(raster.culling_mode) {
            Some(face) => {
                calls.push(GlCall::Enable(glow::CULL_FACE));
                calls.push(GlCall::CullFace(face));
            }
            None => calls.push(GlCall::Disable(glow::CULL_FACE)),
        }
        calls.push(GlCall::PolygonMode(polygon_mode_to_gl(raster.polygon_mode)));
        calls.push(enable_if(glow::POLYGON_OFFSET_FILL, raster.polygon_offset_enable));
        calls.push(enable_if(glow::POLYGON_OFFSET_POINT, raster.polygon_offset_point_line_enable));
        calls.push(enable_if(glow::POLYGON_OFFSET_LINE, raster.polygon_offset_point_line_enable));
    }

    if groups.contains(RenderStateGroups::BLEND) {
        match &state.blend {
            BlendTargets::Single { enable, expression, .. } => {
                calls.push(enable_if(glow::BLEND, *enable));
                calls.extend(blend_calls(None, expression));
            }
            blend @ BlendTargets::Multiple { expressions, .. } => {
                for (target, expression) in expressions.iter().enumerate() {
                    let index = target as u32;
                    calls.push(if blend.target_enabled(target) {
                        GlCall::EnableIndexed(glow::BLEND, index)
                    } else {
                        GlCall::DisableIndexed(glow::BLEND, index)
                    });
                    calls.extend(blend_calls(Some(index), expression));
                }
            }
        }
    }

    if groups.contains(RenderStateGroups::BLEND_CONSTANT) {
        calls.push(GlCall::BlendColor(state.blend_constant_color.to_array()));
    }

    if groups.contains(RenderStateGroups::COLOR_MASK) {
        match &state.blend {
            BlendTargets::Single { color_mask, .. } => {
                calls.push(GlCall::ColorMask { target: None, mask: *color_mask });
            }
            blend @ BlendTargets::Multiple { .. } => {
                for target in 0..RENDER_TARGET_MAX_NUM {
                    calls.push(GlCall::ColorMask {
                        target: Some(target as u32),
                        mask: channel_bits(blend.channel_mask(target)),
                    });
                }
            }
        }
    }

    if groups.contains(RenderStateGroups::ALPHA_TEST) {
        calls.push(GlCall::Disable(glow::SAMPLE_ALPHA_TO_COVERAGE));
    }

    calls
}

/// One sampler object parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplerParam {
    Int(u32, i32),
    Float(u32, f32),
    Color(u32, [f32; 4]),
}

/// Parameters to push for the dirty groups of `state`
pub fn sampler_plan(state: &SamplerState, dirty: SamplerDirty) -> Vec<SamplerParam> {
    let mut params = Vec::new();

    if dirty.contains(SamplerDirty::FILTER) {
        params.push(SamplerParam::Int(
            glow::TEXTURE_MIN_FILTER,
            min_filter_to_gl(state.min_filter, state.mip_filter) as i32,
        ));
        params.push(SamplerParam::Int(glow::TEXTURE_MAG_FILTER, mag_filter_to_gl(state.mag_filter) as i32));
        params.push(SamplerParam::Float(
            TEXTURE_MAX_ANISOTROPY_EXT,
            state.max_aniso.max_samples() as f32,
        ));
    }

    if dirty.contains(SamplerDirty::WRAP) {
        params.push(SamplerParam::Int(glow::TEXTURE_WRAP_S, wrap_mode_to_gl(state.wrap_x) as i32));
        params.push(SamplerParam::Int(glow::TEXTURE_WRAP_T, wrap_mode_to_gl(state.wrap_y) as i32));
        params.push(SamplerParam::Int(glow::TEXTURE_WRAP_R, wrap_mode_to_gl(state.wrap_z) as i32));
    }

    if dirty.contains(SamplerDirty::BORDER_COLOR) {
        params.push(SamplerParam::Color(glow::TEXTURE_BORDER_COLOR, state.border_color.to_array()));
    }

    if dirty.contains(SamplerDirty::LOD) {
        params.push(SamplerParam::Float(glow::TEXTURE_MIN_LOD, state.min_lod));
        params.push(SamplerParam::Float(glow::TEXTURE_MAX_LOD, state.max_lod));
        params.push(SamplerParam::Float(glow::TEXTURE_LOD_BIAS, state.lod_bias));
    }

    if dirty.contains(SamplerDirty::DEPTH_COMPARE) {
        if state.depth_compare_enable {
            params.push(SamplerParam::Int(
                glow::TEXTURE_COMPARE_MODE,
                glow::COMPARE_REF_TO_TEXTURE as i32,
            ));
            params.push(SamplerParam::Int(
                glow::TEXTURE_COMPARE_FUNC,
                compare_func_to_gl(state.depth_compare_func) as i32,
            ));
        } else {
            params.push(SamplerParam::Int(glow::TEXTURE_COMPARE_MODE, glow::NONE as i32));
        }
    }

    params
}

/// Clear calls for a resolved request, after the targets are attached
pub fn clear_plan(request: &ClearRequest) -> Vec<GlCall> {
    let mut calls = Vec::new();
    let mut mask = 0;

    if request.flags.contains(ClearFlags::COLOR) {
        if let Some((_, index)) = request.color {
            calls.push(GlCall::DrawBuffer(glow::COLOR_ATTACHMENT0 + index));
            calls.push(GlCall::ClearColor(request.color_value.to_array()));
            mask |= glow::COLOR_BUFFER_BIT;
        }
    }

    if request.depth.is_some() {
        if request.flags.contains(ClearFlags::DEPTH) {
            calls.push(GlCall::DepthMask(true));
            calls.push(GlCall::ClearDepth(request.depth_value));
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if request.flags.contains(ClearFlags::STENCIL) {
            calls.push(GlCall::StencilMask(0xFF));
            calls.push(GlCall::ClearStencil(request.stencil_value as i32));
            mask |= glow::STENCIL_BUFFER_BIT;
        }
    }

    if mask != 0 {
        calls.push(GlCall::Clear(mask));
    }
    calls
}

/// `glDrawBuffers` list: attachment `i` for present targets, `NONE` elsewhere
pub fn draw_buffer_list(attachments: [bool; RENDER_TARGET_MAX_NUM]) -> [u32; RENDER_TARGET_MAX_NUM] {
    let mut list = [glow::NONE; RENDER_TARGET_MAX_NUM];
    for (index, present) in attachments.iter().enumerate() {
        if *present {
            list[index] = glow::COLOR_ATTACHMENT0 + index as u32;
        }
    }
    list
}

/// One GL draw call; single-instance draws use the non-instanced entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Arrays { mode: u32, first: i32, count: i32 },
    ArraysInstanced { mode: u32, first: i32, count: i32, instances: i32 },
    /// Indices come from the element buffer at offset 0
    Elements { mode: u32, count: i32, ty: u32 },
    ElementsInstanced { mode: u32, count: i32, ty: u32, instances: i32 },
}

/// GL counts are signed; anything past `i32::MAX` is a caller error
fn gl_count(value: u32, what: &str) -> RioResult<i32> {
    i32::try_from(value).map_err(|_| {
        RioError::ContractViolation(format!("{} {} exceeds the GL range", what, value))
    })
}

pub fn arrays_call(mode: PrimitiveMode, first: u32, count: u32, instances: u32) -> RioResult<DrawCall> {
    let mode = primitive_mode_to_gl(mode);
    let (first, count) = (gl_count(first, "first vertex")?, gl_count(count, "vertex count")?);
    Ok(match instances {
        1 => DrawCall::Arrays { mode, first, count },
        n => DrawCall::ArraysInstanced { mode, first, count, instances: gl_count(n, "instance count")? },
    })
}

pub fn elements_call(mode: PrimitiveMode, format: IndexFormat, count: usize, instances: u32) -> RioResult<DrawCall> {
    let mode = primitive_mode_to_gl(mode);
    let ty = index_format_to_gl(format);
    let count = i32::try_from(count).map_err(|_| {
        RioError::ContractViolation(format!("index count {} exceeds the GL range", count))
    })?;
    Ok(match instances {
        1 => DrawCall::Elements { mode, count, ty },
        n => DrawCall::ElementsInstanced { mode, count, ty, instances: gl_count(n, "instance count")? },
    })
}

/// How a whole-buffer upload reaches GL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferWrite {
    /// `glBufferSubData` at offset 0 into the existing storage
    SubData,
    /// `glBufferData` with `DYNAMIC_DRAW`
    Data { usage: u32 },
}

pub fn buffer_write(mode: BufferUpload) -> BufferWrite {
    match mode {
        BufferUpload::Update => BufferWrite::SubData,
        BufferUpload::Reallocate => BufferWrite::Data { usage: glow::DYNAMIC_DRAW },
    }
}

/// GL has a single location per program variable: vertex and fragment must agree
pub fn resolve_location(vertex: Option<u32>, fragment: Option<u32>) -> RioResult<Option<u32>> {
    match (vertex, fragment) {
        (Some(vs), Some(fs)) if vs != fs => Err(RioError::ContractViolation(format!(
            "vertex location {} and fragment location {} differ",
            vs, fs
        ))),
        (vs, fs) => Ok(vs.or(fs)),
    }
}

/// Shape of one `glUniform*` call
#[derive(Debug, Clone, PartialEq)]
pub enum UniformCall {
    /// `glUniform{components}fv`
    Float { components: u32, values: Vec<f32> },
    Int { components: u32, values: Vec<i32> },
    Uint { components: u32, values: Vec<u32> },
    /// `glUniformMatrix{columns}x{rows}fv`, column-major, untransposed
    Matrix { columns: u32, rows: u32, values: Vec<f32> },
}

pub fn uniform_call(value: &UniformValue<'_>) -> UniformCall {
    match value {
        UniformValue::Float(v) => UniformCall::Float { components: v.len() as u32, values: v.to_vec() },
        UniformValue::Int(v) => UniformCall::Int { components: v.len() as u32, values: v.to_vec() },
        UniformValue::Uint(v) => UniformCall::Uint { components: v.len() as u32, values: v.to_vec() },
        UniformValue::Matrix(m) => UniformCall::Matrix {
            columns: m.columns,
            rows: m.rows,
            values: m.to_column_major(),
        },
        UniformValue::Vec4Array(v) => UniformCall::Float {
            components: 4,
            values: v.iter().flat_map(|x| x.to_array()).collect(),
        },
        UniformValue::IVec4Array(v) => UniformCall::Int {
            components: 4,
            values: v.iter().flat_map(|x| x.to_array()).collect(),
        },
        UniformValue::UVec4Array(v) => UniformCall::Uint {
            components: 4,
            values: v.iter().flat_map(|x| x.to_array()).collect(),
        },
    }
}

/// One `glVertexAttrib[I]Pointer` call, reading from the buffer in `slot`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribPointer {
    pub slot: u32,
    pub location: u32,
    pub size: i32,
    pub data_type: u32,
    pub normalized: bool,
    pub integer: bool,
    pub stride: i32,
    pub offset: i32,
}

/// Attribute pointers in the order the layout lists them
///
/// `stride_of` returns the stride of the buffer occupying a slot, `None` for an empty slot.
pub fn attrib_pointers(
    attributes: &[VertexAttributeDesc],
    stride_of: impl Fn(u32) -> Option<u32>,
) -> RioResult<Vec<AttribPointer>> {
    attributes
        .iter()
        .map(|attribute| {
            let stride = match stride_of(attribute.buffer_slot) {
                Some(stride) if stride != 0 => stride,
                _ => {
                    return Err(RioError::ContractViolation(format!(
                        "attribute at location {} reads slot {} which has no strided buffer",
                        attribute.location, attribute.buffer_slot
                    )))
                }
            };
            let gl = vertex_format_to_gl(attribute.format);
            Ok(AttribPointer {
                slot: attribute.buffer_slot,
                location: attribute.location,
                size: gl.size,
                data_type: gl.data_type,
                normalized: gl.normalized,
                integer: gl.integer,
                stride: stride as i32,
                offset: attribute.offset as i32,
            })
        })
        .collect()
}

/// Where the bytes of one texture level come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSource {
    Image(Range<usize>),
    Mipmaps(Range<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpload {
    pub level: u32,
    pub width: u32,
    pub height: u32,
    pub source: LevelSource,
}

/// Every level of a surface, base image first
pub fn level_uploads(surface: &Surface) -> Vec<LevelUpload> {
    let mut uploads = vec![LevelUpload {
        level: 0,
        width: surface.width,
        height: surface.height,
        source: LevelSource::Image(0..surface.image_size as usize),
    }];
    for level in 1..surface.mip_levels {
        if let Some(range) = surface.mip_level_range(level) {
            uploads.push(LevelUpload {
                level,
                width: surface.level_width(level),
                height: surface.level_height(level),
                source: LevelSource::Mipmaps(range),
            });
        }
    }
    uploads
}

#[cfg(test)]
#[path = "gl_plan_tests.rs"]
mod tests;
