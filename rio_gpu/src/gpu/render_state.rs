//! RenderState - fixed-function pipeline state for a single render target
//!
//! A plain value: setters only change fields. `apply` pushes everything to the backend;
//! the partial `apply_*` methods push one group and leave every other group as it was.

use glam::Vec4;
use crate::context::GraphicsContext;
use crate::error::RioResult;
use crate::graphics_device::{
    BlendTargets, DepthStencilState, PipelineState, RasterState, RenderStateGroups,
};
use crate::gpu::graphics::{
    BlendEquation, BlendFactor, Color4f, CompareFunc, CullingMode, PolygonMode, StencilOp,
};

/// Blend factors and equations for color and alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendExpression {
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub equation_rgb: BlendEquation,
    pub equation_alpha: BlendEquation,
}

impl Default for BlendExpression {
    fn default() -> Self {
        Self {
            src_rgb: BlendFactor::SrcAlpha,
            dst_rgb: BlendFactor::OneMinusSrcAlpha,
            src_alpha: BlendFactor::SrcAlpha,
            dst_alpha: BlendFactor::OneMinusSrcAlpha,
            equation_rgb: BlendEquation::Add,
            equation_alpha: BlendEquation::Add,
        }
    }
}

impl BlendExpression {
    pub fn set_blend_factor(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.src_rgb = src;
        self.src_alpha = src;
        self.dst_rgb = dst;
        self.dst_alpha = dst;
    }

    pub fn set_blend_factor_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.src_rgb = src_rgb;
        self.dst_rgb = dst_rgb;
        self.src_alpha = src_alpha;
        self.dst_alpha = dst_alpha;
    }

    pub fn set_blend_equation(&mut self, equation: BlendEquation) {
        self.equation_rgb = equation;
        self.equation_alpha = equation;
    }

    pub fn set_blend_equation_separate(&mut self, rgb: BlendEquation, alpha: BlendEquation) {
        self.equation_rgb = rgb;
        self.equation_alpha = alpha;
    }
}

/// Fixed-function state for one render target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    depth_stencil: DepthStencilState,
    raster: RasterState,
    blend_enable: bool,
    blend: BlendExpression,
    blend_constant_color: Color4f,
    color_mask: [bool; 4],
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_stencil: DepthStencilState::default(),
            raster: RasterState::default(),
            blend_enable: true,
            blend: BlendExpression::default(),
            blend_constant_color: Vec4::ONE,
            color_mask: [true; 4],
        }
    }
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattened view handed to the device
    pub fn pipeline_state(&self) -> PipelineState {
        PipelineState {
            depth_stencil: self.depth_stencil,
            raster: self.raster,
            blend: BlendTargets::Single {
                enable: self.blend_enable,
                expression: self.blend,
                color_mask: self.color_mask,
            },
            blend_constant_color: self.blend_constant_color,
        }
    }

    // ===== APPLY =====

    fn apply_groups(&self, ctx: &mut GraphicsContext, groups: RenderStateGroups) -> RioResult<()> {
        ctx.device_mut().apply_pipeline_state(&self.pipeline_state(), groups)
    }

    /// Push the whole state
    pub fn apply(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        self.apply_groups(ctx, RenderStateGroups::ALL)
    }

    pub fn apply_depth_and_stencil_test(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        self.apply_groups(ctx, RenderStateGroups::DEPTH_STENCIL)
    }

    pub fn apply_color_mask(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        self.apply_groups(ctx, RenderStateGroups::COLOR_MASK)
    }

    pub fn apply_blend_and_fast_z(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        self.apply_groups(ctx, RenderStateGroups::BLEND)
    }

    pub fn apply_blend_constant_color(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        self.apply_groups(ctx, RenderStateGroups::BLEND_CONSTANT)
    }

    pub fn apply_culling_and_polygon_mode_and_polygon_offset(
        &self,
        ctx: &mut GraphicsContext,
    ) -> RioResult<()> {
        self.apply_groups(ctx, RenderStateGroups::CULLING)
    }

    // ===== DEPTH =====

    pub fn set_depth_enable(&mut self, test: bool, write: bool) {
        self.depth_stencil.depth_test_enable = test;
        self.depth_stencil.depth_write_enable = write;
    }

    pub fn set_depth_test_enable(&mut self, enable: bool) {
        self.depth_stencil.depth_test_enable = enable;
    }

    pub fn set_depth_write_enable(&mut self, enable: bool) {
        self.depth_stencil.depth_write_enable = enable;
    }

    pub fn set_depth_func(&mut self, func: CompareFunc) {
        self.depth_stencil.depth_func = func;
    }

    pub fn depth_test_enable(&self) -> bool {
        self.depth_stencil.depth_test_enable
    }

    pub fn depth_write_enable(&self) -> bool {
        self.depth_stencil.depth_write_enable
    }

    pub fn depth_func(&self) -> CompareFunc {
        self.depth_stencil.depth_func
    }

    // ===== STENCIL =====

    pub fn set_stencil_test_enable(&mut self, enable: bool) {
        self.depth_stencil.stencil_test_enable = enable;
    }

    pub fn set_stencil_test_func(&mut self, func: CompareFunc, reference: i32, mask: u32) {
        self.depth_stencil.stencil_func = func;
        self.depth_stencil.stencil_ref = reference;
        self.depth_stencil.stencil_mask = mask;
    }

    pub fn set_stencil_test_op(&mut self, fail: StencilOp, zfail: StencilOp, zpass: StencilOp) {
        self.depth_stencil.stencil_op_fail = fail;
        self.depth_stencil.stencil_op_zfail = zfail;
        self.depth_stencil.stencil_op_zpass = zpass;
    }

    pub fn stencil_test_enable(&self) -> bool {
        self.depth_stencil.stencil_test_enable
    }

    pub fn stencil_test_func(&self) -> CompareFunc {
        self.depth_stencil.stencil_func
    }

    pub fn stencil_test_ref(&self) -> i32 {
        self.depth_stencil.stencil_ref
    }

    pub fn stencil_test_mask(&self) -> u32 {
        self.depth_stencil.stencil_mask
    }

    /// (fail, zfail, zpass)
    pub fn stencil_test_op(&self) -> (StencilOp, StencilOp, StencilOp) {
        (
            self.depth_stencil.stencil_op_fail,
            self.depth_stencil.stencil_op_zfail,
            self.depth_stencil.stencil_op_zpass,
        )
    }

    // ===== CULLING / POLYGON =====

    pub fn set_culling_mode(&mut self, mode: CullingMode) {
        self.raster.culling_mode = mode;
    }

    pub fn culling_mode(&self) -> CullingMode {
        self.raster.culling_mode
    }

    pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.raster.polygon_mode = mode;
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.raster.polygon_mode
    }

    pub fn set_polygon_offset_enable(&mut self, fill: bool, point_line: bool) {
        self.raster.polygon_offset_enable = fill;
        self.raster.polygon_offset_point_line_enable = point_line;
    }

    pub fn polygon_offset_enable(&self) -> bool {
        self.raster.polygon_offset_enable
    }

    pub fn polygon_offset_point_line_enable(&self) -> bool {
        self.raster.polygon_offset_point_line_enable
    }

    // ===== BLEND =====

    pub fn set_blend_enable(&mut self, enable: bool) {
        self.blend_enable = enable;
    }

    pub fn blend_enable(&self) -> bool {
        self.blend_enable
    }

    pub fn set_blend_factor(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.blend.set_blend_factor(src, dst);
    }

    pub fn set_blend_factor_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.blend.set_blend_factor_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
    }

    pub fn set_blend_factor_src(&mut self, factor: BlendFactor) {
        self.blend.src_rgb = factor;
        self.blend.src_alpha = factor;
    }

    pub fn set_blend_factor_dst(&mut self, factor: BlendFactor) {
        self.blend.dst_rgb = factor;
        self.blend.dst_alpha = factor;
    }

    pub fn set_blend_factor_src_rgb(&mut self, factor: BlendFactor) {
        self.blend.src_rgb = factor;
    }

    pub fn set_blend_factor_src_alpha(&mut self, factor: BlendFactor) {
        self.blend.src_alpha = factor;
    }

    pub fn set_blend_factor_dst_rgb(&mut self, factor: BlendFactor) {
        self.blend.dst_rgb = factor;
    }

    pub fn set_blend_factor_dst_alpha(&mut self, factor: BlendFactor) {
        self.blend.dst_alpha = factor;
    }

    pub fn set_blend_equation(&mut self, equation: BlendEquation) {
        self.blend.set_blend_equation(equation);
    }

    pub fn set_blend_equation_separate(&mut self, rgb: BlendEquation, alpha: BlendEquation) {
        self.blend.set_blend_equation_separate(rgb, alpha);
    }

    pub fn set_blend_equation_rgb(&mut self, equation: BlendEquation) {
        self.blend.equation_rgb = equation;
    }

    pub fn set_blend_equation_alpha(&mut self, equation: BlendEquation) {
        self.blend.equation_alpha = equation;
    }

    pub fn blend_expression(&self) -> &BlendExpression {
        &self.blend
    }

    pub fn set_blend_constant_color(&mut self, color: Color4f) {
        self.blend_constant_color = color;
    }

    pub fn blend_constant_color(&self) -> Color4f {
        self.blend_constant_color
    }

    // ===== COLOR MASK =====

    pub fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.color_mask = [r, g, b, a];
    }

    /// R, G, B, A write enables
    pub fn color_mask(&self) -> [bool; 4] {
        self.color_mask
    }
}

#[cfg(test)]
#[path = "render_state_tests.rs"]
mod tests;
