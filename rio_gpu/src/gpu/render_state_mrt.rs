//! RenderStateMRT - fixed-function state with independent blending per render target
//!
//! Same depth, stencil and raster knobs as `RenderState`; blending is configured per target
//! through an 8-bit enable mask, eight `BlendExpression`s and a packed color mask holding one
//! R,G,B,A nibble per target.

use glam::Vec4;
use crate::context::GraphicsContext;
use crate::error::RioResult;
use crate::graphics_device::{
    BlendTargets, DepthStencilState, PipelineState, RasterState, RenderStateGroups,
};
use crate::gpu::graphics::{
    BlendEquation, BlendFactor, Color4f, CompareFunc, CullingMode, PolygonMode, StencilOp,
    RENDER_TARGET_MAX_NUM,
};
use crate::gpu::render_state::BlendExpression;
use crate::engine_ensure;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStateMRT {
    depth_stencil: DepthStencilState,
    raster: RasterState,
    blend_enable_mask: u8,
    blend: [BlendExpression; RENDER_TARGET_MAX_NUM],
    blend_constant_color: Color4f,
    color_mask: u32,
}

impl Default for RenderStateMRT {
    fn default() -> Self {
        Self {
            depth_stencil: DepthStencilState::default(),
            raster: RasterState::default(),
            blend_enable_mask: 0xFF,
            blend: [BlendExpression::default(); RENDER_TARGET_MAX_NUM],
            blend_constant_color: Vec4::ONE,
            color_mask: 0xFFFF_FFFF,
        }
    }
}

fn check_target(target: usize) -> RioResult<()> {
    engine_ensure!(
        target < RENDER_TARGET_MAX_NUM,
        "rio::gpu::RenderStateMRT",
        "render target {} out of range (max {})",
        target,
        RENDER_TARGET_MAX_NUM
    );
    Ok(())
}

impl RenderStateMRT {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipeline_state(&self) -> PipelineState {
        PipelineState {
            depth_stencil: self.depth_stencil,
            raster: self.raster,
            blend: BlendTargets::Multiple {
                enable_mask: self.blend_enable_mask,
                expressions: self.blend,
                color_mask: self.color_mask,
            },
            blend_constant_color: self.blend_constant_color,
        }
    }

    // ===== APPLY =====

    fn apply_groups(&self, ctx: &mut GraphicsContext, groups: RenderStateGroups) -> RioResult<()> {
        ctx.device_mut().apply_pipeline_state(&self.pipeline_state(), groups)
    }

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

    // ===== DEPTH / STENCIL =====

    pub fn set_depth_enable(&mut self, test: bool, write: bool) {
        self.depth_stencil.depth_test_enable = test;
        self.depth_stencil.depth_write_enable = write;
    }

    pub fn set_depth_func(&mut self, func: CompareFunc) {
        self.depth_stencil.depth_func = func;
    }

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

    pub fn depth_stencil(&self) -> &DepthStencilState {
        &self.depth_stencil
    }

    // ===== CULLING / POLYGON =====

    pub fn set_culling_mode(&mut self, mode: CullingMode) {
        self.raster.culling_mode = mode;
    }

    pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.raster.polygon_mode = mode;
    }

    pub fn set_polygon_offset_enable(&mut self, fill: bool, point_line: bool) {
        self.raster.polygon_offset_enable = fill;
        self.raster.polygon_offset_point_line_enable = point_line;
    }

    pub fn raster(&self) -> &RasterState {
        &self.raster
    }

    // ===== BLEND =====

    pub fn set_blend_enable(&mut self, target: usize, enable: bool) -> RioResult<()> {
        check_target(target)?;
        if enable {
            self.blend_enable_mask |= 1 << target;
        } else {
            self.blend_enable_mask &= !(1 << target);
        }
        Ok(())
    }

    pub fn set_blend_enable_mask(&mut self, mask: u8) {
        self.blend_enable_mask = mask;
    }

    pub fn blend_enable_mask(&self) -> u8 {
        self.blend_enable_mask
    }

    pub fn blend_enable(&self, target: usize) -> bool {
        target < RENDER_TARGET_MAX_NUM && self.blend_enable_mask & (1 << target) != 0
    }

    pub fn set_blend_expression(&mut self, target: usize, expression: BlendExpression) -> RioResult<()> {
        check_target(target)?;
        self.blend[target] = expression;
        Ok(())
    }

    pub fn blend_expression(&self, target: usize) -> Option<&BlendExpression> {
        self.blend.get(target)
    }

    pub fn set_blend_factor(&mut self, target: usize, src: BlendFactor, dst: BlendFactor) -> RioResult<()> {
        check_target(target)?;
        self.blend[target].set_blend_factor(src, dst);
        Ok(())
    }

    pub fn set_blend_factor_separate(
        &mut self,
        target: usize,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) -> RioResult<()> {
        check_target(target)?;
        self.blend[target].set_blend_factor_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
        Ok(())
    }

    pub fn set_blend_equation(&mut self, target: usize, equation: BlendEquation) -> RioResult<()> {
        check_target(target)?;
        self.blend[target].set_blend_equation(equation);
        Ok(())
    }

    pub fn set_blend_equation_separate(
        &mut self,
        target: usize,
        rgb: BlendEquation,
        alpha: BlendEquation,
    ) -> RioResult<()> {
        check_target(target)?;
        self.blend[target].set_blend_equation_separate(rgb, alpha);
        Ok(())
    }

    pub fn set_blend_constant_color(&mut self, color: Color4f) {
        self.blend_constant_color = color;
    }

    pub fn blend_constant_color(&self) -> Color4f {
        self.blend_constant_color
    }

    // ===== COLOR MASK =====

    /// Set the R,G,B,A write bits of `target` (nibble `4 * target`)
    pub fn set_color_mask(&mut self, target: usize, r: bool, g: bool, b: bool, a: bool) -> RioResult<()> {
        check_target(target)?;
        let nibble = (r as u32) | (g as u32) << 1 | (b as u32) << 2 | (a as u32) << 3;
        let shift = 4 * target as u32;
        self.color_mask = (self.color_mask & !(0xF << shift)) | nibble << shift;
        Ok(())
    }

    pub fn set_color_mask_packed(&mut self, mask: u32) {
        self.color_mask = mask;
    }

    pub fn color_mask(&self) -> u32 {
        self.color_mask
    }

    /// R, G, B, A write enables of `target`
    pub fn target_color_mask(&self, target: usize) -> Option<[bool; 4]> {
        if target >= RENDER_TARGET_MAX_NUM {
            return None;
        }
        let nibble = self.color_mask >> (4 * target);
        Some([nibble & 1 != 0, nibble & 2 != 0, nibble & 4 != 0, nibble & 8 != 0])
    }
}

#[cfg(test)]
#[path = "render_state_mrt_tests.rs"]
mod tests;
