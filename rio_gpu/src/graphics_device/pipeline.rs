//! Fixed-function pipeline state as handed to the device
//!
//! `RenderState` and `RenderStateMRT` both flatten into a `PipelineState`; the device applies
//! the groups it is asked for, in its own hardware order.

use bitflags::bitflags;
use crate::gpu::{
    BlendExpression, Color4f, CompareFunc, CullingMode, PolygonMode, StencilOp,
    RENDER_TARGET_MAX_NUM,
};

bitflags! {
    /// Pipeline-state groups an apply call touches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderStateGroups: u32 {
        /// Depth test/write/func and the stencil test
        const DEPTH_STENCIL = 1 << 0;
        /// Per-channel color write mask
        const COLOR_MASK = 1 << 1;
        /// Blend enables and expressions
        const BLEND = 1 << 2;
        const BLEND_CONSTANT = 1 << 3;
        /// Culling, polygon mode and polygon offset
        const CULLING = 1 << 4;
        /// Alpha test and alpha-to-coverage (always disabled)
        const ALPHA_TEST = 1 << 5;
        const ALL = Self::DEPTH_STENCIL.bits()
            | Self::COLOR_MASK.bits()
            | Self::BLEND.bits()
            | Self::BLEND_CONSTANT.bits()
            | Self::CULLING.bits()
            | Self::ALPHA_TEST.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStencilState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_func: CompareFunc,
    pub stencil_test_enable: bool,
    pub stencil_func: CompareFunc,
    pub stencil_ref: i32,
    pub stencil_mask: u32,
    pub stencil_op_fail: StencilOp,
    pub stencil_op_zfail: StencilOp,
    pub stencil_op_zpass: StencilOp,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_func: CompareFunc::LessEqual,
            stencil_test_enable: false,
            stencil_func: CompareFunc::Never,
            stencil_ref: 0,
            stencil_mask: 0xFFFF_FFFF,
            stencil_op_fail: StencilOp::Keep,
            stencil_op_zfail: StencilOp::Keep,
            stencil_op_zpass: StencilOp::Keep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterState {
    pub culling_mode: CullingMode,
    pub polygon_mode: PolygonMode,
    /// Polygon offset for filled polygons
    pub polygon_offset_enable: bool,
    /// Polygon offset for point and line polygon modes
    pub polygon_offset_point_line_enable: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            culling_mode: CullingMode::Back,
            polygon_mode: PolygonMode::Fill,
            polygon_offset_enable: false,
            polygon_offset_point_line_enable: false,
        }
    }
}

/// Blend configuration for one target or for all eight
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlendTargets {
    /// One expression shared by every target (render target 0 on Cafe)
    Single {
        enable: bool,
        expression: BlendExpression,
        /// R, G, B, A write enables
        color_mask: [bool; 4],
    },
    /// Independent expression per target
    Multiple {
        enable_mask: u8,
        expressions: [BlendExpression; RENDER_TARGET_MAX_NUM],
        /// Nibble `4*t` holds the R,G,B,A write bits of target `t`
        color_mask: u32,
    },
}

impl BlendTargets {
    pub fn target_enabled(&self, target: usize) -> bool {
        match self {
            BlendTargets::Single { enable, .. } => *enable,
            BlendTargets::Multiple { enable_mask, .. } => {
                target < RENDER_TARGET_MAX_NUM && enable_mask & (1 << target) != 0
            }
        }
    }

    pub fn expression(&self, target: usize) -> BlendExpression {
        match self {
            BlendTargets::Single { expression, .. } => *expression,
            BlendTargets::Multiple { expressions, .. } => {
                expressions[target.min(RENDER_TARGET_MAX_NUM - 1)]
            }
        }
    }

    /// R,G,B,A write bits (bit 0 = R) of `target`
    pub fn channel_mask(&self, target: usize) -> u8 {
        match self {
            BlendTargets::Single { color_mask, .. } => {
                color_mask
                    .iter()
                    .enumerate()
                    .fold(0, |mask, (bit, on)| mask | ((*on as u8) << bit))
            }
            BlendTargets::Multiple { color_mask, .. } => {
                if target < RENDER_TARGET_MAX_NUM {
                    ((color_mask >> (4 * target)) & 0xF) as u8
                } else {
                    0
                }
            }
        }
    }

    /// Whether any channel of any target is written
    pub fn any_color_write(&self) -> bool {
        match self {
            BlendTargets::Single { color_mask, .. } => color_mask.iter().any(|on| *on),
            BlendTargets::Multiple { color_mask, .. } => *color_mask != 0,
        }
    }

    /// Per-target blend enable bits
    pub fn enable_mask(&self) -> u8 {
        match self {
            BlendTargets::Single { enable, .. } => if *enable { 0xFF } else { 0 },
            BlendTargets::Multiple { enable_mask, .. } => *enable_mask,
        }
    }
}

/// Complete fixed-function state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineState {
    pub depth_stencil: DepthStencilState,
    pub raster: RasterState,
    pub blend: BlendTargets,
    pub blend_constant_color: Color4f,
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
