//! Clear requests for render buffers

use bitflags::bitflags;
use crate::graphics_device::{ColorTargetHandle, DepthTargetHandle};
use crate::gpu::Color4f;

bitflags! {
    /// Buffers affected by a clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const DEPTH_STENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
        const ALL = Self::COLOR.bits() | Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

/// Fully resolved clear: which targets, which values
///
/// Flags for buffers without a target have already been dropped by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearRequest {
    /// Color target and the render-target index it occupies
    pub color: Option<(ColorTargetHandle, u32)>,
    pub depth: Option<DepthTargetHandle>,
    pub flags: ClearFlags,
    pub color_value: Color4f,
    pub depth_value: f32,
    pub stencil_value: u8,
}
