//! Buffer upload and vertex-input descriptors passed to the device

use crate::graphics_device::VertexBufferHandle;
use crate::gpu::VertexFormat;

/// How a whole-buffer upload relates to the previous contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUpload {
    /// Same byte size as before: the backend may update its storage in place
    Update,
    /// Size changed (or first upload): the backend must reallocate
    Reallocate,
}

impl BufferUpload {
    /// Pick the upload mode from the previous and new byte sizes
    pub fn for_sizes(previous: usize, new: usize) -> Self {
        if previous == new {
            BufferUpload::Update
        } else {
            BufferUpload::Reallocate
        }
    }
}

/// One vertex attribute as the device sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributeDesc {
    /// Shader attribute location
    pub location: u32,
    pub format: VertexFormat,
    /// Byte offset of the attribute inside one vertex
    pub offset: u32,
    /// Buffer slot (0..16) the attribute reads from
    pub buffer_slot: u32,
}

/// A vertex buffer occupying a slot of a vertex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferBinding {
    pub slot: u32,
    pub buffer: VertexBufferHandle,
}
