//! Graphics device module - backend trait, handles and the descriptors passed across it

// Module declarations
pub mod graphics_device;
pub mod buffer;
pub mod texture;
pub mod shader;
pub mod pipeline;
pub mod frame_buffer;
pub mod draw;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use buffer::*;
pub use texture::*;
pub use shader::*;
pub use pipeline::*;
pub use frame_buffer::*;
pub use draw::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
