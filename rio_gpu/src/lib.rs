/*!
# rio GPU layer

Platform-neutral GPU resource and pipeline-state types for the rio engine runtime.

Every resource type in this crate describes *what* the engine wants (a texture with a given
surface layout, a sampler state, a set of vertex streams, a blend setup) and hands the backend
part of the work to a `GraphicsDevice` implementation through a `GraphicsContext`. Two backends
exist as sibling crates:

- `rio_gpu_cafe`: GX2-class console GPU (register file, MEM2 heap, big-endian uniform words)
- `rio_gpu_gl`: desktop OpenGL 3.3+ through `glow`

## Architecture

- **GraphicsContext**: owns the device and the state the engine tracks between calls
  (shader mode, viewport, scissor)
- **GraphicsDevice**: backend trait, handle based
- **TextureFormat / Surface**: pixel formats, byte sizes and mip-chain layout
- **Texture2D / TextureSampler2D**: sampled images and sampling state
- **VertexStream / VertexBuffer / VertexArray**: vertex attribute pipeline
- **UniformBlock / Shader**: shader programs and their inputs
- **RenderState / RenderStateMRT**: fixed-function pipeline state
- **RenderTargetColor / RenderTargetDepth / RenderBuffer**: render targets and their clears
*/

// Internal modules
mod error;
mod engine;
mod config;
mod context;
mod file_device;
pub mod log;
pub mod graphics_device;
pub mod gpu;

// Main rio namespace module
pub mod rio {
    // Error types
    pub use crate::error::{RioError, RioResult};

    // Logging hub
    pub use crate::engine::Engine;

    // Context, configuration and file access
    pub use crate::config::GraphicsConfig;
    pub use crate::context::GraphicsContext;
    pub use crate::file_device::{FileDevice, FsFileDevice, MemoryFileDevice};

    // Logging sub-module (types only; the engine_* macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, format_entry};
    }

    // Backend-facing trait and handle types
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Resource and pipeline-state types
    pub mod gpu {
        pub use crate::gpu::*;
    }
}

// Re-export math library at crate root
pub use glam;
