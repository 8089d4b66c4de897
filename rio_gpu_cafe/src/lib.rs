/*!
# rio GPU layer - Cafe backend

GX2-class console backend of the rio GPU layer.

The GX2 hardware is not reachable from a host build, so this crate models the parts of it the
engine depends on: the register state each GX2 call leaves behind, an ordered log of every call
(`Gx2Command`), a MEM2 heap holding textures, buffers and shader programs, and the cache
invalidation stream. Shader programs come from GFD (`.gsh`) containers; vertex layouts are turned
into fetch-shader microcode.

```no_run
use rio_gpu::rio::{GraphicsConfig, GraphicsContext};
use rio_gpu_cafe::{CafeConfig, CafeGraphicsDevice};

let device = CafeGraphicsDevice::new(CafeConfig::default());
let ctx = GraphicsContext::new(Box::new(device), GraphicsConfig::default());
```
*/

mod cafe_format;
mod cafe_graphics_device;
mod fetch_shader;
mod gx2;
mod gx2_state;
mod mem2_heap;
mod sampler_regs;
pub mod gfd;

pub use cafe_format::{attrib_format, attrib_mask};
pub use cafe_graphics_device::{CafeConfig, CafeGraphicsDevice};
pub use fetch_shader::{build_fetch_shader, FetchShader};
pub use gx2::{Gx2ClearFlags, Gx2Invalidate};
pub use gx2_state::{
    AttribBuffer, BlendControl, ColorControl, DepthStencilControl, Gx2Command, Gx2Context,
    Gx2Registers, Gx2Stage, PolygonControl, StencilMask,
};
pub use mem2_heap::Mem2Heap;
pub use sampler_regs::SamplerRegs;
