/*!
# rio GPU layer - OpenGL backend

Desktop OpenGL 3.3+ backend of the rio GPU layer, driven through `glow`.

The crate is split in two halves. `gl_format` and `gl_plan` are pure: they translate engine
formats and state into GL enums and into ordered lists of GL calls. `GlGraphicsDevice` owns the
GL objects and executes those plans against a live context. With the `gl-debug-checks` feature
(or `GlConfig::debug_checks`) every device operation drains `glGetError`.

```no_run
use rio_gpu::rio::{GraphicsConfig, GraphicsContext};
use rio_gpu_gl::{GlConfig, GlGraphicsDevice};

# fn make_context() -> glow::Context { unimplemented!() }
let gl = make_context();
let device = GlGraphicsDevice::new(gl, GlConfig::default())?;
let ctx = GraphicsContext::new(Box::new(device), GraphicsConfig::default());
# Ok::<(), rio_gpu::rio::RioError>(())
```
*/

mod gl_debug;
mod gl_graphics_device;
pub mod gl_format;
pub mod gl_plan;

pub use gl_debug::{gl_error_name, gl_error_stats, reset_gl_error_stats, GlErrorStats};
pub use gl_graphics_device::{GlConfig, GlGraphicsDevice};
