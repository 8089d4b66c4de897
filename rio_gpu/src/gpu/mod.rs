//! GPU resource module - user-facing resources and the value types they are built from

// Value types
pub mod graphics;
pub mod texture_format;
pub mod surface;
pub mod texture_file;
pub mod vertex_stream;
pub mod uniform;

// Resources
pub mod texture;
pub mod texture_sampler;
pub mod vertex_buffer;
pub mod vertex_array;
pub mod uniform_block;
pub mod shader;
pub mod render_state;
pub mod render_state_mrt;
pub mod render_target;
pub mod render_buffer;
pub mod drawer;

pub use graphics::*;
pub use texture_format::*;
pub use surface::*;
pub use texture_file::*;
pub use vertex_stream::*;
pub use uniform::*;
pub use texture::*;
pub use texture_sampler::*;
pub use vertex_buffer::*;
pub use vertex_array::*;
pub use uniform_block::*;
pub use shader::*;
pub use render_state::*;
pub use render_state_mrt::*;
pub use render_target::*;
pub use render_buffer::*;
pub use drawer::*;
