//! Graphics layer configuration
//!
//! Asset locations and debug validation switches shared by every backend.

use std::path::PathBuf;

/// Configuration of a `GraphicsContext`
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsConfig {
    /// Root directory the file device resolves relative asset paths against
    pub asset_root: PathBuf,

    /// Directory (under the asset root) holding packaged `.rtx` textures
    pub texture_dir: String,

    /// Directory (under the asset root) holding shader programs
    pub shader_dir: String,

    /// Reject uniform block uploads whose offset or size is not a multiple of 4
    /// on every backend, not only on Cafe where the word swap requires it
    pub validate_uniform_alignment: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            texture_dir: "textures".to_string(),
            shader_dir: "shaders".to_string(),
            validate_uniform_alignment: cfg!(debug_assertions),
        }
    }
}

impl GraphicsConfig {
    /// Relative path of a packaged texture: `{texture_dir}/{name}.rtx`
    pub fn texture_path(&self, name: &str) -> String {
        format!("{}/{}.rtx", self.texture_dir, name)
    }

    /// Relative path of a shader file: `{shader_dir}/{base}.{extension}`
    pub fn shader_path(&self, base: &str, extension: &str) -> String {
        format!("{}/{}.{}", self.shader_dir, base, extension)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
