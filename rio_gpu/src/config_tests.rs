//! Unit tests for config.rs

use crate::config::GraphicsConfig;
use std::path::PathBuf;

#[test]
fn test_default_directories() {
    let config = GraphicsConfig::default();
    assert_eq!(config.asset_root, PathBuf::from("."));
    assert_eq!(config.texture_dir, "textures");
    assert_eq!(config.shader_dir, "shaders");
    assert_eq!(config.validate_uniform_alignment, cfg!(debug_assertions));
}

#[test]
fn test_texture_path() {
    let config = GraphicsConfig::default();
    assert_eq!(config.texture_path("grass"), "textures/grass.rtx");
}

#[test]
fn test_shader_path_with_custom_dir() {
    let config = GraphicsConfig {
        shader_dir: "content/shaders".to_string(),
        ..GraphicsConfig::default()
    };
    assert_eq!(config.shader_path("sky", "gsh"), "content/shaders/sky.gsh");
    assert_eq!(config.shader_path("sky", "frag"), "content/shaders/sky.frag");
}
