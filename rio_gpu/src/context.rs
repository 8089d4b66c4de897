//! GraphicsContext - the device plus the GPU state tracked between calls
//!
//! Active shader mode, viewport and scissor are per-context values. Every resource operation
//! that reaches the backend takes `&mut GraphicsContext`, so only one caller at a time can
//! drive the device.

use std::any::Any;
use crate::config::GraphicsConfig;
use crate::error::RioResult;
use crate::file_device::{FileDevice, FsFileDevice};
use crate::graphics_device::GraphicsDevice;
use crate::gpu::{Backend, Scissor, ShaderMode, Viewport};
use crate::{engine_ensure, engine_info, engine_trace};

pub struct GraphicsContext {
    device: Box<dyn GraphicsDevice>,
    files: Box<dyn FileDevice>,
    config: GraphicsConfig,
    shader_mode: ShaderMode,
    viewport: Option<Viewport>,
    scissor: Option<Scissor>,
}

impl GraphicsContext {
    /// Create a context reading assets from `config.asset_root` on disk
    pub fn new(device: Box<dyn GraphicsDevice>, config: GraphicsConfig) -> Self {
        let files = Box::new(FsFileDevice::new(config.asset_root.clone()));
        Self::with_file_device(device, config, files)
    }

    /// Create a context with a custom file device
    pub fn with_file_device(
        device: Box<dyn GraphicsDevice>,
        config: GraphicsConfig,
        files: Box<dyn FileDevice>,
    ) -> Self {
        engine_info!(
            "rio::GraphicsContext",
            "Graphics context created ({:?} backend)",
            device.backend()
        );
        Self {
            device,
            files,
            config,
            shader_mode: ShaderMode::Invalid,
            viewport: None,
            scissor: None,
        }
    }

    pub fn backend(&self) -> Backend {
        self.device.backend()
    }

    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    /// Downcast the device to its concrete type
    pub fn device_as<T: Any>(&self) -> Option<&T> {
        self.device.as_any().downcast_ref::<T>()
    }

    pub fn device_as_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.device.as_any_mut().downcast_mut::<T>()
    }

    /// Load a file through the context's file device
    pub fn load_file(&self, path: &str) -> RioResult<Vec<u8>> {
        self.files.load(path)
    }

    // ===== SHADER MODE =====

    /// Mode of the last program bound through this context
    pub fn shader_mode(&self) -> ShaderMode {
        self.shader_mode
    }

    /// Switch the shader mode; the backend is only touched when the mode changes or `force` is set
    ///
    /// On GL there is no mode to track and the call does nothing.
    pub fn set_shader_mode(&mut self, mode: ShaderMode, force: bool) -> RioResult<()> {
        engine_ensure!(
            mode.is_activatable(),
            "rio::GraphicsContext",
            "cannot activate shader mode {:?}",
            mode
        );
        if self.backend() == Backend::Gl {
            return Ok(());
        }
        if !force && self.shader_mode == mode {
            return Ok(());
        }
        engine_trace!("rio::GraphicsContext", "shader mode {:?} -> {:?}", self.shader_mode, mode);
        self.device.set_shader_mode(mode)?;
        self.shader_mode = mode;
        Ok(())
    }

    // ===== VIEWPORT / SCISSOR =====

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn scissor(&self) -> Option<Scissor> {
        self.scissor
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> RioResult<()> {
        self.device.set_viewport(&viewport)?;
        self.viewport = Some(viewport);
        Ok(())
    }

    pub fn set_scissor(&mut self, scissor: Scissor) -> RioResult<()> {
        self.device.set_scissor(&scissor)?;
        self.scissor = Some(scissor);
        Ok(())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
