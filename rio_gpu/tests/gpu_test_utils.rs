#![allow(dead_code)]
//! Shared helpers for the integration tests
//!
//! Every test runs the core types against the Cafe backend model, which needs no GPU. Assets
//! (packaged textures and GFD shaders) are built in memory and served through a
//! `MemoryFileDevice`.

use std::sync::{Arc, Mutex};
use rio_gpu::rio::{GraphicsConfig, GraphicsContext, MemoryFileDevice};
use rio_gpu::rio::gpu::{NativeFormat, Surface, TextureFile, TextureFormat};
use rio_gpu::rio::log::{LogEntry, Logger};
use rio_gpu_cafe::gfd::{
    self, AttribVar, GfdShaderFile, PixelShaderBinary, SamplerVar, UniformBlockVar, UniformVar,
    VertexShaderBinary,
};
use rio_gpu_cafe::{CafeConfig, CafeGraphicsDevice};

pub const SHADER_MODE_UNIFORM_REGISTER: u32 = 0;
pub const SHADER_MODE_UNIFORM_BLOCK: u32 = 1;

/// Context over a fresh Cafe device reading from `files`
pub fn cafe_context(files: MemoryFileDevice) -> GraphicsContext {
    let device = CafeGraphicsDevice::new(CafeConfig {
        mem2_base: 0x1000_0000,
        mem2_size: 0x0100_0000,
    });
    GraphicsContext::with_file_device(Box::new(device), GraphicsConfig::default(), Box::new(files))
}

pub fn cafe(ctx: &GraphicsContext) -> &CafeGraphicsDevice {
    ctx.device_as::<CafeGraphicsDevice>().expect("context runs on the Cafe device")
}

/// Deterministic pixel bytes: byte `i` is `seed + i`
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}

/// A packaged `.rtx` texture and the bytes of its image and mip chain
pub fn rtx_file(format: TextureFormat, width: u32, height: u32, mips: u32) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let surface = Surface::new(format, width, height, mips).unwrap();
    let image = pattern(surface.image_size as usize, 1);
    let mipmaps = if mips > 1 { pattern(surface.mipmap_size as usize, 100) } else { Vec::new() };
    let bytes = TextureFile::write(
        &surface,
        format.default_comp_map(),
        NativeFormat::default(),
        &image,
        (mips > 1).then_some(mipmaps.as_slice()),
    )
    .expect("surface and data agree");
    (bytes, image, mipmaps)
}

/// GFD container with one attribute, one uniform, one uniform block per stage and a sampler
pub fn gsh_file(vs_mode: u32, ps_mode: u32) -> Vec<u8> {
    let mut vertex = VertexShaderBinary::new(vs_mode, vec![0xA5; 256]);
    vertex.attrib_vars.push(AttribVar { name: "aPosition".into(), var_type: 0x0A, count: 0, location: 0 });
    vertex.attrib_vars.push(AttribVar { name: "aTexCoord".into(), var_type: 0x09, count: 0, location: 1 });
    vertex.uniform_vars.push(UniformVar { name: "uMvp".into(), var_type: 0x17, count: 1, offset: 8, block: -1 });
    vertex.uniform_blocks.push(UniformBlockVar { name: "cView".into(), offset: 1, size: 64 });

    let mut pixel = PixelShaderBinary::new(ps_mode, vec![0x5A; 128]);
    pixel.sampler_vars.push(SamplerVar { name: "sAlbedo".into(), var_type: 1, location: 2 });
    pixel.uniform_vars.push(UniformVar { name: "uTint".into(), var_type: 0x0C, count: 1, offset: 4, block: -1 });
    pixel.uniform_blocks.push(UniformBlockVar { name: "cLight".into(), offset: 3, size: 32 });

    gfd::write(&GfdShaderFile { vertex, pixel })
}

/// Logger collecting every entry it receives
pub struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    pub fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}
