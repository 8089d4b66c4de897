//! UniformBlock - a std140 uniform buffer bound to the vertex and/or fragment stage
//!
//! The block owns its bytes. On backends that read uniforms big-endian every 32-bit word is
//! byte-swapped when the data enters the block, so the stored buffer is already in GPU order;
//! `read_word` undoes the swap for CPU-side inspection.

use crate::context::GraphicsContext;
use crate::error::RioResult;
use crate::graphics_device::{BufferUpload, UniformBlockHandle};
use crate::gpu::graphics::ShaderStage;
use crate::{engine_debug, engine_ensure};

#[derive(Debug)]
pub struct UniformBlock {
    handle: UniformBlockHandle,
    stage: ShaderStage,
    vs_index: u32,
    fs_index: u32,
    data: Vec<u8>,
    /// Stored words are byte-swapped relative to the CPU
    swapped: bool,
}

/// Swap every 32-bit word of `bytes` in place
fn swap_words(bytes: &mut [u8]) {
    for word in bytes.chunks_exact_mut(4) {
        word.reverse();
    }
}

impl UniformBlock {
    /// Block with the same binding index for both stages
    pub fn new(ctx: &mut GraphicsContext, stage: ShaderStage, binding: u32) -> RioResult<Self> {
        Self::with_indices(ctx, stage, binding, binding)
    }

    pub fn with_indices(
        ctx: &mut GraphicsContext,
        stage: ShaderStage,
        vs_index: u32,
        fs_index: u32,
    ) -> RioResult<Self> {
        let handle = ctx.device_mut().create_uniform_block()?;
        let swapped = ctx.device().swaps_uniform_words();
        engine_debug!(
            "rio::gpu::UniformBlock",
            "Created uniform block (stage {:?}, vs {}, fs {})",
            stage,
            vs_index,
            fs_index
        );
        Ok(Self { handle, stage, vs_index, fs_index, data: Vec::new(), swapped })
    }

    pub fn handle(&self) -> UniformBlockHandle {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: ShaderStage) {
        self.stage = stage;
    }

    pub fn set_indices(&mut self, vs_index: u32, fs_index: u32) {
        self.vs_index = vs_index;
        self.fs_index = fs_index;
    }

    pub fn vs_index(&self) -> u32 {
        self.vs_index
    }

    pub fn fs_index(&self) -> u32 {
        self.fs_index
    }

    /// Declared byte size (size of the last whole upload)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Stored bytes, in GPU order
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Word `index` in CPU order
    pub fn read_word(&self, index: usize) -> Option<u32> {
        let start = index.checked_mul(4)?;
        let mut word: [u8; 4] = self.data.get(start..start + 4)?.try_into().ok()?;
        if self.swapped {
            word.reverse();
        }
        Some(u32::from_ne_bytes(word))
    }

    fn needs_word_alignment(&self, ctx: &GraphicsContext) -> bool {
        self.swapped || ctx.config().validate_uniform_alignment
    }

    // ===== UPLOAD =====

    /// Take `data` as the new contents
    pub fn upload_consuming(&mut self, ctx: &mut GraphicsContext, data: Vec<u8>) -> RioResult<()> {
        self.upload(ctx, data, false)
    }

    /// Take `data` as the new contents and invalidate the GPU uniform cache over them
    pub fn upload_consuming_invalidate(
        &mut self,
        ctx: &mut GraphicsContext,
        data: Vec<u8>,
    ) -> RioResult<()> {
        self.upload(ctx, data, true)
    }

    fn upload(&mut self, ctx: &mut GraphicsContext, mut data: Vec<u8>, invalidate: bool) -> RioResult<()> {
        engine_ensure!(!data.is_empty(), "rio::gpu::UniformBlock", "uniform data is empty");
        engine_ensure!(
            !self.needs_word_alignment(ctx) || data.len() % 4 == 0,
            "rio::gpu::UniformBlock",
            "uniform data size {} is not a multiple of 4",
            data.len()
        );
        if self.swapped {
            swap_words(&mut data);
        }
        let mode = BufferUpload::for_sizes(self.data.len(), data.len());
        ctx.device_mut()
            .upload_uniform_block(self.handle, &data, mode, invalidate)?;
        self.data = data;
        Ok(())
    }

    /// Overwrite `data.len()` bytes at `offset`; `data` itself is left untouched
    pub fn set_sub_data(&mut self, ctx: &mut GraphicsContext, offset: usize, data: &[u8]) -> RioResult<()> {
        self.update(ctx, offset, data, false)
    }

    pub fn set_sub_data_invalidate(
        &mut self,
        ctx: &mut GraphicsContext,
        offset: usize,
        data: &[u8],
    ) -> RioResult<()> {
        self.update(ctx, offset, data, true)
    }

    fn update(
        &mut self,
        ctx: &mut GraphicsContext,
        offset: usize,
        data: &[u8],
        invalidate: bool,
    ) -> RioResult<()> {
        engine_ensure!(
            !self.needs_word_alignment(ctx) || (offset % 4 == 0 && data.len() % 4 == 0),
            "rio::gpu::UniformBlock",
            "sub data at {} (+{}) is not word aligned",
            offset,
            data.len()
        );
        let end = offset.checked_add(data.len()).unwrap_or(usize::MAX);
        engine_ensure!(
            end <= self.data.len(),
            "rio::gpu::UniformBlock",
            "sub data {}..{} exceeds block size {}",
            offset,
            end,
            self.data.len()
        );
        if data.is_empty() {
            return Ok(());
        }

        let region = &mut self.data[offset..end];
        region.copy_from_slice(data);
        if self.swapped {
            swap_words(region);
        }
        ctx.device_mut()
            .update_uniform_block(self.handle, offset as u32, &self.data[offset..end], invalidate)
    }

    // ===== BIND =====

    /// Bind to every stage in `stage`; nothing happens when no stage is set
    pub fn bind(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        if self.stage.is_empty() {
            return Ok(());
        }
        let vs = self.stage.contains(ShaderStage::VERTEX).then_some(self.vs_index);
        let fs = self.stage.contains(ShaderStage::FRAGMENT).then_some(self.fs_index);
        ctx.device_mut().bind_uniform_block(self.handle, self.stage, vs, fs)
    }

    pub fn destroy(self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().destroy_uniform_block(self.handle)
    }
}

#[cfg(test)]
#[path = "uniform_block_tests.rs"]
mod tests;
