//! GX2 command stream and register model
//!
//! `Gx2Context` stands in for the GX2 library: each method corresponds to one GX2 call,
//! appends a `Gx2Command` to the ordered log and updates `Gx2Registers`, the state the GPU
//! would hold after the call. Memory is referred to by MEM2 address.

use rio_gpu::rio::{RioError, RioResult};
use crate::gx2::{self, Gx2ClearFlags, Gx2Invalidate};

/// Shader stage of a per-stage GX2 call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gx2Stage {
    Vertex,
    Pixel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilControl {
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_func: u32,
    pub stencil_test: bool,
    pub back_stencil_test: bool,
    pub front_func: u32,
    pub front_zpass: u32,
    pub front_zfail: u32,
    pub front_fail: u32,
    pub back_func: u32,
    pub back_zpass: u32,
    pub back_zfail: u32,
    pub back_fail: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilMask {
    pub front_mask: u32,
    pub front_write_mask: u32,
    pub front_ref: i32,
    pub back_mask: u32,
    pub back_write_mask: u32,
    pub back_ref: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonControl {
    pub front_face: u32,
    pub cull_front: bool,
    pub cull_back: bool,
    pub polygon_mode_enable: bool,
    pub front_mode: u32,
    pub back_mode: u32,
    pub offset_front: bool,
    pub offset_back: bool,
    pub offset_point_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorControl {
    pub logic_op: u32,
    pub blend_enable_mask: u8,
    pub multi_write: bool,
    pub color_write: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendControl {
    pub color_src: u32,
    pub color_dst: u32,
    pub color_combine: u32,
    pub separate_alpha: bool,
    pub alpha_src: u32,
    pub alpha_dst: u32,
    pub alpha_combine: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribBuffer {
    pub size: u32,
    pub stride: u32,
    pub addr: u32,
}

/// One recorded GX2 call
#[derive(Debug, Clone, PartialEq)]
pub enum Gx2Command {
    SetShaderModeEx { mode: u32, vs_gprs: u32, vs_stack: u32, gs_gprs: u32, gs_stack: u32, ps_gprs: u32, ps_stack: u32 },
    SetDepthStencilControl(DepthStencilControl),
    SetStencilMask(StencilMask),
    SetPolygonControl(PolygonControl),
    SetColorControl(ColorControl),
    SetBlendControl { target: u32, control: BlendControl },
    SetBlendConstantColor([f32; 4]),
    SetAlphaTest { enable: bool, func: u32, reference: f32 },
    SetTargetChannelMasks([u8; 8]),
    SetAlphaToMask { enable: bool },
    Invalidate { mode: Gx2Invalidate, addr: u32, size: u32 },
    InitTextureRegs { image: u32, comp_map: u32 },
    SetTexture { stage: Gx2Stage, unit: u32, image: u32 },
    SetSampler { stage: Gx2Stage, unit: u32, words: [u32; 3] },
    SetSamplerBorderColor { stage: Gx2Stage, unit: u32, color: [f32; 4] },
    SetAttribBuffer { slot: u32, buffer: AttribBuffer },
    SetFetchShader { program: u32, size: u32, attrib_count: u32 },
    SetUniformBlock { stage: Gx2Stage, index: u32, size: u32, addr: u32 },
    SetUniformReg { stage: Gx2Stage, offset: u32, words: Vec<u32> },
    SetShader { stage: Gx2Stage, program: u32 },
    InitColorBufferRegs { image: u32, view_mip: u32 },
    InitDepthBufferRegs { image: u32, view_mip: u32 },
    SetColorBuffer { image: u32, target: u32 },
    SetDepthBuffer { image: u32 },
    ClearColor { image: u32, color: [f32; 4] },
    ClearDepthStencilEx { image: u32, depth: f32, stencil: u8, flags: Gx2ClearFlags },
    ClearBuffersEx { color_image: u32, depth_image: u32, color: [f32; 4], depth: f32, stencil: u8, flags: Gx2ClearFlags },
    SetViewport { x: f32, y: f32, width: f32, height: f32, near: f32, far: f32 },
    SetScissor { x: u32, y: u32, width: u32, height: u32 },
    DrawEx { mode: u32, count: u32, first: u32, instances: u32 },
    DrawIndexedEx { mode: u32, count: u32, index_type: u32, addr: u32, base_vertex: u32, instances: u32 },
    DrawDone,
}

const STAGE_COUNT: usize = 2;

fn stage_index(stage: Gx2Stage) -> usize {
    match stage {
        Gx2Stage::Vertex => 0,
        Gx2Stage::Pixel => 1,
    }
}

/// GPU state left behind by the recorded calls
#[derive(Debug, Clone)]
pub struct Gx2Registers {
    pub shader_mode: Option<u32>,
    pub depth_stencil: Option<DepthStencilControl>,
    pub stencil_mask: Option<StencilMask>,
    pub polygon: Option<PolygonControl>,
    pub color_control: Option<ColorControl>,
    pub blend: [Option<BlendControl>; 8],
    pub blend_constant_color: [f32; 4],
    pub alpha_test: Option<(bool, u32, f32)>,
    pub channel_masks: [u8; 8],
    pub alpha_to_mask: Option<bool>,
    textures: [[Option<u32>; gx2::SAMPLER_UNIT_NUM as usize]; STAGE_COUNT],
    samplers: [[Option<[u32; 3]>; gx2::SAMPLER_UNIT_NUM as usize]; STAGE_COUNT],
    border_colors: [[Option<[f32; 4]>; gx2::SAMPLER_UNIT_NUM as usize]; STAGE_COUNT],
    pub attrib_buffers: [Option<AttribBuffer>; 16],
    pub fetch_shader: Option<u32>,
    uniform_blocks: [[Option<(u32, u32)>; gx2::UNIFORM_BLOCK_NUM as usize]; STAGE_COUNT],
    uniform_regs: [Vec<u32>; STAGE_COUNT],
    shaders: [Option<u32>; STAGE_COUNT],
    pub color_buffers: [Option<u32>; 8],
    pub depth_buffer: Option<u32>,
    pub viewport: Option<[f32; 6]>,
    pub scissor: Option<[u32; 4]>,
}

impl Default for Gx2Registers {
    fn default() -> Self {
        const UNITS: usize = gx2::SAMPLER_UNIT_NUM as usize;
        const BLOCKS: usize = gx2::UNIFORM_BLOCK_NUM as usize;
        Self {
            shader_mode: None,
            depth_stencil: None,
            stencil_mask: None,
            polygon: None,
            color_control: None,
            blend: [None; 8],
            blend_constant_color: [0.0; 4],
            alpha_test: None,
            channel_masks: [0; 8],
            alpha_to_mask: None,
            textures: [[None; UNITS]; STAGE_COUNT],
            samplers: [[None; UNITS]; STAGE_COUNT],
            border_colors: [[None; UNITS]; STAGE_COUNT],
            attrib_buffers: [None; 16],
            fetch_shader: None,
            uniform_blocks: [[None; BLOCKS]; STAGE_COUNT],
            uniform_regs: [
                vec![0; gx2::UNIFORM_REGISTER_WORDS],
                vec![0; gx2::UNIFORM_REGISTER_WORDS],
            ],
            shaders: [None; STAGE_COUNT],
            color_buffers: [None; 8],
            depth_buffer: None,
            viewport: None,
            scissor: None,
        }
    }
}

impl Gx2Registers {
    /// Image address bound at a sampler unit
    pub fn texture(&self, stage: Gx2Stage, unit: u32) -> Option<u32> {
        self.textures[stage_index(stage)].get(unit as usize).copied().flatten()
    }

    pub fn sampler(&self, stage: Gx2Stage, unit: u32) -> Option<[u32; 3]> {
        self.samplers[stage_index(stage)].get(unit as usize).copied().flatten()
    }

    pub fn border_color(&self, stage: Gx2Stage, unit: u32) -> Option<[f32; 4]> {
        self.border_colors[stage_index(stage)].get(unit as usize).copied().flatten()
    }

    /// (size, address) of the uniform block at `index`
    pub fn uniform_block(&self, stage: Gx2Stage, index: u32) -> Option<(u32, u32)> {
        self.uniform_blocks[stage_index(stage)].get(index as usize).copied().flatten()
    }

    /// The uniform register file of a stage
    pub fn uniform_regs(&self, stage: Gx2Stage) -> &[u32] {
        &self.uniform_regs[stage_index(stage)]
    }

    pub fn shader(&self, stage: Gx2Stage) -> Option<u32> {
        self.shaders[stage_index(stage)]
    }
}

/// Recorder for GX2 calls
#[derive(Debug, Default)]
pub struct Gx2Context {
    registers: Gx2Registers,
    commands: Vec<Gx2Command>,
}

impl Gx2Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registers(&self) -> &Gx2Registers {
        &self.registers
    }

    pub fn commands(&self) -> &[Gx2Command] {
        &self.commands
    }

    /// Drain the command log (the registers keep their state)
    pub fn take_commands(&mut self) -> Vec<Gx2Command> {
        std::mem::take(&mut self.commands)
    }

    fn push(&mut self, command: Gx2Command) {
        #[cfg(feature = "gx2-trace")]
        rio_gpu::engine_trace!("rio::cafe::gx2", "{:?}", command);
        self.commands.push(command);
    }

    // ===== SHADER MODE =====

    pub fn set_shader_mode_ex(&mut self, mode: u32) {
        self.registers.shader_mode = Some(mode);
        self.push(Gx2Command::SetShaderModeEx {
            mode,
            vs_gprs: gx2::SHADER_MODE_VS_GPRS,
            vs_stack: gx2::SHADER_MODE_VS_STACK,
            gs_gprs: gx2::SHADER_MODE_GS_GPRS,
            gs_stack: gx2::SHADER_MODE_GS_STACK,
            ps_gprs: gx2::SHADER_MODE_PS_GPRS,
            ps_stack: gx2::SHADER_MODE_PS_STACK,
        });
    }

    // ===== FIXED FUNCTION =====

    pub fn set_depth_stencil_control(&mut self, control: DepthStencilControl) {
        self.registers.depth_stencil = Some(control);
        self.push(Gx2Command::SetDepthStencilControl(control));
    }

    pub fn set_stencil_mask(&mut self, mask: StencilMask) {
        self.registers.stencil_mask = Some(mask);
        self.push(Gx2Command::SetStencilMask(mask));
    }

    pub fn set_polygon_control(&mut self, control: PolygonControl) {
        self.registers.polygon = Some(control);
        self.push(Gx2Command::SetPolygonControl(control));
    }

    pub fn set_color_control(&mut self, control: ColorControl) {
        self.registers.color_control = Some(control);
        self.push(Gx2Command::SetColorControl(control));
    }

    pub fn set_blend_control(&mut self, target: u32, control: BlendControl) {
        if let Some(slot) = self.registers.blend.get_mut(target as usize) {
            *slot = Some(control);
        }
        self.push(Gx2Command::SetBlendControl { target, control });
    }

    pub fn set_blend_constant_color(&mut self, color: [f32; 4]) {
        self.registers.blend_constant_color = color;
        self.push(Gx2Command::SetBlendConstantColor(color));
    }

    pub fn set_alpha_test(&mut self, enable: bool, func: u32, reference: f32) {
        self.registers.alpha_test = Some((enable, func, reference));
        self.push(Gx2Command::SetAlphaTest { enable, func, reference });
    }

    pub fn set_target_channel_masks(&mut self, masks: [u8; 8]) {
        self.registers.channel_masks = masks;
        self.push(Gx2Command::SetTargetChannelMasks(masks));
    }

    pub fn set_alpha_to_mask(&mut self, enable: bool) {
        self.registers.alpha_to_mask = Some(enable);
        self.push(Gx2Command::SetAlphaToMask { enable });
    }

    // ===== MEMORY =====

    pub fn invalidate(&mut self, mode: Gx2Invalidate, addr: u32, size: u32) {
        self.push(Gx2Command::Invalidate { mode, addr, size });
    }

    pub fn draw_done(&mut self) {
        self.push(Gx2Command::DrawDone);
    }

    // ===== DRAW =====

    pub fn draw_ex(&mut self, mode: u32, count: u32, first: u32, instances: u32) {
        self.push(Gx2Command::DrawEx { mode, count, first, instances });
    }

    /// Indexed draw reading `count` indices of `index_type` at `addr`
    pub fn draw_indexed_ex(&mut self, mode: u32, count: u32, index_type: u32, addr: u32, instances: u32) -> RioResult<()> {
        if addr % gx2::INDEX_BUFFER_ALIGNMENT != 0 {
            return Err(RioError::ContractViolation(format!(
                "index data at {:#X} is not {:#X}-aligned",
                addr,
                gx2::INDEX_BUFFER_ALIGNMENT
            )));
        }
        self.push(Gx2Command::DrawIndexedEx { mode, count, index_type, addr, base_vertex: 0, instances });
        Ok(())
    }

    // ===== TEXTURES / SAMPLERS =====

    pub fn init_texture_regs(&mut self, image: u32, comp_map: u32) {
        self.push(Gx2Command::InitTextureRegs { image, comp_map });
    }

    pub fn set_texture(&mut self, stage: Gx2Stage, unit: u32, image: u32) -> RioResult<()> {
        check_unit(unit)?;
        self.registers.textures[stage_index(stage)][unit as usize] = Some(image);
        self.push(Gx2Command::SetTexture { stage, unit, image });
        Ok(())
    }

    pub fn set_sampler(&mut self, stage: Gx2Stage, unit: u32, words: [u32; 3]) -> RioResult<()> {
        check_unit(unit)?;
        self.registers.samplers[stage_index(stage)][unit as usize] = Some(words);
        self.push(Gx2Command::SetSampler { stage, unit, words });
        Ok(())
    }

    pub fn set_sampler_border_color(&mut self, stage: Gx2Stage, unit: u32, color: [f32; 4]) -> RioResult<()> {
        check_unit(unit)?;
        self.registers.border_colors[stage_index(stage)][unit as usize] = Some(color);
        self.push(Gx2Command::SetSamplerBorderColor { stage, unit, color });
        Ok(())
    }

    // ===== VERTEX INPUT =====

    pub fn set_attrib_buffer(&mut self, slot: u32, buffer: AttribBuffer) -> RioResult<()> {
        let entry = self.registers.attrib_buffers.get_mut(slot as usize).ok_or_else(|| {
            RioError::ContractViolation(format!("attribute buffer slot {} out of range", slot))
        })?;
        *entry = Some(buffer);
        self.push(Gx2Command::SetAttribBuffer { slot, buffer });
        Ok(())
    }

    pub fn set_fetch_shader(&mut self, program: u32, size: u32, attrib_count: u32) {
        self.registers.fetch_shader = Some(program);
        self.push(Gx2Command::SetFetchShader { program, size, attrib_count });
    }

    // ===== SHADERS / UNIFORMS =====

    pub fn set_shader(&mut self, stage: Gx2Stage, program: u32) {
        self.registers.shaders[stage_index(stage)] = Some(program);
        self.push(Gx2Command::SetShader { stage, program });
    }

    pub fn set_uniform_block(&mut self, stage: Gx2Stage, index: u32, size: u32, addr: u32) -> RioResult<()> {
        let entry = self.registers.uniform_blocks[stage_index(stage)]
            .get_mut(index as usize)
            .ok_or_else(|| {
                RioError::ContractViolation(format!("uniform block index {} out of range", index))
            })?;
        *entry = Some((size, addr));
        self.push(Gx2Command::SetUniformBlock { stage, index, size, addr });
        Ok(())
    }

    /// Write `words` into the register file starting at word `offset`
    pub fn set_uniform_reg(&mut self, stage: Gx2Stage, offset: u32, words: &[u32]) -> RioResult<()> {
        let start = offset as usize;
        let regs = &mut self.registers.uniform_regs[stage_index(stage)];
        let end = start
            .checked_add(words.len())
            .filter(|end| *end <= regs.len())
            .ok_or_else(|| {
                RioError::ContractViolation(format!(
                    "{} uniform words at register {} overrun the {}-word file",
                    words.len(), offset, gx2::UNIFORM_REGISTER_WORDS
                ))
            })?;
        regs[start..end].copy_from_slice(words);
        self.push(Gx2Command::SetUniformReg { stage, offset, words: words.to_vec() });
        Ok(())
    }

    // ===== RENDER TARGETS =====

    pub fn init_color_buffer_regs(&mut self, image: u32, view_mip: u32) {
        self.push(Gx2Command::InitColorBufferRegs { image, view_mip });
    }

    pub fn init_depth_buffer_regs(&mut self, image: u32, view_mip: u32) {
        self.push(Gx2Command::InitDepthBufferRegs { image, view_mip });
    }

    pub fn set_color_buffer(&mut self, image: u32, target: u32) -> RioResult<()> {
        let entry = self.registers.color_buffers.get_mut(target as usize).ok_or_else(|| {
            RioError::ContractViolation(format!("render target {} out of range", target))
        })?;
        *entry = Some(image);
        self.push(Gx2Command::SetColorBuffer { image, target });
        Ok(())
    }

    pub fn set_depth_buffer(&mut self, image: u32) {
        self.registers.depth_buffer = Some(image);
        self.push(Gx2Command::SetDepthBuffer { image });
    }

    pub fn clear_color(&mut self, image: u32, color: [f32; 4]) {
        self.push(Gx2Command::ClearColor { image, color });
    }

    pub fn clear_depth_stencil_ex(&mut self, image: u32, depth: f32, stencil: u8, flags: Gx2ClearFlags) {
        self.push(Gx2Command::ClearDepthStencilEx { image, depth, stencil, flags });
    }

    pub fn clear_buffers_ex(
        &mut self,
        color_image: u32,
        depth_image: u32,
        color: [f32; 4],
        depth: f32,
        stencil: u8,
        flags: Gx2ClearFlags,
    ) {
        self.push(Gx2Command::ClearBuffersEx { color_image, depth_image, color, depth, stencil, flags });
    }

    pub fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32, near: f32, far: f32) {
        self.registers.viewport = Some([x, y, width, height, near, far]);
        self.push(Gx2Command::SetViewport { x, y, width, height, near, far });
    }

    pub fn set_scissor(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.registers.scissor = Some([x, y, width, height]);
        self.push(Gx2Command::SetScissor { x, y, width, height });
    }
}

fn check_unit(unit: u32) -> RioResult<()> {
    if unit < gx2::SAMPLER_UNIT_NUM {
        Ok(())
    } else {
        Err(RioError::ContractViolation(format!("sampler unit {} out of range", unit)))
    }
}

#[cfg(test)]
#[path = "gx2_state_tests.rs"]
mod tests;
