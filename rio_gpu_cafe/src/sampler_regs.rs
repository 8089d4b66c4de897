//! Packed GX2 sampler register block
//!
//! Three 32-bit words, laid out like the TEX_SAMPLER words the hardware reads:
//!
//! word 0: `CLAMP_X[0:2] CLAMP_Y[3:5] CLAMP_Z[6:8] XY_MAG[9:11] XY_MIN[12:14]
//!          Z_FILTER[15:16] MIP_FILTER[17:18] MAX_ANISO[19:21] BORDER[22:23] DEPTH_FUNC[26:28]`
//! word 1: `MIN_LOD[0:9] MAX_LOD[10:19]` as unsigned 4.6 fixed point, `LOD_BIAS[20:31]` as
//!          signed 6.6 fixed point
//! word 2: reserved

use crate::gx2;
use rio_gpu::rio::gpu::{
    CompareFunc, TexAnisoRatio, TexMipFilterMode, TexWrapMode, TexXYFilterMode,
};

const CLAMP_X_SHIFT: u32 = 0;
const CLAMP_Y_SHIFT: u32 = 3;
const CLAMP_Z_SHIFT: u32 = 6;
const MAG_SHIFT: u32 = 9;
const MIN_SHIFT: u32 = 12;
const Z_FILTER_SHIFT: u32 = 15;
const MIP_SHIFT: u32 = 17;
const ANISO_SHIFT: u32 = 19;
const BORDER_SHIFT: u32 = 22;
const DEPTH_FUNC_SHIFT: u32 = 26;

const MIN_LOD_SHIFT: u32 = 0;
const MAX_LOD_SHIFT: u32 = 10;
const LOD_BIAS_SHIFT: u32 = 20;

/// Anisotropic bit OR-ed into the XY filters when the ratio is above 1:1
const XY_FILTER_ANISO: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerRegs {
    pub words: [u32; 3],
    /// The border type is `VARIABLE`: binding must also write the border color
    pub has_border: bool,
}

impl SamplerRegs {
    /// `GX2InitSampler`: one clamp mode on all axes, one filter for mag and min
    pub fn init(clamp: TexWrapMode, filter: TexXYFilterMode) -> Self {
        let mut regs = Self { words: [0; 3], has_border: false };
        regs.set_clamping(clamp, clamp, clamp);
        regs.set_xy_filter(filter, filter, TexAnisoRatio::Ratio1To1);
        regs.set_zm_filter(TexMipFilterMode::Point);
        regs.set_lod(0.0, 14.0, 0.0);
        regs.set_border_type(gx2::TEX_BORDER_TRANSPARENT_BLACK);
        regs.set_depth_compare(CompareFunc::Never);
        regs
    }

    pub fn set_xy_filter(&mut self, mag: TexXYFilterMode, min: TexXYFilterMode, aniso: TexAnisoRatio) {
        let aniso_bit = if aniso == TexAnisoRatio::Ratio1To1 { 0 } else { XY_FILTER_ANISO };
        self.set_field(0, MAG_SHIFT, 3, gx2::tex_xy_filter(mag) | aniso_bit);
        self.set_field(0, MIN_SHIFT, 3, gx2::tex_xy_filter(min) | aniso_bit);
        self.set_field(0, ANISO_SHIFT, 3, gx2::tex_aniso_ratio(aniso));
    }

    /// Mip filter; the Z filter is always off for 2D textures
    pub fn set_zm_filter(&mut self, mip: TexMipFilterMode) {
        self.set_field(0, Z_FILTER_SHIFT, 2, 0);
        self.set_field(0, MIP_SHIFT, 2, gx2::tex_mip_filter(mip));
    }

    pub fn set_clamping(&mut self, x: TexWrapMode, y: TexWrapMode, z: TexWrapMode) {
        self.set_field(0, CLAMP_X_SHIFT, 3, gx2::tex_clamp(x));
        self.set_field(0, CLAMP_Y_SHIFT, 3, gx2::tex_clamp(y));
        self.set_field(0, CLAMP_Z_SHIFT, 3, gx2::tex_clamp(z));
    }

    pub fn set_border_type(&mut self, border: u32) {
        self.set_field(0, BORDER_SHIFT, 2, border);
        self.has_border = border == gx2::TEX_BORDER_VARIABLE;
    }

    pub fn set_lod(&mut self, min_lod: f32, max_lod: f32, bias: f32) {
        self.set_field(1, MIN_LOD_SHIFT, 10, unsigned_fixed_4_6(min_lod));
        self.set_field(1, MAX_LOD_SHIFT, 10, unsigned_fixed_4_6(max_lod));
        self.set_field(1, LOD_BIAS_SHIFT, 12, signed_fixed_6_6(bias));
    }

    pub fn set_depth_compare(&mut self, func: CompareFunc) {
        self.set_field(0, DEPTH_FUNC_SHIFT, 3, gx2::compare_func(func));
    }

    pub fn clamp_x(&self) -> u32 {
        self.field(0, CLAMP_X_SHIFT, 3)
    }

    pub fn clamp_y(&self) -> u32 {
        self.field(0, CLAMP_Y_SHIFT, 3)
    }

    pub fn clamp_z(&self) -> u32 {
        self.field(0, CLAMP_Z_SHIFT, 3)
    }

    pub fn mag_filter(&self) -> u32 {
        self.field(0, MAG_SHIFT, 3)
    }

    pub fn min_filter(&self) -> u32 {
        self.field(0, MIN_SHIFT, 3)
    }

    pub fn mip_filter(&self) -> u32 {
        self.field(0, MIP_SHIFT, 2)
    }

    pub fn aniso_ratio(&self) -> u32 {
        self.field(0, ANISO_SHIFT, 3)
    }

    pub fn border_type(&self) -> u32 {
        self.field(0, BORDER_SHIFT, 2)
    }

    pub fn depth_compare(&self) -> u32 {
        self.field(0, DEPTH_FUNC_SHIFT, 3)
    }

    pub fn min_lod_raw(&self) -> u32 {
        self.field(1, MIN_LOD_SHIFT, 10)
    }

    pub fn max_lod_raw(&self) -> u32 {
        self.field(1, MAX_LOD_SHIFT, 10)
    }

    pub fn lod_bias_raw(&self) -> u32 {
        self.field(1, LOD_BIAS_SHIFT, 12)
    }

    fn set_field(&mut self, word: usize, shift: u32, bits: u32, value: u32) {
        let mask = ((1u32 << bits) - 1) << shift;
        self.words[word] = (self.words[word] & !mask) | ((value << shift) & mask);
    }

    fn field(&self, word: usize, shift: u32, bits: u32) -> u32 {
        (self.words[word] >> shift) & ((1u32 << bits) - 1)
    }
}

/// Clamp to [0, 16) and convert to 4.6 fixed point
fn unsigned_fixed_4_6(value: f32) -> u32 {
    (value.clamp(0.0, 15.984_375) * 64.0) as u32
}

/// Clamp to [-32, 32) and convert to two's complement 6.6 fixed point (12 bits)
fn signed_fixed_6_6(value: f32) -> u32 {
    let fixed = (value.clamp(-32.0, 31.984_375) * 64.0) as i32;
    (fixed as u32) & 0xFFF
}

#[cfg(test)]
#[path = "sampler_regs_tests.rs"]
mod tests;
