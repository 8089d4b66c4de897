//! Fetch shader generation
//!
//! A vertex layout becomes a small R700-style fetch program: control-flow (CF) instructions
//! first, each `VTX` clause covering up to 16 fetches, then a `RETURN` flagged end-of-program.
//! The fetch instructions follow at the next 16-byte boundary, one 16-byte instruction per
//! attribute. Words are stored big-endian, the way the GPU reads them.
//!
//! CF word 1: `COUNT-1[10:12] COUNT_3[19] END_OF_PROGRAM[21] CF_INST[23:29] BARRIER[31]`
//!
//! Fetch words:
//! - 0: `BUFFER_ID[8:15] SRC_GPR[16:22] MEGA_FETCH_COUNT[26:31]`
//! - 1: `DST_GPR[0:6] DST_SEL_XYZW[9:20] DATA_FORMAT[22:27] NUM_FORMAT[28:29] FORMAT_COMP[30]`
//! - 2: `OFFSET[0:15] ENDIAN_SWAP[16:17] MEGA_FETCH[19]`

use rio_gpu::engine_ensure;
use rio_gpu::rio::RioResult;
use rio_gpu::rio::device::VertexAttributeDesc;
use crate::cafe_format::{self, attrib_format, attrib_mask};

pub const CF_INST_VTX: u32 = 2;
pub const CF_INST_RETURN: u32 = 14;
/// Fetch constants for attribute buffers start here
pub const ATTRIB_BUFFER_ID_BASE: u32 = 160;

const FETCHES_PER_CLAUSE: usize = 16;
const CF_SIZE: usize = 8;
const FETCH_SIZE: usize = 16;
const MAX_ATTRIB_BUFFERS: u32 = 16;
const MAX_GPRS: u32 = 128;

const ENDIAN_NONE: u32 = 0;
const ENDIAN_8IN16: u32 = 1;
const ENDIAN_8IN32: u32 = 2;

/// Generated fetch program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchShader {
    pub program: Vec<u8>,
    pub attrib_count: u32,
    /// GPRs written by the fetches (highest destination + 1)
    pub num_gprs: u32,
}

impl FetchShader {
    pub fn size(&self) -> u32 {
        self.program.len() as u32
    }

    /// Number of control-flow instructions (clauses plus the final return)
    pub fn cf_count(&self) -> usize {
        cf_count(self.attrib_count as usize)
    }

    /// Byte offset of the first fetch instruction
    pub fn fetch_offset(&self) -> usize {
        fetch_offset(self.attrib_count as usize)
    }

    /// Word `word` (0..4) of fetch instruction `index`
    pub fn fetch_word(&self, index: usize, word: usize) -> Option<u32> {
        let at = self.fetch_offset() + index * FETCH_SIZE + word * 4;
        read_word(&self.program, at)
    }

    /// Word `word` (0..2) of CF instruction `index`
    pub fn cf_word(&self, index: usize, word: usize) -> Option<u32> {
        read_word(&self.program, index * CF_SIZE + word * 4)
    }
}

fn cf_count(attrib_count: usize) -> usize {
    attrib_count.div_ceil(FETCHES_PER_CLAUSE) + 1
}

fn fetch_offset(attrib_count: usize) -> usize {
    (cf_count(attrib_count) * CF_SIZE).next_multiple_of(16)
}

fn read_word(bytes: &[u8], at: usize) -> Option<u32> {
    let slice = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

fn write_word(bytes: &mut [u8], at: usize, word: u32) {
    bytes[at..at + 4].copy_from_slice(&word.to_be_bytes());
}

fn cf_word1(inst: u32, count: usize, end_of_program: bool) -> u32 {
    let count_minus_one = count.saturating_sub(1) as u32;
    ((count_minus_one & 0x7) << 10)
        | (((count_minus_one >> 3) & 0x1) << 19)
        | ((end_of_program as u32) << 21)
        | ((inst & 0x7F) << 23)
        | (1 << 31)
}

/// Build the fetch program for `attributes`
///
/// Attributes are emitted in the order given; each one must read from a valid buffer slot and
/// write a valid register.
pub fn build_fetch_shader(attributes: &[VertexAttributeDesc]) -> RioResult<FetchShader> {
    for attr in attributes {
        engine_ensure!(
            attr.buffer_slot < MAX_ATTRIB_BUFFERS,
            "rio::cafe::FetchShader",
            "attribute at location {} reads buffer slot {}",
            attr.location,
            attr.buffer_slot
        );
        engine_ensure!(
            attr.location < MAX_GPRS,
            "rio::cafe::FetchShader",
            "attribute location {} exceeds the register file",
            attr.location
        );
        engine_ensure!(
            attr.offset <= 0xFFFF,
            "rio::cafe::FetchShader",
            "attribute offset {} does not fit a fetch instruction",
            attr.offset
        );
    }

    let count = attributes.len();
    let fetch_start = fetch_offset(count);
    let mut program = vec![0u8; fetch_start + count * FETCH_SIZE];

    let clauses = count.div_ceil(FETCHES_PER_CLAUSE);
    for clause in 0..clauses {
        let first = clause * FETCHES_PER_CLAUSE;
        let in_clause = (count - first).min(FETCHES_PER_CLAUSE);
        let addr = ((fetch_start + first * FETCH_SIZE) / 8) as u32;
        write_word(&mut program, clause * CF_SIZE, addr);
        write_word(&mut program, clause * CF_SIZE + 4, cf_word1(CF_INST_VTX, in_clause, false));
    }
    write_word(&mut program, clauses * CF_SIZE + 4, cf_word1(CF_INST_RETURN, 1, true));

    for (i, attr) in attributes.iter().enumerate() {
        let code = attrib_format(attr.format);
        let mask = attrib_mask(code);
        let at = fetch_start + i * FETCH_SIZE;

        let mega_fetch_count = attr.format.byte_size().saturating_sub(1) & 0x3F;
        let word0 = ((ATTRIB_BUFFER_ID_BASE + attr.buffer_slot) << 8) | (mega_fetch_count << 26);

        let dst_sel = (((mask >> 24) & 0x7) << 9)
            | (((mask >> 16) & 0x7) << 12)
            | (((mask >> 8) & 0x7) << 15)
            | ((mask & 0x7) << 18);
        let word1 = (attr.location & 0x7F)
            | dst_sel
            | (cafe_format::data_format(code) << 22)
            | (cafe_format::num_format(code) << 28)
            | ((cafe_format::is_signed(code) as u32) << 30);

        let endian = match attr.format.component_byte_size() {
            Some(1) => ENDIAN_NONE,
            Some(2) => ENDIAN_8IN16,
            _ => ENDIAN_8IN32,
        };
        let word2 = (attr.offset & 0xFFFF) | (endian << 16) | (1 << 19);

        write_word(&mut program, at, word0);
        write_word(&mut program, at + 4, word1);
        write_word(&mut program, at + 8, word2);
    }

    let num_gprs = attributes.iter().map(|a| a.location + 1).max().unwrap_or(0);
    Ok(FetchShader { program, attrib_count: count as u32, num_gprs })
}

#[cfg(test)]
#[path = "fetch_shader_tests.rs"]
mod tests;
