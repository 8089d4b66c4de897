//! GFD shader container (`.gsh`) reader and writer
//!
//! A GFD file is a big-endian sequence of blocks behind a 0x20-byte file header. A shader
//! container holds a vertex shader (header block 3, program block 5) and a pixel shader
//! (header block 6, program block 7), closed by an end block (1).
//!
//! Header blocks carry the `GX2VertexShader` / `GX2PixelShader` structures followed by their
//! variable tables and a string table. Pointers in them are offsets from the start of the block
//! data, tagged `0xD0600000` (data) or `0xCA700000` (string) in the upper 12 bits. Relocation
//! tables appended by the offline compiler are not needed to resolve such pointers and are
//! ignored.

use rio_gpu::rio::{RioError, RioResult};

pub const FILE_MAGIC: u32 = 0x4766_7832; // "Gfx2"
pub const BLOCK_MAGIC: u32 = 0x424C_4B7B; // "BLK{"
pub const FILE_HEADER_SIZE: usize = 0x20;
pub const BLOCK_HEADER_SIZE: usize = 0x20;
pub const FILE_MAJOR_VERSION: u32 = 7;
const FILE_MINOR_VERSION: u32 = 1;
const GPU_VERSION: u32 = 2;
const BLOCK_MAJOR_VERSION: u32 = 1;

pub const BLOCK_END: u32 = 1;
pub const BLOCK_VERTEX_SHADER_HEADER: u32 = 3;
pub const BLOCK_VERTEX_SHADER_PROGRAM: u32 = 5;
pub const BLOCK_PIXEL_SHADER_HEADER: u32 = 6;
pub const BLOCK_PIXEL_SHADER_PROGRAM: u32 = 7;

const TAG_MASK: u32 = 0xFFF0_0000;
const OFFSET_MASK: u32 = 0x000F_FFFF;
pub const DATA_TAG: u32 = 0xD060_0000;
pub const STRING_TAG: u32 = 0xCA70_0000;

pub const VERTEX_REG_WORDS: usize = 52;
pub const PIXEL_REG_WORDS: usize = 41;
const VERTEX_HEADER_SIZE: usize = 0x134;
const PIXEL_HEADER_SIZE: usize = 0xE8;

const UNIFORM_BLOCK_RECORD: usize = 12;
const UNIFORM_VAR_RECORD: usize = 20;
const SAMPLER_VAR_RECORD: usize = 12;
const ATTRIB_VAR_RECORD: usize = 16;

// Field offsets after the register block, shared layout for both stages
mod field {
    pub const SIZE: usize = 0x00;
    pub const PROGRAM: usize = 0x04;
    pub const MODE: usize = 0x08;
    pub const UNIFORM_BLOCK_COUNT: usize = 0x0C;
    pub const UNIFORM_BLOCKS: usize = 0x10;
    pub const UNIFORM_VAR_COUNT: usize = 0x14;
    pub const UNIFORM_VARS: usize = 0x18;
    pub const INITIAL_VALUE_COUNT: usize = 0x1C;
    pub const LOOP_VAR_COUNT: usize = 0x24;
    pub const SAMPLER_VAR_COUNT: usize = 0x2C;
    pub const SAMPLER_VARS: usize = 0x30;
    // Vertex only
    pub const ATTRIB_VAR_COUNT: usize = 0x34;
    pub const ATTRIB_VARS: usize = 0x38;
    pub const RING_ITEM_SIZE: usize = 0x3C;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlockVar {
    pub name: String,
    /// Binding index of the block
    pub offset: u32,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformVar {
    pub name: String,
    pub var_type: u32,
    pub count: u32,
    /// Register offset in words
    pub offset: u32,
    /// Owning uniform block, -1 for register uniforms
    pub block: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerVar {
    pub name: String,
    pub var_type: u32,
    pub location: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttribVar {
    pub name: String,
    pub var_type: u32,
    pub count: u32,
    pub location: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexShaderBinary {
    pub regs: [u32; VERTEX_REG_WORDS],
    pub mode: u32,
    pub program: Vec<u8>,
    pub uniform_blocks: Vec<UniformBlockVar>,
    pub uniform_vars: Vec<UniformVar>,
    pub sampler_vars: Vec<SamplerVar>,
    pub attrib_vars: Vec<AttribVar>,
    pub ring_item_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelShaderBinary {
    pub regs: [u32; PIXEL_REG_WORDS],
    pub mode: u32,
    pub program: Vec<u8>,
    pub uniform_blocks: Vec<UniformBlockVar>,
    pub uniform_vars: Vec<UniformVar>,
    pub sampler_vars: Vec<SamplerVar>,
}

/// One vertex + pixel shader pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfdShaderFile {
    pub vertex: VertexShaderBinary,
    pub pixel: PixelShaderBinary,
}

impl VertexShaderBinary {
    /// Empty shader in `mode` with the given microcode
    pub fn new(mode: u32, program: Vec<u8>) -> Self {
        Self {
            regs: [0; VERTEX_REG_WORDS],
            mode,
            program,
            uniform_blocks: Vec::new(),
            uniform_vars: Vec::new(),
            sampler_vars: Vec::new(),
            attrib_vars: Vec::new(),
            ring_item_size: 0,
        }
    }
}

impl PixelShaderBinary {
    pub fn new(mode: u32, program: Vec<u8>) -> Self {
        Self {
            regs: [0; PIXEL_REG_WORDS],
            mode,
            program,
            uniform_blocks: Vec::new(),
            uniform_vars: Vec::new(),
            sampler_vars: Vec::new(),
        }
    }
}

fn invalid(message: impl Into<String>) -> RioError {
    RioError::InvalidAsset(format!("GFD: {}", message.into()))
}

// ============================================================================
// Reading
// ============================================================================

/// Big-endian view over one block's data
struct BlockReader<'a> {
    data: &'a [u8],
}

impl<'a> BlockReader<'a> {
    fn u32_at(&self, at: usize) -> RioResult<u32> {
        read_u32(self.data, at)
    }

    /// Resolve a tagged data pointer to an offset, checking `len` bytes fit
    fn data_ptr(&self, ptr: u32, len: usize) -> RioResult<usize> {
        if ptr & TAG_MASK != DATA_TAG {
            return Err(invalid(format!("bad data pointer {:#010x}", ptr)));
        }
        let offset = (ptr & OFFSET_MASK) as usize;
        if offset.checked_add(len).map_or(true, |end| end > self.data.len()) {
            return Err(invalid(format!("table at {:#x} (+{}) outside block", offset, len)));
        }
        Ok(offset)
    }

    fn string(&self, ptr: u32) -> RioResult<String> {
        if ptr & TAG_MASK != STRING_TAG {
            return Err(invalid(format!("bad string pointer {:#010x}", ptr)));
        }
        let start = (ptr & OFFSET_MASK) as usize;
        let tail = self
            .data
            .get(start..)
            .ok_or_else(|| invalid(format!("string at {:#x} outside block", start)))?;
        let end = tail
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| invalid("unterminated string"))?;
        String::from_utf8(tail[..end].to_vec()).map_err(|_| invalid("string is not UTF-8"))
    }

    /// Read `count` records of `record` bytes through the table pointer at `ptr_at`
    fn table<T>(
        &self,
        count_at: usize,
        ptr_at: usize,
        record: usize,
        mut read: impl FnMut(&Self, usize) -> RioResult<T>,
    ) -> RioResult<Vec<T>> {
        let count = self.u32_at(count_at)? as usize;
        if count == 0 {
            return Ok(Vec::new());
        }
        let len = count
            .checked_mul(record)
            .ok_or_else(|| invalid("variable table too large"))?;
        let base = self.data_ptr(self.u32_at(ptr_at)?, len)?;
        (0..count).map(|i| read(self, base + i * record)).collect()
    }

    fn uniform_blocks(&self, fields: usize) -> RioResult<Vec<UniformBlockVar>> {
        self.table(
            fields + field::UNIFORM_BLOCK_COUNT,
            fields + field::UNIFORM_BLOCKS,
            UNIFORM_BLOCK_RECORD,
            |r, at| {
                Ok(UniformBlockVar {
                    name: r.string(r.u32_at(at)?)?,
                    offset: r.u32_at(at + 4)?,
                    size: r.u32_at(at + 8)?,
                })
            },
        )
    }

    fn uniform_vars(&self, fields: usize) -> RioResult<Vec<UniformVar>> {
        self.table(
            fields + field::UNIFORM_VAR_COUNT,
            fields + field::UNIFORM_VARS,
            UNIFORM_VAR_RECORD,
            |r, at| {
                Ok(UniformVar {
                    name: r.string(r.u32_at(at)?)?,
                    var_type: r.u32_at(at + 4)?,
                    count: r.u32_at(at + 8)?,
                    offset: r.u32_at(at + 12)?,
                    block: r.u32_at(at + 16)? as i32,
                })
            },
        )
    }

    fn sampler_vars(&self, fields: usize) -> RioResult<Vec<SamplerVar>> {
        self.table(
            fields + field::SAMPLER_VAR_COUNT,
            fields + field::SAMPLER_VARS,
            SAMPLER_VAR_RECORD,
            |r, at| {
                Ok(SamplerVar {
                    name: r.string(r.u32_at(at)?)?,
                    var_type: r.u32_at(at + 4)?,
                    location: r.u32_at(at + 8)?,
                })
            },
        )
    }

    fn attrib_vars(&self, fields: usize) -> RioResult<Vec<AttribVar>> {
        self.table(
            fields + field::ATTRIB_VAR_COUNT,
            fields + field::ATTRIB_VARS,
            ATTRIB_VAR_RECORD,
            |r, at| {
                Ok(AttribVar {
                    name: r.string(r.u32_at(at)?)?,
                    var_type: r.u32_at(at + 4)?,
                    count: r.u32_at(at + 8)?,
                    location: r.u32_at(at + 12)?,
                })
            },
        )
    }

    fn regs<const N: usize>(&self) -> RioResult<[u32; N]> {
        let mut regs = [0u32; N];
        for (i, reg) in regs.iter_mut().enumerate() {
            *reg = self.u32_at(i * 4)?;
        }
        Ok(regs)
    }
}

fn read_u32(bytes: &[u8], at: usize) -> RioResult<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| invalid(format!("truncated at {:#x}", at)))
}

fn check_program(kind: &str, declared: u32, program: &[u8]) -> RioResult<()> {
    if declared as usize != program.len() {
        return Err(invalid(format!(
            "{} program is {} bytes, header declares {}",
            kind, program.len(), declared
        )));
    }
    Ok(())
}

fn parse_vertex(header: &[u8], program: &[u8]) -> RioResult<VertexShaderBinary> {
    if header.len() < VERTEX_HEADER_SIZE {
        return Err(invalid(format!("vertex shader header is {} bytes", header.len())));
    }
    let r = BlockReader { data: header };
    let fields = VERTEX_REG_WORDS * 4;
    check_program("vertex", r.u32_at(fields + field::SIZE)?, program)?;
    Ok(VertexShaderBinary {
        regs: r.regs::<VERTEX_REG_WORDS>()?,
        mode: r.u32_at(fields + field::MODE)?,
        program: program.to_vec(),
        uniform_blocks: r.uniform_blocks(fields)?,
        uniform_vars: r.uniform_vars(fields)?,
        sampler_vars: r.sampler_vars(fields)?,
        attrib_vars: r.attrib_vars(fields)?,
        ring_item_size: r.u32_at(fields + field::RING_ITEM_SIZE)?,
    })
}

fn parse_pixel(header: &[u8], program: &[u8]) -> RioResult<PixelShaderBinary> {
    if header.len() < PIXEL_HEADER_SIZE {
        return Err(invalid(format!("pixel shader header is {} bytes", header.len())));
    }
    let r = BlockReader { data: header };
    let fields = PIXEL_REG_WORDS * 4;
    check_program("pixel", r.u32_at(fields + field::SIZE)?, program)?;
    Ok(PixelShaderBinary {
        regs: r.regs::<PIXEL_REG_WORDS>()?,
        mode: r.u32_at(fields + field::MODE)?,
        program: program.to_vec(),
        uniform_blocks: r.uniform_blocks(fields)?,
        uniform_vars: r.uniform_vars(fields)?,
        sampler_vars: r.sampler_vars(fields)?,
    })
}

/// Parse the first vertex and pixel shader of a GFD file
pub fn parse(bytes: &[u8]) -> RioResult<GfdShaderFile> {
    if read_u32(bytes, 0)? != FILE_MAGIC {
        return Err(invalid("bad file magic"));
    }
    let header_size = read_u32(bytes, 4)? as usize;
    if header_size < FILE_HEADER_SIZE {
        return Err(invalid(format!("file header size {:#x}", header_size)));
    }
    let major = read_u32(bytes, 8)?;
    if major != FILE_MAJOR_VERSION {
        return Err(invalid(format!("unsupported major version {}", major)));
    }

    let mut vertex_header = None;
    let mut vertex_program = None;
    let mut pixel_header = None;
    let mut pixel_program = None;

    let mut pos = header_size;
    loop {
        if pos >= bytes.len() {
            break;
        }
        if read_u32(bytes, pos)? != BLOCK_MAGIC {
            return Err(invalid(format!("bad block magic at {:#x}", pos)));
        }
        let block_header_size = read_u32(bytes, pos + 4)? as usize;
        if block_header_size < BLOCK_HEADER_SIZE {
            return Err(invalid(format!("block header size {:#x}", block_header_size)));
        }
        let block_type = read_u32(bytes, pos + 16)?;
        let data_size = read_u32(bytes, pos + 20)? as usize;
        let start = pos + block_header_size;
        let data = start
            .checked_add(data_size)
            .and_then(|end| bytes.get(start..end))
            .ok_or_else(|| invalid(format!("block at {:#x} runs past end of file", pos)))?;

        match block_type {
            BLOCK_END => break,
            BLOCK_VERTEX_SHADER_HEADER => { vertex_header.get_or_insert(data); }
            BLOCK_VERTEX_SHADER_PROGRAM => { vertex_program.get_or_insert(data); }
            BLOCK_PIXEL_SHADER_HEADER => { pixel_header.get_or_insert(data); }
            BLOCK_PIXEL_SHADER_PROGRAM => { pixel_program.get_or_insert(data); }
            _ => {}
        }
        pos = start + data_size;
    }

    let (Some(vh), Some(vp)) = (vertex_header, vertex_program) else {
        return Err(invalid("no vertex shader"));
    };
    let (Some(ph), Some(pp)) = (pixel_header, pixel_program) else {
        return Err(invalid("no pixel shader"));
    };
    Ok(GfdShaderFile {
        vertex: parse_vertex(vh, vp)?,
        pixel: parse_pixel(ph, pp)?,
    })
}

// ============================================================================
// Writing
// ============================================================================

/// Builds one header block: fixed structure, variable tables, then strings
struct HeaderWriter {
    data: Vec<u8>,
    strings: Vec<u8>,
    /// (position in `data`, offset in `strings`)
    string_refs: Vec<(usize, usize)>,
}

impl HeaderWriter {
    fn new(fixed_size: usize) -> Self {
        Self { data: vec![0; fixed_size], strings: Vec::new(), string_refs: Vec::new() }
    }

    fn put(&mut self, at: usize, value: u32) {
        self.data[at..at + 4].copy_from_slice(&value.to_be_bytes());
    }

    fn push(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    fn push_string(&mut self, name: &str) {
        self.string_refs.push((self.data.len(), self.strings.len()));
        self.strings.extend_from_slice(name.as_bytes());
        self.strings.push(0);
        self.push(0);
    }

    /// Append a table and point the header fields at it
    fn table<T>(&mut self, count_at: usize, ptr_at: usize, items: &[T], mut write: impl FnMut(&mut Self, &T)) {
        self.put(count_at, items.len() as u32);
        if items.is_empty() {
            return;
        }
        let base = self.data.len() as u32;
        self.put(ptr_at, DATA_TAG | base);
        for item in items {
            write(self, item);
        }
    }

    fn uniform_blocks(&mut self, fields: usize, blocks: &[UniformBlockVar]) {
        self.table(fields + field::UNIFORM_BLOCK_COUNT, fields + field::UNIFORM_BLOCKS, blocks, |w, b| {
            w.push_string(&b.name);
            w.push(b.offset);
            w.push(b.size);
        });
    }

    fn uniform_vars(&mut self, fields: usize, vars: &[UniformVar]) {
        self.table(fields + field::UNIFORM_VAR_COUNT, fields + field::UNIFORM_VARS, vars, |w, v| {
            w.push_string(&v.name);
            w.push(v.var_type);
            w.push(v.count);
            w.push(v.offset);
            w.push(v.block as u32);
        });
    }

    fn sampler_vars(&mut self, fields: usize, vars: &[SamplerVar]) {
        self.table(fields + field::SAMPLER_VAR_COUNT, fields + field::SAMPLER_VARS, vars, |w, v| {
            w.push_string(&v.name);
            w.push(v.var_type);
            w.push(v.location);
        });
    }

    fn attrib_vars(&mut self, fields: usize, vars: &[AttribVar]) {
        self.table(fields + field::ATTRIB_VAR_COUNT, fields + field::ATTRIB_VARS, vars, |w, v| {
            w.push_string(&v.name);
            w.push(v.var_type);
            w.push(v.count);
            w.push(v.location);
        });
    }

    fn finish(mut self) -> Vec<u8> {
        let strings_base = self.data.len();
        for (at, offset) in std::mem::take(&mut self.string_refs) {
            self.put(at, STRING_TAG | (strings_base + offset) as u32);
        }
        self.data.extend_from_slice(&self.strings);
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
        self.data
    }
}

fn vertex_header(shader: &VertexShaderBinary) -> Vec<u8> {
    let mut w = HeaderWriter::new(VERTEX_HEADER_SIZE);
    for (i, reg) in shader.regs.iter().enumerate() {
        w.put(i * 4, *reg);
    }
    let fields = VERTEX_REG_WORDS * 4;
    w.put(fields + field::SIZE, shader.program.len() as u32);
    w.put(fields + field::MODE, shader.mode);
    w.put(fields + field::INITIAL_VALUE_COUNT, 0);
    w.put(fields + field::LOOP_VAR_COUNT, 0);
    w.put(fields + field::RING_ITEM_SIZE, shader.ring_item_size);
    w.uniform_blocks(fields, &shader.uniform_blocks);
    w.uniform_vars(fields, &shader.uniform_vars);
    w.sampler_vars(fields, &shader.sampler_vars);
    w.attrib_vars(fields, &shader.attrib_vars);
    w.finish()
}

fn pixel_header(shader: &PixelShaderBinary) -> Vec<u8> {
    let mut w = HeaderWriter::new(PIXEL_HEADER_SIZE);
    for (i, reg) in shader.regs.iter().enumerate() {
        w.put(i * 4, *reg);
    }
    let fields = PIXEL_REG_WORDS * 4;
    w.put(fields + field::SIZE, shader.program.len() as u32);
    w.put(fields + field::MODE, shader.mode);
    w.uniform_blocks(fields, &shader.uniform_blocks);
    w.uniform_vars(fields, &shader.uniform_vars);
    w.sampler_vars(fields, &shader.sampler_vars);
    w.finish()
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_block(out: &mut Vec<u8>, block_type: u32, index: u32, data: &[u8]) {
    push_u32(out, BLOCK_MAGIC);
    push_u32(out, BLOCK_HEADER_SIZE as u32);
    push_u32(out, BLOCK_MAJOR_VERSION);
    push_u32(out, 0);
    push_u32(out, block_type);
    push_u32(out, data.len() as u32);
    push_u32(out, 0);
    push_u32(out, index);
    out.extend_from_slice(data);
}

/// Serialize a shader pair into a GFD file
pub fn write(file: &GfdShaderFile) -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, FILE_MAGIC);
    push_u32(&mut out, FILE_HEADER_SIZE as u32);
    push_u32(&mut out, FILE_MAJOR_VERSION);
    push_u32(&mut out, FILE_MINOR_VERSION);
    push_u32(&mut out, GPU_VERSION);
    push_u32(&mut out, 0);
    push_u32(&mut out, 0);
    push_u32(&mut out, 0);

    push_block(&mut out, BLOCK_VERTEX_SHADER_HEADER, 0, &vertex_header(&file.vertex));
    push_block(&mut out, BLOCK_VERTEX_SHADER_PROGRAM, 0, &file.vertex.program);
    push_block(&mut out, BLOCK_PIXEL_SHADER_HEADER, 0, &pixel_header(&file.pixel));
    push_block(&mut out, BLOCK_PIXEL_SHADER_PROGRAM, 0, &file.pixel.program);
    push_block(&mut out, BLOCK_END, 0, &[]);
    out
}

#[cfg(test)]
#[path = "gfd_tests.rs"]
mod tests;
