//! MEM2 heap model
//!
//! A first-fit allocator over a fixed address window. Every live block also carries its
//! bytes, so the device can hand "GPU memory" back to tests and to `read_color_target`.
//! Freed ranges are kept sorted and coalesced.

use std::ops::Range;
use rustc_hash::FxHashMap;
use rio_gpu::rio::{RioError, RioResult};

#[derive(Debug)]
struct Block {
    /// Range taken from the free list, alignment padding included
    reserved: Range<u32>,
    bytes: Vec<u8>,
}

/// First-fit MEM2 allocator holding the contents of each block
#[derive(Debug)]
pub struct Mem2Heap {
    base: u32,
    size: u32,
    free: Vec<Range<u32>>,
    blocks: FxHashMap<u32, Block>,
    /// Next address handed to memory the heap does not own
    next_foreign: u64,
}

impl Mem2Heap {
    pub fn new(base: u32, size: u32) -> Self {
        let end = base.saturating_add(size);
        Self {
            base,
            size: end - base,
            free: vec![base..end],
            blocks: FxHashMap::default(),
            next_foreign: end as u64,
        }
    }

    /// Allocate `size` zeroed bytes at an `align`-aligned address
    pub fn alloc(&mut self, size: u32, align: u32) -> RioResult<u32> {
        let size = size.max(1);
        let align = align.max(1);
        let found = self.free.iter().enumerate().find_map(|(i, range)| {
            let start = align_up(range.start, align)?;
            let end = start.checked_add(size)?;
            (end <= range.end).then_some((i, start, end))
        });
        let (index, start, end) = found.ok_or(RioError::OutOfMemory)?;

        let range = self.free.remove(index);
        // Padding in front of an aligned block stays with the block so that freeing it
        // gives the whole span back.
        let reserved = range.start..end;
        if end < range.end {
            self.free.insert(index, end..range.end);
        }
        self.blocks.insert(start, Block { reserved, bytes: vec![0; size as usize] });
        Ok(start)
    }

    /// Allocate and fill a block with `data`
    pub fn alloc_with(&mut self, data: &[u8], align: u32) -> RioResult<u32> {
        let size = u32::try_from(data.len()).map_err(|_| RioError::OutOfMemory)?;
        let addr = self.alloc(size, align)?;
        self.write(addr, 0, data)?;
        Ok(addr)
    }

    pub fn free(&mut self, addr: u32) -> RioResult<()> {
        let block = self.blocks.remove(&addr).ok_or_else(|| {
            RioError::InvalidResource(format!("no MEM2 block at {:#010x}", addr))
        })?;
        let position = self.free.partition_point(|r| r.start < block.reserved.start);
        self.free.insert(position, block.reserved);
        self.coalesce_around(position);
        Ok(())
    }

    fn coalesce_around(&mut self, position: usize) {
        if position + 1 < self.free.len() && self.free[position].end == self.free[position + 1].start {
            let next = self.free.remove(position + 1);
            self.free[position].end = next.end;
        }
        if position > 0 && self.free[position - 1].end == self.free[position].start {
            let current = self.free.remove(position);
            self.free[position - 1].end = current.end;
        }
    }

    /// Address for memory owned by someone else (above the heap window, never freed)
    pub fn foreign_address(&mut self, size: usize) -> u32 {
        let addr = self.next_foreign;
        let step = (size.max(1) as u64 + 0xFF) & !0xFF;
        self.next_foreign = self.next_foreign.saturating_add(step);
        addr.min(u32::MAX as u64) as u32
    }

    pub fn read(&self, addr: u32) -> Option<&[u8]> {
        self.blocks.get(&addr).map(|b| b.bytes.as_slice())
    }

    pub fn bytes_mut(&mut self, addr: u32) -> Option<&mut [u8]> {
        self.blocks.get_mut(&addr).map(|b| b.bytes.as_mut_slice())
    }

    /// Copy `data` into the block at `addr`, starting `offset` bytes in
    pub fn write(&mut self, addr: u32, offset: usize, data: &[u8]) -> RioResult<()> {
        let block = self.blocks.get_mut(&addr).ok_or_else(|| {
            RioError::InvalidResource(format!("no MEM2 block at {:#010x}", addr))
        })?;
        let end = offset
            .checked_add(data.len())
            .filter(|end| *end <= block.bytes.len())
            .ok_or_else(|| {
                RioError::ContractViolation(format!(
                    "write of {} bytes at offset {} overruns a {}-byte block",
                    data.len(), offset, block.bytes.len()
                ))
            })?;
        block.bytes[offset..end].copy_from_slice(data);
        Ok(())
    }

    pub fn contains(&self, addr: u32) -> bool {
        self.blocks.contains_key(&addr)
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn free_bytes(&self) -> u32 {
        self.free.iter().map(|r| r.end - r.start).sum()
    }

    pub fn used_bytes(&self) -> u32 {
        self.size - self.free_bytes()
    }

    pub fn allocation_count(&self) -> usize {
        self.blocks.len()
    }
}

fn align_up(value: u32, align: u32) -> Option<u32> {
    let mask = align - 1;
    if align.is_power_of_two() {
        value.checked_add(mask).map(|v| v & !mask)
    } else {
        value.checked_add(mask).map(|v| v / align * align)
    }
}

#[cfg(test)]
#[path = "mem2_heap_tests.rs"]
mod tests;
