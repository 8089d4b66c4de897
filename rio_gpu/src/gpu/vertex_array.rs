//! VertexArray - attribute streams gathered from up to 16 vertex buffers
//!
//! Each buffer slot owns a small arena of streams addressed by `StreamId`. Removing a stream
//! leaves a hole so the ids of its neighbours stay valid. Ids carry the generation they were
//! issued with, so an id whose stream was dropped (removed, replaced with its buffer, or
//! cleared by `initialize`) never resolves to a newer stream reusing the same position.
//! Any add or remove makes the backend layout stale until the next `process`.

use crate::context::GraphicsContext;
use crate::error::{RioError, RioResult};
use crate::graphics_device::{
    VertexAttributeDesc, VertexBufferBinding, VertexBufferHandle, VertexLayoutHandle,
};
use crate::gpu::vertex_buffer::{VertexBuffer, VERTEX_BUFFER_SLOT_NUM};
use crate::gpu::vertex_stream::VertexStream;
use crate::{engine_debug, engine_ensure, engine_error};

/// Position of a stream inside a `VertexArray`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId {
    pub slot: u32,
    pub index: u32,
    generation: u64,
}

#[derive(Debug)]
struct StreamEntry {
    generation: u64,
    stream: VertexStream,
}

#[derive(Debug)]
struct BufferSlot {
    buffer: VertexBufferHandle,
    streams: Vec<Option<StreamEntry>>,
}

impl BufferSlot {
    fn is_empty(&self) -> bool {
        self.streams.iter().all(Option::is_none)
    }
}

#[derive(Debug)]
pub struct VertexArray {
    layout: VertexLayoutHandle,
    slots: [Option<BufferSlot>; VERTEX_BUFFER_SLOT_NUM as usize],
    revision: u64,
    processed_revision: Option<u64>,
    next_generation: u64,
}

impl VertexArray {
    pub fn new(ctx: &mut GraphicsContext) -> RioResult<Self> {
        let layout = ctx.device_mut().create_vertex_layout()?;
        Ok(Self {
            layout,
            slots: Default::default(),
            revision: 0,
            processed_revision: None,
            next_generation: 0,
        })
    }

    pub fn layout_handle(&self) -> VertexLayoutHandle {
        self.layout
    }

    /// Drop every stream and start over with a fresh backend layout
    pub fn initialize(&mut self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().destroy_vertex_layout(self.layout)?;
        self.layout = ctx.device_mut().create_vertex_layout()?;
        self.slots = Default::default();
        self.revision += 1;
        self.processed_revision = None;
        Ok(())
    }

    /// Add `stream` read from `buffer`
    ///
    /// A slot holds a single buffer: adding a stream with a different buffer at an occupied
    /// slot drops the streams of the previous one.
    pub fn add_attribute(&mut self, stream: VertexStream, buffer: &VertexBuffer) -> RioResult<StreamId> {
        let slot = buffer.slot();
        engine_ensure!(
            slot < VERTEX_BUFFER_SLOT_NUM,
            "rio::gpu::VertexArray",
            "buffer slot {} out of range",
            slot
        );
        let handle = buffer.handle();
        let entry = &mut self.slots[slot as usize];
        if entry.as_ref().map(|e| e.buffer) != Some(handle) {
            *entry = None;
        }
        let slot_entry = entry.get_or_insert_with(|| BufferSlot { buffer: handle, streams: Vec::new() });

        let generation = self.next_generation;
        self.next_generation += 1;
        let new_entry = Some(StreamEntry { generation, stream });
        let index = match slot_entry.streams.iter().position(Option::is_none) {
            Some(hole) => {
                slot_entry.streams[hole] = new_entry;
                hole
            }
            None => {
                slot_entry.streams.push(new_entry);
                slot_entry.streams.len() - 1
            }
        };
        self.revision += 1;
        Ok(StreamId { slot, index: index as u32, generation })
    }

    fn entry_mut(&mut self, id: StreamId) -> Option<&mut Option<StreamEntry>> {
        self.slots
            .get_mut(id.slot as usize)?
            .as_mut()?
            .streams
            .get_mut(id.index as usize)
            .filter(|entry| matches!(entry, Some(e) if e.generation == id.generation))
    }

    /// Remove a stream; the slot is released once its last stream is gone
    ///
    /// Fails with `ContractViolation` when `id` is stale or was never issued by this array.
    pub fn remove_attribute(&mut self, id: StreamId) -> RioResult<VertexStream> {
        let Some(StreamEntry { stream, .. }) = self.entry_mut(id).and_then(Option::take) else {
            let message = format!("no live stream at slot {} index {}", id.slot, id.index);
            engine_error!("rio::gpu::VertexArray", "{}", message);
            return Err(RioError::ContractViolation(message));
        };

        let entry = &mut self.slots[id.slot as usize];
        if entry.as_ref().is_some_and(BufferSlot::is_empty) {
            *entry = None;
        }
        self.revision += 1;
        Ok(stream)
    }

    /// Stream behind `id`, `None` once that stream is gone
    pub fn stream(&self, id: StreamId) -> Option<&VertexStream> {
        self.slots
            .get(id.slot as usize)?
            .as_ref()?
            .streams
            .get(id.index as usize)?
            .as_ref()
            .filter(|entry| entry.generation == id.generation)
            .map(|entry| &entry.stream)
    }

    pub fn stream_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .map(|slot| slot.streams.iter().flatten().count())
            .sum()
    }

    /// Whether `process` ran after the last add/remove
    pub fn is_processed(&self) -> bool {
        self.processed_revision == Some(self.revision)
    }

    /// Attributes in slot order, then stream order within a slot
    pub fn attributes(&self) -> Vec<VertexAttributeDesc> {
        let mut attributes = Vec::new();
        for (slot, entry) in self.slots.iter().enumerate() {
            let Some(entry) = entry else { continue };
            for StreamEntry { stream, .. } in entry.streams.iter().flatten() {
                attributes.push(VertexAttributeDesc {
                    location: stream.location(),
                    format: stream.format(),
                    offset: stream.offset(),
                    buffer_slot: slot as u32,
                });
            }
        }
        attributes
    }

    fn buffer_bindings(&self) -> Vec<VertexBufferBinding> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| {
                entry.as_ref().map(|entry| VertexBufferBinding {
                    slot: slot as u32,
                    buffer: entry.buffer,
                })
            })
            .collect()
    }

    /// Build the backend layout from the current streams
    pub fn process(&mut self, ctx: &mut GraphicsContext) -> RioResult<()> {
        let attributes = self.attributes();
        let buffers = self.buffer_bindings();
        ctx.device_mut()
            .build_vertex_layout(self.layout, &attributes, &buffers)?;
        engine_debug!(
            "rio::gpu::VertexArray",
            "Processed {} attributes over {} buffers",
            attributes.len(),
            buffers.len()
        );
        self.processed_revision = Some(self.revision);
        Ok(())
    }

    /// Bind the processed layout and its buffers
    pub fn bind(&self, ctx: &mut GraphicsContext) -> RioResult<()> {
        engine_ensure!(
            self.is_processed(),
            "rio::gpu::VertexArray",
            "vertex array bound before process (or modified since)"
        );
        ctx.device_mut()
            .bind_vertex_layout(self.layout, &self.buffer_bindings())
    }

    pub fn destroy(self, ctx: &mut GraphicsContext) -> RioResult<()> {
        ctx.device_mut().destroy_vertex_layout(self.layout)
    }
}

#[cfg(test)]
#[path = "vertex_array_tests.rs"]
mod tests;
