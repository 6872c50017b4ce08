//! CPU-mapped ring buffer for per-frame vertex/index streams
//!
//! One owning device buffer, one bump write-cursor, one mapping session per
//! frame. Everything written through it is dead after the frame's unmap;
//! render passes keep only the `(handle, offset)` references they were
//! handed for the current frame's draws.

use std::ptr::NonNull;

use bytemuck::Pod;

use crate::render::api::RenderDevice;
use crate::render::buffer::{Buffer, BufferUsage, IndexBufferRef, IndexFormat, VertexBufferRef};
use crate::render::{MemoryError, MemoryResult};

/// Alignment of every ring allocation, in bytes
pub const RING_BUFFER_ALIGN: u64 = 16;

/// One allocation inside the current mapping session
#[derive(Debug)]
pub struct RingAllocation<'a> {
    /// Writable window into the mapped buffer, valid until unmap
    pub bytes: &'a mut [u8],
    /// Byte offset of the window inside the ring's device buffer
    pub offset: u64,
}

/// A single mapped GPU buffer with a bump write-cursor, reset on every
/// map/unmap cycle.
///
/// Allocation order is deterministic: within one session, N allocations
/// yield strictly increasing, non-overlapping offsets in call order, so a
/// replayed sequence of allocations reproduces the same offsets.
///
/// Data written through the ring is only guaranteed visible to the GPU
/// after [`DynamicRingBuffer::unmap`] and command submission. Mapping may
/// stall if the buffer is still in flight from a prior frame; callers that
/// cannot tolerate that double- or triple-buffer the ring.
pub struct DynamicRingBuffer {
    buffer: Buffer,
    capacity: u64,
    cursor: u64,
    mapped: Option<NonNull<u8>>,
    sessions: u64,
}

impl DynamicRingBuffer {
    /// Create the owning device buffer, flagged host-visible/dynamic.
    pub fn new(
        device: &mut dyn RenderDevice,
        capacity: u64,
        usage: BufferUsage,
    ) -> MemoryResult<Self> {
        let buffer = Buffer::create(device, capacity, usage | BufferUsage::DYNAMIC, None)?;
        log::info!("Created DynamicRingBuffer with {capacity} bytes");
        Ok(Self {
            buffer,
            capacity,
            cursor: 0,
            mapped: None,
            sessions: 0,
        })
    }

    /// Begin the frame's mapping session; the cursor rewinds to zero.
    pub fn map(&mut self, device: &mut dyn RenderDevice) -> MemoryResult<()> {
        if self.mapped.is_some() {
            return Err(MemoryError::AlreadyMapped);
        }
        let ptr = device.map_buffer(self.buffer.id())?;
        self.mapped = NonNull::new(ptr);
        self.cursor = 0;
        Ok(())
    }

    /// Bump-allocate `size` bytes, 16-byte aligned.
    ///
    /// A failed allocation leaves the cursor untouched; a smaller
    /// allocation that fits may still succeed afterwards.
    pub fn alloc(&mut self, size: u64) -> MemoryResult<RingAllocation<'_>> {
        let base = self.mapped.ok_or(MemoryError::NotMapped)?;
        let aligned = (size + RING_BUFFER_ALIGN - 1) & !(RING_BUFFER_ALIGN - 1);
        let offset = self.cursor;
        if offset + aligned > self.capacity {
            return Err(MemoryError::CapacityExceeded {
                resource: "dynamic ring buffer",
                requested: size,
                remaining: self.capacity - offset,
                frame: self.sessions,
            });
        }
        self.cursor = offset + aligned;

        // SAFETY: the mapping outlives `&mut self` borrows (it ends only in
        // `unmap`, which requires exclusive access), and bump offsets never
        // overlap within a session.
        let bytes = unsafe {
            std::slice::from_raw_parts_mut(base.as_ptr().add(offset as usize), aligned as usize)
        };
        Ok(RingAllocation { bytes, offset })
    }

    /// Allocate and fill a transient vertex stream, returning the alias a
    /// render pass binds for this frame's draws.
    pub fn write_vertices<T: Pod>(
        &mut self,
        device: &dyn RenderDevice,
        vertices: &[T],
    ) -> MemoryResult<VertexBufferRef> {
        let payload: &[u8] = bytemuck::cast_slice(vertices);
        let allocation = self.alloc(payload.len() as u64)?;
        allocation.bytes[..payload.len()].copy_from_slice(payload);
        let offset = allocation.offset;
        VertexBufferRef::reference_raw(
            device,
            self.buffer.id(),
            offset,
            payload.len() as u64,
            std::mem::size_of::<T>() as u64,
        )
    }

    /// Allocate and fill a transient 32-bit index stream.
    pub fn write_indices(
        &mut self,
        device: &dyn RenderDevice,
        indices: &[u32],
    ) -> MemoryResult<IndexBufferRef> {
        let payload: &[u8] = bytemuck::cast_slice(indices);
        let allocation = self.alloc(payload.len() as u64)?;
        allocation.bytes[..payload.len()].copy_from_slice(payload);
        let offset = allocation.offset;
        IndexBufferRef::reference_raw(
            device,
            self.buffer.id(),
            offset,
            payload.len() as u64,
            IndexFormat::U32,
        )
    }

    /// End the session: flush, unmap, rewind the cursor for the next map.
    pub fn unmap(&mut self, device: &mut dyn RenderDevice) -> MemoryResult<()> {
        if self.mapped.take().is_none() {
            return Err(MemoryError::NotMapped);
        }
        device.unmap_buffer(self.buffer.id())?;
        self.cursor = 0;
        self.sessions += 1;
        Ok(())
    }

    /// Whether a mapping session is open.
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        self.mapped.is_some()
    }

    /// Total capacity in bytes.
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes consumed in the current session.
    #[must_use]
    pub const fn used(&self) -> u64 {
        self.cursor
    }

    /// Destroy the owning device buffer. Outstanding references into the
    /// ring become stale.
    pub fn destroy(self, device: &mut dyn RenderDevice) -> MemoryResult<()> {
        self.buffer.destroy(device)
    }
}
