//! Shared-buffer mesh streaming
//!
//! Newly registered meshes are queued, then drained once per frame into two
//! large persistent device buffers (one vertex, one index). Each mesh gets
//! a non-overlapping region via a bump cursor and comes back as a pair of
//! buffer references; many logical meshes alias one physical buffer.
//!
//! The lifetime of the bump cursors is governed by [`StreamPolicy`]:
//!
//! - [`StreamPolicy::Persistent`] keeps the cursors monotonic for the
//!   queue's whole lifetime. Regions handed out in earlier flushes stay
//!   valid; the budget is a high-water mark.
//! - [`StreamPolicy::InitialLoadOnly`] permits exactly one flush (the load
//!   phase). Any later queue or flush fails with
//!   [`MemoryError::StreamSealed`], so a frame-time path can never recycle
//!   regions that persistent meshes still reference.

use serde::{Deserialize, Serialize};

use crate::render::api::RenderDevice;
use crate::render::buffer::{Buffer, BufferUsage, IndexBufferRef, IndexFormat, VertexBufferRef};
use crate::render::{MemoryError, MemoryResult};

/// Region alignment inside the shared buffers, in bytes
const STREAM_ALIGN: u64 = 16;

/// Lifetime policy of the mesh-stream bump cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamPolicy {
    /// Cursors never rewind; streaming stays available every frame until
    /// the budget is exhausted
    #[default]
    Persistent,
    /// One flush total; the stream seals itself afterwards
    InitialLoadOnly,
}

/// A mesh waiting to be packed into the shared buffers
#[derive(Debug, Clone)]
pub struct PendingMesh {
    /// Raw vertex bytes
    pub vertex_data: Vec<u8>,
    /// Bytes per vertex
    pub vertex_stride: u64,
    /// Raw index bytes
    pub index_data: Vec<u8>,
    /// Element width of the index data
    pub index_format: IndexFormat,
}

impl PendingMesh {
    /// Build a pending mesh from typed vertex and 32-bit index slices.
    #[must_use]
    pub fn from_slices<T: bytemuck::Pod>(vertices: &[T], indices: &[u32]) -> Self {
        Self {
            vertex_data: bytemuck::cast_slice(vertices).to_vec(),
            vertex_stride: std::mem::size_of::<T>() as u64,
            index_data: bytemuck::cast_slice(indices).to_vec(),
            index_format: IndexFormat::U32,
        }
    }
}

/// The aliases a flushed mesh draws with
#[derive(Debug, Clone, Copy)]
pub struct StreamedMesh {
    /// Window of the shared vertex buffer holding this mesh
    pub vertices: VertexBufferRef,
    /// Window of the shared index buffer holding this mesh
    pub indices: IndexBufferRef,
}

/// Queue draining registered meshes into shared persistent device buffers
pub struct MeshStreamQueue {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    pending: Vec<PendingMesh>,
    vertex_cursor: u64,
    index_cursor: u64,
    policy: StreamPolicy,
    flushes: u64,
    sealed: bool,
}

impl MeshStreamQueue {
    /// Create the two shared device buffers with fixed byte budgets.
    pub fn new(
        device: &mut dyn RenderDevice,
        vertex_budget: u64,
        index_budget: u64,
        policy: StreamPolicy,
    ) -> MemoryResult<Self> {
        let vertex_buffer = Buffer::create(
            device,
            vertex_budget,
            BufferUsage::VERTEX | BufferUsage::TRANSFER_DST,
            None,
        )?;
        let index_buffer = Buffer::create(
            device,
            index_budget,
            BufferUsage::INDEX | BufferUsage::TRANSFER_DST,
            None,
        )?;
        log::info!(
            "Created MeshStreamQueue: {vertex_budget} vertex bytes, {index_budget} index bytes, {policy:?}"
        );
        Ok(Self {
            vertex_buffer,
            index_buffer,
            pending: Vec::new(),
            vertex_cursor: 0,
            index_cursor: 0,
            policy,
            flushes: 0,
            sealed: false,
        })
    }

    /// Register a mesh for the next flush.
    pub fn queue(&mut self, mesh: PendingMesh) -> MemoryResult<()> {
        if self.sealed {
            return Err(MemoryError::StreamSealed);
        }
        self.pending.push(mesh);
        Ok(())
    }

    /// Drain the queue into the shared buffers, once per frame.
    ///
    /// Every queued mesh receives a non-overlapping region in registration
    /// order. The flush is all-or-nothing: if the queued total does not fit
    /// the remaining budget, nothing is uploaded, the queue is kept intact,
    /// and [`MemoryError::CapacityExceeded`] is returned.
    pub fn flush(&mut self, device: &mut dyn RenderDevice) -> MemoryResult<Vec<StreamedMesh>> {
        if self.sealed {
            return Err(MemoryError::StreamSealed);
        }

        // Validate the whole batch before touching either cursor.
        let vertex_total: u64 = self.pending.iter().map(|m| align(m.vertex_data.len())).sum();
        let index_total: u64 = self.pending.iter().map(|m| align(m.index_data.len())).sum();
        let vertex_remaining = self.vertex_buffer.size() - self.vertex_cursor;
        let index_remaining = self.index_buffer.size() - self.index_cursor;
        if vertex_total > vertex_remaining {
            return Err(MemoryError::CapacityExceeded {
                resource: "mesh stream vertex buffer",
                requested: vertex_total,
                remaining: vertex_remaining,
                frame: self.flushes,
            });
        }
        if index_total > index_remaining {
            return Err(MemoryError::CapacityExceeded {
                resource: "mesh stream index buffer",
                requested: index_total,
                remaining: index_remaining,
                frame: self.flushes,
            });
        }

        let mut streamed = Vec::with_capacity(self.pending.len());
        for mesh in self.pending.drain(..) {
            let vertex_offset = self.vertex_cursor;
            let index_offset = self.index_cursor;
            self.vertex_cursor += align(mesh.vertex_data.len());
            self.index_cursor += align(mesh.index_data.len());

            device.update_buffer(self.vertex_buffer.id(), vertex_offset, &mesh.vertex_data)?;
            device.update_buffer(self.index_buffer.id(), index_offset, &mesh.index_data)?;

            let vertices = VertexBufferRef::reference(
                &*device,
                &self.vertex_buffer,
                vertex_offset,
                mesh.vertex_data.len() as u64,
                mesh.vertex_stride,
            )?;
            let indices = IndexBufferRef::reference(
                &*device,
                &self.index_buffer,
                index_offset,
                mesh.index_data.len() as u64,
                mesh.index_format,
            )?;
            streamed.push(StreamedMesh { vertices, indices });
        }

        self.flushes += 1;
        if self.policy == StreamPolicy::InitialLoadOnly {
            self.sealed = true;
            log::debug!("MeshStreamQueue sealed after initial load flush");
        }
        log::debug!(
            "MeshStreamQueue flush {}: {} meshes, vertex cursor {}, index cursor {}",
            self.flushes,
            streamed.len(),
            self.vertex_cursor,
            self.index_cursor
        );
        Ok(streamed)
    }

    /// Meshes waiting for the next flush.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Vertex bytes consumed so far, alignment included.
    #[must_use]
    pub const fn vertex_used(&self) -> u64 {
        self.vertex_cursor
    }

    /// Index bytes consumed so far, alignment included.
    #[must_use]
    pub const fn index_used(&self) -> u64 {
        self.index_cursor
    }

    /// Cursor lifetime policy.
    #[must_use]
    pub const fn policy(&self) -> StreamPolicy {
        self.policy
    }

    /// Whether the stream refuses further work.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Destroy both shared buffers. Every streamed mesh becomes stale.
    pub fn destroy(self, device: &mut dyn RenderDevice) -> MemoryResult<()> {
        self.vertex_buffer.destroy(device)?;
        self.index_buffer.destroy(device)?;
        Ok(())
    }
}

fn align(len: usize) -> u64 {
    (len as u64 + STREAM_ALIGN - 1) & !(STREAM_ALIGN - 1)
}
