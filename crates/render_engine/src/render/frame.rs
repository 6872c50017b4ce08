//! Frame timeline driver
//!
//! Owns the frame-scoped allocators and enforces the one timeline the
//! whole core assumes: reset phase (arena, pools), collection phase,
//! then the ring buffer's map/write/unmap session, then submission.
//!
//! Single-threaded by construction. Hosts that parallelize collection give
//! each worker a private arena/collector and merge results in a fixed
//! order before the sort and draw phases; nothing here takes a lock.

use crate::core::config::MemoryConfig;
use crate::foundation::memory::FrameArena;
use crate::render::api::RenderDevice;
use crate::render::buffer::BufferUsage;
use crate::render::draw_queue::DrawSurfaceCollector;
use crate::render::dynamic::DynamicRingBuffer;
use crate::render::MemoryResult;

/// The per-frame resource bundle a renderer drives
pub struct FrameResources {
    arena: FrameArena,
    collector: DrawSurfaceCollector,
    ring: DynamicRingBuffer,
    frame_index: u64,
}

impl FrameResources {
    /// Build every frame-scoped allocator from the configured budgets.
    pub fn new(device: &mut dyn RenderDevice, config: &MemoryConfig) -> MemoryResult<Self> {
        let arena = FrameArena::new(config.frame_arena_bytes);
        let collector = DrawSurfaceCollector::new(config.surface_pool_capacity);
        let ring = DynamicRingBuffer::new(
            device,
            config.ring_buffer_bytes,
            BufferUsage::VERTEX | BufferUsage::INDEX,
        )?;
        Ok(Self {
            arena,
            collector,
            ring,
            frame_index: 0,
        })
    }

    /// The reset phase: rewind the arena and the collector's pool.
    ///
    /// Must run exactly once per frame, before any subsystem touches
    /// frame-scoped data.
    pub fn begin_frame(&mut self) {
        self.frame_index += 1;
        self.arena.reset();
        self.collector.reset();
        log::debug!("begin_frame {}", self.frame_index);
    }

    /// Frames begun so far.
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The frame's scratch arena.
    #[must_use]
    pub const fn arena(&self) -> &FrameArena {
        &self.arena
    }

    /// The frame's draw surface collector.
    pub fn collector_mut(&mut self) -> &mut DrawSurfaceCollector {
        &mut self.collector
    }

    /// The frame's draw surface collector, read-only.
    #[must_use]
    pub const fn collector(&self) -> &DrawSurfaceCollector {
        &self.collector
    }

    /// The transient geometry ring buffer.
    pub fn ring_mut(&mut self) -> &mut DynamicRingBuffer {
        &mut self.ring
    }

    /// Tear down the device-side resources.
    pub fn destroy(self, device: &mut dyn RenderDevice) -> MemoryResult<()> {
        self.ring.destroy(device)
    }
}
