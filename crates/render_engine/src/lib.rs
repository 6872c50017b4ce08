//! # Render Engine Core
//!
//! Frame-resource management and GPU buffer suballocation for a Vulkan-style
//! renderer. This crate owns the memory that crosses the CPU/GPU boundary
//! every frame:
//!
//! - **Frame arena**: bump-allocated scratch memory, reset once per frame
//! - **Object pools and growable lists**: draw-work collection with zero
//!   steady-state heap allocation
//! - **Dynamic ring buffer**: a CPU-mapped device buffer streaming transient
//!   vertex/index data each frame
//! - **Buffer aliasing**: many logical vertex/index buffers sharing one
//!   physical device buffer through validated references
//! - **Draw surface collector**: per-view classification of draw work into
//!   opaque / alpha-test / transparent queues with depth sorting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render_engine::prelude::*;
//!
//! let config = MemoryConfig::default();
//! let mut device = HeadlessDevice::new();
//! let mut frame = FrameResources::new(&mut device, &config)?;
//!
//! frame.begin_frame();
//! // ... collect draw surfaces, map the ring buffer, write, unmap, submit
//! # Ok::<(), render_engine::render::MemoryError>(())
//! ```
//!
//! Shader compilation, pipeline state, pass scheduling, and windowing are
//! collaborator territory; the only seam this crate consumes is the
//! [`render::api::RenderDevice`] trait.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod foundation;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::MemoryConfig,
        foundation::{
            math::{Mat4, Point3, Vec3},
            memory::FrameArena,
        },
        render::{
            api::{DeviceBufferId, RenderDevice},
            backends::HeadlessDevice,
            buffer::{Buffer, BufferUsage, IndexBufferRef, IndexFormat, VertexBufferRef},
            draw_queue::{DrawRange, DrawSurface, DrawSurfaceCollector},
            dynamic::DynamicRingBuffer,
            frame::FrameResources,
            material::{Material, MaterialId, RenderQueueKind},
            mesh_stream::{MeshStreamQueue, PendingMesh, StreamPolicy},
            pool::{GrowableList, Pool, PoolView},
            MemoryError, MemoryResult,
        },
    };
}
