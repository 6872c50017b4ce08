//! Rendering memory subsystems
//!
//! Transient and semi-persistent CPU/GPU memory: pools and growable lists
//! for draw-work collection, the dynamic ring buffer for per-frame geometry,
//! owning buffers and validated references for suballocation, the mesh
//! stream packing persistent meshes into shared device buffers, and the
//! per-view draw surface collector.
//!
//! The frame timeline is single-threaded and synchronous: reset phase
//! (arena, pools) then collection, then the ring buffer's map/write/unmap
//! session, then submission. Every bump allocator here returns strictly
//! increasing offsets within one reset cycle, in call order.

pub mod api;
pub mod backends;
pub mod buffer;
pub mod draw_queue;
pub mod dynamic;
pub mod error;
pub mod frame;
pub mod material;
pub mod mesh_stream;
pub mod pool;

pub use error::{DeviceError, DeviceResult, MemoryError, MemoryResult};
