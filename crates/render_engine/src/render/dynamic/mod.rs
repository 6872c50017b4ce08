//! Per-frame dynamic geometry streaming
//!
//! Transient vertex/index data that must not persist past the frame:
//! UI and debug overlays, particles, screen-space quads.

pub mod ring_buffer;

pub use ring_buffer::{DynamicRingBuffer, RingAllocation, RING_BUFFER_ALIGN};
