//! Backend abstraction for the device-resource collaborator
//!
//! This module defines the trait a rendering backend must implement for the
//! memory core to create, upload to, and map device buffers. The core never
//! touches a concrete graphics API; render passes receive
//! `(DeviceBufferId, byte offset, stride/format)` triples and bind them
//! through whatever backend is in use.

pub mod device;

pub use device::{BufferDesc, DeviceBufferId, RenderDevice};
