//! Rendering backend implementations
//!
//! The memory core is backend-agnostic; this module hosts the in-process
//! host-memory backend used by tests and headless tools. A live Vulkan or
//! wgpu backend implements the same [`crate::render::api::RenderDevice`]
//! trait out of tree.

pub mod headless;

pub use headless::HeadlessDevice;
