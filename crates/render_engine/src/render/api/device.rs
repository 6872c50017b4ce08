//! Device buffer creation, upload, and mapping trait

use slotmap::new_key_type;

use crate::render::buffer::BufferUsage;
use crate::render::DeviceResult;

new_key_type! {
    /// Handle to a device buffer resource.
    ///
    /// Slotmap keys carry an index and a generation, so a handle held past
    /// its buffer's destruction resolves to nothing instead of aliasing a
    /// recycled slot. Buffer references lean on this to detect stale owners.
    pub struct DeviceBufferId;
}

/// Creation parameters of a device buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Capabilities the buffer must support
    pub usage: BufferUsage,
}

/// Device-resource API consumed by the memory core.
///
/// One logical device, synchronous semantics: a returned call has taken
/// effect as far as the CPU timeline is concerned. Visibility to the GPU is
/// the backend's business and is only guaranteed after unmap + submission.
pub trait RenderDevice {
    /// Create a buffer and return its handle.
    fn create_buffer(&mut self, desc: BufferDesc) -> DeviceResult<DeviceBufferId>;

    /// Destroy a buffer. All references aliasing it become stale.
    fn destroy_buffer(&mut self, id: DeviceBufferId) -> DeviceResult<()>;

    /// Look up a live buffer's creation parameters.
    ///
    /// Returns `None` for destroyed or never-created handles; this is the
    /// staleness check buffer references resolve through.
    fn buffer_desc(&self, id: DeviceBufferId) -> Option<&BufferDesc>;

    /// Record a CPU-to-buffer copy of `data` at `offset`.
    fn update_buffer(&mut self, id: DeviceBufferId, offset: u64, data: &[u8]) -> DeviceResult<()>;

    /// Map a host-visible buffer for CPU writes.
    ///
    /// The pointer stays valid until the matching [`RenderDevice::unmap_buffer`].
    /// Mapping may stall if the region is still in flight from a prior
    /// frame; callers that cannot tolerate stalls double-buffer.
    fn map_buffer(&mut self, id: DeviceBufferId) -> DeviceResult<*mut u8>;

    /// Unmap a previously mapped buffer, flushing CPU writes.
    fn unmap_buffer(&mut self, id: DeviceBufferId) -> DeviceResult<()>;
}
