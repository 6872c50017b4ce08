//! Buffer ownership and aliasing
//!
//! Two kinds of buffer live here. An owning [`Buffer`] holds a device
//! resource for its lifetime. A referencing buffer ([`VertexBufferRef`],
//! [`IndexBufferRef`]) is a validated byte window into someone else's
//! device resource: it creates and destroys nothing, it only aliases.
//!
//! References carry the owner's generation-checked [`DeviceBufferId`]
//! rather than a raw resource handle, so resolving a reference after its
//! owner was destroyed reports [`MemoryError::StaleBuffer`] instead of
//! reading a recycled resource.

use bitflags::bitflags;

use crate::render::api::{BufferDesc, DeviceBufferId, RenderDevice};
use crate::render::{MemoryError, MemoryResult};

bitflags! {
    /// Capabilities a device buffer was created with
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BufferUsage: u32 {
        /// Bindable as a vertex buffer
        const VERTEX = 1 << 0;
        /// Bindable as an index buffer
        const INDEX = 1 << 1;
        /// Bindable as a uniform buffer
        const UNIFORM = 1 << 2;
        /// Host-visible, rewritten every frame
        const DYNAMIC = 1 << 3;
        /// Valid destination of recorded buffer updates
        const TRANSFER_DST = 1 << 4;
    }
}

/// Element width of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexFormat {
    /// 16-bit indices
    U16,
    /// 32-bit indices
    #[default]
    U32,
}

impl IndexFormat {
    /// Bytes per index
    #[must_use]
    pub const fn stride(self) -> u64 {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// An owning GPU buffer resource
#[derive(Debug)]
pub struct Buffer {
    id: DeviceBufferId,
    size: u64,
    usage: BufferUsage,
}

impl Buffer {
    /// Create a device buffer, optionally uploading initial contents.
    ///
    /// The upload is recorded immediately; `initial_data` longer than
    /// `size` is rejected by the device as out of range.
    pub fn create(
        device: &mut dyn RenderDevice,
        size: u64,
        usage: BufferUsage,
        initial_data: Option<&[u8]>,
    ) -> MemoryResult<Self> {
        let id = device.create_buffer(BufferDesc { size, usage })?;
        if let Some(data) = initial_data {
            device.update_buffer(id, 0, data)?;
        }
        log::info!("Created buffer {id:?}: {size} bytes, usage {usage:?}");
        Ok(Self { id, size, usage })
    }

    /// Destroy the device resource.
    ///
    /// Every reference aliasing this buffer becomes stale; there is no
    /// notification, references discover it when they next resolve.
    pub fn destroy(self, device: &mut dyn RenderDevice) -> MemoryResult<()> {
        device.destroy_buffer(self.id)?;
        Ok(())
    }

    /// Device handle
    #[must_use]
    pub const fn id(&self) -> DeviceBufferId {
        self.id
    }

    /// Size in bytes
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Capabilities the buffer was created with
    #[must_use]
    pub const fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Record an upload into a range of this buffer.
    pub fn update(
        &self,
        device: &mut dyn RenderDevice,
        offset: u64,
        data: &[u8],
    ) -> MemoryResult<()> {
        device.update_buffer(self.id, offset, data)?;
        Ok(())
    }
}

/// Validate that a `(offset, size)` window fits an owner with the required
/// usage bit. Shared by both reference kinds; never clamps.
fn validate_reference(
    owner_size: u64,
    owner_usage: BufferUsage,
    required: BufferUsage,
    offset: u64,
    size: u64,
) -> MemoryResult<()> {
    if !owner_usage.contains(required) {
        return Err(MemoryError::InvalidReference {
            reason: format!("owner usage {owner_usage:?} lacks required {required:?}"),
        });
    }
    if offset.checked_add(size).map_or(true, |end| end > owner_size) {
        return Err(MemoryError::InvalidReference {
            reason: format!("window {offset}+{size} exceeds owner size {owner_size}"),
        });
    }
    Ok(())
}

/// A non-owning vertex-buffer alias into a byte range of another buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferRef {
    owner: DeviceBufferId,
    offset: u64,
    size: u64,
    stride: u64,
}

impl VertexBufferRef {
    /// Alias `size` bytes starting at `offset` inside `owner`.
    ///
    /// Fails with [`MemoryError::InvalidReference`] if the owner lacks the
    /// vertex-buffer capability or the window does not fit, and with
    /// [`MemoryError::StaleBuffer`] if the owner is already gone.
    pub fn reference(
        device: &dyn RenderDevice,
        owner: &Buffer,
        offset: u64,
        size: u64,
        stride: u64,
    ) -> MemoryResult<Self> {
        let desc = device.buffer_desc(owner.id()).ok_or(MemoryError::StaleBuffer)?;
        validate_reference(desc.size, desc.usage, BufferUsage::VERTEX, offset, size)?;
        Ok(Self {
            owner: owner.id(),
            offset,
            size,
            stride,
        })
    }

    /// Alias directly by owner handle; used by allocators referencing their
    /// own backing buffer.
    pub(crate) fn reference_raw(
        device: &dyn RenderDevice,
        owner: DeviceBufferId,
        offset: u64,
        size: u64,
        stride: u64,
    ) -> MemoryResult<Self> {
        let desc = device.buffer_desc(owner).ok_or(MemoryError::StaleBuffer)?;
        validate_reference(desc.size, desc.usage, BufferUsage::VERTEX, offset, size)?;
        Ok(Self {
            owner,
            offset,
            size,
            stride,
        })
    }

    /// The `(device handle, byte offset, stride)` triple a render pass binds.
    ///
    /// Re-resolves the owner through the registry: a destroyed or
    /// reallocated owner yields [`MemoryError::StaleBuffer`] instead of a
    /// dangling binding.
    pub fn binding(&self, device: &dyn RenderDevice) -> MemoryResult<(DeviceBufferId, u64, u64)> {
        device.buffer_desc(self.owner).ok_or(MemoryError::StaleBuffer)?;
        Ok((self.owner, self.offset, self.stride))
    }

    /// Owner handle captured at reference time
    #[must_use]
    pub const fn owner(&self) -> DeviceBufferId {
        self.owner
    }

    /// Byte offset inside the owner
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Window size in bytes
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Bytes per vertex
    #[must_use]
    pub const fn stride(&self) -> u64 {
        self.stride
    }

    /// Number of whole vertices in the window
    #[must_use]
    pub const fn vertex_count(&self) -> u64 {
        if self.stride == 0 {
            0
        } else {
            self.size / self.stride
        }
    }
}

/// A non-owning index-buffer alias into a byte range of another buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBufferRef {
    owner: DeviceBufferId,
    offset: u64,
    size: u64,
    format: IndexFormat,
}

impl IndexBufferRef {
    /// Alias `size` bytes starting at `offset` inside `owner`.
    pub fn reference(
        device: &dyn RenderDevice,
        owner: &Buffer,
        offset: u64,
        size: u64,
        format: IndexFormat,
    ) -> MemoryResult<Self> {
        let desc = device.buffer_desc(owner.id()).ok_or(MemoryError::StaleBuffer)?;
        validate_reference(desc.size, desc.usage, BufferUsage::INDEX, offset, size)?;
        Ok(Self {
            owner: owner.id(),
            offset,
            size,
            format,
        })
    }

    pub(crate) fn reference_raw(
        device: &dyn RenderDevice,
        owner: DeviceBufferId,
        offset: u64,
        size: u64,
        format: IndexFormat,
    ) -> MemoryResult<Self> {
        let desc = device.buffer_desc(owner).ok_or(MemoryError::StaleBuffer)?;
        validate_reference(desc.size, desc.usage, BufferUsage::INDEX, offset, size)?;
        Ok(Self {
            owner,
            offset,
            size,
            format,
        })
    }

    /// The `(device handle, byte offset, format)` triple a render pass binds.
    pub fn binding(
        &self,
        device: &dyn RenderDevice,
    ) -> MemoryResult<(DeviceBufferId, u64, IndexFormat)> {
        device.buffer_desc(self.owner).ok_or(MemoryError::StaleBuffer)?;
        Ok((self.owner, self.offset, self.format))
    }

    /// Owner handle captured at reference time
    #[must_use]
    pub const fn owner(&self) -> DeviceBufferId {
        self.owner
    }

    /// Byte offset inside the owner
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Window size in bytes
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Element width
    #[must_use]
    pub const fn format(&self) -> IndexFormat {
        self.format
    }

    /// Number of whole indices in the window
    #[must_use]
    pub const fn index_count(&self) -> u64 {
        self.size / self.format.stride()
    }
}
