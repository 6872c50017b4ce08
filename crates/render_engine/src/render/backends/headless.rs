//! Host-memory render device
//!
//! Implements [`RenderDevice`] over plain host allocations. Buffer contents
//! are real bytes, so every suballocation, upload, and mapped write in the
//! memory core can be asserted on without a GPU.

use slotmap::SlotMap;

use crate::render::api::{BufferDesc, DeviceBufferId, RenderDevice};
use crate::render::{DeviceError, DeviceResult};

struct HeadlessBuffer {
    desc: BufferDesc,
    data: Box<[u8]>,
    mapped: bool,
}

/// In-process [`RenderDevice`] backed by host memory
#[derive(Default)]
pub struct HeadlessDevice {
    buffers: SlotMap<DeviceBufferId, HeadlessBuffer>,
}

impl HeadlessDevice {
    /// Create an empty device
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live buffers
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Read back a buffer's bytes (test/debug aid)
    pub fn read_buffer(&self, id: DeviceBufferId, offset: u64, len: u64) -> DeviceResult<&[u8]> {
        let buffer = self.buffers.get(id).ok_or(DeviceError::BufferNotFound)?;
        let size = buffer.desc.size;
        if offset.checked_add(len).map_or(true, |end| end > size) {
            return Err(DeviceError::OutOfRange { offset, len, size });
        }
        let start = usize::try_from(offset).map_err(|_| DeviceError::OutOfRange {
            offset,
            len,
            size,
        })?;
        let end = start + len as usize;
        Ok(&buffer.data[start..end])
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> DeviceResult<DeviceBufferId> {
        let data = vec![0u8; usize::try_from(desc.size).map_err(|_| DeviceError::MapFailed {
            reason: format!("buffer size {} exceeds host address space", desc.size),
        })?]
        .into_boxed_slice();

        let id = self.buffers.insert(HeadlessBuffer {
            desc,
            data,
            mapped: false,
        });
        log::debug!("HeadlessDevice: created buffer {id:?} ({} bytes)", desc.size);
        Ok(id)
    }

    fn destroy_buffer(&mut self, id: DeviceBufferId) -> DeviceResult<()> {
        let buffer = self.buffers.get(id).ok_or(DeviceError::BufferNotFound)?;
        if buffer.mapped {
            // Freeing the storage would dangle the pointer handed out by
            // `map_buffer`; the session has to close first.
            return Err(DeviceError::MapFailed {
                reason: "buffer is still mapped".to_string(),
            });
        }
        self.buffers.remove(id);
        log::debug!("HeadlessDevice: destroyed buffer {id:?}");
        Ok(())
    }

    fn buffer_desc(&self, id: DeviceBufferId) -> Option<&BufferDesc> {
        self.buffers.get(id).map(|b| &b.desc)
    }

    fn update_buffer(&mut self, id: DeviceBufferId, offset: u64, data: &[u8]) -> DeviceResult<()> {
        let buffer = self.buffers.get_mut(id).ok_or(DeviceError::BufferNotFound)?;
        let size = buffer.desc.size;
        let len = data.len() as u64;
        if offset.checked_add(len).map_or(true, |end| end > size) {
            return Err(DeviceError::OutOfRange { offset, len, size });
        }
        let start = offset as usize;
        buffer.data[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn map_buffer(&mut self, id: DeviceBufferId) -> DeviceResult<*mut u8> {
        let buffer = self.buffers.get_mut(id).ok_or(DeviceError::BufferNotFound)?;
        if buffer.mapped {
            return Err(DeviceError::MapFailed {
                reason: "buffer is already mapped".to_string(),
            });
        }
        buffer.mapped = true;
        Ok(buffer.data.as_mut_ptr())
    }

    fn unmap_buffer(&mut self, id: DeviceBufferId) -> DeviceResult<()> {
        let buffer = self.buffers.get_mut(id).ok_or(DeviceError::BufferNotFound)?;
        if !buffer.mapped {
            return Err(DeviceError::MapFailed {
                reason: "buffer is not mapped".to_string(),
            });
        }
        buffer.mapped = false;
        Ok(())
    }
}
