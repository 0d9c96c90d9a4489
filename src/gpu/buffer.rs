//! Fixed-capacity GPU buffer management
//!
//! All vertex and uniform storage is sized once at startup. A write that
//! would run past a buffer's capacity is a hard error, never a reallocation,
//! so vertex bindings and bind groups stay valid for the program's lifetime.

use wgpu::util::DeviceExt;

use crate::error::DriftError;

/// How a buffer's contents change over its lifetime. Selects the wgpu usage
/// flags; a pattern that is never rewritten skips `COPY_DST`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsagePattern {
    /// Uploaded once at creation and only read after that (static geometry).
    StaticVertex,
    /// Overwritten from the CPU every frame (particle records).
    StreamVertex,
    /// Small per-draw constants, rewritten whenever state changes.
    Uniform,
}

impl UsagePattern {
    /// The wgpu usage flags backing this pattern.
    #[must_use]
    pub fn usages(self) -> wgpu::BufferUsages {
        match self {
            Self::StaticVertex => wgpu::BufferUsages::VERTEX,
            Self::StreamVertex => {
                wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST
            }
            Self::Uniform => {
                wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST
            }
        }
    }
}

/// A GPU buffer whose capacity is fixed at creation.
///
/// Only buffers created with a pattern carrying `COPY_DST` may be rewritten
/// through [`FixedBuffer::write_region`].
pub struct FixedBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    label: String,
}

impl FixedBuffer {
    /// Buffer initialized from existing data; capacity equals the data size.
    pub fn with_data<T: bytemuck::Pod>(
        device: &wgpu::Device,
        label: &str,
        pattern: UsagePattern,
        data: &[T],
    ) -> Self {
        let data_bytes: &[u8] = bytemuck::cast_slice(data);
        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data_bytes,
                usage: pattern.usages(),
            });
        Self {
            buffer,
            capacity: data_bytes.len() as u64,
            label: label.to_owned(),
        }
    }

    /// Overwrite a contiguous sub-range starting at `offset` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError::BufferOverrun`] when the write would run past
    /// the capacity fixed at creation; nothing is written in that case.
    pub fn write_region<T: bytemuck::Pod>(
        &self,
        queue: &wgpu::Queue,
        offset: u64,
        data: &[T],
    ) -> Result<(), DriftError> {
        let data_bytes: &[u8] = bytemuck::cast_slice(data);
        let len = data_bytes.len() as u64;
        if !region_fits(self.capacity, offset, len) {
            return Err(DriftError::BufferOverrun {
                label: self.label.clone(),
                needed: offset.saturating_add(len),
                capacity: self.capacity,
            });
        }
        if !data_bytes.is_empty() {
            queue.write_buffer(&self.buffer, offset, data_bytes);
        }
        Ok(())
    }

    /// The underlying wgpu buffer, for vertex and bind group wiring.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Capacity in bytes, fixed at creation.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Label given at creation, reused in overrun diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// True when `offset + len` stays inside `capacity` without overflowing.
fn region_fits(capacity: u64, offset: u64, len: u64) -> bool {
    offset.checked_add(len).is_some_and(|end| end <= capacity)
}
