use std::collections::BTreeMap;

use thiserror::Error;

use crate::pipeline::Vertex;

/// Virtual address of a buffer as seen by command lists.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GpuAddress(pub u64);

/// Description of vertex data bound to the input assembler.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexBufferView {
    pub location: GpuAddress,
    pub stride: u32,
    pub size: u32,
}

impl VertexBufferView {
    pub fn vertex_count(&self) -> u32 {
        if self.stride == 0 { 0 } else { self.size / self.stride }
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum UploadError {
    #[error("vertex payload is empty")]
    Empty,

    #[error("vertex payload of {0} bytes exceeds the view size limit")]
    TooLarge(usize),
}

/// Placement granularity for buffer allocations.
pub const ALLOCATION_ALIGNMENT: u64 = 64 * 1024;

/// Hands out non-overlapping, aligned address ranges.
#[derive(Debug)]
pub struct AddressSpace {
    next: u64,
}

impl AddressSpace {
    pub fn new() -> Self {
        Self {
            next: ALLOCATION_ALIGNMENT,
        }
    }

    pub fn allocate(&mut self, size: u64) -> GpuAddress {
        let base = self.next;
        let span = size.max(1).div_ceil(ALLOCATION_ALIGNMENT) * ALLOCATION_ALIGNMENT;
        self.next += span;
        GpuAddress(base)
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

/// Buffers keyed by their base address.
#[derive(Debug)]
pub struct BufferTable<B> {
    entries: BTreeMap<u64, (u64, B)>,
}

impl<B> BufferTable<B> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, base: GpuAddress, size: u64, buffer: B) {
        self.entries.insert(base.0, (size, buffer));
    }

    /// Finds the buffer containing `address` and the offset into it.
    pub fn resolve(&self, address: GpuAddress) -> Option<(&B, u64)> {
        let (&base, (size, buffer)) = self.entries.range(..=address.0).next_back()?;
        let offset = address.0 - base;
        (offset < *size).then_some((buffer, offset))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<B> Default for BufferTable<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates CPU-writable vertex buffers and publishes their views.
///
/// Buffers are written once at creation and never touched again.
pub struct Uploader {
    space: AddressSpace,
    buffers: BufferTable<wgpu::Buffer>,
}

impl Uploader {
    pub fn new() -> Self {
        Self {
            space: AddressSpace::new(),
            buffers: BufferTable::new(),
        }
    }

    pub fn buffers(&self) -> &BufferTable<wgpu::Buffer> {
        &self.buffers
    }

    pub fn upload_vertices(
        &mut self,
        device: &wgpu::Device,
        vertices: &[Vertex],
    ) -> Result<VertexBufferView, UploadError> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let view = plan_view(&mut self.space, bytes.len())?;

        // Mapped at creation: write-only, nothing is read back.
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("trine vertex buffer"),
            size: bytes.len() as u64,
            usage: wgpu::BufferUsages::VERTEX,
            mapped_at_creation: true,
        });
        buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(bytes);
        buffer.unmap();

        log::debug!(
            "uploaded {} vertices ({} bytes) at {:#x}",
            view.vertex_count(),
            view.size,
            view.location.0
        );

        self.buffers
            .insert(view.location, u64::from(view.size), buffer);
        Ok(view)
    }
}

impl Default for Uploader {
    fn default() -> Self {
        Self::new()
    }
}

fn plan_view(space: &mut AddressSpace, size: usize) -> Result<VertexBufferView, UploadError> {
    if size == 0 {
        return Err(UploadError::Empty);
    }
    let size32 = u32::try_from(size).map_err(|_| UploadError::TooLarge(size))?;

    Ok(VertexBufferView {
        location: space.allocate(size as u64),
        stride: Vertex::STRIDE as u32,
        size: size32,
    })
}
