use thiserror::Error;

/// Byte stride between render-target descriptors.
pub const RTV_DESCRIPTOR_STRIDE: u32 = 32;

/// CPU-side address of a descriptor slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CpuDescriptorHandle(pub u64);

impl CpuDescriptorHandle {
    pub fn offset(self, count: u32, stride: u32) -> Self {
        Self(self.0 + u64::from(count) * u64::from(stride))
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum HeapError {
    #[error("descriptor handle {0:?} is outside the heap")]
    OutOfRange(CpuDescriptorHandle),

    #[error("descriptor handle {0:?} is not aligned to the heap stride")]
    Misaligned(CpuDescriptorHandle),
}

/// Fixed-capacity table of view descriptors.
///
/// Slot `n` lives at `start + n * stride`. Capacity and stride never change
/// after creation.
#[derive(Debug)]
pub struct DescriptorHeap<D> {
    start: CpuDescriptorHandle,
    stride: u32,
    slots: Vec<Option<D>>,
}

impl<D> DescriptorHeap<D> {
    pub fn new(start: CpuDescriptorHandle, capacity: usize, stride: u32) -> Self {
        assert!(stride > 0, "descriptor stride must be non-zero");
        Self {
            start,
            stride,
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Increment size between consecutive descriptors.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn start(&self) -> CpuDescriptorHandle {
        self.start
    }

    /// Handle of slot `index`, or `None` past the end.
    pub fn handle(&self, index: usize) -> Option<CpuDescriptorHandle> {
        (index < self.capacity()).then(|| self.start.offset(index as u32, self.stride))
    }

    fn index_of(&self, handle: CpuDescriptorHandle) -> Result<usize, HeapError> {
        let delta = handle
            .0
            .checked_sub(self.start.0)
            .ok_or(HeapError::OutOfRange(handle))?;
        if delta % u64::from(self.stride) != 0 {
            return Err(HeapError::Misaligned(handle));
        }
        let index = (delta / u64::from(self.stride)) as usize;
        if index >= self.capacity() {
            return Err(HeapError::OutOfRange(handle));
        }
        Ok(index)
    }

    /// Writes a descriptor into the slot at `handle`, replacing any previous one.
    pub fn write(&mut self, handle: CpuDescriptorHandle, descriptor: D) -> Result<(), HeapError> {
        let index = self.index_of(handle)?;
        self.slots[index] = Some(descriptor);
        Ok(())
    }

    pub fn get(&self, handle: CpuDescriptorHandle) -> Option<&D> {
        let index = self.index_of(handle).ok()?;
        self.slots[index].as_ref()
    }
}
