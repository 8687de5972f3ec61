//! GPU resources referenced by command lists.
//!
//! Resources are addressed by id (render targets) or by virtual address
//! (buffers) so that recorded commands stay backend-neutral.

mod state;
mod upload;

pub use state::{ResourceId, ResourceState, StateError, StateTracker, TransitionBarrier};
pub use upload::{
    AddressSpace, BufferTable, GpuAddress, UploadError, Uploader, VertexBufferView,
    ALLOCATION_ALIGNMENT,
};
