//! Pipeline objects: descriptor heaps, root signatures and pipeline state.
//!
//! Objects are referred to by id inside command lists; the queue resolves
//! ids to wgpu objects at execution time.

mod heap;
mod root_signature;
mod state;
mod vertex;

pub use heap::{CpuDescriptorHandle, DescriptorHeap, HeapError, RTV_DESCRIPTOR_STRIDE};
pub use root_signature::{RootSignature, RootSignatureDesc, RootSignatureFlags};
pub use state::{GraphicsPipelineDesc, PipelineState, PrimitiveTopology};
pub use vertex::Vertex;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RootSignatureId(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PipelineId(pub u32);

/// What a command list needs to know about the pipeline it was reset with.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PipelineHandle {
    pub pipeline: PipelineId,
    pub root_signature: RootSignatureId,
}
