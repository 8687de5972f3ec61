use std::time::Duration;

use thiserror::Error;

use crate::command::RecordError;
use crate::pipeline::{CpuDescriptorHandle, PipelineId, PrimitiveTopology, RootSignatureId};
use crate::resource::{GpuAddress, StateError};

/// CPU/GPU synchronization failure.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SyncError {
    #[error("fence value {value} does not exceed last signaled value {last}")]
    NonMonotonic { value: u64, last: u64 },

    #[error("synchronization timeout: fence at {completed}, waited {waited:?} for {value}")]
    Timeout {
        value: u64,
        completed: u64,
        waited: Duration,
    },

    /// Waiting on the device failed or returned without reaching the value.
    #[error("fence wait failed: {0}")]
    Wait(String),
}

/// A closed command list could not be executed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueueError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("no descriptor at {0:?}")]
    UnknownDescriptor(CpuDescriptorHandle),

    #[error("no buffer contains address {0:?}")]
    UnknownBuffer(GpuAddress),

    #[error("pipeline {0:?} is not registered with the queue")]
    UnknownPipeline(PipelineId),

    #[error("draw issued before a root signature was set")]
    NoRootSignature,

    #[error("root signature {bound:?} does not match pipeline root signature {expected:?}")]
    RootSignatureMismatch {
        bound: RootSignatureId,
        expected: RootSignatureId,
    },

    #[error("topology {bound:?} does not match pipeline topology {expected:?}")]
    TopologyMismatch {
        bound: PrimitiveTopology,
        expected: PrimitiveTopology,
    },

    #[error("draw issued before a primitive topology was set")]
    NoTopology,

    #[error("draw issued without a vertex buffer in slot 0")]
    NoVertexBuffer,

    #[error("draw or clear issued without a render target in render-target state")]
    NoRenderTarget,

    #[error("command list ended with a render target still bound for drawing")]
    RenderTargetLeftOpen,
}

/// Presentation failure that the frame loop cannot skip over.
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("presentation surface failed: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Any failure while producing a frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Present(#[from] PresentError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}
