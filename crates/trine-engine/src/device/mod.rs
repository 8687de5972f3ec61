//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating the swap chain and its back buffers
//! - executing closed command lists and signaling fences on the wgpu queue

mod context;
mod error;
mod gpu;
mod init;
mod queue;
mod surface;
mod swap_chain;

pub use context::{initialize, DeviceContext, RTV_HEAP_START};
pub use error::SurfaceErrorAction;
pub use gpu::{Capability, Gpu};
pub use init::GpuInit;
pub use queue::{RenderTargetDescriptor, WgpuQueue};
pub use surface::BackBufferRing;
pub use swap_chain::{BackBuffer, SwapChain};
