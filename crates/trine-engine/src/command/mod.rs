//! Command recording.
//!
//! A [`CommandList`] is either recording or closed. Recording borrows a
//! freshly reset [`CommandAllocator`], so one allocator never backs two
//! recording lists, and only closed lists can be handed to a queue.

mod allocator;
mod list;
mod recorder;

use thiserror::Error;

pub use allocator::{CommandAllocator, ResetAllocator};
pub use list::{
    Closed, Command, CommandList, Recording, RenderTargetView, ScissorRect, TargetRecorder,
    Viewport,
};
pub use recorder::{record_frame, FrameInputs, CLEAR_COLOR};

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum RecordError {
    #[error("command allocator still in flight: fence at {completed}, needs {value}")]
    AllocatorInFlight { value: u64, completed: u64 },

    #[error("no render target for back buffer {0}")]
    NoRenderTarget(usize),
}
