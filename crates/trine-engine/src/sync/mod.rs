//! CPU/GPU synchronization.
//!
//! Frames are fully serialized: record, submit, present, then block until the
//! fence reaches the value signaled after the submission. The [`Queue`] and
//! [`Presenter`] traits are the seams between this logic and the wgpu
//! backend in [`crate::device`].

mod error;
mod fence;
mod synchronizer;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use crate::command::{Closed, CommandList};

pub use error::{FrameError, PresentError, QueueError, SyncError};
pub use fence::Fence;
pub use synchronizer::FrameSynchronizer;

/// Vertical-blank interval passed to every present.
pub const SYNC_INTERVAL: u32 = 1;

/// A direct command queue.
pub trait Queue {
    /// Executes a closed command list.
    fn execute(&mut self, list: &CommandList<Closed>) -> Result<(), QueueError>;

    /// Sets `fence` to `value` once all previously executed work completes.
    fn signal(&mut self, fence: &Fence, value: u64) -> Result<(), SyncError>;

    /// Blocks until `fence` reaches `value`, or `timeout` elapses.
    fn wait(&mut self, fence: &Fence, value: u64, timeout: Option<Duration>)
        -> Result<(), SyncError>;
}

/// A chain of back buffers shown in turn.
pub trait Presenter {
    fn buffer_count(&self) -> usize;

    /// Index of the back buffer the next frame renders into.
    fn current_back_buffer_index(&self) -> usize;

    /// Shows the current back buffer and advances to the next one.
    fn present(&mut self, sync_interval: u32) -> Result<(), PresentError>;
}
