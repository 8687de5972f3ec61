//! In-memory queue and presenter for exercising frame logic without a GPU.

use std::time::Duration;

use crate::command::{Closed, Command, CommandList};
use crate::device::BackBufferRing;
use crate::pipeline::{PipelineHandle, PipelineId, RootSignatureId};
use crate::resource::{ResourceId, ResourceState, StateTracker};

use super::{Fence, PresentError, Presenter, Queue, QueueError, SyncError};

pub(crate) const PIPELINE: PipelineHandle = PipelineHandle {
    pipeline: PipelineId(1),
    root_signature: RootSignatureId(1),
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum GpuBehavior {
    Completes,
    Stalls,
    ReturnsEarly,
}

/// Queue whose "GPU" finishes signaled work when waited on.
pub(crate) struct FakeQueue {
    targets: Vec<ResourceId>,
    tracker: StateTracker,
    executed: Vec<Vec<Command>>,
    signaled: Vec<u64>,
    behavior: GpuBehavior,
}

impl FakeQueue {
    /// Tracks back buffers 0 and 1, both starting in present state.
    pub(crate) fn new() -> Self {
        Self::with_targets(&[ResourceId(0), ResourceId(1)])
    }

    pub(crate) fn with_targets(targets: &[ResourceId]) -> Self {
        let mut tracker = StateTracker::new();
        for &id in targets {
            tracker.register(id, ResourceState::Present);
        }
        Self {
            targets: targets.to_vec(),
            tracker,
            executed: Vec::new(),
            signaled: Vec::new(),
            behavior: GpuBehavior::Completes,
        }
    }

    pub(crate) fn stall(&mut self) {
        self.behavior = GpuBehavior::Stalls;
    }

    pub(crate) fn return_early(&mut self) {
        self.behavior = GpuBehavior::ReturnsEarly;
    }

    pub(crate) fn executed(&self) -> &[Vec<Command>] {
        &self.executed
    }

    pub(crate) fn signaled(&self) -> &[u64] {
        &self.signaled
    }
}

impl Queue for FakeQueue {
    fn execute(&mut self, list: &CommandList<Closed>) -> Result<(), QueueError> {
        for command in list.commands() {
            if let Command::ResourceBarrier(barrier) = command {
                self.tracker.apply(barrier)?;
            }
        }
        let left_open = self
            .targets
            .iter()
            .any(|&id| self.tracker.state(id) != Some(ResourceState::Present));
        if left_open {
            return Err(QueueError::RenderTargetLeftOpen);
        }

        self.executed.push(list.commands().to_vec());
        Ok(())
    }

    fn signal(&mut self, fence: &Fence, value: u64) -> Result<(), SyncError> {
        fence.begin_signal(value)?;
        self.signaled.push(value);
        Ok(())
    }

    fn wait(
        &mut self,
        fence: &Fence,
        value: u64,
        timeout: Option<Duration>,
    ) -> Result<(), SyncError> {
        match self.behavior {
            GpuBehavior::Completes => {
                fence.complete(fence.last_signaled());
                Ok(())
            }
            GpuBehavior::ReturnsEarly => Ok(()),
            GpuBehavior::Stalls => match timeout {
                Some(waited) => Err(SyncError::Timeout {
                    value,
                    completed: fence.completed_value(),
                    waited,
                }),
                None => Err(SyncError::Wait("fake GPU stalled with no timeout".into())),
            },
        }
    }
}

/// Presenter that only advances a back-buffer ring.
pub(crate) struct FakePresenter {
    ring: BackBufferRing,
    intervals: Vec<u32>,
}

impl FakePresenter {
    pub(crate) fn new(buffer_count: usize) -> Self {
        Self {
            ring: BackBufferRing::new(buffer_count),
            intervals: Vec::new(),
        }
    }

    pub(crate) fn intervals(&self) -> &[u32] {
        &self.intervals
    }
}

impl Presenter for FakePresenter {
    fn buffer_count(&self) -> usize {
        self.ring.count()
    }

    fn current_back_buffer_index(&self) -> usize {
        self.ring.current()
    }

    fn present(&mut self, sync_interval: u32) -> Result<(), PresentError> {
        self.intervals.push(sync_interval);
        self.ring.advance();
        Ok(())
    }
}
