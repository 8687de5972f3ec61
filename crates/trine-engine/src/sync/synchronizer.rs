use std::time::Duration;

use crate::command::{Closed, CommandAllocator, CommandList};

use super::{Fence, PresentError, Presenter, Queue, QueueError, SyncError, SYNC_INTERVAL};

/// Serializes frame submission against GPU completion.
///
/// Owns the fence and the next value to signal. Values start at 1 and grow
/// by exactly one per [`FrameSynchronizer::wait_for_gpu`].
pub struct FrameSynchronizer<Q, P> {
    queue: Q,
    presenter: P,
    fence: Fence,
    next_value: u64,
    frame_index: usize,
    timeout: Option<Duration>,
}

impl<Q: Queue, P: Presenter> FrameSynchronizer<Q, P> {
    pub fn new(queue: Q, presenter: P) -> Self {
        let frame_index = presenter.current_back_buffer_index();
        Self {
            queue,
            presenter,
            fence: Fence::new(0),
            next_value: 1,
            frame_index,
            timeout: None,
        }
    }

    /// Bounds every wait. Without it, waits block until the fence is reached.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Executes `list`. Its allocator stays in flight until the next signal completes.
    pub fn submit(
        &mut self,
        list: &CommandList<Closed>,
        allocator: &mut CommandAllocator,
    ) -> Result<(), QueueError> {
        self.queue.execute(list)?;
        allocator.mark_in_flight(self.next_value);
        Ok(())
    }

    pub fn present(&mut self) -> Result<(), PresentError> {
        self.presenter.present(SYNC_INTERVAL)
    }

    /// Signals the next fence value and blocks until the GPU reaches it.
    ///
    /// Returns the signaled value. Afterwards the frame index names the back
    /// buffer the next frame should render into.
    pub fn wait_for_gpu(&mut self) -> Result<u64, SyncError> {
        let value = self.next_value;
        self.queue.signal(&self.fence, value)?;
        self.next_value += 1;

        self.queue.wait(&self.fence, value, self.timeout)?;

        let completed = self.fence.completed_value();
        if completed < value {
            return Err(SyncError::Wait(format!(
                "queue returned with fence at {completed}, expected {value}"
            )));
        }

        self.frame_index = self.presenter.current_back_buffer_index();
        log::trace!("fence reached {value}, next back buffer {}", self.frame_index);
        Ok(value)
    }

    pub fn fence(&self) -> &Fence {
        &self.fence
    }

    /// Last value handed to the queue, 0 before the first signal.
    pub fn last_signaled(&self) -> u64 {
        self.next_value - 1
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}
