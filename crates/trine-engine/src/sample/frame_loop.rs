use crate::command::{record_frame, Closed, CommandAllocator, CommandList, FrameInputs};
use crate::sync::{FrameError, FrameSynchronizer, Presenter, Queue};

/// Serialized per-frame lifecycle: record, submit, present, wait.
///
/// Owns the single allocator and command list. Every frame waits for the
/// GPU before returning, so the allocator is always free at the next record.
pub struct FrameLoop<Q, P> {
    sync: FrameSynchronizer<Q, P>,
    allocator: CommandAllocator,
    list: CommandList<Closed>,
    inputs: FrameInputs,
    frames: u64,
}

impl<Q: Queue, P: Presenter> FrameLoop<Q, P> {
    /// Creates the command list closed and waits once for setup work to finish.
    pub fn new(mut sync: FrameSynchronizer<Q, P>, inputs: FrameInputs) -> Result<Self, FrameError> {
        let mut allocator = CommandAllocator::new();
        let list = CommandList::create(allocator.reset(sync.fence())?, inputs.pipeline).close();

        sync.wait_for_gpu()?;

        Ok(Self {
            sync,
            allocator,
            list,
            inputs,
            frames: 0,
        })
    }

    /// Renders one frame and blocks until the GPU has finished it.
    pub fn render(&mut self) -> Result<(), FrameError> {
        let frame_index = self.sync.frame_index();

        record_frame(
            &mut self.list,
            &mut self.allocator,
            self.sync.fence(),
            &self.inputs,
            frame_index,
        )?;
        self.sync.submit(&self.list, &mut self.allocator)?;
        self.sync.present()?;
        self.sync.wait_for_gpu()?;

        self.frames += 1;
        Ok(())
    }

    /// Waits for all submitted work. Safe to call repeatedly.
    pub fn drain(&mut self) -> Result<(), FrameError> {
        let value = self.sync.wait_for_gpu()?;
        log::debug!("drained GPU at fence value {value} after {} frames", self.frames);
        Ok(())
    }

    pub fn frame_index(&self) -> usize {
        self.sync.frame_index()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn synchronizer(&self) -> &FrameSynchronizer<Q, P> {
        &self.sync
    }

    pub fn inputs(&self) -> &FrameInputs {
        &self.inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, RenderTargetView, ScissorRect, Viewport, CLEAR_COLOR};
    use crate::pipeline::CpuDescriptorHandle;
    use crate::resource::{GpuAddress, ResourceId, VertexBufferView};
    use crate::sync::testing::{FakePresenter, FakeQueue, PIPELINE};

    fn inputs() -> FrameInputs {
        FrameInputs {
            pipeline: PIPELINE,
            viewport: Viewport::full(320, 240),
            scissor: ScissorRect::full(320, 240),
            render_targets: vec![
                RenderTargetView {
                    resource: ResourceId(0),
                    rtv: CpuDescriptorHandle(0x1000),
                },
                RenderTargetView {
                    resource: ResourceId(1),
                    rtv: CpuDescriptorHandle(0x1020),
                },
            ],
            vertex_buffer: VertexBufferView {
                location: GpuAddress(0x1_0000),
                stride: 28,
                size: 84,
            },
            clear_color: CLEAR_COLOR,
        }
    }

    fn frame_loop() -> FrameLoop<FakeQueue, FakePresenter> {
        let sync = FrameSynchronizer::new(FakeQueue::new(), FakePresenter::new(2));
        FrameLoop::new(sync, inputs()).unwrap()
    }

    fn drawn_target(commands: &[Command]) -> Option<CpuDescriptorHandle> {
        commands.iter().find_map(|c| match c {
            Command::SetRenderTarget(rtv) => Some(*rtv),
            _ => None,
        })
    }

    // ── setup ───────────────────────────────────────────────────────────

    #[test]
    fn setup_waits_once_before_first_frame() {
        let frames = frame_loop();
        let sync = frames.synchronizer();

        assert_eq!(sync.queue().signaled(), [1]);
        assert!(sync.queue().executed().is_empty());
        assert_eq!(sync.fence().completed_value(), 1);
        assert_eq!(frames.frame_index(), 0);
    }

    // ── frames ──────────────────────────────────────────────────────────

    #[test]
    fn three_frames_cycle_two_back_buffers() {
        let mut frames = frame_loop();
        let mut observed = Vec::new();

        for _ in 0..3 {
            observed.push(frames.frame_index());
            frames.render().unwrap();
        }

        assert_eq!(observed, [0, 1, 0]);

        let targets: Vec<_> = frames
            .synchronizer()
            .queue()
            .executed()
            .iter()
            .map(|c| drawn_target(c))
            .collect();
        assert_eq!(
            targets,
            [
                Some(CpuDescriptorHandle(0x1000)),
                Some(CpuDescriptorHandle(0x1020)),
                Some(CpuDescriptorHandle(0x1000)),
            ]
        );
    }

    #[test]
    fn each_frame_signals_the_next_value() {
        let mut frames = frame_loop();
        for _ in 0..3 {
            frames.render().unwrap();
            let sync = frames.synchronizer();
            assert_eq!(sync.fence().completed_value(), sync.last_signaled());
        }

        assert_eq!(frames.synchronizer().queue().signaled(), [1, 2, 3, 4]);
        assert_eq!(frames.frames(), 3);
    }

    #[test]
    fn drain_signals_and_completes() {
        let mut frames = frame_loop();
        frames.render().unwrap();
        frames.drain().unwrap();
        frames.drain().unwrap();

        let sync = frames.synchronizer();
        assert_eq!(sync.last_signaled(), 4);
        assert_eq!(sync.fence().completed_value(), 4);
    }

    // ── failures ────────────────────────────────────────────────────────

    #[test]
    fn stalled_gpu_surfaces_as_sync_error() {
        let sync = FrameSynchronizer::new(FakeQueue::new(), FakePresenter::new(2))
            .with_timeout(std::time::Duration::from_millis(1));
        let mut frames = FrameLoop::new(sync, inputs()).unwrap();
        frames.sync.queue_mut().stall();

        assert!(matches!(frames.render(), Err(FrameError::Sync(_))));
    }
}
