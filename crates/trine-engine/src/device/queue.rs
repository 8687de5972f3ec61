use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::time::{Duration, Instant};

use crate::command::{Closed, Command, CommandList, ScissorRect, Viewport};
use crate::pipeline::{
    CpuDescriptorHandle, DescriptorHeap, PipelineHandle, PipelineId, PipelineState,
    PrimitiveTopology, Vertex,
};
use crate::resource::{
    ResourceId, ResourceState, StateTracker, UploadError, Uploader, VertexBufferView,
};
use crate::sync::{Fence, Queue, QueueError, SyncError};

/// Render-target view stored in the RTV heap.
pub struct RenderTargetDescriptor {
    pub resource: ResourceId,
    pub view: wgpu::TextureView,
}

/// Direct queue backed by `wgpu::Queue`.
///
/// Resolves the ids and handles recorded in command lists against the
/// objects registered here, checks barriers against tracked resource
/// states, and encodes the result as render passes.
pub struct WgpuQueue {
    device: wgpu::Device,
    queue: wgpu::Queue,
    rtv_heap: DescriptorHeap<RenderTargetDescriptor>,
    uploader: Uploader,
    pipelines: HashMap<PipelineId, PipelineState>,
    tracker: StateTracker,
}

impl WgpuQueue {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        rtv_heap: DescriptorHeap<RenderTargetDescriptor>,
    ) -> Self {
        Self {
            device,
            queue,
            rtv_heap,
            uploader: Uploader::new(),
            pipelines: HashMap::new(),
            tracker: StateTracker::new(),
        }
    }

    /// Starts tracking a resource in `state`.
    pub fn track(&mut self, resource: ResourceId, state: ResourceState) {
        self.tracker.register(resource, state);
    }

    pub fn register_pipeline(&mut self, pipeline: PipelineState) -> PipelineHandle {
        let handle = pipeline.handle();
        self.pipelines.insert(handle.pipeline, pipeline);
        handle
    }

    pub fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<VertexBufferView, UploadError> {
        self.uploader.upload_vertices(&self.device, vertices)
    }

    pub fn rtv_heap(&self) -> &DescriptorHeap<RenderTargetDescriptor> {
        &self.rtv_heap
    }

    fn encode(
        &self,
        pipeline: &PipelineState,
        passes: &[PassPlan],
    ) -> Result<wgpu::CommandBuffer, QueueError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trine command list"),
            });

        for plan in passes {
            let target = self
                .rtv_heap
                .get(plan.rtv)
                .ok_or(QueueError::UnknownDescriptor(plan.rtv))?;

            let load = match plan.clear {
                Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                    r: f64::from(r),
                    g: f64::from(g),
                    b: f64::from(b),
                    a: f64::from(a),
                }),
                None => wgpu::LoadOp::Load,
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trine render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if plan.draws.is_empty() {
                continue;
            }
            pass.set_pipeline(pipeline.raw());

            for draw in &plan.draws {
                let location = draw.vertex_buffer.location;
                let (buffer, offset) = self
                    .uploader
                    .buffers()
                    .resolve(location)
                    .ok_or(QueueError::UnknownBuffer(location))?;
                let end = offset + u64::from(draw.vertex_buffer.size);
                if end > buffer.size() {
                    return Err(QueueError::UnknownBuffer(location));
                }

                if let Some(v) = draw.viewport {
                    pass.set_viewport(v.x, v.y, v.width, v.height, v.min_depth, v.max_depth);
                }
                if let Some(s) = draw.scissor {
                    pass.set_scissor_rect(s.x, s.y, s.width, s.height);
                }
                pass.set_vertex_buffer(0, buffer.slice(offset..end));
                pass.draw(draw.vertices.clone(), draw.instances.clone());
            }
        }

        Ok(encoder.finish())
    }
}

impl Queue for WgpuQueue {
    fn execute(&mut self, list: &CommandList<Closed>) -> Result<(), QueueError> {
        let handle = list.pipeline();
        let pipeline = self
            .pipelines
            .get(&handle.pipeline)
            .ok_or(QueueError::UnknownPipeline(handle.pipeline))?;

        let mut scratch = self.tracker.clone();
        let passes = plan_passes(
            list.commands(),
            pipeline.handle(),
            pipeline.desc().topology,
            &mut scratch,
            |rtv| self.rtv_heap.get(rtv).map(|d| d.resource),
        )?;

        let commands = self.encode(pipeline, &passes)?;
        self.queue.submit(std::iter::once(commands));
        self.tracker = scratch;
        Ok(())
    }

    fn signal(&mut self, fence: &Fence, value: u64) -> Result<(), SyncError> {
        fence.begin_signal(value)?;
        let fence = fence.clone();
        self.queue
            .on_submitted_work_done(move || fence.complete(value));
        Ok(())
    }

    fn wait(
        &mut self,
        fence: &Fence,
        value: u64,
        timeout: Option<Duration>,
    ) -> Result<(), SyncError> {
        if fence.is_complete(value) {
            return Ok(());
        }

        let started = Instant::now();
        let timed_out = |fence: &Fence| SyncError::Timeout {
            value,
            completed: fence.completed_value(),
            waited: started.elapsed(),
        };

        // Completion callbacks run inside poll, so one blocking poll that
        // drains the queue either reaches the value or never will.
        match self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout,
        }) {
            Ok(_) => {}
            Err(wgpu::PollError::Timeout) => return Err(timed_out(fence)),
            Err(e) => return Err(SyncError::Wait(e.to_string())),
        }

        if !fence.is_complete(value) {
            return Err(SyncError::Wait(format!(
                "device idle with fence at {}, expected {value}",
                fence.completed_value()
            )));
        }
        Ok(())
    }
}

/// One render pass: a target, an optional clear and the draws into it.
#[derive(Debug, Clone, PartialEq)]
struct PassPlan {
    rtv: CpuDescriptorHandle,
    clear: Option<[f32; 4]>,
    draws: Vec<DrawPlan>,
}

#[derive(Debug, Clone, PartialEq)]
struct DrawPlan {
    viewport: Option<Viewport>,
    scissor: Option<ScissorRect>,
    vertex_buffer: VertexBufferView,
    vertices: Range<u32>,
    instances: Range<u32>,
}

/// Replays `commands` against `tracker` and groups them into render passes.
///
/// Clears and draws must target a view whose resource is in render-target
/// state; draws must match the pipeline's root signature and topology. The
/// list must leave every resource out of render-target state.
fn plan_passes(
    commands: &[Command],
    pipeline: PipelineHandle,
    topology: PrimitiveTopology,
    tracker: &mut StateTracker,
    target_of: impl Fn(CpuDescriptorHandle) -> Option<ResourceId>,
) -> Result<Vec<PassPlan>, QueueError> {
    let mut root_signature = None;
    let mut viewport = None;
    let mut scissor = None;
    let mut bound_topology = None;
    let mut vertex_buffers = BTreeMap::new();
    let mut bound_target = None;
    let mut passes: Vec<PassPlan> = Vec::new();

    let drawable = |tracker: &StateTracker, rtv: CpuDescriptorHandle| {
        let resource = target_of(rtv).ok_or(QueueError::UnknownDescriptor(rtv))?;
        match tracker.state(resource) {
            Some(ResourceState::RenderTarget) => Ok(()),
            _ => Err(QueueError::NoRenderTarget),
        }
    };

    for command in commands {
        match *command {
            Command::SetGraphicsRootSignature(id) => root_signature = Some(id),
            Command::SetViewport(v) => viewport = Some(v),
            Command::SetScissorRect(r) => scissor = Some(r),
            Command::ResourceBarrier(ref barrier) => tracker.apply(barrier)?,
            Command::SetRenderTarget(rtv) => {
                target_of(rtv).ok_or(QueueError::UnknownDescriptor(rtv))?;
                bound_target = Some(rtv);
            }
            Command::ClearRenderTarget { rtv, color } => {
                drawable(tracker, rtv)?;
                match passes.last_mut() {
                    Some(pass) if pass.rtv == rtv && pass.draws.is_empty() => {
                        pass.clear = Some(color)
                    }
                    _ => passes.push(PassPlan {
                        rtv,
                        clear: Some(color),
                        draws: Vec::new(),
                    }),
                }
            }
            Command::SetPrimitiveTopology(t) => bound_topology = Some(t),
            Command::SetVertexBuffer { slot, view } => {
                vertex_buffers.insert(slot, view);
            }
            Command::DrawInstanced {
                vertex_count,
                instance_count,
                start_vertex,
                start_instance,
            } => {
                let rtv = bound_target.ok_or(QueueError::NoRenderTarget)?;
                drawable(tracker, rtv)?;

                let bound = root_signature.ok_or(QueueError::NoRootSignature)?;
                if bound != pipeline.root_signature {
                    return Err(QueueError::RootSignatureMismatch {
                        bound,
                        expected: pipeline.root_signature,
                    });
                }

                let bound = bound_topology.ok_or(QueueError::NoTopology)?;
                if bound != topology {
                    return Err(QueueError::TopologyMismatch {
                        bound,
                        expected: topology,
                    });
                }

                let vertex_buffer = *vertex_buffers.get(&0).ok_or(QueueError::NoVertexBuffer)?;

                let draw = DrawPlan {
                    viewport,
                    scissor,
                    vertex_buffer,
                    vertices: start_vertex..start_vertex + vertex_count,
                    instances: start_instance..start_instance + instance_count,
                };
                match passes.last_mut() {
                    Some(pass) if pass.rtv == rtv => pass.draws.push(draw),
                    _ => passes.push(PassPlan {
                        rtv,
                        clear: None,
                        draws: vec![draw],
                    }),
                }
            }
        }
    }

    if tracker.any_in(ResourceState::RenderTarget) {
        return Err(QueueError::RenderTargetLeftOpen);
    }

    Ok(passes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{
        record_frame, CommandAllocator, FrameInputs, RenderTargetView, CLEAR_COLOR,
    };
    use crate::pipeline::RootSignatureId;
    use crate::resource::{GpuAddress, StateError, TransitionBarrier};
    use crate::sync::testing::PIPELINE;

    const RT0: ResourceId = ResourceId(10);
    const RT1: ResourceId = ResourceId(11);
    const RTV0: CpuDescriptorHandle = CpuDescriptorHandle(0x1000);
    const RTV1: CpuDescriptorHandle = CpuDescriptorHandle(0x1020);

    const VB: VertexBufferView = VertexBufferView {
        location: GpuAddress(0x1_0000),
        stride: 28,
        size: 84,
    };

    fn target_of(rtv: CpuDescriptorHandle) -> Option<ResourceId> {
        match rtv {
            RTV0 => Some(RT0),
            RTV1 => Some(RT1),
            _ => None,
        }
    }

    fn tracker() -> StateTracker {
        let mut t = StateTracker::new();
        t.register(RT0, ResourceState::Present);
        t.register(RT1, ResourceState::Present);
        t
    }

    fn plan(commands: &[Command], tracker: &mut StateTracker) -> Result<Vec<PassPlan>, QueueError> {
        plan_passes(
            commands,
            PIPELINE,
            PrimitiveTopology::TriangleList,
            tracker,
            target_of,
        )
    }

    fn to_rt(resource: ResourceId) -> Command {
        Command::ResourceBarrier(TransitionBarrier::new(
            resource,
            ResourceState::Present,
            ResourceState::RenderTarget,
        ))
    }

    fn to_present(resource: ResourceId) -> Command {
        Command::ResourceBarrier(TransitionBarrier::new(
            resource,
            ResourceState::RenderTarget,
            ResourceState::Present,
        ))
    }

    fn draw() -> Command {
        Command::DrawInstanced {
            vertex_count: 3,
            instance_count: 1,
            start_vertex: 0,
            start_instance: 0,
        }
    }

    // ── recorded frames ─────────────────────────────────────────────────

    #[test]
    fn recorded_frame_plans_one_cleared_pass() {
        let fence = Fence::new(0);
        let mut allocator = CommandAllocator::new();
        let inputs = FrameInputs {
            pipeline: PIPELINE,
            viewport: Viewport::full(64, 64),
            scissor: ScissorRect::full(64, 64),
            render_targets: vec![
                RenderTargetView { resource: RT0, rtv: RTV0 },
                RenderTargetView { resource: RT1, rtv: RTV1 },
            ],
            vertex_buffer: VB,
            clear_color: CLEAR_COLOR,
        };
        let mut list = CommandList::create(allocator.reset(&fence).unwrap(), PIPELINE).close();
        record_frame(&mut list, &mut allocator, &fence, &inputs, 1).unwrap();

        let mut t = tracker();
        let passes = plan(list.commands(), &mut t).unwrap();

        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].rtv, RTV1);
        assert_eq!(passes[0].clear, Some(CLEAR_COLOR));
        assert_eq!(passes[0].draws.len(), 1);
        assert_eq!(passes[0].draws[0].vertices, 0..3);
        assert_eq!(passes[0].draws[0].instances, 0..1);
        assert_eq!(passes[0].draws[0].viewport, Some(Viewport::full(64, 64)));
        assert_eq!(t.state(RT1), Some(ResourceState::Present));
    }

    #[test]
    fn empty_list_plans_nothing() {
        let mut t = tracker();
        assert!(plan(&[], &mut t).unwrap().is_empty());
    }

    // ── rejected lists ──────────────────────────────────────────────────

    #[test]
    fn draw_outside_render_target_state_is_rejected() {
        let mut t = tracker();
        let commands = [
            Command::SetGraphicsRootSignature(PIPELINE.root_signature),
            Command::SetRenderTarget(RTV0),
            Command::SetPrimitiveTopology(PrimitiveTopology::TriangleList),
            Command::SetVertexBuffer { slot: 0, view: VB },
            draw(),
        ];
        assert_eq!(plan(&commands, &mut t), Err(QueueError::NoRenderTarget));
    }

    #[test]
    fn mismatched_barrier_is_rejected() {
        let mut t = tracker();
        let err = plan(&[to_present(RT0)], &mut t).unwrap_err();
        assert_eq!(
            err,
            QueueError::State(StateError::Mismatch {
                resource: RT0,
                expected: ResourceState::RenderTarget,
                actual: ResourceState::Present,
            })
        );
    }

    #[test]
    fn unpaired_transition_is_rejected() {
        let mut t = tracker();
        let commands = [to_rt(RT0), Command::SetRenderTarget(RTV0)];
        assert_eq!(plan(&commands, &mut t), Err(QueueError::RenderTargetLeftOpen));
    }

    #[test]
    fn wrong_root_signature_is_rejected() {
        let mut t = tracker();
        let commands = [
            Command::SetGraphicsRootSignature(RootSignatureId(99)),
            to_rt(RT0),
            Command::SetRenderTarget(RTV0),
            Command::SetPrimitiveTopology(PrimitiveTopology::TriangleList),
            Command::SetVertexBuffer { slot: 0, view: VB },
            draw(),
            to_present(RT0),
        ];
        assert_eq!(
            plan(&commands, &mut t),
            Err(QueueError::RootSignatureMismatch {
                bound: RootSignatureId(99),
                expected: PIPELINE.root_signature,
            })
        );
    }

    #[test]
    fn draw_needs_topology_and_vertex_buffer() {
        let prefix = [
            Command::SetGraphicsRootSignature(PIPELINE.root_signature),
            to_rt(RT0),
            Command::SetRenderTarget(RTV0),
        ];

        let mut commands = prefix.to_vec();
        commands.push(draw());
        assert_eq!(plan(&commands, &mut tracker()), Err(QueueError::NoTopology));

        let mut commands = prefix.to_vec();
        commands.push(Command::SetPrimitiveTopology(PrimitiveTopology::LineList));
        commands.push(draw());
        assert_eq!(
            plan(&commands, &mut tracker()),
            Err(QueueError::TopologyMismatch {
                bound: PrimitiveTopology::LineList,
                expected: PrimitiveTopology::TriangleList,
            })
        );

        let mut commands = prefix.to_vec();
        commands.push(Command::SetPrimitiveTopology(PrimitiveTopology::TriangleList));
        commands.push(draw());
        assert_eq!(plan(&commands, &mut tracker()), Err(QueueError::NoVertexBuffer));
    }

    #[test]
    fn unknown_descriptor_is_rejected() {
        let mut t = tracker();
        let rtv = CpuDescriptorHandle(0xdead);
        assert_eq!(
            plan(&[Command::SetRenderTarget(rtv)], &mut t),
            Err(QueueError::UnknownDescriptor(rtv))
        );
    }

    // ── pass grouping ───────────────────────────────────────────────────

    #[test]
    fn clear_after_draw_starts_new_pass() {
        let mut t = tracker();
        let commands = [
            Command::SetGraphicsRootSignature(PIPELINE.root_signature),
            to_rt(RT0),
            Command::SetRenderTarget(RTV0),
            Command::SetPrimitiveTopology(PrimitiveTopology::TriangleList),
            Command::SetVertexBuffer { slot: 0, view: VB },
            draw(),
            Command::ClearRenderTarget {
                rtv: RTV0,
                color: [1.0; 4],
            },
            draw(),
            to_present(RT0),
        ];

        let passes = plan(&commands, &mut t).unwrap();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].clear, None);
        assert_eq!(passes[1].clear, Some([1.0; 4]));
        assert_eq!(passes[1].draws.len(), 1);
    }
}
