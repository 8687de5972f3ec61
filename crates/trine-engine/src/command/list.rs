use crate::pipeline::{CpuDescriptorHandle, PipelineHandle, PrimitiveTopology, RootSignatureId};
use crate::resource::{ResourceId, ResourceState, TransitionBarrier, VertexBufferView};

use super::allocator::ResetAllocator;

/// Rasterizer viewport in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle in pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// A back buffer together with its render-target view.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderTargetView {
    pub resource: ResourceId,
    pub rtv: CpuDescriptorHandle,
}

/// One recorded GPU command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetGraphicsRootSignature(RootSignatureId),
    SetViewport(Viewport),
    SetScissorRect(ScissorRect),
    ResourceBarrier(TransitionBarrier),
    SetRenderTarget(CpuDescriptorHandle),
    ClearRenderTarget {
        rtv: CpuDescriptorHandle,
        color: [f32; 4],
    },
    SetPrimitiveTopology(PrimitiveTopology),
    SetVertexBuffer {
        slot: u32,
        view: VertexBufferView,
    },
    DrawInstanced {
        vertex_count: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    },
}

/// List is accepting commands. Borrows its allocator for the duration.
#[derive(Debug)]
pub struct Recording<'a> {
    _allocator: ResetAllocator<'a>,
}

/// List is immutable and may be submitted.
#[derive(Debug)]
pub struct Closed;

/// Recorded command sequence.
///
/// `CommandList<Closed>` is the only form a queue accepts; reaching it from
/// `CommandList<Recording>` requires [`CommandList::close`].
#[derive(Debug)]
pub struct CommandList<S> {
    commands: Vec<Command>,
    pipeline: PipelineHandle,
    state: S,
}

impl<'a> CommandList<Recording<'a>> {
    /// Creates a list in the recording state, bound to `pipeline`.
    pub fn create(allocator: ResetAllocator<'a>, pipeline: PipelineHandle) -> Self {
        Self {
            commands: Vec::new(),
            pipeline,
            state: Recording {
                _allocator: allocator,
            },
        }
    }

    pub fn set_graphics_root_signature(&mut self, root_signature: RootSignatureId) {
        self.commands
            .push(Command::SetGraphicsRootSignature(root_signature));
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(Command::SetViewport(viewport));
    }

    pub fn set_scissor_rect(&mut self, rect: ScissorRect) {
        self.commands.push(Command::SetScissorRect(rect));
    }

    /// Records drawing into `target`.
    ///
    /// The target is transitioned Present → RenderTarget and bound before
    /// `record` runs, and transitioned back to Present afterwards.
    pub fn render_to<R>(
        &mut self,
        target: RenderTargetView,
        record: impl FnOnce(&mut TargetRecorder<'_>) -> R,
    ) -> R {
        self.commands.push(Command::ResourceBarrier(TransitionBarrier::new(
            target.resource,
            ResourceState::Present,
            ResourceState::RenderTarget,
        )));
        self.commands.push(Command::SetRenderTarget(target.rtv));

        let out = record(&mut TargetRecorder {
            commands: &mut self.commands,
            rtv: target.rtv,
        });

        self.commands.push(Command::ResourceBarrier(TransitionBarrier::new(
            target.resource,
            ResourceState::RenderTarget,
            ResourceState::Present,
        )));
        out
    }

    /// Finishes recording.
    pub fn close(self) -> CommandList<Closed> {
        CommandList {
            commands: self.commands,
            pipeline: self.pipeline,
            state: Closed,
        }
    }
}

impl CommandList<Closed> {
    /// Starts a new recording, reusing this list's storage.
    ///
    /// `self` is left empty; closing the returned list yields its replacement.
    pub fn reset<'a>(
        &mut self,
        allocator: ResetAllocator<'a>,
        pipeline: PipelineHandle,
    ) -> CommandList<Recording<'a>> {
        let mut commands = std::mem::take(&mut self.commands);
        commands.clear();
        CommandList {
            commands,
            pipeline,
            state: Recording {
                _allocator: allocator,
            },
        }
    }
}

impl<S> CommandList<S> {
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn pipeline(&self) -> PipelineHandle {
        self.pipeline
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

/// Commands valid only while a render target is bound for drawing.
pub struct TargetRecorder<'l> {
    commands: &'l mut Vec<Command>,
    rtv: CpuDescriptorHandle,
}

impl TargetRecorder<'_> {
    pub fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(Command::ClearRenderTarget {
            rtv: self.rtv,
            color,
        });
    }

    pub fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.commands.push(Command::SetPrimitiveTopology(topology));
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, view: VertexBufferView) {
        self.commands.push(Command::SetVertexBuffer { slot, view });
    }

    pub fn draw_instanced(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    ) {
        self.commands.push(Command::DrawInstanced {
            vertex_count,
            instance_count,
            start_vertex,
            start_instance,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandAllocator;
    use crate::pipeline::PipelineId;
    use crate::sync::Fence;

    const PIPELINE: PipelineHandle = PipelineHandle {
        pipeline: PipelineId(1),
        root_signature: RootSignatureId(1),
    };

    const TARGET: RenderTargetView = RenderTargetView {
        resource: ResourceId(3),
        rtv: CpuDescriptorHandle(0x1000),
    };

    #[test]
    fn created_list_closes_empty() {
        let fence = Fence::new(0);
        let mut allocator = CommandAllocator::new();
        let list = CommandList::create(allocator.reset(&fence).unwrap(), PIPELINE).close();
        assert!(list.commands().is_empty());
        assert_eq!(list.pipeline(), PIPELINE);
    }

    #[test]
    fn render_to_brackets_commands_with_barriers() {
        let fence = Fence::new(0);
        let mut allocator = CommandAllocator::new();
        let mut list = CommandList::create(allocator.reset(&fence).unwrap(), PIPELINE);

        list.render_to(TARGET, |pass| pass.clear([1.0, 0.0, 0.0, 1.0]));
        let list = list.close();

        assert_eq!(
            list.commands(),
            [
                Command::ResourceBarrier(TransitionBarrier::new(
                    TARGET.resource,
                    ResourceState::Present,
                    ResourceState::RenderTarget,
                )),
                Command::SetRenderTarget(TARGET.rtv),
                Command::ClearRenderTarget {
                    rtv: TARGET.rtv,
                    color: [1.0, 0.0, 0.0, 1.0],
                },
                Command::ResourceBarrier(TransitionBarrier::new(
                    TARGET.resource,
                    ResourceState::RenderTarget,
                    ResourceState::Present,
                )),
            ]
        );
    }

    #[test]
    fn reset_discards_previous_commands() {
        let fence = Fence::new(0);
        let mut allocator = CommandAllocator::new();

        let mut list = CommandList::create(allocator.reset(&fence).unwrap(), PIPELINE);
        list.set_scissor_rect(ScissorRect::full(4, 4));
        let mut list = list.close();
        assert_eq!(list.commands().len(), 1);

        let recording = list.reset(allocator.reset(&fence).unwrap(), PIPELINE);
        assert!(recording.commands().is_empty());
        list = recording.close();
        assert!(list.commands().is_empty());
    }
}
