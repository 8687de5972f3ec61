use crate::pipeline::{PipelineHandle, PrimitiveTopology};
use crate::resource::VertexBufferView;
use crate::sync::Fence;

use super::{
    CommandAllocator, CommandList, Closed, RecordError, RenderTargetView, ScissorRect, Viewport,
};

pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.2, 0.4, 1.0];

/// Everything a frame's commands refer to. Built once at setup.
#[derive(Debug, Clone)]
pub struct FrameInputs {
    pub pipeline: PipelineHandle,
    pub viewport: Viewport,
    pub scissor: ScissorRect,
    pub render_targets: Vec<RenderTargetView>,
    pub vertex_buffer: VertexBufferView,
    pub clear_color: [f32; 4],
}

impl FrameInputs {
    pub fn target(&self, frame_index: usize) -> Result<RenderTargetView, RecordError> {
        self.render_targets
            .get(frame_index)
            .copied()
            .ok_or(RecordError::NoRenderTarget(frame_index))
    }
}

/// Re-records `list` for back buffer `frame_index` and closes it.
///
/// Fails without touching `list` if the allocator's previous submission has
/// not completed on `fence`.
pub fn record_frame(
    list: &mut CommandList<Closed>,
    allocator: &mut CommandAllocator,
    fence: &Fence,
    inputs: &FrameInputs,
    frame_index: usize,
) -> Result<(), RecordError> {
    let target = inputs.target(frame_index)?;
    let allocator = allocator.reset(fence)?;
    let mut recording = list.reset(allocator, inputs.pipeline);

    recording.set_graphics_root_signature(inputs.pipeline.root_signature);
    recording.set_viewport(inputs.viewport);
    recording.set_scissor_rect(inputs.scissor);

    recording.render_to(target, |pass| {
        pass.clear(inputs.clear_color);
        pass.set_primitive_topology(PrimitiveTopology::TriangleList);
        pass.set_vertex_buffer(0, inputs.vertex_buffer);
        pass.draw_instanced(inputs.vertex_buffer.vertex_count(), 1, 0, 0);
    });

    *list = recording.close();
    Ok(())
}
