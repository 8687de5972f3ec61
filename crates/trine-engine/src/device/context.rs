use anyhow::{Context, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::command::RenderTargetView;
use crate::pipeline::{CpuDescriptorHandle, DescriptorHeap, RTV_DESCRIPTOR_STRIDE};
use crate::resource::ResourceState;

use super::{Gpu, GpuInit, RenderTargetDescriptor, SwapChain, WgpuQueue};

/// First handle of the render-target descriptor heap.
pub const RTV_HEAP_START: CpuDescriptorHandle = CpuDescriptorHandle(0x1000);

/// Everything the frame loop runs on, created in one step.
pub struct DeviceContext {
    pub gpu: Gpu,
    pub queue: WgpuQueue,
    pub swap_chain: SwapChain,
    /// One view per back buffer, in swap-chain order.
    pub render_targets: Vec<RenderTargetView>,
}

/// Creates the device, the swap chain and a render-target view per back buffer.
pub fn initialize<W>(window: W, size: PhysicalSize<u32>, init: &GpuInit) -> Result<DeviceContext>
where
    W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
{
    let (mut gpu, surface) = pollster::block_on(Gpu::initialize(window, size, init))?;
    let swap_chain = SwapChain::create(&mut gpu, surface, size, init)
        .context("failed to create swap chain")?;

    let mut heap = DescriptorHeap::new(
        RTV_HEAP_START,
        swap_chain.back_buffers().len(),
        RTV_DESCRIPTOR_STRIDE,
    );
    let mut render_targets = Vec::with_capacity(heap.capacity());

    for (n, back_buffer) in swap_chain.back_buffers().iter().enumerate() {
        let rtv = heap
            .handle(n)
            .with_context(|| format!("no descriptor slot for back buffer {n}"))?;
        let view = back_buffer
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        heap.write(
            rtv,
            RenderTargetDescriptor {
                resource: back_buffer.id,
                view,
            },
        )?;
        render_targets.push(RenderTargetView {
            resource: back_buffer.id,
            rtv,
        });
    }

    let mut queue = WgpuQueue::new(gpu.device().clone(), gpu.queue().clone(), heap);
    for target in &render_targets {
        queue.track(target.resource, ResourceState::Present);
    }

    Ok(DeviceContext {
        gpu,
        queue,
        swap_chain,
        render_targets,
    })
}
