use anyhow::{ensure, Context, Result};
use winit::dpi::PhysicalSize;

use crate::resource::ResourceId;
use crate::sync::{PresentError, Presenter};

use super::surface::{self, BackBufferRing};
use super::{Gpu, GpuInit, SurfaceErrorAction};

/// One render target the frame loop draws into.
pub struct BackBuffer {
    pub id: ResourceId,
    pub texture: wgpu::Texture,
}

/// Window surface plus the back buffers presented through it.
///
/// Frames render into owned back-buffer textures. Presenting copies the
/// current one into the acquired surface texture and advances the ring.
pub struct SwapChain {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    back_buffers: Vec<BackBuffer>,
    ring: BackBufferRing,
}

impl SwapChain {
    pub fn create(
        gpu: &mut Gpu,
        surface: wgpu::Surface<'static>,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Result<Self> {
        ensure!(init.buffer_count > 0, "swap chain needs at least one back buffer");

        let caps = surface.get_capabilities(gpu.adapter());
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;
        ensure!(
            caps.usages.contains(wgpu::TextureUsages::COPY_DST),
            "surface cannot be a copy destination"
        );

        let alpha_mode = surface::choose_alpha_mode(&caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.buffer_count as u32,
        };

        surface.configure(gpu.device(), &config);

        let back_buffers = (0..init.buffer_count)
            .map(|n| {
                let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
                    label: Some(&format!("trine back buffer {n}")),
                    size: wgpu::Extent3d {
                        width: config.width,
                        height: config.height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::COPY_SRC,
                    view_formats: &[],
                });
                BackBuffer {
                    id: gpu.allocate_resource_id(),
                    texture,
                }
            })
            .collect();

        log::debug!(
            "swap chain: {} x {}x{} {:?}",
            init.buffer_count,
            config.width,
            config.height,
            format
        );

        Ok(Self {
            surface,
            device: gpu.device().clone(),
            queue: gpu.queue().clone(),
            config,
            back_buffers,
            ring: BackBufferRing::new(init.buffer_count),
        })
    }

    /// Returns the back-buffer format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn back_buffers(&self) -> &[BackBuffer] {
        &self.back_buffers
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.config.width,
            height: self.config.height,
            depth_or_array_layers: 1,
        }
    }
}

impl Presenter for SwapChain {
    fn buffer_count(&self) -> usize {
        self.ring.count()
    }

    fn current_back_buffer_index(&self) -> usize {
        self.ring.current()
    }

    fn present(&mut self, sync_interval: u32) -> Result<(), PresentError> {
        let mode = surface::present_mode_for(sync_interval);
        if mode != self.config.present_mode {
            self.config.present_mode = mode;
            self.surface.configure(&self.device, &self.config);
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => match surface::map_surface_error(&err) {
                SurfaceErrorAction::Fatal => return Err(err.into()),
                action => {
                    if action == SurfaceErrorAction::Reconfigured {
                        self.surface.configure(&self.device, &self.config);
                    }
                    log::warn!("skipping present: {err}");
                    self.ring.advance();
                    return Ok(());
                }
            },
        };

        let back_buffer = &self.back_buffers[self.ring.current()];
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trine present encoder"),
            });
        encoder.copy_texture_to_texture(
            back_buffer.texture.as_image_copy(),
            frame.texture.as_image_copy(),
            self.extent(),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        frame.present();
        self.ring.advance();
        Ok(())
    }
}
