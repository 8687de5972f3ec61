use anyhow::{bail, Context, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::pipeline::{PipelineId, RootSignatureId};
use crate::resource::ResourceId;

use super::GpuInit;

/// What the selected adapter is and what it can do.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Capability {
    pub backend: wgpu::Backend,
    pub adapter_name: String,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension_2d: u32,
}

impl Capability {
    pub fn new(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            backend: info.backend,
            adapter_name: info.name.clone(),
            device_type: info.device_type,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
        }
    }

    pub fn is_software(&self) -> bool {
        self.device_type == wgpu::DeviceType::Cpu
    }

    /// Rejects adapters that cannot back a `size` swap chain, and software
    /// adapters unless one was asked for.
    pub fn check(&self, size: PhysicalSize<u32>, software_requested: bool) -> Result<()> {
        if self.is_software() && !software_requested {
            bail!(
                "adapter \"{}\" is a software rasterizer; request the software fallback to use it",
                self.adapter_name
            );
        }

        let max = self.max_texture_dimension_2d;
        if max == 0 || size.width > max || size.height > max {
            bail!(
                "adapter \"{}\" supports textures up to {max}px, need {}x{}",
                self.adapter_name,
                size.width,
                size.height
            );
        }

        Ok(())
    }
}

/// Owns wgpu core objects.
///
/// - creates and stores Instance/Adapter/Device/Queue
/// - hands out ids for the objects command lists refer to
pub struct Gpu {
    /// wgpu instance used to create the adapter and surface.
    instance: wgpu::Instance,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Direct command queue.
    queue: wgpu::Queue,

    capability: Capability,

    next_id: u32,
}

impl Gpu {
    /// Creates the device and the surface for `window`.
    ///
    /// The surface owns `window`, typically an `Arc<winit::window::Window>`.
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn initialize<W>(
        window: W,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Result<(Self, wgpu::Surface<'static>)>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            flags: init.instance_flags,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: init.use_software_fallback,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let capability = Capability::new(&adapter.get_info(), &adapter.limits());
        capability.check(size, init.use_software_fallback)?;

        log::info!(
            "adapter: {} ({:?}, {:?})",
            capability.adapter_name,
            capability.backend,
            capability.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("trine-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok((
            Self {
                instance,
                adapter,
                device,
                queue,
                capability,
                next_id: 0,
            },
            surface,
        ))
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn allocate_resource_id(&mut self) -> ResourceId {
        ResourceId(self.next_id())
    }

    pub fn allocate_root_signature_id(&mut self) -> RootSignatureId {
        RootSignatureId(self.next_id())
    }

    pub fn allocate_pipeline_id(&mut self) -> PipelineId {
        PipelineId(self.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capability(device_type: wgpu::DeviceType) -> Capability {
        Capability {
            backend: wgpu::Backend::Vulkan,
            adapter_name: "test adapter".into(),
            device_type,
            max_texture_dimension_2d: 8192,
        }
    }

    #[test]
    fn hardware_adapter_passes() {
        let cap = capability(wgpu::DeviceType::DiscreteGpu);
        assert!(cap.check(PhysicalSize::new(1280, 720), false).is_ok());
    }

    #[test]
    fn software_adapter_needs_fallback_request() {
        let cap = capability(wgpu::DeviceType::Cpu);
        assert!(cap.is_software());
        assert!(cap.check(PhysicalSize::new(1280, 720), false).is_err());
        assert!(cap.check(PhysicalSize::new(1280, 720), true).is_ok());
    }

    #[test]
    fn oversized_swap_chain_is_rejected() {
        let cap = capability(wgpu::DeviceType::IntegratedGpu);
        let err = cap.check(PhysicalSize::new(16384, 720), false).unwrap_err();
        assert!(err.to_string().contains("8192"));
    }
}
