use bitflags::bitflags;

use super::RootSignatureId;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct RootSignatureFlags: u32 {
        /// Pipelines may read vertex data through an input layout.
        const ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT = 0x1;
    }
}

/// Binding layout shared by a pipeline and the command lists that use it.
///
/// The triangle passes no per-draw resources, so the only supported
/// signature has no parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RootSignatureDesc {
    pub flags: RootSignatureFlags,
}

impl RootSignatureDesc {
    pub fn empty() -> Self {
        Self {
            flags: RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        }
    }

    pub fn parameter_count(&self) -> usize {
        0
    }
}

pub struct RootSignature {
    id: RootSignatureId,
    desc: RootSignatureDesc,
    layout: wgpu::PipelineLayout,
}

impl RootSignature {
    pub fn create(device: &wgpu::Device, id: RootSignatureId, desc: RootSignatureDesc) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trine root signature"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        Self { id, desc, layout }
    }

    pub fn id(&self) -> RootSignatureId {
        self.id
    }

    pub fn desc(&self) -> &RootSignatureDesc {
        &self.desc
    }

    pub fn layout(&self) -> &wgpu::PipelineLayout {
        &self.layout
    }
}
