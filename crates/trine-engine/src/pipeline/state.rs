use std::borrow::Cow;

use anyhow::{ensure, Result};

use crate::shader::CompiledShader;

use super::{PipelineHandle, PipelineId, RootSignature, Vertex};

/// Input-assembler primitive interpretation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl PrimitiveTopology {
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::PointList => wgpu::PrimitiveTopology::PointList,
            Self::LineList => wgpu::PrimitiveTopology::LineList,
            Self::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Self::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Self::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// Fixed-function configuration baked into a pipeline state object.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsPipelineDesc {
    pub topology: PrimitiveTopology,
    pub render_target_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub depth_stencil: Option<wgpu::DepthStencilState>,
    pub sample_count: u32,
    pub sample_mask: u64,
}

impl GraphicsPipelineDesc {
    /// Default rasterizer and blend state, no depth/stencil, one render target.
    pub fn triangle(render_target_format: wgpu::TextureFormat) -> Self {
        Self {
            topology: PrimitiveTopology::TriangleList,
            render_target_format,
            blend: Some(wgpu::BlendState::REPLACE),
            depth_stencil: None,
            sample_count: 1,
            sample_mask: !0,
        }
    }
}

/// Immutable compiled pipeline: root signature, both stages and fixed-function state.
pub struct PipelineState {
    handle: PipelineHandle,
    desc: GraphicsPipelineDesc,
    raw: wgpu::RenderPipeline,
}

impl PipelineState {
    pub fn create(
        device: &wgpu::Device,
        id: PipelineId,
        root_signature: &RootSignature,
        vertex: &CompiledShader,
        pixel: &CompiledShader,
        desc: GraphicsPipelineDesc,
    ) -> Result<Self> {
        ensure!(
            vertex.stage == naga::ShaderStage::Vertex,
            "{} is not a vertex shader",
            vertex.label
        );
        ensure!(
            pixel.stage == naga::ShaderStage::Fragment,
            "{} is not a pixel shader",
            pixel.label
        );

        let vs_module = shader_module(device, vertex);
        let ps_module = shader_module(device, pixel);

        let raw = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("trine pipeline state"),
            layout: Some(root_signature.layout()),

            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(vertex.entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &ps_module,
                entry_point: Some(pixel.entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.render_target_format,
                    blend: desc.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: desc.topology.to_wgpu(),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: desc.depth_stencil.clone(),
            multisample: wgpu::MultisampleState {
                count: desc.sample_count,
                mask: desc.sample_mask,
                alpha_to_coverage_enabled: false,
            },

            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            handle: PipelineHandle {
                pipeline: id,
                root_signature: root_signature.id(),
            },
            desc,
            raw,
        })
    }

    pub fn handle(&self) -> PipelineHandle {
        self.handle
    }

    pub fn desc(&self) -> &GraphicsPipelineDesc {
        &self.desc
    }

    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.raw
    }
}

fn shader_module(device: &wgpu::Device, shader: &CompiledShader) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(shader.label.as_str()),
        source: wgpu::ShaderSource::Naga(Cow::Owned(shader.module.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_desc_matches_fixed_function_defaults() {
        let desc = GraphicsPipelineDesc::triangle(wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(desc.topology, PrimitiveTopology::TriangleList);
        assert!(desc.depth_stencil.is_none());
        assert_eq!(desc.sample_count, 1);
        assert_eq!(desc.sample_mask, u64::MAX);
        assert_eq!(desc.blend, Some(wgpu::BlendState::REPLACE));
    }
}
