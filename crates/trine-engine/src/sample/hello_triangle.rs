use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::command::{FrameInputs, ScissorRect, Viewport, CLEAR_COLOR};
use crate::device::{self, Gpu, GpuInit, SwapChain, WgpuQueue};
use crate::pipeline::{
    GraphicsPipelineDesc, PipelineState, RootSignature, RootSignatureDesc, Vertex,
};
use crate::shader::{CompileFlags, CompileRequest, CompiledShader, NagaBackend, ShaderCompiler};
use crate::sync::FrameSynchronizer;

use super::{FrameLoop, Sample};

/// HelloTriangle configuration.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// WGSL source holding both entry points.
    pub shader_path: PathBuf,
    pub vertex_entry: String,
    pub pixel_entry: String,
    /// Legacy profiles; upgraded to shader model 6 by the compiler.
    pub vertex_profile: String,
    pub pixel_profile: String,
    pub compile_flags: CompileFlags,
    pub clear_color: [f32; 4],
    pub gpu: GpuInit,
}

impl Default for SampleConfig {
    fn default() -> Self {
        let compile_flags = if cfg!(debug_assertions) {
            CompileFlags::DEBUG | CompileFlags::SKIP_OPTIMIZATION
        } else {
            CompileFlags::empty()
        };

        Self {
            shader_path: PathBuf::from("shaders.wgsl"),
            vertex_entry: "vs_main".to_string(),
            pixel_entry: "fs_main".to_string(),
            vertex_profile: "vs_5_0".to_string(),
            pixel_profile: "ps_5_0".to_string(),
            compile_flags,
            clear_color: CLEAR_COLOR,
            gpu: GpuInit::default(),
        }
    }
}

/// The triangle's three corners, scaled vertically by `aspect` (width / height).
pub fn triangle_vertices(aspect: f32) -> [Vertex; 3] {
    [
        Vertex {
            position: [0.0, 0.25 * aspect, 0.0],
            color: [1.0, 0.0, 0.0, 1.0],
        },
        Vertex {
            position: [0.25, -0.25 * aspect, 0.0],
            color: [0.0, 1.0, 0.0, 1.0],
        },
        Vertex {
            position: [-0.25, -0.25 * aspect, 0.0],
            color: [0.0, 0.0, 1.0, 1.0],
        },
    ]
}

/// Field order is drop order: the frame loop releases its queue and swap
/// chain before the device goes away.
struct Loaded {
    frames: FrameLoop<WgpuQueue, SwapChain>,
    _root_signature: RootSignature,
    gpu: Gpu,
}

/// Clears the back buffer and draws one vertex-colored triangle per frame.
pub struct HelloTriangle {
    config: SampleConfig,
    loaded: Option<Loaded>,
}

impl HelloTriangle {
    pub fn new(config: SampleConfig) -> Self {
        Self {
            config,
            loaded: None,
        }
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    pub fn gpu(&self) -> Option<&Gpu> {
        self.loaded.as_ref().map(|l| &l.gpu)
    }

    fn compile_shaders(&self) -> Result<(CompiledShader, CompiledShader)> {
        let compiler = ShaderCompiler::new(NagaBackend::new());
        let config = &self.config;

        let vertex = compiler
            .compile(&CompileRequest::new(
                config.shader_path.clone(),
                config.vertex_entry.as_str(),
                config.vertex_profile.as_str(),
                config.compile_flags,
            ))
            .with_context(|| format!("failed to compile {}", config.vertex_entry))?;

        let pixel = compiler
            .compile(&CompileRequest::new(
                config.shader_path.clone(),
                config.pixel_entry.as_str(),
                config.pixel_profile.as_str(),
                config.compile_flags,
            ))
            .with_context(|| format!("failed to compile {}", config.pixel_entry))?;

        Ok((vertex, pixel))
    }
}

impl Sample for HelloTriangle {
    fn on_init(&mut self, window: Arc<Window>, size: PhysicalSize<u32>) -> Result<()> {
        let device::DeviceContext {
            mut gpu,
            mut queue,
            swap_chain,
            render_targets,
        } = device::initialize(window, size, &self.config.gpu)?;

        let (vertex, pixel) = self.compile_shaders()?;

        let root_signature_id = gpu.allocate_root_signature_id();
        let root_signature =
            RootSignature::create(gpu.device(), root_signature_id, RootSignatureDesc::empty());

        let pipeline_id = gpu.allocate_pipeline_id();
        let pipeline = PipelineState::create(
            gpu.device(),
            pipeline_id,
            &root_signature,
            &vertex,
            &pixel,
            GraphicsPipelineDesc::triangle(swap_chain.format()),
        )
        .context("failed to create pipeline state")?;
        let pipeline = queue.register_pipeline(pipeline);

        let aspect = size.width as f32 / size.height as f32;
        let vertex_buffer = queue
            .upload_vertices(&triangle_vertices(aspect))
            .context("failed to upload triangle")?;

        let inputs = FrameInputs {
            pipeline,
            viewport: Viewport::full(size.width, size.height),
            scissor: ScissorRect::full(size.width, size.height),
            render_targets,
            vertex_buffer,
            clear_color: self.config.clear_color,
        };

        let sync = FrameSynchronizer::new(queue, swap_chain);
        let frames = FrameLoop::new(sync, inputs).context("failed to finish GPU setup")?;

        self.loaded = Some(Loaded {
            frames,
            _root_signature: root_signature,
            gpu,
        });
        Ok(())
    }

    fn on_render(&mut self) -> Result<()> {
        let Some(loaded) = self.loaded.as_mut() else {
            return Ok(());
        };
        loaded.frames.render().context("failed to render frame")
    }

    fn on_destroy(&mut self) -> Result<()> {
        let Some(mut loaded) = self.loaded.take() else {
            return Ok(());
        };
        loaded
            .frames
            .drain()
            .context("failed to wait for GPU before shutdown")?;
        log::info!("rendered {} frames", loaded.frames.frames());
        Ok(())
    }
}
