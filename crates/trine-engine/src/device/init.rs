/// Initialization parameters for the GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Request the software rasterizer instead of a hardware adapter.
    pub use_software_fallback: bool,

    /// Number of back buffers in the swap chain.
    pub buffer_count: usize,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode used until a present asks for a different sync interval.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Backends the instance may pick an adapter from.
    pub backends: wgpu::Backends,

    /// Validation and debug labels. Enabled in debug builds by default.
    pub instance_flags: wgpu::InstanceFlags,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            use_software_fallback: false,
            buffer_count: 2,
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            backends: wgpu::Backends::all(),
            instance_flags: wgpu::InstanceFlags::from_build_config(),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
        }
    }
}
