use super::SurfaceErrorAction;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Present mode for a vertical-blank interval. 0 presents immediately.
pub(crate) fn present_mode_for(sync_interval: u32) -> wgpu::PresentMode {
    if sync_interval == 0 {
        wgpu::PresentMode::AutoNoVsync
    } else {
        wgpu::PresentMode::Fifo
    }
}

/// What to do about a failed surface acquisition.
pub(crate) fn map_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

/// Index of the back buffer being rendered, cycling through `count` buffers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BackBufferRing {
    count: usize,
    current: usize,
}

impl BackBufferRing {
    /// A ring always has at least one buffer.
    pub fn new(count: usize) -> Self {
        Self {
            count: count.max(1),
            current: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Moves to the next buffer, wrapping after the last.
    pub fn advance(&mut self) -> usize {
        self.current = (self.current + 1) % self.count;
        self.current
    }
}
