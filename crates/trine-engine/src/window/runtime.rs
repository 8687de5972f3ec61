use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::sample::Sample;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "trine".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one fixed-size window and drives `sample` until it closes.
    ///
    /// Sample errors are logged and end the loop; `on_destroy` runs once
    /// either way.
    pub fn run<S>(config: RuntimeConfig, sample: S) -> Result<()>
    where
        S: Sample + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, sample);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.destroy();
        state.failure.map_or(Ok(()), Err)
    }
}

struct AppState<S>
where
    S: Sample + 'static,
{
    config: RuntimeConfig,
    sample: S,

    window: Option<Arc<Window>>,
    destroyed: bool,
    failure: Option<anyhow::Error>,
}

impl<S> AppState<S>
where
    S: Sample + 'static,
{
    fn new(config: RuntimeConfig, sample: S) -> Self {
        Self {
            config,
            sample,
            window: None,
            destroyed: false,
            failure: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(false);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        self.sample
            .on_init(Arc::clone(&window), size)
            .context("sample initialization failed")?;

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn frame(&mut self) -> Result<()> {
        self.sample.on_update()?;
        self.sample.on_render()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.destroy();
        event_loop.exit();
    }

    /// Tears the sample down before the window goes away.
    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        if let Err(e) = self.sample.on_destroy() {
            log::error!("{e:#}");
            self.failure.get_or_insert(e);
        }
        self.window = None;
    }
}

impl<S> ApplicationHandler for AppState<S>
where
    S: Sample + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.destroyed {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = &self.window else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.destroy();
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }
}
