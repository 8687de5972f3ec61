//! Samples driven by the window runtime.
//!
//! A [`Sample`] receives the window once at startup, then one update and one
//! render per redraw tick, and is torn down exactly once.

mod frame_loop;
mod hello_triangle;

use std::sync::Arc;

use anyhow::Result;
use winit::dpi::PhysicalSize;
use winit::window::Window;

pub use frame_loop::FrameLoop;
pub use hello_triangle::{triangle_vertices, HelloTriangle, SampleConfig};

/// Lifecycle contract implemented by samples.
pub trait Sample {
    /// Creates all GPU objects for `window`. Called once before any frame.
    fn on_init(&mut self, window: Arc<Window>, size: PhysicalSize<u32>) -> Result<()>;

    /// Advances per-frame state. Called before every render.
    fn on_update(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_render(&mut self) -> Result<()>;

    /// Waits for outstanding GPU work and releases everything.
    fn on_destroy(&mut self) -> Result<()>;
}
