//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the sample's single window.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
