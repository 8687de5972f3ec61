//! Trine engine crate.
//!
//! An explicit-API frame lifecycle on top of wgpu: shader compilation through
//! a legacy flag adapter, command lists with resource-state transitions, and
//! fence-synchronized submission, driven by a minimal window runtime.

pub mod command;
pub mod device;
pub mod pipeline;
pub mod resource;
pub mod sample;
pub mod shader;
pub mod sync;
pub mod window;

pub mod logging;
