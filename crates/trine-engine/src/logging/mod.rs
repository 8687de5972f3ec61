//! Logging utilities.
//!
//! This module centralizes logger initialization. It sits on the standard
//! `log` facade with `env_logger` as the backend.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
