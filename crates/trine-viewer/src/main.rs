use std::path::PathBuf;

use anyhow::Result;
use trine_engine::logging::{init_logging, LoggingConfig};
use trine_engine::sample::{HelloTriangle, SampleConfig};
use trine_engine::window::{Runtime, RuntimeConfig};

/// Set to `1` to render on the software rasterizer.
const SOFTWARE_ENV: &str = "TRINE_SOFTWARE";

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut config = SampleConfig {
        shader_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("shaders/shaders.wgsl"),
        ..SampleConfig::default()
    };
    config.gpu.use_software_fallback = std::env::var(SOFTWARE_ENV).is_ok_and(|v| v == "1");

    if config.gpu.use_software_fallback {
        log::info!("{SOFTWARE_ENV}=1: using the software adapter");
    }

    Runtime::run(
        RuntimeConfig {
            title: "Hello Triangle".to_string(),
            ..RuntimeConfig::default()
        },
        HelloTriangle::new(config),
    )
}
