mod app;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use tessel_engine::asset::load_image;
use tessel_engine::device::GpuInit;
use tessel_engine::logging::{init_logging, LoggingConfig};
use tessel_engine::window::{Runtime, RuntimeConfig, WindowIcon};

use app::{QuadDemo, ICON_PNG};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let icon = load_image(ICON_PNG, Some(4)).context("decoding embedded icon")?;

    let config = RuntimeConfig {
        title: "tessel".to_string(),
        initial_size: LogicalSize::new(1024.0, 1024.0),
        resizable: true,
        icon: Some(WindowIcon::from_image(&icon)?),
    };

    Runtime::run(config, GpuInit::default(), QuadDemo::new(assets_root()))
}

/// Directory holding `assets/`: next to the executable when shipped, else the crate dir.
fn assets_root() -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .filter(|dir| dir.join("assets").is_dir());

    beside_exe.unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}
