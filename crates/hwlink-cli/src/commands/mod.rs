pub mod ports;
pub mod probe;
pub mod run;
pub mod sample;

use std::path::Path;

use anyhow::Context;
use hwlink_core::LinkConfig;
use log::LevelFilter;

/// Command-line values layered over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides<'a> {
    pub config: Option<&'a Path>,
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub interval_ms: Option<u64>,
}

/// Defaults → `--config` file → flags, then validate.
pub fn load_config(overrides: Overrides<'_>) -> anyhow::Result<LinkConfig> {
    let mut config = match overrides.config {
        Some(path) => LinkConfig::load(path)?,
        None => LinkConfig::default(),
    };
    if overrides.port.is_some() {
        config.port = overrides.port;
    }
    if let Some(baud) = overrides.baud {
        config.baud = baud;
    }
    if let Some(ms) = overrides.interval_ms {
        config.interval_ms = ms;
    }
    config.validate().context("rejected configuration")?;
    Ok(config)
}

/// `info` by default, `-v` debug, `-vv` trace. A set `RUST_LOG` wins.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp_millis();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}
