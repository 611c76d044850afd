use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use hwlink_core::{Sampler, ShutdownAwareSleeper, SystemPorts, Transport};
use log::info;

use super::{Overrides, load_config};

pub fn run(overrides: Overrides<'_>) -> anyhow::Result<()> {
    let config = load_config(overrides)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;

    info!(
        "hwlink {} streaming every {} ms (Ctrl+C to stop)",
        hwlink_core::VERSION,
        config.interval_ms
    );

    let mut transport = Transport::new(
        Box::new(SystemPorts::new()),
        Sampler::system(&config),
        config,
        Box::new(ShutdownAwareSleeper::new(shutdown.clone())),
    );
    transport.run(&shutdown);
    Ok(())
}
