use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use hwlink_core::{Sampler, ShutdownAwareSleeper, Sleeper, encode};

use super::{Overrides, load_config};

/// Print `count` frames (or JSON snapshots), one per line.
pub fn run(overrides: Overrides<'_>, count: usize, json: bool) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let mut sampler = Sampler::system(&config);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;
    let mut sleeper = ShutdownAwareSleeper::new(shutdown.clone());

    for i in 0..count {
        if i > 0 {
            sleeper.sleep(config.interval());
        }
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let snap = sampler.sample();
        if json {
            println!("{}", serde_json::to_string(&snap)?);
        } else {
            println!("{}", String::from_utf8_lossy(&encode(&snap)));
            eprintln!("  {}", snap.summary());
        }
    }
    Ok(())
}
