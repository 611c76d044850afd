use hwlink_core::{PortOpener, SystemPorts, discover_port};

use super::{Overrides, load_config};

pub fn run(overrides: Overrides<'_>) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let ports = SystemPorts::new();

    let candidates = ports.candidates();
    if candidates.is_empty() {
        println!("No /dev/ttyUSB* or /dev/ttyACM* devices found.");
    }
    for path in &candidates {
        match ports.open(path, config.baud) {
            Ok(_) => println!("  {path:<16} ok"),
            Err(e) => println!("  {path:<16} {e}"),
        }
    }

    println!();
    println!(
        "Auto-discovery would use: {}",
        discover_port(&ports, None, config.baud)
    );
    Ok(())
}
