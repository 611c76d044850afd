use hwlink_core::SourceSet;

use super::{Overrides, load_config};

pub fn run(overrides: Overrides<'_>) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let sources = SourceSet::system(&config);

    println!("CPU temperature (in fallback order):");
    let mut chosen = false;
    for src in &sources.temperature {
        let reading = src.read();
        let kind = src.kind().to_string();
        let verdict = match reading.accepted() {
            Some(_) if !chosen => {
                chosen = true;
                "used"
            }
            Some(_) => "standby",
            None => "rejected",
        };
        match reading.value {
            Some(v) => println!("  {kind:<14} {v:>6.1} °C  {verdict}"),
            None => println!("  {kind:<14} {:>9}  {verdict}", "n/a"),
        }
    }
    if !chosen {
        println!("  no usable source; frames will report 0");
    }

    println!();
    println!("CPU frequency:");
    for core in 0..hwlink_core::snapshot::FREQ_SLOTS {
        if let Some(ghz) = sources.frequency.read_core_ghz(core).value {
            println!("  cpu{core:<2} {ghz:.2} GHz");
        }
    }

    println!();
    match sources.counters.read_counters() {
        Some(counters) => println!("CPU counters: {} entries", counters.len()),
        None => println!("CPU counters: unavailable"),
    }

    println!();
    match sources.gpu.read_gpu() {
        Some(gpu) => {
            println!("GPU:");
            println!("  Temperature:  {:.0} °C", gpu.temp_c);
            println!("  Load:         {:.0} %", gpu.load_pct);
            println!("  Memory util:  {:.0} %", gpu.mem_util_pct);
            println!("  VRAM:         {:.0} / {:.0} MiB", gpu.vram_used_mib, gpu.vram_total_mib);
            println!("  Clocks:       {} / {} MHz", gpu.core_clock_mhz, gpu.mem_clock_mhz);
        }
        None => println!("GPU: nvidia-smi unavailable"),
    }
    Ok(())
}
