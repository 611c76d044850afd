//! CLI for hwlink — feed a serial hardware-monitor display from this machine.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hwlink")]
#[command(about = "hwlink — stream CPU/GPU telemetry to a serial display")]
#[command(version = hwlink_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream frames to the display until Ctrl+C
    Run {
        /// Serial device (default: auto-discover /dev/ttyUSB*, /dev/ttyACM*)
        #[arg(long)]
        port: Option<String>,

        /// Baud rate
        #[arg(long)]
        baud: Option<u32>,

        /// Delay between frames in milliseconds
        #[arg(long)]
        interval: Option<u64>,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Sample and print frames without a serial link
    Sample {
        /// Print snapshots as JSON lines instead of wire frames
        #[arg(long)]
        json: bool,

        /// Number of samples (the first one has no load deltas)
        #[arg(long, default_value = "2")]
        count: usize,

        /// Delay between samples in milliseconds
        #[arg(long)]
        interval: Option<u64>,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show what each temperature and GPU source reports on this machine
    Probe {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List serial port candidates and whether each one opens
    Ports {
        /// Baud rate used for the open test
        #[arg(long)]
        baud: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            port,
            baud,
            interval,
            config,
        } => commands::run::run(commands::Overrides {
            config: config.as_deref(),
            port,
            baud,
            interval_ms: interval,
        }),
        Commands::Sample {
            json,
            count,
            interval,
            config,
        } => commands::sample::run(
            commands::Overrides {
                config: config.as_deref(),
                interval_ms: interval,
                ..Default::default()
            },
            count,
            json,
        ),
        Commands::Probe { config } => commands::probe::run(commands::Overrides {
            config: config.as_deref(),
            ..Default::default()
        }),
        Commands::Ports { baud } => commands::ports::run(commands::Overrides {
            baud,
            ..Default::default()
        }),
    }
}
