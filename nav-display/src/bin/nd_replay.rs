//! Replay recorded bus traffic through the PFD and ND symbology.
//!
//! Reads a JSON scenario and prints one JSON object per tick with the render
//! snapshot of each display. Diagnostics go to stderr (`RUST_LOG`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nav_display::{
    ChannelBus, ConfigStorage, EfisSide, LandingSystemDisplay, NavigationDisplay, Scenario,
    SymbologyConfig,
};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DisplaySelection {
    Pfd,
    Nd,
    Both,
}

/// Deviation and guidance symbology replay tool
#[derive(Parser, Debug)]
#[command(name = "nd_replay")]
#[command(about = "Replay a bus scenario through the PFD/ND symbology")]
#[command(version)]
struct Args {
    /// Scenario JSON file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Config JSON file (defaults to the stored config in ~/.nd_config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// PFD display index (1 or 2), overrides the config
    #[arg(long)]
    display_index: Option<u8>,

    /// EFIS side (L or R), overrides the config
    #[arg(long)]
    side: Option<EfisSide>,

    /// Which displays to evaluate
    #[arg(long, value_enum, default_value = "both")]
    display: DisplaySelection,

    /// Pretty-print each snapshot
    #[arg(long)]
    pretty: bool,
}

fn load_config(args: &Args) -> Result<SymbologyConfig> {
    let mut config = match &args.config {
        Some(path) => SymbologyConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConfigStorage::default().load_or_default(),
    };

    if let Some(index) = args.display_index {
        config.display_index = index;
    }
    if let Some(side) = args.side {
        config.side = side;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;

    info!(
        ticks = scenario.ticks.len(),
        display_index = config.display_index,
        side = %config.side,
        "Replaying scenario"
    );

    let mut pfd = LandingSystemDisplay::new(&config)?;
    let mut nd = NavigationDisplay::new(&config)?;
    let show_pfd = args.display != DisplaySelection::Nd;
    let show_nd = args.display != DisplaySelection::Pfd;

    let mut outputs = Vec::with_capacity(scenario.ticks.len());
    let mut bus = ChannelBus::new();
    scenario.replay(&mut bus, |index, frame| {
        let mut tick = json!({ "tick": index, "dt": frame.dt_s });
        if show_pfd {
            tick["pfd"] = json!(pfd.update(frame));
        }
        if show_nd {
            tick["nd"] = json!(nd.update(frame));
        }
        outputs.push(tick);
    });

    for tick in &outputs {
        let line = if args.pretty {
            serde_json::to_string_pretty(tick)?
        } else {
            serde_json::to_string(tick)?
        };
        println!("{line}");
    }

    info!("Replay complete");
    Ok(())
}
