//! Runs AXI-Lite transactions through the clock-domain-crossing bridge.

mod scenario;

use cdcflow::{Clock, ConfigError, SimError, SyncMode};
use cdcflow_axil::{ports, BridgeConfig};
use clap::{ArgAction, Parser};
use itertools::Itertools;
use thiserror::Error;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::scenario::{Scenario, Setup};

#[derive(Debug, Parser)]
#[command(name = "cdcflow", about = "AXI-Lite clock-domain-crossing bridge demo", long_about = None)]
struct Cli {
    /// Scenario to run
    #[arg(value_enum, default_value = "all")]
    scenario: Scenario,

    /// Synchronization mode: async, meso or iso
    #[arg(short, long, default_value = "async")]
    mode: SyncMode,

    /// Initiator clock period (time units, or microseconds with --threaded)
    #[arg(long, default_value_t = 10)]
    initiator_period: u64,

    /// Target clock period (time units, or microseconds with --threaded)
    #[arg(long, default_value_t = 17)]
    target_period: u64,

    /// Initiator clock phase
    #[arg(long, default_value_t = 0)]
    initiator_phase: u64,

    /// Target clock phase
    #[arg(long, default_value_t = 3)]
    target_phase: u64,

    /// Run each domain on its own thread instead of the deterministic simulator
    #[arg(long)]
    threaded: bool,

    /// Print the bridge's bus ports and exit
    #[arg(long)]
    ports: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("scenario `{scenario}`: {detail}")]
    Check { scenario: &'static str, detail: String },
    #[error("cannot install log subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

fn main() -> Result<(), DemoError> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if cli.ports {
        println!("{}", ports().iter().join("\n"));
        return Ok(());
    }

    let setup = Setup {
        config: BridgeConfig::new(cli.mode),
        initiator: Clock::new(cli.initiator_period, cli.initiator_phase)?,
        target: Clock::new(cli.target_period, cli.target_phase)?,
        threaded: cli.threaded,
    };
    info!(?setup, "starting");

    for scenario in cli.scenario.expand() {
        scenario.run(&setup)?;
    }

    Ok(())
}
