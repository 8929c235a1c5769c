//! Event ledger replay binary.
//!
//! # Usage
//!
//! ```bash
//! # Replay a recorded session and print the final ledger
//! nrfble-replay --script session.json
//!
//! # Check ledger invariants after every action
//! nrfble-replay --script session.json --check-invariants
//!
//! # Print only the events still awaiting resolution
//! nrfble-replay --script session.json --status INDETERMINATE
//! ```

use std::path::PathBuf;

use clap::Parser;
use nrfble_events::{EventStatus, LedgerConfig, MAX_DATA_LENGTH};
use nrfble_replay::{ReplayConfig, ReplayError, load_script, replay};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// BLE event ledger replay
#[derive(Parser, Debug)]
#[command(name = "nrfble-replay")]
#[command(about = "Replay recorded BLE driver and UI actions through the event ledger")]
#[command(version)]
struct Args {
    /// Path to the action script (JSON array of actions)
    #[arg(short, long)]
    script: PathBuf,

    /// Data length proposed by user-initiated data length updates
    #[arg(long, default_value_t = MAX_DATA_LENGTH)]
    default_data_length: u16,

    /// Check ledger invariants after every action
    #[arg(long)]
    check_invariants: bool,

    /// Print only final events with this status (e.g. INDETERMINATE)
    #[arg(long)]
    status: Option<EventStatus>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[allow(clippy::print_stdout)]
fn main() -> Result<(), ReplayError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Replaying {}", args.script.display());

    let actions = load_script(&args.script)?;
    let config = ReplayConfig {
        ledger: LedgerConfig { default_data_length: args.default_data_length },
        check_invariants: args.check_invariants,
    };
    let report = replay(actions, &config)?;

    let output = match args.status {
        Some(status) => serde_json::to_string_pretty(&report.events_with_status(status))?,
        None => serde_json::to_string_pretty(&report.ledger)?,
    };

    println!("{output}");

    Ok(())
}
