//! reveil-helper - privileged wake-schedule helper.
//!
//! Usage:
//!   reveil-helper            Run one reconciliation pass (what the trigger
//!                            mechanism invokes; takes no arguments)
//!   reveil-helper status     Print the helper state and facility listing
//!
//! The helper is fire-and-forget: nothing consumes its exit code, so every
//! failure is reported through the log file and the process exits zero.

use clap::{Parser, Subcommand};
use reveil::{HelperConfig, PmsetFacility, WakeFacility, WakeReconciler};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// reveil-helper - keeps one pmset wake request in sync with the next alarm
#[derive(Parser)]
#[command(name = "reveil-helper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Shared directory override (defaults to the configured directory)
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass (the default when no command is given)
    Run,

    /// Print the helper state document and the facility's current listing
    Status,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match HelperConfig::load() {
        Ok(config) => config,
        Err(e) => {
            // A broken config file must not stop the helper: fall back to
            // defaults so the alarm still rings.
            warn!("Failed to load configuration, using defaults: {}", e);
            HelperConfig::default()
        }
    };
    if let Some(dir) = cli.dir {
        config = config.with_shared_dir(dir);
    }

    match cli.command {
        None | Some(Commands::Run) => run_reconciler(&config).await,
        Some(Commands::Status) => show_status(&config).await,
    }
}

/// Build the pmset adapter from the configuration.
fn facility(config: &HelperConfig) -> PmsetFacility {
    let mut facility = PmsetFacility::new().with_timeout(config.facility_timeout());
    if let Some(path) = &config.pmset_path {
        facility = facility.with_program(path);
    }
    facility
}

/// One reconciliation pass. Never fails; diagnosis is log-based.
async fn run_reconciler(config: &HelperConfig) {
    let reconciler = WakeReconciler::new(config.shared_dir(), facility(config));
    let report = reconciler.run().await;
    info!("Reconciliation finished: {:?}", report.outcome);
}

/// Print the persisted state and the facility listing.
async fn show_status(config: &HelperConfig) {
    let dir = config.shared_dir();
    let state = dir.load_state();

    println!("Shared directory: {}", dir.root().display());
    match state.outstanding() {
        Some((kind, wake)) => println!("Outstanding wake: {} {}", kind, wake),
        None => println!("Outstanding wake: none"),
    }

    match dir.load_schedule() {
        Ok(Some(document)) => {
            println!("Schedule: enabled={}", document.enabled);
            if let Some(next_wake) = &document.next_wake {
                println!("  next wake: {}", next_wake);
            }
            if let Some(label) = &document.label {
                println!("  label: {}", label);
            }
        }
        Ok(None) => println!("Schedule: no document"),
        Err(e) => println!("Schedule: unreadable ({})", e),
    }

    match facility(config).list().await {
        Ok(result) => {
            println!("Facility listing:");
            for line in result.trimmed_output().lines() {
                println!("  {}", line);
            }
        }
        Err(e) => error!("Failed to query facility listing: {}", e),
    }
}
