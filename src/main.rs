//! oob-readdress - guided, resumable re-addressing of server BMCs.
//!
//! Reads a CSV table of management controllers (current address plus new
//! static address, netmask and gateway) and walks the operator through
//! applying each one with `ipmitool`. Progress is saved after every step
//! so a run can be interrupted and resumed.

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::io;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::Session;
use cli::Cli;
use domain::AppError;
use infrastructure::{
    executable_dir, load_config, load_devices, AuditLog, IpmiInvoker, ProgressStore,
};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let AppError::InputNotFound { file, dir } = &e {
            eprintln!("Please check:");
            eprintln!("  1. that {file} is in directory {}", dir.display());
            eprintln!("  2. that the file name is spelled correctly");
        }
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: &Cli) -> domain::Result<()> {
    let base_dir = executable_dir()?;
    let config = load_config(cli.config.as_deref(), &base_dir)?;
    tracing::debug!(?config, "Configuration loaded");

    let audit = AuditLog::new(&config.paths.log);
    if let Err(e) = audit.start_session() {
        tracing::warn!("Could not write session marker: {}", e);
    }

    let devices = load_devices(&config.paths.input)?;
    let store = ProgressStore::new(&config.paths.state);
    let invoker = IpmiInvoker::new(config.credentials, config.tool, audit);

    let mut session = Session::new(&devices, &store, &invoker);
    let end = session.run(io::stdin().lock(), io::stdout().lock())?;

    tracing::info!(?end, cursor = session.cursor(), "Session finished");
    Ok(())
}

/// Setup tracing/logging based on verbosity level.
///
/// Logs go to stderr so they never interleave with the prompts.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}
