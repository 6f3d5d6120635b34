//! CLI interface using clap.
//!
//! Running without arguments is the normal mode of operation; the flags
//! only adjust logging and where configuration comes from.

use std::path::PathBuf;

use clap::Parser;

/// Guided, resumable re-addressing of server management controllers.
///
/// Reads the device table beside the executable and walks through it one
/// server at a time: (y)es applies, (n)ext skips, (b)ack, (j)ump, (q)uit.
#[derive(Parser, Debug)]
#[command(name = "oob-readdress")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (defaults to oob-readdress.toml beside the executable).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
