//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "overlayd", version, about = "Auto-formatting overlay host")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "FILTER",
        help = "Log filter directive (overrides RUST_LOG, default info)"
    )]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the auto-fixed content of a file
    Read { path: PathBuf },
    /// Verify content and commit it to a file when clean
    Write {
        path: PathBuf,
        #[arg(long, value_name = "FILE", help = "Read content from FILE instead of stdin")]
        input: Option<PathBuf>,
    },
    /// Verify a file in place without writing
    Check { path: PathBuf },
    /// Print the fixed configuration as JSON
    Config,
    /// Run a scripted editor session
    Session {
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
    },
}
