//! xidlog CLI
//!
//! Command-line tools for transaction ledger files.
//!
//! # Commands
//!
//! - `create` - Create an empty ledger
//! - `inspect` - Display counter and per-status counts
//! - `verify` - Verify ledger integrity
//! - `status` - Show one transaction's status
//! - `begin` / `commit` / `abort` - Single lifecycle operations

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// xidlog command-line ledger tools.
#[derive(Parser)]
#[command(name = "xidlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the ledger file (the .xid suffix is optional)
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty ledger
    Create {
        /// Create missing parent directories
        #[arg(long)]
        parents: bool,
    },

    /// Display ledger statistics
    Inspect {
        /// List the status of every transaction
        #[arg(short, long)]
        list: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify ledger integrity
    Verify,

    /// Show the status of one transaction
    Status {
        /// Transaction ID
        xid: u64,
    },

    /// Begin a transaction and print its ID
    Begin,

    /// Commit a transaction
    Commit {
        /// Transaction ID
        xid: u64,
    },

    /// Abort a transaction
    Abort {
        /// Transaction ID
        xid: u64,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Create { parents } => {
            let path = cli.path.ok_or("Ledger path required for create")?;
            commands::create::run(&path, parents)?;
        }
        Commands::Inspect { list, format } => {
            let path = cli.path.ok_or("Ledger path required for inspect")?;
            commands::inspect::run(&path, list, &format)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Ledger path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Status { xid } => {
            let path = cli.path.ok_or("Ledger path required for status")?;
            commands::lifecycle::status(&path, xid)?;
        }
        Commands::Begin => {
            let path = cli.path.ok_or("Ledger path required for begin")?;
            commands::lifecycle::begin(&path);
        }
        Commands::Commit { xid } => {
            let path = cli.path.ok_or("Ledger path required for commit")?;
            commands::lifecycle::commit(&path, xid);
        }
        Commands::Abort { xid } => {
            let path = cli.path.ok_or("Ledger path required for abort")?;
            commands::lifecycle::abort(&path, xid);
        }
        Commands::Version => {
            println!("xidlog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("xidlog Core v{}", xidlog_core::VERSION);
        }
    }

    Ok(())
}
