//! Create command implementation.

use std::path::Path;
use tracing::info;
use xidlog_core::{file, Config};

/// Runs the create command.
pub fn run(path: &Path, parents: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new().create_dirs(parents);
    let tm = file::create(path, &config)?;
    tm.close()?;

    let path = file::resolve_path(path);
    info!("Created ledger {:?}", path);
    println!("Created {}", path.display());
    Ok(())
}
