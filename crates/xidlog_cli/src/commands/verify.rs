//! Verify command implementation.

use std::path::Path;
use tracing::info;
use xidlog_core::{file, CoreResult, LedgerStats};

/// Checks a ledger: the header must match the file length and every
/// status byte must be a known code.
pub fn verify(path: &Path) -> CoreResult<LedgerStats> {
    let tm = file::open(path, &super::read_only())?;
    let stats = tm.scan()?;
    tm.close()?;
    Ok(stats)
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let path = file::resolve_path(path);
    info!("Verifying ledger {:?}", path);
    println!("Verifying ledger at {}", path.display());
    println!();

    match verify(&path) {
        Ok(stats) if stats.is_clean() => {
            println!("Transactions: {}", stats.counter);
            println!("✓ Ledger verification passed");
            Ok(())
        }
        Ok(stats) => {
            println!("Transactions: {}", stats.counter);
            println!("Invalid status bytes: {}", stats.invalid);
            println!("✗ Ledger verification failed");
            Err("Verification failed".into())
        }
        Err(err) => {
            println!("Error: {err} ({})", err.kind());
            println!("✗ Ledger verification failed");
            Err("Verification failed".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use xidlog_core::{Config, FatalKind};

    #[test]
    fn clean_ledger_passes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tm.xid");
        let tm = file::create(&path, &Config::default()).unwrap();
        tm.begin().unwrap();
        tm.close().unwrap();

        let stats = verify(&path).unwrap();
        assert_eq!(stats.counter, 1);
        assert!(stats.is_clean());
    }

    #[test]
    fn invalid_status_byte_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tm.xid");
        fs::write(&path, [0, 0, 0, 0, 0, 0, 0, 2, 1, 9]).unwrap();

        let stats = verify(&path).unwrap();
        assert_eq!(stats.invalid, 1);
        assert!(run(&path).is_err());
    }

    #[test]
    fn length_mismatch_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tm.xid");
        fs::write(&path, [0, 0, 0, 0, 0, 0, 0, 2, 1]).unwrap();

        let err = verify(&path).unwrap_err();
        assert_eq!(err.kind(), FatalKind::StructuralCorruption);
    }
}
