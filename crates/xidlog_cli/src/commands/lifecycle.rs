//! Single lifecycle operations: status, begin, commit, abort.
//!
//! Mutations take the exclusive lock and treat any ledger error as fatal:
//! the process exits through the ledger's fatal handler.

use std::path::Path;
use xidlog_core::{file, Config, OrTerminate, TransactionManager, Xid};

fn open_owned(path: &Path) -> TransactionManager {
    file::open(path, &Config::default()).or_terminate()
}

/// Prints the status of one transaction.
pub fn status(path: &Path, xid: u64) -> Result<(), Box<dyn std::error::Error>> {
    let tm = file::open(path, &super::read_only())?;
    let xid = Xid::new(xid);
    let status = tm.status(xid)?;
    tm.close()?;

    match status {
        Some(status) => println!("{xid}: {status}"),
        None => println!("{xid}: super transaction (no stored status)"),
    }
    Ok(())
}

/// Begins a transaction and prints its ID.
pub fn begin(path: &Path) {
    let tm = open_owned(path);
    let xid = tm.begin().or_terminate();
    tm.close().or_terminate();
    println!("{}", xid.as_u64());
}

/// Commits a transaction.
pub fn commit(path: &Path, xid: u64) {
    let tm = open_owned(path);
    tm.commit(Xid::new(xid)).or_terminate();
    tm.close().or_terminate();
}

/// Aborts a transaction.
pub fn abort(path: &Path, xid: u64) {
    let tm = open_owned(path);
    tm.abort(Xid::new(xid)).or_terminate();
    tm.close().or_terminate();
}
