//! CLI command implementations.

pub mod create;
pub mod inspect;
pub mod lifecycle;
pub mod verify;

use xidlog_core::Config;

/// Configuration for commands that only read a ledger.
///
/// The file is opened without write access and no lock is taken, so a
/// ledger can be examined while its owner runs. A reader that lands inside
/// the owner's `begin()`, after the status byte is forced but before the
/// header is, sees one byte more than the header claims and reports a
/// length mismatch. Rerun the command once the owner is idle before
/// treating that as corruption.
pub(crate) fn read_only() -> Config {
    Config::new().exclusive_lock(false).read_only(true)
}
