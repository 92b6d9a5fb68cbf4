//! Process-level handling of ledger failures.
//!
//! Library calls only ever return [`CoreError`]. Callers that embed the
//! ledger decide where the fail-closed policy is applied; the helpers here
//! are that policy: report the error, then exit without touching the
//! ledger again. An operator must restore or discard the file out of band.

use crate::error::{CoreError, CoreResult};

/// Exit status used when the ledger forces the process down.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Logs `err` and terminates the process.
pub fn terminate(err: &CoreError) -> ! {
    tracing::error!(kind = %err.kind(), error = %err, "fatal transaction ledger error");
    eprintln!("fatal: {} ({})", err, err.kind());
    std::process::exit(FATAL_EXIT_CODE)
}

/// Unwraps ledger results, terminating the process on error.
///
/// ```rust,no_run
/// use xidlog_core::{OrTerminate, TransactionManager};
/// use xidlog_storage::InMemoryBackend;
///
/// let tm = TransactionManager::open(Box::new(InMemoryBackend::with_data(vec![0; 8])))
///     .or_terminate();
/// let xid = tm.begin().or_terminate();
/// ```
pub trait OrTerminate<T> {
    /// Returns the value, or terminates the process via [`terminate`].
    fn or_terminate(self) -> T;
}

impl<T> OrTerminate<T> for CoreResult<T> {
    fn or_terminate(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => terminate(&err),
        }
    }
}
