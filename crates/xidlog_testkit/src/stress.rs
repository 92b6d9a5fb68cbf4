//! Stress tests for the transaction ledger.
//!
//! These runners hammer one shared [`TransactionManager`] from many
//! threads and collect what each thread observed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use xidlog_core::{TransactionManager, Xid};

/// What the threads of one stress run observed.
#[derive(Debug, Clone, Copy)]
pub struct StressReport {
    /// Operations that succeeded and agreed with the ledger.
    pub completed: usize,
    /// Operations that errored or saw a wrong status.
    pub failed: usize,
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

/// Shape of a stress run.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent threads.
    pub threads: usize,
    /// Operations performed by each thread.
    pub ops_per_thread: usize,
}

/// Runs concurrent `begin()` calls and returns every XID handed out.
///
/// The XIDs are returned sorted so callers can compare them against
/// `1..=n` directly.
pub fn stress_concurrent_begins(
    tm: Arc<TransactionManager>,
    config: &StressConfig,
) -> (StressReport, Vec<Xid>) {
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let tm = Arc::clone(&tm);
            let failed = Arc::clone(&failed);
            let ops = config.ops_per_thread;

            thread::spawn(move || {
                let mut xids = Vec::with_capacity(ops);
                for _ in 0..ops {
                    match tm.begin() {
                        Ok(xid) => xids.push(xid),
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
                xids
            })
        })
        .collect();

    let mut xids: Vec<Xid> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("Thread panicked"))
        .collect();
    xids.sort_unstable();

    let report = StressReport {
        completed: xids.len(),
        failed: failed.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
    };
    (report, xids)
}

/// Runs full lifecycles concurrently: each thread begins a transaction,
/// commits it or aborts it alternately, and checks the outcome.
///
/// An operation counts as failed if any call errors or any predicate
/// disagrees with the transition just made.
pub fn stress_concurrent_lifecycles(
    tm: Arc<TransactionManager>,
    config: &StressConfig,
) -> StressReport {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let tm = Arc::clone(&tm);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let ops = config.ops_per_thread;

            thread::spawn(move || {
                for i in 0..ops {
                    let commit = (t + i) % 2 == 0;
                    let outcome = tm.begin().and_then(|xid| {
                        if !tm.is_active(xid)? {
                            return Ok(false);
                        }
                        if commit {
                            tm.commit(xid)?;
                            Ok(tm.is_committed(xid)? && !tm.is_active(xid)?)
                        } else {
                            tm.abort(xid)?;
                            Ok(tm.is_aborted(xid)? && !tm.is_active(xid)?)
                        }
                    });

                    match outcome {
                        Ok(true) => successful.fetch_add(1, Ordering::Relaxed),
                        _ => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressReport {
        completed: successful.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
    }
}
