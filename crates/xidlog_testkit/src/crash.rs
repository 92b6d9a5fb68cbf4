//! Crash testing for the transaction ledger.
//!
//! This module simulates failures at each step of `begin()` and checks
//! what a subsequent open makes of the bytes left behind.
//!
//! ## Test Strategy
//!
//! `begin()` performs four storage steps: write the status byte, flush it,
//! write the header, flush it. A crash before the status write leaves the
//! ledger untouched. A crash after the status byte lands but before the
//! header covers it leaves one stray byte, which the next open rejects as
//! corruption. A crash after the header write leaves a complete allocation.
//!
//! ## Usage
//!
//! ```rust
//! use xidlog_testkit::crash::{simulate_begin_crash, CrashPoint};
//!
//! let result = simulate_begin_crash(3, CrashPoint::BeforeHeaderWrite);
//! assert!(result.reopen.is_err());
//! ```

use crate::fixtures::ledger_bytes;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use xidlog_core::{FatalKind, TransactionManager, Xid};
use xidlog_storage::{InMemoryBackend, StorageBackend, StorageError, StorageResult};

/// Points inside `begin()` at which a crash can be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashPoint {
    /// The status byte write fails.
    BeforeStatusWrite,
    /// The status byte is written but its flush fails.
    BeforeStatusFlush,
    /// The status byte is durable but the header write fails.
    BeforeHeaderWrite,
    /// The header is written but its flush fails.
    BeforeHeaderFlush,
}

impl CrashPoint {
    /// Every crash point, in execution order.
    pub const ALL: [CrashPoint; 4] = [
        CrashPoint::BeforeStatusWrite,
        CrashPoint::BeforeStatusFlush,
        CrashPoint::BeforeHeaderWrite,
        CrashPoint::BeforeHeaderFlush,
    ];
}

/// Outcome of one simulated crash.
#[derive(Debug, Clone)]
pub struct CrashRecoveryResult {
    /// Ledger bytes left behind by the crash.
    pub bytes: Vec<u8>,
    /// Highest XID after reopening, or why reopening failed.
    pub reopen: Result<Xid, FatalKind>,
}

/// A storage backend wrapper that can simulate crashes.
///
/// Writes and flushes are counted from 1; arming a failure makes the
/// matching call return an I/O error without reaching the inner backend.
pub struct CrashableBackend<B: StorageBackend> {
    inner: B,
    writes: AtomicUsize,
    flushes: AtomicUsize,
    fail_write: AtomicUsize,
    fail_flush: AtomicUsize,
    crashed: AtomicBool,
}

impl<B: StorageBackend> CrashableBackend<B> {
    /// Creates a new crashable backend wrapping an inner backend.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            flushes: AtomicUsize::new(0),
            fail_write: AtomicUsize::new(usize::MAX),
            fail_flush: AtomicUsize::new(usize::MAX),
            crashed: AtomicBool::new(false),
        }
    }

    /// Fails the `n`th write from now (1 = the next write).
    pub fn fail_nth_write(&self, n: usize) {
        let seen = self.writes.load(Ordering::SeqCst);
        self.fail_write.store(seen + n, Ordering::SeqCst);
    }

    /// Fails the `n`th flush from now (1 = the next flush).
    pub fn fail_nth_flush(&self, n: usize) {
        let seen = self.flushes.load(Ordering::SeqCst);
        self.fail_flush.store(seen + n, Ordering::SeqCst);
    }

    /// Disarms all failures and clears the crash flag.
    pub fn reset(&self) {
        self.fail_write.store(usize::MAX, Ordering::SeqCst);
        self.fail_flush.store(usize::MAX, Ordering::SeqCst);
        self.crashed.store(false, Ordering::SeqCst);
    }

    /// Returns whether an injected failure has fired.
    pub fn has_crashed(&self) -> bool {
        self.crashed.load(Ordering::SeqCst)
    }

    /// Returns the wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn crash(&self, what: &str) -> StorageError {
        self.crashed.store(true, Ordering::SeqCst);
        StorageError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("simulated crash during {what}"),
        ))
    }
}

impl<B: StorageBackend> StorageBackend for CrashableBackend<B> {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.inner.read_at(offset, len)
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> StorageResult<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_write.load(Ordering::SeqCst) {
            return Err(self.crash("write"));
        }
        self.inner.write_at(offset, data)
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn flush(&self) -> StorageResult<()> {
        let n = self.flushes.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_flush.load(Ordering::SeqCst) {
            return Err(self.crash("flush"));
        }
        self.inner.flush()
    }

    fn sync(&self) -> StorageResult<()> {
        self.inner.sync()
    }

    fn close(&self) -> StorageResult<()> {
        self.inner.close()
    }
}

/// Allocates `history` XIDs, crashes the next `begin()` at `point`, and
/// reopens a fresh manager over whatever bytes remain.
///
/// In-memory writes that completed before the crash are treated as having
/// reached the disk, which is the worst case for recovery.
pub fn simulate_begin_crash(history: u64, point: CrashPoint) -> CrashRecoveryResult {
    let memory = Arc::new(InMemoryBackend::with_data(ledger_bytes(0, &[])));
    let backend = Arc::new(CrashableBackend::new(Arc::clone(&memory)));
    let tm = TransactionManager::open(Box::new(Arc::clone(&backend)))
        .expect("Failed to open ledger");

    for _ in 0..history {
        tm.begin().expect("Failed to begin");
    }

    match point {
        CrashPoint::BeforeStatusWrite => backend.fail_nth_write(1),
        CrashPoint::BeforeStatusFlush => backend.fail_nth_flush(1),
        CrashPoint::BeforeHeaderWrite => backend.fail_nth_write(2),
        CrashPoint::BeforeHeaderFlush => backend.fail_nth_flush(2),
    }
    assert!(tm.begin().is_err(), "begin must surface the injected crash");
    assert!(backend.has_crashed());

    // The process is gone; nothing is closed or flushed on the way out.
    drop(tm);

    let bytes = memory.data();
    let reopen = TransactionManager::open(Box::new(InMemoryBackend::with_data(bytes.clone())))
        .map(|tm| tm.last_xid())
        .map_err(|err| err.kind());

    CrashRecoveryResult { bytes, reopen }
}
