//! Transaction manager.

use crate::codec::{self, HEADER_LEN};
use crate::error::{CoreError, CoreResult};
use crate::stats::LedgerStats;
use crate::transaction::state::XidStatus;
use crate::types::Xid;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info};
use xidlog_storage::StorageBackend;

/// Allocates XIDs and records their lifecycle in a durable ledger.
///
/// The transaction manager provides:
/// - Strictly increasing XID allocation via `begin()`
/// - Terminal transitions via `commit()` and `abort()`
/// - Status queries used by concurrency control and recovery
///
/// ## Durability
///
/// Every mutation writes through the storage backend and forces it to
/// stable storage before returning. `begin()` forces twice: first the new
/// XID's status byte, then the header counter. The counter therefore never
/// covers a status byte that is not on disk.
///
/// ## Concurrency
///
/// Only `begin()` takes the allocator lock. Commits, aborts, and queries
/// touch a single byte owned by one XID and run without it; callers must
/// not transition the same XID from two threads.
pub struct TransactionManager {
    /// Ledger storage.
    backend: Box<dyn StorageBackend>,
    /// Allocator lock guarding the counter and the on-disk header.
    counter: Mutex<u64>,
    /// Counter value published after each durable allocation.
    allocated: AtomicU64,
    /// Advisory lock handle, held while the manager owns the file.
    lock_file: Option<std::fs::File>,
}

impl TransactionManager {
    /// Opens a ledger on an already-open backend.
    ///
    /// The header counter is cross-checked against the backend size.
    /// Nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `StructuralCorruption` if the backend is shorter than the
    /// header or its length is not `8 + counter`, and `Storage` if the
    /// backend cannot be read.
    pub fn open(backend: Box<dyn StorageBackend>) -> CoreResult<Self> {
        let counter = validate(backend.as_ref())?;
        info!(counter, "opened transaction ledger");

        Ok(Self {
            backend,
            counter: Mutex::new(counter),
            allocated: AtomicU64::new(counter),
            lock_file: None,
        })
    }

    /// Attaches the advisory lock handle released by `close()`.
    pub(crate) fn with_lock_file(mut self, lock_file: Option<std::fs::File>) -> Self {
        self.lock_file = lock_file;
        self
    }

    /// Begins a new transaction and returns its XID.
    ///
    /// The XID is recorded as active and the counter advanced, both
    /// durably, before this returns.
    pub fn begin(&self) -> CoreResult<Xid> {
        let mut counter = self.counter.lock();
        let next = counter
            .checked_add(1)
            .ok_or_else(|| CoreError::corruption("xid space exhausted"))?;
        let xid = Xid::new(next);

        // The status byte must be durable before the header claims it.
        self.write_status(xid, XidStatus::Active)?;

        self.backend.write_at(0, &codec::encode_u64(next))?;
        self.backend.flush()?;

        *counter = next;
        self.allocated.store(next, Ordering::Release);
        debug!(%xid, "began transaction");

        Ok(xid)
    }

    /// Marks a transaction as committed.
    pub fn commit(&self, xid: Xid) -> CoreResult<()> {
        self.ensure_allocated(xid)?;
        self.write_status(xid, XidStatus::Committed)?;
        debug!(%xid, "committed transaction");
        Ok(())
    }

    /// Marks a transaction as aborted.
    pub fn abort(&self, xid: Xid) -> CoreResult<()> {
        self.ensure_allocated(xid)?;
        self.write_status(xid, XidStatus::Aborted)?;
        debug!(%xid, "aborted transaction");
        Ok(())
    }

    /// Returns true if `xid` is active. Always false for [`Xid::SUPER`].
    pub fn is_active(&self, xid: Xid) -> CoreResult<bool> {
        self.check_status(xid, XidStatus::Active)
    }

    /// Returns true if `xid` is committed. Always false for [`Xid::SUPER`].
    pub fn is_committed(&self, xid: Xid) -> CoreResult<bool> {
        self.check_status(xid, XidStatus::Committed)
    }

    /// Returns true if `xid` is aborted. Always false for [`Xid::SUPER`].
    pub fn is_aborted(&self, xid: Xid) -> CoreResult<bool> {
        self.check_status(xid, XidStatus::Aborted)
    }

    /// Returns the stored status of `xid`, or `None` for [`Xid::SUPER`].
    ///
    /// # Errors
    ///
    /// Returns `StructuralCorruption` if the stored byte is not a known
    /// status code.
    pub fn status(&self, xid: Xid) -> CoreResult<Option<XidStatus>> {
        if xid.is_super() {
            return Ok(None);
        }
        let byte = self.read_status_byte(xid)?;
        XidStatus::from_byte(byte).map(Some).ok_or_else(|| {
            CoreError::corruption(format!("{xid} has unknown status byte {byte:#04x}"))
        })
    }

    /// Returns the highest XID allocated so far ([`Xid::SUPER`] if none).
    #[must_use]
    pub fn last_xid(&self) -> Xid {
        Xid::new(self.allocated.load(Ordering::Acquire))
    }

    /// Counts statuses across every allocated XID with a single read.
    pub fn scan(&self) -> CoreResult<LedgerStats> {
        let counter = self.allocated.load(Ordering::Acquire);
        let len = usize::try_from(counter)
            .map_err(|_| CoreError::corruption(format!("counter {counter} exceeds address space")))?;
        let body = self.backend.read_at(HEADER_LEN, len)?;
        Ok(LedgerStats::from_body(counter, &body))
    }

    /// Closes the ledger, releasing the underlying file.
    ///
    /// Must not race with any other call; taking `self` by value enforces
    /// that within safe code.
    pub fn close(self) -> CoreResult<()> {
        let counter = *self.counter.lock();
        self.backend.close()?;

        if let Some(lock_file) = self.lock_file {
            fs2::FileExt::unlock(&lock_file)?;
        }

        info!(counter, "closed transaction ledger");
        Ok(())
    }

    fn ensure_allocated(&self, xid: Xid) -> CoreResult<()> {
        let last = self.last_xid();
        if xid.is_super() || xid > last {
            return Err(CoreError::UnknownXid { xid, last });
        }
        Ok(())
    }

    fn status_offset(&self, xid: Xid) -> CoreResult<u64> {
        codec::status_offset(xid).ok_or_else(|| CoreError::UnknownXid {
            xid,
            last: self.last_xid(),
        })
    }

    fn check_status(&self, xid: Xid, status: XidStatus) -> CoreResult<bool> {
        if xid.is_super() {
            return Ok(false);
        }
        Ok(self.read_status_byte(xid)? == status.as_byte())
    }

    fn read_status_byte(&self, xid: Xid) -> CoreResult<u8> {
        self.ensure_allocated(xid)?;
        let bytes = self.backend.read_at(self.status_offset(xid)?, 1)?;
        Ok(bytes[0])
    }

    fn write_status(&self, xid: Xid, status: XidStatus) -> CoreResult<()> {
        self.backend
            .write_at(self.status_offset(xid)?, &[status.as_byte()])?;
        self.backend.flush()?;
        Ok(())
    }
}

/// Reads the header counter and checks the backend length against it.
fn validate(backend: &dyn StorageBackend) -> CoreResult<u64> {
    let len = backend.size()?;
    if len < HEADER_LEN {
        error!(len, "xid file shorter than header");
        return Err(CoreError::corruption(format!(
            "file is {len} bytes, shorter than the {HEADER_LEN}-byte header"
        )));
    }

    let header = backend.read_at(0, HEADER_LEN as usize)?;
    let counter = codec::decode_u64(&header)
        .ok_or_else(|| CoreError::corruption("short header read"))?;

    match codec::expected_len(counter) {
        Some(expected) if expected == len => Ok(counter),
        Some(expected) => {
            error!(counter, expected, len, "xid file length mismatch");
            Err(CoreError::corruption(format!(
                "header declares {counter} xids ({expected} bytes) but file is {len} bytes"
            )))
        }
        None => {
            error!(counter, len, "xid counter overflows file length");
            Err(CoreError::corruption(format!(
                "header counter {counter} overflows the file length"
            )))
        }
    }
}
