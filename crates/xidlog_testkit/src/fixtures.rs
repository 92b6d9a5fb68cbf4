//! Test fixtures and ledger helpers.
//!
//! Provides convenience functions for setting up test ledgers
//! and common test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use xidlog_core::codec::encode_u64;
use xidlog_core::{file, Config, CoreResult, TransactionManager};
use xidlog_storage::InMemoryBackend;

/// Where a [`TestLedger`] keeps its bytes.
enum Storage {
    Memory(Arc<InMemoryBackend>),
    File {
        path: PathBuf,
        _temp_dir: TempDir,
    },
}

/// A test ledger with automatic cleanup.
pub struct TestLedger {
    /// The transaction manager.
    pub tm: TransactionManager,
    storage: Storage,
}

impl TestLedger {
    /// Creates a new empty in-memory ledger.
    pub fn memory() -> Self {
        Self::from_bytes(ledger_bytes(0, &[])).expect("Failed to open in-memory ledger")
    }

    /// Opens an in-memory ledger over the given raw bytes.
    ///
    /// Fails exactly like a real file would if the bytes are malformed.
    pub fn from_bytes(data: Vec<u8>) -> CoreResult<Self> {
        let backend = Arc::new(InMemoryBackend::with_data(data));
        let tm = TransactionManager::open(Box::new(Arc::clone(&backend)))?;
        Ok(Self {
            tm,
            storage: Storage::Memory(backend),
        })
    }

    /// Creates a new empty ledger in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = file::xid_path(&temp_dir.path().join("test"));
        let tm = file::create(&path, &Config::default()).expect("Failed to create xid file");

        Self {
            tm,
            storage: Storage::File {
                path,
                _temp_dir: temp_dir,
            },
        }
    }

    /// Returns the ledger path if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            Storage::Memory(_) => None,
            Storage::File { path, .. } => Some(path),
        }
    }

    /// Returns the raw ledger bytes as currently stored.
    pub fn bytes(&self) -> Vec<u8> {
        match &self.storage {
            Storage::Memory(backend) => backend.data(),
            Storage::File { path, .. } => fs::read(path).expect("Failed to read xid file"),
        }
    }

    /// Closes the ledger and opens it again over the same storage.
    pub fn reopen(self) -> CoreResult<Self> {
        let Self { tm, storage } = self;
        tm.close()?;

        match storage {
            Storage::Memory(backend) => Self::from_bytes(backend.data()),
            Storage::File { path, _temp_dir } => {
                let tm = file::open(&path, &Config::default())?;
                Ok(Self {
                    tm,
                    storage: Storage::File { path, _temp_dir },
                })
            }
        }
    }

    /// Closes the ledger.
    pub fn close(self) -> CoreResult<()> {
        self.tm.close()
    }
}

impl std::ops::Deref for TestLedger {
    type Target = TransactionManager;

    fn deref(&self) -> &Self::Target {
        &self.tm
    }
}

/// Builds raw ledger bytes from a header counter and a status body.
///
/// The counter is not required to match the body, so malformed ledgers
/// can be built too.
pub fn ledger_bytes(counter: u64, body: &[u8]) -> Vec<u8> {
    let mut data = encode_u64(counter).to_vec();
    data.extend_from_slice(body);
    data
}

/// Runs a test with a temporary in-memory ledger.
///
/// # Example
///
/// ```rust
/// use xidlog_testkit::with_temp_ledger;
///
/// with_temp_ledger(|tm| {
///     let xid = tm.begin().unwrap();
///     tm.commit(xid).unwrap();
/// });
/// ```
pub fn with_temp_ledger<F, R>(f: F) -> R
where
    F: FnOnce(&TransactionManager) -> R,
{
    let ledger = TestLedger::memory();
    f(&ledger)
}
