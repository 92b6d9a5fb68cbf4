//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory storage backend.
///
/// This backend stores all data in memory and is suitable for:
/// - Unit tests
/// - Integration and stress tests that would otherwise be bound by fsync
/// - Ephemeral ledgers that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use xidlog_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.write_at(0, b"test data").unwrap();
/// assert_eq!(backend.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Vec<u8>>,
    closed: AtomicBool,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns a copy of all data in the backend.
    ///
    /// Still available after `close`, so tests can inspect what a
    /// closed or crashed ledger left behind.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.ensure_open()?;
        let data = self.data.read();
        let size = data.len() as u64;
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[offset as usize..end as usize].to_vec())
    }

    fn write_at(&self, offset: u64, new_data: &[u8]) -> StorageResult<()> {
        self.ensure_open()?;
        let mut data = self.data.write();
        let size = data.len() as u64;

        if offset > size {
            return Err(StorageError::WriteGap { offset, size });
        }

        let start = offset as usize;
        let end = start + new_data.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(new_data);
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        self.ensure_open()?;
        Ok(self.data.read().len() as u64)
    }

    fn flush(&self) -> StorageResult<()> {
        // In-memory backend has no pending writes
        self.ensure_open()
    }

    fn sync(&self) -> StorageResult<()> {
        self.ensure_open()
    }

    fn close(&self) -> StorageResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.data().is_empty());
    }

    #[test]
    fn memory_write_extends_contiguously() {
        let backend = InMemoryBackend::new();

        backend.write_at(0, b"hello").unwrap();
        backend.write_at(5, b" world").unwrap();

        assert_eq!(backend.size().unwrap(), 11);
        assert_eq!(backend.data(), b"hello world");
    }

    #[test]
    fn memory_write_overlapping_end() {
        let backend = InMemoryBackend::with_data(b"abcd".to_vec());

        backend.write_at(2, b"XYZ").unwrap();
        assert_eq!(backend.data(), b"abXYZ");
    }

    #[test]
    fn memory_write_gap_fails() {
        let backend = InMemoryBackend::with_data(b"abc".to_vec());

        let result = backend.write_at(5, b"x");
        assert!(matches!(
            result,
            Err(StorageError::WriteGap { offset: 5, size: 3 })
        ));
        assert_eq!(backend.size().unwrap(), 3);
    }

    #[test]
    fn memory_read_at_returns_correct_data() {
        let backend = InMemoryBackend::with_data(b"hello world".to_vec());

        assert_eq!(backend.read_at(0, 5).unwrap(), b"hello");
        assert_eq!(backend.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn memory_read_at_past_end_fails() {
        let backend = InMemoryBackend::with_data(b"hello".to_vec());

        let result = backend.read_at(10, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));

        let result = backend.read_at(3, 10);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn memory_empty_read() {
        let backend = InMemoryBackend::with_data(b"hello".to_vec());

        let data = backend.read_at(2, 0).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn memory_flush_and_sync_succeed() {
        let backend = InMemoryBackend::new();
        backend.write_at(0, b"data").unwrap();
        assert!(backend.flush().is_ok());
        assert!(backend.sync().is_ok());
    }

    #[test]
    fn memory_close_is_terminal() {
        let backend = InMemoryBackend::with_data(b"kept".to_vec());
        backend.close().unwrap();

        assert!(matches!(backend.read_at(0, 1), Err(StorageError::Closed)));
        assert!(matches!(backend.write_at(0, b"x"), Err(StorageError::Closed)));
        assert!(matches!(backend.close(), Err(StorageError::Closed)));
        assert_eq!(backend.data(), b"kept");
    }

    #[test]
    fn shared_handle_sees_writes() {
        let backend = std::sync::Arc::new(InMemoryBackend::new());
        let boxed: Box<dyn StorageBackend> = Box::new(std::sync::Arc::clone(&backend));

        boxed.write_at(0, b"shared").unwrap();
        assert_eq!(backend.data(), b"shared");
    }
}
