//! Storage backend trait definition.

use crate::error::StorageResult;
use std::sync::Arc;

/// A low-level positioned storage backend.
///
/// Storage backends are **opaque byte stores**. They provide positioned
/// reads and writes plus an explicit durability barrier. The transaction
/// ledger owns all format interpretation.
///
/// # Invariants
///
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `write_at` never creates holes: `offset <= size()` must hold
/// - after `flush` returns, every completed `write_at` survives a crash
/// - after `close` returns, every other call fails with `StorageError::Closed`
/// - Backends must be `Send + Sync`; writes to disjoint ranges may proceed
///   from different threads
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The read would extend beyond the current size
    /// - The backend is closed
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Writes `data` at `offset`, overwriting existing bytes and extending
    /// the storage if the write runs past the current end.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `offset` is greater than the current size
    /// - The backend is closed
    /// - An I/O error occurs
    fn write_at(&self, offset: u64, data: &[u8]) -> StorageResult<()>;

    /// Returns the current size of the storage in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed or the size cannot be
    /// determined.
    fn size(&self) -> StorageResult<u64>;

    /// Forces all written data to durable storage.
    ///
    /// After this returns successfully, all previously written data is
    /// guaranteed to survive process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&self) -> StorageResult<()>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// This is a stronger guarantee than `flush` - it ensures that
    /// file metadata (timestamps, permissions) is also durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&self) -> StorageResult<()>;

    /// Syncs and releases the underlying resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the final sync fails or the backend was
    /// already closed.
    fn close(&self) -> StorageResult<()>;
}

/// Shared handles forward to the backend they point at, so a caller can
/// keep inspecting a backend it has handed to a ledger.
impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        (**self).read_at(offset, len)
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> StorageResult<()> {
        (**self).write_at(offset, data)
    }

    fn size(&self) -> StorageResult<u64> {
        (**self).size()
    }

    fn flush(&self) -> StorageResult<()> {
        (**self).flush()
    }

    fn sync(&self) -> StorageResult<()> {
        (**self).sync()
    }

    fn close(&self) -> StorageResult<()> {
        (**self).close()
    }
}
