//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// A file-based storage backend.
///
/// This backend provides persistent storage using OS file APIs.
/// Data survives process restarts.
///
/// # Durability
///
/// - `flush()` calls `File::sync_data()` so written bytes reach the disk
/// - `sync()` calls `File::sync_all()` to also persist metadata
///
/// # Thread Safety
///
/// Reads, writes, and flushes use positioned I/O on a shared handle and
/// never wait on each other. Only `close` and a write that grows the file
/// take an exclusive lock.
///
/// # Example
///
/// ```no_run
/// use xidlog_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("ledger.xid")).unwrap();
/// backend.write_at(0, &[0u8; 8]).unwrap();
/// backend.flush().unwrap();  // Ensure data is durable
/// ```
#[derive(Debug)]
pub struct FileBackend {
    file: RwLock<Option<File>>,
    size: RwLock<u64>,
    read_only: bool,
}

impl FileBackend {
    /// Opens or creates a file backend at the given path.
    ///
    /// If the file exists, it is opened for reading and writing without
    /// truncation. If it doesn't exist, a new empty file is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Self::from_file(file, false)
    }

    /// Opens an existing file, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be opened.
    pub fn open_existing(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::from_file(file, false)
    }

    /// Opens an existing file for reading only.
    ///
    /// Writes fail with [`StorageError::ReadOnly`]; `flush`, `sync`, and
    /// `close` never touch the disk. The size is captured once at open.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be opened.
    pub fn open_read_only(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        Self::from_file(file, true)
    }

    fn from_file(file: File, read_only: bool) -> StorageResult<Self> {
        let size = file.metadata()?.len();

        Ok(Self {
            file: RwLock::new(Some(file)),
            size: RwLock::new(size),
            read_only,
        })
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or(StorageError::Closed)?;

        let size = *self.size.read();
        let end = offset.saturating_add(len as u64);
        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        let mut buffer = vec![0u8; len];
        read_exact_at(file, &mut buffer, offset)?;

        Ok(buffer)
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let guard = self.file.read();
        let file = guard.as_ref().ok_or(StorageError::Closed)?;

        // The size only grows, so a stale read can only reject a write.
        let size = *self.size.read();
        if offset > size {
            return Err(StorageError::WriteGap { offset, size });
        }

        if data.is_empty() {
            return Ok(());
        }

        write_all_at(file, data, offset)?;

        let end = offset + data.len() as u64;
        if end > size {
            let mut size = self.size.write();
            *size = (*size).max(end);
        }

        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        if self.file.read().is_none() {
            return Err(StorageError::Closed);
        }
        Ok(*self.size.read())
    }

    fn flush(&self) -> StorageResult<()> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or(StorageError::Closed)?;
        if !self.read_only {
            file.sync_data()?;
        }
        Ok(())
    }

    fn sync(&self) -> StorageResult<()> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or(StorageError::Closed)?;
        if !self.read_only {
            file.sync_all()?;
        }
        Ok(())
    }

    fn close(&self) -> StorageResult<()> {
        let file = self.file.write().take().ok_or(StorageError::Closed)?;
        if !self.read_only {
            file.sync_all()?;
        }
        drop(file);
        Ok(())
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    std::os::unix::fs::FileExt::read_exact_at(file, buf, offset)
}

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    std::os::unix::fs::FileExt::write_all_at(file, buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;

    let mut total = 0_usize;
    while total < buf.len() {
        match file.seek_read(&mut buf[total..], offset + total as u64) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "short read"));
            }
            Ok(n) => total += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(windows)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;

    let mut total = 0_usize;
    while total < buf.len() {
        match file.seek_write(&buf[total..], offset + total as u64) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "seek_write returned 0"));
            }
            Ok(n) => total += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
