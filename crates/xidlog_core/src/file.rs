//! Ledger files on disk.
//!
//! A ledger lives in a single file with the `.xid` suffix. While a
//! [`TransactionManager`] owns it, an exclusive advisory lock is held on a
//! sidecar `.xid.lock` file so a second process cannot open the same
//! ledger:
//!
//! ```text
//! <name>.xid        # 8-byte counter + one status byte per XID
//! <name>.xid.lock   # advisory lock, held while open
//! ```
//!
//! The lock file is left in place after close. Another process may already
//! hold it open, and unlinking it would let a third process lock a fresh
//! inode alongside that one.

use crate::codec;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::transaction::TransactionManager;
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use xidlog_storage::{FileBackend, StorageBackend};

/// File suffix identifying transaction ledgers.
pub const XID_SUFFIX: &str = ".xid";

/// Suffix of the sidecar lock file.
const LOCK_SUFFIX: &str = ".lock";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Returns `base` with the ledger suffix appended.
#[must_use]
pub fn xid_path(base: &Path) -> PathBuf {
    with_suffix(base, XID_SUFFIX)
}

/// Resolves a user-supplied path to a ledger path.
///
/// Paths already ending in `.xid` are kept; anything else is treated as a
/// base name and gets the suffix.
#[must_use]
pub fn resolve_path(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext == &XID_SUFFIX[1..] => path.to_path_buf(),
        _ => xid_path(path),
    }
}

/// Returns the sidecar lock path for a ledger path.
#[must_use]
pub fn lock_path(ledger: &Path) -> PathBuf {
    with_suffix(ledger, LOCK_SUFFIX)
}

/// Creates a new ledger holding only the zero header and opens it.
///
/// # Errors
///
/// Returns `AlreadyExists` if the ledger file exists, `Locked` if another
/// handle holds the lock, or an I/O error. If the header cannot be made
/// durable the new file is removed again.
pub fn create(path: &Path, config: &Config) -> CoreResult<TransactionManager> {
    let path = resolve_path(path);
    if path.exists() {
        return Err(CoreError::AlreadyExists { path });
    }
    if config.create_dirs {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
    }

    let lock_file = acquire_lock(&path, config)?;

    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => drop(file),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(CoreError::AlreadyExists { path });
        }
        Err(err) => return Err(err.into()),
    }

    let backend = FileBackend::open_existing(&path)?;
    write_header_or_remove(&path, &backend)?;
    info!(path = %path.display(), "created xid file");

    Ok(TransactionManager::open(Box::new(backend))?.with_lock_file(lock_file))
}

/// Writes and syncs the zero header of a freshly created ledger.
///
/// On failure the file is unlinked so a later `create` can start over.
fn write_header_or_remove(path: &Path, backend: &dyn StorageBackend) -> CoreResult<()> {
    let result = backend
        .write_at(0, &codec::encode_u64(0))
        .and_then(|()| backend.sync());

    if let Err(err) = result {
        // Windows refuses to unlink a file with an open handle.
        backend.close().ok();
        if let Err(remove_err) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %remove_err, "failed to remove partial xid file");
        }
        return Err(err.into());
    }
    Ok(())
}

/// Opens an existing ledger, validating it before any use.
///
/// With `create_if_missing`, a missing ledger is created instead. With
/// `read_only`, the file is opened without write access and no lock is
/// taken.
///
/// # Errors
///
/// Returns `NotFound`, `AlreadyExists` (with `error_if_exists`), `Locked`,
/// `StructuralCorruption` if validation fails, or an I/O error.
pub fn open(path: &Path, config: &Config) -> CoreResult<TransactionManager> {
    let path = resolve_path(path);

    if !path.exists() {
        if config.create_if_missing {
            return create(&path, config);
        }
        return Err(CoreError::NotFound { path });
    }
    if config.error_if_exists {
        return Err(CoreError::AlreadyExists { path });
    }

    if config.read_only {
        let backend = FileBackend::open_read_only(&path)?;
        info!(path = %path.display(), "opening xid file read-only");
        return TransactionManager::open(Box::new(backend));
    }

    let lock_file = acquire_lock(&path, config)?;
    let backend = FileBackend::open_existing(&path)?;
    info!(path = %path.display(), "opening xid file");

    Ok(TransactionManager::open(Box::new(backend))?.with_lock_file(lock_file))
}

fn acquire_lock(path: &Path, config: &Config) -> CoreResult<Option<File>> {
    if !config.exclusive_lock {
        return Ok(None);
    }

    let lock_file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path(path))?;

    // Non-blocking: a held lock means another owner.
    if lock_file.try_lock_exclusive().is_err() {
        return Err(CoreError::Locked);
    }

    Ok(Some(lock_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FatalKind;
    use crate::types::Xid;
    use tempfile::tempdir;

    #[test]
    fn suffix_handling() {
        assert_eq!(xid_path(Path::new("db/tm")), PathBuf::from("db/tm.xid"));
        assert_eq!(resolve_path(Path::new("db/tm")), PathBuf::from("db/tm.xid"));
        assert_eq!(resolve_path(Path::new("db/tm.xid")), PathBuf::from("db/tm.xid"));
        assert_eq!(
            lock_path(Path::new("db/tm.xid")),
            PathBuf::from("db/tm.xid.lock")
        );
    }

    #[test]
    fn create_writes_zero_header() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("tm");

        let tm = create(&base, &Config::default()).unwrap();
        assert_eq!(tm.last_xid(), Xid::SUPER);
        tm.close().unwrap();

        assert_eq!(fs::read(xid_path(&base)).unwrap(), vec![0u8; 8]);
    }

    #[test]
    fn create_refuses_existing() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("tm");
        create(&base, &Config::default()).unwrap().close().unwrap();

        let result = create(&base, &Config::default());
        assert!(matches!(result, Err(CoreError::AlreadyExists { .. })));
    }

    #[test]
    fn create_existing_leaves_no_lock_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tm.xid");
        fs::write(&path, vec![0u8; 8]).unwrap();

        let result = create(&path, &Config::default());
        assert!(matches!(result, Err(CoreError::AlreadyExists { .. })));
        assert!(!lock_path(&path).exists());
    }

    #[test]
    fn failed_header_write_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tm.xid");
        fs::write(&path, b"").unwrap();

        // A read-only handle makes the header write fail.
        let backend = FileBackend::open_read_only(&path).unwrap();
        let err = write_header_or_remove(&path, &backend).unwrap_err();
        assert_eq!(err.kind(), FatalKind::StorageIoFailure);
        assert!(!path.exists());
    }

    #[test]
    fn read_only_open_takes_no_lock_and_rejects_writes() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("tm");
        let owner = create(&base, &Config::default()).unwrap();
        let xid = owner.begin().unwrap();

        let reader = open(&base, &Config::new().read_only(true)).unwrap();
        assert!(reader.is_active(xid).unwrap());
        assert_eq!(reader.begin().unwrap_err().kind(), FatalKind::StorageIoFailure);
        reader.close().unwrap();

        owner.close().unwrap();
        assert_eq!(
            fs::read(xid_path(&base)).unwrap(),
            vec![0, 0, 0, 0, 0, 0, 0, 1, 0]
        );
    }

    #[test]
    fn create_with_dirs() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("nested").join("deeper").join("tm");

        let tm = create(&base, &Config::new().create_dirs(true)).unwrap();
        tm.close().unwrap();
        assert!(xid_path(&base).exists());
    }

    #[test]
    fn open_missing() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("tm");

        let result = open(&base, &Config::default());
        assert!(matches!(result, Err(CoreError::NotFound { .. })));

        let tm = open(&base, &Config::new().create_if_missing(true)).unwrap();
        assert_eq!(tm.begin().unwrap(), Xid::new(1));
        tm.close().unwrap();
    }

    #[test]
    fn open_error_if_exists() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("tm");
        create(&base, &Config::default()).unwrap().close().unwrap();

        let result = open(&base, &Config::new().error_if_exists(true));
        assert!(matches!(result, Err(CoreError::AlreadyExists { .. })));
    }

    #[test]
    fn reopen_persists_state() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("tm");

        {
            let tm = create(&base, &Config::default()).unwrap();
            let first = tm.begin().unwrap();
            let second = tm.begin().unwrap();
            tm.commit(second).unwrap();
            tm.abort(first).unwrap();
            tm.close().unwrap();
        }

        assert_eq!(
            fs::read(xid_path(&base)).unwrap(),
            vec![0, 0, 0, 0, 0, 0, 0, 2, 2, 1]
        );

        let tm = open(&base, &Config::default()).unwrap();
        assert!(tm.is_aborted(Xid::new(1)).unwrap());
        assert!(tm.is_committed(Xid::new(2)).unwrap());
        assert_eq!(tm.begin().unwrap(), Xid::new(3));
        tm.close().unwrap();
    }

    #[test]
    fn second_owner_is_locked_out() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("tm");
        let tm = create(&base, &Config::default()).unwrap();

        let result = open(&base, &Config::default());
        assert!(matches!(result, Err(CoreError::Locked)));

        tm.close().unwrap();
        open(&base, &Config::default()).unwrap().close().unwrap();
    }

    #[test]
    fn open_rejects_truncated_file_untouched() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("tm");
        let path = xid_path(&base);

        let corrupt = vec![0, 0, 0, 0, 0, 0, 0, 3, 1, 1];
        fs::write(&path, &corrupt).unwrap();

        let err = open(&base, &Config::default()).err().unwrap();
        assert_eq!(err.kind(), FatalKind::StructuralCorruption);
        assert_eq!(fs::read(&path).unwrap(), corrupt);
    }
}
