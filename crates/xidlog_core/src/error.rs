//! Error types for xidlog core.
//!
//! Every error produced by the ledger is fatal: a ledger whose state is
//! ambiguous must never keep answering queries. [`CoreError::kind`] makes
//! the classification explicit so a top-level handler can report it before
//! terminating (see [`crate::fatal`]).

use crate::types::Xid;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Classification of a fatal ledger error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalKind {
    /// The ledger file does not match its own header.
    StructuralCorruption,
    /// A read, write, flush, or close against the ledger file failed.
    StorageIoFailure,
    /// A caller passed an XID the ledger never allocated.
    ContractViolation,
}

impl fmt::Display for FatalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalKind::StructuralCorruption => write!(f, "structural corruption"),
            FatalKind::StorageIoFailure => write!(f, "storage I/O failure"),
            FatalKind::ContractViolation => write!(f, "contract violation"),
        }
    }
}

/// Errors that can occur in ledger operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] xidlog_storage::StorageError),

    /// I/O error outside the storage backend (locking, path checks).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The ledger file is malformed.
    #[error("bad xid file: {message}")]
    StructuralCorruption {
        /// Description of the corruption.
        message: String,
    },

    /// The XID was never allocated by this ledger.
    #[error("unknown {xid}: last allocated is {last}")]
    UnknownXid {
        /// The XID the caller passed.
        xid: Xid,
        /// The highest XID allocated so far.
        last: Xid,
    },

    /// Another handle holds the exclusive lock on the ledger file.
    #[error("xid file locked: another process has exclusive access")]
    Locked,

    /// A ledger file already exists where one was to be created.
    #[error("xid file already exists: {}", .path.display())]
    AlreadyExists {
        /// Path of the existing file.
        path: PathBuf,
    },

    /// No ledger file exists at the given path.
    #[error("xid file not found: {}", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
}

impl CoreError {
    /// Creates a structural corruption error.
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::StructuralCorruption {
            message: message.into(),
        }
    }

    /// Returns the fatal classification of this error.
    #[must_use]
    pub fn kind(&self) -> FatalKind {
        match self {
            CoreError::StructuralCorruption { .. } => FatalKind::StructuralCorruption,
            CoreError::UnknownXid { .. } => FatalKind::ContractViolation,
            CoreError::Storage(_)
            | CoreError::Io(_)
            | CoreError::Locked
            | CoreError::AlreadyExists { .. }
            | CoreError::NotFound { .. } => FatalKind::StorageIoFailure,
        }
    }
}
