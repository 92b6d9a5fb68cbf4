//! # xidlog Core
//!
//! Transaction-ID ledger for an embedded single-node database engine.
//!
//! This crate provides:
//! - Allocation of unique, strictly increasing transaction IDs (XIDs)
//! - A compact on-disk ledger recording each XID's lifecycle state
//! - A fail-fast integrity check when a ledger is opened
//! - Forced durability: every state transition reaches stable storage
//!   before the call returns
//!
//! ## Ledger format
//!
//! ```text
//! offset 0        8-byte big-endian counter (number of XIDs allocated)
//! offset 8+(n-1)  1-byte status of XID n (0=active, 1=committed, 2=aborted)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use xidlog_core::{TransactionManager, Xid};
//! use xidlog_storage::InMemoryBackend;
//!
//! let backend = InMemoryBackend::with_data(vec![0u8; 8]);
//! let tm = TransactionManager::open(Box::new(backend)).unwrap();
//!
//! let xid = tm.begin().unwrap();
//! assert_eq!(xid, Xid::new(1));
//! assert!(tm.is_active(xid).unwrap());
//!
//! tm.commit(xid).unwrap();
//! assert!(tm.is_committed(xid).unwrap());
//! tm.close().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
mod config;
mod error;
pub mod fatal;
pub mod file;
mod stats;
mod transaction;
mod types;

pub use config::Config;
pub use error::{CoreError, CoreResult, FatalKind};
pub use fatal::OrTerminate;
pub use stats::LedgerStats;
pub use transaction::{TransactionManager, XidStatus};
pub use types::Xid;

/// Crate version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
