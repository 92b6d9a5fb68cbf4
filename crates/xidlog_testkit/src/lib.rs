//! # xidlog Testkit
//!
//! Test utilities for xidlog.
//!
//! This crate provides:
//! - Ledger fixtures backed by memory or a temporary file
//! - A storage wrapper that injects write and flush failures
//! - Property-based test generators using proptest
//! - Concurrent allocation stress runners
//!
//! ## Usage
//!
//! ```rust
//! use xidlog_testkit::prelude::*;
//!
//! let ledger = TestLedger::memory();
//! let xid = ledger.begin().unwrap();
//! assert!(ledger.is_active(xid).unwrap());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
