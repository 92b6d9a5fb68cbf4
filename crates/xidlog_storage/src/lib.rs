//! # xidlog Storage
//!
//! Positioned storage backends for the xidlog transaction ledger.
//!
//! Backends are **opaque byte stores** - they do not interpret the data
//! they store. The ledger format (header counter, status bytes) is owned
//! entirely by `xidlog_core`.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (read, positioned write, flush)
//! - Writes may overwrite or extend contiguously, never leave holes
//! - Every method takes `&self`; backends synchronize internally so a
//!   single handle can be shared across threads
//! - `flush` means durable: bytes are on stable storage when it returns
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral ledgers
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use xidlog_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.write_at(0, b"hello world").unwrap();
//! backend.write_at(6, b"WORLD").unwrap();
//! assert_eq!(backend.read_at(0, 11).unwrap(), b"hello WORLD");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
