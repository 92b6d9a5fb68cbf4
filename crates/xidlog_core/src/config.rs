//! Ledger configuration.

/// Configuration for creating or opening a ledger file.
///
/// Durability is deliberately absent: every mutation is forced to stable
/// storage regardless of configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the ledger if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to error if the ledger already exists.
    pub error_if_exists: bool,

    /// Whether to hold an exclusive advisory lock on the file while open.
    pub exclusive_lock: bool,

    /// Whether to create missing parent directories.
    pub create_dirs: bool,

    /// Whether to open the ledger without write access. Mutations then
    /// fail and nothing is ever forced to disk.
    pub read_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: false,
            error_if_exists: false,
            exclusive_lock: true,
            create_dirs: false,
            read_only: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the ledger if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to error if the ledger exists.
    #[must_use]
    pub const fn error_if_exists(mut self, value: bool) -> Self {
        self.error_if_exists = value;
        self
    }

    /// Sets whether to take an exclusive lock on the ledger file.
    #[must_use]
    pub const fn exclusive_lock(mut self, value: bool) -> Self {
        self.exclusive_lock = value;
        self
    }

    /// Sets whether to create missing parent directories.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }

    /// Sets whether to open the ledger read-only.
    #[must_use]
    pub const fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }
}
