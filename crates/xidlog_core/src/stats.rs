//! Ledger statistics.

use crate::transaction::XidStatus;

/// Per-status counts over every allocated XID.
///
/// Produced by [`crate::TransactionManager::scan`] from a single read of
/// the ledger body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Header counter: number of XIDs allocated.
    pub counter: u64,
    /// XIDs currently active.
    pub active: u64,
    /// XIDs committed.
    pub committed: u64,
    /// XIDs aborted.
    pub aborted: u64,
    /// Status bytes holding no known status code.
    pub invalid: u64,
}

impl LedgerStats {
    /// Tallies a ledger body (the bytes after the header).
    #[must_use]
    pub fn from_body(counter: u64, body: &[u8]) -> Self {
        let mut stats = Self {
            counter,
            ..Self::default()
        };
        for &byte in body {
            match XidStatus::from_byte(byte) {
                Some(XidStatus::Active) => stats.active += 1,
                Some(XidStatus::Committed) => stats.committed += 1,
                Some(XidStatus::Aborted) => stats.aborted += 1,
                None => stats.invalid += 1,
            }
        }
        stats
    }

    /// Returns true if every status byte is a known code.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.invalid == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_body() {
        let stats = LedgerStats::from_body(6, &[0, 1, 1, 2, 0, 9]);
        assert_eq!(stats.counter, 6);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.committed, 2);
        assert_eq!(stats.aborted, 1);
        assert_eq!(stats.invalid, 1);
        assert!(!stats.is_clean());
    }

    #[test]
    fn empty_body_is_clean() {
        let stats = LedgerStats::from_body(0, &[]);
        assert_eq!(stats, LedgerStats::default());
        assert!(stats.is_clean());
    }
}
