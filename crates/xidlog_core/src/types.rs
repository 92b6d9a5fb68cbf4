//! Core type definitions for xidlog.

use std::fmt;

/// Unique identifier for a transaction.
///
/// XIDs are allocated starting at 1, are strictly increasing, and are
/// never reused. [`Xid::SUPER`] (0) is a sentinel meaning "no real
/// transaction"; it has no stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Xid(pub u64);

impl Xid {
    /// The sentinel XID for work done outside any transaction.
    pub const SUPER: Xid = Xid(0);

    /// Creates a new XID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns true for the sentinel [`Xid::SUPER`].
    #[must_use]
    pub const fn is_super(self) -> bool {
        self.0 == Self::SUPER.0
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xid:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xid_ordering() {
        assert!(Xid::new(1) < Xid::new(2));
        assert!(Xid::SUPER < Xid::new(1));
    }

    #[test]
    fn super_xid_is_zero() {
        assert!(Xid::SUPER.is_super());
        assert!(Xid::default().is_super());
        assert!(!Xid::new(1).is_super());
    }

    #[test]
    fn xid_display() {
        assert_eq!(format!("{}", Xid::new(42)), "xid:42");
    }
}
