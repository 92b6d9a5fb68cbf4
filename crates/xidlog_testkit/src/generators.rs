//! Property-based test generators using proptest.
//!
//! Operations pick their target XID by index into the XIDs allocated so
//! far, so every generated sequence is valid against the ledger contract:
//! only active XIDs are committed or aborted.

use proptest::prelude::*;
use xidlog_core::{CoreResult, TransactionManager, Xid, XidStatus};

/// A single ledger operation for property testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    /// Allocate a new XID.
    Begin,
    /// Commit the active XID selected by the index.
    Commit(usize),
    /// Abort the active XID selected by the index.
    Abort(usize),
    /// Query the allocated XID selected by the index.
    Query(usize),
}

/// Strategy for a single operation, weighted toward allocation.
pub fn ledger_op_strategy() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        3 => Just(LedgerOp::Begin),
        2 => any::<usize>().prop_map(LedgerOp::Commit),
        2 => any::<usize>().prop_map(LedgerOp::Abort),
        2 => any::<usize>().prop_map(LedgerOp::Query),
    ]
}

/// Strategy for a sequence of up to `max_len` operations.
pub fn ledger_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
    prop::collection::vec(ledger_op_strategy(), 0..=max_len)
}

/// Reference model of a ledger: status of XID `n` at index `n - 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerModel {
    statuses: Vec<XidStatus>,
}

impl LedgerModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the modelled status of every allocated XID.
    pub fn statuses(&self) -> &[XidStatus] {
        &self.statuses
    }

    /// Returns the highest allocated XID.
    pub fn last_xid(&self) -> Xid {
        Xid::new(self.statuses.len() as u64)
    }

    /// Returns the modelled on-disk body.
    pub fn body(&self) -> Vec<u8> {
        self.statuses.iter().map(|s| s.as_byte()).collect()
    }

    fn active_xid(&self, index: usize) -> Option<Xid> {
        let active: Vec<usize> = self
            .statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == XidStatus::Active)
            .map(|(i, _)| i)
            .collect();
        if active.is_empty() {
            return None;
        }
        Some(Xid::new(active[index % active.len()] as u64 + 1))
    }

    fn allocated_xid(&self, index: usize) -> Option<Xid> {
        if self.statuses.is_empty() {
            return None;
        }
        Some(Xid::new((index % self.statuses.len()) as u64 + 1))
    }

    /// Applies `op` to both the ledger and the model.
    ///
    /// Returns `Ok(false)` if the ledger disagreed with the model.
    /// Operations with no valid target are skipped.
    pub fn apply(&mut self, tm: &TransactionManager, op: LedgerOp) -> CoreResult<bool> {
        match op {
            LedgerOp::Begin => {
                let xid = tm.begin()?;
                self.statuses.push(XidStatus::Active);
                Ok(xid == self.last_xid())
            }
            LedgerOp::Commit(index) => self.transition(tm, index, XidStatus::Committed),
            LedgerOp::Abort(index) => self.transition(tm, index, XidStatus::Aborted),
            LedgerOp::Query(index) => match self.allocated_xid(index) {
                Some(xid) => self.agrees(tm, xid),
                None => Ok(true),
            },
        }
    }

    fn transition(
        &mut self,
        tm: &TransactionManager,
        index: usize,
        status: XidStatus,
    ) -> CoreResult<bool> {
        let Some(xid) = self.active_xid(index) else {
            return Ok(true);
        };
        match status {
            XidStatus::Committed => tm.commit(xid)?,
            XidStatus::Aborted => tm.abort(xid)?,
            XidStatus::Active => unreachable!("transitions are terminal"),
        }
        self.statuses[xid.as_u64() as usize - 1] = status;
        self.agrees(tm, xid)
    }

    /// Checks every predicate for `xid` against the model.
    pub fn agrees(&self, tm: &TransactionManager, xid: Xid) -> CoreResult<bool> {
        let expected = self.statuses[xid.as_u64() as usize - 1];
        Ok(tm.status(xid)? == Some(expected)
            && tm.is_active(xid)? == (expected == XidStatus::Active)
            && tm.is_committed(xid)? == (expected == XidStatus::Committed)
            && tm.is_aborted(xid)? == (expected == XidStatus::Aborted))
    }
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestLedger;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn ops_respect_length(ops in ledger_ops_strategy(20)) {
            prop_assert!(ops.len() <= 20);
        }

        #[test]
        fn model_tracks_ledger(ops in ledger_ops_strategy(40)) {
            let ledger = TestLedger::memory();
            let mut model = LedgerModel::new();

            for op in ops {
                prop_assert!(model.apply(&ledger, op).unwrap(), "diverged on {:?}", op);
            }
            prop_assert_eq!(ledger.last_xid(), model.last_xid());
        }
    }

    #[test]
    fn empty_model_skips_targeted_ops() {
        let ledger = TestLedger::memory();
        let mut model = LedgerModel::new();

        assert!(model.apply(&ledger, LedgerOp::Commit(3)).unwrap());
        assert!(model.apply(&ledger, LedgerOp::Query(0)).unwrap());
        assert_eq!(ledger.last_xid(), Xid::SUPER);
    }
}
