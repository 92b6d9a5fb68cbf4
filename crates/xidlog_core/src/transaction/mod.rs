//! Transaction lifecycle ledger.
//!
//! The ledger hands out XIDs and records, per XID, whether the transaction
//! is active, committed, or aborted. Every state change is forced to
//! stable storage before the call returns.

mod manager;
mod state;

pub use manager::TransactionManager;
pub use state::XidStatus;
