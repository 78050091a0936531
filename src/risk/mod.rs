//! Risk ledger: the engine's only mutable state
//!
//! [`RiskLedger`] is a plain owned value with `&mut` methods. Wrap it in a
//! [`SharedLedger`] when decisions run on more than one task.

mod ledger;
mod shared;

pub use ledger::{DenyReason, LedgerSnapshot, PortfolioState, Position, RiskLedger, TradeGate};
pub use shared::{Admission, SharedLedger};
