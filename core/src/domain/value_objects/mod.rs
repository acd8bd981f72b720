//! Value objects representing immutable domain concepts.

pub mod ledger_decision;

// Re-export commonly used types
pub use ledger_decision::{ConsumeDecision, IssueDecision, LockedOtp};
