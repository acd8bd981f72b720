//! Ledger decisions taken inside an issue or consume transaction.
//!
//! Both ledger implementations (in-memory and MySQL) lock the relevant rows,
//! feed them to these functions, and then apply the returned decision. The
//! two expiry comparisons differ on purpose:
//!
//! - issuance treats a record as live only while `expires_at > now`, so a
//!   record expiring exactly now is stale and gets replaced;
//! - consumption rejects only once `expires_at < now`, so a passcode
//!   presented exactly at its expiry instant is still accepted.
//!
//! An expired match found during consumption stays `Unused`; the next issue
//! for that user retires it.

use chrono::{DateTime, Utc};

use crate::domain::entities::OtpRecord;

/// The columns of a locked ledger row that decisions depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedOtp {
    pub id: u64,
    pub expires_at: DateTime<Utc>,
}

impl From<&OtpRecord> for LockedOtp {
    fn from(record: &OtpRecord) -> Self {
        Self {
            id: record.id,
            expires_at: record.expires_at,
        }
    }
}

/// Outcome of looking at a user's current `Unused` record before issuing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueDecision {
    /// No unused record exists; insert the new one
    Insert,
    /// The unused record has lapsed; mark it expired, then insert
    RetireAndInsert { stale_id: u64 },
    /// A live unused record exists; nothing changes
    RejectActive,
}

impl IssueDecision {
    pub fn decide(unused: Option<LockedOtp>, now: DateTime<Utc>) -> Self {
        match unused {
            None => IssueDecision::Insert,
            Some(otp) if otp.expires_at > now => IssueDecision::RejectActive,
            Some(otp) => IssueDecision::RetireAndInsert { stale_id: otp.id },
        }
    }
}

/// Outcome of looking up an `Unused` record matching a presented code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeDecision {
    /// Nothing matched; wrong code, already used, or no record at all
    Invalid,
    /// The match has lapsed; report expiry and leave the record untouched
    Expired { id: u64 },
    /// The match is valid; mark it used
    MarkUsed { id: u64 },
}

impl ConsumeDecision {
    pub fn decide(matched: Option<LockedOtp>, now: DateTime<Utc>) -> Self {
        match matched {
            None => ConsumeDecision::Invalid,
            Some(otp) if otp.expires_at < now => ConsumeDecision::Expired { id: otp.id },
            Some(otp) => ConsumeDecision::MarkUsed { id: otp.id },
        }
    }
}
