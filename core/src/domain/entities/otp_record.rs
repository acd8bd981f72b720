//! Passcode ledger entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Length of an issued passcode
pub const CODE_LENGTH: usize = 5;

/// Lifetime of a passcode from the moment it is issued (5 minutes)
pub const OTP_TTL_MINUTES: i64 = 5;

/// Internal numeric key of a user in the identity store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(u64);

impl UserKey {
    pub const fn new(key: u64) -> Self {
        Self(key)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a passcode
///
/// Stored as a small integer: `0` unused, `1` used, `2` expired.
/// `Used` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpStatus {
    Unused,
    Used,
    Expired,
}

impl OtpStatus {
    /// Storage encoding of the status
    pub const fn as_i8(self) -> i8 {
        match self {
            OtpStatus::Unused => 0,
            OtpStatus::Used => 1,
            OtpStatus::Expired => 2,
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, OtpStatus::Unused)
    }

    /// Move to `next`, refusing anything but `Unused -> Used` and `Unused -> Expired`
    pub fn transition(self, next: OtpStatus) -> Result<OtpStatus, StatusTransitionError> {
        match (self, next) {
            (OtpStatus::Unused, OtpStatus::Used) | (OtpStatus::Unused, OtpStatus::Expired) => {
                Ok(next)
            }
            (from, to) => Err(StatusTransitionError { from, to }),
        }
    }
}

impl TryFrom<i8> for OtpStatus {
    type Error = UnknownStatusError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OtpStatus::Unused),
            1 => Ok(OtpStatus::Used),
            2 => Ok(OtpStatus::Expired),
            other => Err(UnknownStatusError(other)),
        }
    }
}

impl fmt::Display for OtpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtpStatus::Unused => write!(f, "unused"),
            OtpStatus::Used => write!(f, "used"),
            OtpStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Rejected status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal otp status transition: {from} -> {to}")]
pub struct StatusTransitionError {
    pub from: OtpStatus,
    pub to: OtpStatus,
}

/// Stored status value outside the known encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown otp status value: {0}")]
pub struct UnknownStatusError(pub i8);

/// One issued passcode as recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Ledger-assigned identifier
    pub id: u64,

    /// Owner of the passcode
    pub user_key: UserKey,

    /// The numeric passcode
    pub code: String,

    /// Caller-supplied correlation id of the issuing request
    pub request_id: String,

    pub status: OtpStatus,

    /// Instant after which the passcode can no longer be consumed
    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Create a fresh `Unused` record issued at `now`
    pub fn new(
        id: u64,
        user_key: UserKey,
        code: impl Into<String>,
        request_id: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id,
            user_key,
            code: code.into(),
            request_id: request_id.into(),
            status: OtpStatus::Unused,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    pub fn is_unused(&self) -> bool {
        self.status == OtpStatus::Unused
    }

    pub fn mark_used(&mut self) -> Result<(), StatusTransitionError> {
        self.status = self.status.transition(OtpStatus::Used)?;
        Ok(())
    }

    pub fn mark_expired(&mut self) -> Result<(), StatusTransitionError> {
        self.status = self.status.transition(OtpStatus::Expired)?;
        Ok(())
    }
}
