//! OTP route handlers
//!
//! - `POST /otp/request` issues a passcode for a user
//! - `POST /otp/validate` consumes a passcode

pub mod request_otp;
pub mod validate_otp;

use std::future::Future;
use std::time::Duration;

use otp_core::errors::{DomainError, DomainResult};

/// Run a service call under the request deadline
///
/// An elapsed deadline is reported as a store failure; dropping the call
/// rolls back any open ledger transaction.
pub(crate) async fn with_deadline<T>(
    deadline: Duration,
    call: impl Future<Output = DomainResult<T>>,
) -> DomainResult<T> {
    tokio::time::timeout(deadline, call)
        .await
        .unwrap_or_else(|_| {
            Err(DomainError::Store {
                message: format!("request deadline of {}ms exceeded", deadline.as_millis()),
            })
        })
}
