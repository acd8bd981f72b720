//! OTP lifecycle service implementation

use std::sync::Arc;
use tracing::Span;

use crate::domain::entities::UserKey;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{IdentityRepository, OtpLedgerRepository};

use super::config::OtpServiceConfig;
use super::generator::OtpGenerator;

/// Issues and validates passcodes for users known to the identity store
///
/// The service holds no passcode state of its own; every state change goes
/// through the ledger repository.
pub struct OtpService<I, L, G>
where
    I: IdentityRepository,
    L: OtpLedgerRepository,
    G: OtpGenerator,
{
    /// Public id to user key lookup
    identity_repository: Arc<I>,
    /// Durable passcode state
    ledger_repository: Arc<L>,
    /// Passcode source
    generator: Arc<G>,
    /// Service configuration
    config: OtpServiceConfig,
    /// Parent of every event this service emits
    span: Span,
}

impl<I, L, G> OtpService<I, L, G>
where
    I: IdentityRepository,
    L: OtpLedgerRepository,
    G: OtpGenerator,
{
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `identity_repository` - Identity lookup implementation
    /// * `ledger_repository` - Ledger store implementation
    /// * `generator` - Passcode generator
    /// * `config` - Service configuration
    /// * `span` - Logging context; pass `Span::none()` to stay silent
    pub fn new(
        identity_repository: Arc<I>,
        ledger_repository: Arc<L>,
        generator: Arc<G>,
        config: OtpServiceConfig,
        span: Span,
    ) -> Self {
        Self {
            identity_repository,
            ledger_repository,
            generator,
            config,
            span,
        }
    }

    /// Issue a new passcode for a user
    ///
    /// This method:
    /// 1. Resolves the public user id to the internal key
    /// 2. Generates a passcode of the configured length
    /// 3. Asks the ledger to record it, unless a live passcode exists
    ///
    /// The ledger is only touched once the first two steps succeed.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The newly issued passcode
    /// * `Err(DomainError)` - `IdentityNotFound`, `Generation`,
    ///   `Otp(OtpError::AlreadyActive)` or `Store`
    pub async fn generate_otp(&self, public_user_id: &str, request_id: &str) -> DomainResult<String> {
        let user_key = self.resolve(public_user_id, request_id).await?;

        let code = self.generator.generate(self.config.code_length).map_err(|e| {
            tracing::error!(
                parent: &self.span,
                user_key = %user_key,
                request_id = request_id,
                error = %e,
                event = "otp_generation_failed",
                "Failed to generate OTP"
            );
            e
        })?;

        match self
            .ledger_repository
            .issue_or_reject(user_key, &code, request_id)
            .await
        {
            Ok(record) => {
                tracing::info!(
                    parent: &self.span,
                    user_key = %user_key,
                    request_id = request_id,
                    otp_id = record.id,
                    expires_at = %record.expires_at,
                    event = "otp_issued",
                    "Issued new OTP"
                );
                Ok(record.code)
            }
            Err(e) => {
                self.log_ledger_failure(&e, user_key, request_id, "issue");
                Err(e)
            }
        }
    }

    /// Validate and consume a passcode
    ///
    /// The `request_id` only correlates log events; it is not compared with
    /// the id recorded at issuance.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The passcode was valid and is now used
    /// * `Err(DomainError)` - `IdentityNotFound`, `Otp(OtpError::Invalid)`,
    ///   `Otp(OtpError::Expired)` or `Store`
    pub async fn validate_otp(
        &self,
        public_user_id: &str,
        code: &str,
        request_id: &str,
    ) -> DomainResult<()> {
        let user_key = self.resolve(public_user_id, request_id).await?;

        match self.ledger_repository.consume(user_key, code).await {
            Ok(()) => {
                tracing::info!(
                    parent: &self.span,
                    user_key = %user_key,
                    request_id = request_id,
                    event = "otp_consumed",
                    "OTP validated"
                );
                Ok(())
            }
            Err(e) => {
                self.log_ledger_failure(&e, user_key, request_id, "consume");
                Err(e)
            }
        }
    }

    async fn resolve(&self, public_user_id: &str, request_id: &str) -> DomainResult<UserKey> {
        self.identity_repository
            .resolve(public_user_id)
            .await
            .map_err(|e| {
                match &e {
                    DomainError::IdentityNotFound => tracing::warn!(
                        parent: &self.span,
                        user_id = public_user_id,
                        request_id = request_id,
                        event = "identity_not_found",
                        "Unknown user id"
                    ),
                    other => tracing::error!(
                        parent: &self.span,
                        user_id = public_user_id,
                        request_id = request_id,
                        error = %other,
                        event = "identity_lookup_failed",
                        "Failed to resolve user id"
                    ),
                }
                e
            })
    }

    fn log_ledger_failure(
        &self,
        error: &DomainError,
        user_key: UserKey,
        request_id: &str,
        operation: &'static str,
    ) {
        if error.is_client_error() {
            tracing::warn!(
                parent: &self.span,
                user_key = %user_key,
                request_id = request_id,
                operation = operation,
                outcome = %error,
                event = "otp_rejected",
                "OTP request rejected"
            );
        } else {
            tracing::error!(
                parent: &self.span,
                user_key = %user_key,
                request_id = request_id,
                operation = operation,
                error = %error,
                event = "otp_ledger_failed",
                "OTP ledger operation failed"
            );
        }
    }
}
