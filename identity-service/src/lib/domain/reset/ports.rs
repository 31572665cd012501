use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::credential::models::HashedPassword;
use crate::domain::reset::errors::ResetLedgerError;
use crate::domain::reset::models::PasswordResetTokenRecord;
use crate::domain::reset::models::ResetOutcome;
use crate::domain::subject::models::SubjectId;

/// Persistence operations for password reset tokens.
#[async_trait]
pub trait PasswordResetRepository: Send + Sync + 'static {
    /// Store a new unused token record.
    async fn insert(&self, record: PasswordResetTokenRecord) -> Result<(), ResetLedgerError>;

    /// Redeem the token with `token_hash` and, in the same transaction,
    /// store `password` as the owner's credential and revoke every refresh
    /// token of the owner.
    ///
    /// When `subject_hint` is given, the token must also belong to that
    /// subject. Of several concurrent calls for the same token at most one
    /// succeeds. On any error nothing is written.
    ///
    /// # Errors
    /// * `NotFound` - No token with this hash (or owned by another subject)
    /// * `AlreadyUsed` - Token was consumed before
    /// * `Expired` - `expires_at <= now`
    /// * `DatabaseError` - Database operation failed
    async fn consume_and_reset(
        &self,
        token_hash: &str,
        subject_hint: Option<SubjectId>,
        password: HashedPassword,
        now: DateTime<Utc>,
    ) -> Result<ResetOutcome, ResetLedgerError>;

    /// Delete tokens that expired before `cutoff`.
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ResetLedgerError>;
}
