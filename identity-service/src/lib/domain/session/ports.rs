use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::RefreshLedgerError;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::subject::models::SubjectId;

/// Persistence operations for refresh token records.
///
/// Implementations must enforce `rotate` atomically in the store itself
/// (conditional update inside a transaction), since several service
/// instances may rotate the same jti concurrently.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    /// Insert a new active record.
    ///
    /// # Errors
    /// * `DuplicateJti` - A record with this jti already exists
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), RefreshLedgerError>;

    /// Retrieve a record by jti.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_jti(&self, jti: &str) -> Result<Option<RefreshTokenRecord>, RefreshLedgerError>;

    /// Revoke `old_jti` and insert `replacement` in one transaction.
    ///
    /// Succeeds only if the record for `old_jti` exists, belongs to
    /// `replacement.subject_id`, is not revoked and has `expires_at > now`.
    /// Of several concurrent calls for the same `old_jti` at most one succeeds.
    ///
    /// # Errors
    /// * `ReusedOrUnknown` - Record missing, revoked, expired or owned by another subject
    /// * `DatabaseError` - Database operation failed
    async fn rotate(
        &self,
        old_jti: &str,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<(), RefreshLedgerError>;

    /// Revoke one record. Revoking an already revoked or unknown jti is not an error.
    ///
    /// # Returns
    /// Whether a record changed state
    async fn revoke(&self, jti: &str, now: DateTime<Utc>) -> Result<bool, RefreshLedgerError>;

    /// Revoke every active record of a subject in one statement.
    ///
    /// # Returns
    /// Number of records revoked
    async fn revoke_all_for_subject(
        &self,
        subject_id: &SubjectId,
        now: DateTime<Utc>,
    ) -> Result<u64, RefreshLedgerError>;

    /// Delete records that expired before `cutoff`.
    ///
    /// # Returns
    /// Number of records deleted
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RefreshLedgerError>;
}
