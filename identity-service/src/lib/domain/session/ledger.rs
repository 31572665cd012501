use std::sync::Arc;

use auth::Clock;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::RefreshLedgerError;
use crate::domain::session::models::RefreshRejection;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::subject::models::SubjectId;

/// Server-side registry of issued refresh tokens.
///
/// A refresh token is exchangeable only while its record is present,
/// unrevoked and unexpired. Rotation revokes the presented record and
/// registers its successor in one step, so replaying an old token fails.
pub struct RefreshLedger<RR>
where
    RR: RefreshTokenRepository,
{
    repository: Arc<RR>,
    clock: Arc<dyn Clock>,
}

impl<RR> RefreshLedger<RR>
where
    RR: RefreshTokenRepository,
{
    pub fn new(repository: Arc<RR>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Register a freshly issued refresh token.
    pub async fn record(
        &self,
        subject_id: SubjectId,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RefreshLedgerError> {
        let record = RefreshTokenRecord::new(subject_id, jti, expires_at, self.clock.now());
        self.repository.insert(record).await
    }

    /// Exchange `old_jti` for `new_jti`.
    ///
    /// # Errors
    /// * `ReusedOrUnknown` - `old_jti` was already rotated, revoked, expired,
    ///   never issued or belongs to another subject
    /// * `DatabaseError` - Database operation failed
    pub async fn rotate(
        &self,
        subject_id: SubjectId,
        old_jti: &str,
        new_jti: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<(), RefreshLedgerError> {
        let now = self.clock.now();
        let replacement = RefreshTokenRecord::new(subject_id, new_jti, new_expires_at, now);

        match self.repository.rotate(old_jti, replacement, now).await {
            Err(RefreshLedgerError::ReusedOrUnknown) => {
                self.audit_rejection(subject_id, old_jti, now).await;
                Err(RefreshLedgerError::ReusedOrUnknown)
            }
            other => other,
        }
    }

    /// Look up why a rotation was refused and log it.
    ///
    /// A token exchanged a second time is the theft signal and is logged at
    /// warn level together with the jti that superseded it.
    async fn audit_rejection(
        &self,
        subject_id: SubjectId,
        old_jti: &str,
        now: DateTime<Utc>,
    ) -> Option<RefreshRejection> {
        let rejection = match self.repository.find_by_jti(old_jti).await {
            Ok(Some(record)) => record.rejection(subject_id, now)?,
            Ok(None) => RefreshRejection::Unknown,
            Err(e) => {
                tracing::error!(subject_id = %subject_id, jti = %old_jti, error = %e, "Failed to look up rejected refresh token");
                return None;
            }
        };

        match &rejection {
            RefreshRejection::Replayed { replaced_by } => tracing::warn!(
                subject_id = %subject_id,
                jti = %old_jti,
                replaced_by = %replaced_by,
                "Refresh token replayed after rotation, possible refresh token theft"
            ),
            RefreshRejection::ForeignSubject => tracing::warn!(
                subject_id = %subject_id,
                jti = %old_jti,
                "Refresh token presented for another subject"
            ),
            RefreshRejection::Unknown => tracing::warn!(
                subject_id = %subject_id,
                jti = %old_jti,
                "Unknown refresh token presented"
            ),
            RefreshRejection::Revoked => {
                tracing::info!(subject_id = %subject_id, jti = %old_jti, "Revoked refresh token presented")
            }
            RefreshRejection::Expired => {
                tracing::debug!(subject_id = %subject_id, jti = %old_jti, "Expired refresh token presented")
            }
        }

        Some(rejection)
    }

    /// Revoke one token. Unknown or already revoked tokens are ignored.
    pub async fn revoke(&self, jti: &str) -> Result<(), RefreshLedgerError> {
        let changed = self.repository.revoke(jti, self.clock.now()).await?;
        if !changed {
            tracing::debug!(jti = %jti, "Revoke had no effect");
        }
        Ok(())
    }

    /// Revoke every active refresh token of a subject.
    ///
    /// # Returns
    /// Number of tokens revoked
    pub async fn revoke_all(&self, subject_id: &SubjectId) -> Result<u64, RefreshLedgerError> {
        let revoked = self
            .repository
            .revoke_all_for_subject(subject_id, self.clock.now())
            .await?;

        tracing::info!(subject_id = %subject_id, revoked, "Revoked all refresh tokens");
        Ok(revoked)
    }

    /// Delete records that expired more than `grace` ago.
    pub async fn prune_expired(&self, grace: chrono::Duration) -> Result<u64, RefreshLedgerError> {
        self.repository
            .delete_expired_before(self.clock.now() - grace)
            .await
    }
}
