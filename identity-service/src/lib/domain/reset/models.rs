use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::subject::models::SubjectId;

/// Persisted password reset token. Only the SHA-256 digest of the raw token
/// is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetTokenRecord {
    pub id: Uuid,
    pub subject_id: SubjectId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetTokenRecord {
    pub fn new(
        subject_id: SubjectId,
        token_hash: String,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            token_hash,
            expires_at,
            used: false,
            used_at: None,
            created_at,
        }
    }
}

/// Result of redeeming a reset token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetOutcome {
    pub subject_id: SubjectId,
    pub sessions_revoked: u64,
}
