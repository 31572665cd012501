use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::subject::models::SubjectId;

/// Persisted record of an issued refresh token.
///
/// Records are never updated except to revoke them, and never deleted
/// before they expire, so a replayed jti can always be told apart from an
/// unknown one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub subject_id: SubjectId,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    /// jti of the token that superseded this one under rotation
    pub replaced_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// New active record.
    pub fn new(
        subject_id: SubjectId,
        jti: impl Into<String>,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            jti: jti.into(),
            expires_at,
            revoked: false,
            revoked_at: None,
            replaced_by: None,
            created_at,
        }
    }

    /// Whether this record can still be exchanged at `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }

    /// Why presenting this record for rotation by `presenter` at `now` was
    /// refused. `None` when the record was in fact usable.
    pub fn rejection(&self, presenter: SubjectId, now: DateTime<Utc>) -> Option<RefreshRejection> {
        if self.subject_id != presenter {
            return Some(RefreshRejection::ForeignSubject);
        }
        if let Some(replaced_by) = &self.replaced_by {
            return Some(RefreshRejection::Replayed {
                replaced_by: replaced_by.clone(),
            });
        }
        if self.revoked {
            return Some(RefreshRejection::Revoked);
        }
        if self.expires_at <= now {
            return Some(RefreshRejection::Expired);
        }
        None
    }
}

/// Cause of a refused refresh token rotation, for audit logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshRejection {
    /// Token was already exchanged once.
    Replayed { replaced_by: String },
    Revoked,
    Expired,
    ForeignSubject,
    Unknown,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_is_usable() {
        let now = Utc::now();
        let mut record = RefreshTokenRecord::new(SubjectId::new(), "jti", now + Duration::days(1), now);

        assert!(record.is_usable(now));
        assert!(!record.is_usable(now + Duration::days(1)));

        record.revoked = true;
        assert!(!record.is_usable(now));
    }

    #[test]
    fn test_rejection_prefers_replay_over_revocation() {
        let now = Utc::now();
        let owner = SubjectId::new();
        let mut record = RefreshTokenRecord::new(owner, "jti", now + Duration::days(1), now);
        assert_eq!(record.rejection(owner, now), None);

        record.revoked = true;
        assert_eq!(record.rejection(owner, now), Some(RefreshRejection::Revoked));

        record.replaced_by = Some("next".to_string());
        assert_eq!(
            record.rejection(owner, now),
            Some(RefreshRejection::Replayed {
                replaced_by: "next".to_string()
            })
        );
        assert_eq!(
            record.rejection(SubjectId::new(), now),
            Some(RefreshRejection::ForeignSubject)
        );
    }

    #[test]
    fn test_rejection_for_expired_record() {
        let now = Utc::now();
        let owner = SubjectId::new();
        let record = RefreshTokenRecord::new(owner, "jti", now, now - Duration::days(30));
        assert_eq!(record.rejection(owner, now), Some(RefreshRejection::Expired));
    }
}
