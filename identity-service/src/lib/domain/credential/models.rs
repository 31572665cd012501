use std::fmt;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::subject::models::SubjectId;

/// Stored password hash for one subject.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub subject_id: SubjectId,
    pub password_hash: String,
    pub hash_scheme: String,
    pub updated_at: DateTime<Utc>,
}

// Keeps the hash out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("subject_id", &self.subject_id)
            .field("password_hash", &"<redacted>")
            .field("hash_scheme", &self.hash_scheme)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Password hash not yet bound to a subject.
///
/// Produced before the owning subject is known, e.g. ahead of redeeming a
/// reset token.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub password_hash: String,
    pub hash_scheme: String,
}

impl HashedPassword {
    pub fn bind(self, subject_id: SubjectId, updated_at: DateTime<Utc>) -> Credential {
        Credential {
            subject_id,
            password_hash: self.password_hash,
            hash_scheme: self.hash_scheme,
            updated_at,
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("password_hash", &"<redacted>")
            .field("hash_scheme", &self.hash_scheme)
            .finish()
    }
}
