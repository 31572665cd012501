use async_trait::async_trait;

use crate::domain::credential::errors::CredentialError;
use crate::domain::credential::models::Credential;
use crate::domain::subject::models::SubjectId;

/// Persistence operations for password credentials.
#[async_trait]
pub trait CredentialRepository: Send + Sync + 'static {
    /// Store a credential, replacing any prior hash for the same subject.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn upsert(&self, credential: Credential) -> Result<(), CredentialError>;

    /// Retrieve the credential for a subject.
    ///
    /// # Returns
    /// Optional credential (None if the subject has none)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find(&self, subject_id: &SubjectId) -> Result<Option<Credential>, CredentialError>;
}
