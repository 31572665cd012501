use std::sync::Arc;

use auth::Clock;
use auth::PasswordHasher;
use auth::PasswordPolicy;

use crate::domain::credential::errors::CredentialError;
use crate::domain::credential::models::Credential;
use crate::domain::credential::models::HashedPassword;
use crate::domain::credential::ports::CredentialRepository;
use crate::domain::subject::models::SubjectId;

/// Valid Argon2id hash of no known password, verified against when a subject
/// has no credential so both branches do the same work.
const DECOY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzYWx0$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Password credential store.
///
/// Validates password strength, hashes with Argon2id and verifies candidates
/// without revealing whether the subject exists.
pub struct CredentialStore<CR>
where
    CR: CredentialRepository,
{
    repository: Arc<CR>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    clock: Arc<dyn Clock>,
}

impl<CR> CredentialStore<CR>
where
    CR: CredentialRepository,
{
    pub fn new(repository: Arc<CR>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            hasher: PasswordHasher::new(),
            policy: PasswordPolicy::default(),
            clock,
        }
    }

    /// Replace the default hasher (e.g. cheaper parameters in tests).
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Check the policy and hash `plaintext` for a subject not yet known.
    ///
    /// # Errors
    /// * `WeakPassword` - Password fails the strength policy
    /// * `HashingFailed` - Argon2 hashing failed
    pub fn hash_password(&self, plaintext: &str) -> Result<HashedPassword, CredentialError> {
        self.policy.check(plaintext)?;

        let password_hash = self
            .hasher
            .hash(plaintext)
            .map_err(|e| CredentialError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            password_hash,
            hash_scheme: self.hasher.scheme().to_string(),
        })
    }

    /// Check the policy and hash `plaintext` without persisting anything.
    pub fn prepare(
        &self,
        subject_id: SubjectId,
        plaintext: &str,
    ) -> Result<Credential, CredentialError> {
        Ok(self
            .hash_password(plaintext)?
            .bind(subject_id, self.clock.now()))
    }

    /// Persist a prepared credential.
    pub async fn store(&self, credential: Credential) -> Result<(), CredentialError> {
        self.repository.upsert(credential).await
    }

    /// Validate, hash and store a new password, replacing any prior hash.
    ///
    /// # Errors
    /// * `WeakPassword` - Password fails the strength policy
    /// * `HashingFailed` - Argon2 hashing failed
    /// * `DatabaseError` - Database operation failed
    pub async fn set_password(
        &self,
        subject_id: SubjectId,
        plaintext: &str,
    ) -> Result<(), CredentialError> {
        let credential = self.prepare(subject_id, plaintext)?;
        self.store(credential).await?;

        tracing::debug!(subject_id = %subject_id, "Password updated");
        Ok(())
    }

    /// Verify a candidate password.
    ///
    /// Returns false for a wrong password and for a subject without a
    /// credential alike.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    pub async fn verify_password(
        &self,
        subject_id: &SubjectId,
        plaintext: &str,
    ) -> Result<bool, CredentialError> {
        match self.repository.find(subject_id).await? {
            Some(credential) => Ok(self.check(plaintext, &credential.password_hash)),
            None => {
                self.check(plaintext, DECOY_HASH);
                Ok(false)
            }
        }
    }

    /// Burn the same verification cost as a real check, for callers that
    /// could not even resolve a subject.
    pub fn verify_decoy(&self, plaintext: &str) {
        self.check(plaintext, DECOY_HASH);
    }

    fn check(&self, plaintext: &str, hash: &str) -> bool {
        match self.hasher.verify(plaintext, hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }
}
