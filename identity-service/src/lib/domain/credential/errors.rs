use auth::PasswordPolicyError;
use thiserror::Error;

/// Error for credential operations
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    #[error("Weak password: {0}")]
    WeakPassword(#[from] PasswordPolicyError),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
