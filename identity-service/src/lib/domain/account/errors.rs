use auth::JwtError;
use auth::PasswordPolicyError;
use thiserror::Error;

use crate::domain::credential::errors::CredentialError;
use crate::domain::reset::errors::ResetLedgerError;
use crate::domain::session::errors::RefreshLedgerError;
use crate::domain::subject::errors::SubjectError;

/// Error returned by the auth orchestrator.
///
/// Authentication failures stay coarse (`InvalidCredentials`) towards the
/// caller. Token failures keep their precise kind so adapters can log them
/// apart before collapsing them into "unauthenticated".
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Weak password: {0}")]
    WeakPassword(PasswordPolicyError),

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Refresh token reused or unknown")]
    TokenReusedOrUnknown,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Token already used")]
    TokenAlreadyUsed,

    /// A password reset token outlived its TTL. Kept apart from
    /// `TokenExpired`, which means an expired JWT.
    #[error("Reset token expired")]
    ResetTokenExpired,

    #[error("Forbidden: {0}")]
    Authorization(String),

    #[error("Email delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error for email dispatch
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("Failed to serialize email: {0}")]
    SerializationFailed(String),

    #[error("Failed to publish email to broker: {0}")]
    PublishFailed(String),

    #[error("Email dispatch timed out")]
    Timeout,
}

impl From<SubjectError> for AuthError {
    fn from(err: SubjectError) -> Self {
        match err {
            SubjectError::UsernameAlreadyExists(username) => {
                AuthError::Conflict(format!("Username already exists: {}", username))
            }
            SubjectError::EmailAlreadyExists(email) => {
                AuthError::Conflict(format!("Email already exists: {}", email))
            }
            SubjectError::NotFound(id) => AuthError::NotFound(format!("Subject {}", id)),
            SubjectError::InvalidSubjectId(_)
            | SubjectError::InvalidUsername(_)
            | SubjectError::InvalidEmail(_)
            | SubjectError::InvalidRole(_) => AuthError::Validation(err.to_string()),
            SubjectError::DatabaseError(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::WeakPassword(policy) => AuthError::WeakPassword(policy),
            CredentialError::HashingFailed(msg) | CredentialError::DatabaseError(msg) => {
                AuthError::Internal(msg)
            }
        }
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::WeakPassword(err)
    }
}

impl From<RefreshLedgerError> for AuthError {
    fn from(err: RefreshLedgerError) -> Self {
        match err {
            RefreshLedgerError::ReusedOrUnknown => AuthError::TokenReusedOrUnknown,
            RefreshLedgerError::DuplicateJti(_) | RefreshLedgerError::DatabaseError(_) => {
                AuthError::Internal(err.to_string())
            }
        }
    }
}

impl From<ResetLedgerError> for AuthError {
    fn from(err: ResetLedgerError) -> Self {
        match err {
            ResetLedgerError::NotFound => AuthError::TokenNotFound,
            ResetLedgerError::Expired => AuthError::ResetTokenExpired,
            ResetLedgerError::AlreadyUsed => AuthError::TokenAlreadyUsed,
            ResetLedgerError::DatabaseError(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::EncodingFailed(msg) => AuthError::Internal(msg),
            JwtError::InvalidToken(_) | JwtError::MissingClaim(_) | JwtError::WrongKind { .. } => {
                AuthError::TokenInvalid(err.to_string())
            }
        }
    }
}
