use thiserror::Error;

/// Error for password reset token operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResetLedgerError {
    #[error("Reset token not found")]
    NotFound,

    #[error("Reset token expired")]
    Expired,

    #[error("Reset token already used")]
    AlreadyUsed,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
