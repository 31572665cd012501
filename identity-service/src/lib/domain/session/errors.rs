use thiserror::Error;

/// Error for refresh ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshLedgerError {
    /// The presented jti is unknown, revoked or expired.
    #[error("Refresh token reused or unknown")]
    ReusedOrUnknown,

    #[error("Duplicate refresh token id: {0}")]
    DuplicateJti(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
