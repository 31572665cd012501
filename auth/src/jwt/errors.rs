use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    /// Signature, structure or claim set is not acceptable.
    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    /// Signature is valid but `exp` is not after the current time.
    #[error("Token is expired")]
    TokenExpired,

    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    #[error("Unexpected token kind: expected {expected}, got {actual}")]
    WrongKind { expected: String, actual: String },
}

impl JwtError {
    /// Whether the token failed only because it outlived its TTL.
    pub fn is_expired(&self) -> bool {
        matches!(self, JwtError::TokenExpired)
    }
}
