use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Kind of token, carried in the `typ` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by access and refresh tokens.
///
/// `sub`, `jti`, `iat`, `exp` and `typ` are mandatory: a token missing any of
/// them fails to deserialize. `role` is present on access tokens only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject identifier
    pub sub: String,

    /// Subject role at issuance time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Unique token identifier
    pub jti: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Token kind
    pub typ: TokenKind,
}

impl Claims {
    /// Build access-token claims.
    pub fn access(
        sub: impl ToString,
        role: impl ToString,
        jti: impl ToString,
        iat: i64,
        exp: i64,
    ) -> Self {
        Self {
            sub: sub.to_string(),
            role: Some(role.to_string()),
            jti: jti.to_string(),
            iat,
            exp,
            typ: TokenKind::Access,
        }
    }

    /// Build refresh-token claims.
    pub fn refresh(sub: impl ToString, jti: impl ToString, iat: i64, exp: i64) -> Self {
        Self {
            sub: sub.to_string(),
            role: None,
            jti: jti.to_string(),
            iat,
            exp,
            typ: TokenKind::Refresh,
        }
    }

    /// Check if token is expired at `current_timestamp`.
    ///
    /// A token is valid only while `exp > now`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}
