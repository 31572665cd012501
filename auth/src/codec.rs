use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenKind;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.claims.exp)
    }
}

/// Issues and verifies signed, time-bounded access and refresh tokens.
///
/// Access tokens are stateless: `verify` alone decides their validity.
/// Refresh tokens must additionally be checked against the refresh ledger by
/// the caller, using the `jti` returned here.
pub struct TokenCodec {
    jwt_handler: JwtHandler,
    clock: Arc<dyn Clock>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
    pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

    /// Create a codec with default lifetimes (15 minutes access, 30 days refresh).
    ///
    /// # Arguments
    /// * `secret` - HMAC secret for signing tokens
    /// * `clock` - Time source used for `iat`, `exp` and expiry checks
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            clock,
            access_ttl: Duration::minutes(Self::DEFAULT_ACCESS_TTL_MINUTES),
            refresh_ttl: Duration::days(Self::DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    /// Override the access token lifetime.
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Override the refresh token lifetime.
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue an access token for `subject` with `role`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_access_token(&self, subject: &str, role: &str) -> Result<IssuedToken, JwtError> {
        let now = self.clock.now().timestamp();
        let claims = Claims::access(
            subject,
            role,
            new_jti(),
            now,
            now + self.access_ttl.num_seconds(),
        );
        self.sign(claims)
    }

    /// Issue a refresh token for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_refresh_token(&self, subject: &str) -> Result<IssuedToken, JwtError> {
        let now = self.clock.now().timestamp();
        let claims = Claims::refresh(subject, new_jti(), now, now + self.refresh_ttl.num_seconds());
        self.sign(claims)
    }

    fn sign(&self, claims: Claims) -> Result<IssuedToken, JwtError> {
        let token = self.jwt_handler.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Verify a token's signature, shape, kind and expiry.
    ///
    /// # Errors
    /// * `InvalidToken` / `MissingClaim` - Bad signature or malformed claims
    /// * `WrongKind` - Token is not of `expected` kind
    /// * `TokenExpired` - Signature is valid but `exp <= now`
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.typ != expected {
            return Err(JwtError::WrongKind {
                expected: expected.to_string(),
                actual: claims.typ.to_string(),
            });
        }

        if claims.sub.is_empty() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }
        if claims.jti.is_empty() {
            return Err(JwtError::MissingClaim("jti".to_string()));
        }
        if expected == TokenKind::Access && claims.role.as_deref().map_or(true, str::is_empty) {
            return Err(JwtError::MissingClaim("role".to_string()));
        }

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}

fn new_jti() -> String {
    Uuid::new_v4().simple().to_string()
}

fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn codec_with_clock() -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let codec = TokenCodec::new(SECRET, clock.clone());
        (codec, clock)
    }

    #[test]
    fn test_access_token_round_trip() {
        let (codec, clock) = codec_with_clock();

        let issued = codec
            .issue_access_token("user123", "client")
            .expect("Failed to issue access token");

        let claims = codec
            .verify(&issued.token, TokenKind::Access)
            .expect("Failed to verify access token");

        assert_eq!(claims, issued.claims);
        assert_eq!(claims.iat, clock.now().timestamp());
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_access_token_expires_after_ttl() {
        let (codec, clock) = codec_with_clock();
        let issued = codec.issue_access_token("user123", "client").unwrap();

        clock.advance(Duration::minutes(14));
        assert!(codec.verify(&issued.token, TokenKind::Access).is_ok());

        clock.advance(Duration::minutes(1));
        assert_eq!(
            codec.verify(&issued.token, TokenKind::Access),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_refresh_token_has_unique_jti() {
        let (codec, _) = codec_with_clock();

        let first = codec.issue_refresh_token("user123").unwrap();
        let second = codec.issue_refresh_token("user123").unwrap();

        assert_ne!(first.claims.jti, second.claims.jti);
        assert_eq!(first.claims.exp - first.claims.iat, 30 * 24 * 60 * 60);
        assert_eq!(first.expires_at().timestamp(), first.claims.exp);
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let (codec, _) = codec_with_clock();

        let refresh = codec.issue_refresh_token("user123").unwrap();
        let result = codec.verify(&refresh.token, TokenKind::Access);
        assert!(matches!(result, Err(JwtError::WrongKind { .. })));

        let access = codec.issue_access_token("user123", "admin").unwrap();
        let result = codec.verify(&access.token, TokenKind::Refresh);
        assert!(matches!(result, Err(JwtError::WrongKind { .. })));
    }

    #[test]
    fn test_access_token_without_role_is_rejected() {
        let (codec, clock) = codec_with_clock();
        let now = clock.now().timestamp();

        let mut claims = Claims::access("user123", "client", "jti", now, now + 60);
        claims.role = None;
        let token = JwtHandler::new(SECRET).encode(&claims).unwrap();

        assert_eq!(
            codec.verify(&token, TokenKind::Access),
            Err(JwtError::MissingClaim("role".to_string()))
        );
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let (codec, clock) = codec_with_clock();
        let other = TokenCodec::new(b"another_secret_key_of_32_bytes_ok!", clock);

        let issued = other.issue_access_token("user123", "client").unwrap();
        let result = codec.verify(&issued.token, TokenKind::Access);
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let (codec, _) = codec_with_clock();
        let issued = codec.issue_access_token("user123", "client").unwrap();

        let mut parts: Vec<String> = issued.token.split('.').map(String::from).collect();
        let forged = Claims::access("user123", "admin", "jti", 0, i64::MAX / 2);
        let forged_token = JwtHandler::new(b"attacker_secret_that_is_32_bytes!!")
            .encode(&forged)
            .unwrap();
        parts[1] = forged_token.split('.').nth(1).unwrap().to_string();
        let tampered = parts.join(".");

        let result = codec.verify(&tampered, TokenKind::Access);
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_custom_ttls() {
        let (codec, clock) = codec_with_clock();
        let codec = codec
            .with_access_ttl(Duration::minutes(5))
            .with_refresh_ttl(Duration::hours(1));

        let access = codec.issue_access_token("user123", "client").unwrap();
        assert_eq!(access.claims.exp - access.claims.iat, 5 * 60);

        let refresh = codec.issue_refresh_token("user123").unwrap();
        clock.advance(Duration::hours(1));
        assert_eq!(
            codec.verify(&refresh.token, TokenKind::Refresh),
            Err(JwtError::TokenExpired)
        );
    }
}
