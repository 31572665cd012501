//! Authentication primitives library
//!
//! Provides the credential and token building blocks used by the identity service:
//! - Password hashing (Argon2id) and password strength policy
//! - JWT encoding/decoding with typed access and refresh claims
//! - Token codec issuing and verifying time-bounded tokens against an injected clock
//! - Opaque single-use token generation and hashing
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Password Policy
//! ```
//! use auth::PasswordPolicy;
//!
//! let policy = PasswordPolicy::default();
//! assert!(policy.check("Str0ng!Pw").is_ok());
//! assert!(policy.check("weak").is_err());
//! ```
//!
//! ## Access and Refresh Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{SystemClock, TokenCodec, TokenKind};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Arc::new(SystemClock));
//! let issued = codec.issue_access_token("user123", "client").unwrap();
//! let claims = codec.verify(&issued.token, TokenKind::Access).unwrap();
//! assert_eq!(claims.sub, "user123");
//! assert_eq!(claims.role.as_deref(), Some("client"));
//! ```
//!
//! ## Opaque Tokens
//! ```
//! use auth::opaque;
//!
//! let raw = opaque::generate_token();
//! let stored = opaque::hash_token(&raw);
//! assert_ne!(raw, stored);
//! assert_eq!(stored, opaque::hash_token(&raw));
//! ```

pub mod clock;
pub mod codec;
pub mod jwt;
pub mod opaque;
pub mod password;

// Re-export commonly used items
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use codec::IssuedToken;
pub use codec::TokenCodec;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicy;
pub use password::PasswordPolicyError;
pub use password::PasswordRequirement;
