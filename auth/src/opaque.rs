//! Opaque single-use tokens.
//!
//! The raw token is handed to the user once; only its SHA-256 digest is ever
//! stored, so a leaked table cannot be replayed.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Digest;
use sha2::Sha256;

/// Number of random bytes in a generated token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Generate a high-entropy token, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
