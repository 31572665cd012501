use super::errors::PasswordPolicyError;
use super::errors::PasswordRequirement;

/// Password strength policy.
///
/// A password is accepted when it has at least `min_length` characters and
/// contains an uppercase letter, a lowercase letter, a digit and an ASCII
/// symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    pub const DEFAULT_MIN_LENGTH: usize = 8;

    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Check a candidate password.
    ///
    /// # Errors
    /// * `PasswordPolicyError` - Lists every requirement the password misses
    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyError> {
        let mut missing = Vec::new();

        if password.chars().count() < self.min_length {
            missing.push(PasswordRequirement::MinLength(self.min_length));
        }
        if !password.chars().any(char::is_uppercase) {
            missing.push(PasswordRequirement::Uppercase);
        }
        if !password.chars().any(char::is_lowercase) {
            missing.push(PasswordRequirement::Lowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            missing.push(PasswordRequirement::Digit);
        }
        if !password.chars().any(|c| c.is_ascii_punctuation()) {
            missing.push(PasswordRequirement::Symbol);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PasswordPolicyError { missing })
        }
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_LENGTH)
    }
}
