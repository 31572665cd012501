use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}

/// A single unmet password strength requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRequirement {
    MinLength(usize),
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
}

impl std::fmt::Display for PasswordRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordRequirement::MinLength(min) => write!(f, "at least {} characters", min),
            PasswordRequirement::Uppercase => write!(f, "an uppercase letter"),
            PasswordRequirement::Lowercase => write!(f, "a lowercase letter"),
            PasswordRequirement::Digit => write!(f, "a digit"),
            PasswordRequirement::Symbol => write!(f, "a symbol"),
        }
    }
}

/// Password rejected by the strength policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Password must contain {}", describe(.missing))]
pub struct PasswordPolicyError {
    pub missing: Vec<PasswordRequirement>,
}

fn describe(missing: &[PasswordRequirement]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
