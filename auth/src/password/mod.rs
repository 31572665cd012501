pub mod argon2;
pub mod errors;
pub mod policy;

pub use argon2::PasswordHasher;
pub use errors::PasswordError;
pub use errors::PasswordPolicyError;
pub use errors::PasswordRequirement;
pub use policy::PasswordPolicy;
