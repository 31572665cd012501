use thiserror::Error;

/// Error for action parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Unknown action: {0}")]
    Unknown(String),
}
