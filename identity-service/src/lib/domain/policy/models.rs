use std::fmt;
use std::str::FromStr;

use crate::domain::policy::errors::ActionError;

/// Closed set of guarded operations on subject and profile resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ProfileRead,
    ProfileUpdate,
    SubjectRead,
    SubjectUpdate,
    SubjectDelete,
    SessionsRevoke,
    SubjectChangeRole,
    SubjectDeactivate,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::ProfileRead,
        Action::ProfileUpdate,
        Action::SubjectRead,
        Action::SubjectUpdate,
        Action::SubjectDelete,
        Action::SessionsRevoke,
        Action::SubjectChangeRole,
        Action::SubjectDeactivate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ProfileRead => "profile:read",
            Action::ProfileUpdate => "profile:update",
            Action::SubjectRead => "subject:read",
            Action::SubjectUpdate => "subject:update",
            Action::SubjectDelete => "subject:delete",
            Action::SessionsRevoke => "sessions:revoke",
            Action::SubjectChangeRole => "subject:change_role",
            Action::SubjectDeactivate => "subject:deactivate",
        }
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ActionError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Human readable reason, empty when allowed.
    pub fn reason(&self) -> String {
        match self {
            Decision::Allow => String::new(),
            Decision::Deny(reason) => reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The principal does not own the resource.
    NotOwner,
    /// The role may not perform this action even on its own resources.
    ActionNotPermitted,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NotOwner => f.write_str("principal does not own the resource"),
            DenyReason::ActionNotPermitted => f.write_str("action not permitted for role"),
        }
    }
}
