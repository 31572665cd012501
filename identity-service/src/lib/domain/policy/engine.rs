use crate::domain::policy::models::Action;
use crate::domain::policy::models::Decision;
use crate::domain::policy::models::DenyReason;
use crate::domain::subject::models::Principal;
use crate::domain::subject::models::Role;
use crate::domain::subject::models::SubjectId;

const CLIENT_SELF_SERVICE: &[Action] = &[
    Action::ProfileRead,
    Action::ProfileUpdate,
    Action::SubjectRead,
    Action::SubjectUpdate,
    Action::SubjectDelete,
    Action::SessionsRevoke,
];

const EXECUTOR_SELF_SERVICE: &[Action] = &[
    Action::ProfileRead,
    Action::ProfileUpdate,
    Action::SubjectRead,
    Action::SubjectUpdate,
    Action::SessionsRevoke,
];

/// Role based access decisions.
///
/// Admins may do anything. Everyone else may act only on resources they own
/// and only with the actions in their role's self-service set.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Actions a role may perform on its own resources.
    pub fn self_service(role: Role) -> &'static [Action] {
        match role {
            Role::Client => CLIENT_SELF_SERVICE,
            Role::Executor => EXECUTOR_SELF_SERVICE,
            Role::Admin => &Action::ALL,
        }
    }

    pub fn decide(&self, principal: &Principal, action: Action, owner: &SubjectId) -> Decision {
        if principal.is_admin() {
            return Decision::Allow;
        }
        if principal.subject_id != *owner {
            return Decision::Deny(DenyReason::NotOwner);
        }
        if Self::self_service(principal.role).contains(&action) {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::ActionNotPermitted)
        }
    }

    pub fn allow(&self, principal: &Principal, action: Action, owner: &SubjectId) -> bool {
        self.decide(principal, action, owner).is_allowed()
    }
}
