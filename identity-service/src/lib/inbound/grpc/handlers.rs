use crate::domain::subject::models::Principal;

pub mod authorize;
pub mod verify_access_token;

impl From<Principal> for crate::proto::Principal {
    fn from(principal: Principal) -> Self {
        Self {
            subject_id: principal.subject_id.to_string(),
            role: principal.role.as_str().to_string(),
        }
    }
}
