use async_trait::async_trait;

use crate::domain::credential::models::Credential;
use crate::domain::subject::errors::SubjectError;
use crate::domain::subject::models::EmailAddress;
use crate::domain::subject::models::Role;
use crate::domain::subject::models::Subject;
use crate::domain::subject::models::SubjectId;

/// Persistence operations for subjects.
#[async_trait]
pub trait SubjectRepository: Send + Sync + 'static {
    /// Persist a new subject together with its first credential and an empty
    /// profile, all or nothing.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, subject: Subject, credential: Credential) -> Result<Subject, SubjectError>;

    /// Retrieve subject by identifier.
    ///
    /// # Returns
    /// Optional subject (None if not found)
    async fn find_by_id(&self, id: &SubjectId) -> Result<Option<Subject>, SubjectError>;

    /// Retrieve subject by normalized email.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Subject>, SubjectError>;

    /// Retrieve subject whose username equals `identifier`, or whose email
    /// equals its lowercased form.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Subject>, SubjectError>;

    /// Change a subject's role.
    ///
    /// # Errors
    /// * `NotFound` - Subject does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_role(&self, id: &SubjectId, role: Role) -> Result<Subject, SubjectError>;

    /// Activate or deactivate a subject.
    ///
    /// # Errors
    /// * `NotFound` - Subject does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_active(&self, id: &SubjectId, is_active: bool) -> Result<Subject, SubjectError>;
}
