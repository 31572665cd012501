use async_trait::async_trait;
use chrono::Duration;

use crate::domain::account::errors::AuthError;
use crate::domain::account::errors::DeliveryError;
use crate::domain::account::models::EmailMessage;
use crate::domain::account::models::PruneReport;
use crate::domain::account::models::TokenPair;
use crate::domain::policy::models::Action;
use crate::domain::subject::models::Principal;
use crate::domain::subject::models::RegisterCommand;
use crate::domain::subject::models::Role;
use crate::domain::subject::models::Subject;
use crate::domain::subject::models::SubjectId;

/// Port for authentication and authorization operations.
///
/// Every operation acting on behalf of a caller takes the authenticated
/// `Principal` explicitly.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new subject with role `client`.
    ///
    /// # Errors
    /// * `WeakPassword` - Password fails the strength policy
    /// * `Conflict` - Username or email already registered
    /// * `Internal` - Store failure
    async fn register(&self, command: RegisterCommand) -> Result<Subject, AuthError>;

    /// Authenticate with email or username and password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier, wrong password or inactive subject
    async fn login(&self, identifier: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a new pair, revoking the presented one.
    ///
    /// # Errors
    /// * `TokenInvalid` / `TokenExpired` - Token fails verification
    /// * `TokenReusedOrUnknown` - Token was rotated, revoked or never recorded
    /// * `InvalidCredentials` - Subject is gone or inactive
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Revoke one refresh token. Repeating the call is not an error.
    ///
    /// # Errors
    /// * `TokenInvalid` - Token signature or shape is invalid
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Revoke every refresh token of `subject_id`.
    ///
    /// # Returns
    /// Number of tokens revoked
    ///
    /// # Errors
    /// * `Authorization` - Principal may not revoke this subject's sessions
    async fn logout_all(
        &self,
        principal: &Principal,
        subject_id: &SubjectId,
    ) -> Result<u64, AuthError>;

    /// Start a password reset. Succeeds identically whether or not the email
    /// belongs to a subject.
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Set a new password using a reset token and revoke all sessions.
    ///
    /// # Errors
    /// * `WeakPassword` - New password fails the policy (token is left unused)
    /// * `TokenNotFound` / `ResetTokenExpired` / `TokenAlreadyUsed` - Token cannot be consumed
    async fn confirm_password_reset(
        &self,
        raw_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Verify an access token without touching the store.
    ///
    /// # Errors
    /// * `TokenInvalid` / `TokenExpired` - Token fails verification
    async fn verify_access_token(&self, token: &str) -> Result<Principal, AuthError>;

    /// Check whether `principal` may perform `action` on a resource owned by `owner`.
    ///
    /// # Errors
    /// * `Authorization` - Denied, with the reason
    fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        owner: &SubjectId,
    ) -> Result<(), AuthError>;

    /// Read a subject.
    ///
    /// # Errors
    /// * `Authorization` - Principal may not read this subject
    /// * `NotFound` - Subject does not exist
    async fn get_subject(
        &self,
        principal: &Principal,
        subject_id: &SubjectId,
    ) -> Result<Subject, AuthError>;

    /// Change a subject's role. Admin only.
    async fn change_role(
        &self,
        principal: &Principal,
        subject_id: &SubjectId,
        role: Role,
    ) -> Result<Subject, AuthError>;

    /// Activate or deactivate a subject. Admin only. Deactivation revokes
    /// all of the subject's refresh tokens.
    async fn set_active(
        &self,
        principal: &Principal,
        subject_id: &SubjectId,
        is_active: bool,
    ) -> Result<Subject, AuthError>;

    /// Delete ledger records that expired more than `grace` ago.
    async fn prune_expired_tokens(&self, grace: Duration) -> Result<PruneReport, AuthError>;
}

/// Port for outbound email dispatch.
#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    /// Hand an email to the delivery transport.
    ///
    /// # Errors
    /// * `SerializationFailed` - Message could not be encoded
    /// * `PublishFailed` - Transport rejected the message
    async fn send(&self, message: EmailMessage) -> Result<(), DeliveryError>;
}
