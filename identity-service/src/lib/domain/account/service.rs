use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use auth::Clock;
use auth::JwtError;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenKind;
use chrono::Duration;

use crate::domain::account::errors::AuthError;
use crate::domain::account::errors::DeliveryError;
use crate::domain::account::models::EmailMessage;
use crate::domain::account::models::PruneReport;
use crate::domain::account::models::TokenPair;
use crate::domain::account::ports::AuthServicePort;
use crate::domain::account::ports::EmailSender;
use crate::domain::credential::ports::CredentialRepository;
use crate::domain::credential::store::CredentialStore;
use crate::domain::policy::engine::AccessPolicy;
use crate::domain::policy::models::Action;
use crate::domain::policy::models::Decision;
use crate::domain::reset::ledger::ResetLedger;
use crate::domain::reset::ports::PasswordResetRepository;
use crate::domain::session::ledger::RefreshLedger;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::subject::models::EmailAddress;
use crate::domain::subject::models::Principal;
use crate::domain::subject::models::RegisterCommand;
use crate::domain::subject::models::Role;
use crate::domain::subject::models::Subject;
use crate::domain::subject::models::SubjectId;
use crate::domain::subject::ports::SubjectRepository;

const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 2_000;

/// Auth orchestrator.
///
/// Composes the credential store, token codec, refresh ledger, reset ledger
/// and access policy into the account lifecycle operations of
/// [`AuthServicePort`].
pub struct AuthService<SR, CR, RR, PR, ES>
where
    SR: SubjectRepository,
    CR: CredentialRepository,
    RR: RefreshTokenRepository,
    PR: PasswordResetRepository,
    ES: EmailSender,
{
    subjects: Arc<SR>,
    credentials: CredentialStore<CR>,
    refresh_ledger: RefreshLedger<RR>,
    reset_ledger: ResetLedger<PR>,
    email_sender: Arc<ES>,
    codec: Arc<TokenCodec>,
    policy: AccessPolicy,
    clock: Arc<dyn Clock>,
    reset_link_base: String,
    dispatch_timeout: StdDuration,
}

impl<SR, CR, RR, PR, ES> AuthService<SR, CR, RR, PR, ES>
where
    SR: SubjectRepository,
    CR: CredentialRepository,
    RR: RefreshTokenRepository,
    PR: PasswordResetRepository,
    ES: EmailSender,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `subjects` - Subject persistence
    /// * `credentials` - Credential persistence
    /// * `refresh_tokens` - Refresh ledger persistence
    /// * `reset_tokens` - Reset ledger persistence
    /// * `email_sender` - Outbound email capability
    /// * `codec` - Token codec, driven by the same `clock`
    /// * `clock` - Time source for ledgers and credentials
    pub fn new(
        subjects: Arc<SR>,
        credentials: Arc<CR>,
        refresh_tokens: Arc<RR>,
        reset_tokens: Arc<PR>,
        email_sender: Arc<ES>,
        codec: Arc<TokenCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subjects,
            credentials: CredentialStore::new(credentials, clock.clone()),
            refresh_ledger: RefreshLedger::new(refresh_tokens, clock.clone()),
            reset_ledger: ResetLedger::new(reset_tokens, clock.clone()),
            email_sender,
            codec,
            policy: AccessPolicy::new(),
            clock,
            reset_link_base: String::from("http://localhost:3000/reset-password"),
            dispatch_timeout: StdDuration::from_millis(DEFAULT_DISPATCH_TIMEOUT_MS),
        }
    }

    pub fn with_password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.credentials = self.credentials.with_hasher(hasher);
        self
    }

    pub fn with_reset_ttl(mut self, ttl: Duration) -> Self {
        self.reset_ledger = self.reset_ledger.with_ttl(ttl);
        self
    }

    /// Base URL of the reset page; the raw token is appended as `?token=`.
    pub fn with_reset_link_base(mut self, base: impl Into<String>) -> Self {
        self.reset_link_base = base.into();
        self
    }

    /// Upper bound on a single reset email delivery attempt.
    pub fn with_dispatch_timeout(mut self, timeout: StdDuration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    async fn issue_pair(&self, subject: &Subject) -> Result<TokenPair, AuthError> {
        let subject_id = subject.id.to_string();
        let access = self
            .codec
            .issue_access_token(&subject_id, subject.role.as_str())?;
        let refresh = self.codec.issue_refresh_token(&subject_id)?;

        self.refresh_ledger
            .record(subject.id, &refresh.claims.jti, refresh.expires_at())
            .await?;

        Ok(TokenPair {
            access_expires_at: access.expires_at(),
            access_token: access.token,
            refresh_expires_at: refresh.expires_at(),
            refresh_token: refresh.token,
        })
    }

    fn reset_email(&self, subject: &Subject, raw_token: &str) -> EmailMessage {
        let link = format!("{}?token={}", self.reset_link_base, raw_token);
        EmailMessage {
            to: subject.email.as_str().to_string(),
            subject: String::from("Reset your password"),
            body: format!(
                "Hello {},\n\nUse the link below to choose a new password. It expires in {} minutes.\n\n{}\n\nIf you did not ask for this, ignore this email.",
                subject.username,
                self.reset_ledger.ttl().num_minutes(),
                link
            ),
        }
    }

    /// Hand `message` to the email transport in a background task. The
    /// caller does not wait for delivery.
    fn dispatch(&self, subject_id: SubjectId, message: EmailMessage) {
        let sender = Arc::clone(&self.email_sender);
        let timeout = self.dispatch_timeout;

        tokio::spawn(async move {
            match tokio::time::timeout(timeout, sender.send(message)).await {
                Ok(Ok(())) => {
                    tracing::debug!(subject_id = %subject_id, "Password reset email dispatched")
                }
                Ok(Err(e)) => {
                    tracing::error!(subject_id = %subject_id, error = %e, "Failed to dispatch password reset email")
                }
                Err(_) => {
                    tracing::error!(subject_id = %subject_id, error = %DeliveryError::Timeout, "Failed to dispatch password reset email")
                }
            }
        });
    }

    fn parse_subject_id(sub: &str) -> Result<SubjectId, AuthError> {
        SubjectId::from_string(sub).map_err(|e| AuthError::TokenInvalid(e.to_string()))
    }
}

#[async_trait]
impl<SR, CR, RR, PR, ES> AuthServicePort for AuthService<SR, CR, RR, PR, ES>
where
    SR: SubjectRepository,
    CR: CredentialRepository,
    RR: RefreshTokenRepository,
    PR: PasswordResetRepository,
    ES: EmailSender,
{
    async fn register(&self, command: RegisterCommand) -> Result<Subject, AuthError> {
        let subject = Subject::register(command.username, command.email, self.clock.now());
        let credential = self.credentials.prepare(subject.id, &command.password)?;

        let created = self.subjects.create(subject, credential).await?;

        tracing::info!(subject_id = %created.id, "Subject registered");
        Ok(created)
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<TokenPair, AuthError> {
        let subject = match self.subjects.find_by_identifier(identifier.trim()).await? {
            Some(subject) => subject,
            None => {
                self.credentials.verify_decoy(password);
                tracing::debug!("Login failed: unknown identifier");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.credentials.verify_password(&subject.id, password).await? {
            tracing::debug!(subject_id = %subject.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !subject.is_active {
            tracing::debug!(subject_id = %subject.id, "Login failed: subject inactive");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.issue_pair(&subject).await?;
        tracing::info!(subject_id = %subject.id, "Subject logged in");
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.codec.verify(refresh_token, TokenKind::Refresh)?;
        let subject_id = Self::parse_subject_id(&claims.sub)?;

        let subject = self
            .subjects
            .find_by_id(&subject_id)
            .await?
            .filter(|subject| subject.is_active)
            .ok_or(AuthError::InvalidCredentials)?;

        let access = self
            .codec
            .issue_access_token(&claims.sub, subject.role.as_str())?;
        let refresh = self.codec.issue_refresh_token(&claims.sub)?;

        self.refresh_ledger
            .rotate(subject_id, &claims.jti, &refresh.claims.jti, refresh.expires_at())
            .await?;

        tracing::debug!(subject_id = %subject_id, jti = %refresh.claims.jti, "Refresh token rotated");
        Ok(TokenPair {
            access_expires_at: access.expires_at(),
            access_token: access.token,
            refresh_expires_at: refresh.expires_at(),
            refresh_token: refresh.token,
        })
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = match self.codec.verify(refresh_token, TokenKind::Refresh) {
            Ok(claims) => claims,
            Err(JwtError::TokenExpired) => {
                tracing::debug!("Logout with expired refresh token");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.refresh_ledger.revoke(&claims.jti).await?;
        tracing::info!(subject_id = %claims.sub, "Subject logged out");
        Ok(())
    }

    async fn logout_all(
        &self,
        principal: &Principal,
        subject_id: &SubjectId,
    ) -> Result<u64, AuthError> {
        self.authorize(principal, Action::SessionsRevoke, subject_id)?;
        Ok(self.refresh_ledger.revoke_all(subject_id).await?)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let Ok(email) = EmailAddress::new(email.to_string()) else {
            tracing::debug!("Password reset requested for malformed email");
            return Ok(());
        };

        match self.subjects.find_by_email(&email).await? {
            Some(subject) if subject.is_active => {
                let raw_token = self.reset_ledger.issue(subject.id).await?;
                let message = self.reset_email(&subject, &raw_token);
                self.dispatch(subject.id, message);
            }
            _ => tracing::debug!("Password reset requested for unknown email"),
        }

        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        raw_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let password = self.credentials.hash_password(new_password)?;
        let outcome = self.reset_ledger.consume(raw_token, None, password).await?;

        tracing::info!(
            subject_id = %outcome.subject_id,
            sessions_revoked = outcome.sessions_revoked,
            "Password reset completed"
        );
        Ok(())
    }

    async fn verify_access_token(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self
            .codec
            .verify(token, TokenKind::Access)
            .map_err(|e| {
                if e.is_expired() {
                    tracing::debug!("Access token expired");
                } else {
                    tracing::warn!(error = %e, "Access token rejected");
                }
                AuthError::from(e)
            })?;

        let subject_id = Self::parse_subject_id(&claims.sub)?;
        let role = claims
            .role
            .as_deref()
            .unwrap_or_default()
            .parse::<Role>()
            .map_err(|e| AuthError::TokenInvalid(e.to_string()))?;

        Ok(Principal::new(subject_id, role))
    }

    fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        owner: &SubjectId,
    ) -> Result<(), AuthError> {
        match self.policy.decide(principal, action, owner) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                tracing::debug!(
                    subject_id = %principal.subject_id,
                    action = %action,
                    owner = %owner,
                    reason = %reason,
                    "Access denied"
                );
                Err(AuthError::Authorization(reason.to_string()))
            }
        }
    }

    async fn get_subject(
        &self,
        principal: &Principal,
        subject_id: &SubjectId,
    ) -> Result<Subject, AuthError> {
        self.authorize(principal, Action::SubjectRead, subject_id)?;
        self.subjects
            .find_by_id(subject_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("Subject {}", subject_id)))
    }

    async fn change_role(
        &self,
        principal: &Principal,
        subject_id: &SubjectId,
        role: Role,
    ) -> Result<Subject, AuthError> {
        self.authorize(principal, Action::SubjectChangeRole, subject_id)?;
        let subject = self.subjects.update_role(subject_id, role).await?;

        tracing::info!(
            subject_id = %subject_id,
            role = %role,
            changed_by = %principal.subject_id,
            "Role changed"
        );
        Ok(subject)
    }

    async fn set_active(
        &self,
        principal: &Principal,
        subject_id: &SubjectId,
        is_active: bool,
    ) -> Result<Subject, AuthError> {
        self.authorize(principal, Action::SubjectDeactivate, subject_id)?;
        let subject = self.subjects.set_active(subject_id, is_active).await?;

        if !is_active {
            self.refresh_ledger.revoke_all(subject_id).await?;
        }

        tracing::info!(
            subject_id = %subject_id,
            is_active,
            changed_by = %principal.subject_id,
            "Subject status changed"
        );
        Ok(subject)
    }

    async fn prune_expired_tokens(&self, grace: Duration) -> Result<PruneReport, AuthError> {
        let report = PruneReport {
            refresh_tokens: self.refresh_ledger.prune_expired(grace).await?,
            reset_tokens: self.reset_ledger.prune_expired(grace).await?,
        };

        tracing::info!(
            refresh_tokens = report.refresh_tokens,
            reset_tokens = report.reset_tokens,
            "Pruned expired tokens"
        );
        Ok(report)
    }
}
