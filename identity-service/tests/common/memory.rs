use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use identity_service::domain::account::errors::DeliveryError;
use identity_service::domain::account::models::EmailMessage;
use identity_service::domain::account::ports::EmailSender;
use identity_service::domain::credential::errors::CredentialError;
use identity_service::domain::credential::models::Credential;
use identity_service::domain::credential::models::HashedPassword;
use identity_service::domain::credential::ports::CredentialRepository;
use identity_service::domain::reset::errors::ResetLedgerError;
use identity_service::domain::reset::models::PasswordResetTokenRecord;
use identity_service::domain::reset::models::ResetOutcome;
use identity_service::domain::reset::ports::PasswordResetRepository;
use identity_service::domain::session::errors::RefreshLedgerError;
use identity_service::domain::session::models::RefreshTokenRecord;
use identity_service::domain::session::ports::RefreshTokenRepository;
use identity_service::domain::subject::errors::SubjectError;
use identity_service::domain::subject::models::EmailAddress;
use identity_service::domain::subject::models::Role;
use identity_service::domain::subject::models::Subject;
use identity_service::domain::subject::models::SubjectId;
use identity_service::domain::subject::ports::SubjectRepository;

#[derive(Default)]
struct State {
    subjects: HashMap<SubjectId, Subject>,
    credentials: HashMap<SubjectId, Credential>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    reset_tokens: HashMap<String, PasswordResetTokenRecord>,
}

/// In-memory store backing every repository port.
///
/// All state sits behind one mutex, so each conditional update is a single
/// critical section just like the guarded SQL statements.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn refresh_record(&self, jti: &str) -> Option<RefreshTokenRecord> {
        self.lock().refresh_tokens.get(jti).cloned()
    }

    pub fn refresh_jtis_for(&self, subject_id: &SubjectId) -> Vec<String> {
        self.lock()
            .refresh_tokens
            .values()
            .filter(|record| &record.subject_id == subject_id)
            .map(|record| record.jti.clone())
            .collect()
    }

    pub fn reset_records(&self) -> Vec<PasswordResetTokenRecord> {
        self.lock().reset_tokens.values().cloned().collect()
    }

    pub fn credential_hash(&self, subject_id: &SubjectId) -> Option<String> {
        self.lock()
            .credentials
            .get(subject_id)
            .map(|credential| credential.password_hash.clone())
    }

    /// Bypass the API to grant a role, e.g. to seed the first admin.
    pub fn force_role(&self, subject_id: &SubjectId, role: Role) {
        if let Some(subject) = self.lock().subjects.get_mut(subject_id) {
            subject.role = role;
        }
    }
}

#[async_trait]
impl SubjectRepository for InMemoryStore {
    async fn create(&self, subject: Subject, credential: Credential) -> Result<Subject, SubjectError> {
        let mut state = self.lock();

        if state.subjects.values().any(|s| s.username == subject.username) {
            return Err(SubjectError::UsernameAlreadyExists(subject.username.to_string()));
        }
        if state.subjects.values().any(|s| s.email == subject.email) {
            return Err(SubjectError::EmailAlreadyExists(subject.email.to_string()));
        }

        state.credentials.insert(subject.id, credential);
        state.subjects.insert(subject.id, subject.clone());
        Ok(subject)
    }

    async fn find_by_id(&self, id: &SubjectId) -> Result<Option<Subject>, SubjectError> {
        Ok(self.lock().subjects.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Subject>, SubjectError> {
        Ok(self
            .lock()
            .subjects
            .values()
            .find(|s| &s.email == email)
            .cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Subject>, SubjectError> {
        let identifier = if identifier.contains('@') {
            identifier.to_lowercase()
        } else {
            identifier.to_string()
        };

        Ok(self
            .lock()
            .subjects
            .values()
            .find(|s| s.email.as_str() == identifier || s.username.as_str() == identifier)
            .cloned())
    }

    async fn update_role(&self, id: &SubjectId, role: Role) -> Result<Subject, SubjectError> {
        let mut state = self.lock();
        let subject = state
            .subjects
            .get_mut(id)
            .ok_or_else(|| SubjectError::NotFound(id.to_string()))?;
        subject.role = role;
        Ok(subject.clone())
    }

    async fn set_active(&self, id: &SubjectId, is_active: bool) -> Result<Subject, SubjectError> {
        let mut state = self.lock();
        let subject = state
            .subjects
            .get_mut(id)
            .ok_or_else(|| SubjectError::NotFound(id.to_string()))?;
        subject.is_active = is_active;
        Ok(subject.clone())
    }
}

#[async_trait]
impl CredentialRepository for InMemoryStore {
    async fn upsert(&self, credential: Credential) -> Result<(), CredentialError> {
        self.lock()
            .credentials
            .insert(credential.subject_id, credential);
        Ok(())
    }

    async fn find(&self, subject_id: &SubjectId) -> Result<Option<Credential>, CredentialError> {
        Ok(self.lock().credentials.get(subject_id).cloned())
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryStore {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), RefreshLedgerError> {
        let mut state = self.lock();
        if state.refresh_tokens.contains_key(&record.jti) {
            return Err(RefreshLedgerError::DuplicateJti(record.jti));
        }
        state.refresh_tokens.insert(record.jti.clone(), record);
        Ok(())
    }

    async fn find_by_jti(&self, jti: &str) -> Result<Option<RefreshTokenRecord>, RefreshLedgerError> {
        Ok(self.lock().refresh_tokens.get(jti).cloned())
    }

    async fn rotate(
        &self,
        old_jti: &str,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<(), RefreshLedgerError> {
        let mut state = self.lock();

        if state.refresh_tokens.contains_key(&replacement.jti) {
            return Err(RefreshLedgerError::DuplicateJti(replacement.jti));
        }

        let old = state
            .refresh_tokens
            .get_mut(old_jti)
            .filter(|old| old.is_usable(now) && old.subject_id == replacement.subject_id)
            .ok_or(RefreshLedgerError::ReusedOrUnknown)?;

        old.revoked = true;
        old.revoked_at = Some(now);
        old.replaced_by = Some(replacement.jti.clone());

        state
            .refresh_tokens
            .insert(replacement.jti.clone(), replacement);
        Ok(())
    }

    async fn revoke(&self, jti: &str, now: DateTime<Utc>) -> Result<bool, RefreshLedgerError> {
        match self.lock().refresh_tokens.get_mut(jti) {
            Some(record) if !record.revoked => {
                record.revoked = true;
                record.revoked_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_subject(
        &self,
        subject_id: &SubjectId,
        now: DateTime<Utc>,
    ) -> Result<u64, RefreshLedgerError> {
        let mut revoked = 0;
        for record in self
            .lock()
            .refresh_tokens
            .values_mut()
            .filter(|r| &r.subject_id == subject_id && !r.revoked)
        {
            record.revoked = true;
            record.revoked_at = Some(now);
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RefreshLedgerError> {
        let mut state = self.lock();
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, r| r.expires_at >= cutoff);
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl PasswordResetRepository for InMemoryStore {
    async fn insert(&self, record: PasswordResetTokenRecord) -> Result<(), ResetLedgerError> {
        self.lock()
            .reset_tokens
            .insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn consume_and_reset(
        &self,
        token_hash: &str,
        subject_hint: Option<SubjectId>,
        password: HashedPassword,
        now: DateTime<Utc>,
    ) -> Result<ResetOutcome, ResetLedgerError> {
        let mut state = self.lock();
        let record = state
            .reset_tokens
            .get_mut(token_hash)
            .filter(|r| subject_hint.map_or(true, |hint| hint == r.subject_id))
            .ok_or(ResetLedgerError::NotFound)?;

        if record.used {
            return Err(ResetLedgerError::AlreadyUsed);
        }
        if record.expires_at <= now {
            return Err(ResetLedgerError::Expired);
        }

        record.used = true;
        record.used_at = Some(now);
        let subject_id = record.subject_id;

        state
            .credentials
            .insert(subject_id, password.bind(subject_id, now));

        let mut sessions_revoked = 0;
        for token in state
            .refresh_tokens
            .values_mut()
            .filter(|r| r.subject_id == subject_id && !r.revoked)
        {
            token.revoked = true;
            token.revoked_at = Some(now);
            sessions_revoked += 1;
        }

        Ok(ResetOutcome {
            subject_id,
            sessions_revoked,
        })
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ResetLedgerError> {
        let mut state = self.lock();
        let before = state.reset_tokens.len();
        state.reset_tokens.retain(|_, r| r.expires_at >= cutoff);
        Ok((before - state.reset_tokens.len()) as u64)
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq)]
enum Transport {
    #[default]
    Up,
    Down,
    Stalled,
}

/// Email sender that keeps every message it is handed.
///
/// Reset emails go out from a background task, so tests read them through
/// the `wait_for_*` helpers.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    attempts: AtomicUsize,
    transport: Transport,
}

impl RecordingEmailSender {
    const WAIT_STEP: Duration = Duration::from_millis(10);
    const WAIT_LIMIT: Duration = Duration::from_secs(2);

    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sender whose transport is down.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            transport: Transport::Down,
            ..Self::default()
        })
    }

    /// Sender whose transport never answers.
    pub fn stalled() -> Arc<Self> {
        Arc::new(Self {
            transport: Transport::Stalled,
            ..Self::default()
        })
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Wait until `count` deliveries were attempted, or give up after a
    /// couple of seconds. Returns the attempts seen.
    pub async fn wait_for_attempts(&self, count: usize) -> usize {
        let deadline = tokio::time::Instant::now() + Self::WAIT_LIMIT;
        while self.attempts() < count && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Self::WAIT_STEP).await;
        }
        self.attempts()
    }

    /// Wait until `count` messages were delivered and return all of them.
    pub async fn wait_for_sent(&self, count: usize) -> Vec<EmailMessage> {
        let deadline = tokio::time::Instant::now() + Self::WAIT_LIMIT;
        while self.sent().len() < count && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Self::WAIT_STEP).await;
        }
        self.sent()
    }

    /// Raw reset token from the most recent email, once one has arrived.
    pub async fn wait_for_reset_token(&self) -> Option<String> {
        self.wait_for_sent(1).await.last().and_then(|message| {
            message
                .body
                .split_whitespace()
                .find_map(|word| word.split("token=").nth(1))
                .map(|token| token.trim_end_matches(|c: char| !c.is_ascii_hexdigit()).to_string())
        })
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.transport {
            Transport::Up => {
                self.sent.lock().unwrap().push(message);
                Ok(())
            }
            Transport::Down => Err(DeliveryError::PublishFailed("broker unavailable".to_string())),
            Transport::Stalled => std::future::pending().await,
        }
    }
}
