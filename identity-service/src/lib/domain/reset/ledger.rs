use std::sync::Arc;

use auth::opaque;
use auth::Clock;
use chrono::Duration;

use crate::domain::credential::models::HashedPassword;
use crate::domain::reset::errors::ResetLedgerError;
use crate::domain::reset::models::PasswordResetTokenRecord;
use crate::domain::reset::models::ResetOutcome;
use crate::domain::reset::ports::PasswordResetRepository;
use crate::domain::subject::models::SubjectId;

/// Issues and consumes single-use password reset tokens.
///
/// The raw token leaves this type exactly once, from `issue`. Issuing a new
/// token does not invalidate earlier unexpired ones.
pub struct ResetLedger<PR>
where
    PR: PasswordResetRepository,
{
    repository: Arc<PR>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<PR> ResetLedger<PR>
where
    PR: PasswordResetRepository,
{
    pub const DEFAULT_TTL_MINUTES: i64 = 60;

    pub fn new(repository: Arc<PR>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            ttl: Duration::minutes(Self::DEFAULT_TTL_MINUTES),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a reset token for `subject_id`.
    ///
    /// # Returns
    /// The raw token, to be delivered out of band
    pub async fn issue(&self, subject_id: SubjectId) -> Result<String, ResetLedgerError> {
        let raw = opaque::generate_token();
        let now = self.clock.now();
        let record =
            PasswordResetTokenRecord::new(subject_id, opaque::hash_token(&raw), now + self.ttl, now);

        self.repository.insert(record).await?;
        tracing::debug!(subject_id = %subject_id, "Issued password reset token");

        Ok(raw)
    }

    /// Consume a raw token and install `password` for its owner.
    ///
    /// Consumption, the credential write and revocation of the owner's
    /// refresh tokens commit together or not at all.
    ///
    /// # Errors
    /// * `NotFound` - Token unknown, or `subject_hint` does not own it
    /// * `AlreadyUsed` - Token was consumed before
    /// * `Expired` - Token lifetime elapsed
    /// * `DatabaseError` - Database operation failed
    pub async fn consume(
        &self,
        raw_token: &str,
        subject_hint: Option<SubjectId>,
        password: HashedPassword,
    ) -> Result<ResetOutcome, ResetLedgerError> {
        let token_hash = opaque::hash_token(raw_token);
        self.repository
            .consume_and_reset(&token_hash, subject_hint, password, self.clock.now())
            .await
    }

    /// Delete tokens that expired more than `grace` ago.
    pub async fn prune_expired(&self, grace: Duration) -> Result<u64, ResetLedgerError> {
        self.repository
            .delete_expired_before(self.clock.now() - grace)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use auth::ManualClock;
    use chrono::DateTime;
    use chrono::Utc;
    use mockall::mock;

    use super::*;

    mock! {
        pub TestPasswordResetRepository {}

        #[async_trait]
        impl PasswordResetRepository for TestPasswordResetRepository {
            async fn insert(&self, record: PasswordResetTokenRecord) -> Result<(), ResetLedgerError>;
            async fn consume_and_reset(
                &self,
                token_hash: &str,
                subject_hint: Option<SubjectId>,
                password: HashedPassword,
                now: DateTime<Utc>,
            ) -> Result<ResetOutcome, ResetLedgerError>;
            async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ResetLedgerError>;
        }
    }

    #[tokio::test]
    async fn test_issue_stores_only_hash() {
        let subject_id = SubjectId::new();
        let clock = Arc::new(ManualClock::starting_now());
        let stored = Arc::new(Mutex::new(None));

        let mut repository = MockTestPasswordResetRepository::new();
        let sink = stored.clone();
        repository.expect_insert().times(1).returning(move |record| {
            *sink.lock().unwrap() = Some(record);
            Ok(())
        });

        let ledger = ResetLedger::new(Arc::new(repository), clock.clone());
        let raw = ledger.issue(subject_id).await.unwrap();

        let record = stored.lock().unwrap().clone().unwrap();
        assert_ne!(record.token_hash, raw);
        assert_eq!(record.token_hash, opaque::hash_token(&raw));
        assert_eq!(record.subject_id, subject_id);
        assert_eq!(record.expires_at, clock.now() + Duration::hours(1));
        assert!(!record.used);
    }

    fn hashed() -> HashedPassword {
        HashedPassword {
            password_hash: "$argon2id$v=19$hash".to_string(),
            hash_scheme: "argon2id".to_string(),
        }
    }

    #[tokio::test]
    async fn test_consume_looks_up_by_hash() {
        let subject_id = SubjectId::new();
        let expected_hash = opaque::hash_token("raw-token");
        let outcome = ResetOutcome {
            subject_id,
            sessions_revoked: 2,
        };

        let mut repository = MockTestPasswordResetRepository::new();
        repository
            .expect_consume_and_reset()
            .withf(move |hash, hint, password, _| {
                hash == expected_hash && hint.is_none() && *password == hashed()
            })
            .times(1)
            .returning(move |_, _, _, _| Ok(outcome));

        let ledger = ResetLedger::new(Arc::new(repository), Arc::new(ManualClock::starting_now()));
        assert_eq!(ledger.consume("raw-token", None, hashed()).await, Ok(outcome));
    }

    #[tokio::test]
    async fn test_consume_propagates_classification() {
        let mut repository = MockTestPasswordResetRepository::new();
        repository
            .expect_consume_and_reset()
            .returning(|_, _, _, _| Err(ResetLedgerError::AlreadyUsed));

        let ledger = ResetLedger::new(Arc::new(repository), Arc::new(ManualClock::starting_now()));
        assert_eq!(
            ledger.consume("raw-token", None, hashed()).await,
            Err(ResetLedgerError::AlreadyUsed)
        );
    }
}
