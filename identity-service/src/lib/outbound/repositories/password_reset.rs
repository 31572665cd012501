use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::credential::models::HashedPassword;
use crate::domain::reset::errors::ResetLedgerError;
use crate::domain::reset::models::PasswordResetTokenRecord;
use crate::domain::reset::models::ResetOutcome;
use crate::domain::reset::ports::PasswordResetRepository;
use crate::domain::subject::models::SubjectId;
use crate::outbound::repositories::credential::upsert_credential;
use crate::outbound::repositories::refresh_token::revoke_all_records;

#[derive(sqlx::FromRow)]
struct ResetStateRow {
    subject_id: Uuid,
    used: bool,
    expires_at: DateTime<Utc>,
}

fn database_error(e: sqlx::Error) -> ResetLedgerError {
    ResetLedgerError::DatabaseError(e.to_string())
}

pub struct PostgresPasswordResetRepository {
    pool: PgPool,
}

impl PostgresPasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain why the conditional consume matched no row.
    async fn classify_failure(
        &self,
        token_hash: &str,
        subject_hint: Option<SubjectId>,
        now: DateTime<Utc>,
    ) -> Result<ResetLedgerError, ResetLedgerError> {
        let row = sqlx::query_as::<_, ResetStateRow>(
            "SELECT subject_id, used, expires_at FROM password_reset_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        let error = match row {
            None => ResetLedgerError::NotFound,
            Some(row) if subject_hint.is_some_and(|hint| hint.0 != row.subject_id) => {
                ResetLedgerError::NotFound
            }
            Some(row) if row.used => ResetLedgerError::AlreadyUsed,
            Some(row) if row.expires_at <= now => ResetLedgerError::Expired,
            Some(_) => ResetLedgerError::NotFound,
        };

        Ok(error)
    }
}

#[async_trait]
impl PasswordResetRepository for PostgresPasswordResetRepository {
    async fn insert(&self, record: PasswordResetTokenRecord) -> Result<(), ResetLedgerError> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (id, subject_id, token_hash, expires_at, used, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            "#,
        )
        .bind(record.id)
        .bind(record.subject_id.0)
        .bind(&record.token_hash)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn consume_and_reset(
        &self,
        token_hash: &str,
        subject_hint: Option<SubjectId>,
        password: HashedPassword,
        now: DateTime<Utc>,
    ) -> Result<ResetOutcome, ResetLedgerError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let owner: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE password_reset_tokens
            SET used = TRUE, used_at = $2
            WHERE token_hash = $1
              AND used = FALSE
              AND expires_at > $2
              AND ($3::uuid IS NULL OR subject_id = $3)
            RETURNING subject_id
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .bind(subject_hint.map(|hint| hint.0))
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?;

        let Some(owner) = owner else {
            tx.rollback().await.map_err(database_error)?;
            return Err(self.classify_failure(token_hash, subject_hint, now).await?);
        };
        let subject_id = SubjectId(owner);

        upsert_credential(&mut *tx, &password.bind(subject_id, now))
            .await
            .map_err(database_error)?;
        let sessions_revoked = revoke_all_records(&mut *tx, &subject_id, now)
            .await
            .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(ResetOutcome {
            subject_id,
            sessions_revoked,
        })
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ResetLedgerError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
