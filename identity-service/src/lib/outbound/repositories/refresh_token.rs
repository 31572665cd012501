use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::session::errors::RefreshLedgerError;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::subject::models::SubjectId;

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    subject_id: Uuid,
    jti: String,
    expires_at: DateTime<Utc>,
    revoked: bool,
    revoked_at: Option<DateTime<Utc>>,
    replaced_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshTokenRecord {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshTokenRecord {
            id: row.id,
            subject_id: SubjectId(row.subject_id),
            jti: row.jti,
            expires_at: row.expires_at,
            revoked: row.revoked,
            revoked_at: row.revoked_at,
            replaced_by: row.replaced_by,
            created_at: row.created_at,
        }
    }
}

fn database_error(e: sqlx::Error) -> RefreshLedgerError {
    RefreshLedgerError::DatabaseError(e.to_string())
}

async fn insert_record<'e, E>(executor: E, record: &RefreshTokenRecord) -> Result<(), RefreshLedgerError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, subject_id, jti, expires_at, revoked, created_at)
        VALUES ($1, $2, $3, $4, FALSE, $5)
        "#,
    )
    .bind(record.id)
    .bind(record.subject_id.0)
    .bind(&record.jti)
    .bind(record.expires_at)
    .bind(record.created_at)
    .execute(executor)
    .await
    .map_err(|e| {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() && db_err.constraint() == Some("refresh_tokens_jti_key") {
                return RefreshLedgerError::DuplicateJti(record.jti.clone());
            }
        }
        database_error(e)
    })?;

    Ok(())
}

/// Revoke every active refresh token of `subject_id`.
pub(crate) async fn revoke_all_records<'e, E>(
    executor: E,
    subject_id: &SubjectId,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = TRUE, revoked_at = $2
        WHERE subject_id = $1 AND revoked = FALSE
        "#,
    )
    .bind(subject_id.0)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Refresh ledger backed by the `refresh_tokens` table.
///
/// Rotation relies on a conditional `UPDATE ... WHERE revoked = FALSE`: under
/// concurrent rotations of one jti the row lock serializes the updates and
/// only the first sees the row still active.
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), RefreshLedgerError> {
        insert_record(&self.pool, &record).await
    }

    async fn find_by_jti(&self, jti: &str) -> Result<Option<RefreshTokenRecord>, RefreshLedgerError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, subject_id, jti, expires_at, revoked, revoked_at, replaced_by, created_at
            FROM refresh_tokens
            WHERE jti = $1
            "#,
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(RefreshTokenRecord::from))
    }

    async fn rotate(
        &self,
        old_jti: &str,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<(), RefreshLedgerError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let owner: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = $2, replaced_by = $3
            WHERE jti = $1 AND revoked = FALSE AND expires_at > $2
            RETURNING subject_id
            "#,
        )
        .bind(old_jti)
        .bind(now)
        .bind(&replacement.jti)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?;

        if owner != Some(replacement.subject_id.0) {
            tx.rollback().await.map_err(database_error)?;
            return Err(RefreshLedgerError::ReusedOrUnknown);
        }

        insert_record(&mut *tx, &replacement).await?;
        tx.commit().await.map_err(database_error)?;

        Ok(())
    }

    async fn revoke(&self, jti: &str, now: DateTime<Utc>) -> Result<bool, RefreshLedgerError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = $2
            WHERE jti = $1 AND revoked = FALSE
            "#,
        )
        .bind(jti)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_subject(
        &self,
        subject_id: &SubjectId,
        now: DateTime<Utc>,
    ) -> Result<u64, RefreshLedgerError> {
        revoke_all_records(&self.pool, subject_id, now)
            .await
            .map_err(database_error)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RefreshLedgerError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
