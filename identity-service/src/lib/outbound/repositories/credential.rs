use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::credential::errors::CredentialError;
use crate::domain::credential::models::Credential;
use crate::domain::credential::ports::CredentialRepository;
use crate::domain::subject::models::SubjectId;

#[derive(sqlx::FromRow)]
struct CredentialRow {
    subject_id: Uuid,
    password_hash: String,
    hash_scheme: String,
    updated_at: DateTime<Utc>,
}

impl From<CredentialRow> for Credential {
    fn from(row: CredentialRow) -> Self {
        Credential {
            subject_id: SubjectId(row.subject_id),
            password_hash: row.password_hash,
            hash_scheme: row.hash_scheme,
            updated_at: row.updated_at,
        }
    }
}

/// Insert or replace the credential row of `credential.subject_id`.
pub(crate) async fn upsert_credential<'e, E>(
    executor: E,
    credential: &Credential,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO credentials (subject_id, password_hash, hash_scheme, updated_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (subject_id) DO UPDATE
        SET password_hash = EXCLUDED.password_hash,
            hash_scheme = EXCLUDED.hash_scheme,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(credential.subject_id.0)
    .bind(&credential.password_hash)
    .bind(&credential.hash_scheme)
    .bind(credential.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub struct PostgresCredentialRepository {
    pool: PgPool,
}

impl PostgresCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn upsert(&self, credential: Credential) -> Result<(), CredentialError> {
        upsert_credential(&self.pool, &credential)
            .await
            .map_err(|e| CredentialError::DatabaseError(e.to_string()))
    }

    async fn find(&self, subject_id: &SubjectId) -> Result<Option<Credential>, CredentialError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT subject_id, password_hash, hash_scheme, updated_at
            FROM credentials
            WHERE subject_id = $1
            "#,
        )
        .bind(subject_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CredentialError::DatabaseError(e.to_string()))?;

        Ok(row.map(Credential::from))
    }
}
