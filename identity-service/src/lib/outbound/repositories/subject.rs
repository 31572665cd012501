use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::credential::models::Credential;
use crate::domain::subject::errors::SubjectError;
use crate::domain::subject::models::EmailAddress;
use crate::domain::subject::models::Role;
use crate::domain::subject::models::Subject;
use crate::domain::subject::models::SubjectId;
use crate::domain::subject::models::Username;
use crate::domain::subject::ports::SubjectRepository;

const SUBJECT_COLUMNS: &str = "id, username, email, role, is_active, created_at";

#[derive(sqlx::FromRow)]
struct SubjectRow {
    id: Uuid,
    username: String,
    email: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubjectRow> for Subject {
    type Error = SubjectError;

    fn try_from(row: SubjectRow) -> Result<Self, Self::Error> {
        Ok(Subject {
            id: SubjectId(row.id),
            username: Username::new(row.username)?,
            email: EmailAddress::new(row.email)?,
            role: row.role.parse::<Role>()?,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> SubjectError {
    SubjectError::DatabaseError(e.to_string())
}

pub struct PostgresSubjectRepository {
    pool: PgPool,
}

impl PostgresSubjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        value: &str,
    ) -> Result<Option<Subject>, SubjectError> {
        let sql = format!("SELECT {} FROM subjects WHERE {}", SUBJECT_COLUMNS, clause);
        sqlx::query_as::<_, SubjectRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(Subject::try_from)
            .transpose()
    }
}

#[async_trait]
impl SubjectRepository for PostgresSubjectRepository {
    async fn create(&self, subject: Subject, credential: Credential) -> Result<Subject, SubjectError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO subjects (id, username, email, role, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(subject.id.0)
        .bind(subject.username.as_str())
        .bind(subject.email.as_str())
        .bind(subject.role.as_str())
        .bind(subject.is_active)
        .bind(subject.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some("subjects_username_key") {
                        return SubjectError::UsernameAlreadyExists(
                            subject.username.as_str().to_string(),
                        );
                    }
                    if db_err.constraint() == Some("subjects_email_key") {
                        return SubjectError::EmailAlreadyExists(subject.email.as_str().to_string());
                    }
                }
            }
            SubjectError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            r#"
            INSERT INTO credentials (subject_id, password_hash, hash_scheme, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(credential.subject_id.0)
        .bind(&credential.password_hash)
        .bind(&credential.hash_scheme)
        .bind(credential.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        sqlx::query("INSERT INTO profiles (subject_id, created_at) VALUES ($1, $2)")
            .bind(subject.id.0)
            .bind(subject.created_at)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(subject)
    }

    async fn find_by_id(&self, id: &SubjectId) -> Result<Option<Subject>, SubjectError> {
        let sql = format!("SELECT {} FROM subjects WHERE id = $1", SUBJECT_COLUMNS);
        sqlx::query_as::<_, SubjectRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(Subject::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Subject>, SubjectError> {
        self.fetch_one_where("email = $1", email.as_str()).await
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Subject>, SubjectError> {
        if identifier.contains('@') {
            self.fetch_one_where("email = $1", &identifier.to_lowercase())
                .await
        } else {
            self.fetch_one_where("username = $1", identifier).await
        }
    }

    async fn update_role(&self, id: &SubjectId, role: Role) -> Result<Subject, SubjectError> {
        let sql = format!(
            "UPDATE subjects SET role = $2 WHERE id = $1 RETURNING {}",
            SUBJECT_COLUMNS
        );
        sqlx::query_as::<_, SubjectRow>(&sql)
            .bind(id.0)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or_else(|| SubjectError::NotFound(id.to_string()))
            .and_then(Subject::try_from)
    }

    async fn set_active(&self, id: &SubjectId, is_active: bool) -> Result<Subject, SubjectError> {
        let sql = format!(
            "UPDATE subjects SET is_active = $2 WHERE id = $1 RETURNING {}",
            SUBJECT_COLUMNS
        );
        sqlx::query_as::<_, SubjectRow>(&sql)
            .bind(id.0)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or_else(|| SubjectError::NotFound(id.to_string()))
            .and_then(Subject::try_from)
    }
}
