mod models;

pub use models::*;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::RepositoryError;

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, record: NewSubmission) -> Result<Submission, RepositoryError>;

    async fn list_by_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<Vec<Submission>, RepositoryError>;

    async fn list_approved_for_calendar(&self) -> Result<Vec<CalendarEntry>, RepositoryError> {
        let approved = self.list_by_status(SubmissionStatus::Approved).await?;
        Ok(approved.into_iter().map(CalendarEntry::from).collect())
    }

    // Idempotent; an unknown id is NotFound.
    async fn set_approved(&self, id: i64) -> Result<(), RepositoryError>;
}

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub struct PgSubmissionRepository {
    pool: PgPool,
}

impl PgSubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for PgSubmissionRepository {
    async fn create(&self, record: NewSubmission) -> Result<Submission, RepositoryError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            INSERT INTO submissions (full_name, email, project_title, project_description,
                                     video_link, presentation_url, paper_url, logo_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&record.full_name)
        .bind(&record.email)
        .bind(&record.project_title)
        .bind(&record.project_description)
        .bind(&record.video_link)
        .bind(&record.presentation_url)
        .bind(&record.paper_url)
        .bind(&record.logo_url)
        .bind(record.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_by_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            "SELECT * FROM submissions WHERE status = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn list_approved_for_calendar(&self) -> Result<Vec<CalendarEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, (i64, String, String, chrono::DateTime<chrono::Utc>)>(
            r#"
            SELECT id, full_name, project_title, created_at
            FROM submissions
            WHERE status = 'approved'
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, full_name, project_title, created_at)| CalendarEntry {
                id,
                full_name,
                project_title,
                created_at,
            })
            .collect())
    }

    async fn set_approved(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE submissions SET status = 'approved' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
