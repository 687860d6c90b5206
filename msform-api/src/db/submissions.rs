//! Submission repository
//!
//! One row per submission. Address and files are JSON text columns, so a
//! single INSERT writes the whole record or nothing.

use async_trait::async_trait;
use msform_common::db::{Address, NewSubmission, Submission, UploadedFile};
use msform_common::{time, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Storage-access abstraction for submissions
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Persist a new submission, assigning its id and creation time
    async fn save(&self, submission: NewSubmission) -> Result<Submission>;

    /// Load one submission, `None` if absent
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>>;

    /// Load every submission, newest first
    async fn find_all(&self) -> Result<Vec<Submission>>;
}

/// SQLite-backed repository
#[derive(Clone)]
pub struct SqliteSubmissionRepository {
    pool: SqlitePool,
}

impl SqliteSubmissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for SqliteSubmissionRepository {
    async fn save(&self, submission: NewSubmission) -> Result<Submission> {
        let id = Uuid::new_v4();
        let created_at = time::now_for_storage();

        let address_json = serde_json::to_string(&submission.address)?;
        let files_json = serde_json::to_string(&submission.files)?;

        sqlx::query(
            r#"
            INSERT INTO submissions (id, first_name, last_name, email, phone, address, files, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&submission.first_name)
        .bind(&submission.last_name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(address_json)
        .bind(files_json)
        .bind(time::to_storage(&created_at))
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %id, "Submission row inserted");

        Ok(Submission::from_new(submission, id, created_at))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, phone, address, files, created_at
            FROM submissions
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(submission_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Submission>> {
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, phone, address, files, created_at
            FROM submissions
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(submission_from_row).collect()
    }
}

/// Decode a stored row; corrupt ids, JSON or timestamps are storage faults
fn submission_from_row(row: &SqliteRow) -> Result<Submission> {
    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| Error::Internal(format!("Invalid submission id {}: {}", id_str, e)))?;

    let address_json: String = row.try_get("address")?;
    let address: Address = serde_json::from_str(&address_json)?;

    let files_json: String = row.try_get("files")?;
    let files: Vec<UploadedFile> = serde_json::from_str(&files_json)?;

    let created_at_str: String = row.try_get("created_at")?;
    let created_at = time::from_storage(&created_at_str).map_err(|e| {
        Error::Internal(format!("Invalid created_at for submission {}: {}", id, e))
    })?;

    Ok(Submission {
        id,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        address,
        files,
        created_at,
    })
}
