//! Persistence service
//!
//! Business-rule checks in front of the repository. Does not trust its
//! caller: personal fields are re-checked with the same function the
//! assembler uses.

use std::sync::Arc;

use msform_common::db::{NewSubmission, Submission};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::db::SubmissionRepository;
use crate::validation::{self, ValidationError};

/// Service-level failure
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] msform_common::Error),
}

/// Create and read submissions
#[derive(Clone)]
pub struct FormService {
    repository: Arc<dyn SubmissionRepository>,
}

impl FormService {
    pub fn new(repository: Arc<dyn SubmissionRepository>) -> Self {
        Self { repository }
    }

    /// Persist a submission; storage assigns `id` and `created_at`
    pub async fn create(&self, submission: NewSubmission) -> Result<Submission, ServiceError> {
        validation::require_personal_fields(&submission)?;

        let file_count = submission.files.len();
        let created = self.repository.save(submission).await?;

        info!(id = %created.id, files = file_count, "Submission created");
        Ok(created)
    }

    /// Look up one submission; `Ok(None)` when the id is unknown
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Submission>, ServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// All submissions, newest first
    pub async fn get_all(&self) -> Result<Vec<Submission>, ServiceError> {
        Ok(self.repository.find_all().await?)
    }
}
