//! Tests for the persistence service and assembler against a recording
//! in-memory repository
//!
//! Verifies the service never reaches storage with an invalid submission,
//! and that storage faults surface as storage errors.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use msform_api::db::SubmissionRepository;
use msform_api::intake::{self, FileSource, RawSubmission};
use msform_api::service::{FormService, ServiceError};
use msform_api::validation::ValidationError;
use msform_api::ApiError;
use msform_common::db::{Address, NewSubmission, Submission};
use serde_json::json;
use uuid::Uuid;

/// Repository double that keeps rows in a Vec and can be told to fail
#[derive(Default)]
struct MemoryRepository {
    rows: Mutex<Vec<Submission>>,
    fail_writes: bool,
}

#[async_trait]
impl SubmissionRepository for MemoryRepository {
    async fn save(&self, submission: NewSubmission) -> msform_common::Result<Submission> {
        if self.fail_writes {
            return Err(msform_common::Error::Internal("write failed".to_string()));
        }
        let stored = Submission::from_new(
            submission,
            Uuid::new_v4(),
            msform_common::time::now_for_storage(),
        );
        self.rows.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> msform_common::Result<Option<Submission>> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn find_all(&self) -> msform_common::Result<Vec<Submission>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.reverse();
        Ok(rows)
    }
}

fn complete() -> NewSubmission {
    NewSubmission {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: "a@b.com".to_string(),
        phone: None,
        address: Address {
            line1: "1 Main St".to_string(),
            line2: None,
            city: "Pune".to_string(),
            state: "MH".to_string(),
            country: "India".to_string(),
            zip: "411001".to_string(),
        },
        files: Vec::new(),
    }
}

fn service_with(repo: Arc<MemoryRepository>) -> FormService {
    FormService::new(repo)
}

#[tokio::test]
async fn test_create_then_get_matches_except_identity() {
    let repo = Arc::new(MemoryRepository::default());
    let service = service_with(repo.clone());

    let created = service.create(complete()).await.unwrap();
    let fetched = service.get_by_id(created.id).await.unwrap().unwrap();

    let expected = complete();
    assert_eq!(fetched.first_name, expected.first_name);
    assert_eq!(fetched.last_name, expected.last_name);
    assert_eq!(fetched.email, expected.email);
    assert_eq!(fetched.phone, expected.phone);
    assert_eq!(fetched.address, expected.address);
    assert_eq!(fetched.files, expected.files);
}

#[tokio::test]
async fn test_service_rechecks_personal_fields() {
    let repo = Arc::new(MemoryRepository::default());
    let service = service_with(repo.clone());

    let mut submission = complete();
    submission.last_name = String::new();

    let result = service.create(submission).await;
    assert!(matches!(
        result,
        Err(ServiceError::Validation(ValidationError::MissingPersonalFields))
    ));
    assert!(repo.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_id_is_absent_not_error() {
    let service = service_with(Arc::new(MemoryRepository::default()));
    assert!(service.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_storage_fault_surfaces_as_storage_error() {
    let repo = Arc::new(MemoryRepository {
        fail_writes: true,
        ..Default::default()
    });
    let service = service_with(repo);

    let result = service.create(complete()).await;
    assert!(matches!(result, Err(ServiceError::Storage(_))));
}

#[tokio::test]
async fn test_submit_rejects_before_storage() {
    let repo = Arc::new(MemoryRepository::default());
    let service = service_with(repo.clone());

    let body = json!({
        "firstName": "", "lastName": "Doe", "email": "a@b.com",
        "address": { "line1": "x", "city": "c", "state": "s", "country": "k", "zip": "z" }
    });
    let raw = RawSubmission::new(
        body.as_object().cloned().unwrap(),
        FileSource::Json(Vec::new()),
    );

    let result = intake::submit(&service, raw).await;
    assert!(matches!(
        result,
        Err(ApiError::Validation(ValidationError::MissingPersonalFields))
    ));
    assert!(repo.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_returns_new_id() {
    let repo = Arc::new(MemoryRepository::default());
    let service = service_with(repo.clone());

    let body = json!({
        "firstName": "Jane", "lastName": "Doe", "email": "a@b.com",
        "line1": "x", "city": "c", "state": "s", "country": "k", "zip": "z"
    });
    let raw = RawSubmission::new(
        body.as_object().cloned().unwrap(),
        FileSource::Json(vec![json!({ "originalname": "a.png", "data": "data:image/png;base64,QUJD" })]),
    );

    let id = intake::submit(&service, raw).await.unwrap();

    let rows = repo.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].files[0].content_base64, "QUJD");
    assert_eq!(rows[0].files[0].mime_type, "image/png");
}
