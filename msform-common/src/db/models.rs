//! Submission records
//!
//! Wire names are camelCase to match the browser wizard's payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Postal address embedded in a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    /// `None` means "not provided", distinct from an empty string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip: String,
}

/// Uploaded document, stored inline in its parent submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub original_name: String,
    pub stored_name: String,
    /// Plain base64, never a `data:` URL
    pub content_base64: String,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Canonical creation request passed between layers
///
/// Everything a stored submission has except the storage-assigned
/// `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: Address,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

/// Persisted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: Address,
    pub files: Vec<UploadedFile>,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Attach storage-assigned identity to a creation request
    pub fn from_new(new: NewSubmission, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            files: new.files,
            created_at,
        }
    }
}
