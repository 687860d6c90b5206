//! Request extraction for form submissions
//!
//! `POST /api/forms` accepts either `multipart/form-data` (binary file parts
//! under `files` plus text fields) or `application/json` (files as base64
//! descriptors). Both are read into a [`RawSubmission`].

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::intake::{BinaryPart, FileSource, RawSubmission};
use crate::validation::{ValidationError, MAX_FILES, MAX_FILE_SIZE};

/// Multipart field carrying uploaded files
const FILES_FIELD: &str = "files";

/// Extractor yielding the un-normalized submission
#[derive(Debug)]
pub struct SubmissionPayload(pub RawSubmission);

#[async_trait]
impl<S> FromRequest<S> for SubmissionPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            read_multipart(multipart).await.map(SubmissionPayload)
        } else if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            from_json_body(value).map(SubmissionPayload)
        } else {
            Err(ApiError::UnsupportedMediaType(
                "Expected application/json or multipart/form-data".to_string(),
            ))
        }
    }
}

/// Split a JSON body into fields and its `files` array
pub fn from_json_body(value: Value) -> Result<RawSubmission, ApiError> {
    let mut body = match value {
        Value::Object(map) => map,
        _ => {
            return Err(ApiError::BadRequest(
                "Request body must be a JSON object".to_string(),
            ))
        }
    };

    let json_files = match body.remove(FILES_FIELD) {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    };

    Ok(RawSubmission::new(body, FileSource::select(Vec::new(), json_files)))
}

async fn read_multipart(mut multipart: Multipart) -> Result<RawSubmission, ApiError> {
    let mut body = Map::new();
    let mut binary = Vec::new();
    let mut json_files = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILES_FIELD {
            if let Some(file_name) = field.file_name().map(str::to_string) {
                if binary.len() >= MAX_FILES {
                    return Err(ValidationError::TooManyFiles.into());
                }
                let mime_type = field.content_type().map(str::to_string);

                // Stop reading as soon as the part outgrows the limit
                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?
                {
                    if (bytes.len() + chunk.len()) as u64 > MAX_FILE_SIZE {
                        return Err(ValidationError::FileTooLarge(file_name).into());
                    }
                    bytes.extend_from_slice(&chunk);
                }

                binary.push(BinaryPart {
                    original_name: file_name,
                    bytes,
                    mime_type,
                    size: None,
                    path: None,
                });
                continue;
            }

            // A text `files` part holds a JSON array of base64 descriptors
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            if let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(&text) {
                json_files.extend(entries);
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        if name == "address" {
            if let Ok(Value::Object(nested)) = serde_json::from_str::<Value>(&text) {
                body.insert(name, Value::Object(nested));
                continue;
            }
        }
        body.insert(name, Value::String(text));
    }

    Ok(RawSubmission::new(body, FileSource::select(binary, json_files)))
}
