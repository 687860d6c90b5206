//! Submission assembly
//!
//! Normalizes a raw request into a [`NewSubmission`], applies the
//! request-level checks in order and hands the result to the service.

use msform_common::db::NewSubmission;
use uuid::Uuid;

use super::{coerce_string, normalize_address, normalize_files, optional_string, RawSubmission};
use crate::error::ApiResult;
use crate::service::FormService;
use crate::validation;

/// Build the canonical creation request. Never fails.
pub fn assemble(raw: RawSubmission) -> NewSubmission {
    let RawSubmission { body, files } = raw;

    NewSubmission {
        first_name: coerce_string(body.get("firstName")),
        last_name: coerce_string(body.get("lastName")),
        email: coerce_string(body.get("email")),
        phone: optional_string(body.get("phone")),
        address: normalize_address(&body),
        files: normalize_files(files),
    }
}

/// Assemble, validate and persist a submission
///
/// Checks run fail-fast: personal fields, address fields, file bounds.
/// Only the new identifier is returned; the stored payload is never echoed.
pub async fn submit(service: &FormService, raw: RawSubmission) -> ApiResult<Uuid> {
    let submission = assemble(raw);

    validation::require_personal_fields(&submission)?;
    validation::require_address_fields(&submission.address)?;
    validation::require_file_bounds(&submission.files)?;

    let created = service.create(submission).await?;
    Ok(created.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::FileSource;
    use serde_json::{json, Value};

    fn raw(body: Value, files: FileSource) -> RawSubmission {
        RawSubmission::new(body.as_object().cloned().unwrap_or_default(), files)
    }

    #[test]
    fn test_assemble_full_json_body() {
        let submission = assemble(raw(
            json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "email": "jane@example.com",
                "phone": "9876543210",
                "address": {
                    "line1": "1 Main St", "city": "Pune", "state": "MH",
                    "country": "India", "zip": "411001"
                }
            }),
            FileSource::Json(vec![json!({
                "originalname": "id.png",
                "data": "data:image/png;base64,QUJD",
                "size": 3
            })]),
        ));

        assert_eq!(submission.first_name, "Jane");
        assert_eq!(submission.phone.as_deref(), Some("9876543210"));
        assert_eq!(submission.address.city, "Pune");
        assert_eq!(submission.files.len(), 1);
        assert_eq!(submission.files[0].content_base64, "QUJD");
    }

    #[test]
    fn test_assemble_empty_phone_is_absent() {
        let submission = assemble(raw(json!({ "phone": "" }), FileSource::Json(Vec::new())));
        assert_eq!(submission.phone, None);
        assert_eq!(submission.first_name, "");
        assert!(submission.files.is_empty());
    }
}
