//! Submission validation
//!
//! Two kinds of checks live here:
//! - Required-field presence and file bounds. These gate creation and are
//!   called from both the assembler and the persistence service.
//! - Field-level format checks (email, phone, ZIP, document types) that mirror
//!   the browser wizard. These are advisory and back `POST /api/forms/validate`.

use std::collections::BTreeMap;

use msform_common::db::{Address, NewSubmission, UploadedFile};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Maximum number of files per submission
pub const MAX_FILES: usize = 5;
/// Maximum size of a single file (5 MiB)
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
/// Document types the wizard accepts
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "application/pdf"];

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-\s]{7,15}$").expect("valid phone regex"));
static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid zip regex"));

/// Creation-blocking validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required personal fields: firstName/lastName/email")]
    MissingPersonalFields,

    #[error("Missing required address fields: line1, city, state, country, zip")]
    MissingAddressFields,

    #[error("Maximum 5 files allowed")]
    TooManyFiles,

    #[error("File \"{0}\" exceeds 5MB")]
    FileTooLarge(String),
}

/// Field name → human-readable problem, in field-name order
pub type FieldErrors = BTreeMap<&'static str, String>;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Names of required personal fields that are empty
pub fn missing_personal_fields(submission: &NewSubmission) -> Vec<&'static str> {
    [
        ("firstName", &submission.first_name),
        ("lastName", &submission.last_name),
        ("email", &submission.email),
    ]
    .into_iter()
    .filter(|(_, value)| is_blank(value))
    .map(|(name, _)| name)
    .collect()
}

/// Names of required address fields that are empty
pub fn missing_address_fields(address: &Address) -> Vec<&'static str> {
    [
        ("line1", &address.line1),
        ("city", &address.city),
        ("state", &address.state),
        ("country", &address.country),
        ("zip", &address.zip),
    ]
    .into_iter()
    .filter(|(_, value)| is_blank(value))
    .map(|(name, _)| name)
    .collect()
}

pub fn require_personal_fields(submission: &NewSubmission) -> Result<(), ValidationError> {
    let missing = missing_personal_fields(submission);
    if missing.is_empty() {
        Ok(())
    } else {
        tracing::debug!(?missing, "Rejecting submission: personal fields missing");
        Err(ValidationError::MissingPersonalFields)
    }
}

pub fn require_address_fields(address: &Address) -> Result<(), ValidationError> {
    let missing = missing_address_fields(address);
    if missing.is_empty() {
        Ok(())
    } else {
        tracing::debug!(?missing, "Rejecting submission: address fields missing");
        Err(ValidationError::MissingAddressFields)
    }
}

/// Byte length of base64 content once decoded
///
/// Counts alphabet characters only, so padding and line breaks are ignored.
pub fn decoded_len(content_base64: &str) -> u64 {
    let symbols = content_base64
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b'=')
        .count() as u64;
    symbols * 3 / 4
}

/// Size checked against [`MAX_FILE_SIZE`]: the larger of the declared size
/// and the content actually carried
pub fn effective_size(file: &UploadedFile) -> u64 {
    file.size_bytes.max(decoded_len(&file.content_base64))
}

/// File count and per-file size bounds
///
/// Zero files is accepted; "at least one document" is a wizard rule.
pub fn require_file_bounds(files: &[UploadedFile]) -> Result<(), ValidationError> {
    if files.len() > MAX_FILES {
        return Err(ValidationError::TooManyFiles);
    }
    match files.iter().find(|f| effective_size(f) > MAX_FILE_SIZE) {
        Some(file) => Err(ValidationError::FileTooLarge(file.original_name.clone())),
        None => Ok(()),
    }
}

/// Wizard step 1: names, email format, optional phone format
pub fn validate_personal(
    first_name: &str,
    last_name: &str,
    email: &str,
    phone: Option<&str>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(first_name) {
        errors.insert("firstName", "First name is required".to_string());
    }
    if is_blank(last_name) {
        errors.insert("lastName", "Last name is required".to_string());
    }
    if is_blank(email) {
        errors.insert("email", "Email is required".to_string());
    } else if !EMAIL_RE.is_match(email) {
        errors.insert("email", "Email is not valid".to_string());
    }
    if let Some(phone) = phone.filter(|p| !is_blank(p)) {
        if !PHONE_RE.is_match(phone) {
            errors.insert("phone", "Phone number looks invalid".to_string());
        }
    }

    errors
}

/// Wizard step 2: every address line except `line2`, plus a 6-digit ZIP
pub fn validate_address(address: &Address) -> FieldErrors {
    let messages = [
        ("line1", "Address Line 1 is required"),
        ("city", "City is required"),
        ("state", "State is required"),
        ("country", "Country is required"),
        ("zip", "ZIP / Postal code is required"),
    ];
    let missing = missing_address_fields(address);

    let mut errors: FieldErrors = messages
        .into_iter()
        .filter(|(field, _)| missing.contains(field))
        .map(|(field, message)| (field, message.to_string()))
        .collect();

    if !missing.contains(&"zip") && !ZIP_RE.is_match(address.zip.trim()) {
        errors.insert("zip", "ZIP must be a 6-digit number".to_string());
    }

    errors
}

/// Wizard step 3: one to five documents of an accepted type and size
///
/// Reports the first problem only, as the wizard does.
pub fn validate_documents(files: &[UploadedFile]) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if files.is_empty() {
        errors.insert(
            "files",
            "Please upload at least one document (image/pdf)".to_string(),
        );
        return errors;
    }
    if files.len() > MAX_FILES {
        errors.insert("files", format!("Maximum {} files allowed", MAX_FILES));
        return errors;
    }

    for file in files {
        if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
            errors.insert(
                "files",
                format!(
                    "File \"{}\" has unsupported type ({})",
                    file.original_name, file.mime_type
                ),
            );
            break;
        }
        if effective_size(file) > MAX_FILE_SIZE {
            errors.insert(
                "files",
                format!(
                    "File \"{}\" exceeds {}MB",
                    file.original_name,
                    MAX_FILE_SIZE / 1024 / 1024
                ),
            );
            break;
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address {
            line1: "1 Main St".to_string(),
            line2: None,
            city: "Pune".to_string(),
            state: "MH".to_string(),
            country: "India".to_string(),
            zip: "411001".to_string(),
        }
    }

    fn submission() -> NewSubmission {
        NewSubmission {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "a@b.com".to_string(),
            phone: None,
            address: address(),
            files: Vec::new(),
        }
    }

    fn file(name: &str, mime: &str, size: u64) -> UploadedFile {
        UploadedFile {
            original_name: name.to_string(),
            stored_name: name.to_string(),
            content_base64: "QUJD".to_string(),
            mime_type: mime.to_string(),
            size_bytes: size,
            path: None,
        }
    }

    #[test]
    fn test_complete_submission_passes_presence_checks() {
        let s = submission();
        assert!(require_personal_fields(&s).is_ok());
        assert!(require_address_fields(&s.address).is_ok());
        assert!(require_file_bounds(&s.files).is_ok());
    }

    #[test]
    fn test_empty_first_name_is_missing_personal() {
        let mut s = submission();
        s.first_name = String::new();

        assert_eq!(missing_personal_fields(&s), vec!["firstName"]);
        assert_eq!(
            require_personal_fields(&s),
            Err(ValidationError::MissingPersonalFields)
        );
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut s = submission();
        s.email = "   ".to_string();
        s.address.city = "\t".to_string();

        assert_eq!(missing_personal_fields(&s), vec!["email"]);
        assert_eq!(missing_address_fields(&s.address), vec!["city"]);
    }

    #[test]
    fn test_empty_zip_is_missing_address() {
        let mut s = submission();
        s.address.zip = String::new();

        assert_eq!(
            require_address_fields(&s.address),
            Err(ValidationError::MissingAddressFields)
        );
    }

    #[test]
    fn test_line2_is_never_required() {
        let mut a = address();
        a.line2 = Some(String::new());
        assert!(missing_address_fields(&a).is_empty());
    }

    #[test]
    fn test_file_bounds() {
        let five: Vec<_> = (0..5).map(|i| file(&format!("{i}.pdf"), "application/pdf", 10)).collect();
        assert!(require_file_bounds(&five).is_ok());

        let mut six = five.clone();
        six.push(file("extra.pdf", "application/pdf", 10));
        assert_eq!(require_file_bounds(&six), Err(ValidationError::TooManyFiles));

        let big = vec![file("scan.pdf", "application/pdf", MAX_FILE_SIZE + 1)];
        assert_eq!(
            require_file_bounds(&big),
            Err(ValidationError::FileTooLarge("scan.pdf".to_string()))
        );

        let exact = vec![file("scan.pdf", "application/pdf", MAX_FILE_SIZE)];
        assert!(require_file_bounds(&exact).is_ok());
    }

    #[test]
    fn test_validate_personal_formats() {
        assert!(validate_personal("Jane", "Doe", "jane@example.com", Some("+91 98765-43210")).is_empty());

        let errors = validate_personal("", "Doe", "not-an-email", Some("12"));
        assert_eq!(errors.get("firstName").unwrap(), "First name is required");
        assert_eq!(errors.get("email").unwrap(), "Email is not valid");
        assert_eq!(errors.get("phone").unwrap(), "Phone number looks invalid");
        assert!(!errors.contains_key("lastName"));
    }

    #[test]
    fn test_blank_phone_is_not_checked() {
        assert!(validate_personal("Jane", "Doe", "a@b.com", Some("  ")).is_empty());
        assert!(validate_personal("Jane", "Doe", "a@b.com", None).is_empty());
    }

    #[test]
    fn test_validate_address_messages() {
        let mut a = address();
        a.line1 = String::new();
        a.zip = String::new();

        let errors = validate_address(&a);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("line1").unwrap(), "Address Line 1 is required");
        assert_eq!(errors.get("zip").unwrap(), "ZIP / Postal code is required");
    }

    #[test]
    fn test_zip_must_be_six_digits() {
        assert!(validate_address(&address()).is_empty());

        for bad in ["4110", "41100a", "4110011", "SW1A 1AA"] {
            let mut a = address();
            a.zip = bad.to_string();
            assert_eq!(
                validate_address(&a).get("zip").unwrap(),
                "ZIP must be a 6-digit number",
                "zip {bad:?}"
            );
        }

        // Advisory only: presence is all creation requires
        let mut a = address();
        a.zip = "SW1A 1AA".to_string();
        assert!(require_address_fields(&a).is_ok());
    }

    #[test]
    fn test_decoded_len() {
        assert_eq!(decoded_len(""), 0);
        assert_eq!(decoded_len("QUJD"), 3);
        assert_eq!(decoded_len("/wA="), 2);
        assert_eq!(decoded_len("QQ=="), 1);
        assert_eq!(decoded_len("QUJD\nQUJD"), 6);
    }

    #[test]
    fn test_content_larger_than_declared_size_is_too_large() {
        let mut f = file("scan.pdf", "application/pdf", 1);
        f.content_base64 = "A".repeat(((MAX_FILE_SIZE / 3 + 1) * 4) as usize);

        assert_eq!(effective_size(&f), (MAX_FILE_SIZE / 3 + 1) * 3);
        assert_eq!(
            require_file_bounds(&[f.clone()]),
            Err(ValidationError::FileTooLarge("scan.pdf".to_string()))
        );
        assert_eq!(
            validate_documents(&[f]).get("files").unwrap(),
            "File \"scan.pdf\" exceeds 5MB"
        );
    }

    #[test]
    fn test_validate_documents() {
        assert_eq!(
            validate_documents(&[]).get("files").unwrap(),
            "Please upload at least one document (image/pdf)"
        );

        let ok = vec![file("a.png", "image/png", 100), file("b.pdf", "application/pdf", 200)];
        assert!(validate_documents(&ok).is_empty());

        let gif = vec![file("c.gif", "image/gif", 100)];
        assert_eq!(
            validate_documents(&gif).get("files").unwrap(),
            "File \"c.gif\" has unsupported type (image/gif)"
        );

        let big = vec![file("d.jpg", "image/jpeg", MAX_FILE_SIZE + 1)];
        assert_eq!(
            validate_documents(&big).get("files").unwrap(),
            "File \"d.jpg\" exceeds 5MB"
        );
    }
}
