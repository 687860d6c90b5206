//! Submission intake pipeline
//!
//! Turns a raw request (multipart or JSON) into one canonical
//! [`NewSubmission`](msform_common::db::NewSubmission):
//! address normalization, file normalization, assembly, then the
//! creation-gating checks in [`assembler::submit`].

pub mod address;
pub mod assembler;
pub mod files;

use serde_json::{Map, Value};

pub use address::normalize_address;
pub use assembler::{assemble, submit};
pub use files::normalize_files;

/// A file part uploaded as raw bytes
#[derive(Debug, Clone, Default)]
pub struct BinaryPart {
    pub original_name: String,
    pub bytes: Vec<u8>,
    /// Declared MIME type, if the client sent one
    pub mime_type: Option<String>,
    /// Size reported by the transport, if different from `bytes.len()`
    pub size: Option<u64>,
    pub path: Option<String>,
}

/// Where a request's files came from
///
/// Chosen once per request by [`FileSource::select`]; each variant is
/// normalized to the same canonical file type.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Raw binary parts from a multipart body
    Binary(Vec<BinaryPart>),
    /// Loosely-typed descriptors from a JSON `files` array
    Json(Vec<Value>),
}

impl FileSource {
    /// Binary parts win whenever there is at least one; the JSON list is
    /// then ignored entirely.
    pub fn select(binary: Vec<BinaryPart>, json: Vec<Value>) -> Self {
        if binary.is_empty() {
            FileSource::Json(json)
        } else {
            FileSource::Binary(binary)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FileSource::Binary(parts) => parts.len(),
            FileSource::Json(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Request data before normalization
#[derive(Debug, Clone)]
pub struct RawSubmission {
    /// Top-level body fields (personal data, nested or flat address)
    pub body: Map<String, Value>,
    pub files: FileSource,
}

impl RawSubmission {
    pub fn new(body: Map<String, Value>, files: FileSource) -> Self {
        Self { body, files }
    }
}

/// Coerce a loosely-typed JSON value to text
///
/// Missing and null become empty. Scalars use their textual form;
/// arrays and objects their compact JSON.
pub(crate) fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Truthiness of a loosely-typed value
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Text of an optional field, `None` when falsy
pub(crate) fn optional_string(value: Option<&Value>) -> Option<String> {
    if is_truthy(value) {
        Some(coerce_string(value))
    } else {
        None
    }
}
