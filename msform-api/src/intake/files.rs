//! File normalization
//!
//! Both transports end up as [`UploadedFile`] with plain base64 content.
//! Nothing here rejects input: malformed descriptors degrade to defaults
//! (name `"file"`, size 0, `application/octet-stream`).

use base64::{engine::general_purpose, Engine as _};
use msform_common::db::UploadedFile;
use serde_json::{Map, Value};

use super::{coerce_string, BinaryPart, FileSource};

/// MIME type used when neither the client nor the payload declares one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Normalize every file in the request, preserving order
pub fn normalize_files(source: FileSource) -> Vec<UploadedFile> {
    match source {
        FileSource::Binary(parts) => parts.into_iter().map(from_binary).collect(),
        FileSource::Json(entries) => entries.iter().map(from_json).collect(),
    }
}

fn from_binary(part: BinaryPart) -> UploadedFile {
    let size_bytes = part.size.unwrap_or(part.bytes.len() as u64);
    let mime_type = part
        .mime_type
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    UploadedFile {
        stored_name: part.original_name.clone(),
        original_name: part.original_name,
        content_base64: general_purpose::STANDARD.encode(&part.bytes),
        mime_type,
        size_bytes,
        path: part.path,
    }
}

fn from_json(entry: &Value) -> UploadedFile {
    let empty = Map::new();
    let fields = entry.as_object().unwrap_or(&empty);
    let present = |key: &str| fields.get(key).filter(|v| !v.is_null());

    let original_name = present("originalname")
        .or_else(|| present("filename"))
        .map(|v| coerce_string(Some(v)))
        .unwrap_or_else(|| "file".to_string());

    let raw_data = coerce_string(fields.get("data"));

    let mime_type = present("mimeType")
        .or_else(|| present("mimetype"))
        .map(|v| coerce_string(Some(v)))
        .or_else(|| data_url_mime_type(&raw_data).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    let path = match fields.get("path") {
        Some(Value::String(p)) => Some(p.clone()),
        _ => None,
    };

    UploadedFile {
        stored_name: original_name.clone(),
        original_name,
        content_base64: strip_data_url(&raw_data).to_string(),
        mime_type,
        size_bytes: parse_size(fields.get("size")),
        path,
    }
}

/// Drop a `data:<mime>;base64,` prefix
///
/// Keeps everything after the first comma. Input without a comma is
/// taken to be plain base64 already and returned unchanged.
pub fn strip_data_url(value: &str) -> &str {
    match value.find(',') {
        Some(comma) => &value[comma + 1..],
        None => value,
    }
}

/// MIME type declared in a data-URL header, if any
pub fn data_url_mime_type(value: &str) -> Option<&str> {
    let header = value.strip_prefix("data:")?;
    let header = &header[..header.find(',')?];
    let mime = header.split(';').next().unwrap_or_default().trim();
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

/// Declared size, or 0 when missing, negative or unparseable
fn parse_size(value: Option<&Value>) -> u64 {
    let as_float = |f: f64| if f.is_finite() && f >= 0.0 { f as u64 } else { 0 };

    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_else(|| n.as_f64().map(as_float).unwrap_or(0)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(as_float))
                .unwrap_or(0)
        }
        _ => 0,
    }
}
