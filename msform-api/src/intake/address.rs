//! Address normalization
//!
//! JSON clients nest the address under `address`; multipart clients send
//! the same keys flat at the top level.

use msform_common::db::Address;
use serde_json::{Map, Value};

use super::{coerce_string, optional_string};

/// Build the canonical address from a request body
///
/// A nested `address` object wins; anything else under that key falls back
/// to the top-level fields. Never fails: missing fields become empty strings
/// and a falsy `line2` becomes `None`.
pub fn normalize_address(body: &Map<String, Value>) -> Address {
    let source = match body.get("address") {
        Some(Value::Object(nested)) => nested,
        _ => body,
    };

    Address {
        line1: coerce_string(source.get("line1")),
        line2: optional_string(source.get("line2")),
        city: coerce_string(source.get("city")),
        state: coerce_string(source.get("state")),
        country: coerce_string(source.get("country")),
        zip: coerce_string(source.get("zip")),
    }
}
