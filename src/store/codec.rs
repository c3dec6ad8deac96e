use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::StoreError;
use crate::model::{normalize_document, DataFile};

/// Pretty-printed JSON with 2-space indentation, as stored in the repo.
pub fn encode_document(doc: &DataFile) -> Result<String, StoreError> {
    serde_json::to_string_pretty(doc).map_err(|e| StoreError::Format(e.to_string()))
}

/// Parse stored JSON and repair it into a consistent document.
pub fn decode_document(text: &str) -> Result<DataFile, StoreError> {
    let mut doc: DataFile =
        serde_json::from_str(text).map_err(|e| StoreError::Format(e.to_string()))?;
    normalize_document(&mut doc);
    Ok(doc)
}

/// Same as [`decode_document`] for an already parsed JSON value.
pub fn decode_value(value: serde_json::Value) -> Result<DataFile, StoreError> {
    let mut doc: DataFile =
        serde_json::from_value(value).map_err(|e| StoreError::Format(e.to_string()))?;
    normalize_document(&mut doc);
    Ok(doc)
}

pub fn encode_base64(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode base64 file content. GitHub wraps it at 60 columns.
pub fn decode_base64(content: &str) -> Result<String, StoreError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Format(format!("invalid base64 content: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| StoreError::Format(format!("content is not UTF-8: {}", e)))
}
