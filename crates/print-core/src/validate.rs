//! Shape checks on inbound payloads.
//!
//! Checks run in a fixed order and stop at the first failure, so a payload
//! with several problems always reports the same single field.

use serde_json::{Map, Value};

use crate::error::ClientInputError;
use crate::models::request::{PrintInput, StorageOverrides};

/// Validate a `POST` print body of the form `{ "request": { ... } }`.
pub fn print_payload(payload: &Value) -> Result<PrintInput, ClientInputError> {
    let request = payload
        .get("request")
        .and_then(Value::as_object)
        .ok_or_else(|| ClientInputError::missing("request"))?;

    let html_template = request
        .get("htmlTemplate")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientInputError::missing("request.htmlTemplate"))?
        .to_string();

    let context = match request.get("context") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(ClientInputError::invalid(
                "request.context",
                "expected an object",
            ));
        }
    };

    let storage = match request.get("storageParams") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(storage_overrides(map)?),
        Some(_) => {
            return Err(ClientInputError::invalid(
                "request.storageParams",
                "expected an object",
            ));
        }
    };

    Ok(PrintInput {
        html_template,
        context,
        storage,
    })
}

fn storage_overrides(map: &Map<String, Value>) -> Result<StorageOverrides, ClientInputError> {
    let field = |name: &str| match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ClientInputError::invalid(
            &format!("request.storageParams.{name}"),
            "expected a string",
        )),
    };

    Ok(StorageOverrides {
        path: field("path")?,
        container_name: field("containerName")?,
    })
}

/// Validate the `fileUrl` query parameter of the direct URL endpoint.
/// Only `http` and `https` targets are rendered.
pub fn file_url(raw: Option<&str>) -> Result<String, ClientInputError> {
    let raw = raw
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ClientInputError::missing("fileUrl"))?;

    let scheme = raw.split_once("://").map(|(s, _)| s.to_ascii_lowercase());
    match scheme.as_deref() {
        Some("http") | Some("https") => Ok(raw.to_string()),
        _ => Err(ClientInputError::invalid(
            "fileUrl",
            "expected an http or https URL",
        )),
    }
}
