use serde_json::{Map, Value};
use thiserror::Error;

/// Raised when the inbound payload is missing or has a malformed field.
///
/// Carries the dotted path of the offending field (`request`,
/// `request.htmlTemplate`, ...). Never reaches the renderer or storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientInputError {
    #[error("Mandatory params {0} is required.")]
    Missing(String),

    #[error("Invalid params {field}: {reason}.")]
    Invalid { field: String, reason: String },
}

impl ClientInputError {
    pub fn missing(field: &str) -> Self {
        ClientInputError::Missing(field.to_string())
    }

    pub fn invalid(field: &str, reason: &str) -> Self {
        ClientInputError::Invalid {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            ClientInputError::Missing(field) => field,
            ClientInputError::Invalid { field, .. } => field,
        }
    }

    /// The `params` map sent back to the caller.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("errmsg".to_string(), Value::String(self.to_string()));
        params
    }
}
