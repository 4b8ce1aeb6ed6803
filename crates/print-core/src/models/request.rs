use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::blob_keys;

/// Where a rendered artifact is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageParams {
    pub container_name: String,
    pub path: String,
}

/// Service-wide storage target used when the caller omits one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDefaults {
    pub container_name: String,
    pub path: String,
}

impl StorageDefaults {
    pub fn new(container_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
            path: blob_keys::DEFAULT_PATH_PREFIX.to_string(),
        }
    }

    pub fn to_params(&self) -> StorageParams {
        StorageParams {
            container_name: self.container_name.clone(),
            path: self.path.clone(),
        }
    }
}

/// Storage overrides as supplied by the caller. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageOverrides {
    pub container_name: Option<String>,
    pub path: Option<String>,
}

impl StorageParams {
    /// Resolve the storage target, keeping supplied sub-fields verbatim and
    /// filling the rest from `defaults`. Empty strings count as absent.
    pub fn resolve(overrides: Option<&StorageOverrides>, defaults: &StorageDefaults) -> Self {
        let Some(overrides) = overrides else {
            return defaults.to_params();
        };

        let pick = |value: &Option<String>, fallback: &str| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        StorageParams {
            container_name: pick(&overrides.container_name, &defaults.container_name),
            path: pick(&overrides.path, &defaults.path),
        }
    }
}

/// A validated, not yet composed print request.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintInput {
    pub html_template: String,
    pub context: Map<String, Value>,
    pub storage: Option<StorageOverrides>,
}

/// One print job. Immutable once composed.
#[derive(Debug, Clone)]
pub struct PrintRequest {
    request_id: Uuid,
    context: Map<String, Value>,
    html_template: String,
    storage_params: StorageParams,
}

impl PrintRequest {
    /// Compose a request from validated input, assigning a fresh
    /// time-ordered id.
    pub fn compose(input: PrintInput, defaults: &StorageDefaults) -> Self {
        let storage_params = StorageParams::resolve(input.storage.as_ref(), defaults);
        Self {
            request_id: Uuid::now_v7(),
            context: input.context,
            html_template: input.html_template,
            storage_params,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn html_template(&self) -> &str {
        &self.html_template
    }

    pub fn storage_params(&self) -> &StorageParams {
        &self.storage_params
    }

    pub fn download_params(&self) -> DownloadParams {
        DownloadParams::new(self.html_template.clone())
    }
}

/// Describes a template to fetch. Carries nothing but the reference itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadParams {
    template: String,
}

impl DownloadParams {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> StorageDefaults {
        StorageDefaults::new("reports")
    }

    #[test]
    fn missing_storage_params_use_defaults() {
        let resolved = StorageParams::resolve(None, &defaults());
        assert_eq!(resolved.container_name, "reports");
        assert_eq!(resolved.path, "print-service/");
    }

    #[test]
    fn partial_storage_params_keep_supplied_field() {
        let overrides = StorageOverrides {
            container_name: None,
            path: Some("invoices/2024/".to_string()),
        };
        let resolved = StorageParams::resolve(Some(&overrides), &defaults());
        assert_eq!(resolved.path, "invoices/2024/");
        assert_eq!(resolved.container_name, "reports");
    }

    #[test]
    fn empty_override_counts_as_absent() {
        let overrides = StorageOverrides {
            container_name: Some(String::new()),
            path: Some(String::new()),
        };
        assert_eq!(
            StorageParams::resolve(Some(&overrides), &defaults()),
            defaults().to_params()
        );
    }

    #[test]
    fn composed_requests_get_distinct_time_ordered_ids() {
        let input = PrintInput {
            html_template: "<p>hi</p>".to_string(),
            context: Map::new(),
            storage: None,
        };
        let first = PrintRequest::compose(input.clone(), &defaults());
        let second = PrintRequest::compose(input, &defaults());
        assert_ne!(first.request_id(), second.request_id());
        assert_eq!(first.request_id().get_version_num(), 7);
        assert!(first.request_id() < second.request_id());
        assert_eq!(first.download_params().template(), "<p>hi</p>");
    }
}
