use std::path::PathBuf;
use std::time::Duration;

use print_core::models::request::StorageDefaults;
use print_render::options::{LaunchOptions, RunMode};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Process-wide settings, read once at startup and passed down explicitly.
#[derive(Clone)]
pub struct ServiceConfig {
    pub account_name: String,
    pub account_key: String,
    pub default_container: String,
    /// Overrides `https://<account>.blob.core.windows.net` for uploads.
    pub blob_endpoint: Option<String>,
    pub mode: RunMode,
    pub port: u16,
    pub chrome_executable: Option<PathBuf>,
    pub render_timeout: Duration,
    pub max_concurrent_renders: usize,
    /// Where templates, HTML and PDFs live while a request is in flight.
    pub work_dir: PathBuf,
    /// Local template references must resolve inside this directory. Unset
    /// disables local references entirely.
    pub template_root: Option<PathBuf>,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("default_container", &self.default_container)
            .field("blob_endpoint", &self.blob_endpoint)
            .field("mode", &self.mode)
            .field("port", &self.port)
            .field("chrome_executable", &self.chrome_executable)
            .field("render_timeout", &self.render_timeout)
            .field("max_concurrent_renders", &self.max_concurrent_renders)
            .field("work_dir", &self.work_dir)
            .field("template_root", &self.template_root)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            account_name: required("AZURE_ACCOUNT_NAME")?,
            account_key: required("AZURE_ACCOUNT_KEY")?,
            default_container: required("AZURE_CONTAINER_NAME")?,
            blob_endpoint: get("AZURE_BLOB_ENDPOINT"),
            mode: RunMode::from_env_value(get("APP_ENV").as_deref()),
            port: parse_or(get("PORT"), "PORT", 5000)?,
            chrome_executable: get("CHROME_PATH").map(PathBuf::from),
            render_timeout: Duration::from_secs(parse_or(
                get("RENDER_TIMEOUT_SECS"),
                "RENDER_TIMEOUT_SECS",
                30,
            )?),
            max_concurrent_renders: parse_or(
                get("MAX_CONCURRENT_RENDERS"),
                "MAX_CONCURRENT_RENDERS",
                4,
            )?,
            work_dir: get("PRINT_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("print-service")),
            template_root: get("TEMPLATE_ROOT").map(PathBuf::from),
            max_body_bytes: parse_or(
                get("MAX_BODY_BYTES"),
                "MAX_BODY_BYTES",
                DEFAULT_MAX_BODY_BYTES,
            )?,
        })
    }

    pub fn storage_defaults(&self) -> StorageDefaults {
        StorageDefaults::new(self.default_container.clone())
    }

    pub fn launch_options(&self) -> LaunchOptions {
        let mut options = LaunchOptions::new(self.mode);
        options.executable = self.chrome_executable.clone();
        options.render_timeout = self.render_timeout;
        options.max_concurrent_renders = self.max_concurrent_renders;
        options
    }

    pub fn is_production(&self) -> bool {
        self.mode == RunMode::Production
    }
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        },
    }
}
