use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::BrowserConfig;

use crate::error::RenderError;

/// Selects the browser launch profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Debug,
    Production,
}

impl RunMode {
    /// `production` (any case) selects [`RunMode::Production`]; anything
    /// else, including an unset variable, runs in debug mode.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("production") => RunMode::Production,
            _ => RunMode::Debug,
        }
    }
}

/// Flags shared by both profiles.
const COMMON_ARGS: &[&str] = &[
    "--disable-background-networking",
    "--disable-extensions",
    "--hide-scrollbars",
    "--mute-audio",
    "--no-first-run",
];

/// Permissive local-development flags: no sandbox, cross-file access.
const DEBUG_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--allow-file-access-from-files",
];

/// Locked-down flags for production: sandbox stays on.
const PRODUCTION_ARGS: &[&str] = &[
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-sync",
    "--disable-default-apps",
];

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub mode: RunMode,
    pub executable: Option<PathBuf>,
    /// Upper bound for one navigation plus network-idle wait.
    pub render_timeout: Duration,
    /// How long the network must stay quiet to count as idle.
    pub idle_window: Duration,
    /// In-flight requests tolerated while idle.
    pub max_inflight: usize,
    pub max_concurrent_renders: usize,
}

impl LaunchOptions {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            executable: None,
            render_timeout: Duration::from_secs(30),
            idle_window: Duration::from_millis(500),
            max_inflight: 0,
            max_concurrent_renders: 4,
        }
    }

    /// Command-line flags for the selected profile.
    pub fn args(&self) -> Vec<&'static str> {
        let profile = match self.mode {
            RunMode::Debug => DEBUG_ARGS,
            RunMode::Production => PRODUCTION_ARGS,
        };
        COMMON_ARGS.iter().chain(profile).copied().collect()
    }

    pub fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .args(self.args())
            .request_timeout(self.render_timeout);
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(RenderError::Launch)
    }
}
