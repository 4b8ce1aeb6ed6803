use std::collections::VecDeque;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use print_core::blob_keys;
use print_core::models::request::DownloadParams;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::error::TemplateError;
use crate::source::TemplateRef;

const BUNDLE_ENTRY: &str = "index.html";

/// A template materialized on local disk.
#[derive(Debug, Clone)]
pub struct ProcessedTemplate {
    /// The HTML document to render.
    pub path: PathBuf,
    /// Where relative references in the template should resolve from.
    pub base: Option<Url>,
    /// Everything written under the work directory for this template.
    pub artifacts: Vec<PathBuf>,
}

/// Resolves template references into files under the work directory.
#[derive(Debug, Clone)]
pub struct TemplateProcessor {
    http: reqwest::Client,
    work_dir: PathBuf,
    template_root: Option<PathBuf>,
}

struct Fetched {
    bytes: Vec<u8>,
    is_zip: bool,
}

impl TemplateProcessor {
    pub fn new(http: reqwest::Client, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            work_dir: work_dir.into(),
            template_root: None,
        }
    }

    /// Allow local references, confined to files under `root`. Without a
    /// root every local reference is refused.
    pub fn with_template_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.template_root = Some(root.into());
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Fetch or read the referenced template and persist it under the work
    /// directory. Zip bundles are extracted and their `index.html` becomes
    /// the document. Anything partially written is removed before returning
    /// an error.
    pub async fn process(
        &self,
        params: &DownloadParams,
    ) -> Result<ProcessedTemplate, TemplateError> {
        let reference = TemplateRef::parse(params.template())?;
        let bundle = reference.is_bundle();

        match reference {
            TemplateRef::Inline(html) => self.write_single(html.into_bytes(), None).await,
            TemplateRef::Remote(url) => {
                let fetched = self.fetch_remote(&url).await?;
                if bundle || fetched.is_zip {
                    self.extract_bundle(fetched.bytes).await
                } else {
                    self.write_single(fetched.bytes, Some(url)).await
                }
            }
            TemplateRef::Local(path) => {
                let path = self.confine(&path).await?;
                let bytes = read_local(&path).await?;
                if bundle {
                    self.extract_bundle(bytes).await
                } else {
                    let base = Url::from_file_path(&path).ok();
                    self.write_single(bytes, base).await
                }
            }
        }
    }

    async fn write_single(
        &self,
        bytes: Vec<u8>,
        base: Option<Url>,
    ) -> Result<ProcessedTemplate, TemplateError> {
        let path = self
            .work_dir
            .join(blob_keys::template_file_name(Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(TemplateError::io(&path, e));
        }

        info!(path = %path.display(), bytes = bytes.len(), "template materialized");
        Ok(ProcessedTemplate {
            artifacts: vec![path.clone()],
            path,
            base,
        })
    }

    async fn extract_bundle(&self, bytes: Vec<u8>) -> Result<ProcessedTemplate, TemplateError> {
        let dir = self
            .work_dir
            .join(blob_keys::bundle_dir_name(Uuid::new_v4()));
        let target = dir.clone();

        let unpacked = tokio::task::spawn_blocking(move || unpack(bytes, &target))
            .await
            .map_err(|e| TemplateError::Bundle(e.to_string()))
            .and_then(|r| r);

        match unpacked {
            Ok(index) => {
                info!(bundle = %dir.display(), entry = %index.display(), "template bundle extracted");
                Ok(ProcessedTemplate {
                    base: Url::from_file_path(&index).ok(),
                    path: index,
                    artifacts: vec![dir],
                })
            }
            Err(e) => {
                let _ = tokio::fs::remove_dir_all(&dir).await;
                Err(e)
            }
        }
    }

    /// Resolve a local reference against the template root, following
    /// symlinks, and refuse anything that lands outside it.
    async fn confine(&self, path: &Path) -> Result<PathBuf, TemplateError> {
        let Some(root) = &self.template_root else {
            return Err(TemplateError::InvalidReference(format!(
                "{}: local templates are disabled",
                path.display()
            )));
        };
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|e| TemplateError::io(root, e))?;

        let candidate = root.join(path);
        let resolved = match tokio::fs::canonicalize(&candidate).await {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TemplateError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(TemplateError::io(&candidate, e)),
        };

        if !resolved.starts_with(&root) {
            return Err(TemplateError::InvalidReference(format!(
                "{} is outside the template root",
                path.display()
            )));
        }
        Ok(resolved)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Fetched, TemplateError> {
        debug!(%url, "fetching remote template");
        let fetch_err = |e: reqwest::Error| TemplateError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        };

        let resp = self.http.get(url.clone()).send().await.map_err(fetch_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TemplateError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let is_zip = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.starts_with("application/zip") || ct.starts_with("application/x-zip")
            });

        Ok(Fetched {
            bytes: resp.bytes().await.map_err(fetch_err)?.to_vec(),
            is_zip,
        })
    }
}

async fn read_local(path: &Path) -> Result<Vec<u8>, TemplateError> {
    tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TemplateError::NotFound(path.display().to_string())
        } else {
            TemplateError::io(path, e)
        }
    })
}

/// Extract an archive into `dir` and locate its entry document. Entry names
/// that would escape `dir` are rejected by the archive reader.
fn unpack(bytes: Vec<u8>, dir: &Path) -> Result<PathBuf, TemplateError> {
    std::fs::create_dir_all(dir).map_err(|e| TemplateError::io(dir, e))?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| TemplateError::Bundle(e.to_string()))?;
    archive
        .extract(dir)
        .map_err(|e| TemplateError::Bundle(e.to_string()))?;

    find_entry(dir)?
        .ok_or_else(|| TemplateError::Bundle(format!("no {BUNDLE_ENTRY} in bundle")))
}

/// Breadth-first search for the shallowest `index.html`.
fn find_entry(dir: &Path) -> Result<Option<PathBuf>, TemplateError> {
    let mut queue = VecDeque::from([dir.to_path_buf()]);
    while let Some(current) = queue.pop_front() {
        let mut entries = std::fs::read_dir(&current)
            .map_err(|e| TemplateError::io(&current, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TemplateError::io(&current, e))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            if path.is_dir() {
                queue.push_back(path);
            } else if entry
                .file_name()
                .to_string_lossy()
                .eq_ignore_ascii_case(BUNDLE_ENTRY)
            {
                return Ok(Some(path));
            }
        }
    }
    Ok(None)
}
