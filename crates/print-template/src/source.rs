use std::path::{Path, PathBuf};

use url::Url;

use crate::error::TemplateError;

/// What a template reference string points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRef {
    Remote(Url),
    Local(PathBuf),
    Inline(String),
}

impl TemplateRef {
    /// Classify a reference. `http(s)://` is remote and `file://` is local.
    /// Markup, template syntax, or anything containing whitespace is inline
    /// content. A single bare token is a path relative to the template root.
    pub fn parse(reference: &str) -> Result<Self, TemplateError> {
        let trimmed = reference.trim();
        let lower = trimmed.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(trimmed)
                .map_err(|e| TemplateError::InvalidReference(format!("{trimmed}: {e}")))?;
            return Ok(TemplateRef::Remote(url));
        }

        if lower.starts_with("file://") {
            let path = Url::parse(trimmed)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| TemplateError::InvalidReference(trimmed.to_string()))?;
            return Ok(TemplateRef::Local(path));
        }

        if looks_inline(trimmed) {
            return Ok(TemplateRef::Inline(reference.to_string()));
        }

        Ok(TemplateRef::Local(PathBuf::from(trimmed)))
    }

    /// Whether the reference names a zipped template bundle.
    pub fn is_bundle(&self) -> bool {
        match self {
            TemplateRef::Remote(url) => is_zip_name(url.path()),
            TemplateRef::Local(path) => is_zip_name(&path.to_string_lossy()),
            TemplateRef::Inline(_) => false,
        }
    }
}

fn looks_inline(s: &str) -> bool {
    s.starts_with('<') || s.contains("{{") || s.contains("{%") || s.chars().any(char::is_whitespace)
}

fn is_zip_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}
