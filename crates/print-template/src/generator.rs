use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use print_core::blob_keys;
use print_core::models::request::PrintRequest;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::error::TemplateError;
use crate::processor::ProcessedTemplate;
use crate::render::render_template;

static BASE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<base[\s/>]").expect("valid regex"));
static HEAD_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(\s[^>]*)?>").expect("valid regex"));
static HTML_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html(\s[^>]*)?>").expect("valid regex"));

/// Produces the final HTML file the browser loads for one request.
pub struct HtmlGenerator<'a> {
    template: &'a ProcessedTemplate,
    request: &'a PrintRequest,
    work_dir: &'a Path,
}

impl<'a> HtmlGenerator<'a> {
    pub fn new(
        template: &'a ProcessedTemplate,
        request: &'a PrintRequest,
        work_dir: &'a Path,
    ) -> Self {
        Self {
            template,
            request,
            work_dir,
        }
    }

    /// Path the generated file is written to, known before generation.
    pub fn output_path(&self) -> PathBuf {
        self.work_dir
            .join(blob_keys::html_file_name(self.request.request_id()))
    }

    /// Substitute the request context into the processed template, anchor
    /// relative references at the template's origin, and write the result.
    pub async fn generate_temp_html_file(&self) -> Result<PathBuf, TemplateError> {
        let raw = tokio::fs::read(&self.template.path)
            .await
            .map_err(|e| TemplateError::io(&self.template.path, e))?;
        let source = String::from_utf8(raw)?;

        let output = self.output_path();
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template.html".to_string());

        let rendered = render_template(&name, &source, self.request.context())?;
        let html = match &self.template.base {
            Some(base) => inject_base(&rendered, base),
            None => rendered,
        };

        tokio::fs::write(&output, html)
            .await
            .map_err(|e| TemplateError::io(&output, e))?;

        debug!(path = %output.display(), "html generated");
        Ok(output)
    }
}

/// Insert `<base href>` so relative `src`/`href` values resolve against
/// `base`. Documents that already declare a base are left alone.
pub fn inject_base(html: &str, base: &Url) -> String {
    if BASE_TAG.is_match(html) {
        return html.to_string();
    }

    let tag = format!(r#"<base href="{base}">"#);

    if let Some(m) = HEAD_OPEN.find(html) {
        let mut out = String::with_capacity(html.len() + tag.len());
        out.push_str(&html[..m.end()]);
        out.push_str(&tag);
        out.push_str(&html[m.end()..]);
        return out;
    }

    if let Some(m) = HTML_OPEN.find(html) {
        let mut out = String::with_capacity(html.len() + tag.len() + 13);
        out.push_str(&html[..m.end()]);
        out.push_str("<head>");
        out.push_str(&tag);
        out.push_str("</head>");
        out.push_str(&html[m.end()..]);
        return out;
    }

    format!("{tag}{html}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://cdn.example.com/certs/index.html").unwrap()
    }

    #[test]
    fn inserts_after_head() {
        let out = inject_base(
            r#"<html><head lang="en"><title>x</title></head></html>"#,
            &base(),
        );
        assert_eq!(
            out,
            r#"<html><head lang="en"><base href="https://cdn.example.com/certs/index.html"><title>x</title></head></html>"#
        );
    }

    #[test]
    fn creates_head_when_missing() {
        let out = inject_base("<html><body>x</body></html>", &base());
        assert!(out.starts_with("<html><head><base href="));
        assert!(out.ends_with("</head><body>x</body></html>"));
    }

    #[test]
    fn prepends_to_fragments() {
        let out = inject_base("<p>x</p>", &base());
        assert!(out.starts_with("<base href="));
        assert!(out.ends_with("<p>x</p>"));
    }

    #[test]
    fn existing_base_wins() {
        let html = r#"<head><BASE href="https://other/"></head>"#;
        assert_eq!(inject_base(html, &base()), html);
    }

    #[test]
    fn header_tag_is_not_head() {
        let out = inject_base("<header>x</header>", &base());
        assert!(out.starts_with("<base href="));
    }
}
