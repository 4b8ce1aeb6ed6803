use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("template fetch for {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("template not found: {0}")]
    NotFound(String),

    #[error("invalid template reference: {0}")]
    InvalidReference(String),

    #[error("template bundle error: {0}")]
    Bundle(String),

    #[error("template parse error: {0}")]
    Parse(String),

    #[error("template rendering failed: {0}")]
    Render(String),

    #[error("template is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        TemplateError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl From<tera::Error> for TemplateError {
    fn from(e: tera::Error) -> Self {
        TemplateError::Render(e.to_string())
    }
}
