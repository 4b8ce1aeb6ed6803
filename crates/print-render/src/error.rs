use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browser is not ready ({0})")]
    NotReady(&'static str),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("page did not settle within {0:?}")]
    Timeout(std::time::Duration),

    #[error("PDF rasterization failed: {0}")]
    Pdf(String),

    #[error("DevTools protocol error: {0}")]
    Protocol(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<chromiumoxide::error::CdpError> for RenderError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        RenderError::Protocol(e.to_string())
    }
}
