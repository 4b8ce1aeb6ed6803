use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Put Blob to {url} failed with status {status}: {body}")]
    Upload {
        url: String,
        status: u16,
        body: String,
    },

    #[error("blob request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request signing error: {0}")]
    Signing(String),

    #[error("storage config error: {0}")]
    Config(String),
}
