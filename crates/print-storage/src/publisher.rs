use std::path::Path;

use async_trait::async_trait;
use print_core::blob_keys;
use tracing::info;

use crate::blobs;
use crate::client::BlobClient;
use crate::error::StorageError;

/// Publishes local files to blob storage and hands back their public URL.
#[async_trait]
pub trait BlobPublisher: Send + Sync {
    /// Storage account the published URLs point into.
    fn account(&self) -> &str;

    async fn upload(
        &self,
        container: &str,
        destination: &str,
        local_file: &Path,
    ) -> Result<String, StorageError>;
}

/// [`BlobPublisher`] backed by Azure Blob Storage.
#[derive(Debug, Clone)]
pub struct AzureBlobPublisher {
    client: BlobClient,
}

impl AzureBlobPublisher {
    pub fn new(client: BlobClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlobPublisher for AzureBlobPublisher {
    fn account(&self) -> &str {
        self.client.account()
    }

    async fn upload(
        &self,
        container: &str,
        destination: &str,
        local_file: &Path,
    ) -> Result<String, StorageError> {
        let body = tokio::fs::read(local_file)
            .await
            .map_err(|source| StorageError::Io {
                path: local_file.display().to_string(),
                source,
            })?;

        blobs::put_block_blob(
            &self.client,
            container,
            destination,
            body,
            Some(content_type_for(local_file)),
        )
        .await?;

        let url = blob_keys::public_url(self.account(), container, destination);
        info!(container, destination, %url, "published blob");
        Ok(url)
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("html") | Some("htm") => "text/html",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types() {
        assert_eq!(content_type_for(Path::new("/t/a.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("a.html")), "text/html");
        assert_eq!(content_type_for(Path::new("a")), "application/octet-stream");
    }
}
