use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::auth::{self, SignedHeaders};
use crate::client::BlobClient;
use crate::error::StorageError;

/// Request URL for a blob: endpoint path, then container, then each segment
/// of the blob name percent-encoded.
pub fn blob_url(client: &BlobClient, container: &str, blob_name: &str) -> Result<Url, StorageError> {
    let mut url = client.endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| StorageError::Config("endpoint cannot be a base URL".to_string()))?
        .pop_if_empty()
        .push(container)
        .extend(blob_name.split('/'));
    Ok(url)
}

/// Upload `body` as a block blob, replacing any existing blob at that name.
pub async fn put_block_blob(
    client: &BlobClient,
    container: &str,
    blob_name: &str,
    body: Vec<u8>,
    content_type: Option<&str>,
) -> Result<(), StorageError> {
    let url = blob_url(client, container, blob_name)?;
    let date = jiff::Timestamp::now()
        .strftime("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();

    let ms_headers = [
        ("x-ms-blob-type", "BlockBlob"),
        ("x-ms-date", date.as_str()),
        ("x-ms-version", auth::MS_VERSION),
    ];
    let string_to_sign = auth::string_to_sign(
        "PUT",
        SignedHeaders {
            content_length: body.len() as u64,
            content_type,
        },
        &ms_headers,
        &client.credentials.canonical_resource(url.path()),
    );
    let authorization = client.credentials.authorization(&string_to_sign)?;

    let mut req = client.http.put(url.clone()).header(AUTHORIZATION, authorization);
    for (name, value) in ms_headers {
        req = req.header(name, value);
    }
    if let Some(ct) = content_type {
        req = req.header(CONTENT_TYPE, ct);
    }

    let size = body.len();
    let resp = req.body(body).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(StorageError::Upload {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    debug!(%url, size, "blob uploaded");
    Ok(())
}
