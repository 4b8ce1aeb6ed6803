use url::Url;

use crate::auth::SharedKey;
use crate::error::StorageError;

/// Handle to one storage account. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BlobClient {
    pub(crate) http: reqwest::Client,
    pub(crate) credentials: SharedKey,
    pub(crate) endpoint: Url,
}

impl BlobClient {
    pub fn account(&self) -> &str {
        self.credentials.account()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Default public endpoint for an account.
pub fn default_endpoint(account: &str) -> String {
    format!("https://{account}.blob.core.windows.net")
}

/// Build a client for `account`. `endpoint` overrides the public endpoint,
/// e.g. a path-style emulator URL such as `http://127.0.0.1:10000/devstoreaccount1`.
pub fn build_client(
    http: reqwest::Client,
    account: &str,
    key_base64: &str,
    endpoint: Option<&str>,
) -> Result<BlobClient, StorageError> {
    if account.is_empty() {
        return Err(StorageError::Config("account name is empty".to_string()));
    }

    let raw = endpoint
        .map(str::to_string)
        .unwrap_or_else(|| default_endpoint(account));
    let endpoint = Url::parse(&raw)
        .map_err(|e| StorageError::Config(format!("invalid blob endpoint {raw}: {e}")))?;
    if endpoint.cannot_be_a_base() {
        return Err(StorageError::Config(format!(
            "blob endpoint {raw} cannot be a base URL"
        )));
    }

    Ok(BlobClient {
        http,
        credentials: SharedKey::new(account, key_base64)?,
        endpoint,
    })
}
