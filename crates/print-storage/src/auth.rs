//! Azure Storage Shared Key request signing.
//!
//! The signature is an HMAC-SHA256 over a canonical string built from the
//! verb, a fixed list of standard headers, the sorted `x-ms-*` headers, and
//! the canonicalized resource, keyed with the base64-decoded account key.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::StorageError;

type HmacSha256 = Hmac<Sha256>;

/// Service version sent with every request.
pub const MS_VERSION: &str = "2021-08-06";

/// Standard headers that take part in the signature. Only length and type
/// are ever set by this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignedHeaders<'a> {
    pub content_length: u64,
    pub content_type: Option<&'a str>,
}

#[derive(Clone)]
pub struct SharedKey {
    account: String,
    key: Vec<u8>,
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKey")
            .field("account", &self.account)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl SharedKey {
    pub fn new(account: impl Into<String>, key_base64: &str) -> Result<Self, StorageError> {
        let key = STANDARD
            .decode(key_base64.trim())
            .map_err(|e| StorageError::Config(format!("account key is not valid base64: {e}")))?;
        Ok(Self {
            account: account.into(),
            key,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// `Authorization` header value for the given canonical string.
    pub fn authorization(&self, string_to_sign: &str) -> Result<String, StorageError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| StorageError::Signing(e.to_string()))?;
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());
        Ok(format!("SharedKey {}:{signature}", self.account))
    }

    /// Resource part of the string to sign for a request path (already
    /// percent-encoded, leading slash included). Query parameters are not
    /// used by the operations in this crate.
    pub fn canonical_resource(&self, url_path: &str) -> String {
        format!("/{}{}", self.account, url_path)
    }
}

/// Build the Shared Key string to sign.
///
/// `ms_headers` are `x-ms-*` header name/value pairs in any order and case;
/// they are lowercased and sorted here.
pub fn string_to_sign(
    verb: &str,
    headers: SignedHeaders<'_>,
    ms_headers: &[(&str, &str)],
    canonical_resource: &str,
) -> String {
    // Zero length is signed as an empty string since 2015-02-21.
    let content_length = match headers.content_length {
        0 => String::new(),
        n => n.to_string(),
    };

    let mut canonical_headers: Vec<(String, &str)> = ms_headers
        .iter()
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim()))
        .collect();
    canonical_headers.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::new();
    for part in [
        verb,
        "", // Content-Encoding
        "", // Content-Language
        content_length.as_str(),
        "", // Content-MD5
        headers.content_type.unwrap_or(""),
        "", // Date (x-ms-date is used instead)
        "", // If-Modified-Since
        "", // If-Match
        "", // If-None-Match
        "", // If-Unmodified-Since
        "", // Range
    ] {
        out.push_str(part);
        out.push('\n');
    }
    for (name, value) in canonical_headers {
        out.push_str(&name);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }
    out.push_str(canonical_resource);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_to_sign_layout() {
        let sts = string_to_sign(
            "PUT",
            SignedHeaders {
                content_length: 11,
                content_type: Some("application/pdf"),
            },
            &[
                ("x-ms-version", MS_VERSION),
                ("X-MS-Blob-Type", "BlockBlob"),
                ("x-ms-date", "Mon, 01 Jan 2024 00:00:00 GMT"),
            ],
            "/acct/docs/a.pdf",
        );
        assert_eq!(
            sts,
            "PUT\n\n\n11\n\napplication/pdf\n\n\n\n\n\n\n\
             x-ms-blob-type:BlockBlob\n\
             x-ms-date:Mon, 01 Jan 2024 00:00:00 GMT\n\
             x-ms-version:2021-08-06\n\
             /acct/docs/a.pdf"
        );
    }

    #[test]
    fn zero_length_is_blank() {
        let sts = string_to_sign("PUT", SignedHeaders::default(), &[], "/a/b");
        assert_eq!(sts, "PUT\n\n\n\n\n\n\n\n\n\n\n\n/a/b");
    }

    #[test]
    fn authorization_is_deterministic() {
        let key = SharedKey::new("acct", "c2VjcmV0LWtleQ==").unwrap();
        let first = key.authorization("payload").unwrap();
        assert_eq!(first, key.authorization("payload").unwrap());
        assert_ne!(first, key.authorization("other").unwrap());

        let signature = first.strip_prefix("SharedKey acct:").unwrap();
        assert_eq!(STANDARD.decode(signature).unwrap().len(), 32);
    }

    #[test]
    fn rejects_non_base64_key() {
        assert!(matches!(
            SharedKey::new("acct", "not base64!!"),
            Err(StorageError::Config(_))
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let key = SharedKey::new("acct", "c2VjcmV0LWtleQ==").unwrap();
        assert!(!format!("{key:?}").contains("c2VjcmV0"));
    }

    #[test]
    fn canonical_resource_prefixes_account() {
        let key = SharedKey::new("acct", "c2VjcmV0LWtleQ==").unwrap();
        assert_eq!(key.canonical_resource("/docs/x.pdf"), "/acct/docs/x.pdf");
    }
}
