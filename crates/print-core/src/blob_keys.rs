//! Blob path and file-name conventions.
//!
//! Pure string functions. These define where rendered artifacts land locally
//! and in the storage container.

use uuid::Uuid;

/// Path prefix used when the caller does not supply one.
pub const DEFAULT_PATH_PREFIX: &str = "print-service/";

pub fn pdf_file_name(id: Uuid) -> String {
    format!("{id}.pdf")
}

pub fn html_file_name(id: Uuid) -> String {
    format!("{id}.html")
}

pub fn template_file_name(id: Uuid) -> String {
    format!("{id}.template.html")
}

/// Directory a zipped template bundle is extracted into.
pub fn bundle_dir_name(id: Uuid) -> String {
    format!("{id}.bundle")
}

/// Destination inside the container: the prefix is used verbatim.
pub fn destination(path_prefix: &str, file_name: &str) -> String {
    format!("{path_prefix}{file_name}")
}

pub fn public_url(account: &str, container: &str, destination: &str) -> String {
    format!("https://{account}.blob.core.windows.net/{container}/{destination}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_has_canonical_shape() {
        let id = Uuid::now_v7();
        let dest = destination(DEFAULT_PATH_PREFIX, &pdf_file_name(id));
        assert_eq!(
            public_url("acct", "docs", &dest),
            format!("https://acct.blob.core.windows.net/docs/print-service/{id}.pdf")
        );
    }
}
