use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::error::RenderError;

/// Width and height of an A4 sheet in inches.
pub const A4_WIDTH_IN: f64 = 8.27;
pub const A4_HEIGHT_IN: f64 = 11.69;

/// Rasterizes a page to a PDF file.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Load `source`, wait for it to settle, and write an A4 PDF with
    /// background graphics to `output`. Returns `output`.
    async fn render_to_pdf(&self, source: &Url, output: &Path) -> Result<PathBuf, RenderError>;

    /// Whether a render started now could run.
    async fn ready(&self) -> bool {
        true
    }
}
