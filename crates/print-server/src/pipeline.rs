//! The print pipeline.
//!
//! validate → compose → template → html → render → publish → respond,
//! with every temp file swept afterwards whatever the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use print_core::blob_keys;
use print_core::models::envelope::{PRINT_API_ID, ResponseEnvelope};
use print_core::models::request::{PrintRequest, StorageDefaults, StorageParams};
use print_core::validate;
use print_render::renderer::PdfRenderer;
use print_storage::publisher::BlobPublisher;
use print_template::generator::HtmlGenerator;
use print_template::processor::TemplateProcessor;
use serde_json::Value;
use tracing::{Instrument, error, info, info_span, warn};
use url::Url;
use uuid::Uuid;

use crate::artifacts::TempArtifacts;
use crate::error::PipelineError;

pub struct PrintService {
    templates: TemplateProcessor,
    renderer: Arc<dyn PdfRenderer>,
    publisher: Arc<dyn BlobPublisher>,
    storage_defaults: StorageDefaults,
    work_dir: PathBuf,
}

impl PrintService {
    pub fn new(
        templates: TemplateProcessor,
        renderer: Arc<dyn PdfRenderer>,
        publisher: Arc<dyn BlobPublisher>,
        storage_defaults: StorageDefaults,
    ) -> Self {
        let work_dir = templates.work_dir().to_path_buf();
        Self {
            templates,
            renderer,
            publisher,
            storage_defaults,
            work_dir,
        }
    }

    /// Whether the renderer can take work right now.
    pub async fn renderer_ready(&self) -> bool {
        self.renderer.ready().await
    }

    /// Handle a `POST` print body. Always yields an envelope.
    pub async fn print_pdf(&self, payload: &Value) -> ResponseEnvelope {
        let input = match validate::print_payload(payload) {
            Ok(input) => input,
            Err(e) => {
                warn!(field = e.field(), "rejected print request: {e}");
                return ResponseEnvelope::client_error(PRINT_API_ID, e.params());
            }
        };

        let request = PrintRequest::compose(input, &self.storage_defaults);
        let span = info_span!("print", request_id = %request.request_id());
        info!(
            parent: &span,
            container = %request.storage_params().container_name,
            path = %request.storage_params().path,
            "print request composed"
        );

        let mut artifacts = TempArtifacts::default();
        let outcome = self
            .run(&request, &mut artifacts)
            .instrument(span.clone())
            .await;
        artifacts.sweep().instrument(span.clone()).await;

        let _entered = span.enter();
        respond(outcome)
    }

    /// Handle the direct URL endpoint: render `fileUrl` as-is and publish
    /// under the service defaults.
    pub async fn print_url(&self, file_url: Option<&str>) -> ResponseEnvelope {
        let file_url = match validate::file_url(file_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(field = e.field(), "rejected url print: {e}");
                return ResponseEnvelope::client_error(PRINT_API_ID, e.params());
            }
        };

        let id = Uuid::now_v7();
        let span = info_span!("print_url", request_id = %id, url = %file_url);

        let mut artifacts = TempArtifacts::default();
        let outcome = self
            .run_url(id, &file_url, &mut artifacts)
            .instrument(span.clone())
            .await;
        artifacts.sweep().instrument(span.clone()).await;

        let _entered = span.enter();
        respond(outcome)
    }

    async fn run(
        &self,
        request: &PrintRequest,
        artifacts: &mut TempArtifacts,
    ) -> Result<String, PipelineError> {
        let processed = self.templates.process(&request.download_params()).await?;
        for path in &processed.artifacts {
            artifacts.track(path);
        }

        let generator = HtmlGenerator::new(&processed, request, &self.work_dir);
        artifacts.track(generator.output_path());
        let html_path = generator.generate_temp_html_file().await?;

        let pdf_path =
            artifacts.track(self.work_dir.join(blob_keys::pdf_file_name(request.request_id())));
        let source = file_url(&html_path)?;
        let pdf_path = self.renderer.render_to_pdf(&source, &pdf_path).await?;

        self.publish(request.storage_params(), &pdf_path).await
    }

    async fn run_url(
        &self,
        id: Uuid,
        file_url: &str,
        artifacts: &mut TempArtifacts,
    ) -> Result<String, PipelineError> {
        let source =
            Url::parse(file_url).map_err(|e| PipelineError::FileUrl(format!("{file_url}: {e}")))?;
        let pdf_path = artifacts.track(self.work_dir.join(blob_keys::pdf_file_name(id)));
        let pdf_path = self.renderer.render_to_pdf(&source, &pdf_path).await?;

        self.publish(&self.storage_defaults.to_params(), &pdf_path)
            .await
    }

    async fn publish(
        &self,
        storage: &StorageParams,
        pdf_path: &Path,
    ) -> Result<String, PipelineError> {
        let file_name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PipelineError::FileUrl(pdf_path.display().to_string()))?;
        let destination = blob_keys::destination(&storage.path, &file_name);

        let url = self
            .publisher
            .upload(&storage.container_name, &destination, pdf_path)
            .await?;
        Ok(url)
    }
}

fn file_url(path: &Path) -> Result<Url, PipelineError> {
    let absolute = std::path::absolute(path)
        .map_err(|_| PipelineError::FileUrl(path.display().to_string()))?;
    Url::from_file_path(&absolute).map_err(|()| PipelineError::FileUrl(absolute.display().to_string()))
}

fn respond(outcome: Result<String, PipelineError>) -> ResponseEnvelope {
    match outcome {
        Ok(pdf_url) => {
            info!(%pdf_url, "pdf published");
            ResponseEnvelope::pdf_published(PRINT_API_ID, &pdf_url)
        }
        Err(e) => {
            error!(stage = e.stage(), error = %e, "print pipeline failed");
            ResponseEnvelope::server_error(PRINT_API_ID)
        }
    }
}
