use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use print_core::models::envelope::ResponseEnvelope;
use print_render::error::RenderError;
use print_storage::error::StorageError;
use print_template::error::TemplateError;
use thiserror::Error;

/// A failure in any stage after validation. Always answered with a generic
/// server error; the detail only goes to the log.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("template resolution failed: {0}")]
    Template(#[from] TemplateError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("publish failed: {0}")]
    Publish(#[from] StorageError),

    #[error("cannot address {0} as a file URL")]
    FileUrl(String),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Template(_) => "template",
            PipelineError::Render(_) | PipelineError::FileUrl(_) => "render",
            PipelineError::Publish(_) => "publish",
        }
    }
}

/// Envelope plus the HTTP status derived from its response code.
pub struct EnvelopeResponse(pub ResponseEnvelope);

impl From<ResponseEnvelope> for EnvelopeResponse {
    fn from(envelope: ResponseEnvelope) -> Self {
        EnvelopeResponse(envelope)
    }
}

impl IntoResponse for EnvelopeResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.response_code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}
