use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Query, State};
use print_core::error::ClientInputError;
use print_core::models::envelope::{PRINT_API_ID, ResponseEnvelope};
use serde::Deserialize;
use serde_json::Value;

use crate::error::EnvelopeResponse;
use crate::state::AppState;

/// `POST /v1/print/pdf`
///
/// The body is parsed here rather than through `Json` so malformed or
/// oversized input still gets an envelope back.
pub async fn print_pdf(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> EnvelopeResponse {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "print body rejected");
            return rejected(ClientInputError::invalid("request", &rejection.body_text()));
        }
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "print body is not JSON");
            return rejected(ClientInputError::missing("request"));
        }
    };

    state.print.print_pdf(&payload).await.into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuery {
    pub file_url: Option<String>,
}

/// `GET /v1/print/generate?fileUrl=...`
pub async fn print_url(
    State(state): State<AppState>,
    query: Result<Query<GenerateQuery>, QueryRejection>,
) -> EnvelopeResponse {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "generate query rejected");
            return rejected(ClientInputError::invalid("fileUrl", &rejection.body_text()));
        }
    };

    state.print.print_url(query.file_url.as_deref()).await.into()
}

fn rejected(err: ClientInputError) -> EnvelopeResponse {
    ResponseEnvelope::client_error(PRINT_API_ID, err.params()).into()
}
