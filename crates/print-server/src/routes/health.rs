use axum::extract::State;
use print_core::models::envelope::{HEALTH_API_ID, ResponseEnvelope};
use serde_json::{Map, Value};

use crate::error::EnvelopeResponse;
use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> EnvelopeResponse {
    let mut result = Map::new();
    result.insert(
        "rendererReady".to_string(),
        Value::Bool(state.print.renderer_ready().await),
    );
    ResponseEnvelope::success(HEALTH_API_ID, result).into()
}
