use super::types::{self, ErrorResponse, InvocationResponse, PingResponse};
use crate::Error;
use crate::model::ModelProvider;
use crate::pipeline::PredictionPipeline;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<ModelProvider>,
    pub pipeline: Arc<PredictionPipeline>,
}

/// Liveness check. Healthy once the model has loaded; before that the
/// endpoint answers 404 so the host keeps the instance out of rotation.
pub async fn ping(State(state): State<AppState>) -> (StatusCode, Json<PingResponse>) {
    if state.provider.is_loaded() {
        (StatusCode::OK, Json(PingResponse::healthy()))
    } else {
        (StatusCode::NOT_FOUND, Json(PingResponse::unhealthy()))
    }
}

pub async fn invocations(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InvocationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let invocation_id = Uuid::new_v4();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let batch = match types::parse_batch(content_type, &body) {
        Ok(batch) => batch,
        Err(e) => {
            error!("Rejected invocation {}: {}", invocation_id, e);
            return Err(error_response(e));
        }
    };

    info!(
        "Running inference on {} records (invocation {})",
        batch.len(),
        invocation_id
    );

    match state.pipeline.predict_batch(&batch).await {
        Ok(output) => {
            info!(
                "Inference complete: {} predictions (invocation {})",
                output.predictions.len(),
                invocation_id
            );
            Ok(Json(output.into()))
        }
        Err(e) => {
            error!("Inference failed for invocation {}: {}", invocation_id, e);
            Err(error_response(e))
        }
    }
}

/// Pure mapping from error kind to wire status; the pipeline never sees HTTP.
fn error_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        Error::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        Error::ModelLoad(_) | Error::Artifact(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
