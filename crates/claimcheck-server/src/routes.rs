//! HTTP surface: `GET /` service info and `POST /predict`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use claimcheck_ai::{InferenceService, ServiceError};
use claimcheck_core::{ClassificationRequest, ErrorBody};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::Environment;

/// Process-wide state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InferenceService>,
    pub environment: Environment,
}

impl AppState {
    pub fn new(service: InferenceService, environment: Environment) -> Self {
        Self {
            service: Arc::new(service),
            environment,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub message: String,
    pub instructions: String,
    pub environment: Environment,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(info))
        .route("/predict", post(predict))
        .with_state(state)
}

async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        message: "Welcome to the claimcheck classification API!".to_string(),
        instructions: "Use the /predict endpoint with a POST request to classify text."
            .to_string(),
        environment: state.environment,
    })
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<ClassificationRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected malformed prediction body");
            return error_response(StatusCode::BAD_REQUEST, ErrorBody::new(rejection.body_text()));
        }
    };

    // Inference is CPU/GPU bound; keep it off the async workers.
    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || service.predict(&request)).await;

    match outcome {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(ServiceError::InvalidInput(message))) => {
            error_response(StatusCode::BAD_REQUEST, ErrorBody::new(message))
        }
        Ok(Err(ServiceError::Internal(e))) => internal_error(state.environment, &e),
        Err(join_error) => {
            error!(error = %join_error, "prediction task aborted");
            let e = anyhow::anyhow!("prediction task aborted: {join_error}");
            internal_error(state.environment, &e)
        }
    }
}

fn internal_error(environment: Environment, e: &anyhow::Error) -> Response {
    let mut body = ErrorBody::new(format!("{e:#}"));
    if environment.is_development() {
        body.detail = Some(format!("{e:?}"));
    }
    error_response(StatusCode::INTERNAL_SERVER_ERROR, body)
}

fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}
