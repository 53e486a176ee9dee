use std::time::Instant;

use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::{
    dispatch::{dispatch, AppState, FilterRequest},
    error::PipelineError,
    registry::OperationName,
};

/// Query string of a filter request.
#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    /// JSON matrix for the custom operation, e.g. `[[0,-1,0],[-1,5,-1],[0,-1,0]]`.
    pub kernel: Option<String>,
}

/// Build the application router.
///
/// - `GET /` welcome text
/// - `GET /health` liveness check
/// - `POST /:operation` filter the JPEG request body
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Welcome to graphics-serve!" }))
        .route("/health", get(health))
        .route("/:operation", post(apply_operation))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn apply_operation(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    Query(query): Query<FilterQuery>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, PipelineError> {
    let operation = operation.parse::<OperationName>()?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let request = FilterRequest {
        operation,
        kernel: query.kernel,
        content_type,
        body,
    };
    let result = dispatch(&state, request).await?;

    Ok(([(header::CONTENT_TYPE, result.content_type)], result.bytes).into_response())
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{method} {path} -> {} in {:?}",
        response.status(),
        start.elapsed()
    );
    response
}
