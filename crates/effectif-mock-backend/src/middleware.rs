//! Request recording and failure injection

use std::sync::Arc;

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use crate::handlers::ErrorResponse;
use crate::state::{BackendState, RecordedRequest};

/// Record every request, then either answer with the forced status or run the handler
///
/// The body is buffered so that it can be both recorded and forwarded.
pub async fn record_and_inject(
    State(state): State<Arc<BackendState>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "unreadable body".to_string(),
                }),
            )
                .into_response();
        }
    };

    let recorded_body = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(&bytes).ok()
    };
    state.record(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        body: recorded_body,
    });

    if let Some(status) = state.status_for(parts.uri.path()) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        debug!("Forcing {} for {} {}", status, parts.method, parts.uri.path());
        return (
            status,
            Json(ErrorResponse {
                error: "forced failure".to_string(),
            }),
        )
            .into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
