//! HTTP surface (axum)
//!
//! - `GET /media/*path?exp=&sig=` → [`MediaGateway::handle`]
//! - `GET /media`, `GET /media/` → 400（空の object key）
//! - `GET /healthz` → `{"status":"ok"}`
//!
//! エラーは JSON `{"error": "..."}` で返し、拒否の詳細は含めません。

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use serde_json::json;
use tracing::{Instrument, info_span};

use crate::domain::{ErrorKind, MEDIA_ROUTE_PREFIX, MediaError};

use super::client_ip::client_ip;
use super::gateway::{GatewayRequest, MediaGateway};

#[derive(Debug, Default, Deserialize)]
struct MediaQuery {
    exp: Option<String>,
    sig: Option<String>,
}

/// Build the router serving the gateway.
pub fn router(gateway: Arc<MediaGateway>) -> Router {
    Router::new()
        .route(&format!("{MEDIA_ROUTE_PREFIX}*path"), get(media_handler))
        .route(MEDIA_ROUTE_PREFIX, get(empty_key_handler))
        .route(MEDIA_ROUTE_PREFIX.trim_end_matches('/'), get(empty_key_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(gateway)
}

async fn media_handler(
    State(gateway): State<Arc<MediaGateway>>,
    path: Result<Path<String>, PathRejection>,
    query: Option<Query<MediaQuery>>,
    headers: HeaderMap,
) -> Response {
    let request_id = gateway.next_request_id();
    let client_ip = client_ip(&headers);
    let span = info_span!("media", request_id = %request_id, client_ip = %client_ip);

    async move {
        let Ok(Path(path)) = path else {
            return MediaError::InvalidPath.into_response();
        };
        let query = query.map(|Query(query)| query).unwrap_or_default();

        let request = GatewayRequest {
            path: &path,
            exp: query.exp.as_deref(),
            sig: query.sig.as_deref(),
            client_ip: &client_ip,
        };
        match gateway.handle(request).await {
            Ok(redirect) => (
                StatusCode::PERMANENT_REDIRECT,
                [
                    (header::LOCATION, redirect.location),
                    (header::CACHE_CONTROL, redirect.cache_control),
                    (header::VARY, "Accept".to_string()),
                ],
            )
                .into_response(),
            Err(err) => err.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn empty_key_handler() -> Response {
    MediaError::InvalidPath.into_response()
}

async fn healthz_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        let (status, message) = status_for(self.kind());
        let body = Json(json!({ "error": message }));

        match self {
            MediaError::RateLimited { retry_after_secs } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}

/// ErrorKind → HTTP status and the generic client-facing message.
fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Client => (StatusCode::BAD_REQUEST, "Invalid path"),
        ErrorKind::Auth => (StatusCode::FORBIDDEN, "Forbidden"),
        ErrorKind::Throttled => (StatusCode::TOO_MANY_REQUESTS, "Too many requests"),
        ErrorKind::Infrastructure => (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable"),
    }
}
