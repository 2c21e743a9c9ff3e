// HTTP surface - GET /api/download?url=

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{self, HeaderName};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::TryStreamExt;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::relay::{ContentRequest, Relay, RelayError};

pub const DOWNLOAD_PATH: &str = "/api/download";
pub const X_CONTENT_TYPE: HeaderName = HeaderName::from_static("x-content-type");

const GENERIC_DETAIL: &str = "Server Error";

#[derive(Clone)]
pub struct AppState {
    relay: Arc<Relay>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    url: Option<String>,
}

/// Error response with a `{"detail": ...}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: GENERIC_DETAIL.to_string(),
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        if err.is_client_facing() {
            return Self::bad_request(err.to_string());
        }
        error!(error = %err, "download failed");
        Self::internal()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub fn router(relay: Arc<Relay>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION, X_CONTENT_TYPE]);

    Router::new()
        .route(DOWNLOAD_PATH, get(download))
        .with_state(AppState { relay })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn download(
    State(state): State<AppState>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let url = match query {
        Ok(Query(DownloadQuery { url })) => url.unwrap_or_default(),
        Err(rejection) => return Err(ApiError::bad_request(rejection.body_text())),
    };
    let request = ContentRequest::new(url)?;
    let prepared = state.relay.prepare(&request).await?;
    let plan = prepared.plan;

    let body = prepared
        .body
        .inspect_err(|e| warn!(error = %e, "stream aborted mid-transfer"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, plan.media_type.clone()),
            (header::CONTENT_DISPOSITION, plan.content_disposition()),
            (X_CONTENT_TYPE, plan.kind.as_str().to_string()),
        ],
        Body::from_stream(body),
    )
        .into_response())
}
