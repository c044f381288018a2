//! HTTP route handlers.
//!
//! All handlers are thin - they delegate to [`crate::recorder::Recorder`] and
//! [`crate::records::RecordsCatalog`] for business logic, and only translate
//! between the wire format and the core's typed requests/responses.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::RecordingRequest;
use crate::error::{RecorderError, RecorderResult};
use crate::records::{ListRequest, SortOrder};
use crate::utils::isoparse;

use super::AppState;

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/record", post(record))
        .route("/records/{event}", get(list_records))
        .route(
            "/records/{event}/{start}",
            get(download).head(head).put(upload).delete(delete),
        )
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness probe.
async fn ping() -> impl IntoResponse {
    StatusCode::OK
}

async fn record(
    State(state): State<AppState>,
    Json(request): Json<RecordingRequest>,
) -> Result<Response, RecorderError> {
    let response = state.recorder.record(request).await?;
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    after: Option<chrono::NaiveDateTime>,
    before: Option<chrono::NaiveDateTime>,
    limit: Option<usize>,
    offset: Option<usize>,
    order: Option<SortOrder>,
}

async fn list_records(
    State(state): State<AppState>,
    Path(event): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Response, RecorderError> {
    let request = ListRequest {
        after: query.after,
        before: query.before,
        limit: query.limit,
        offset: query.offset,
        order: query.order,
    };
    let response = state.records.list(event, request).await?;
    Ok(Json(response).into_response())
}

fn parse_start(start: &str) -> RecorderResult<chrono::NaiveDateTime> {
    isoparse(start).ok_or_else(|| RecorderError::InstanceNotFound(start.to_string()))
}

fn http_date(instant: chrono::DateTime<chrono::Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

async fn download(
    State(state): State<AppState>,
    Path((event, start)): Path<(Uuid, String)>,
) -> Result<Response, RecorderError> {
    let start = parse_start(&start)?;
    let content = state.records.download(event, start).await?;

    let body = content
        .body
        .expect("download always populates a body stream");

    let mut response = Response::new(Body::from_stream(body));
    apply_record_headers(
        response.headers_mut(),
        &content.content_type,
        content.size,
        &content.etag,
        content.last_modified,
    );
    Ok(response)
}

async fn head(
    State(state): State<AppState>,
    Path((event, start)): Path<(Uuid, String)>,
) -> Result<Response, RecorderError> {
    let start = parse_start(&start)?;
    let content = state.records.head(event, start).await?;

    let mut response = Response::new(Body::empty());
    apply_record_headers(
        response.headers_mut(),
        &content.content_type,
        content.size,
        &content.etag,
        content.last_modified,
    );
    Ok(response)
}

fn apply_record_headers(
    headers: &mut axum::http::HeaderMap,
    content_type: &str,
    size: u64,
    etag: &str,
    last_modified: chrono::DateTime<chrono::Utc>,
) {
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    if let Ok(value) = HeaderValue::from_str(&format!("\"{etag}\"")) {
        headers.insert(header::ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&http_date(last_modified)) {
        headers.insert(header::LAST_MODIFIED, value);
    }
}

async fn upload(
    State(state): State<AppState>,
    Path((event, start)): Path<(Uuid, String)>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<StatusCode, RecorderError> {
    let start = parse_start(&start)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let stream = futures::stream::once(async move { Ok::<_, std::io::Error>(body) }).boxed();
    state.records.upload(event, start, content_type, stream).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete(
    State(state): State<AppState>,
    Path((event, start)): Path<(Uuid, String)>,
) -> Result<StatusCode, RecorderError> {
    let start = parse_start(&start)?;
    state.records.delete(event, start).await?;
    Ok(StatusCode::NO_CONTENT)
}
