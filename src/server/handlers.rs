//! Route handlers

use crate::cache::Resource;
use crate::error::{DistError, DistResult};
use crate::release::ReleaseRequest;
use crate::server::AppState;
use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl IntoResponse for DistError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let text = match status {
            StatusCode::NOT_FOUND => "Not found",
            StatusCode::BAD_REQUEST => "Bad request",
            _ => "Internal error",
        };
        (status, text).into_response()
    }
}

/// `GET /` and every unrouted path: the installer script
pub async fn install_script(State(state): State<Arc<AppState>>) -> Response {
    serve_cached(&state, Resource::InstallScript).await
}

/// `GET /version`
pub async fn version(State(state): State<Arc<AppState>>) -> Response {
    serve_cached(&state, Resource::Version).await
}

async fn serve_cached(state: &AppState, resource: Resource) -> Response {
    state.cache.ready().wait().await;

    let snapshot = state.cache.snapshot(resource);
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(snapshot.content_type),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(snapshot.len())),
    ];
    (StatusCode::OK, headers, snapshot.body).into_response()
}

/// `GET /robots.txt`, read from disk on every request
pub async fn robots_txt(State(state): State<Arc<AppState>>) -> Response {
    let path = &state.config.server.robots_path;
    match tokio::fs::read(path).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read robots.txt");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /release` and `GET /release/` carry no archive name
pub async fn release_missing() -> DistError {
    DistError::ReleaseNotFound(String::new())
}

/// `GET /release/{archive}`: proxy the archive from the release host
pub async fn release(
    State(state): State<Arc<AppState>>,
    archive: Result<Path<String>, PathRejection>,
) -> DistResult<Response> {
    state.cache.ready().wait().await;

    let Path(raw) = archive.map_err(|rejection| {
        debug!(error = %rejection, "undecodable release path");
        DistError::ReleaseNotFound(String::new())
    })?;

    let request = ReleaseRequest::resolve(&raw, &state.cache.version_text()).inspect_err(|e| {
        debug!(%raw, error = %e, "rejected release request");
    })?;
    let url = request.upstream_url(&state.config.upstream.release_base_url)?;

    let upstream = state.upstream.open(url.as_str()).await.inspect_err(|e| {
        warn!(archive = %request.archive, error = %e, "release download failed");
    })?;

    if !upstream.is_ok() {
        warn!(
            archive = %request.archive,
            status = upstream.status,
            "release host refused download"
        );
        return Err(DistError::UpstreamStatus {
            url: upstream.url,
            status: upstream.status,
        });
    }

    let mut headers = HeaderMap::new();
    if let Some(value) = upstream
        .content_type
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
    {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Some(len) = upstream.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    info!(archive = %request.archive, version = %request.version, "proxying release");
    Ok((StatusCode::OK, headers, Body::from_stream(upstream.into_stream())).into_response())
}
