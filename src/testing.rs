//! Local stand-in for the upstream hosts, used by unit tests

use axum::extract::{Path, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Axum server on `127.0.0.1:0` serving canned upstream content
///
/// - `/VERSION` and `/install.sh` answer like the raw-text host
/// - `/releases/{version}/{archive}` answers like the release host; version
///   `9.9.9` fails with 503, archives other than `ARCHIVE_NAME` are 404
/// - `/unavailable` always answers 503
pub struct FakeUpstream {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeUpstream {
    pub const VERSION_BODY: &'static [u8] = b"1.2.3\n";
    pub const SCRIPT_BODY: &'static [u8] = b"#!/bin/sh\necho installing\n";
    pub const ARCHIVE_NAME: &'static str = "a_1.2.3_linux_amd64.tar.gz";
    pub const ARCHIVE_BODY: &'static [u8] = b"\x1f\x8b fake archive bytes";

    pub async fn start() -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/VERSION", get(|| async { Self::VERSION_BODY }))
            .route("/install.sh", get(|| async { Self::SCRIPT_BODY }))
            .route("/unavailable", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route("/releases/{version}/{archive}", get(release))
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(axum::middleware::from_fn_with_state(
                Arc::clone(&requests),
                record,
            ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    /// Absolute URL for a path on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Paths requested so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(requests): State<Arc<Mutex<Vec<String>>>>,
    uri: Uri,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    requests.lock().unwrap().push(uri.path().to_string());
    next.run(request).await
}

async fn release(Path((version, archive)): Path<(String, String)>) -> Response {
    if version == "9.9.9" {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if archive != FakeUpstream::ARCHIVE_NAME {
        return StatusCode::NOT_FOUND.into_response();
    }
    (
        [(header::CONTENT_TYPE, "application/gzip")],
        FakeUpstream::ARCHIVE_BODY,
    )
        .into_response()
}
