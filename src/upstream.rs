//! Outbound HTTP to the upstream hosts
//!
//! Requests go through a shared `ureq` agent. The agent is blocking, so every
//! call runs on tokio's blocking pool; streamed bodies are pumped from the
//! blocking reader through a bounded channel.

use crate::error::{DistError, DistResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::io::{ErrorKind, Read};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use ureq::http::header;
use ureq::Agent;

/// Upper bound for a cached resource body
const MAX_RESOURCE_BYTES: u64 = 16 * 1024 * 1024;

/// Read size for streamed bodies
const CHUNK_SIZE: usize = 64 * 1024;

/// Chunks buffered between the reader thread and the client
const STREAM_BUFFER: usize = 8;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed for the response headers once the request is sent
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of cached resource bodies
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the full body behind `url`
    async fn fetch(&self, url: &str) -> DistResult<Bytes>;
}

/// Blocking reader over an upstream response body
pub type BodyReader = Box<dyn Read + Send + 'static>;

/// An upstream response whose body has not been read yet
pub struct UpstreamResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    reader: BodyReader,
}

impl UpstreamResponse {
    pub fn new(url: impl Into<String>, status: u16, reader: BodyReader) -> Self {
        Self {
            url: url.into(),
            status,
            content_type: None,
            content_length: None,
            reader,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Stream the body in chunks
    ///
    /// A read failure is yielded as the last item. Dropping the stream stops
    /// the reader at its next chunk.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let Self {
            url, mut reader, ..
        } = self;

        tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; CHUNK_SIZE];
            let mut sent: u64 = 0;
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        sent += n as u64;
                        if tx.blocking_send(Ok(Bytes::copy_from_slice(&buf[..n]))).is_err() {
                            debug!(%url, bytes = sent, "client went away, stopping upstream read");
                            return;
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!(%url, bytes = sent, error = %e, "upstream body read failed");
                        let _ = tx.blocking_send(Err(e));
                        return;
                    }
                }
            }
            debug!(%url, bytes = sent, "upstream body streamed");
        });

        futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
    }
}

/// HTTP client for the upstream hosts
#[derive(Clone)]
pub struct UpstreamClient {
    agent: Agent,
}

impl UpstreamClient {
    pub fn new() -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_recv_response(Some(RESPONSE_TIMEOUT))
            .build()
            .into();
        Self { agent }
    }

    /// Issue a GET and return the response with its body unread
    pub async fn open(&self, url: &str) -> DistResult<UpstreamResponse> {
        let agent = self.agent.clone();
        let target = url.to_string();

        let response = tokio::task::spawn_blocking(move || agent.get(&target).call())
            .await
            .map_err(|e| DistError::Internal(format!("upstream request task failed: {e}")))?
            .map_err(|e| DistError::upstream(url, e))?;

        let header_str = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header_str(header::CONTENT_TYPE);
        let content_length = header_str(header::CONTENT_LENGTH).and_then(|v| v.parse().ok());
        let status = response.status().as_u16();

        debug!(%url, status, "upstream responded");

        Ok(UpstreamResponse {
            url: url.to_string(),
            status,
            content_type,
            content_length,
            reader: Box::new(response.into_body().into_reader()),
        })
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceFetcher for UpstreamClient {
    async fn fetch(&self, url: &str) -> DistResult<Bytes> {
        let agent = self.agent.clone();
        let target = url.to_string();

        tokio::task::spawn_blocking(move || {
            let mut response = agent
                .get(&target)
                .call()
                .map_err(|e| DistError::upstream(&target, e))?;

            let status = response.status().as_u16();
            if status != 200 {
                return Err(DistError::UpstreamStatus {
                    url: target,
                    status,
                });
            }

            let body = response
                .body_mut()
                .with_config()
                .limit(MAX_RESOURCE_BYTES)
                .read_to_vec()
                .map_err(|e| DistError::UpstreamBody {
                    url: target.clone(),
                    reason: e.to_string(),
                })?;

            Ok(Bytes::from(body))
        })
        .await
        .map_err(|e| DistError::Internal(format!("upstream fetch task failed: {e}")))?
    }
}
