//! HTTP server
//!
//! Routes:
//!
//! | Route | Source |
//! |-------|--------|
//! | `/`, any unrouted path | cached installer script |
//! | `/version` | cached version |
//! | `/robots.txt` | file on disk |
//! | `/release/{archive}` | proxied from the release host |

pub mod handlers;

use crate::cache::ResourceCache;
use crate::config::{Config, ServerConfig};
use crate::error::{DistError, DistResult};
use crate::refresher::{Refresher, Sources};
use crate::upstream::UpstreamClient;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// State shared by every handler
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<ResourceCache>,
    pub upstream: UpstreamClient,
}

/// Build the router with all routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::install_script))
        .route("/version", get(handlers::version))
        .route("/robots.txt", get(handlers::robots_txt))
        .route("/release", get(handlers::release_missing))
        .route("/release/", get(handlers::release_missing))
        .route("/release/{*archive}", get(handlers::release))
        .fallback(handlers::install_script)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the refresher and serve until SIGINT or SIGTERM
pub async fn serve(config: Config) -> DistResult<()> {
    let config = Arc::new(config);

    let listener = bind(&config.server).await?;
    let local = listener
        .local_addr()
        .map_err(|e| DistError::io("reading the listener address", e))?;

    let cache = Arc::new(ResourceCache::new());
    let upstream = UpstreamClient::new();

    let refresher = Refresher::new(
        Arc::clone(&cache),
        Arc::new(upstream.clone()),
        Sources::from(&config.upstream),
    )
    .spawn();

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        cache,
        upstream,
    });
    let app = router(state);

    info!("Listening on {}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(DistError::Server)?;

    refresher.abort();
    info!("Server stopped");
    Ok(())
}

/// Bind the listening socket; failure is fatal
async fn bind(server: &ServerConfig) -> DistResult<TcpListener> {
    let addr = server.listen_addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|source| DistError::Bind { addr, source })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT"),
        () = terminate => info!("received SIGTERM"),
    }
}
