//! Background refresh of the cached resources

use crate::cache::{Resource, ResourceCache};
use crate::config::UpstreamConfig;
use crate::upstream::ResourceFetcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Period between two refresh cycles
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Upstream URL of each cached resource
#[derive(Debug, Clone)]
pub struct Sources {
    pub install_script: String,
    pub version: String,
}

impl Sources {
    pub fn url(&self, resource: Resource) -> &str {
        match resource {
            Resource::InstallScript => &self.install_script,
            Resource::Version => &self.version,
        }
    }
}

impl From<&UpstreamConfig> for Sources {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            install_script: config.install_script_url.clone(),
            version: config.version_url.clone(),
        }
    }
}

/// Keeps the cache in sync with upstream
///
/// Every tick dispatches one independent fetch per resource. A failed fetch
/// only leaves its own resource stale until the next tick.
#[derive(Clone)]
pub struct Refresher {
    cache: Arc<ResourceCache>,
    fetcher: Arc<dyn ResourceFetcher>,
    sources: Arc<Sources>,
    interval: Duration,
}

impl Refresher {
    pub fn new(
        cache: Arc<ResourceCache>,
        fetcher: Arc<dyn ResourceFetcher>,
        sources: Sources,
    ) -> Self {
        Self {
            cache,
            fetcher,
            sources: Arc::new(sources),
            interval: REFRESH_INTERVAL,
        }
    }

    /// Override the refresh period
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawn the refresh loop. It runs until the runtime shuts down.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.dispatch_cycle();

            if self.cache.ready().open() {
                info!("first refresh dispatched, serving requests");
            }
        }
    }

    /// Launch one fetch task per resource without waiting for them
    pub fn dispatch_cycle(&self) {
        debug!("starting refresh cycle");
        for resource in Resource::ALL {
            let this = self.clone();
            tokio::spawn(async move { this.refresh_one(resource).await });
        }
    }

    /// Fetch one resource and store it
    ///
    /// The cached content is only replaced by a complete body; on failure the
    /// previous content stays in place.
    pub async fn refresh_one(&self, resource: Resource) -> bool {
        let url = self.sources.url(resource);
        match self.fetcher.fetch(url).await {
            Ok(body) => {
                debug!(%resource, %url, bytes = body.len(), "fetched");
                self.cache.store(resource, body);
                true
            }
            Err(e) => {
                warn!(%resource, error = %e, "refresh failed, keeping previous content");
                false
            }
        }
    }
}
