//! Shared buffers for the mirrored resources

use crate::cache::gate::ReadinessGate;
use bytes::Bytes;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A resource mirrored from upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Shell installer served on `/`
    InstallScript,
    /// Latest released version served on `/version`
    Version,
}

impl Resource {
    /// Every mirrored resource, in refresh order
    pub const ALL: [Resource; 2] = [Resource::InstallScript, Resource::Version];

    /// Content type the resource is served with
    pub fn content_type(self) -> &'static str {
        "text/plain"
    }

    /// Short name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Resource::InstallScript => "install-script",
            Resource::Version => "version",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A consistent copy of one buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResource {
    pub body: Bytes,
    pub content_type: &'static str,
}

impl CachedResource {
    /// Byte length of the body, as sent in `Content-Length`
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(Debug, Default)]
struct Slots {
    install_script: Bytes,
    version: Bytes,
}

impl Slots {
    fn get(&self, resource: Resource) -> &Bytes {
        match resource {
            Resource::InstallScript => &self.install_script,
            Resource::Version => &self.version,
        }
    }

    fn get_mut(&mut self, resource: Resource) -> &mut Bytes {
        match resource {
            Resource::InstallScript => &mut self.install_script,
            Resource::Version => &mut self.version,
        }
    }
}

/// Process-wide cache shared by the refresher and the handlers
///
/// Built once at startup and handed out behind an `Arc`.
#[derive(Debug, Default)]
pub struct ResourceCache {
    slots: Mutex<Slots>,
    ready: ReadinessGate,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        // Slots are plain byte handles; a panic while holding the lock cannot
        // leave them half-written.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the content of a resource
    pub fn store(&self, resource: Resource, body: Bytes) {
        let len = body.len();
        *self.lock().get_mut(resource) = body;
        debug!(%resource, bytes = len, "cache updated");
    }

    /// Copy of a resource's current content
    pub fn snapshot(&self, resource: Resource) -> CachedResource {
        let body = self.lock().get(resource).clone();
        CachedResource {
            body,
            content_type: resource.content_type(),
        }
    }

    /// Current version with trailing line breaks removed
    pub fn version_text(&self) -> String {
        let body = self.lock().version.clone();
        String::from_utf8_lossy(&body)
            .trim_end_matches(['\n', '\r'])
            .to_string()
    }

    /// Gate opened after the first refresh has been dispatched
    pub fn ready(&self) -> &ReadinessGate {
        &self.ready
    }
}
