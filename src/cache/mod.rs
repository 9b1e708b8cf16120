//! In-memory cache of the mirrored resources
//!
//! Holds the installer script and the version string, both fetched by the
//! refresher and served by the HTTP handlers.
//!
//! # Consistency Model
//!
//! - Both buffers share one mutex; a reader always gets a body together with
//!   its exact length
//! - A buffer is replaced wholesale, and only by a fully read fetch
//! - Handlers wait on the readiness gate, which opens once the first refresh
//!   has been dispatched
//!
//! The gate does not wait for the fetches themselves, so a request arriving
//! right after startup can still see an empty buffer.
//!
//! | Buffer | Route | Content-Type |
//! |--------|-------|--------------|
//! | install script | `/` | `text/plain` |
//! | version | `/version` | `text/plain` |

pub mod gate;
pub mod store;

pub use gate::ReadinessGate;
pub use store::{CachedResource, Resource, ResourceCache};
