//! cli-dist - CLI distribution server
//!
//! Mirrors the CLI installer script and version string in memory, serves
//! them over HTTP, and proxies release archive downloads.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod refresher;
pub mod release;
pub mod server;
pub mod upstream;

#[cfg(test)]
mod testing;

pub use error::{DistError, DistResult};
