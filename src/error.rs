//! Error types for cli-dist
//!
//! All modules use `DistResult<T>` as their return type.

use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cli-dist operations
pub type DistResult<T> = Result<T, DistError>;

/// All errors that can occur in cli-dist
#[derive(Error, Debug)]
pub enum DistError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Configuration file already exists: {0}")]
    ConfigExists(PathBuf),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Upstream errors
    #[error("Upstream request to {url} failed: {reason}")]
    Upstream { url: String, reason: String },

    #[error("Upstream {url} answered with status {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Failed to read upstream body from {url}: {reason}")]
    UpstreamBody { url: String, reason: String },

    // Release errors
    #[error("Release archive not found: {0}")]
    ReleaseNotFound(String),

    #[error("Invalid release {component}: {reason}")]
    ReleaseInvalid { component: String, reason: String },

    #[error("Invalid URL {url}: {reason}")]
    UrlInvalid { url: String, reason: String },

    // Server errors
    #[error("Failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Server(#[source] std::io::Error),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DistError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an upstream transport error
    pub fn upstream(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Upstream {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Status code a client sees when this error ends a request
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ReleaseNotFound(_) | Self::ReleaseInvalid { .. } => StatusCode::NOT_FOUND,
            Self::Upstream { .. } | Self::UpstreamStatus { .. } | Self::UrlInvalid { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Bind { .. } => Some("Pick another port with --port or the PORT variable"),
            Self::ConfigInvalid { .. } => Some("Run: cli-dist config show"),
            Self::ConfigExists(_) => Some("Run: cli-dist config init --force"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DistError::UpstreamStatus {
            url: "https://example.com/VERSION".to_string(),
            status: 503,
        };
        assert!(err.to_string().contains("status 503"));
    }

    #[test]
    fn error_hint() {
        let err = DistError::Bind {
            addr: "0.0.0.0:4000".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.hint().unwrap().contains("PORT"));
        assert_eq!(DistError::Internal("x".to_string()).hint(), None);
    }

    #[test]
    fn error_status_codes() {
        assert_eq!(
            DistError::ReleaseNotFound("a_b".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DistError::upstream("https://example.com", "connection refused").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DistError::io("reading robots.txt", std::io::ErrorKind::NotFound.into())
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
