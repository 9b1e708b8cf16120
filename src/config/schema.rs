//! Configuration schema for cli-dist
//!
//! Configuration is stored at `~/.config/cli-dist/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Listener settings
    pub server: ServerConfig,

    /// Upstream sources
    pub upstream: UpstreamConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on (overridden by `PORT`)
    pub port: u16,

    /// File served verbatim on `/robots.txt`
    pub robots_path: PathBuf,
}

impl ServerConfig {
    /// `host:port` string handed to the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            robots_path: PathBuf::from("static/robots.txt"),
        }
    }
}

/// Upstream endpoints the service mirrors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Raw installer script
    pub install_script_url: String,

    /// Raw version string
    pub version_url: String,

    /// Release download base; `<version>/<archive>` is appended
    pub release_base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            install_script_url:
                "https://raw.githubusercontent.com/Scalingo/cli/master/dists/install.sh"
                    .to_string(),
            version_url: "https://raw.githubusercontent.com/Scalingo/cli/master/VERSION"
                .to_string(),
            release_base_url: "https://github.com/Scalingo/cli/releases/download".to_string(),
        }
    }
}
