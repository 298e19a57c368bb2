//! Configuration types and loading
//!
//! Server tuning lives in an optional TOML file, resolved with the
//! precedence CLI `--config` > `CONFIG_PATH` env var > `dashboard.toml`.
//! Identity and secrets come from the environment only and are required —
//! startup fails fast with a clear message when any is unset, so a
//! misconfigured process never accepts a request.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use common::Secret;
use serde::Deserialize;

/// HTTP server settings (TOML `[server]` section, all optional)
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            timeout_secs: default_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: ServerConfig,
}

fn default_listen_addr() -> SocketAddr {
    // Matches the redirect URI port Spotify apps are commonly registered with
    "127.0.0.1:8888".parse().unwrap()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_connections() -> usize {
    1000
}

/// Full process configuration: file-tunable server settings plus the
/// required environment identity.
#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
    pub session_secret: Secret<String>,
}

impl Config {
    /// Load configuration: optional TOML file, then required env vars.
    ///
    /// A missing config file is not an error — the file only tunes the
    /// server. Missing env vars are fatal.
    pub fn load(path: &Path) -> common::Result<Self> {
        let server = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let file: FileConfig = toml::from_str(&contents)?;
            file.server
        } else {
            ServerConfig::default()
        };

        if server.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(Self {
            server,
            client_id: require_env("SPOTIFY_CLIENT_ID")?,
            client_secret: Secret::new(require_env("SPOTIFY_CLIENT_SECRET")?),
            redirect_uri: require_env("SPOTIFY_REDIRECT_URI")?,
            session_secret: Secret::new(require_env("SESSION_SECRET")?),
        })
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("dashboard.toml")
    }
}

fn require_env(name: &'static str) -> common::Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(common::Error::MissingEnv(name))
}
