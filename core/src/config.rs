//! Application configuration.
//!
//! Supports loading from a YAML file with environment variable overrides,
//! mirroring the layering the server binary applies on top of it (CLI flags
//! take precedence over both).
//!
//! Every field can be overridden by an environment variable named
//! `EMIREC_<SECTION>_<FIELD>` (see [`protocol_constants::ENV_PREFIX`]).

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::protocol_constants::{DEFAULT_HTTP_PORT, DEFAULT_RECORDER_TIMEOUT_SECS, DEFAULT_RECORDER_WINDOW_SECS, DEFAULT_SRT_PORTS};

/// Ports the recorder's HTTP and SRT listeners may use.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerPortsConfig {
    /// Port to listen for HTTP requests on.
    pub http: u16,

    /// Ports to select from when listening for SRT connections.
    pub srt: HashSet<u16>,
}

impl Default for ServerPortsConfig {
    fn default() -> Self {
        Self {
            http: DEFAULT_HTTP_PORT,
            srt: DEFAULT_SRT_PORTS.into_iter().collect(),
        }
    }
}

/// Configuration for the server's own network surface.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind the HTTP server and SRT listeners on.
    pub host: String,

    /// Port configuration.
    pub ports: ServerPortsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            ports: ServerPortsConfig::default(),
        }
    }
}

/// Configuration for the recording orchestrator.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RecordingConfig {
    /// Lifetime of a minted credential / SRT listen timeout, in seconds.
    pub timeout_secs: u64,

    /// Symmetric window (seconds) searched around "now" for a matching instance.
    pub window_secs: u64,
}

impl RecordingConfig {
    /// Returns the configured credential timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the configured search window as a [`Duration`].
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_RECORDER_TIMEOUT_SECS,
            window_secs: DEFAULT_RECORDER_WINDOW_SECS,
        }
    }
}

/// Configuration for the S3-compatible object store backing recorded media.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatarecordsS3Config {
    /// Whether to use a secure (https) connection.
    pub secure: bool,

    /// Host of the S3 API.
    pub host: String,

    /// Port of the S3 API.
    pub port: Option<u16>,

    /// Username to authenticate with the S3 API.
    pub user: String,

    /// Password to authenticate with the S3 API.
    pub password: String,

    /// Name of the bucket to use for uploads.
    pub bucket: String,
}

impl DatarecordsS3Config {
    /// Returns the base URL of the S3 API.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        match self.port {
            Some(port) => format!("{scheme}://{}:{port}", self.host),
            None => format!("{scheme}://{}", self.host),
        }
    }
}

impl Default for DatarecordsS3Config {
    fn default() -> Self {
        Self {
            secure: false,
            host: "localhost".to_string(),
            port: Some(30000),
            user: "readonly".to_string(),
            password: "password".to_string(),
            bucket: "live".to_string(),
        }
    }
}

/// Configuration for the `datarecords` object store.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DatarecordsConfig {
    /// Configuration for the S3 API of the datarecords database.
    pub s3: DatarecordsS3Config,
}

/// Configuration for the HTTP API of the remote schedule (`emishows`) service.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EmishowsHttpConfig {
    /// Scheme of the HTTP API.
    pub scheme: String,

    /// Host of the HTTP API.
    pub host: String,

    /// Port of the HTTP API.
    pub port: Option<u16>,

    /// Path prefix of the HTTP API.
    pub path: Option<String>,
}

impl EmishowsHttpConfig {
    /// Returns the base URL of the schedule service's HTTP API.
    #[must_use]
    pub fn url(&self) -> String {
        let mut url = match self.port {
            Some(port) => format!("{}://{}:{port}", self.scheme, self.host),
            None => format!("{}://{}", self.scheme, self.host),
        };
        if let Some(path) = &self.path {
            let path = if path.starts_with('/') {
                path.clone()
            } else {
                format!("/{path}")
            };
            let path = path.trim_end_matches('/');
            url.push_str(path);
        }
        url
    }
}

impl Default for EmishowsHttpConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: Some(35000),
            path: None,
        }
    }
}

/// Configuration for the `emishows` schedule service.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EmishowsConfig {
    /// Configuration for the HTTP API of the emishows service.
    pub http: EmishowsHttpConfig,
}

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Configuration for the server's own network surface.
    pub server: ServerConfig,

    /// Configuration for the recording orchestrator.
    pub recording: RecordingConfig,

    /// Configuration for the datarecords object store.
    pub datarecords: DatarecordsConfig,

    /// Configuration for the emishows schedule service.
    pub emishows: EmishowsConfig,

    /// Enable debug mode (verbose logging, relaxed timeouts for tests).
    pub debug: bool,
}

impl Config {
    /// Loads configuration from an optional YAML file, then applies
    /// environment variable overrides (`EMIREC_*`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies `EMIREC_*` environment variable overrides on top of whatever
    /// was loaded from file (or defaulted).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("EMIREC_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("EMIREC_SERVER_PORTS_HTTP") {
            if let Ok(port) = val.parse() {
                self.server.ports.http = port;
            }
        }
        if let Ok(val) = std::env::var("EMIREC_SERVER_PORTS_SRT") {
            let ports: HashSet<u16> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if !ports.is_empty() {
                self.server.ports.srt = ports;
            }
        }
        if let Ok(val) = std::env::var("EMIREC_RECORDING_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.recording.timeout_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("EMIREC_RECORDING_WINDOW_SECS") {
            if let Ok(secs) = val.parse() {
                self.recording.window_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("EMIREC_EMISHOWS_HTTP_SCHEME") {
            self.emishows.http.scheme = val;
        }
        if let Ok(val) = std::env::var("EMIREC_EMISHOWS_HTTP_HOST") {
            self.emishows.http.host = val;
        }
        if let Ok(val) = std::env::var("EMIREC_EMISHOWS_HTTP_PORT") {
            self.emishows.http.port = val.parse().ok();
        }
        if let Ok(val) = std::env::var("EMIREC_EMISHOWS_HTTP_PATH") {
            self.emishows.http.path = Some(val);
        }
        if let Ok(val) = std::env::var("EMIREC_DATARECORDS_S3_SECURE") {
            if let Ok(secure) = val.parse() {
                self.datarecords.s3.secure = secure;
            }
        }
        if let Ok(val) = std::env::var("EMIREC_DATARECORDS_S3_HOST") {
            self.datarecords.s3.host = val;
        }
        if let Ok(val) = std::env::var("EMIREC_DATARECORDS_S3_PORT") {
            self.datarecords.s3.port = val.parse().ok();
        }
        if let Ok(val) = std::env::var("EMIREC_DATARECORDS_S3_USER") {
            self.datarecords.s3.user = val;
        }
        if let Ok(val) = std::env::var("EMIREC_DATARECORDS_S3_PASSWORD") {
            self.datarecords.s3.password = val;
        }
        if let Ok(val) = std::env::var("EMIREC_DATARECORDS_S3_BUCKET") {
            self.datarecords.s3.bucket = val;
        }
        if let Ok(val) = std::env::var("EMIREC_DEBUG") {
            if let Ok(debug) = val.parse() {
                self.debug = debug;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_is_sensible() {
        let config = Config::default();
        assert_eq!(config.server.ports.http, DEFAULT_HTTP_PORT);
        assert_eq!(config.recording.timeout_secs, DEFAULT_RECORDER_TIMEOUT_SECS);
        assert_eq!(config.recording.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn s3_url_includes_port_when_present() {
        let s3 = DatarecordsS3Config::default();
        assert_eq!(s3.url(), "http://localhost:30000");
    }

    #[test]
    fn s3_url_omits_port_when_absent() {
        let s3 = DatarecordsS3Config {
            port: None,
            ..DatarecordsS3Config::default()
        };
        assert_eq!(s3.url(), "http://localhost");
    }

    #[test]
    fn emishows_url_joins_path() {
        let http = EmishowsHttpConfig {
            path: Some("api/v1".to_string()),
            ..EmishowsHttpConfig::default()
        };
        assert_eq!(http.url(), "http://localhost:35000/api/v1");
    }
}
