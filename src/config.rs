//! Client configuration

use crate::transport::ProxyRef;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Interface checked when neither the configuration nor the client names one.
pub const DEFAULT_TYPE_ID: &str = "::business::IBusiness";

/// Where the remote object lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote host
    #[serde(alias = "iceIp")]
    pub host: String,
    /// Remote port
    pub port: u16,
    /// Identity of the remote object
    pub identity: String,
    /// Interface the checked cast verifies
    pub type_id: String,
    /// Connection establishment timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Per-call timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum size of a single response line in bytes (0 = unlimited)
    pub max_message_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 10000,
            identity: "business".to_string(),
            type_id: DEFAULT_TYPE_ID.to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
            max_message_size: 0,
        }
    }
}

/// Configuration files either hold the client section directly or nest it
/// under `iceConfig`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Nested {
        #[serde(rename = "iceConfig")]
        ice_config: ClientConfig,
    },
    Flat(ClientConfig),
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(match serde_json::from_str(text)? {
            ConfigFile::Nested { ice_config } => ice_config,
            ConfigFile::Flat(config) => config,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn type_id(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = type_id.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Textual proxy descriptor, e.g. `business:default -h 127.0.0.1 -p 10000`
    pub fn descriptor(&self) -> String {
        self.proxy().to_string()
    }

    pub fn proxy(&self) -> ProxyRef {
        ProxyRef::new(self.identity.clone(), self.host.clone(), self.port)
    }
}
