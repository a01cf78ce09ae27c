//! Proxy references and their textual descriptors.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyParseError {
    #[error("missing object identity")]
    MissingIdentity,
    #[error("missing endpoint")]
    MissingEndpoint,
    #[error("unsupported protocol `{0}`")]
    UnsupportedProtocol(String),
    #[error("missing value for option `{0}`")]
    MissingValue(String),
    #[error("unknown endpoint option `{0}`")]
    UnknownOption(String),
    #[error("missing host (-h)")]
    MissingHost,
    #[error("missing port (-p)")]
    MissingPort,
    #[error("invalid port `{0}`")]
    InvalidPort(String),
}

/// Immutable reference to a remote object: `identity:protocol -h host -p port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyRef {
    identity: String,
    protocol: String,
    host: String,
    port: u16,
}

impl ProxyRef {
    /// Proxy using the `default` protocol.
    pub fn new(identity: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            identity: identity.into(),
            protocol: "default".to_string(),
            host: host.into(),
            port,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, suitable for socket connection.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ProxyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -h {} -p {}",
            self.identity, self.protocol, self.host, self.port
        )
    }
}

impl FromStr for ProxyRef {
    type Err = ProxyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (identity, endpoint) = s.split_once(':').ok_or(ProxyParseError::MissingEndpoint)?;
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(ProxyParseError::MissingIdentity);
        }

        let mut tokens = endpoint.split_whitespace();
        let protocol = tokens.next().ok_or(ProxyParseError::MissingEndpoint)?;
        if !matches!(protocol, "default" | "tcp") {
            return Err(ProxyParseError::UnsupportedProtocol(protocol.to_string()));
        }

        let mut host = None;
        let mut port = None;
        while let Some(option) = tokens.next() {
            let value = tokens
                .next()
                .ok_or_else(|| ProxyParseError::MissingValue(option.to_string()))?;
            match option {
                "-h" => host = Some(value.to_string()),
                "-p" => {
                    port = Some(
                        value
                            .parse::<u16>()
                            .map_err(|_| ProxyParseError::InvalidPort(value.to_string()))?,
                    )
                }
                // Endpoint timeout; the transport has its own.
                "-t" => {}
                other => return Err(ProxyParseError::UnknownOption(other.to_string())),
            }
        }

        Ok(Self {
            identity: identity.to_string(),
            protocol: protocol.to_string(),
            host: host.ok_or(ProxyParseError::MissingHost)?,
            port: port.ok_or(ProxyParseError::MissingPort)?,
        })
    }
}
