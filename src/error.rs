//! Error types for the dispatcher and the transport boundary.

use std::time::Duration;

/// Failure reported by a [`Connector`](crate::Connector) or a
/// [`RemoteHandle`](crate::RemoteHandle).
///
/// Cloneable so one failed checked cast can be handed to every caller that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("could not connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("remote object does not implement {type_id}")]
    TypeMismatch { type_id: String },

    #[error("remote error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("connection closed")]
    Closed,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("i/o error: {0}")]
    Io(String),
}

impl TransportError {
    /// Whether the failure happened on the remote side rather than in the
    /// connection itself.
    pub fn is_remote(&self) -> bool {
        matches!(self, TransportError::Remote { .. })
    }
}

impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        TransportError::Io(error.to_string())
    }
}

/// Error returned by [`Dispatcher::invoke`](crate::Dispatcher::invoke) and
/// every generated client method.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The checked cast failed; the call was never sent.
    #[error("connection establishment failed: {0}")]
    ConnectionEstablishmentFailed(#[source] TransportError),

    /// The call was sent on a connected handle and failed. The connection
    /// cache has been invalidated.
    #[error("remote call `{method}` failed: {source}")]
    RemoteCallFailed {
        method: String,
        #[source]
        source: TransportError,
    },

    /// The call succeeded but its payload is not valid JSON. The connection
    /// is kept.
    #[error("response of `{method}` is not valid JSON: {source}")]
    ResponseParseFailed {
        method: String,
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CallError {
    /// The transport error behind a connection or call failure.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            CallError::ConnectionEstablishmentFailed(e) => Some(e),
            CallError::RemoteCallFailed { source, .. } => Some(source),
            CallError::ResponseParseFailed { .. } => None,
        }
    }

    /// Whether this failure dropped the cached connection.
    pub fn invalidates_connection(&self) -> bool {
        matches!(self, CallError::RemoteCallFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Connect {
            endpoint: "127.0.0.1:10000".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not connect to 127.0.0.1:10000: connection refused"
        );

        let err = TransportError::Remote {
            code: -32601,
            message: "Method not found".to_string(),
        };
        assert_eq!(err.to_string(), "remote error -32601: Method not found");
        assert!(err.is_remote());
        assert!(!TransportError::Closed.is_remote());
    }

    #[test]
    fn test_transport_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: TransportError = io.into();
        assert_eq!(err, TransportError::Io("pipe closed".to_string()));
    }

    #[test]
    fn test_call_error_source_chain() {
        use std::error::Error as _;

        let err = CallError::RemoteCallFailed {
            method: "Login".to_string(),
            source: TransportError::Closed,
        };
        assert_eq!(err.to_string(), "remote call `Login` failed: connection closed");
        assert!(err.source().is_some());
        assert_eq!(err.transport_error(), Some(&TransportError::Closed));
        assert!(err.invalidates_connection());
    }

    #[test]
    fn test_parse_failure_keeps_connection() {
        let source = serde_json::from_str::<serde_json::Value>("not-json{").unwrap_err();
        let err = CallError::ResponseParseFailed {
            method: "QueryUserList".to_string(),
            raw: "not-json{".to_string(),
            source,
        };
        assert!(!err.invalidates_connection());
        assert!(err.transport_error().is_none());
    }
}
