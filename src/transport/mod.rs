//! Remote capability boundary.
//!
//! The dispatcher only knows two things about the remote side: a
//! [`Connector`] that turns a [`ProxyRef`] into a live handle by checked
//! cast, and a [`RemoteHandle`] that invokes methods by name and returns
//! their text payload. Transports implement both:
//! - **TCP**: newline-delimited JSON-RPC 2.0 over a persistent connection

use crate::error::TransportError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub mod proxy;
pub mod types;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(test)]
pub(crate) mod mock;

pub use proxy::{ProxyParseError, ProxyRef};

#[cfg(feature = "tcp")]
pub use tcp::{TcpConnector, TcpHandle};

/// A live, type-checked session with a remote object.
#[async_trait::async_trait]
pub trait RemoteHandle: Send + Sync {
    /// Invoke `method` with zero, one or two arguments and return the raw
    /// text the remote side answered with.
    async fn invoke(&self, method: &str, args: &[Value]) -> Result<String, TransportError>;
}

impl fmt::Debug for dyn RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteHandle").finish_non_exhaustive()
    }
}

/// Factory for connected handles.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Verify that the object behind `proxy` implements the expected
    /// interface and return a connected handle to it.
    async fn checked_cast(
        &self,
        proxy: &ProxyRef,
    ) -> Result<Arc<dyn RemoteHandle>, TransportError>;

    /// Build a proxy reference from a textual descriptor such as
    /// `business:default -h 127.0.0.1 -p 10000`.
    fn string_to_proxy(&self, descriptor: &str) -> Result<ProxyRef, ProxyParseError> {
        descriptor.parse()
    }
}
