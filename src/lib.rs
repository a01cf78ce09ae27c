//! # ice-rpc
//!
//! Client runtime for remote objects described by `.ice` interface files.
//!
//! ## Features
//!
//! - **Lazy connection** - the first call performs a checked cast; later calls reuse the handle
//! - **Self-healing** - a failed call drops the connection so the next one reconnects
//! - **Coalesced connects** - concurrent first calls share a single checked cast
//! - **JSON in, JSON out** - structured arguments are sent as JSON text and responses are parsed
//! - **Pluggable transports** - implement [`Connector`] and [`RemoteHandle`], or use the TCP transport
//! - **Code generation** - `ice-rpc init` turns an `.ice` file into an [`ice_client!`] module
//!
//! ## Quick Start
//!
//! ```no_run
//! use ice_rpc::*;
//! use serde_json::json;
//!
//! ice_client! {
//!     pub struct BusinessClient: "::business::IBusiness" {
//!         "Login" => login,
//!         "QueryUserList" => query_user_list,
//!     }
//! }
//!
//! # async fn run() -> Result<(), CallError> {
//! let config = ClientConfig::new("192.168.2.220", 10000);
//! let client = BusinessClient::tcp(&config);
//!
//! client.login(json!({"user": "admin", "password": "secret"})).await?;
//! let users = client.query_user_list(()).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod idl;
pub mod macros;
pub mod methods;
pub mod request;
pub mod transport;

// Re-export async_trait for users implementing transports
pub use async_trait::async_trait;

// Used by `ice_client!` expansions
pub use serde_json;

pub use cache::{CacheState, ConnectionCache};
pub use config::{ClientConfig, ConfigError};
pub use dispatcher::Dispatcher;
pub use error::{CallError, TransportError};
pub use methods::MethodSet;
pub use request::{Argument, CallRequest};
pub use transport::{Connector, ProxyParseError, ProxyRef, RemoteHandle};

#[cfg(feature = "tcp")]
pub use transport::{TcpConnector, TcpHandle};
