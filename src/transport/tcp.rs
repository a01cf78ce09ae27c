//! TCP transport: newline-delimited JSON-RPC 2.0 over a persistent
//! connection.
//!
//! Requests carry numeric ids, so any number of calls can be in flight on
//! one connection; responses are routed back by id and may arrive in any
//! order.

use super::types::{Request, Response};
use super::{Connector, ProxyRef, RemoteHandle};
use crate::config::ClientConfig;
use crate::error::TransportError;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Method a server answers with `true` when it hosts the requested
/// interface.
pub const IS_A_METHOD: &str = "ice_isA";

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Response>>>>;

/// Establishes [`TcpHandle`]s and verifies the remote interface.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    type_id: String,
    connect_timeout: Duration,
    request_timeout: Duration,
    max_message_size: usize,
}

impl TcpConnector {
    pub fn new(type_id: impl Into<String>) -> Self {
        let defaults = ClientConfig::default();
        Self {
            type_id: type_id.into(),
            connect_timeout: defaults.connect_timeout_duration(),
            request_timeout: defaults.request_timeout_duration(),
            max_message_size: defaults.max_message_size,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            type_id: config.type_id.clone(),
            connect_timeout: config.connect_timeout_duration(),
            request_timeout: config.request_timeout_duration(),
            max_message_size: config.max_message_size,
        }
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }
}

#[async_trait::async_trait]
impl Connector for TcpConnector {
    async fn checked_cast(
        &self,
        proxy: &ProxyRef,
    ) -> Result<Arc<dyn RemoteHandle>, TransportError> {
        let endpoint = proxy.endpoint();
        let stream = match tokio::time::timeout(self.connect_timeout, TcpStream::connect(&endpoint)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(TransportError::Connect {
                    endpoint,
                    reason: e.to_string(),
                });
            }
            Err(_) => return Err(TransportError::Timeout(self.connect_timeout)),
        };
        stream.set_nodelay(true)?;

        let handle = TcpHandle::new(stream, self.request_timeout, self.max_message_size);
        let params = json!({
            "identity": proxy.identity(),
            "type_id": self.type_id,
        });
        match handle.request(IS_A_METHOD, params).await? {
            Value::Bool(true) => {
                tracing::debug!(proxy = %proxy, type_id = %self.type_id, "checked cast succeeded");
                Ok(Arc::new(handle))
            }
            _ => Err(TransportError::TypeMismatch {
                type_id: self.type_id.clone(),
            }),
        }
    }
}

/// One connection to a remote object.
///
/// Outgoing lines go through a writer task; a reader task matches
/// responses to waiting callers by request id. When the connection drops,
/// every pending call fails with [`TransportError::Closed`].
pub struct TcpHandle {
    tx: mpsc::Sender<String>,
    pending: Pending,
    closed: Arc<AtomicBool>,
    next_id: AtomicU64,
    request_timeout: Duration,
    reader: JoinHandle<()>,
}

impl TcpHandle {
    pub fn new(stream: TcpStream, request_timeout: Duration, max_message_size: usize) -> Self {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();
        let (reader, writer) = stream.into_split();
        let (write_tx, write_rx) = mpsc::channel::<String>(100);
        let pending: Pending = Arc::default();
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(write_requests(
            writer,
            write_rx,
            Arc::clone(&pending),
            Arc::clone(&closed),
        ));

        let reader = tokio::spawn(read_responses(
            BufReader::new(reader),
            Arc::clone(&pending),
            Arc::clone(&closed),
            max_message_size,
            peer,
        ));

        Self {
            tx: write_tx,
            pending,
            closed,
            next_id: AtomicU64::new(1),
            request_timeout,
            reader,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send one request and wait for its result value.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = Request::new(method).with_params(params).with_id(json!(id));
        let line =
            serde_json::to_string(&request).map_err(|e| TransportError::Protocol(e.to_string()))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().insert(id, reply_tx);
        let _waiter = PendingGuard {
            pending: &self.pending,
            id,
        };
        // The reader marks the handle closed before it drains the waiters.
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        tracing::trace!(
            id,
            method = %method,
            correlation_id = ?request.correlation_id,
            "sending request"
        );
        if self.tx.send(line).await.is_err() {
            return Err(TransportError::Closed);
        }

        let response = match tokio::time::timeout(self.request_timeout, reply_rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(TransportError::Closed),
            Err(_) => return Err(TransportError::Timeout(self.request_timeout)),
        };

        if let Some(error) = response.error {
            return Err(TransportError::Remote {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[async_trait::async_trait]
impl RemoteHandle for TcpHandle {
    async fn invoke(&self, method: &str, args: &[Value]) -> Result<String, TransportError> {
        match self.request(method, Value::Array(args.to_vec())).await? {
            Value::String(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }
}

impl Drop for TcpHandle {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Removes a request's waiter however the call ends, including when the
/// caller stops waiting.
struct PendingGuard<'a> {
    pending: &'a Pending,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.id);
    }
}

async fn write_requests<W>(
    mut writer: W,
    mut requests: mpsc::Receiver<String>,
    pending: Pending,
    closed: Arc<AtomicBool>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = requests.recv().await {
        let written = async {
            writer.write_all(message.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        }
        .await;

        if let Err(e) = written {
            tracing::warn!(error = %e, "connection write failed");
            closed.store(true, Ordering::SeqCst);
            pending.lock().clear();
            break;
        }
    }
}

async fn read_responses(
    mut reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    pending: Pending,
    closed: Arc<AtomicBool>,
    max_message_size: usize,
    peer: String,
) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                tracing::debug!(peer = %peer, "connection closed by remote");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(peer = %peer, error = %e, "connection read failed");
                break;
            }
        }

        if max_message_size > 0 && line.len() > max_message_size {
            tracing::warn!(
                peer = %peer,
                size = line.len(),
                max_message_size,
                "response exceeds maximum message size, closing connection"
            );
            break;
        }

        let content = line.trim();
        if content.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Response>(content) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(peer = %peer, error = %e, "discarding malformed response");
                continue;
            }
        };

        let Some(id) = response.numeric_id() else {
            tracing::warn!(peer = %peer, "discarding response without numeric id");
            continue;
        };
        match pending.lock().remove(&id) {
            Some(waiter) => {
                let _ = waiter.send(response);
            }
            None => tracing::debug!(peer = %peer, id, "no caller waiting for response"),
        }
    }

    closed.store(true, Ordering::SeqCst);
    // Dropping the senders wakes every waiter with a closed channel.
    pending.lock().clear();
}
