//! Scripted connector and handle for tests.

use super::{Connector, ProxyRef, RemoteHandle};
use crate::error::TransportError;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Records every invocation and answers from a script, echoing the first
/// argument once the script runs out.
#[derive(Default)]
pub(crate) struct MockHandle {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    replies: Mutex<VecDeque<Result<String, TransportError>>>,
}

impl MockHandle {
    pub(crate) fn push_reply(&self, reply: Result<String, TransportError>) {
        self.replies.lock().push_back(reply);
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl RemoteHandle for MockHandle {
    async fn invoke(&self, method: &str, args: &[Value]) -> Result<String, TransportError> {
        self.calls.lock().push((method.to_string(), args.to_vec()));
        tokio::task::yield_now().await;

        if let Some(reply) = self.replies.lock().pop_front() {
            return reply;
        }
        Ok(match args.first() {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        })
    }
}

pub(crate) struct MockConnector {
    handle: Arc<MockHandle>,
    fresh_handles: bool,
    cast_delay: Option<Duration>,
    casts: AtomicUsize,
    failing_casts: AtomicUsize,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self {
            handle: Arc::new(MockHandle::default()),
            fresh_handles: false,
            cast_delay: None,
            casts: AtomicUsize::new(0),
            failing_casts: AtomicUsize::new(0),
        }
    }

    /// Hand out a new handle per cast instead of the shared one.
    pub(crate) fn with_fresh_handles(mut self) -> Self {
        self.fresh_handles = true;
        self
    }

    pub(crate) fn with_cast_delay(mut self, delay: Duration) -> Self {
        self.cast_delay = Some(delay);
        self
    }

    pub(crate) fn fail_next_casts(&self, count: usize) {
        self.failing_casts.store(count, Ordering::SeqCst);
    }

    pub(crate) fn cast_count(&self) -> usize {
        self.casts.load(Ordering::SeqCst)
    }

    pub(crate) fn handle(&self) -> &Arc<MockHandle> {
        &self.handle
    }
}

#[async_trait::async_trait]
impl Connector for MockConnector {
    async fn checked_cast(
        &self,
        proxy: &ProxyRef,
    ) -> Result<Arc<dyn RemoteHandle>, TransportError> {
        self.casts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.cast_delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failing_casts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TransportError::Connect {
                endpoint: proxy.endpoint(),
                reason: "connection refused".to_string(),
            });
        }

        if self.fresh_handles {
            Ok(Arc::new(MockHandle::default()))
        } else {
            Ok(self.handle.clone())
        }
    }
}
