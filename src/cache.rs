//! Lazily established, self-invalidating connection to one remote object.

use crate::error::{CallError, TransportError};
use crate::transport::{Connector, ProxyRef, RemoteHandle};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::sync::Arc;

type CastOutcome = Result<Arc<dyn RemoteHandle>, TransportError>;
type CastFuture = Shared<BoxFuture<'static, CastOutcome>>;

enum Slot {
    Empty,
    /// A checked cast is in flight; every acquirer awaits the same future.
    Connecting { attempt: u64, cast: CastFuture },
    Connected(Arc<dyn RemoteHandle>),
}

struct State {
    slot: Slot,
    attempts: u64,
}

/// Observable state of a [`ConnectionCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Connecting,
    Connected,
}

/// Holds at most one connected handle to the object behind a [`ProxyRef`].
///
/// The handle is created by checked cast on first use and dropped when a
/// call on it fails. Liveness is never probed; a dead handle is only
/// discovered by the call that fails on it.
pub struct ConnectionCache {
    connector: Arc<dyn Connector>,
    proxy: ProxyRef,
    state: Mutex<State>,
}

impl ConnectionCache {
    pub fn new(connector: Arc<dyn Connector>, proxy: ProxyRef) -> Self {
        Self {
            connector,
            proxy,
            state: Mutex::new(State {
                slot: Slot::Empty,
                attempts: 0,
            }),
        }
    }

    pub fn proxy(&self) -> &ProxyRef {
        &self.proxy
    }

    pub fn state(&self) -> CacheState {
        match self.state.lock().slot {
            Slot::Empty => CacheState::Empty,
            Slot::Connecting { .. } => CacheState::Connecting,
            Slot::Connected(_) => CacheState::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == CacheState::Connected
    }

    /// Number of checked casts started so far.
    pub fn cast_attempts(&self) -> u64 {
        self.state.lock().attempts
    }

    /// Return the cached handle, or establish one.
    ///
    /// Callers arriving while a cast is in flight share its outcome instead
    /// of starting their own.
    pub async fn acquire(&self) -> Result<Arc<dyn RemoteHandle>, CallError> {
        let (attempt, cast) = {
            let mut state = self.state.lock();
            match &state.slot {
                Slot::Connected(handle) => return Ok(Arc::clone(handle)),
                Slot::Connecting { attempt, cast } => (*attempt, cast.clone()),
                Slot::Empty => {
                    state.attempts += 1;
                    let attempt = state.attempts;
                    let cast = self.start_cast();
                    tracing::debug!(proxy = %self.proxy, attempt, "starting checked cast");
                    state.slot = Slot::Connecting {
                        attempt,
                        cast: cast.clone(),
                    };
                    (attempt, cast)
                }
            }
        };

        let outcome = cast.await;
        self.settle(attempt, &outcome);
        outcome.map_err(CallError::ConnectionEstablishmentFailed)
    }

    /// Drop the cached handle and abandon any pending cast. The next
    /// [`acquire`](Self::acquire) starts over.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if !matches!(state.slot, Slot::Empty) {
            tracing::info!(proxy = %self.proxy, "connection reset");
        }
        state.slot = Slot::Empty;
    }

    /// Drop `handle` if it is still the cached one.
    ///
    /// Returns whether the cache was cleared.
    pub fn invalidate(&self, handle: &Arc<dyn RemoteHandle>) -> bool {
        let mut state = self.state.lock();
        match &state.slot {
            Slot::Connected(current) if Arc::ptr_eq(current, handle) => {
                tracing::debug!(proxy = %self.proxy, "dropping failed connection");
                state.slot = Slot::Empty;
                true
            }
            _ => false,
        }
    }

    fn start_cast(&self) -> CastFuture {
        let connector = Arc::clone(&self.connector);
        let proxy = self.proxy.clone();
        async move { connector.checked_cast(&proxy).await }
            .boxed()
            .shared()
    }

    /// Record the outcome of `attempt`, unless the slot moved on meanwhile
    /// (reset, or already settled by another waiter).
    fn settle(&self, attempt: u64, outcome: &CastOutcome) {
        let mut state = self.state.lock();
        let current = matches!(state.slot, Slot::Connecting { attempt: a, .. } if a == attempt);
        if !current {
            return;
        }

        state.slot = match outcome {
            Ok(handle) => {
                tracing::info!(proxy = %self.proxy, attempt, "connection established");
                Slot::Connected(Arc::clone(handle))
            }
            Err(e) => {
                tracing::warn!(proxy = %self.proxy, attempt, error = %e, "checked cast failed");
                Slot::Empty
            }
        };
    }
}

impl std::fmt::Debug for ConnectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("proxy", &self.proxy)
            .field("state", &self.state())
            .finish()
    }
}
