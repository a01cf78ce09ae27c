//! Single entry point for every remote call.

use crate::cache::ConnectionCache;
use crate::config::ClientConfig;
use crate::error::CallError;
use crate::request::{Argument, CallRequest};
use crate::transport::{Connector, ProxyRef};
use serde_json::{Number, Value};
use std::sync::Arc;

/// Turns `(method, arguments)` into a remote call on a lazily connected
/// handle and parses the JSON answer.
///
/// Cheap to clone; clones share the same connection. Concurrent calls are
/// independent and may complete in any order.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    cache: Arc<ConnectionCache>,
}

impl Dispatcher {
    pub fn new(connector: Arc<dyn Connector>, proxy: ProxyRef) -> Self {
        Self::with_cache(Arc::new(ConnectionCache::new(connector, proxy)))
    }

    pub fn with_cache(cache: Arc<ConnectionCache>) -> Self {
        Self { cache }
    }

    pub fn from_config(config: &ClientConfig, connector: Arc<dyn Connector>) -> Self {
        Self::new(connector, config.proxy())
    }

    /// Dispatcher over the TCP transport described by `config`.
    #[cfg(feature = "tcp")]
    pub fn tcp(config: &ClientConfig) -> Self {
        Self::from_config(config, Arc::new(crate::transport::TcpConnector::from_config(config)))
    }

    pub fn cache(&self) -> &ConnectionCache {
        &self.cache
    }

    /// Manual reconnect hook: drop the current connection so the next call
    /// establishes a new one.
    pub fn reset(&self) {
        self.cache.reset();
    }

    /// Call `method` with a single argument.
    pub async fn call(&self, method: &str, argument: impl Into<Argument>) -> Result<Value, CallError> {
        self.invoke(CallRequest::new(method).argument(argument)).await
    }

    /// Call `method` with a primary and a secondary argument.
    pub async fn call_with(
        &self,
        method: &str,
        argument: impl Into<Argument>,
        secondary: impl Into<Number>,
    ) -> Result<Value, CallError> {
        self.invoke(
            CallRequest::new(method)
                .argument(argument)
                .secondary(secondary),
        )
        .await
    }

    pub async fn invoke(&self, request: CallRequest) -> Result<Value, CallError> {
        let method = request.method();
        let args = request.wire_args();

        let handle = self.cache.acquire().await.inspect_err(|e| {
            tracing::warn!(method = %method, error = %e, "call not sent");
        })?;

        tracing::debug!(method = %method, args = args.len(), "invoking remote method");
        let raw = match handle.invoke(method, &args).await {
            Ok(raw) => raw,
            Err(source) => {
                tracing::warn!(method = %method, error = %source, "remote call failed");
                self.cache.invalidate(&handle);
                return Err(CallError::RemoteCallFailed {
                    method: method.to_string(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| {
            tracing::warn!(method = %method, error = %source, "response is not valid JSON");
            CallError::ResponseParseFailed {
                method: method.to_string(),
                raw,
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheState;
    use crate::error::TransportError;
    use crate::transport::mock::MockConnector;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::time::Duration;

    fn dispatcher(connector: &Arc<MockConnector>) -> Dispatcher {
        Dispatcher::new(connector.clone(), ProxyRef::new("business", "127.0.0.1", 10000))
    }

    #[tokio::test]
    async fn test_first_call_casts_then_calls() {
        let connector = Arc::new(MockConnector::new());
        let dispatcher = dispatcher(&connector);

        for method in ["LicenseCheck", "Login", "QueryUserList"] {
            connector.handle().push_reply(Ok("{}".to_string()));
            dispatcher.reset();
            let before = connector.cast_count();

            let result = dispatcher.call(method, ()).await.unwrap();
            assert_eq!(result, json!({}));
            assert_eq!(connector.cast_count(), before + 1);
        }

        let calls = connector.handle().calls();
        let methods: Vec<_> = calls.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(methods, ["LicenseCheck", "Login", "QueryUserList"]);
    }

    #[tokio::test]
    async fn test_failed_cast_does_not_call() {
        let connector = Arc::new(MockConnector::new());
        connector.fail_next_casts(1);
        let dispatcher = dispatcher(&connector);

        let err = dispatcher.call("Login", json!({"user": "admin"})).await.unwrap_err();
        assert_matches!(
            err,
            CallError::ConnectionEstablishmentFailed(TransportError::Connect { .. })
        );
        assert!(connector.handle().calls().is_empty());
        assert_eq!(dispatcher.cache().state(), CacheState::Empty);

        // The next call retries the cast.
        connector.handle().push_reply(Ok("true".to_string()));
        assert_eq!(dispatcher.call("Login", ()).await.unwrap(), json!(true));
        assert_eq!(connector.cast_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_call_invalidates_connection() {
        let connector = Arc::new(MockConnector::new());
        let dispatcher = dispatcher(&connector);

        dispatcher.call("LicenseCheck", json!({})).await.unwrap();
        assert!(dispatcher.cache().is_connected());

        connector.handle().push_reply(Err(TransportError::Closed));
        let err = dispatcher.call("QueryUserList", ()).await.unwrap_err();
        assert_matches!(
            err,
            CallError::RemoteCallFailed { ref method, source: TransportError::Closed }
                if method == "QueryUserList"
        );
        assert_eq!(dispatcher.cache().state(), CacheState::Empty);

        dispatcher.call("QueryUserList", json!([])).await.unwrap();
        assert_eq!(connector.cast_count(), 2);
    }

    #[tokio::test]
    async fn test_remote_exception_invalidates_connection() {
        let connector = Arc::new(MockConnector::new());
        let dispatcher = dispatcher(&connector);

        connector.handle().push_reply(Err(TransportError::Remote {
            code: -32000,
            message: "UnknownUserException".to_string(),
        }));
        let err = dispatcher.call("DeleteUser", json!({"id": 9})).await.unwrap_err();
        assert!(err.invalidates_connection());
        assert!(!dispatcher.cache().is_connected());
    }

    #[tokio::test]
    async fn test_parse_failure_keeps_connection() {
        let connector = Arc::new(MockConnector::new());
        let dispatcher = dispatcher(&connector);

        connector.handle().push_reply(Ok("not-json{".to_string()));
        let err = dispatcher.call("QueryCameraList", ()).await.unwrap_err();
        assert_matches!(
            err,
            CallError::ResponseParseFailed { ref raw, .. } if raw == "not-json{"
        );
        assert!(dispatcher.cache().is_connected());

        dispatcher.call("QueryCameraList", json!({"page": 1})).await.unwrap();
        assert_eq!(connector.cast_count(), 1);
    }

    #[tokio::test]
    async fn test_argument_normalization_on_the_wire() {
        let connector = Arc::new(MockConnector::new());
        let dispatcher = dispatcher(&connector);

        for _ in 0..3 {
            connector.handle().push_reply(Ok("null".to_string()));
        }
        dispatcher.call("AddUser", json!({"a": 1})).await.unwrap();
        dispatcher.call("QueryRoleList", ()).await.unwrap();
        dispatcher.call_with("QueryPeopleList", json!({"libId": 2}), 0).await.unwrap();

        let calls = connector.handle().calls();
        assert_eq!(calls[0].1, vec![json!(r#"{"a":1}"#)]);
        assert_eq!(calls[1].1, vec![json!("")]);
        assert_eq!(calls[2].1, vec![json!(r#"{"libId":2}"#), json!(0)]);
    }

    #[tokio::test]
    async fn test_echo_round_trip() {
        let connector = Arc::new(MockConnector::new());
        let dispatcher = dispatcher(&connector);

        let values = [
            json!({"a": 1}),
            json!({"nested": {"list": [1, 2.5, "x", null, true]}, "empty": {}}),
            json!([]),
            json!([{"id": 1, "name": "camera-1"}, {"id": 2, "name": "camera-2"}]),
        ];
        for value in values {
            let echoed = dispatcher.call("Echo", value.clone()).await.unwrap();
            assert_eq!(echoed, value);
        }
    }

    #[tokio::test]
    async fn test_scalar_responses() {
        let connector = Arc::new(MockConnector::new());
        let dispatcher = dispatcher(&connector);

        for (raw, expected) in [
            ("\"ok\"", json!("ok")),
            ("42", json!(42)),
            ("false", json!(false)),
            ("null", Value::Null),
        ] {
            connector.handle().push_reply(Ok(raw.to_string()));
            assert_eq!(dispatcher.call("LicenseCheck", ()).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_converge() {
        let connector = Arc::new(MockConnector::new().with_cast_delay(Duration::from_millis(20)));
        let dispatcher = dispatcher(&connector);

        let (a, b) = tokio::join!(
            dispatcher.call("QueryAreaTree", json!({"id": 1})),
            dispatcher.call("QueryLabelTree", json!({"id": 2})),
        );
        assert_eq!(a.unwrap(), json!({"id": 1}));
        assert_eq!(b.unwrap(), json!({"id": 2}));
        assert!(dispatcher.cache().is_connected());
        assert_eq!(connector.cast_count(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_connection() {
        let connector = Arc::new(MockConnector::new());
        let dispatcher = dispatcher(&connector);
        let clone = dispatcher.clone();

        dispatcher.call("Login", json!({})).await.unwrap();
        clone.call("Login", json!({})).await.unwrap();
        assert_eq!(connector.cast_count(), 1);

        clone.reset();
        assert!(!dispatcher.cache().is_connected());
    }

    #[tokio::test]
    async fn test_calls_from_spawned_tasks() {
        let connector = Arc::new(MockConnector::new());
        let dispatcher = dispatcher(&connector);

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move { dispatcher.call("QuerySiteList", json!({"page": i})).await })
            })
            .collect();

        for (i, task) in tasks.into_iter().enumerate() {
            assert_eq!(task.await.unwrap().unwrap(), json!({"page": i}));
        }
        assert!(dispatcher.cache().is_connected());
    }
}
