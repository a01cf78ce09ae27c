//! JSON-RPC 2.0 messages exchanged by the TCP transport.

use serde::{Deserialize, Serialize};

/// Request identifier - can be string, number, or null
pub type RequestId = serde_json::Value;

/// JSON-RPC 2.0 request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl Request {
    /// Create a new request with a fresh correlation id
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params: None,
            id: None,
            correlation_id: Some(uuid::Uuid::new_v4().to_string()),
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&serde_json::Value> {
        self.params.as_ref()
    }

    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }
}

/// JSON-RPC 2.0 response message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl Response {
    pub fn success(result: serde_json::Value, id: Option<RequestId>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
            correlation_id: None,
        }
    }

    pub fn error(error: RpcError, id: Option<RequestId>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
            correlation_id: None,
        }
    }

    /// Echo the correlation id of the request being answered
    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Numeric request id, as assigned by [`TcpHandle`](super::TcpHandle)
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.as_ref().and_then(|id| id.as_u64())
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;

    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;

    /// The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;

    pub const INVALID_PARAMS: i32 = -32602;

    pub const INTERNAL_ERROR: i32 = -32603;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_creation() {
        let request = Request::new("Login");
        assert_eq!(request.jsonrpc, "2.0");
        assert_eq!(request.method(), "Login");
        assert!(request.params().is_none());
        assert!(request.id().is_none());
        assert!(request.correlation_id.is_some());
    }

    #[test]
    fn test_request_wire_format() {
        let request = Request::new("AddUser")
            .with_params(json!([r#"{"name":"a"}"#]))
            .with_id(json!(7));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "AddUser");
        assert_eq!(value["params"], json!([r#"{"name":"a"}"#]));
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = Request::new("Login");
        let b = Request::new("Login");
        assert_ne!(a.correlation_id, b.correlation_id);
    }

    #[test]
    fn test_response_success_parse() {
        let response: Response =
            serde_json::from_str(r#"{"jsonrpc":"2.0","result":"[]","id":3}"#).unwrap();
        assert!(response.is_success());
        assert_eq!(response.numeric_id(), Some(3));
        assert_eq!(response.result, Some(json!("[]")));
    }

    #[test]
    fn test_response_error_parse() {
        let response: Response = serde_json::from_str(
            r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":4}"#,
        )
        .unwrap();
        assert!(response.is_error());
        assert!(!response.is_success());
        assert_eq!(
            response.error,
            Some(RpcError::new(error_codes::METHOD_NOT_FOUND, "Method not found"))
        );
    }

    #[test]
    fn test_response_non_numeric_id() {
        let response = Response::success(json!(true), Some(json!("abc")));
        assert_eq!(response.numeric_id(), None);
    }

    #[test]
    fn test_error_omits_missing_data() {
        let text = serde_json::to_string(&RpcError::new(-32000, "boom")).unwrap();
        assert_eq!(text, r#"{"code":-32000,"message":"boom"}"#);

        let with_data = RpcError::new(-32000, "boom").with_data(json!({"table": "user"}));
        assert_eq!(with_data.data, Some(json!({"table": "user"})));
    }
}
