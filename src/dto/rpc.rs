use crate::error::ServerFault;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder request id; the API does not correlate on it.
pub const REQUEST_ID: i32 = -1;

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub id: i32,
    pub method: &'a str,
    pub params: &'a Map<String, Value>,
}

impl<'a> RpcRequest<'a> {
    pub fn new(method: &'a str, params: &'a Map<String, Value>) -> Self {
        Self {
            id: REQUEST_ID,
            method,
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// The `error` member of a response.
///
/// MyGeotab wraps the interesting fault in `errors`; older endpoints put
/// `name`/`message` directly on the object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<RpcErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcErrorDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stack_trace: Option<String>,
}

impl RpcError {
    pub fn into_fault(self, raw: Value) -> ServerFault {
        let (name, message, stack_trace) = match self.errors.into_iter().next() {
            Some(detail) => (
                detail.name.or(self.name),
                detail.message.or(self.message),
                detail.stack_trace,
            ),
            None => (self.name, self.message, None),
        };
        ServerFault {
            name: name.unwrap_or_else(|| "UnknownError".to_string()),
            message: message.unwrap_or_default(),
            stack_trace,
            raw,
        }
    }
}

/// Decode the raw `error` member of a response into a fault.
pub fn decode_fault(raw: Value) -> ServerFault {
    let error = serde_json::from_value::<RpcError>(raw.clone()).unwrap_or_else(|_| RpcError {
        message: raw.as_str().map(str::to_string),
        ..Default::default()
    });
    error.into_fault(raw)
}

/// Result of a successful `Authenticate` call.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticateResult {
    /// `ThisServer`, or the host that owns the database.
    pub path: String,
    pub credentials: SessionCredentials,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    pub user_name: String,
    pub session_id: String,
    #[serde(default)]
    pub database: Option<String>,
}
