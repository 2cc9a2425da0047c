//! JSON-RPC 2.0 message records and the MCP tool-result envelope.
//!
//! Inbound parsing is tolerant (missing `params` becomes null, unknown
//! fields are ignored); outbound messages always carry `"jsonrpc": "2.0"`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// JSON-RPC parse error: the body was not a decodable request.
pub const PARSE_ERROR: i32 = -32700;
/// JSON-RPC method-not-found, also used for unknown tool names.
pub const METHOD_NOT_FOUND: i32 = -32601;

/// The protocol version tag. Serializes as the literal `"2.0"` and
/// refuses anything else on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("2.0")
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let version = String::deserialize(deserializer)?;
        if version == "2.0" {
            Ok(JsonRpcVersion)
        } else {
            Err(serde::de::Error::custom(format!(
                "unsupported JSON-RPC version: {version}"
            )))
        }
    }
}

/// Request identifier. Absence (a notification) is modeled as
/// `Option<RequestId>` on the request itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub method: String,
    pub id: Option<RequestId>,
    #[serde(default)]
    pub params: Value,
}

/// Exactly one of `result` or `error`, flattened into the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Success { result: Value },
    Error { error: JsonRpcError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// Outbound response. `id` is always serialized; it is null only for
/// parse errors, where no request id could be recovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: JsonRpcVersion,
    #[serde(flatten)]
    pub payload: ResponsePayload,
    pub id: Option<RequestId>,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: ResponsePayload::Success { result },
            id: Some(id),
        }
    }

    pub fn error(id: Option<RequestId>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: ResponsePayload::Error {
                error: JsonRpcError {
                    code,
                    message: message.into(),
                },
            },
            id,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::error(None, PARSE_ERROR, message)
    }
}

/// Result payload of a `tools/call`. Failures the agent should see as
/// tool output (rather than transport faults) set `is_error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: true,
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_response_carries_result_only() {
        let response = JsonRpcResponse::success(RequestId::Number(3), json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 3);
        assert_eq!(value["result"], json!({"ok": true}));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn error_response_carries_code_and_message() {
        let response = JsonRpcResponse::error(
            Some(RequestId::String("a1".into())),
            METHOD_NOT_FOUND,
            "Unknown method: nope",
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], "a1");
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Unknown method: nope");
        assert!(value.get("result").is_none());
    }

    #[test]
    fn parse_error_serializes_null_id() {
        let value = serde_json::to_value(JsonRpcResponse::parse_error("bad body")).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("id"));
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32700);
    }

    #[test]
    fn version_tag_rejects_anything_but_two_point_zero() {
        assert!(serde_json::from_value::<JsonRpcVersion>(json!("2.0")).is_ok());
        assert!(serde_json::from_value::<JsonRpcVersion>(json!("1.0")).is_err());
        assert!(serde_json::from_value::<JsonRpcVersion>(json!(2.0)).is_err());
    }

    #[test]
    fn request_tolerates_missing_id_and_params() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "method": "initialize"})).unwrap();
        assert_eq!(request.method, "initialize");
        assert!(request.id.is_none());
        assert!(request.params.is_null());
    }

    #[test]
    fn request_accepts_string_and_number_ids() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"method": "x", "id": 7})).unwrap();
        assert_eq!(request.id, Some(RequestId::Number(7)));

        let request: JsonRpcRequest =
            serde_json::from_value(json!({"method": "x", "id": "seven"})).unwrap();
        assert_eq!(request.id, Some(RequestId::String("seven".into())));
    }

    #[test]
    fn request_without_method_is_rejected() {
        assert!(serde_json::from_value::<JsonRpcRequest>(json!({"id": 1})).is_err());
    }

    #[test]
    fn tool_result_flags_errors_and_omits_flag_on_success() {
        let ok = serde_json::to_value(ToolResult::text("done")).unwrap();
        assert_eq!(ok["content"][0], json!({"type": "text", "text": "done"}));
        assert!(ok.get("isError").is_none());

        let failed = serde_json::to_value(ToolResult::error("Error: nope")).unwrap();
        assert_eq!(failed["isError"], true);
    }

    #[test]
    fn response_round_trips_through_json() {
        let success = JsonRpcResponse::success(RequestId::Number(42), json!({"tools": []}));
        let encoded = serde_json::to_string(&success).unwrap();
        let decoded: JsonRpcResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, success);

        let failure = JsonRpcResponse::error(None, PARSE_ERROR, "Parse error");
        let encoded = serde_json::to_string(&failure).unwrap();
        let decoded: JsonRpcResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, failure);
    }
}
