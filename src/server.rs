//! Request routing and the read-dispatch-write server loop.

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::framing::{read_frame, write_frame, Frame, FrameError};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RequestId, METHOD_NOT_FOUND};
use crate::tools::{self, ToolName};
use crate::trash::SafeRm;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "safe-rm";

/// Serve over the process stdio streams until stdin closes.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve(config, reader, writer).await
}

/// Read-dispatch-write loop. One request is fully handled before the
/// next read starts, so responses leave in request order. Malformed
/// input is logged or answered and the loop keeps going; only stream
/// closure ends it.
pub async fn serve<R, W>(config: Config, mut reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let safe_rm = SafeRm::new(config);

    loop {
        let request: JsonRpcRequest = match read_frame(&mut reader).await {
            Ok(Frame::Message(request)) => request,
            Ok(Frame::Empty) => continue,
            Ok(Frame::Eof) => break,
            Err(FrameError::Json(e)) => {
                warn!("discarding undecodable body: {e}");
                let response = JsonRpcResponse::parse_error(format!("Parse error: {e}"));
                write_frame(&mut writer, &response).await?;
                continue;
            }
            Err(FrameError::Header(e)) => {
                warn!("skipping badly framed message: {e}");
                continue;
            }
            Err(FrameError::Io(e)) => {
                error!("transport read failed: {e}");
                break;
            }
        };

        debug!(method = %request.method, "dispatching");
        if let Some(response) = dispatch(&safe_rm, request).await {
            write_frame(&mut writer, &response).await?;
        }
    }

    Ok(())
}

/// Route one request. `None` means nothing goes on the wire, which is
/// the contract for requests without an id and for notifications.
async fn dispatch(safe_rm: &SafeRm, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    let JsonRpcRequest { method, id, params } = request;

    match method.as_str() {
        "initialize" => {
            let result = json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            });
            Some(JsonRpcResponse::success(id?, result))
        }
        "tools/list" => {
            let result = json!({ "tools": tools::list_descriptors() });
            Some(JsonRpcResponse::success(id?, result))
        }
        "tools/call" => call_tool(safe_rm, id, params).await,
        "notifications/initialized" => None,
        _ => Some(JsonRpcResponse::error(
            Some(id?),
            METHOD_NOT_FOUND,
            format!("Unknown method: {method}"),
        )),
    }
}

async fn call_tool(safe_rm: &SafeRm, id: Option<RequestId>, params: Value) -> Option<JsonRpcResponse> {
    let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    let tool = match ToolName::from_name(name) {
        Some(tool) => tool,
        None => {
            return Some(JsonRpcResponse::error(
                Some(id?),
                METHOD_NOT_FOUND,
                format!("Unknown tool: {name}"),
            ))
        }
    };

    // Tools run even for id-less requests; only the response is dropped.
    let result = tool.call(safe_rm, arguments).await;
    let result = serde_json::to_value(result).unwrap_or(Value::Null);
    Some(JsonRpcResponse::success(id?, result))
}
