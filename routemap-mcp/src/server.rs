//! Line-delimited JSON-RPC 2.0 server exposing `render_route_map` as a tool.

use routemap::{RouteMapError, RouteMapRenderer};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Protocol revision announced in the `initialize` response.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
/// Name under which the renderer is exposed.
pub const TOOL_NAME: &str = "render_route_map";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Serves tool calls with a single renderer.
pub struct McpServer {
    renderer: RouteMapRenderer,
}

impl McpServer {
    /// Creates a server using `renderer` for every tool call.
    pub fn new(renderer: RouteMapRenderer) -> Self {
        Self { renderer }
    }

    /// Reads requests from `input` one line at a time and writes responses to
    /// `output` until the input is closed.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(input).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line).await {
                let mut encoded = serde_json::to_vec(&response)?;
                encoded.push(b'\n');
                output.write_all(&encoded).await?;
                output.flush().await?;
            }
        }

        log::info!("Input closed, shutting down");
        Ok(())
    }

    /// Handles one raw message. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_message(message).await,
            Err(err) => {
                log::warn!("Unparseable message: {err}");
                Some(error_response(Value::Null, PARSE_ERROR, err.to_string()))
            }
        }
    }

    /// Handles one decoded message. Returns `None` for notifications.
    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        let fallback_id = message.get("id").cloned().unwrap_or(Value::Null);
        let request: Request = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(err) => {
                return Some(error_response(
                    fallback_id,
                    INVALID_REQUEST,
                    format!("invalid request: {err}"),
                ))
            }
        };

        let Some(id) = request.id else {
            log::debug!("Notification '{}'", request.method);
            return None;
        };

        log::debug!("Request '{}' ({id})", request.method);
        let response = match request.method.as_str() {
            "initialize" => Ok(initialize_result()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": [tool_descriptor()] })),
            "tools/call" => self.call_tool(request.params).await,
            other => Err((METHOD_NOT_FOUND, format!("method not found: {other}"))),
        };

        Some(match response {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err((code, message)) => error_response(id, code, message),
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, (i64, String)> {
        let params: CallParams = serde_json::from_value(params)
            .map_err(|err| (INVALID_PARAMS, format!("invalid tools/call params: {err}")))?;
        if params.name != TOOL_NAME {
            return Err((INVALID_PARAMS, format!("unknown tool: {}", params.name)));
        }

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        Ok(match self.renderer.render_route_map_json(arguments).await {
            Ok(outcome) => {
                let structured = json!(outcome);
                json!({
                    "content": [{ "type": "text", "text": structured.to_string() }],
                    "structuredContent": structured,
                    "isError": false,
                })
            }
            Err(err) => tool_error(&err),
        })
    }
}

fn tool_error(err: &RouteMapError) -> Value {
    log::warn!("{TOOL_NAME} failed: {err}");
    json!({
        "content": [{ "type": "text", "text": format!("{}: {err}", err.kind()) }],
        "isError": true,
    })
}

fn error_response(id: Value, code: i64, message: String) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": "routemap",
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn tool_descriptor() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Render a route on an OpenStreetMap basemap with optional labeled markers and save it as PNG.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "coordinates": {
                    "type": "array",
                    "description": "Route as [longitude, latitude] pairs in degrees.",
                    "minItems": 1,
                    "items": {
                        "type": "array",
                        "items": { "type": "number" },
                        "minItems": 2,
                        "maxItems": 2,
                    },
                },
                "output_path": {
                    "type": "string",
                    "description": "File path of the PNG to write. Missing directories are created.",
                },
                "markers": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "lon": { "type": "number" },
                            "lat": { "type": "number" },
                            "label": { "type": "string" },
                        },
                        "required": ["lon", "lat"],
                    },
                },
                "width": { "type": "integer", "minimum": 1, "default": routemap::request::DEFAULT_WIDTH },
                "height": { "type": "integer", "minimum": 1, "default": routemap::request::DEFAULT_HEIGHT },
                "line_color": {
                    "type": "string",
                    "description": "Color name or hex value such as #ff0000.",
                    "default": routemap::request::DEFAULT_LINE_COLOR,
                },
                "line_width": { "type": "integer", "minimum": 1, "maximum": routemap::request::MAX_LINE_WIDTH, "default": routemap::request::DEFAULT_LINE_WIDTH },
                "basemap": {
                    "type": "string",
                    "enum": routemap::Basemap::ALL.iter().map(|b| b.id()).collect::<Vec<_>>(),
                    "default": routemap::Basemap::default().id(),
                },
            },
            "required": ["coordinates", "output_path"],
        },
    })
}
