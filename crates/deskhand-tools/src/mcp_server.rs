//! MCP (Model Context Protocol) stdio server.
//!
//! Exposes registered tools to the calling agent via JSON-RPC 2.0 over
//! stdin/stdout. Each line on stdin is a JSON-RPC request; each response is
//! written as a single line on stdout.
//!
//! The server routes MCP protocol methods:
//! - `initialize` -- returns server capabilities
//! - `notifications/initialized` -- acknowledgement (no response)
//! - `tools/list` -- enumerates all registered tools
//! - `tools/call` -- executes a tool through [`Dispatcher`]

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::dispatcher::{Dispatcher, DispatcherConfig, ToolRequest};
use crate::envelope::ErrorKind;
use crate::registry::ToolRegistry;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be `"2.0"`.
    pub jsonrpc: String,
    /// The method name.
    pub method: String,
    /// Optional parameters.
    #[serde(default)]
    pub params: Option<Value>,
    /// Request ID. Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// The result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Mirrors the request ID.
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code (standard JSON-RPC or application-specific).
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
    /// Structured error data; tool failures carry `{"kind": ...}` here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC error codes.
const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

// Application-specific error codes.
const TOOL_NOT_FOUND: i64 = -32000;
const TOOL_TIMEOUT: i64 = -32001;
const PLATFORM_FAILURE: i64 = -32002;
const ALL_SOURCES_FAILED: i64 = -32003;

fn error_code(kind: ErrorKind) -> i64 {
    match kind {
        ErrorKind::UnknownTool => TOOL_NOT_FOUND,
        ErrorKind::InvalidArgument => INVALID_PARAMS,
        ErrorKind::Timeout => TOOL_TIMEOUT,
        ErrorKind::PlatformFailure => PLATFORM_FAILURE,
        ErrorKind::AllSourcesFailed => ALL_SOURCES_FAILED,
    }
}

// ---------------------------------------------------------------------------
// McpServer
// ---------------------------------------------------------------------------

/// MCP stdio server that exposes registered tools via JSON-RPC 2.0.
///
/// All tool calls are routed through [`Dispatcher`] -- there is no bypass
/// path, so every invocation gets the same validation, deadline, and
/// normalization treatment.
pub struct McpServer {
    registry: ToolRegistry,
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, config: DispatcherConfig) -> Self {
        let dispatcher = Dispatcher::new(registry.clone(), config);
        Self {
            registry,
            dispatcher,
        }
    }

    /// Run the server loop, reading from `stdin` and writing to `stdout`.
    ///
    /// Exits cleanly when stdin reaches EOF. A failed tool call produces an
    /// error response; it never terminates the loop.
    pub async fn run(
        self,
        stdin: impl AsyncBufRead + Unpin,
        mut stdout: impl AsyncWrite + Unpin,
    ) -> Result<()> {
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(_) => {
                    let response = JsonRpcResponse {
                        jsonrpc: "2.0".to_string(),
                        result: None,
                        error: Some(JsonRpcError {
                            code: PARSE_ERROR,
                            message: "Parse error".to_string(),
                            data: None,
                        }),
                        id: Value::Null,
                    };
                    write_response(&mut stdout, &response).await?;
                    continue;
                }
            };

            // Notifications have no id -- nothing to respond to.
            if request.id.is_none() {
                continue;
            }

            let id = request.id.clone().unwrap_or(Value::Null);

            let response = match request.method.as_str() {
                "initialize" => self.handle_initialize(id),
                "tools/list" => self.handle_tools_list(id),
                "tools/call" => self.handle_tools_call(id, request.params).await,
                _ => JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: METHOD_NOT_FOUND,
                        message: format!("Method not found: {}", request.method),
                        data: None,
                    }),
                    id,
                },
            };

            write_response(&mut stdout, &response).await?;
        }

        Ok(())
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(serde_json::json!({
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "deskhand",
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            error: None,
            id,
        }
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .registry
            .list_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                })
            })
            .collect();

        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(serde_json::json!({ "tools": tools })),
            error: None,
            id,
        }
    }

    /// Handle `tools/call`. Params must contain `{ "name": String,
    /// "arguments": Value }`.
    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => {
                return JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: INTERNAL_ERROR,
                        message: "Missing params for tools/call".to_string(),
                        data: None,
                    }),
                    id,
                };
            }
        };

        let tool_name = match params.get("name").and_then(|v| v.as_str()) {
            Some(name) => name.to_string(),
            None => {
                return JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: INTERNAL_ERROR,
                        message: "Missing 'name' in tools/call params".to_string(),
                        data: None,
                    }),
                    id,
                };
            }
        };

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        match self
            .dispatcher
            .dispatch(ToolRequest::new(&tool_name, arguments))
            .await
        {
            Ok(output) => {
                let text =
                    serde_json::to_string(&output.result).unwrap_or_else(|_| "{}".to_string());
                let mut content = vec![serde_json::json!({
                    "type": "text",
                    "text": text,
                })];
                if let Some(blob) = output.content {
                    content.push(serde_json::json!({
                        "type": "image",
                        "data": blob,
                        "mimeType": "image/png",
                    }));
                }
                JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: Some(serde_json::json!({ "content": content })),
                    error: None,
                    id,
                }
            }
            Err(err) => {
                let kind = err.kind();
                JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: error_code(kind),
                        message: err.to_string(),
                        data: Some(serde_json::json!({ "kind": kind })),
                    }),
                    id,
                }
            }
        }
    }
}

/// Write a JSON-RPC response as a single line to the writer.
async fn write_response(
    writer: &mut (impl AsyncWrite + Unpin),
    response: &JsonRpcResponse,
) -> Result<()> {
    let mut line = serde_json::to_string(response)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ToolDefinition, ToolOutput, ToolOutputMetadata};

    struct StubTool {
        tool_name: String,
        tool_description: String,
        schema: serde_json::Value,
        response: serde_json::Value,
        fail_with: Option<String>,
    }

    impl StubTool {
        fn new(name: &str, description: &str, schema: serde_json::Value) -> Self {
            Self {
                tool_name: name.to_string(),
                tool_description: description.to_string(),
                schema,
                response: serde_json::json!({"ok": true}),
                fail_with: None,
            }
        }

        fn with_response(mut self, response: serde_json::Value) -> Self {
            self.response = response;
            self
        }

        fn failing(mut self, message: &str) -> Self {
            self.fail_with = Some(message.to_string());
            self
        }
    }

    #[async_trait::async_trait]
    impl ToolDefinition for StubTool {
        fn name(&self) -> &str {
            &self.tool_name
        }

        fn description(&self) -> &str {
            &self.tool_description
        }

        fn input_schema(&self) -> serde_json::Value {
            self.schema.clone()
        }

        async fn execute(&self, _input: serde_json::Value) -> Result<ToolOutput> {
            if let Some(msg) = &self.fail_with {
                anyhow::bail!("{msg}");
            }
            Ok(ToolOutput {
                result: self.response.clone(),
                content: None,
                metadata: ToolOutputMetadata::finished(1, None),
            })
        }
    }

    fn make_registry(tools: Vec<StubTool>) -> ToolRegistry {
        let registry = ToolRegistry::new();
        for tool in tools {
            registry.register(Box::new(tool)).unwrap();
        }
        registry
    }

    /// Run the server with the given input lines and collect output lines.
    async fn run_server(server: McpServer, input_lines: &[&str]) -> Vec<String> {
        let mut input = String::new();
        for line in input_lines {
            input.push_str(line);
            input.push('\n');
        }

        let stdin = tokio::io::BufReader::new(std::io::Cursor::new(input.into_bytes()));
        let mut stdout_buf: Vec<u8> = Vec::new();

        server.run(stdin, &mut stdout_buf).await.unwrap();

        let output = String::from_utf8(stdout_buf).unwrap();
        output
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .collect()
    }

    fn parse_response(line: &str) -> JsonRpcResponse {
        serde_json::from_str(line).expect("failed to parse response JSON")
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let server = McpServer::new(ToolRegistry::new(), DispatcherConfig::default());

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "initialize",
            "id": 1
        });

        let lines = run_server(server, &[&request.to_string()]).await;
        assert_eq!(lines.len(), 1);

        let resp = parse_response(&lines[0]);
        assert!(resp.error.is_none());

        let result = resp.result.unwrap();
        assert!(result["capabilities"].get("tools").is_some());
        assert_eq!(result["serverInfo"]["name"], "deskhand");
        assert_eq!(resp.id, serde_json::json!(1));
    }

    #[tokio::test]
    async fn tools_list_returns_registered_tools() {
        let registry = make_registry(vec![
            StubTool::new(
                "click",
                "Click at screen coordinates",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "x": {"type": "integer"},
                        "y": {"type": "integer"}
                    },
                    "required": ["x", "y"]
                }),
            ),
            StubTool::new(
                "wait",
                "Pause for a duration",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "seconds": {"type": "number"}
                    },
                    "required": ["seconds"]
                }),
            ),
        ]);
        let server = McpServer::new(registry, DispatcherConfig::default());

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/list",
            "id": 2
        });

        let lines = run_server(server, &[&request.to_string()]).await;
        let resp = parse_response(&lines[0]);
        assert!(resp.error.is_none());

        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "click");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
        assert_eq!(tools[1]["name"], "wait");
    }

    #[tokio::test]
    async fn tools_call_executes_through_the_dispatcher() {
        let tool = StubTool::new(
            "clipboard",
            "Read or write the clipboard",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "mode": {"type": "string"}
                },
                "required": ["mode"]
            }),
        )
        .with_response(serde_json::json!({"text": "copied"}));
        let server = McpServer::new(make_registry(vec![tool]), DispatcherConfig::default());

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {
                "name": "clipboard",
                "arguments": {"mode": "paste"}
            },
            "id": 3
        });

        let lines = run_server(server, &[&request.to_string()]).await;
        let resp = parse_response(&lines[0]);
        assert!(resp.error.is_none());

        let content = resp.result.unwrap()["content"].as_array().unwrap().clone();
        assert_eq!(content[0]["type"], "text");
        let parsed: Value = serde_json::from_str(content[0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(parsed["text"], "copied");
    }

    #[tokio::test]
    async fn unknown_tool_maps_to_tool_not_found_code() {
        let server = McpServer::new(ToolRegistry::new(), DispatcherConfig::default());

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {
                "name": "no_such_tool",
                "arguments": {}
            },
            "id": 4
        });

        let lines = run_server(server, &[&request.to_string()]).await;
        let resp = parse_response(&lines[0]);
        let err = resp.error.unwrap();
        assert_eq!(err.code, TOOL_NOT_FOUND);
        assert_eq!(err.data.unwrap()["kind"], "unknown_tool");
    }

    #[tokio::test]
    async fn invalid_arguments_map_to_invalid_params_code() {
        let tool = StubTool::new(
            "click",
            "Click at screen coordinates",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "x": {"type": "integer"},
                    "y": {"type": "integer"}
                },
                "required": ["x", "y"]
            }),
        );
        let server = McpServer::new(make_registry(vec![tool]), DispatcherConfig::default());

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {
                "name": "click",
                "arguments": {"x": 10}
            },
            "id": 5
        });

        let lines = run_server(server, &[&request.to_string()]).await;
        let resp = parse_response(&lines[0]);
        let err = resp.error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(err.data.unwrap()["kind"], "invalid_argument");
        assert!(err.message.contains('y'));
    }

    #[tokio::test]
    async fn platform_faults_map_to_platform_failure_code() {
        let tool = StubTool::new(
            "launch",
            "Launch an application",
            serde_json::json!({"type": "object", "properties": {}}),
        )
        .failing("process not found: snipping-tool");
        let server = McpServer::new(make_registry(vec![tool]), DispatcherConfig::default());

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {
                "name": "launch",
                "arguments": {}
            },
            "id": 6
        });

        let lines = run_server(server, &[&request.to_string()]).await;
        let resp = parse_response(&lines[0]);
        let err = resp.error.unwrap();
        assert_eq!(err.code, PLATFORM_FAILURE);
        assert_eq!(err.data.unwrap()["kind"], "platform_failure");
        assert!(err.message.contains("process not found"));
    }

    #[tokio::test]
    async fn notifications_produce_no_response() {
        let server = McpServer::new(ToolRegistry::new(), DispatcherConfig::default());

        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        });

        let lines = run_server(server, &[&notification.to_string()]).await;
        assert!(lines.is_empty(), "notification must not be answered: {lines:?}");
    }

    #[tokio::test]
    async fn malformed_json_produces_parse_error() {
        let server = McpServer::new(ToolRegistry::new(), DispatcherConfig::default());

        let lines = run_server(server, &["this is not valid json"]).await;
        let resp = parse_response(&lines[0]);
        let err = resp.error.unwrap();
        assert_eq!(err.code, PARSE_ERROR);
        assert_eq!(resp.id, Value::Null);
    }

    #[tokio::test]
    async fn server_exits_cleanly_on_eof() {
        let server = McpServer::new(ToolRegistry::new(), DispatcherConfig::default());

        let stdin = tokio::io::BufReader::new(std::io::Cursor::new(Vec::<u8>::new()));
        let mut stdout_buf: Vec<u8> = Vec::new();

        let result = server.run(stdin, &mut stdout_buf).await;
        assert!(result.is_ok());
        assert!(stdout_buf.is_empty());
    }

    #[tokio::test]
    async fn a_failed_call_does_not_stop_the_loop() {
        let tool = StubTool::new(
            "shell",
            "Run a shell command",
            serde_json::json!({"type": "object", "properties": {}}),
        );
        let server = McpServer::new(make_registry(vec![tool]), DispatcherConfig::default());

        let bad = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "missing", "arguments": {} },
            "id": 1
        });
        let good = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "shell", "arguments": {} },
            "id": 2
        });

        let lines = run_server(server, &[&bad.to_string(), &good.to_string()]).await;
        assert_eq!(lines.len(), 2);
        assert!(parse_response(&lines[0]).error.is_some());
        assert!(parse_response(&lines[1]).error.is_none());
    }
}
