//! The dispatcher: validation, deadline enforcement, and error normalization.
//!
//! [`Dispatcher::dispatch`] is the single entry point for every tool
//! invocation:
//!
//! 1. **Resolution** -- look the tool up in the registry.
//! 2. **Size check** -- reject oversized argument payloads.
//! 3. **Validation** -- structural checks against the tool's JSON schema,
//!    including rejection of unknown argument keys. No capability backend is
//!    touched before validation passes.
//! 4. **Deadline enforcement** -- the request deadline if given, else the
//!    tool's own timeout. An expired invocation is abandoned, not
//!    interrupted: the platform call may finish in the background while the
//!    caller already holds a `Timeout` failure.
//! 5. **Normalization** -- every handler fault becomes a [`DispatchError`];
//!    nothing propagates past this boundary raw.
//!
//! The dispatcher performs no I/O of its own and holds no per-request state,
//! so independent requests dispatch concurrently without serialization.

use std::time::{Duration, Instant};

use crate::definition::ToolOutput;
use crate::envelope::DispatchError;
use crate::registry::ToolRegistry;

/// Configuration for the [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum serialized JSON size (in bytes) accepted as tool arguments.
    /// Defaults to 1 MiB.
    pub max_input_bytes: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 1_048_576,
        }
    }
}

/// One tool invocation. Created per call by the transport boundary,
/// consumed once by [`Dispatcher::dispatch`], never retained.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    pub tool: String,
    pub arguments: serde_json::Value,
    /// Explicit execution budget; overrides the tool's default timeout.
    pub deadline: Option<Duration>,
}

impl ToolRequest {
    pub fn new(tool: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            arguments,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Routes validated requests to registered tools under a deadline.
#[derive(Clone)]
pub struct Dispatcher {
    registry: ToolRegistry,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, config: DispatcherConfig) -> Self {
        Self { registry, config }
    }

    /// Dispatch one request and return the uniform result envelope.
    pub async fn dispatch(&self, request: ToolRequest) -> Result<ToolOutput, DispatchError> {
        let tool = self
            .registry
            .get_tool(&request.tool)
            .ok_or_else(|| DispatchError::UnknownTool {
                name: request.tool.clone(),
            })?;

        let serialized =
            serde_json::to_string(&request.arguments).map_err(|e| DispatchError::InvalidArgument {
                reason: format!("arguments are not serializable: {e}"),
            })?;
        if serialized.len() > self.config.max_input_bytes {
            return Err(DispatchError::InvalidArgument {
                reason: format!(
                    "arguments too large: {} bytes exceeds limit of {} bytes",
                    serialized.len(),
                    self.config.max_input_bytes
                ),
            });
        }

        if let Err(reason) = validate_arguments(&request.arguments, &tool.input_schema()) {
            return Err(DispatchError::InvalidArgument { reason });
        }

        let timeout = request.deadline.unwrap_or_else(|| tool.timeout());
        let start = Instant::now();

        let result = tokio::time::timeout(timeout, tool.execute(request.arguments)).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(output)) => {
                tracing::debug!(tool = %request.tool, latency_ms, "tool completed");
                Ok(output)
            }
            Ok(Err(fault)) => {
                // The aggregator signals all-sources-failed through the
                // anyhow chain; anything else is a platform fault.
                let err = match fault.downcast::<DispatchError>() {
                    Ok(passthrough) => passthrough,
                    Err(other) => DispatchError::PlatformFailure {
                        tool: request.tool.clone(),
                        source: other,
                    },
                };
                tracing::warn!(tool = %request.tool, latency_ms, error = %err, "tool failed");
                Err(err)
            }
            Err(_elapsed) => {
                tracing::warn!(
                    tool = %request.tool,
                    timeout_ms = timeout.as_millis() as u64,
                    "tool deadline expired, abandoning the invocation"
                );
                Err(DispatchError::Timeout {
                    tool: request.tool.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

/// Structural validation of `input` against a JSON Schema object.
///
/// Intentionally lightweight (no `jsonschema` crate):
/// - the input must be an object when the schema says `"type": "object"`;
/// - every `required` key must be present;
/// - present keys must match the top-level type declared in `properties`;
/// - keys not declared in `properties` are rejected.
///
/// The first violation is reported, naming the offending parameter.
fn validate_arguments(input: &serde_json::Value, schema: &serde_json::Value) -> Result<(), String> {
    let schema_obj = match schema.as_object() {
        Some(o) => o,
        None => return Ok(()),
    };

    if let Some(serde_json::Value::String(expected)) = schema_obj.get("type") {
        if expected == "object" && !input.is_object() {
            return Err("arguments must be a JSON object".to_string());
        }
    }

    let Some(input_obj) = input.as_object() else {
        return Ok(());
    };

    if let Some(serde_json::Value::Array(required)) = schema_obj.get("required") {
        for req in required {
            if let Some(field) = req.as_str() {
                if !input_obj.contains_key(field) {
                    return Err(format!("missing required argument: {field}"));
                }
            }
        }
    }

    let empty = serde_json::Map::new();
    let properties = match schema_obj.get("properties") {
        Some(serde_json::Value::Object(props)) => props,
        _ => &empty,
    };

    for key in input_obj.keys() {
        if !properties.contains_key(key) {
            return Err(format!("unknown argument: {key}"));
        }
    }

    for (field, field_schema) in properties {
        let Some(value) = input_obj.get(field) else {
            continue;
        };
        if let Some(serde_json::Value::String(field_type)) = field_schema.get("type") {
            let ok = match field_type.as_str() {
                "string" => value.is_string(),
                "integer" => value.is_i64() || value.is_u64(),
                "number" => value.is_number(),
                "boolean" => value.is_boolean(),
                "object" => value.is_object(),
                "array" => value.is_array(),
                _ => true,
            };
            if !ok {
                return Err(format!("argument {field} must be of type {field_type}"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ToolDefinition, ToolOutput, ToolOutputMetadata};
    use crate::envelope::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Behavior of one [`ScriptedTool`] execution.
    enum Script {
        Succeed,
        Fail(String),
        FailWith(fn() -> anyhow::Error),
        Hang,
        Sleep(Duration),
    }

    /// A tool whose behavior is scripted and whose executions are counted.
    struct ScriptedTool {
        tool_name: String,
        schema: serde_json::Value,
        script: Script,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedTool {
        fn new(name: &str, script: Script) -> Self {
            Self {
                tool_name: name.to_string(),
                schema: serde_json::json!({
                    "type": "object",
                    "properties": {}
                }),
                script,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn with_schema(mut self, schema: serde_json::Value) -> Self {
            self.schema = schema;
            self
        }

        fn call_counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait::async_trait]
    impl ToolDefinition for ScriptedTool {
        fn name(&self) -> &str {
            &self.tool_name
        }

        fn description(&self) -> &str {
            "scripted tool for dispatcher tests"
        }

        fn input_schema(&self) -> serde_json::Value {
            self.schema.clone()
        }

        async fn execute(&self, _input: serde_json::Value) -> anyhow::Result<ToolOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Succeed => {}
                Script::Fail(msg) => anyhow::bail!("{msg}"),
                Script::FailWith(make) => return Err(make()),
                Script::Hang => std::future::pending::<()>().await,
                Script::Sleep(d) => tokio::time::sleep(*d).await,
            }
            Ok(ToolOutput {
                result: serde_json::json!({"status": "ok"}),
                content: None,
                metadata: ToolOutputMetadata::finished(1, None),
            })
        }
    }

    fn dispatcher_with(tool: ScriptedTool) -> Dispatcher {
        let registry = ToolRegistry::new();
        registry.register(Box::new(tool)).unwrap();
        Dispatcher::new(registry, DispatcherConfig::default())
    }

    #[tokio::test]
    async fn dispatches_a_valid_request() {
        let dispatcher = dispatcher_with(ScriptedTool::new("click", Script::Succeed));

        let output = dispatcher
            .dispatch(ToolRequest::new("click", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(output.result["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_as_such() {
        let dispatcher = Dispatcher::new(ToolRegistry::new(), DispatcherConfig::default());

        let err = dispatcher
            .dispatch(ToolRequest::new("unknown_tool", serde_json::json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);
        assert!(format!("{err}").contains("unknown_tool"));
    }

    #[tokio::test]
    async fn missing_required_argument_fails_without_touching_the_backend() {
        let tool = ScriptedTool::new("click", Script::Succeed).with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "x": {"type": "integer"},
                "y": {"type": "integer"}
            },
            "required": ["x", "y"]
        }));
        let calls = tool.call_counter();
        let dispatcher = dispatcher_with(tool);

        let err = dispatcher
            .dispatch(ToolRequest::new("click", serde_json::json!({"x": 100})))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(format!("{err}").contains('y'), "message must name the parameter");
        assert_eq!(calls.load(Ordering::SeqCst), 0, "backend must not run");
    }

    #[tokio::test]
    async fn unknown_argument_keys_are_rejected() {
        let tool = ScriptedTool::new("wait", Script::Succeed).with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "seconds": {"type": "number"}
            },
            "required": ["seconds"]
        }));
        let calls = tool.call_counter();
        let dispatcher = dispatcher_with(tool);

        let err = dispatcher
            .dispatch(ToolRequest::new(
                "wait",
                serde_json::json!({"seconds": 1, "minutes": 2}),
            ))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(format!("{err}").contains("minutes"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mistyped_argument_is_rejected() {
        let tool = ScriptedTool::new("click", Script::Succeed).with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "x": {"type": "integer"}
            },
            "required": ["x"]
        }));
        let dispatcher = dispatcher_with(tool);

        let err = dispatcher
            .dispatch(ToolRequest::new("click", serde_json::json!({"x": "100"})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(format!("{err}").contains('x'));
    }

    #[tokio::test]
    async fn non_object_arguments_are_rejected() {
        let dispatcher = dispatcher_with(ScriptedTool::new("click", Script::Succeed));

        let err = dispatcher
            .dispatch(ToolRequest::new("click", serde_json::json!([1, 2])))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn oversized_arguments_are_rejected() {
        let tool = ScriptedTool::new("type_text", Script::Succeed).with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "text": {"type": "string"}
            }
        }));
        let calls = tool.call_counter();
        let registry = ToolRegistry::new();
        registry.register(Box::new(tool)).unwrap();
        let dispatcher = Dispatcher::new(registry, DispatcherConfig { max_input_bytes: 64 });

        let err = dispatcher
            .dispatch(ToolRequest::new(
                "type_text",
                serde_json::json!({"text": "x".repeat(200)}),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deadline_expiry_returns_timeout_even_if_the_call_never_completes() {
        let dispatcher = dispatcher_with(ScriptedTool::new("hang", Script::Hang));

        let start = Instant::now();
        let err = dispatcher
            .dispatch(
                ToolRequest::new("hang", serde_json::json!({}))
                    .with_deadline(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        let elapsed = start.elapsed();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(
            elapsed < Duration::from_millis(500),
            "caller must get the timeout promptly, waited {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn request_deadline_overrides_the_tool_timeout() {
        // The tool would finish in 100ms, well under its default 30s budget,
        // but the request narrows the deadline below that.
        let dispatcher =
            dispatcher_with(ScriptedTool::new("slow", Script::Sleep(Duration::from_millis(100))));

        let err = dispatcher
            .dispatch(
                ToolRequest::new("slow", serde_json::json!({}))
                    .with_deadline(Duration::from_millis(20)),
            )
            .await
            .unwrap_err();
        match err {
            DispatchError::Timeout { tool, timeout_ms } => {
                assert_eq!(tool, "slow");
                assert_eq!(timeout_ms, 20);
            }
            other => panic!("expected Timeout, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn handler_faults_become_platform_failures() {
        let dispatcher =
            dispatcher_with(ScriptedTool::new("resize", Script::Fail("window not found".into())));

        let err = dispatcher
            .dispatch(ToolRequest::new("resize", serde_json::json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlatformFailure);
        assert!(format!("{err}").contains("window not found"));
    }

    #[tokio::test]
    async fn typed_dispatch_errors_pass_through_unwrapped() {
        let dispatcher = dispatcher_with(ScriptedTool::new(
            "state",
            Script::FailWith(|| anyhow::Error::new(DispatchError::AllSourcesFailed { attempted: 5 })),
        ));

        let err = dispatcher
            .dispatch(ToolRequest::new("state", serde_json::json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllSourcesFailed);
    }

    #[tokio::test]
    async fn repeated_invocations_share_no_state() {
        let dispatcher = dispatcher_with(ScriptedTool::new("wait", Script::Succeed));

        let first = dispatcher
            .dispatch(ToolRequest::new("wait", serde_json::json!({})))
            .await
            .unwrap();
        let second = dispatcher
            .dispatch(ToolRequest::new("wait", serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(first.result, second.result);
        assert!(second.metadata.completed_at >= first.metadata.completed_at);
    }
}
