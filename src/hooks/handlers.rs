//! The validator's handlers and inspection tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use super::{
    AfterToolCall, BeforeToolCall, HostTool, PluginHost, ToolCallEvent, ToolResultEvent,
    VALIDATOR_PRIORITY,
};
use crate::engine::ToolValidator;
use crate::protocol::CallDecision;
use crate::schema::ParameterSchema;
use crate::{Error, Result};

/// Name of the statistics inspection tool.
pub const STATS_TOOL_NAME: &str = "tool_validator_stats";

/// Name of the ad-hoc validation tool.
pub const TEST_TOOL_NAME: &str = "tool_validator_test";

/// Wire `validator` into `host`: the before-call validation hook, the
/// after-call completion observer and both inspection tools.
pub fn register<H: PluginHost + ?Sized>(host: &mut H, validator: &Arc<ToolValidator>) {
    host.on_before_tool_call(
        Arc::new(ValidationHook::new(Arc::clone(validator))),
        VALIDATOR_PRIORITY,
    );
    host.on_after_tool_call(Arc::new(CompletionHook::new(Arc::clone(validator))));
    host.register_tool(Arc::new(StatsTool::new(Arc::clone(validator))));
    host.register_tool(Arc::new(TestCallTool::new(Arc::clone(validator))));
}

/// Before-call hook that turns a verdict into a host decision.
pub struct ValidationHook {
    validator: Arc<ToolValidator>,
}

impl ValidationHook {
    /// Create the hook.
    #[must_use]
    pub fn new(validator: Arc<ToolValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl BeforeToolCall for ValidationHook {
    async fn before_tool_call(&self, event: &ToolCallEvent) -> CallDecision {
        // A schema the host cannot describe properly is treated as absent.
        let schema = event
            .schema
            .as_ref()
            .and_then(|raw| match ParameterSchema::from_value(raw) {
                Ok(schema) => Some(schema),
                Err(e) => {
                    warn!(
                        tool = %event.invocation.name,
                        error = %e,
                        "Ignoring unreadable parameter schema"
                    );
                    None
                }
            });

        self.validator
            .validate(&event.invocation, schema.as_ref())
            .decision()
    }
}

/// After-call hook that records successfully completed tool names.
pub struct CompletionHook {
    validator: Arc<ToolValidator>,
}

impl CompletionHook {
    /// Create the hook.
    #[must_use]
    pub fn new(validator: Arc<ToolValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl AfterToolCall for CompletionHook {
    async fn after_tool_call(&self, event: &ToolResultEvent) {
        if event.succeeded() {
            self.validator.record_completed(&event.tool_name);
        }
    }
}

/// Reports validator statistics and the known tool names.
pub struct StatsTool {
    validator: Arc<ToolValidator>,
}

impl StatsTool {
    /// Create the tool.
    #[must_use]
    pub fn new(validator: Arc<ToolValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl HostTool for StatsTool {
    fn name(&self) -> &str {
        STATS_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Show tool-call validation statistics"
    }

    async fn call(&self, _args: Value) -> Result<Value> {
        let stats = self.validator.stats();
        Ok(json!({
            "stats": serde_json::to_value(stats)?,
            "repairRate": stats.repair_rate(),
            "knownTools": self.validator.known_tools(),
        }))
    }
}

/// Validates a single call supplied as arguments, without dispatching it.
///
/// Arguments: `tool` (string), `arguments` (object or JSON text) and an
/// optional `schema` (object or JSON text).
pub struct TestCallTool {
    validator: Arc<ToolValidator>,
}

impl TestCallTool {
    /// Create the tool.
    #[must_use]
    pub fn new(validator: Arc<ToolValidator>) -> Self {
        Self { validator }
    }
}

fn as_json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl HostTool for TestCallTool {
    fn name(&self) -> &str {
        TEST_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Validate a tool call against an optional schema without running it"
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let tool = args
            .get("tool")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidArguments("'tool' must be a string".to_string()))?;
        let arguments = args.get("arguments").map_or_else(|| "{}".to_string(), as_json_text);
        let schema = args
            .get("schema")
            .filter(|s| !s.is_null())
            .map(as_json_text);

        let verdict = self
            .validator
            .test_call(tool, &arguments, schema.as_deref())?;
        Ok(serde_json::to_value(verdict)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::protocol::ToolInvocation;

    fn validator() -> Arc<ToolValidator> {
        Arc::new(ToolValidator::new(ValidatorConfig::default()).unwrap())
    }

    fn event(name: &str, args: Value) -> ToolCallEvent {
        ToolCallEvent::new(ToolInvocation::from_value(name, args).unwrap())
    }

    #[tokio::test]
    async fn validation_hook_blocks_traversal() {
        let hook = ValidationHook::new(validator());
        let decision = hook
            .before_tool_call(&event("read_file", json!({ "path": "../../../etc/passwd" })))
            .await;
        assert!(decision.is_block());
    }

    #[tokio::test]
    async fn validation_hook_substitutes_repaired_arguments() {
        let hook = ValidationHook::new(validator());
        let e = event("counter", json!({ "count": "5" })).with_schema(json!({
            "properties": { "count": { "type": "number" } },
            "required": ["count"]
        }));

        match hook.before_tool_call(&e).await {
            CallDecision::ProceedWith(args) => assert_eq!(args["count"], json!(5)),
            other => panic!("expected repaired arguments, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn validation_hook_ignores_unreadable_schema() {
        let v = validator();
        let hook = ValidationHook::new(Arc::clone(&v));
        let e = event("counter", json!({ "count": "5" })).with_schema(json!("not a schema"));
        assert_eq!(hook.before_tool_call(&e).await, CallDecision::Proceed);
        assert_eq!(v.stats().errors, 0);
    }

    #[tokio::test]
    async fn completion_hook_records_only_successes() {
        let v = validator();
        let hook = CompletionHook::new(Arc::clone(&v));
        hook.after_tool_call(&ToolResultEvent::success("chroma_search")).await;
        hook.after_tool_call(&ToolResultEvent::failure("chroma_store", "timeout")).await;
        assert_eq!(v.known_tools(), vec!["chroma_search".to_string()]);
    }

    #[tokio::test]
    async fn stats_tool_reports_counters() {
        let v = validator();
        v.record_completed("a_tool");
        let _ = v.validate(&ToolInvocation::from_value("a_tool", json!({})).unwrap(), None);

        let out = StatsTool::new(Arc::clone(&v)).call(Value::Null).await.unwrap();
        assert_eq!(out["stats"]["validated"], json!(1));
        assert_eq!(out["knownTools"], json!(["a_tool"]));
        assert_eq!(out["repairRate"], json!(0.0));
    }

    #[tokio::test]
    async fn stats_tool_reports_repair_rate() {
        let v = validator();
        let schema = ParameterSchema::new()
            .property("count", crate::schema::PrimitiveType::Number)
            .require("count");
        let _ = v.validate(
            &ToolInvocation::from_value("counter", json!({ "count": "5" })).unwrap(),
            Some(&schema),
        );
        let _ = v.validate(
            &ToolInvocation::from_value("counter", json!({ "count": "lots" })).unwrap(),
            Some(&schema),
        );

        let out = StatsTool::new(v).call(Value::Null).await.unwrap();
        assert_eq!(out["stats"]["errors"], json!(2));
        assert_eq!(out["repairRate"], json!(0.5));
    }

    #[tokio::test]
    async fn test_tool_accepts_object_and_text_arguments() {
        let tool = TestCallTool::new(validator());

        let from_object = tool
            .call(json!({
                "tool": "bash",
                "arguments": { "command": "ls; rm -rf /" }
            }))
            .await
            .unwrap();
        assert_eq!(from_object["blocked"], json!(true));

        let from_text = tool
            .call(json!({
                "tool": "counter",
                "arguments": "{count: '5'}",
                "schema": { "properties": { "count": { "type": "number" } } }
            }))
            .await
            .unwrap();
        assert_eq!(from_text["repairedArguments"], json!({ "count": 5 }));
    }

    #[tokio::test]
    async fn test_tool_reports_malformed_json_distinctly() {
        let tool = TestCallTool::new(validator());
        let err = tool
            .call(json!({ "tool": "counter", "arguments": "{count:" }))
            .await
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_tool_requires_tool_name() {
        let tool = TestCallTool::new(validator());
        let err = tool.call(json!({ "arguments": {} })).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }
}
