//! `HookPipeline` — an in-process [`PluginHost`].
//!
//! # Execution Model
//!
//! - `before_tool_call`: interceptors run in descending priority. A
//!   `Block` short-circuits; `ProceedWith` replaces the arguments seen by
//!   every later interceptor and by the final decision.
//! - `after_tool_call`: observers run in registration order.

use std::sync::Arc;

use serde_json::Value;

use super::{AfterToolCall, BeforeToolCall, HostTool, PluginHost, ToolCallEvent, ToolResultEvent};
use crate::protocol::CallDecision;
use crate::{Error, Result};

/// Ordered interceptors, observers and inspection tools.
#[derive(Default)]
pub struct HookPipeline {
    before: Vec<(i32, Arc<dyn BeforeToolCall>)>,
    after: Vec<Arc<dyn AfterToolCall>>,
    tools: Vec<Arc<dyn HostTool>>,
}

impl HookPipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run interceptors for a proposed call.
    pub async fn before_tool_call(&self, event: ToolCallEvent) -> CallDecision {
        let mut current = event;
        let mut substituted = false;

        for (_, handler) in &self.before {
            match handler.before_tool_call(&current).await {
                CallDecision::Proceed => {}
                CallDecision::ProceedWith(arguments) => {
                    current.invocation.arguments = arguments;
                    substituted = true;
                }
                CallDecision::Block(reason) => return CallDecision::Block(reason),
            }
        }

        if substituted {
            CallDecision::ProceedWith(current.invocation.arguments)
        } else {
            CallDecision::Proceed
        }
    }

    /// Notify observers that a call finished.
    pub async fn after_tool_call(&self, event: &ToolResultEvent) {
        for handler in &self.after {
            handler.after_tool_call(event).await;
        }
    }

    /// Invoke a registered inspection tool.
    ///
    /// # Errors
    ///
    /// Returns `Error::ToolNotFound` if no tool has that name, or the tool's
    /// own error.
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        tool.call(args).await
    }

    /// Names and descriptions of registered tools.
    #[must_use]
    pub fn tools(&self) -> Vec<(&str, &str)> {
        self.tools.iter().map(|t| (t.name(), t.description())).collect()
    }

    /// Number of registered interceptors.
    #[must_use]
    pub fn interceptor_count(&self) -> usize {
        self.before.len()
    }
}

impl PluginHost for HookPipeline {
    fn on_before_tool_call(&mut self, handler: Arc<dyn BeforeToolCall>, priority: i32) {
        self.before.push((priority, handler));
        // Stable sort keeps registration order among equal priorities.
        self.before.sort_by(|a, b| b.0.cmp(&a.0));
    }

    fn on_after_tool_call(&mut self, handler: Arc<dyn AfterToolCall>) {
        self.after.push(handler);
    }

    fn register_tool(&mut self, tool: Arc<dyn HostTool>) {
        self.tools.push(tool);
    }
}

// ============================================================================
// Tests
// ============================================================================
