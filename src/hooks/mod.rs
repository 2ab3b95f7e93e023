//! Host integration.
//!
//! The validator does not own a call pipeline. A host exposes one through
//! [`PluginHost`]: interceptors that run before a tool call, observers that
//! run after it, and a surface for registering inspection tools. [`register`]
//! wires a [`ToolValidator`](crate::ToolValidator) into any such host.
//!
//! [`HookPipeline`] is a minimal in-process host used by the binary and by
//! tests.
//!
//! # Handler order
//!
//! Before-call handlers run in **descending** priority; equal priorities
//! keep registration order. The validator registers at
//! [`VALIDATOR_PRIORITY`] so it sees calls before other interceptors.

mod handlers;
mod pipeline;

pub use handlers::{
    CompletionHook, STATS_TOOL_NAME, StatsTool, TEST_TOOL_NAME, TestCallTool, ValidationHook,
    register,
};
pub use pipeline::HookPipeline;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::protocol::{CallDecision, ToolInvocation};

/// Priority of the validator's before-call handler.
pub const VALIDATOR_PRIORITY: i32 = 1000;

/// A tool call about to be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallEvent {
    /// The proposed call
    pub invocation: ToolInvocation,
    /// Declared parameter schema of the tool, if the host knows it
    pub schema: Option<Value>,
}

impl ToolCallEvent {
    /// Event without a schema.
    #[must_use]
    pub fn new(invocation: ToolInvocation) -> Self {
        Self {
            invocation,
            schema: None,
        }
    }

    /// Attach the tool's parameter schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// A tool call that has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResultEvent {
    /// Name the call was dispatched under
    pub tool_name: String,
    /// Failure message; `None` means the call succeeded
    pub error: Option<String>,
}

impl ToolResultEvent {
    /// A successful completion.
    pub fn success(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            error: None,
        }
    }

    /// A failed completion.
    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            error: Some(error.into()),
        }
    }

    /// Returns `true` if the call succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Interceptor run before a tool call is dispatched.
#[async_trait]
pub trait BeforeToolCall: Send + Sync + 'static {
    /// Decide whether the call proceeds, proceeds with new arguments, or is
    /// blocked.
    async fn before_tool_call(&self, event: &ToolCallEvent) -> CallDecision;
}

/// Observer run after a tool call finishes.
#[async_trait]
pub trait AfterToolCall: Send + Sync + 'static {
    /// Observe a finished call.
    async fn after_tool_call(&self, event: &ToolResultEvent);
}

/// Tool exposed to the host for inspection.
#[async_trait]
pub trait HostTool: Send + Sync + 'static {
    /// Unique tool name.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Run the tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are malformed.
    async fn call(&self, args: Value) -> Result<Value>;
}

/// Registration surface a host offers to extensions.
pub trait PluginHost {
    /// Register an interceptor. Higher priorities run first.
    fn on_before_tool_call(&mut self, handler: Arc<dyn BeforeToolCall>, priority: i32);

    /// Register an observer of finished calls.
    fn on_after_tool_call(&mut self, handler: Arc<dyn AfterToolCall>);

    /// Register an inspection tool.
    fn register_tool(&mut self, tool: Arc<dyn HostTool>);
}
