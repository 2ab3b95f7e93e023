//! Security checks applied to tool calls before any other processing.

pub mod danger;

pub use danger::{ANY_TOOL, DangerCheck, DangerRuleConfig, DangerScanner, ToolMatch};
