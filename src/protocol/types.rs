//! Tool invocation and verdict type definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool call proposed by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Tool name as emitted by the model
    pub name: String,
    /// Argument object
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    /// Create an invocation from a name and an argument object.
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Build an invocation from an arbitrary JSON value.
    ///
    /// Returns `None` when `arguments` is not an object. `null` is accepted
    /// as "no arguments".
    #[must_use]
    pub fn from_value(name: impl Into<String>, arguments: Value) -> Option<Self> {
        match arguments {
            Value::Object(map) => Some(Self::new(name, map)),
            Value::Null => Some(Self::new(name, Map::new())),
            _ => None,
        }
    }
}

/// Advisory correction for a tool name that is not known verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSuggestion {
    /// Closest known tool name
    pub name: String,
    /// Edit distance between the proposed and the suggested name
    pub distance: usize,
}

/// Outcome of validating one tool invocation.
///
/// Built only through the constructors below so that a blocked verdict
/// never carries repaired arguments and a valid verdict never carries errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    /// Arguments (original or repaired) satisfy the schema
    pub valid: bool,
    /// Validation errors, in the order they were found
    #[serde(default)]
    pub errors: Vec<String>,
    /// Corrected arguments to dispatch instead of the originals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repaired_arguments: Option<Map<String, Value>>,
    /// The call must not be executed
    pub blocked: bool,
    /// Why the call was blocked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    /// Closest known tool name when the proposed one is unknown.
    /// Never applied to dispatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<ToolSuggestion>,
}

impl ValidationVerdict {
    /// The call is well-formed and proceeds unchanged.
    #[must_use]
    pub fn pass() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            repaired_arguments: None,
            blocked: false,
            block_reason: None,
            suggestion: None,
        }
    }

    /// The call proceeds with corrected arguments.
    #[must_use]
    pub fn repaired(arguments: Map<String, Value>) -> Self {
        Self {
            repaired_arguments: Some(arguments),
            ..Self::pass()
        }
    }

    /// The call is invalid but proceeds with its original arguments.
    #[must_use]
    pub fn pass_with_errors(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
            ..Self::pass()
        }
    }

    /// The call must not run.
    #[must_use]
    pub fn blocked(reason: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
            repaired_arguments: None,
            blocked: true,
            block_reason: Some(reason.into()),
            suggestion: None,
        }
    }

    /// Attach an advisory tool-name suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Option<ToolSuggestion>) -> Self {
        self.suggestion = suggestion;
        self
    }

    /// What the host should do with the call.
    #[must_use]
    pub fn decision(&self) -> CallDecision {
        if self.blocked {
            return CallDecision::Block(
                self.block_reason
                    .clone()
                    .unwrap_or_else(|| "blocked by tool validator".to_string()),
            );
        }
        match &self.repaired_arguments {
            Some(args) => CallDecision::ProceedWith(args.clone()),
            None => CallDecision::Proceed,
        }
    }
}

/// Host-side action derived from a verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum CallDecision {
    /// Execute with the original arguments
    Proceed,
    /// Execute with these arguments substituted
    ProceedWith(Map<String, Value>),
    /// Do not execute; surface the reason to the caller
    Block(String),
}

impl CallDecision {
    /// Returns `true` if the call must not run.
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(self, Self::Block(_))
    }
}
