//! Tool-call validation and repair.
//!
//! Sits in an agent host's tool-call pipeline and decides, for every call a
//! model proposes, whether it runs unchanged, runs with repaired arguments,
//! or is blocked.
//!
//! # Features
//!
//! - **Danger scanning**: shell chaining, pipe-to-shell, path traversal and
//!   SQL injection patterns block the call before anything else runs
//! - **Schema validation**: required parameters and declared primitive types
//! - **Verified repair**: type coercion toward the schema, trusted only if
//!   the coerced arguments validate
//! - **Lenient JSON**: near-JSON from weaker models (bare keys, single
//!   quotes, trailing commas)
//! - **Tool-name suggestions**: edit-distance matching against tools seen
//!   completing, advisory only
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tool_validator::{ToolInvocation, ToolValidator, config::ValidatorConfig};
//! use tool_validator::schema::{ParameterSchema, PrimitiveType};
//!
//! let validator = ToolValidator::new(ValidatorConfig::default()).unwrap();
//! let schema = ParameterSchema::new()
//!     .property("count", PrimitiveType::Number)
//!     .require("count");
//! let call = ToolInvocation::from_value("counter", json!({ "count": "5" })).unwrap();
//!
//! let verdict = validator.validate(&call, Some(&schema));
//! assert!(verdict.valid);
//! assert_eq!(verdict.repaired_arguments.unwrap()["count"], json!(5));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod hooks;
pub mod lenient_json;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod security;
pub mod stats;

pub use engine::ToolValidator;
pub use error::{Error, Result};
pub use protocol::{CallDecision, ToolInvocation, ToolSuggestion, ValidationVerdict};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
///
/// Logs go to stderr so that command output on stdout stays parseable.
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = match format {
        Some("json") => subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| Error::Internal(format!("Failed to install tracing subscriber: {e}")))
}
