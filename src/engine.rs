//! Verdict assembly for tool calls.
//!
//! [`ToolValidator`] runs the checks for one invocation in a fixed order:
//!
//! ```text
//! START → DANGER_CHECK ─┬─ dangerous ──────────────────────────────▶ BLOCKED
//!                       └─ SCHEMA_CHECK ─┬─ valid ─────────────────▶ VALID
//!                                        └─ REPAIR_ATTEMPT ─┬─ ok ─▶ REPAIRED
//!                                                           └─ UNREPAIRED
//!                                            strict ? BLOCKED : PASS_WITH_ERRORS
//! ```
//!
//! The danger check always comes first and a dangerous call is never
//! repaired. Tool-name suggestions are computed after the danger check and
//! attached to the verdict, but the dispatched name is never rewritten.
//!
//! The validator owns its statistics and the known-tool registry; share it
//! as `Arc<ToolValidator>` between the before-call and after-call hooks.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::ValidatorConfig;
use crate::fuzzy::{FuzzyMatch, find_closest};
use crate::lenient_json::parse_lenient_str;
use crate::protocol::{ToolInvocation, ToolSuggestion, ValidationVerdict};
use crate::registry::KnownToolRegistry;
use crate::schema::{ParameterSchema, coerce_arguments, format_errors, validate_arguments};
use crate::security::DangerScanner;
use crate::stats::{StatsSnapshot, ValidatorStats};
use crate::{Error, Result};

/// Tool-call validation and repair engine.
#[derive(Debug)]
pub struct ToolValidator {
    config: ValidatorConfig,
    danger: DangerScanner,
    known_tools: KnownToolRegistry,
    stats: ValidatorStats,
}

impl ToolValidator {
    /// Build a validator from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a configured danger pattern does not compile.
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        let danger = DangerScanner::new(&config.extra_danger_rules)?;
        let known_tools = KnownToolRegistry::with_names(config.known_tools.iter().cloned());
        Ok(Self {
            config,
            danger,
            known_tools,
            stats: ValidatorStats::new(),
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate one invocation against an optional schema.
    ///
    /// Never fails: every outcome is represented in the returned verdict.
    pub fn validate(
        &self,
        invocation: &ToolInvocation,
        schema: Option<&ParameterSchema>,
    ) -> ValidationVerdict {
        if !self.config.enabled {
            return ValidationVerdict::pass();
        }
        self.stats.record_validated();
        let tool = invocation.name.as_str();

        let danger = self.danger.scan(tool, &invocation.arguments);
        if danger.dangerous {
            let reason = danger
                .reason
                .unwrap_or_else(|| "Dangerous tool call".to_string());
            if self.config.block_dangerous_calls {
                self.stats.record_blocked();
                warn!(tool = %tool, reason = %reason, "Blocked dangerous tool call");
                return ValidationVerdict::blocked(reason, Vec::new());
            }
            warn!(
                tool = %tool,
                reason = %reason,
                "Dangerous tool call allowed (blocking disabled)"
            );
        }

        let suggestion = self.suggest_for_unknown(tool);

        let Some(schema) = schema else {
            return ValidationVerdict::pass().with_suggestion(suggestion);
        };

        let violations = validate_arguments(&invocation.arguments, schema);
        if violations.is_empty() {
            return ValidationVerdict::pass().with_suggestion(suggestion);
        }
        self.stats.record_error();

        if let Some(repaired) = self.try_repair(tool, &invocation.arguments, schema) {
            self.stats.record_repaired();
            if self.config.log_validations {
                info!(
                    tool = %tool,
                    errors = %format_errors(&violations),
                    "Repaired tool call arguments"
                );
            }
            return ValidationVerdict::repaired(repaired).with_suggestion(suggestion);
        }

        let errors: Vec<String> = violations.iter().map(ToString::to_string).collect();

        if self.config.blocks_unrepaired() {
            self.stats.record_blocked();
            let reason = format!("Tool call validation failed: {}", format_errors(&violations));
            warn!(tool = %tool, reason = %reason, "Blocked invalid tool call");
            return ValidationVerdict::blocked(reason, errors).with_suggestion(suggestion);
        }

        if self.config.log_validations {
            info!(
                tool = %tool,
                errors = %format_errors(&violations),
                "Tool call failed validation; passing original arguments through"
            );
        }
        ValidationVerdict::pass_with_errors(errors).with_suggestion(suggestion)
    }

    /// Coerce and re-validate. Returns the repaired arguments only when
    /// something changed and the result passes validation.
    fn try_repair(
        &self,
        tool: &str,
        arguments: &Map<String, Value>,
        schema: &ParameterSchema,
    ) -> Option<Map<String, Value>> {
        if !self.config.repair_strategy.coerces() {
            debug!(
                tool = %tool,
                strategy = ?self.config.repair_strategy,
                "Repair strategy does not coerce; skipping repair"
            );
            return None;
        }

        let repair = coerce_arguments(arguments, schema);
        if !repair.changed() {
            debug!(tool = %tool, "No argument could be coerced");
            return None;
        }

        let remaining = validate_arguments(&repair.arguments, schema);
        if !remaining.is_empty() {
            debug!(
                tool = %tool,
                remaining = %format_errors(&remaining),
                "Coerced arguments still invalid; repair abandoned"
            );
            return None;
        }

        Some(repair.arguments)
    }

    fn suggest_for_unknown(&self, tool: &str) -> Option<ToolSuggestion> {
        if !self.config.fuzzy_match_tool_names
            || self.known_tools.is_empty()
            || self.known_tools.contains(tool)
        {
            return None;
        }

        let found = self.suggest_tool_name(tool);
        let name = found.matched?;
        if found.distance > self.config.max_fuzzy_distance {
            return None;
        }

        if self.config.log_validations {
            info!(
                tool = %tool,
                suggestion = %name,
                distance = found.distance,
                "Unknown tool name; closest known tool suggested (not applied)"
            );
        }
        Some(ToolSuggestion {
            name,
            distance: found.distance,
        })
    }

    /// Closest known tool name to `proposed`, ignoring the configured
    /// maximum distance.
    #[must_use]
    pub fn suggest_tool_name(&self, proposed: &str) -> FuzzyMatch {
        self.known_tools
            .with_names_ref(|names| find_closest(proposed, names.iter().map(String::as_str)))
    }

    /// Record a tool call that completed successfully.
    pub fn record_completed(&self, tool: &str) {
        if self.known_tools.insert(tool) {
            debug!(tool = %tool, "Recorded new known tool");
        }
    }

    /// Sorted list of known tool names.
    #[must_use]
    pub fn known_tools(&self) -> Vec<String> {
        self.known_tools.snapshot()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.known_tools.len())
    }

    /// Validate an ad-hoc call given as raw JSON text.
    ///
    /// Arguments and schema go through the lenient parser, so near-JSON is
    /// accepted. The call counts toward statistics like any other.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArguments` if the arguments are not (near-)JSON,
    /// are not an object, or the schema cannot be read.
    pub fn test_call(
        &self,
        tool: &str,
        raw_arguments: &str,
        raw_schema: Option<&str>,
    ) -> Result<ValidationVerdict> {
        let parsed = parse_lenient_str(raw_arguments)
            .into_parsed()
            .ok_or_else(|| Error::InvalidArguments("arguments are not valid JSON".to_string()))?;
        let invocation = ToolInvocation::from_value(tool, parsed).ok_or_else(|| {
            Error::InvalidArguments("arguments must be a JSON object".to_string())
        })?;

        let schema = raw_schema.map(parse_schema).transpose()?;
        Ok(self.validate(&invocation, schema.as_ref()))
    }
}

fn parse_schema(raw: &str) -> Result<ParameterSchema> {
    let value = parse_lenient_str(raw)
        .into_parsed()
        .ok_or_else(|| Error::InvalidArguments("schema is not valid JSON".to_string()))?;
    ParameterSchema::from_value(&value)
        .map_err(|e| Error::InvalidArguments(format!("invalid schema: {e}")))
}
