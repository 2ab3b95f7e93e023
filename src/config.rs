//! Configuration management

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::security::DangerRuleConfig;
use crate::{Error, Result};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "TOOL_VALIDATOR_";

/// How schema failures are repaired.
///
/// Only `coerce` repairs anything. The other strategies are accepted so
/// that configurations written for other hosts load, but they never
/// repair: an unrepaired failure then follows the strict/pass-through rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairStrategy {
    /// Coerce argument values toward their declared types
    #[default]
    Coerce,
    /// Host default; no repair
    Default,
    /// Ask the model to retry; no repair
    Prompt,
    /// Refuse to repair
    Block,
}

impl RepairStrategy {
    /// Whether this strategy attempts coercion.
    #[must_use]
    pub fn coerces(self) -> bool {
        matches!(self, Self::Coerce)
    }
}

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Run validation at all
    pub enabled: bool,
    /// Repair strategy for schema failures
    pub repair_strategy: RepairStrategy,
    /// Block calls whose schema failure could not be repaired
    pub block_on_validation_failure: bool,
    /// Block calls matching a danger pattern (otherwise only logged)
    pub block_dangerous_calls: bool,
    /// Suggest known tool names for unknown ones
    pub fuzzy_match_tool_names: bool,
    /// Largest edit distance a suggestion may have
    pub max_fuzzy_distance: usize,
    /// Log repairs and suggestions at info level
    pub log_validations: bool,
    /// Block any unrepaired schema failure
    pub strict_mode: bool,
    /// Tool names known before any call completes
    pub known_tools: Vec<String>,
    /// Danger rules appended to the built-in table
    pub extra_danger_rules: Vec<DangerRuleConfig>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repair_strategy: RepairStrategy::Coerce,
            block_on_validation_failure: false,
            block_dangerous_calls: true,
            fuzzy_match_tool_names: true,
            max_fuzzy_distance: 2,
            log_validations: true,
            strict_mode: false,
            known_tools: Vec::new(),
            extra_danger_rules: Vec::new(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from defaults, an optional YAML file, and
    /// `TOOL_VALIDATOR_*` environment variables, in that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Whether an unrepaired schema failure blocks the call.
    #[must_use]
    pub fn blocks_unrepaired(&self) -> bool {
        self.strict_mode || self.block_on_validation_failure
    }
}
