//! Dangerous-argument scanner.
//!
//! Rejects tool calls whose string arguments match known-destructive
//! patterns: shell chaining into destructive commands, pipe-to-shell
//! execution, parent-directory traversal and SQL injection idioms.
//!
//! Rules are data. Each rule names a tool filter, an argument key and a
//! list of regular expressions; adding a pattern never adds a branch.
//! Scanning stops at the first hit.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Tool-name filter meaning "any tool" in configured rules.
pub const ANY_TOOL: &str = "*";

/// Shell chaining toward destructive commands, and pipe-to-shell execution.
///
/// The program may be preceded by `sudo` (with flags), an `env` wrapper
/// (with flags or assignments) and a directory prefix such as `/bin/`.
const COMMAND_PATTERNS: &[&str] = &[
    r"(?i)(;|&&|\|\||\$\(|`)\s*(sudo(\s+-\S+)*\s+)?((\S*/)?env(\s+(-\S+|\w+=\S*))*\s+)?(\S*/)?(rm\s+(-\S+\s+)*(-[a-z]*[rf]|--(recursive|force))|mkfs(\.\w+)?\b|dd\s+if=|shutdown\b|reboot\b)",
    r"(?i)\|\s*(sudo(\s+-\S+)*\s+)?((\S*/)?env(\s+(-\S+|\w+=\S*))*\s+)?(\S*/)?(ba|z|da|k|c|tc)?sh\b",
];

/// Parent-directory traversal, plain or URL-encoded.
const TRAVERSAL_PATTERNS: &[&str] = &[r"\.\.[/\\]", r"(?i)%2e%2e(%2f|%5c|/|\\)"];

/// Statement termination before a destructive statement, and tautologies.
const SQL_PATTERNS: &[&str] = &[
    r"(?i);\s*(drop|delete|truncate|alter|update|insert)\b",
    r"(?i)'\s*(or|and)\s+'?\w+'?\s*=\s*'?\w+",
    r"(?i)\bor\s+1\s*=\s*1\b",
];

/// A rule as written in the built-in table.
struct BuiltinRule {
    /// `None` matches every tool.
    tool: Option<&'static str>,
    field: &'static str,
    patterns: &'static [&'static str],
}

const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        tool: None,
        field: "command",
        patterns: COMMAND_PATTERNS,
    },
    BuiltinRule {
        tool: None,
        field: "path",
        patterns: TRAVERSAL_PATTERNS,
    },
    BuiltinRule {
        tool: None,
        field: "file",
        patterns: TRAVERSAL_PATTERNS,
    },
    BuiltinRule {
        tool: None,
        field: "query",
        patterns: SQL_PATTERNS,
    },
];

/// Additional danger rule supplied through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DangerRuleConfig {
    /// Tool name this rule applies to, or `"*"` for every tool.
    #[serde(default = "default_rule_tool")]
    pub tool: String,
    /// Argument key whose string value is scanned.
    pub field: String,
    /// Regular expressions; any match flags the call.
    pub patterns: Vec<String>,
}

fn default_rule_tool() -> String {
    ANY_TOOL.to_string()
}

/// Which tools a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolMatch {
    /// Every tool
    Any,
    /// One tool, by exact name
    Named(String),
}

impl ToolMatch {
    fn from_config(tool: &str) -> Self {
        if tool == ANY_TOOL || tool.is_empty() {
            Self::Any
        } else {
            Self::Named(tool.to_string())
        }
    }

    fn matches(&self, tool: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Named(name) => name == tool,
        }
    }
}

/// Result of scanning one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DangerCheck {
    /// A pattern matched
    pub dangerous: bool,
    /// Field and pattern that matched
    pub reason: Option<String>,
}

impl DangerCheck {
    fn safe() -> Self {
        Self::default()
    }

    fn hit(field: &str, pattern: &Regex) -> Self {
        Self {
            dangerous: true,
            reason: Some(format!(
                "Dangerous pattern in '{field}': matches {}",
                pattern.as_str()
            )),
        }
    }
}

/// Compiled rule ready for matching.
#[derive(Debug)]
struct CompiledRule {
    tool: ToolMatch,
    field: String,
    patterns: Vec<Regex>,
}

impl CompiledRule {
    fn compile<'a>(
        tool: ToolMatch,
        field: &str,
        patterns: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    Error::Config(format!("Invalid danger pattern for '{field}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            tool,
            field: field.to_string(),
            patterns,
        })
    }
}

/// Compiled danger rule table.
#[derive(Debug)]
pub struct DangerScanner {
    rules: Vec<CompiledRule>,
}

impl DangerScanner {
    /// Compile the built-in rules followed by `extra` configured rules.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a configured pattern is not a valid regex.
    pub fn new(extra: &[DangerRuleConfig]) -> Result<Self> {
        let mut rules = Vec::with_capacity(BUILTIN_RULES.len() + extra.len());

        for rule in BUILTIN_RULES {
            let tool = rule
                .tool
                .map_or(ToolMatch::Any, |name| ToolMatch::Named(name.to_string()));
            rules.push(CompiledRule::compile(
                tool,
                rule.field,
                rule.patterns.iter().copied(),
            )?);
        }

        for rule in extra {
            rules.push(CompiledRule::compile(
                ToolMatch::from_config(&rule.tool),
                &rule.field,
                rule.patterns.iter().map(String::as_str),
            )?);
        }

        Ok(Self { rules })
    }

    /// Number of compiled rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Scan `arguments` of a call to `tool`.
    ///
    /// Only string values are inspected. The first matching rule and
    /// pattern is reported.
    #[must_use]
    pub fn scan(&self, tool: &str, arguments: &Map<String, Value>) -> DangerCheck {
        for rule in self.rules.iter().filter(|r| r.tool.matches(tool)) {
            let Some(Value::String(text)) = arguments.get(&rule.field) else {
                continue;
            };
            if let Some(pattern) = rule.patterns.iter().find(|p| p.is_match(text)) {
                return DangerCheck::hit(&rule.field, pattern);
            }
        }
        DangerCheck::safe()
    }
}

impl Default for DangerScanner {
    fn default() -> Self {
        Self::new(&[]).expect("built-in danger patterns compile")
    }
}
