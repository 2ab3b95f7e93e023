//! Tool Validator - command-line front end
//!
//! Validates single tool calls or replays recorded ones through the hook
//! pipeline.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use tool_validator::{
    CallDecision, ToolInvocation, ToolValidator,
    cli::{Cli, Command},
    config::ValidatorConfig,
    hooks::{HookPipeline, STATS_TOOL_NAME, ToolCallEvent, ToolResultEvent, register},
    setup_tracing,
};

/// Exit code for a blocked verdict.
const EXIT_BLOCKED: u8 = 1;
/// Exit code for malformed input.
const EXIT_INVALID_INPUT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match ValidatorConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Check {
            tool,
            args,
            schema,
            known,
        } => run_check(config, &tool, &args, schema.as_deref(), known),
        Command::Replay { file } => run_replay(config, &file).await,
        Command::Config => print_config(&config),
    }
}

/// Validate one call and print the verdict
fn run_check(
    mut config: ValidatorConfig,
    tool: &str,
    args: &str,
    schema: Option<&str>,
    known: Vec<String>,
) -> ExitCode {
    config.known_tools.extend(known);
    let validator = match ToolValidator::new(config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    let verdict = match validator.test_call(tool, args, schema) {
        Ok(verdict) => verdict,
        Err(e) if e.is_input_error() => {
            eprintln!("❌ {e}");
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        Err(e) => {
            eprintln!("❌ Validation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&verdict) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("❌ Failed to serialize verdict: {e}");
            return ExitCode::FAILURE;
        }
    }

    if verdict.blocked {
        ExitCode::from(EXIT_BLOCKED)
    } else {
        ExitCode::SUCCESS
    }
}

/// One recorded tool call in a replay file
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    name: String,
    #[serde(default)]
    arguments: Value,
    #[serde(default)]
    schema: Option<Value>,
    /// Failure reported by the tool when it ran; absent means success
    #[serde(default)]
    error: Option<String>,
}

fn decision_json(decision: &CallDecision) -> Value {
    match decision {
        CallDecision::Proceed => json!({ "action": "proceed" }),
        CallDecision::ProceedWith(arguments) => {
            json!({ "action": "proceed_with", "arguments": arguments })
        }
        CallDecision::Block(reason) => json!({ "action": "block", "reason": reason }),
    }
}

async fn read_replay_file(file: &Path) -> tool_validator::Result<String> {
    Ok(tokio::fs::read_to_string(file).await?)
}

/// Replay recorded calls through a pipeline with the validator registered
async fn run_replay(config: ValidatorConfig, file: &Path) -> ExitCode {
    let validator = match ToolValidator::new(config) {
        Ok(v) => Arc::new(v),
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut pipeline = HookPipeline::new();
    register(&mut pipeline, &validator);

    let content = match read_replay_file(file).await {
        Ok(content) => content,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {e}", file.display());
            return ExitCode::FAILURE;
        }
    };

    let mut malformed = 0usize;
    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: ReplayRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed replay record");
                malformed += 1;
                continue;
            }
        };
        let Some(invocation) = ToolInvocation::from_value(&record.name, record.arguments) else {
            warn!(line = line_no, tool = %record.name, "Skipping record with non-object arguments");
            malformed += 1;
            continue;
        };

        let mut event = ToolCallEvent::new(invocation);
        if let Some(schema) = record.schema {
            event = event.with_schema(schema);
        }

        let decision = pipeline.before_tool_call(event).await;
        println!(
            "{}",
            json!({ "line": line_no, "tool": record.name, "decision": decision_json(&decision) })
        );

        if !decision.is_block() {
            let result = match record.error {
                Some(error) => ToolResultEvent::failure(&record.name, error),
                None => ToolResultEvent::success(&record.name),
            };
            pipeline.after_tool_call(&result).await;
        }
    }

    match pipeline.call_tool(STATS_TOOL_NAME, Value::Null).await {
        Ok(stats) => println!("{stats}"),
        Err(e) => {
            eprintln!("❌ Failed to read statistics: {e}");
            return ExitCode::FAILURE;
        }
    }

    if malformed > 0 {
        info!(malformed, "Replay finished with skipped records");
        return ExitCode::from(EXIT_INVALID_INPUT);
    }
    ExitCode::SUCCESS
}

/// Print the effective configuration
fn print_config(config: &ValidatorConfig) -> ExitCode {
    match serde_yaml::to_string(config) {
        Ok(yaml) => {
            print!("{yaml}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Failed to serialize configuration: {e}");
            ExitCode::FAILURE
        }
    }
}
