// crates/informe-cli/src/main.rs
// ============================================================================
// Module: Informe CLI Entry Point
// Description: Command dispatcher for pack validation and plan generation.
// Purpose: Provide a safe command-line front end over the Informe core.
// Dependencies: clap, informe-config, informe-core, serde_json
// ============================================================================

//! ## Overview
//! The Informe CLI shuttles JSON between the filesystem and the core: it
//! lists and validates packs, checks input data against a pack's contract,
//! and runs the full pipeline to emit a render plan plus its audit trace.
//! The core itself never touches the clock or the disk; this binary is the
//! host that supplies timestamps and persists outputs.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Parser;
use clap::Subcommand;
use informe_config::MANIFEST_FILE;
use informe_config::PackError;
use informe_config::PackStore;
use informe_config::load_pack;
use informe_config::validate_pack;
use informe_core::PlanError;
use informe_core::PlanOptions;
use informe_core::TraceError;
use informe_core::Timestamp;
use informe_core::build_audit_trace;
use informe_core::build_plan;
use informe_core::validate_input;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum input data file size in bytes.
const MAX_INPUT_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "informe", version, about = "Rule-driven compliance report planning")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List packs under a root directory with their validation status.
    Packs(PacksCommand),
    /// Validate input data against a pack's contract.
    Check(CheckCommand),
    /// Run the full pipeline and emit the render plan and audit trace.
    Plan(PlanCommand),
}

/// Arguments for the `packs` command.
#[derive(clap::Args, Debug)]
struct PacksCommand {
    /// Root directory containing pack subdirectories.
    #[arg(long)]
    root: PathBuf,
}

/// Arguments for the `check` command.
#[derive(clap::Args, Debug)]
struct CheckCommand {
    /// Pack directory.
    #[arg(long)]
    pack: PathBuf,
    /// Input data JSON file.
    #[arg(long)]
    input: PathBuf,
}

/// Arguments for the `plan` command.
#[derive(clap::Args, Debug)]
struct PlanCommand {
    /// Pack directory.
    #[arg(long)]
    pack: PathBuf,
    /// Input data JSON file.
    #[arg(long)]
    input: PathBuf,
    /// Write the render plan to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the audit trace to this file.
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Proceed to planning even when validation reports errors.
    #[arg(long)]
    lenient: bool,
    /// Skip contract validation entirely.
    #[arg(long)]
    skip_validation: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
enum CliError {
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(String),
    /// Input data was not valid JSON.
    #[error("invalid input json: {0}")]
    InputParse(String),
    /// Pack loading failure.
    #[error(transparent)]
    Pack(#[from] PackError),
    /// Pipeline abort (DSL integrity).
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// Audit trace construction failure.
    #[error(transparent)]
    Trace(#[from] TraceError),
    /// Output serialization failure.
    #[error("failed to serialize output: {0}")]
    Serialize(String),
}

/// Result alias for CLI command handlers.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&format!("error: {err}"));
            ExitCode::FAILURE
        }
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Packs(command) => command_packs(&command),
        Commands::Check(command) => command_check(&command),
        Commands::Plan(command) => command_plan(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Lists packs under a root with their static-validation reports.
///
/// Validation runs per directory so one broken pack cannot hide the rest;
/// the load-once store is opened only when every report is clean.
fn command_packs(command: &PacksCommand) -> CliResult<ExitCode> {
    let mut pack_dirs = Vec::new();
    let entries = fs::read_dir(&command.root).map_err(|err| CliError::Io(err.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|err| CliError::Io(err.to_string()))?;
        let path = entry.path();
        if path.is_dir() && path.join(MANIFEST_FILE).is_file() {
            pack_dirs.push(path);
        }
    }
    pack_dirs.sort();

    let reports: Vec<_> = pack_dirs.iter().map(|dir| validate_pack(dir)).collect();
    let all_valid = reports.iter().all(|report| report.is_valid);

    let loaded = if all_valid { PackStore::open(&command.root)?.len() } else { 0 };
    write_json_line(&serde_json::json!({ "packs": reports, "loaded": loaded }))?;
    Ok(if all_valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Validates input data against a pack contract.
fn command_check(command: &CheckCommand) -> CliResult<ExitCode> {
    let pack = load_pack(&command.pack)?;
    let input = read_input_json(&command.input)?;
    let data = informe_core::preprocess_input(&input);

    let result = validate_input(&pack, &data);
    let is_valid = result.is_valid();
    write_json_line(&result)?;
    Ok(if is_valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Runs the full pipeline and persists its outputs.
fn command_plan(command: &PlanCommand) -> CliResult<ExitCode> {
    let pack = load_pack(&command.pack)?;
    let input = read_input_json(&command.input)?;

    let options = PlanOptions {
        validate: !command.skip_validation,
        strict_validation: !command.lenient,
    };

    let started = Instant::now();
    let outcome = build_plan(&pack, &input, &options)?;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).ok();

    let trace = build_audit_trace(&pack, &input, &outcome, now_timestamp(), duration_ms)?;
    if let Some(trace_path) = &command.trace {
        write_json_file(trace_path, &trace)?;
    }

    let succeeded = outcome.succeeded();
    match &command.output {
        Some(output_path) => write_json_file(output_path, &outcome)?,
        None => write_json_line(&outcome)?,
    }

    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads an input JSON file with a size guard.
fn read_input_json(path: &Path) -> CliResult<Value> {
    let bytes = fs::read(path).map_err(|err| CliError::Io(err.to_string()))?;
    if bytes.len() > MAX_INPUT_BYTES {
        return Err(CliError::InputParse("input file exceeds size limit".to_string()));
    }
    serde_json::from_slice(&bytes).map_err(|err| CliError::InputParse(err.to_string()))
}

/// Returns the host wall-clock time as a core timestamp.
fn now_timestamp() -> Timestamp {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
    Timestamp::UnixMillis(millis)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Writes a value as pretty JSON to stdout.
fn write_json_line<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Serialize(err.to_string()))?;
    write_stdout_line(&rendered).map_err(|err| CliError::Io(err.to_string()))
}

/// Writes a value as pretty JSON to a file.
fn write_json_file<T: serde::Serialize>(path: &Path, value: &T) -> CliResult<()> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Serialize(err.to_string()))?;
    fs::write(path, rendered).map_err(|err| CliError::Io(err.to_string()))
}
