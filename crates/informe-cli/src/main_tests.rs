// crates/informe-cli/src/main_tests.rs
// ============================================================================
// Module: Informe CLI Argument Tests
// Description: Unit tests for CLI argument parsing.
// Purpose: Keep command shapes stable for scripts and CI callers.
// ============================================================================

//! Argument-parsing tests for the Informe CLI.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use clap::Parser;

use crate::Cli;
use crate::Commands;

#[test]
fn parses_packs_command() {
    let cli = Cli::try_parse_from(["informe", "packs", "--root", "config/packs"])
        .expect("packs command should parse");
    match cli.command {
        Commands::Packs(command) => {
            assert_eq!(command.root.to_string_lossy(), "config/packs");
        }
        Commands::Check(_) | Commands::Plan(_) => panic!("expected packs command"),
    }
}

#[test]
fn parses_check_command() {
    let cli = Cli::try_parse_from([
        "informe",
        "check",
        "--pack",
        "config/packs/pt_review",
        "--input",
        "input.json",
    ])
    .expect("check command should parse");
    match cli.command {
        Commands::Check(command) => {
            assert_eq!(command.pack.to_string_lossy(), "config/packs/pt_review");
            assert_eq!(command.input.to_string_lossy(), "input.json");
        }
        Commands::Packs(_) | Commands::Plan(_) => panic!("expected check command"),
    }
}

#[test]
fn parses_plan_command_with_flags() {
    let cli = Cli::try_parse_from([
        "informe",
        "plan",
        "--pack",
        "config/packs/pt_review",
        "--input",
        "input.json",
        "--output",
        "plan.json",
        "--trace",
        "trace.json",
        "--lenient",
    ])
    .expect("plan command should parse");
    match cli.command {
        Commands::Plan(command) => {
            assert!(command.lenient);
            assert!(!command.skip_validation);
            assert_eq!(command.output.as_deref().map(|p| p.to_string_lossy().into_owned()),
                Some("plan.json".to_string()));
            assert_eq!(command.trace.as_deref().map(|p| p.to_string_lossy().into_owned()),
                Some("trace.json".to_string()));
        }
        Commands::Packs(_) | Commands::Check(_) => panic!("expected plan command"),
    }
}

#[test]
fn rejects_plan_without_input() {
    let result = Cli::try_parse_from(["informe", "plan", "--pack", "config/packs/pt_review"]);
    assert!(result.is_err());
}
