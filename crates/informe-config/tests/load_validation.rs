// crates/informe-config/tests/load_validation.rs
// ============================================================================
// Module: Pack Load Validation Tests
// Description: Validate pack loading guards (path, size, encoding).
// Purpose: Ensure pack input handling is strict and fail-closed.
// ============================================================================

//! Pack load validation tests for informe-config.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::fs;
use std::path::Path;

use informe_config::PackError;
use informe_config::load_pack;
use informe_core::RuleId;
use informe_core::RulePack;
use tempfile::tempdir;

use crate::common::write_minimal_pack;
use crate::common::write_pack_with_override;

type TestResult = Result<(), String>;

/// Asserts a load failure whose message contains the needle.
fn assert_invalid(result: Result<RulePack, PackError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid pack load".to_string()),
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(load_pack(path), "pack path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(load_pack(path), "pack path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_missing_directory() -> TestResult {
    assert_invalid(load_pack(Path::new("definitely/not/a/pack")), "pack directory not found")?;
    Ok(())
}

#[test]
fn load_rejects_missing_required_file() -> TestResult {
    let root = tempdir().map_err(|err| err.to_string())?;
    let dir = root.path().join("pt_review");
    write_minimal_pack(&dir);
    fs::remove_file(dir.join("logic.yaml")).map_err(|err| err.to_string())?;
    assert_invalid(load_pack(&dir), "required pack file missing: logic.yaml")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let root = tempdir().map_err(|err| err.to_string())?;
    let dir = root.path().join("pt_review");
    write_minimal_pack(&dir);
    let payload = vec![b'a'; 1_048_577];
    fs::write(dir.join("fields.yaml"), payload).map_err(|err| err.to_string())?;
    assert_invalid(load_pack(&dir), "pack file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let root = tempdir().map_err(|err| err.to_string())?;
    let dir = root.path().join("pt_review");
    write_minimal_pack(&dir);
    fs::write(dir.join("texts.yaml"), [0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(load_pack(&dir), "pack file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_disallowed_operator() -> TestResult {
    let root = tempdir().map_err(|err| err.to_string())?;
    let dir = root.path().join("pt_review");
    write_pack_with_override(
        &dir,
        "logic.yaml",
        concat!(
            "rules:\n",
            "  RULE_EVAL:\n",
            "    condition:\n",
            "      operator: eval\n",
            "      field: x\n",
            "      value: 1\n",
            "    action:\n",
            "      type: include_text\n",
            "      text_key: t\n",
        ),
    );
    assert_invalid(load_pack(&dir), "not in the allowlist")?;
    Ok(())
}

#[test]
fn load_builds_the_full_pack() -> TestResult {
    let root = tempdir().map_err(|err| err.to_string())?;
    let dir = root.path().join("pt_review");
    write_minimal_pack(&dir);

    let pack = load_pack(&dir).map_err(|err| err.to_string())?;
    if pack.plugin_id.as_str() != "pt_review" {
        return Err(format!("unexpected plugin id {}", pack.plugin_id));
    }

    let rule = pack
        .rule(&RuleId::new("RULE_S1_NO_ACCESS"))
        .ok_or_else(|| "rule should be loaded".to_string())?;
    // The map key backfills the inline rule id.
    if rule.rule_id != RuleId::new("RULE_S1_NO_ACCESS") {
        return Err("rule id should be backfilled from the map key".to_string());
    }

    if pack.decisions.len() != 1 || pack.decisions[0].rules.len() != 1 {
        return Err("decision map should load in declaration order".to_string());
    }
    if pack.fields.len() != 4 {
        return Err(format!("expected 4 fields, got {}", pack.fields.len()));
    }
    if pack.formatting.currency_fields.len() != 1 {
        return Err("formatting lists should load".to_string());
    }
    if pack.sensitive_fields.len() != 1 {
        return Err("sensitive fields should load".to_string());
    }
    Ok(())
}

#[test]
fn empty_optional_sections_default_cleanly() -> TestResult {
    let root = tempdir().map_err(|err| err.to_string())?;
    let dir = root.path().join("pt_review");
    write_minimal_pack(&dir);
    fs::write(dir.join("tables.yaml"), "").map_err(|err| err.to_string())?;
    fs::write(dir.join("derived.yaml"), "\n").map_err(|err| err.to_string())?;

    let pack = load_pack(&dir).map_err(|err| err.to_string())?;
    if !pack.tables.is_empty() || !pack.derived.is_empty() {
        return Err("empty files should default to empty sections".to_string());
    }
    Ok(())
}
