// crates/informe-core/examples/minimal.rs
// ============================================================================
// Module: Informe Minimal Example
// Description: Minimal end-to-end plan build over an inline pack.
// Purpose: Demonstrate rule evaluation, visibility, and audit traces.
// Dependencies: informe-core
// ============================================================================

//! ## Overview
//! Builds a one-rule pack in memory, evaluates it against sample data, and
//! prints the resulting visibility map and audit trace as JSON. No files or
//! external services are involved.

use std::io::Write;

use informe_core::Condition;
use informe_core::Decision;
use informe_core::DecisionId;
use informe_core::PlanOptions;
use informe_core::PluginId;
use informe_core::Rule;
use informe_core::RuleAction;
use informe_core::RuleId;
use informe_core::RulePack;
use informe_core::Timestamp;
use informe_core::build_audit_trace;
use informe_core::build_plan;
use serde_json::json;

/// Runs the minimal example.
///
/// # Errors
///
/// Returns an error when condition parsing, planning, or serialization
/// fails (none of which happens with this fixed input).
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rule_id = RuleId::new("RULE_S1_NO_ACCESS");
    let rule = Rule {
        rule_id: rule_id.clone(),
        name: Some("Master file access warning".to_string()),
        condition: Condition::from_value(
            &json!({"operator": "equals", "field": "master_file", "value": 0}),
        )?,
        action: RuleAction::IncludeText {
            text_key: "s1_master_file_no_access".into(),
        },
        for_each: None,
        source_block_ids: Vec::new(),
    };

    let mut pack = RulePack::empty(PluginId::new("minimal"));
    pack.rules.insert(rule_id.clone(), rule);
    pack.decisions.push(Decision {
        decision_id: DecisionId::new("DEC_S1"),
        name: Some("Section 1 access".to_string()),
        rules: vec![rule_id],
    });

    let input = json!({"master_file": 0});
    let options = PlanOptions {
        validate: true,
        strict_validation: false,
    };
    let outcome = build_plan(&pack, &input, &options)?;
    let trace =
        build_audit_trace(&pack, &input, &outcome, Timestamp::UnixMillis(1_735_689_600_000), None)?;

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", serde_json::to_string_pretty(&outcome)?)?;
    writeln!(stdout, "{}", serde_json::to_string_pretty(&trace)?)?;
    Ok(())
}
