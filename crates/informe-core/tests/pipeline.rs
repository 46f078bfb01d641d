// crates/informe-core/tests/pipeline.rs
// ============================================================================
// Module: Pipeline Tests
// Description: End-to-end plan assembly, strictness policy, and audit traces.
// Purpose: Pin the pipeline's stop conditions and replay-stable audit record.
// Dependencies: informe-core, serde_json
// ============================================================================

//! Behavior tests for the generation pipeline and audit-trace construction.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use informe_core::Condition;
use informe_core::Decision;
use informe_core::DecisionId;
use informe_core::FieldId;
use informe_core::PlanOptions;
use informe_core::PluginId;
use informe_core::Rule;
use informe_core::RuleAction;
use informe_core::RuleId;
use informe_core::RulePack;
use informe_core::Timestamp;
use informe_core::build_audit_trace;
use informe_core::build_plan;
use informe_core::fields::FieldDef;
use informe_core::fields::FieldType;
use informe_core::mask_sensitive_data;
use informe_core::preprocess_input;
use informe_core::runtime::pipeline::RenderPlan;
use serde_json::json;

/// Builds a pack with one visibility rule and one required field.
fn sample_pack() -> RulePack {
    let mut pack = RulePack::empty(PluginId::new("pt_review"));

    let rule_id = RuleId::new("RULE_S1_NO_ACCESS");
    let rule = Rule {
        rule_id: rule_id.clone(),
        name: Some("Master file access warning".to_string()),
        condition: Condition::from_value(
            &json!({"operator": "equals", "field": "master_file", "value": 0}),
        )
        .expect("test condition should parse"),
        action: RuleAction::IncludeText {
            text_key: "s1_master_file_no_access".into(),
        },
        for_each: None,
        source_block_ids: Vec::new(),
    };
    pack.rules.insert(rule_id.clone(), rule);
    pack.decisions.push(Decision {
        decision_id: DecisionId::new("DEC_S1"),
        name: Some("Section 1".to_string()),
        rules: vec![rule_id],
    });

    pack.fields.insert(
        FieldId::new("denominacion"),
        FieldDef {
            field_type: FieldType::Text,
            required: true,
            label: Some("Denominación social".to_string()),
            ..FieldDef::default()
        },
    );
    pack.sensitive_fields = vec![FieldId::new("denominacion")];
    pack
}

#[test]
fn preprocess_coerces_numeric_strings() {
    let raw = json!({
        "master_file": "1",
        "cifra_1": "1500000",
        "ebit_1": "225000,50",
        "descripcion": "texto libre 123",
    });
    let processed = preprocess_input(&raw);

    assert_eq!(processed.get("master_file"), Some(&json!(1)));
    assert_eq!(processed.get("cifra_1"), Some(&json!(1_500_000)));
    assert_eq!(processed.get("ebit_1"), Some(&json!(225_000.5)));
    // Fields outside the numeric list are untouched.
    assert_eq!(processed.get("descripcion"), Some(&json!("texto libre 123")));
}

#[test]
fn preprocess_normalizes_fiscal_dates() {
    let processed = preprocess_input(&json!({"fecha_fin_fiscal": "2025-3-5"}));
    assert_eq!(processed.get("fecha_fin_fiscal"), Some(&json!("2025-03-05")));

    let untouched = preprocess_input(&json!({"fecha_fin_fiscal": "no es fecha"}));
    assert_eq!(untouched.get("fecha_fin_fiscal"), Some(&json!("no es fecha")));
}

#[test]
fn strict_validation_stops_before_planning() {
    let pack = sample_pack();
    let outcome = build_plan(&pack, &json!({"master_file": 0}), &PlanOptions::default())
        .expect("pipeline should not abort");

    assert!(!outcome.succeeded());
    assert!(outcome.plan.is_none());
    let validation = outcome.validation.expect("validation must have run");
    assert!(!validation.is_valid());
    assert!(validation.errors()[0].contains("Denominación social"));
}

#[test]
fn lenient_runs_plan_despite_validation_errors() {
    let pack = sample_pack();
    let options = PlanOptions {
        validate: true,
        strict_validation: false,
    };
    let outcome = build_plan(&pack, &json!({"master_file": 0}), &options)
        .expect("pipeline should not abort");

    assert!(outcome.succeeded());
    let validation = outcome.validation.as_ref().expect("validation must have run");
    assert!(!validation.is_valid());
    let plan = outcome.plan.expect("plan must exist under lenient policy");
    assert!(plan.visibility.is_visible("text:s1_master_file_no_access"));
}

#[test]
fn valid_input_produces_a_full_plan() {
    let pack = sample_pack();
    // The numeric string is preprocessed before the rule sees it.
    let input = json!({"master_file": "0", "denominacion": "Acme SL"});
    let outcome =
        build_plan(&pack, &input, &PlanOptions::default()).expect("pipeline should not abort");

    let RenderPlan {
        context,
        visibility,
        traces,
    } = outcome.plan.expect("plan must exist");

    assert!(visibility.is_visible("text:s1_master_file_no_access"));
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].decision_id, DecisionId::new("DEC_S1"));
    assert_eq!(context.get("denominacion"), Some(&json!("Acme SL")));
}

#[test]
fn skipping_validation_leaves_no_result() {
    let pack = sample_pack();
    let options = PlanOptions {
        validate: false,
        strict_validation: true,
    };
    let outcome = build_plan(&pack, &json!({"master_file": 1}), &options)
        .expect("pipeline should not abort");
    assert!(outcome.validation.is_none());
    assert!(outcome.succeeded());
}

#[test]
fn audit_traces_are_replay_stable() {
    let pack = sample_pack();
    let input = json!({"master_file": 0, "denominacion": "Acme SL"});
    let outcome =
        build_plan(&pack, &input, &PlanOptions::default()).expect("pipeline should not abort");

    let timestamp = Timestamp::UnixMillis(1_735_689_600_000);
    let first = build_audit_trace(&pack, &input, &outcome, timestamp, Some(12))
        .expect("trace should build");
    let second = build_audit_trace(&pack, &input, &outcome, timestamp, Some(12))
        .expect("trace should build");

    // Same timestamp and input: identical trace id and digest.
    assert_eq!(first, second);
    assert_eq!(first.plugin_id, PluginId::new("pt_review"));
    assert_eq!(first.input_hash.algorithm, "sha256");
    assert_eq!(first.trace_id.as_str().len(), 32);

    // A different timestamp yields a different trace id over the same input.
    let other = build_audit_trace(
        &pack,
        &input,
        &outcome,
        Timestamp::UnixMillis(1_735_689_600_001),
        Some(12),
    )
    .expect("trace should build");
    assert_ne!(other.trace_id, first.trace_id);
    assert_eq!(other.input_hash, first.input_hash);
}

#[test]
fn audit_trace_records_validation_errors_and_masked_fields() {
    let pack = sample_pack();
    let input = json!({"master_file": 0});
    let outcome =
        build_plan(&pack, &input, &PlanOptions::default()).expect("pipeline should not abort");

    let trace = build_audit_trace(&pack, &input, &outcome, Timestamp::Logical(7), None)
        .expect("trace should build");

    assert_eq!(trace.validation_errors.len(), 1);
    assert!(trace.decision_traces.is_empty());
    assert_eq!(trace.masked_fields, vec![FieldId::new("denominacion")]);
}

#[test]
fn sensitive_fields_are_masked_for_previews() {
    let data = json!({"denominacion": "Acme SL", "cifra_1": 1500, "nif": "B1234567"});
    let masked = mask_sensitive_data(
        &data,
        &[FieldId::new("denominacion"), FieldId::new("nif"), FieldId::new("absent")],
    );

    assert_eq!(masked.get("denominacion"), Some(&json!("Ac*****")));
    assert_eq!(masked.get("nif"), Some(&json!("B1******")));
    // Non-sensitive values pass through untouched.
    assert_eq!(masked.get("cifra_1"), Some(&json!(1500)));
}

#[test]
fn short_sensitive_values_mask_completely() {
    let masked = mask_sensitive_data(&json!({"nif": "AB"}), &[FieldId::new("nif")]);
    assert_eq!(masked.get("nif"), Some(&json!("**")));
}
