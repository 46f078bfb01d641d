// crates/informe-core/tests/engine.rs
// ============================================================================
// Module: Rule Engine Tests
// Description: Dual-pass visibility computation and trace determinism.
// Purpose: Pin end-to-end rule semantics, absorption, and audit ordering.
// Dependencies: informe-core, serde_json
// ============================================================================

//! Behavior tests for the rule engine's visibility and trace outputs.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use informe_core::Condition;
use informe_core::Decision;
use informe_core::DecisionId;
use informe_core::PluginId;
use informe_core::Rule;
use informe_core::RuleAction;
use informe_core::RuleEngine;
use informe_core::RuleId;
use informe_core::RulePack;
use informe_core::TableKey;
use informe_core::TextKey;
use informe_core::fields::TableDef;
use informe_core::fields::TextBlockDef;
use informe_core::get_enabled_services;
use informe_core::runtime::EngineError;
use serde_json::Value;
use serde_json::json;

/// Builds a rule from a wire-form condition.
fn rule(rule_id: &str, condition: Value, action: RuleAction) -> Rule {
    Rule {
        rule_id: RuleId::new(rule_id),
        name: Some(format!("Rule {rule_id}")),
        condition: Condition::from_value(&condition).expect("test condition should parse"),
        action,
        for_each: None,
        source_block_ids: Vec::new(),
    }
}

/// Builds a pack with one decision referencing the given rules in order.
fn pack_with_rules(rules: Vec<Rule>) -> RulePack {
    let mut pack = RulePack::empty(PluginId::new("pt_review"));
    let rule_ids = rules.iter().map(|r| r.rule_id.clone()).collect();
    for entry in rules {
        pack.rules.insert(entry.rule_id.clone(), entry);
    }
    pack.decisions.push(Decision {
        decision_id: DecisionId::new("DEC_001"),
        name: Some("Primary decision".to_string()),
        rules: rule_ids,
    });
    pack
}

/// The master-file access pack used by the end-to-end scenarios.
fn master_file_pack() -> RulePack {
    pack_with_rules(vec![rule(
        "RULE_S1_NO_ACCESS",
        json!({"operator": "equals", "field": "master_file", "value": 0}),
        RuleAction::IncludeText {
            text_key: TextKey::new("s1_master_file_no_access"),
        },
    )])
}

#[test]
fn scenario_no_master_access_shows_warning_text() {
    let pack = master_file_pack();
    let engine = RuleEngine::new(&pack);
    let (visibility, traces) =
        engine.evaluate_all_rules(&json!({"master_file": 0})).expect("evaluation should succeed");

    assert_eq!(visibility.get("text:s1_master_file_no_access"), Some(true));
    assert!(visibility.is_visible("text:s1_master_file_no_access"));
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].rule_hits.len(), 1);
    assert!(traces[0].rule_hits[0].condition_met);
}

#[test]
fn scenario_master_access_leaves_warning_hidden() {
    let pack = master_file_pack();
    let engine = RuleEngine::new(&pack);
    let (visibility, traces) =
        engine.evaluate_all_rules(&json!({"master_file": 1})).expect("evaluation should succeed");

    // The key is untouched: absent from the map and not visible.
    assert_eq!(visibility.get("text:s1_master_file_no_access"), None);
    assert!(!visibility.is_visible("text:s1_master_file_no_access"));
    // The unmet rule is still recorded in the trace.
    assert_eq!(traces[0].rule_hits.len(), 1);
    assert!(!traces[0].rule_hits[0].condition_met);
}

#[test]
fn for_each_rules_are_existential() {
    let mut matching_rule = rule(
        "RULE_ANY_INTERCOMPANY",
        json!({"operator": "equals", "field": "servicio.intercompany", "value": true}),
        RuleAction::IncludeTable {
            table_key: TableKey::new("intercompany_detail"),
        },
    );
    matching_rule.for_each = Some("items".into());
    let pack = pack_with_rules(vec![matching_rule]);

    // Only the third of four items satisfies the condition.
    let data = json!({
        "items": [
            {"intercompany": false},
            {"intercompany": false},
            {"intercompany": true},
            {"intercompany": false},
        ]
    });
    let engine = RuleEngine::new(&pack);
    let (visibility, traces) = engine.evaluate_all_rules(&data).expect("evaluation should succeed");

    assert!(visibility.is_visible("table:intercompany_detail"));
    assert!(traces[0].rule_hits[0].condition_met);
}

#[test]
fn for_each_exposes_item_under_both_aliases() {
    let mut aliased = rule(
        "RULE_ITEM_ALIAS",
        json!({"operator": "equals", "field": "item.kind", "value": "svc"}),
        RuleAction::IncludeText {
            text_key: TextKey::new("alias_text"),
        },
    );
    aliased.for_each = Some("items".into());
    let pack = pack_with_rules(vec![aliased]);

    let data = json!({"items": [{"kind": "svc"}]});
    let engine = RuleEngine::new(&pack);
    let (visibility, _) = engine.evaluate_all_rules(&data).expect("evaluation should succeed");
    assert!(visibility.is_visible("text:alias_text"));
}

#[test]
fn for_each_absorbs_malformed_items() {
    let mut guarded = rule(
        "RULE_AMOUNT",
        json!({"operator": "gt", "field": "servicio.amount", "value": 10}),
        RuleAction::IncludeText {
            text_key: TextKey::new("amount_text"),
        },
    );
    guarded.for_each = Some("items".into());
    let pack = pack_with_rules(vec![guarded]);

    // The first item's amount is a string: its comparison errors and the
    // item counts as non-matching; the second item still matches.
    let data = json!({"items": [{"amount": "not-a-number"}, {"amount": 20}]});
    let engine = RuleEngine::new(&pack);
    let (visibility, _) = engine.evaluate_all_rules(&data).expect("evaluation should succeed");
    assert!(visibility.is_visible("text:amount_text"));
}

#[test]
fn recoverable_rule_errors_mean_unmet() {
    let pack = pack_with_rules(vec![rule(
        "RULE_MIXED_TYPES",
        json!({"operator": "gt", "field": "value", "value": 10}),
        RuleAction::IncludeText {
            text_key: TextKey::new("mixed_text"),
        },
    )]);

    let engine = RuleEngine::new(&pack);
    let (visibility, traces) = engine
        .evaluate_all_rules(&json!({"value": "not-a-number"}))
        .expect("recoverable errors must not abort evaluation");
    assert!(!visibility.is_visible("text:mixed_text"));
    assert!(!traces[0].rule_hits[0].condition_met);
}

#[test]
fn integrity_errors_abort_evaluation() {
    let mut too_deep = Condition::Equals {
        field: "x".to_string(),
        value: json!(1),
    };
    for _ in 0 .. 4 {
        too_deep = Condition::Not {
            condition: Box::new(too_deep),
        };
    }
    let corrupted = Rule {
        rule_id: RuleId::new("RULE_DEEP"),
        name: None,
        condition: too_deep,
        action: RuleAction::IncludeText {
            text_key: TextKey::new("deep_text"),
        },
        for_each: None,
        source_block_ids: Vec::new(),
    };
    let pack = pack_with_rules(vec![corrupted]);

    let engine = RuleEngine::new(&pack);
    let result = engine.evaluate_all_rules(&json!({"x": 1}));
    assert!(matches!(result, Err(EngineError::Integrity { .. })));
}

#[test]
fn unknown_rule_references_are_skipped() {
    let mut pack = master_file_pack();
    pack.decisions[0].rules.push(RuleId::new("RULE_NOT_DEFINED"));

    let engine = RuleEngine::new(&pack);
    let (_, traces) =
        engine.evaluate_all_rules(&json!({"master_file": 0})).expect("evaluation should succeed");
    // Only the defined rule produced a hit.
    assert_eq!(traces[0].rule_hits.len(), 1);
    assert_eq!(traces[0].rule_hits[0].rule_id, RuleId::new("RULE_S1_NO_ACCESS"));
}

#[test]
fn traces_follow_declared_order() {
    let first = rule(
        "RULE_B",
        json!({"operator": "exists", "field": "a"}),
        RuleAction::IncludeText {
            text_key: TextKey::new("b_text"),
        },
    );
    let second = rule(
        "RULE_A",
        json!({"operator": "exists", "field": "a"}),
        RuleAction::IncludeText {
            text_key: TextKey::new("a_text"),
        },
    );
    // Declared order is B then A; the trace must preserve it even though
    // the rule map sorts alphabetically.
    let pack = pack_with_rules(vec![first, second]);

    let engine = RuleEngine::new(&pack);
    let (_, traces) =
        engine.evaluate_all_rules(&json!({"a": 1})).expect("evaluation should succeed");
    let order: Vec<&str> =
        traces[0].rule_hits.iter().map(|hit| hit.rule_id.as_str()).collect();
    assert_eq!(order, vec!["RULE_B", "RULE_A"]);
}

#[test]
fn visibility_is_monotonic_across_rules() {
    let setter = rule(
        "RULE_SETS",
        json!({"operator": "exists", "field": "present"}),
        RuleAction::IncludeText {
            text_key: TextKey::new("shared_text"),
        },
    );
    let non_setter = rule(
        "RULE_UNMET",
        json!({"operator": "exists", "field": "absent"}),
        RuleAction::IncludeText {
            text_key: TextKey::new("shared_text"),
        },
    );
    let pack = pack_with_rules(vec![setter, non_setter]);

    let engine = RuleEngine::new(&pack);
    let (visibility, _) =
        engine.evaluate_all_rules(&json!({"present": 1})).expect("evaluation should succeed");
    assert!(visibility.is_visible("text:shared_text"));
}

#[test]
fn inline_conditions_override_rule_driven_visibility() {
    let mut pack = pack_with_rules(vec![rule(
        "RULE_SHOW_TABLE",
        json!({"operator": "exists", "field": "anything"}),
        RuleAction::IncludeTable {
            table_key: TableKey::new("financials"),
        },
    )]);
    pack.tables.insert(
        TableKey::new("financials"),
        TableDef {
            condition: Some("master_file == 1".to_string()),
            ..TableDef::default()
        },
    );

    // The rule marks the table visible, but the non-matching inline
    // condition overwrites it: the declarative override wins.
    let engine = RuleEngine::new(&pack);
    let (visibility, _) = engine
        .evaluate_all_rules(&json!({"anything": 1, "master_file": 0}))
        .expect("evaluation should succeed");
    assert_eq!(visibility.get("table:financials"), Some(false));
}

#[test]
fn unparseable_inline_conditions_fail_open() {
    let mut pack = RulePack::empty(PluginId::new("pt_review"));
    pack.texts.insert(
        TextKey::new("always_there"),
        TextBlockDef {
            condition: Some("this is not a condition".to_string()),
            ..TextBlockDef::default()
        },
    );

    let engine = RuleEngine::new(&pack);
    let (visibility, _) =
        engine.evaluate_all_rules(&json!({})).expect("evaluation should succeed");
    assert_eq!(visibility.get("text:always_there"), Some(true));
}

#[test]
fn evaluation_is_bit_stable_across_calls() {
    let mut pack = master_file_pack();
    pack.texts.insert(
        TextKey::new("conditional_text"),
        TextBlockDef {
            condition: Some("master_file == 0".to_string()),
            ..TextBlockDef::default()
        },
    );
    let data = json!({"master_file": 0});
    let engine = RuleEngine::new(&pack);

    let first = engine.evaluate_all_rules(&data).expect("evaluation should succeed");
    for _ in 0 .. 20 {
        let next = engine.evaluate_all_rules(&data).expect("evaluation should succeed");
        assert_eq!(next, first);
    }
}

#[test]
fn enabled_services_preserve_order() {
    let data = json!({
        "servicios_oovv": [
            {"enabled": true, "name": "A"},
            {"enabled": false, "name": "B"},
            {"enabled": true, "name": "C"},
        ]
    });
    let enabled = get_enabled_services(&data);
    let names: Vec<&str> =
        enabled.iter().filter_map(|item| item.get("name").and_then(Value::as_str)).collect();
    assert_eq!(names, vec!["A", "C"]);
}

#[test]
fn enabled_services_handle_missing_list() {
    assert!(get_enabled_services(&json!({})).is_empty());
}
