// crates/informe-core/src/runtime/engine.rs
// ============================================================================
// Module: Informe Rule Engine
// Description: Dual-pass rule evaluation into a visibility map plus traces.
// Purpose: Compute document visibility deterministically with full audit coverage.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! The rule engine walks a pack's decisions in declared order, evaluates
//! every referenced rule, and accumulates visibility effects and audit
//! traces. Recoverable condition errors (bad operand shapes, malformed list
//! items) are absorbed as "not matched" so one bad rule never aborts a
//! document; DSL-integrity errors (disallowed operator, nesting past the
//! bound) abort the request instead, since they signal a corrupted pack, not a
//! data problem.
//!
//! After the rule-driven pass, text blocks and tables carrying inline
//! simple conditions are evaluated and overwrite their visibility keys.
//! The declarative override wins over rule-driven visibility; this is a
//! preserved product behavior, not an accident of iteration order here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::condition::ConditionError;
use crate::core::condition::evaluate_simple_condition;
use crate::core::condition::resolve_path;
use crate::core::identifiers::FieldId;
use crate::core::identifiers::RuleId;
use crate::core::pack::RulePack;
use crate::core::rules::EvaluationTrace;
use crate::core::rules::Rule;
use crate::core::rules::RuleAction;
use crate::core::rules::RuleHit;
use crate::core::rules::VisibilityMap;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Context key exposing the current `for_each` item under its domain alias.
pub const SERVICE_ALIAS: &str = "servicio";
/// Context key exposing the current `for_each` item generically.
pub const ITEM_ALIAS: &str = "item";
/// Input field holding the orderable-services list.
pub const ENABLED_SERVICES_FIELD: &str = "servicios_oovv";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that abort rule evaluation.
///
/// # Invariants
/// - Only DSL-integrity failures surface here; recoverable per-rule and
///   per-item errors are absorbed as "not matched".
#[derive(Debug, Error)]
pub enum EngineError {
    /// A rule's condition violates DSL integrity (allowlist or depth).
    #[error("rule '{rule_id}' has a corrupted condition: {source}")]
    Integrity {
        /// Rule whose condition is corrupted.
        rule_id: RuleId,
        /// Underlying DSL error.
        #[source]
        source: ConditionError,
    },
}

// ============================================================================
// SECTION: Rule Engine
// ============================================================================

/// Evaluates a pack's rules against request data.
///
/// The engine borrows an immutable pack and holds no other state; it can be
/// shared freely across concurrent generation requests.
pub struct RuleEngine<'pack> {
    /// Pack supplying rules, decisions, and inline-conditioned blocks.
    pack: &'pack RulePack,
}

impl<'pack> RuleEngine<'pack> {
    /// Creates an engine over a loaded pack.
    #[must_use]
    pub const fn new(pack: &'pack RulePack) -> Self {
        Self {
            pack,
        }
    }

    /// Evaluates all decisions and rules against the input data.
    ///
    /// Returns the visibility map and one [`EvaluationTrace`] per decision,
    /// both in deterministic order. Every evaluated rule is recorded in its
    /// decision's trace whether or not it was met; rule ids with no pack
    /// definition are silently skipped to support partially authored packs.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Integrity`] when a rule's condition is
    /// corrupted (disallowed operator or nesting past the bound). All other
    /// evaluation failures are absorbed as "not matched".
    pub fn evaluate_all_rules(
        &self,
        data: &Value,
    ) -> Result<(VisibilityMap, Vec<EvaluationTrace>), EngineError> {
        let mut visibility = VisibilityMap::new();
        let mut traces = Vec::with_capacity(self.pack.decisions.len());

        for decision in &self.pack.decisions {
            let mut trace =
                EvaluationTrace::new(decision.decision_id.clone(), decision.display_name());

            for rule_id in &decision.rules {
                let Some(rule) = self.pack.rule(rule_id) else {
                    continue;
                };

                let hit = evaluate_rule(rule, data)?;
                if hit.condition_met {
                    apply_action(&mut visibility, &rule.action);
                }
                trace.rule_hits.push(hit);
            }

            traces.push(trace);
        }

        self.apply_inline_conditions(&mut visibility, data);

        Ok((visibility, traces))
    }

    /// Overwrites visibility for blocks carrying inline conditions.
    ///
    /// This pass runs after the rule-driven pass and takes precedence over
    /// it; an unparseable inline condition leaves the block visible.
    fn apply_inline_conditions(&self, visibility: &mut VisibilityMap, data: &Value) {
        for (text_key, text_def) in &self.pack.texts {
            if let Some(condition) = &text_def.condition {
                visibility.set_text(text_key, evaluate_simple_condition(condition, data));
            }
        }

        for (table_key, table_def) in &self.pack.tables {
            if let Some(condition) = &table_def.condition {
                visibility.set_table(table_key, evaluate_simple_condition(condition, data));
            }
        }
    }
}

// ============================================================================
// SECTION: Rule Evaluation
// ============================================================================

/// Evaluates one rule into its immutable hit record.
fn evaluate_rule(rule: &Rule, data: &Value) -> Result<RuleHit, EngineError> {
    let condition_met = match &rule.for_each {
        Some(list_field) => any_item_matches(rule, list_field, data)?,
        None => match rule.condition.evaluate(data, 0) {
            Ok(met) => met,
            Err(err) if err.is_integrity() => {
                return Err(EngineError::Integrity {
                    rule_id: rule.rule_id.clone(),
                    source: err,
                });
            }
            Err(_) => false,
        },
    };

    Ok(RuleHit {
        rule_id: rule.rule_id.clone(),
        rule_name: rule.display_name().to_string(),
        condition_met,
        action_type: rule.action.kind().to_string(),
        affected_elements: rule.action.affected_elements(),
        source_block_ids: rule.source_block_ids.clone(),
    })
}

/// Evaluates a `for_each` rule existentially over its list field.
///
/// The rule is met as soon as any single item satisfies the condition; a
/// recoverable failure on one item counts that item as non-matching and
/// iteration continues.
fn any_item_matches(rule: &Rule, list_field: &FieldId, data: &Value) -> Result<bool, EngineError> {
    let Some(items) = resolve_path(data, list_field.as_str()).and_then(Value::as_array) else {
        return Ok(false);
    };

    for item in items {
        let scoped = item_context(data, item);
        match rule.condition.evaluate(&scoped, 0) {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(err) if err.is_integrity() => {
                return Err(EngineError::Integrity {
                    rule_id: rule.rule_id.clone(),
                    source: err,
                });
            }
            Err(_) => {}
        }
    }

    Ok(false)
}

/// Builds the per-item evaluation context for `for_each` rules.
///
/// The full data mapping is preserved and the current item is exposed under
/// both the domain alias and the generic alias.
fn item_context(data: &Value, item: &Value) -> Value {
    let mut scoped = match data {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    scoped.insert(SERVICE_ALIAS.to_string(), item.clone());
    scoped.insert(ITEM_ALIAS.to_string(), item.clone());
    Value::Object(scoped)
}

/// Applies a met rule's action to the visibility map.
///
/// Validation actions (`require_field`/`require_fields`) have no visibility
/// effect; they are enforced by the contract validator.
fn apply_action(visibility: &mut VisibilityMap, action: &RuleAction) {
    match action {
        RuleAction::IncludeText {
            text_key,
        } => visibility.mark_text(text_key),
        RuleAction::IncludeTable {
            table_key,
        } => visibility.mark_table(table_key),
        RuleAction::IncludeBlock {
            includes,
        } => {
            for element in includes {
                visibility.mark_element(element);
            }
        }
        RuleAction::RequireField {
            ..
        }
        | RuleAction::RequireFields {
            ..
        } => {}
    }
}

// ============================================================================
// SECTION: Service Filters
// ============================================================================

/// Returns the enabled items of the orderable-services list, preserving
/// input order.
///
/// An item is enabled when its `enabled` attribute is truthy (boolean true,
/// non-zero number, or non-empty string/collection).
#[must_use]
pub fn get_enabled_services(data: &Value) -> Vec<Value> {
    resolve_path(data, ENABLED_SERVICES_FIELD).and_then(Value::as_array).map_or_else(
        Vec::new,
        |items| {
            items
                .iter()
                .filter(|item| item.get("enabled").is_some_and(value_truthy))
                .cloned()
                .collect()
        },
    )
}

/// Loose truthiness for service flags: false, zero, and empty are off.
fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|v| v != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
