// crates/informe-core/src/core/rules.rs
// ============================================================================
// Module: Informe Rule Model
// Description: Rules, decisions, rule hits, traces, and the visibility map.
// Purpose: Provide stable, serializable types for rule evaluation outcomes.
// Dependencies: crate::core::{condition, identifiers}, serde
// ============================================================================

//! ## Overview
//! Rules bind a [`Condition`] to a document action; decisions group rules
//! for audit organization. Evaluation outcomes are captured as immutable
//! [`RuleHit`] records inside per-decision [`EvaluationTrace`] entries, and
//! visibility effects accumulate in a deterministic [`VisibilityMap`].
//!
//! All types here are created, used, and discarded within one generation
//! request; none carries cross-request state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::condition::Condition;
use crate::core::identifiers::DecisionId;
use crate::core::identifiers::ElementId;
use crate::core::identifiers::FieldId;
use crate::core::identifiers::RuleId;
use crate::core::identifiers::TableKey;
use crate::core::identifiers::TextKey;

// ============================================================================
// SECTION: Rule Actions
// ============================================================================

/// Validation applied by `require_field` actions when their condition holds.
///
/// # Invariants
/// - Variants are stable for serialization and pack authoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementCheck {
    /// The target field must hold a non-empty value.
    #[default]
    NotEmpty,
}

/// Document effect or validation demand attached to a rule.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Marks a text block visible.
    IncludeText {
        /// Text-block key to reveal.
        text_key: TextKey,
    },
    /// Marks a table visible.
    IncludeTable {
        /// Table key to reveal.
        table_key: TableKey,
    },
    /// Marks a set of document elements visible.
    IncludeBlock {
        /// Element identifiers to reveal.
        includes: Vec<ElementId>,
    },
    /// Demands a single field be populated when the condition holds.
    RequireField {
        /// Field that must be populated.
        field: FieldId,
        /// Check applied to the field value.
        #[serde(default)]
        validation: RequirementCheck,
    },
    /// Demands several fields be populated when the condition holds.
    RequireFields {
        /// Fields that must be populated.
        fields: Vec<FieldId>,
    },
}

impl RuleAction {
    /// Returns the stable wire label of this action's kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::IncludeText {
                ..
            } => "include_text",
            Self::IncludeTable {
                ..
            } => "include_table",
            Self::IncludeBlock {
                ..
            } => "include_block",
            Self::RequireField {
                ..
            } => "require_field",
            Self::RequireFields {
                ..
            } => "require_fields",
        }
    }

    /// Returns the element identifiers affected by an `include_block` action.
    #[must_use]
    pub fn affected_elements(&self) -> Vec<ElementId> {
        match self {
            Self::IncludeBlock {
                includes,
            } => includes.clone(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Rules and Decisions
// ============================================================================

/// A declarative rule: a condition plus the action it triggers.
///
/// # Invariants
/// - `condition` is composed only of allowlisted operators (guaranteed by
///   the [`Condition`] parser).
/// - A rule with `for_each` is evaluated existentially over the named list
///   field: it is met when any single item satisfies the condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule identifier (filled from the pack's map key when omitted inline).
    #[serde(default)]
    pub rule_id: RuleId,
    /// Human-readable rule name for traces.
    #[serde(default)]
    pub name: Option<String>,
    /// Condition gating the action.
    pub condition: Condition,
    /// Action applied when the condition holds.
    pub action: RuleAction,
    /// Optional list field to iterate existentially.
    #[serde(default)]
    pub for_each: Option<FieldId>,
    /// Source-document block identifiers backing this rule.
    #[serde(default)]
    pub source_block_ids: Vec<ElementId>,
}

impl Rule {
    /// Returns the trace display name, falling back to the rule id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.rule_id.as_str())
    }
}

/// A named group of rules evaluated together for trace organization.
///
/// # Invariants
/// - `rules` preserves pack declaration order; evaluation and traces follow
///   it exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Decision identifier.
    pub decision_id: DecisionId,
    /// Human-readable decision name for traces.
    #[serde(default)]
    pub name: Option<String>,
    /// Referenced rule identifiers in declared order.
    #[serde(default)]
    pub rules: Vec<RuleId>,
}

impl Decision {
    /// Returns the trace display name, falling back to the decision id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.decision_id.as_str())
    }
}

// ============================================================================
// SECTION: Evaluation Records
// ============================================================================

/// Immutable record of one rule's evaluation.
///
/// # Invariants
/// - Created once per rule per generation request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    /// Evaluated rule identifier.
    pub rule_id: RuleId,
    /// Rule display name at evaluation time.
    pub rule_name: String,
    /// Whether the rule's condition held.
    pub condition_met: bool,
    /// Stable label of the rule's action kind.
    pub action_type: String,
    /// Element identifiers the action affects (for `include_block`).
    pub affected_elements: Vec<ElementId>,
    /// Source-document block identifiers backing the rule.
    pub source_block_ids: Vec<ElementId>,
}

/// Ordered audit trace of one decision's rule evaluations.
///
/// # Invariants
/// - `rule_hits` ordering matches evaluation order and is reproducible for
///   identical inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationTrace {
    /// Decision identifier.
    pub decision_id: DecisionId,
    /// Decision display name at evaluation time.
    pub decision_name: String,
    /// Rule hits in evaluation order.
    pub rule_hits: Vec<RuleHit>,
}

impl EvaluationTrace {
    /// Creates an empty trace for a decision.
    #[must_use]
    pub fn new(decision_id: DecisionId, decision_name: impl Into<String>) -> Self {
        Self {
            decision_id,
            decision_name: decision_name.into(),
            rule_hits: Vec::new(),
        }
    }

    /// Returns the identifiers of rules whose conditions held.
    #[must_use]
    pub fn met_rule_ids(&self) -> Vec<RuleId> {
        self.rule_hits
            .iter()
            .filter(|hit| hit.condition_met)
            .map(|hit| hit.rule_id.clone())
            .collect()
    }
}

// ============================================================================
// SECTION: Visibility Map
// ============================================================================

/// Namespace prefix for text-block visibility keys.
const TEXT_PREFIX: &str = "text:";
/// Namespace prefix for table visibility keys.
const TABLE_PREFIX: &str = "table:";
/// Namespace prefix for element visibility keys.
const ELEMENT_PREFIX: &str = "element:";

/// Deterministic map from namespaced document keys to visibility.
///
/// Keys are `text:<id>`, `table:<id>`, and `element:<id>`. Rule-driven
/// entries only ever mark keys visible (visibility is monotonic across
/// rules); the inline-condition second pass may overwrite entries in either
/// direction. Keys never touched are not visible.
///
/// # Invariants
/// - Iteration order is the key's lexicographic order (`BTreeMap`), so
///   serialized maps are bit-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityMap {
    /// Visibility entries keyed by namespaced document key.
    entries: BTreeMap<String, bool>,
}

impl VisibilityMap {
    /// Creates an empty visibility map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a text block visible (rule-driven, monotonic).
    pub fn mark_text(&mut self, key: &TextKey) {
        self.entries.insert(format!("{TEXT_PREFIX}{key}"), true);
    }

    /// Marks a table visible (rule-driven, monotonic).
    pub fn mark_table(&mut self, key: &TableKey) {
        self.entries.insert(format!("{TABLE_PREFIX}{key}"), true);
    }

    /// Marks a document element visible (rule-driven, monotonic).
    pub fn mark_element(&mut self, element: &ElementId) {
        self.entries.insert(format!("{ELEMENT_PREFIX}{element}"), true);
    }

    /// Overwrites a text block's visibility (inline-condition pass).
    pub fn set_text(&mut self, key: &TextKey, visible: bool) {
        self.entries.insert(format!("{TEXT_PREFIX}{key}"), visible);
    }

    /// Overwrites a table's visibility (inline-condition pass).
    pub fn set_table(&mut self, key: &TableKey, visible: bool) {
        self.entries.insert(format!("{TABLE_PREFIX}{key}"), visible);
    }

    /// Returns a key's visibility; untouched keys are not visible.
    #[must_use]
    pub fn is_visible(&self, key: &str) -> bool {
        self.entries.get(key).copied().unwrap_or(false)
    }

    /// Returns the recorded entry for a key, if any pass touched it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<bool> {
        self.entries.get(key).copied()
    }

    /// Returns visible text-block keys in deterministic order.
    #[must_use]
    pub fn visible_texts(&self) -> Vec<TextKey> {
        self.visible_with_prefix(TEXT_PREFIX).map(TextKey::new).collect()
    }

    /// Returns visible table keys in deterministic order.
    #[must_use]
    pub fn visible_tables(&self) -> Vec<TableKey> {
        self.visible_with_prefix(TABLE_PREFIX).map(TableKey::new).collect()
    }

    /// Returns visible element identifiers in deterministic order.
    #[must_use]
    pub fn visible_elements(&self) -> Vec<ElementId> {
        self.visible_with_prefix(ELEMENT_PREFIX).map(ElementId::new).collect()
    }

    /// Iterates visible keys under a namespace prefix, stripped.
    fn visible_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries.iter().filter_map(move |(key, visible)| {
            if *visible { key.strip_prefix(prefix) } else { None }
        })
    }

    /// Iterates all entries in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(key, visible)| (key.as_str(), *visible))
    }

    /// Returns the number of touched keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no key has been touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
