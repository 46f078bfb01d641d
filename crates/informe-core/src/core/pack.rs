// crates/informe-core/src/core/pack.rs
// ============================================================================
// Module: Informe Rule Pack
// Description: The immutable aggregate of one pack's declarative definitions.
// Purpose: Provide the read-only configuration the evaluation runtime consumes.
// Dependencies: crate::core::{fields, identifiers, rules}, serde
// ============================================================================

//! ## Overview
//! A [`RulePack`] is the fully loaded, in-memory form of one declarative
//! rule pack: fields, text blocks, tables, rules, decisions, derived-field
//! declarations, formatting, and audit metadata. Packs are constructed once
//! (by the config crate or by tests), then treated as immutable; the
//! runtime only ever reads them, so concurrent generation requests can
//! share a pack by reference without locking.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::fields::ComentarioDef;
use crate::core::fields::DerivedFieldDef;
use crate::core::fields::FieldDef;
use crate::core::fields::FormattingSpec;
use crate::core::fields::TableDef;
use crate::core::fields::TextBlockDef;
use crate::core::identifiers::FieldId;
use crate::core::identifiers::PluginId;
use crate::core::identifiers::RuleId;
use crate::core::identifiers::TableKey;
use crate::core::identifiers::TextKey;
use crate::core::rules::Decision;
use crate::core::rules::Rule;

// ============================================================================
// SECTION: Rule Pack
// ============================================================================

/// Immutable aggregate of one rule pack's declarative definitions.
///
/// # Invariants
/// - Treated as read-only after construction; the runtime never mutates a
///   pack.
/// - `decisions` preserves declaration order (evaluation and trace order).
/// - Keyed collections are `BTreeMap`s so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulePack {
    /// Pack identifier.
    pub plugin_id: PluginId,
    /// Input field definitions.
    #[serde(default)]
    pub fields: BTreeMap<FieldId, FieldDef>,
    /// Conditional text blocks.
    #[serde(default)]
    pub texts: BTreeMap<TextKey, TextBlockDef>,
    /// Fixed lists handed to the template layer unchanged.
    #[serde(default)]
    pub fixed_lists: Value,
    /// Conditional tables.
    #[serde(default)]
    pub tables: BTreeMap<TableKey, TableDef>,
    /// Logic rules keyed by rule id.
    #[serde(default)]
    pub rules: BTreeMap<RuleId, Rule>,
    /// Decisions in declaration order.
    #[serde(default)]
    pub decisions: Vec<Decision>,
    /// Derived-field declarations.
    #[serde(default)]
    pub derived: BTreeMap<FieldId, DerivedFieldDef>,
    /// Formatting directives for the context assembler.
    #[serde(default)]
    pub formatting: FormattingSpec,
    /// Fields masked in audit output.
    #[serde(default)]
    pub sensitive_fields: Vec<FieldId>,
    /// Evaluative-comment definitions keyed by slot field id.
    #[serde(default)]
    pub comentarios: BTreeMap<FieldId, ComentarioDef>,
}

impl RulePack {
    /// Creates an empty pack with the given identifier.
    #[must_use]
    pub fn empty(plugin_id: PluginId) -> Self {
        Self {
            plugin_id,
            ..Self::default()
        }
    }

    /// Looks up a rule definition by id.
    #[must_use]
    pub fn rule(&self, rule_id: &RuleId) -> Option<&Rule> {
        self.rules.get(rule_id)
    }

    /// Looks up a field definition by id.
    #[must_use]
    pub fn field(&self, field_id: &FieldId) -> Option<&FieldDef> {
        self.fields.get(field_id)
    }
}
