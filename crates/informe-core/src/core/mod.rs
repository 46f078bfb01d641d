// crates/informe-core/src/core/mod.rs
// ============================================================================
// Module: Informe Core Types
// Description: Canonical Informe condition, rule, pack, and audit structures.
// Purpose: Provide stable, serializable types for rule packs and evaluation records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Informe core types define the condition DSL, rule and decision model,
//! the loaded rule-pack aggregate, and the audit record shapes. These types
//! are the canonical source of truth for any derived surfaces (CLI output,
//! persisted traces, or future APIs).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod condition;
pub mod fields;
pub mod identifiers;
pub mod pack;
pub mod rules;
pub mod time;
pub mod trace;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use condition::ALLOWED_OPERATORS;
pub use condition::Condition;
pub use condition::ConditionError;
pub use condition::MAX_CONDITION_DEPTH;
pub use condition::SimpleCondition;
pub use condition::evaluate_condition;
pub use condition::evaluate_simple_condition;
pub use condition::is_operator_allowed;
pub use condition::resolve_path;
pub use fields::ComentarioDef;
pub use fields::DerivedFieldDef;
pub use fields::EnumOption;
pub use fields::FieldConstraints;
pub use fields::FieldDef;
pub use fields::FieldFormat;
pub use fields::FieldType;
pub use fields::FormattingSpec;
pub use fields::TableColumn;
pub use fields::TableDef;
pub use fields::TableRow;
pub use fields::TextBlockDef;
pub use identifiers::DecisionId;
pub use identifiers::ElementId;
pub use identifiers::FieldId;
pub use identifiers::PluginId;
pub use identifiers::RuleId;
pub use identifiers::TableKey;
pub use identifiers::TextKey;
pub use identifiers::TraceId;
pub use pack::RulePack;
pub use rules::Decision;
pub use rules::EvaluationTrace;
pub use rules::RequirementCheck;
pub use rules::Rule;
pub use rules::RuleAction;
pub use rules::RuleHit;
pub use rules::VisibilityMap;
pub use time::Timestamp;
pub use time::format_iso_date;
pub use time::parse_iso_date;
pub use trace::GenerationTrace;
pub use trace::InputDigest;
pub use trace::TraceError;
pub use trace::mask_sensitive_data;
