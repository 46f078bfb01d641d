// crates/informe-core/src/runtime/mod.rs
// ============================================================================
// Module: Informe Runtime
// Description: Rule evaluation, derived calculation, assembly, and validation.
// Purpose: Execute the content-assembly pipeline over immutable packs.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The runtime turns a loaded [`crate::core::RulePack`] plus request data
//! into derived values, a visibility map, a rendering context, and audit
//! traces. Everything here is synchronous, side-effect-free, and
//! deterministic: no I/O, no wall-clock reads, no state beyond one request.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod context;
pub mod derived;
pub mod engine;
pub mod pipeline;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::ContextAssembler;
pub use context::format_currency_eur;
pub use context::format_date_short_english;
pub use context::format_percentage;
pub use context::format_spanish_date;
pub use context::sanitize_value;
pub use derived::DerivedValue;
pub use derived::Ratio;
pub use derived::calculate_derived_fields;
pub use derived::decimal_from_value;
pub use derived::safe_divide;
pub use engine::ENABLED_SERVICES_FIELD;
pub use engine::EngineError;
pub use engine::ITEM_ALIAS;
pub use engine::RuleEngine;
pub use engine::SERVICE_ALIAS;
pub use engine::get_enabled_services;
pub use pipeline::PlanError;
pub use pipeline::PlanOptions;
pub use pipeline::PlanOutcome;
pub use pipeline::RenderPlan;
pub use pipeline::build_audit_trace;
pub use pipeline::build_plan;
pub use pipeline::preprocess_input;
pub use validate::ValidationResult;
pub use validate::validate_compliance_comments;
pub use validate::validate_conditional_rules;
pub use validate::validate_field_value;
pub use validate::validate_input;
pub use validate::validate_required_fields;
