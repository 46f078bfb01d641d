// crates/informe-core/src/lib.rs
// ============================================================================
// Module: Informe Core Library
// Description: Public API surface for the Informe content-assembly core.
// Purpose: Expose condition DSL, rule engine, derived fields, and audit types.
// Dependencies: crate::{core, runtime}
// ============================================================================

//! ## Overview
//! Informe core computes the content of rule-driven compliance reports:
//! given input data and a declarative rule pack, it deterministically
//! produces derived financial values, a section-visibility map, a rendering
//! context, and a full evaluation trace for audit. It owns no I/O: packs
//! and data arrive as in-memory structures, and hosts persist whatever the
//! core returns.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use runtime::ContextAssembler;
pub use runtime::DerivedValue;
pub use runtime::EngineError;
pub use runtime::PlanError;
pub use runtime::PlanOptions;
pub use runtime::PlanOutcome;
pub use runtime::Ratio;
pub use runtime::RenderPlan;
pub use runtime::RuleEngine;
pub use runtime::ValidationResult;
pub use runtime::build_audit_trace;
pub use runtime::build_plan;
pub use runtime::calculate_derived_fields;
pub use runtime::get_enabled_services;
pub use runtime::preprocess_input;
pub use runtime::validate_compliance_comments;
pub use runtime::validate_conditional_rules;
pub use runtime::validate_input;
pub use runtime::validate_required_fields;
