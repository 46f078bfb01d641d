// crates/informe-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Informe Generation Pipeline
// Description: End-to-end plan assembly for one generation request.
// Purpose: Chain preprocessing, validation, rule evaluation, and context assembly.
// Dependencies: crate::core, crate::runtime, serde, serde_json
// ============================================================================

//! ## Overview
//! The pipeline is the unified entry point the hosts call: preprocess the
//! raw input, validate it against the pack contract, evaluate the rules,
//! and assemble the rendering context. The output is a [`RenderPlan`], the
//! exact payload the (external) template-rendering layer consumes, plus
//! the [`ValidationResult`] that drove the strict/lenient decision.
//!
//! Failure behavior follows the error taxonomy: strict validation failures
//! stop before planning but are not errors; a DSL-integrity failure inside
//! rule evaluation aborts the request; everything recoverable has already
//! been absorbed further down.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

use crate::core::pack::RulePack;
use crate::core::rules::EvaluationTrace;
use crate::core::rules::VisibilityMap;
use crate::core::time::Timestamp;
use crate::core::time::format_iso_date;
use crate::core::time::parse_iso_date;
use crate::core::trace::GenerationTrace;
use crate::core::trace::TraceError;
use crate::runtime::context::ContextAssembler;
use crate::runtime::engine::EngineError;
use crate::runtime::engine::RuleEngine;
use crate::runtime::validate::ValidationResult;
use crate::runtime::validate::validate_input;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Input field holding the fiscal-year end date.
const FISCAL_DATE_FIELD: &str = "fecha_fin_fiscal";

/// Fields coerced from numeric strings during preprocessing.
const NUMERIC_INPUT_FIELDS: &[&str] = &[
    "master_file",
    "cifra_1",
    "cifra_0",
    "ebit_1",
    "ebit_0",
    "resultado_fin_1",
    "resultado_fin_0",
    "ebt_1",
    "ebt_0",
    "resultado_net_1",
    "resultado_net_0",
];

// ============================================================================
// SECTION: Options and Outcomes
// ============================================================================

/// Options controlling one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    /// Whether to run contract validation at all.
    pub validate: bool,
    /// Whether validation errors stop the run before planning.
    pub strict_validation: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            validate: true,
            strict_validation: true,
        }
    }
}

/// The payload the template-rendering layer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    /// Final rendering context (input + derived + formatted + texts).
    pub context: Value,
    /// Visibility map over document sections.
    pub visibility: VisibilityMap,
    /// Per-decision audit traces in evaluation order.
    pub traces: Vec<EvaluationTrace>,
}

/// Outcome of one pipeline run.
///
/// # Invariants
/// - `plan` is absent exactly when strict validation stopped the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOutcome {
    /// Validation findings, when validation ran.
    pub validation: Option<ValidationResult>,
    /// The render plan, when the run reached planning.
    pub plan: Option<RenderPlan>,
}

impl PlanOutcome {
    /// Returns whether the run produced a render plan.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.plan.is_some()
    }
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Rule evaluation hit a DSL-integrity failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

// ============================================================================
// SECTION: Preprocessing
// ============================================================================

/// Normalizes raw input before validation and evaluation.
///
/// Numeric strings in the fixed financial field list become JSON numbers
/// (comma decimal separators accepted), and a parseable fiscal date is
/// re-rendered in canonical zero-padded form. Unparseable values pass
/// through unchanged for validation to report.
#[must_use]
pub fn preprocess_input(data: &Value) -> Value {
    let Value::Object(map) = data else {
        return data.clone();
    };

    let mut processed = map.clone();

    for field_name in NUMERIC_INPUT_FIELDS {
        let coerced = match processed.get(*field_name) {
            Some(Value::String(text)) => parse_numeric_string(text),
            _ => None,
        };
        if let Some(number) = coerced {
            processed.insert((*field_name).to_string(), Value::Number(number));
        }
    }

    let normalized_date = match processed.get(FISCAL_DATE_FIELD) {
        Some(Value::String(text)) => parse_iso_date(text.trim()).map(format_iso_date),
        _ => None,
    };
    if let Some(date) = normalized_date {
        processed.insert(FISCAL_DATE_FIELD.to_string(), Value::String(date));
    }

    Value::Object(processed)
}

/// Parses a numeric string, accepting comma decimal separators.
fn parse_numeric_string(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if trimmed.contains('.') || trimmed.contains(',') {
        let normalized = trimmed.replace(',', ".");
        return normalized.parse::<f64>().ok().and_then(Number::from_f64);
    }
    trimmed.parse::<i64>().ok().map(Number::from)
}

// ============================================================================
// SECTION: Plan Assembly
// ============================================================================

/// Runs the full pipeline for one generation request.
///
/// Preprocesses the input, optionally validates it (stopping before
/// planning under strict validation), evaluates all rules, and assembles
/// the rendering context.
///
/// # Errors
///
/// Returns [`PlanError::Engine`] when a rule's condition violates DSL
/// integrity; that failure signals a corrupted pack and aborts the request.
pub fn build_plan(
    pack: &RulePack,
    input: &Value,
    options: &PlanOptions,
) -> Result<PlanOutcome, PlanError> {
    let data = preprocess_input(input);

    let validation = options.validate.then(|| validate_input(pack, &data));
    if options.strict_validation
        && validation.as_ref().is_some_and(|result| !result.is_valid())
    {
        return Ok(PlanOutcome {
            validation,
            plan: None,
        });
    }

    let engine = RuleEngine::new(pack);
    let (visibility, traces) = engine.evaluate_all_rules(&data)?;
    let context = ContextAssembler::new(pack).build_context(&data);

    Ok(PlanOutcome {
        validation,
        plan: Some(RenderPlan {
            context,
            visibility,
            traces,
        }),
    })
}

/// Builds the audit record for a completed (or validation-stopped) run.
///
/// The digest covers the preprocessed input so replays hash identically
/// regardless of the caller's string-vs-number formatting.
///
/// # Errors
///
/// Returns [`TraceError`] when the input cannot be canonicalized.
pub fn build_audit_trace(
    pack: &RulePack,
    input: &Value,
    outcome: &PlanOutcome,
    timestamp: Timestamp,
    duration_ms: Option<u64>,
) -> Result<GenerationTrace, TraceError> {
    let data = preprocess_input(input);
    let decision_traces =
        outcome.plan.as_ref().map(|plan| plan.traces.clone()).unwrap_or_default();
    let validation_errors = outcome
        .validation
        .as_ref()
        .map(|result| result.errors().to_vec())
        .unwrap_or_default();

    GenerationTrace::build(
        pack.plugin_id.clone(),
        timestamp,
        &data,
        decision_traces,
        validation_errors,
        pack.sensitive_fields.clone(),
        duration_ms,
    )
}
