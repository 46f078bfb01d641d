// crates/informe-core/src/runtime/validate.rs
// ============================================================================
// Module: Informe Contract Validation
// Description: Input-data validation against pack contracts and fixed invariants.
// Purpose: Collect errors, warnings, and info without ever raising.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! The contract validator checks input data before generation proceeds:
//! per-field type and constraint checks, conditionally required fields
//! driven by the rule DSL, and the fixed compliance-comment invariant the
//! legal document format demands. The validator never raises: every
//! finding is appended to a [`ValidationResult`], and a rule whose
//! condition cannot be evaluated degrades to a warning so one malformed
//! rule cannot hide the remaining findings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::condition::evaluate_simple_condition;
use crate::core::fields::EnumOption;
use crate::core::fields::FieldDef;
use crate::core::fields::FieldFormat;
use crate::core::fields::FieldType;
use crate::core::identifiers::FieldId;
use crate::core::identifiers::RuleId;
use crate::core::pack::RulePack;
use crate::core::rules::RequirementCheck;
use crate::core::rules::Rule;
use crate::core::rules::RuleAction;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of compliance rows in the local-file family.
const LOCAL_COMPLIANCE_ROWS: usize = 14;
/// Number of compliance rows in the master-file family.
const MASTER_COMPLIANCE_ROWS: usize = 17;
/// Inline condition gating the master-file compliance family.
const MASTER_FILE_GATE: &str = "master_file == 1";
/// Compliance answers that demand a free-text comment.
const COMMENT_REQUIRED_ANSWERS: [&str; 2] = ["no", "parcial"];

// ============================================================================
// SECTION: Validation Result
// ============================================================================

/// Aggregated outcome of a validation run.
///
/// # Invariants
/// - `is_valid` is true exactly when `errors` is empty; warnings and info
///   never affect validity. Mutators maintain the invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the run found zero errors.
    is_valid: bool,
    /// Hard failures that must block strict generation.
    errors: Vec<String>,
    /// Advisory findings that never block generation.
    warnings: Vec<String>,
    /// Informational notes.
    info: Vec<String>,
}

impl ValidationResult {
    /// Creates an empty, valid result.
    #[must_use]
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Returns whether the run found zero errors.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Returns the collected errors.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns the collected warnings.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns the collected informational notes.
    #[must_use]
    pub fn info(&self) -> &[String] {
        &self.info
    }

    /// Records a hard failure.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    /// Records an advisory finding.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Records an informational note.
    pub fn add_info(&mut self, message: impl Into<String>) {
        self.info.push(message.into());
    }

    /// Absorbs another result's findings.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.info.extend(other.info);
        self.is_valid = self.errors.is_empty();
    }
}

// ============================================================================
// SECTION: Field Validation
// ============================================================================

/// Validates a single field value against its definition.
///
/// Returns the error messages for this field (empty when valid). A missing
/// optional field passes every check.
#[must_use]
pub fn validate_field_value(
    field_id: &FieldId,
    field_def: &FieldDef,
    value: Option<&Value>,
) -> Vec<String> {
    let mut errors = Vec::new();
    let label = field_def.display_label(field_id);

    if field_def.required && value_is_blank(value) {
        errors.push(format!("Field '{label}' is required"));
        return errors;
    }

    let Some(value) = value.filter(|candidate| !candidate.is_null()) else {
        return errors;
    };

    match field_def.field_type {
        FieldType::Text => validate_text(&mut errors, label, field_def, value),
        FieldType::Date => {
            if !value.is_string() {
                errors.push(format!("Field '{label}' must be a date"));
            }
        }
        FieldType::Enum => {
            let rendered = render_scalar(value);
            let allowed: Vec<&str> = field_def.values.iter().map(EnumOption::value).collect();
            if !allowed.contains(&rendered.as_str()) {
                errors.push(format!("Field '{label}' must be one of: {}", allowed.join(", ")));
            }
        }
        FieldType::Int | FieldType::Decimal | FieldType::Currency | FieldType::Percentage => {
            if !value_is_numeric(value) {
                errors.push(format!("Field '{label}' must be a number"));
            }
        }
        FieldType::List => {
            if let Some(items) = value.as_array() {
                if let Some(min_items) = field_def.validation.min_items
                    && items.len() < min_items
                {
                    errors
                        .push(format!("Field '{label}' must have at least {min_items} items"));
                }
            } else {
                errors.push(format!("Field '{label}' must be a list"));
            }
        }
        FieldType::Bool => {}
    }

    if let Some(FieldFormat::Email) = field_def.format
        && let Some(text) = value.as_str()
        && !text.is_empty()
        && !is_valid_email(text)
    {
        errors.push(format!("Field '{label}' must be a valid email address"));
    }

    errors
}

/// Validates text type and trimmed length bounds.
fn validate_text(errors: &mut Vec<String>, label: &str, field_def: &FieldDef, value: &Value) {
    let Some(text) = value.as_str() else {
        errors.push(format!("Field '{label}' must be a string"));
        return;
    };

    let trimmed_len = text.trim().chars().count();
    if let Some(min_length) = field_def.validation.min_length
        && trimmed_len < min_length
    {
        errors.push(format!(
            "Field '{label}' must be at least {min_length} characters (current: {trimmed_len})"
        ));
    }
    if let Some(max_length) = field_def.validation.max_length
        && trimmed_len > max_length
    {
        errors.push(format!(
            "Field '{label}' must be at most {max_length} characters (current: {trimmed_len})"
        ));
    }
}

/// Validates every defined field, honoring per-field inline conditions.
///
/// A field whose inline condition does not hold in `context` is skipped
/// entirely; an unparseable condition validates the field (fail-open, the
/// same default the visibility pass uses).
#[must_use]
pub fn validate_required_fields(
    data: &Value,
    fields_def: &BTreeMap<FieldId, FieldDef>,
    context: &Value,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (field_id, field_def) in fields_def {
        if let Some(condition) = &field_def.condition
            && !evaluate_simple_condition(condition, context)
        {
            continue;
        }

        let value = data.get(field_id.as_str());
        for error in validate_field_value(field_id, field_def, value) {
            result.add_error(error);
        }
    }

    result
}

// ============================================================================
// SECTION: Conditional Rules
// ============================================================================

/// Validates `require_field`/`require_fields` rules against the input data.
///
/// A rule whose condition cannot be evaluated (for any reason, integrity
/// included) degrades to a warning and the remaining rules still run;
/// validation must stay maximally informative in the presence of one
/// malformed rule.
#[must_use]
pub fn validate_conditional_rules(
    data: &Value,
    rules: &BTreeMap<RuleId, Rule>,
    fields_def: &BTreeMap<FieldId, FieldDef>,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (rule_id, rule) in rules {
        let required_fields: Vec<&FieldId> = match &rule.action {
            RuleAction::RequireField {
                field,
                validation: RequirementCheck::NotEmpty,
            } => vec![field],
            RuleAction::RequireFields {
                fields,
            } => fields.iter().collect(),
            _ => continue,
        };

        let condition_met = match rule.condition.evaluate(data, 0) {
            Ok(met) => met,
            Err(err) => {
                result.add_warning(format!(
                    "Rule {rule_id}: could not evaluate condition - {err}"
                ));
                continue;
            }
        };
        if !condition_met {
            continue;
        }

        for field_id in required_fields {
            if value_is_blank(data.get(field_id.as_str())) {
                let label = fields_def
                    .get(field_id)
                    .map_or_else(|| field_id.as_str(), |def| def.display_label(field_id));
                result.add_error(format!("Field '{label}' is required by rule {rule_id}"));
            }
        }
    }

    result
}

// ============================================================================
// SECTION: Compliance Comments
// ============================================================================

/// Validates the fixed compliance-comment invariant.
///
/// Every compliance row answered `no` or `parcial` must carry a non-empty
/// paired comment: rows 1..=14 of the local family always, rows 1..=17 of
/// the master family when the master-file flag is set. Violations are hard
/// errors; this is a structural legal-documentation requirement, not an
/// advisory rule.
#[must_use]
pub fn validate_compliance_comments(
    data: &Value,
    fields_def: &BTreeMap<FieldId, FieldDef>,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    check_compliance_family(&mut result, data, fields_def, "local", LOCAL_COMPLIANCE_ROWS);

    if evaluate_simple_condition(MASTER_FILE_GATE, data) {
        check_compliance_family(&mut result, data, fields_def, "mast", MASTER_COMPLIANCE_ROWS);
    }

    result
}

/// Checks one compliance family's rows for missing comments.
fn check_compliance_family(
    result: &mut ValidationResult,
    data: &Value,
    fields_def: &BTreeMap<FieldId, FieldDef>,
    family: &str,
    rows: usize,
) {
    for row in 1 ..= rows {
        let answer_field = FieldId::new(format!("cumplido_{family}_{row}"));
        let comment_field = format!("texto_cumplido_{family}_{row}");

        let Some(answer) = data.get(answer_field.as_str()).and_then(Value::as_str) else {
            continue;
        };
        if !COMMENT_REQUIRED_ANSWERS.contains(&answer) {
            continue;
        }

        if value_is_blank(data.get(&comment_field)) {
            let label = fields_def
                .get(&answer_field)
                .map_or_else(|| answer_field.as_str(), |def| def.display_label(&answer_field));
            result.add_error(format!(
                "Comment required for '{label}' when compliance is '{answer}'"
            ));
        }
    }
}

// ============================================================================
// SECTION: Full Validation
// ============================================================================

/// Runs the full contract validation for one request.
///
/// Merges required-field checks, conditional-rule checks, and the
/// compliance-comment invariant into one result.
#[must_use]
pub fn validate_input(pack: &RulePack, data: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    result.merge(validate_required_fields(data, &pack.fields, data));
    result.merge(validate_conditional_rules(data, &pack.rules, &pack.fields));
    result.merge(validate_compliance_comments(data, &pack.fields));
    result
}

// ============================================================================
// SECTION: Value Helpers
// ============================================================================

/// Returns whether a value is absent, null, or an empty string.
fn value_is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// Returns whether a value is a number or a numeric string.
fn value_is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(text) => text.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

/// Renders a scalar for enum membership comparison.
fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Checks the minimal structural shape of an email address.
fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|ch| ch.is_ascii_alphabetic())
}
