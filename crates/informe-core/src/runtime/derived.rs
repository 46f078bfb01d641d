// crates/informe-core/src/runtime/derived.rs
// ============================================================================
// Module: Informe Derived Fields
// Description: Staged calculation of dependent financial metrics.
// Purpose: Compute derived values in fixed dependency order with decimal arithmetic.
// Dependencies: crate::core, bigdecimal, serde_json
// ============================================================================

//! ## Overview
//! Derived fields are computed from raw input (and earlier derived values)
//! in fixed dependency groups: fiscal-year derivations, then costs, then
//! margins, variations, aggregates, and weights. Each field's logic is
//! hard-coded against its id; the pack's derived declarations only select
//! which fields to compute.
//!
//! All arithmetic is fixed-point decimal (`BigDecimal`), never binary
//! floating point, so percentage and currency chains do not drift. A ratio
//! with a zero or absent divisor is [`Ratio::NotApplicable`]; callers check
//! the sentinel before any further arithmetic, and the dependent field is
//! omitted rather than propagated as infinity or an error. Any field whose
//! operands are missing or unparseable is likewise omitted; one bad field
//! never aborts the batch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use bigdecimal::ToPrimitive;
use serde_json::Number;
use serde_json::Value;

use crate::core::condition::resolve_path;
use crate::core::fields::DerivedFieldDef;
use crate::core::identifiers::FieldId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Input field holding the fiscal-year end date.
const FISCAL_DATE_FIELD: &str = "fecha_fin_fiscal";
/// Input field holding the linked-services list for aggregates.
const LINKED_SERVICES_FIELD: &str = "servicios_vinculados";
/// Nested field holding a service's linked entities.
const LINKED_ENTITIES_FIELD: &str = "entidades_vinculadas";

/// Derived-field ids in fixed dependency-group order.
///
/// Later groups may reference earlier groups' outputs by name; within a
/// group, declaration order here is computation order.
const CALCULATION_GROUPS: &[&[&str]] = &[
    // Fiscal-year derivations.
    &["anyo_ejercicio", "anyo_ejercicio_ant"],
    // Cost bases.
    &["cost_1", "cost_0"],
    // Operating and net-cost-plus margins.
    &["om_1", "om_0", "ncp_1", "ncp_0"],
    // Year-over-year variations.
    &["var_cifra", "var_cost", "var_ebit", "var_resfin", "var_ebt", "var_resnet", "var_om",
        "var_ncp"],
    // Intercompany aggregates.
    &["total_ingreso_oov", "total_gasto_oov"],
    // Intercompany weights.
    &["peso_oov_sobre_incn", "peso_oov_sobre_costes"],
];

// ============================================================================
// SECTION: Derived Values
// ============================================================================

/// A computed derived value.
///
/// # Invariants
/// - `Decimal` values are exact fixed-point results; conversion to JSON is
///   the only place precision can narrow, and integer-valued decimals stay
///   integral there.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedValue {
    /// Integral result (fiscal years).
    Integer(i64),
    /// Fixed-point decimal result.
    Decimal(BigDecimal),
}

impl DerivedValue {
    /// Returns the value as a decimal for further arithmetic.
    #[must_use]
    pub fn as_decimal(&self) -> BigDecimal {
        match self {
            Self::Integer(value) => BigDecimal::from(*value),
            Self::Decimal(value) => value.clone(),
        }
    }

    /// Renders the value as a JSON number for context assembly.
    ///
    /// Integer-valued decimals render as integers; other decimals render as
    /// the nearest double, falling back to the exact decimal string when no
    /// finite double exists.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(value) => Value::Number(Number::from(*value)),
            Self::Decimal(value) => {
                if value.is_integer()
                    && let Some(int) = value.to_i64()
                {
                    return Value::Number(Number::from(int));
                }
                value
                    .to_f64()
                    .and_then(Number::from_f64)
                    .map_or_else(|| Value::String(value.to_string()), Value::Number)
            }
        }
    }
}

/// Outcome of a guarded division.
///
/// `NotApplicable` is the calculator's sentinel for a zero or absent
/// divisor; it must be checked before any further arithmetic. A dependent
/// field whose ratio is `NotApplicable` is omitted from the result mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Ratio {
    /// The quotient.
    Value(BigDecimal),
    /// Division was undefined (zero or absent operand).
    NotApplicable,
}

/// Divides two optional operands, substituting the sentinel on a zero or
/// absent divisor.
#[must_use]
pub fn safe_divide(numerator: Option<BigDecimal>, divisor: Option<BigDecimal>) -> Ratio {
    match (numerator, divisor) {
        (Some(numerator), Some(divisor)) if divisor != BigDecimal::from(0) => {
            Ratio::Value(numerator / divisor)
        }
        _ => Ratio::NotApplicable,
    }
}

// ============================================================================
// SECTION: Calculation
// ============================================================================

/// Computes all declared derived fields from the input data.
///
/// Fields are computed in [`CALCULATION_GROUPS`] order; a field id declared
/// in a group but absent from `derived_defs` is skipped, and a field whose
/// operands are missing, unparseable, or divide by zero is omitted. The
/// result mapping is recomputed from scratch on every call; nothing is
/// cached across requests.
#[must_use]
pub fn calculate_derived_fields(
    data: &Value,
    derived_defs: &BTreeMap<FieldId, DerivedFieldDef>,
) -> BTreeMap<FieldId, DerivedValue> {
    let mut derived = BTreeMap::new();

    for group in CALCULATION_GROUPS {
        for field_name in *group {
            let field_id = FieldId::new(*field_name);
            if !derived_defs.contains_key(&field_id) {
                continue;
            }
            if let Some(value) = compute_field(field_name, data, &derived) {
                derived.insert(field_id, value);
            }
        }
    }

    derived
}

/// Computes one derived field by id, reading earlier results as needed.
fn compute_field(
    field_name: &str,
    data: &Value,
    derived: &BTreeMap<FieldId, DerivedValue>,
) -> Option<DerivedValue> {
    match field_name {
        "anyo_ejercicio" => fiscal_year(data).map(DerivedValue::Integer),
        "anyo_ejercicio_ant" => integer_operand(data, derived, "anyo_ejercicio")
            .map(|year| DerivedValue::Integer(year - 1)),
        "cost_1" => cost_base(data, derived, "cifra_1", "ebit_1"),
        "cost_0" => cost_base(data, derived, "cifra_0", "ebit_0"),
        "om_1" => margin(data, derived, "ebit_1", "cifra_1"),
        "om_0" => margin(data, derived, "ebit_0", "cifra_0"),
        "ncp_1" => margin(data, derived, "ebit_1", "cost_1"),
        "ncp_0" => margin(data, derived, "ebit_0", "cost_0"),
        "var_cifra" => variation(data, derived, "cifra_1", "cifra_0"),
        "var_cost" => variation(data, derived, "cost_1", "cost_0"),
        "var_ebit" => variation(data, derived, "ebit_1", "ebit_0"),
        "var_resfin" => variation(data, derived, "resultado_fin_1", "resultado_fin_0"),
        "var_ebt" => variation(data, derived, "ebt_1", "ebt_0"),
        "var_resnet" => variation(data, derived, "resultado_net_1", "resultado_net_0"),
        "var_om" => difference(data, derived, "om_1", "om_0"),
        "var_ncp" => difference(data, derived, "ncp_1", "ncp_0"),
        "total_ingreso_oov" => Some(DerivedValue::Decimal(entity_total(data, "ingreso_entidad"))),
        "total_gasto_oov" => Some(DerivedValue::Decimal(entity_total(data, "gasto_entidad"))),
        "peso_oov_sobre_incn" => weight(data, derived, "total_ingreso_oov", "cifra_1"),
        "peso_oov_sobre_costes" => weight(data, derived, "total_gasto_oov", "cost_1"),
        _ => None,
    }
}

/// Extracts the fiscal year from the fiscal-end-date field.
fn fiscal_year(data: &Value) -> Option<i64> {
    let raw = resolve_path(data, FISCAL_DATE_FIELD)?;
    match raw {
        Value::String(text) => text.split('-').next()?.trim().parse().ok(),
        Value::Number(number) => number.as_i64(),
        _ => None,
    }
}

/// Computes revenue minus operating result as a cost base.
fn cost_base(
    data: &Value,
    derived: &BTreeMap<FieldId, DerivedValue>,
    revenue_field: &str,
    result_field: &str,
) -> Option<DerivedValue> {
    let revenue = decimal_operand(data, derived, revenue_field)?;
    let result = decimal_operand(data, derived, result_field)?;
    Some(DerivedValue::Decimal(revenue - result))
}

/// Computes a margin percentage (numerator over base, times one hundred).
fn margin(
    data: &Value,
    derived: &BTreeMap<FieldId, DerivedValue>,
    numerator_field: &str,
    base_field: &str,
) -> Option<DerivedValue> {
    let numerator = decimal_operand(data, derived, numerator_field);
    let base = decimal_operand(data, derived, base_field);
    match safe_divide(numerator, base) {
        Ratio::Value(ratio) => Some(DerivedValue::Decimal(ratio * hundred())),
        Ratio::NotApplicable => None,
    }
}

/// Computes a year-over-year variation percentage against the absolute
/// prior-year value.
fn variation(
    data: &Value,
    derived: &BTreeMap<FieldId, DerivedValue>,
    current_field: &str,
    prior_field: &str,
) -> Option<DerivedValue> {
    let current = decimal_operand(data, derived, current_field)?;
    let prior = decimal_operand(data, derived, prior_field)?;
    let prior_abs = prior.abs();
    if prior_abs == BigDecimal::from(0) {
        return None;
    }
    Some(DerivedValue::Decimal((current - prior) / prior_abs * hundred()))
}

/// Computes a plain difference between two margin results.
fn difference(
    data: &Value,
    derived: &BTreeMap<FieldId, DerivedValue>,
    current_field: &str,
    prior_field: &str,
) -> Option<DerivedValue> {
    let current = decimal_operand(data, derived, current_field)?;
    let prior = decimal_operand(data, derived, prior_field)?;
    Some(DerivedValue::Decimal(current - prior))
}

/// Computes a weight percentage of an aggregate over a base figure.
fn weight(
    data: &Value,
    derived: &BTreeMap<FieldId, DerivedValue>,
    total_field: &str,
    base_field: &str,
) -> Option<DerivedValue> {
    let total = decimal_operand(data, derived, total_field);
    let base = decimal_operand(data, derived, base_field);
    match safe_divide(total, base) {
        Ratio::Value(ratio) => Some(DerivedValue::Decimal(ratio * hundred())),
        Ratio::NotApplicable => None,
    }
}

/// Sums a per-entity amount across every linked service's entities.
///
/// Missing services, entities, or amounts count as zero; aggregates always
/// produce a total even over an empty structure.
fn entity_total(data: &Value, amount_field: &str) -> BigDecimal {
    let mut total = BigDecimal::from(0);
    let Some(services) = resolve_path(data, LINKED_SERVICES_FIELD).and_then(Value::as_array) else {
        return total;
    };

    for service in services {
        let Some(entities) = service.get(LINKED_ENTITIES_FIELD).and_then(Value::as_array) else {
            continue;
        };
        for entity in entities {
            if let Some(amount) = entity.get(amount_field).and_then(decimal_from_value) {
                total += amount;
            }
        }
    }

    total
}

// ============================================================================
// SECTION: Operand Lookup
// ============================================================================

/// Resolves a decimal operand, preferring earlier derived results over raw
/// input.
fn decimal_operand(
    data: &Value,
    derived: &BTreeMap<FieldId, DerivedValue>,
    field_name: &str,
) -> Option<BigDecimal> {
    if let Some(value) = derived.get(&FieldId::new(field_name)) {
        return Some(value.as_decimal());
    }
    resolve_path(data, field_name).and_then(decimal_from_value)
}

/// Resolves an integer operand, preferring earlier derived results.
fn integer_operand(
    data: &Value,
    derived: &BTreeMap<FieldId, DerivedValue>,
    field_name: &str,
) -> Option<i64> {
    if let Some(value) = derived.get(&FieldId::new(field_name)) {
        return value.as_decimal().to_i64();
    }
    resolve_path(data, field_name).and_then(Value::as_i64)
}

/// Parses a JSON value into a decimal (numbers and numeric strings).
#[must_use]
pub fn decimal_from_value(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(number) => BigDecimal::from_str(&number.to_string()).ok(),
        Value::String(text) => BigDecimal::from_str(text.trim()).ok(),
        _ => None,
    }
}

/// The percentage scale factor.
fn hundred() -> BigDecimal {
    BigDecimal::from(100)
}
