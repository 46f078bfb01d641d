// crates/informe-core/src/core/condition.rs
// ============================================================================
// Module: Informe Condition DSL
// Description: Allowlisted boolean condition trees over request data.
// Purpose: Evaluate rule conditions deterministically without code execution.
// Dependencies: bigdecimal, serde, serde_json
// ============================================================================

//! ## Overview
//! Conditions are a restricted expression DSL: a closed set of operators over
//! dot-path field lookups. The [`Condition`] enum is the allowlist; anything
//! outside it fails parsing with [`ConditionError::OperatorNotAllowed`], and
//! nesting past [`MAX_CONDITION_DEPTH`] fails both parsing and evaluation.
//! These two failures are integrity errors and are never downgraded.
//!
//! Security posture: condition trees come from untrusted pack files; the
//! allowlist and depth bound are the boundary against expression-language
//! abuse. There is no `eval`, no user code, no side effects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Allowlist
// ============================================================================

/// Maximum nesting depth of logical operators in a condition tree.
pub const MAX_CONDITION_DEPTH: usize = 3;

/// Operators permitted in condition trees.
///
/// This list mirrors the [`Condition`] variants exactly; it exists so static
/// pack validation can report disallowed operators without parsing a full
/// tree.
pub const ALLOWED_OPERATORS: &[&str] = &[
    "and",
    "or",
    "not",
    "equals",
    "not_equals",
    "gt",
    "gte",
    "lt",
    "lte",
    "in",
    "not_in",
    "exists",
    "not_exists",
    "is_empty",
    "not_empty",
    "contains",
    "not_contains",
    "starts_with",
    "ends_with",
];

/// Returns whether an operator (case-insensitive) is in the allowlist.
#[must_use]
pub fn is_operator_allowed(operator: &str) -> bool {
    let lowered = operator.to_ascii_lowercase();
    ALLOWED_OPERATORS.contains(&lowered.as_str())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing or evaluating a condition tree.
///
/// # Invariants
/// - `OperatorNotAllowed` and `DepthExceeded` are integrity errors and must
///   abort the surrounding request; all other variants are recoverable and
///   absorbed at the rule-engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// Operator is outside the fixed allowlist.
    #[error("operator '{operator}' is not in the allowlist")]
    OperatorNotAllowed {
        /// The rejected operator as written in the pack.
        operator: String,
    },
    /// Condition nesting exceeds [`MAX_CONDITION_DEPTH`].
    #[error("condition nesting exceeds limit (max {max_depth})")]
    DepthExceeded {
        /// Maximum allowed logical nesting depth.
        max_depth: usize,
    },
    /// Ordering comparison over operands that have no defined order.
    #[error("operator '{operator}' cannot compare {detail}")]
    Incomparable {
        /// Operator that attempted the comparison.
        operator: &'static str,
        /// Short description of the operand shapes.
        detail: String,
    },
}

impl ConditionError {
    /// Returns whether this error signals a corrupted rule definition.
    ///
    /// Integrity errors abort the whole generation request; recoverable
    /// errors are absorbed as "not matched" by the rule engine.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(
            self,
            Self::OperatorNotAllowed {
                ..
            } | Self::DepthExceeded {
                ..
            }
        )
    }
}

// ============================================================================
// SECTION: Condition Tree
// ============================================================================

/// A node in the restricted condition DSL.
///
/// The enum is the operator allowlist: a condition that parses is, by
/// construction, composed only of permitted operators.
///
/// # Invariants
/// - Logical nesting never exceeds [`MAX_CONDITION_DEPTH`] for trees built
///   through [`Condition::from_value`]; hand-built trees are re-checked at
///   evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// All child conditions hold (vacuously true when empty).
    And {
        /// Child conditions.
        conditions: Vec<Condition>,
    },
    /// Any child condition holds (vacuously false when empty).
    Or {
        /// Child conditions.
        conditions: Vec<Condition>,
    },
    /// The child condition does not hold.
    Not {
        /// Negated condition.
        condition: Box<Condition>,
    },
    /// Field value equals the literal (decimal-aware for numbers).
    Equals {
        /// Dot-path field reference.
        field: String,
        /// Expected literal.
        value: Value,
    },
    /// Field value differs from the literal (decimal-aware for numbers).
    NotEquals {
        /// Dot-path field reference.
        field: String,
        /// Expected literal.
        value: Value,
    },
    /// Field value is strictly greater than the literal.
    Gt {
        /// Dot-path field reference.
        field: String,
        /// Comparison literal.
        value: Value,
    },
    /// Field value is greater than or equal to the literal.
    Gte {
        /// Dot-path field reference.
        field: String,
        /// Comparison literal.
        value: Value,
    },
    /// Field value is strictly less than the literal.
    Lt {
        /// Dot-path field reference.
        field: String,
        /// Comparison literal.
        value: Value,
    },
    /// Field value is less than or equal to the literal.
    Lte {
        /// Dot-path field reference.
        field: String,
        /// Comparison literal.
        value: Value,
    },
    /// Field value appears in the literal list (element-wise equality).
    In {
        /// Dot-path field reference.
        field: String,
        /// Membership literals.
        values: Vec<Value>,
    },
    /// Field value does not appear in the literal list.
    NotIn {
        /// Dot-path field reference.
        field: String,
        /// Membership literals.
        values: Vec<Value>,
    },
    /// Field resolves to a present, non-null value.
    Exists {
        /// Dot-path field reference.
        field: String,
    },
    /// Field is absent or null.
    NotExists {
        /// Dot-path field reference.
        field: String,
    },
    /// Field is absent, or a zero-length string/array/object.
    IsEmpty {
        /// Dot-path field reference.
        field: String,
    },
    /// Field is present and non-empty.
    NotEmpty {
        /// Dot-path field reference.
        field: String,
    },
    /// String field contains the literal as a substring.
    Contains {
        /// Dot-path field reference.
        field: String,
        /// Substring literal.
        value: Value,
    },
    /// String field does not contain the literal (true for non-strings).
    NotContains {
        /// Dot-path field reference.
        field: String,
        /// Substring literal.
        value: Value,
    },
    /// String field starts with the literal.
    StartsWith {
        /// Dot-path field reference.
        field: String,
        /// Prefix literal.
        value: Value,
    },
    /// String field ends with the literal.
    EndsWith {
        /// Dot-path field reference.
        field: String,
        /// Suffix literal.
        value: Value,
    },
}

impl Condition {
    /// Parses a condition from its wire form.
    ///
    /// The wire form is an object with an `operator` key plus the operands
    /// the operator requires (`field`/`value`/`values`/`condition`/
    /// `conditions`). Operators are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::OperatorNotAllowed`] for any operator
    /// outside the allowlist and [`ConditionError::DepthExceeded`] when
    /// logical nesting exceeds [`MAX_CONDITION_DEPTH`].
    pub fn from_value(value: &Value) -> Result<Self, ConditionError> {
        Self::from_value_at(value, 0)
    }

    /// Parses a condition node at the given logical nesting depth.
    fn from_value_at(value: &Value, depth: usize) -> Result<Self, ConditionError> {
        if depth > MAX_CONDITION_DEPTH {
            return Err(ConditionError::DepthExceeded {
                max_depth: MAX_CONDITION_DEPTH,
            });
        }

        let operator = value
            .get("operator")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();

        match operator.as_str() {
            "and" => Ok(Self::And {
                conditions: Self::child_conditions(value, depth)?,
            }),
            "or" => Ok(Self::Or {
                conditions: Self::child_conditions(value, depth)?,
            }),
            "not" => {
                let inner = value.get("condition").unwrap_or(&Value::Null);
                Ok(Self::Not {
                    condition: Box::new(Self::from_value_at(inner, depth + 1)?),
                })
            }
            "equals" => Ok(Self::Equals {
                field: field_operand(value),
                value: value_operand(value),
            }),
            "not_equals" => Ok(Self::NotEquals {
                field: field_operand(value),
                value: value_operand(value),
            }),
            "gt" => Ok(Self::Gt {
                field: field_operand(value),
                value: value_operand(value),
            }),
            "gte" => Ok(Self::Gte {
                field: field_operand(value),
                value: value_operand(value),
            }),
            "lt" => Ok(Self::Lt {
                field: field_operand(value),
                value: value_operand(value),
            }),
            "lte" => Ok(Self::Lte {
                field: field_operand(value),
                value: value_operand(value),
            }),
            "in" => Ok(Self::In {
                field: field_operand(value),
                values: values_operand(value),
            }),
            "not_in" => Ok(Self::NotIn {
                field: field_operand(value),
                values: values_operand(value),
            }),
            "exists" => Ok(Self::Exists {
                field: field_operand(value),
            }),
            "not_exists" => Ok(Self::NotExists {
                field: field_operand(value),
            }),
            "is_empty" => Ok(Self::IsEmpty {
                field: field_operand(value),
            }),
            "not_empty" => Ok(Self::NotEmpty {
                field: field_operand(value),
            }),
            "contains" => Ok(Self::Contains {
                field: field_operand(value),
                value: value_operand(value),
            }),
            "not_contains" => Ok(Self::NotContains {
                field: field_operand(value),
                value: value_operand(value),
            }),
            "starts_with" => Ok(Self::StartsWith {
                field: field_operand(value),
                value: value_operand(value),
            }),
            "ends_with" => Ok(Self::EndsWith {
                field: field_operand(value),
                value: value_operand(value),
            }),
            _ => Err(ConditionError::OperatorNotAllowed {
                operator,
            }),
        }
    }

    /// Parses the `conditions` operand of a logical node.
    fn child_conditions(value: &Value, depth: usize) -> Result<Vec<Self>, ConditionError> {
        let Some(children) = value.get("conditions").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        children.iter().map(|child| Self::from_value_at(child, depth + 1)).collect()
    }

    /// Returns the stable allowlist name of this node's operator.
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::And {
                ..
            } => "and",
            Self::Or {
                ..
            } => "or",
            Self::Not {
                ..
            } => "not",
            Self::Equals {
                ..
            } => "equals",
            Self::NotEquals {
                ..
            } => "not_equals",
            Self::Gt {
                ..
            } => "gt",
            Self::Gte {
                ..
            } => "gte",
            Self::Lt {
                ..
            } => "lt",
            Self::Lte {
                ..
            } => "lte",
            Self::In {
                ..
            } => "in",
            Self::NotIn {
                ..
            } => "not_in",
            Self::Exists {
                ..
            } => "exists",
            Self::NotExists {
                ..
            } => "not_exists",
            Self::IsEmpty {
                ..
            } => "is_empty",
            Self::NotEmpty {
                ..
            } => "not_empty",
            Self::Contains {
                ..
            } => "contains",
            Self::NotContains {
                ..
            } => "not_contains",
            Self::StartsWith {
                ..
            } => "starts_with",
            Self::EndsWith {
                ..
            } => "ends_with",
        }
    }

    /// Returns the logical nesting depth of this tree.
    ///
    /// Leaf operators contribute no depth; each `and`/`or`/`not` level
    /// contributes one. Empty logical nodes contribute nothing, matching
    /// validation semantics.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::And {
                conditions,
            }
            | Self::Or {
                conditions,
            } => conditions.iter().map(Self::depth).max().map_or(0, |max| max + 1),
            Self::Not {
                condition,
            } => condition.depth() + 1,
            _ => 0,
        }
    }

    /// Evaluates this condition against a data context.
    ///
    /// `depth` is the current logical nesting depth; callers start at 0.
    /// Evaluation is pure and deterministic for a fixed (condition, data)
    /// pair.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::DepthExceeded`] when recursion passes the
    /// nesting bound, or [`ConditionError::Incomparable`] when an ordering
    /// operator meets operands with no defined order. Missing fields are
    /// never errors.
    pub fn evaluate(&self, data: &Value, depth: usize) -> Result<bool, ConditionError> {
        if depth > MAX_CONDITION_DEPTH {
            return Err(ConditionError::DepthExceeded {
                max_depth: MAX_CONDITION_DEPTH,
            });
        }

        match self {
            Self::And {
                conditions,
            } => {
                for condition in conditions {
                    if !condition.evaluate(data, depth + 1)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or {
                conditions,
            } => {
                for condition in conditions {
                    if condition.evaluate(data, depth + 1)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not {
                condition,
            } => Ok(!condition.evaluate(data, depth + 1)?),
            Self::Equals {
                field,
                value,
            } => Ok(values_equal(resolved_or_null(data, field), value)),
            Self::NotEquals {
                field,
                value,
            } => Ok(!values_equal(resolved_or_null(data, field), value)),
            Self::Gt {
                field,
                value,
            } => Ok(compare_order("gt", resolve_path(data, field), value)?
                .is_some_and(Ordering::is_gt)),
            Self::Gte {
                field,
                value,
            } => Ok(compare_order("gte", resolve_path(data, field), value)?
                .is_some_and(Ordering::is_ge)),
            Self::Lt {
                field,
                value,
            } => Ok(compare_order("lt", resolve_path(data, field), value)?
                .is_some_and(Ordering::is_lt)),
            Self::Lte {
                field,
                value,
            } => Ok(compare_order("lte", resolve_path(data, field), value)?
                .is_some_and(Ordering::is_le)),
            Self::In {
                field,
                values,
            } => {
                let actual = resolved_or_null(data, field);
                Ok(values.iter().any(|candidate| values_equal(actual, candidate)))
            }
            Self::NotIn {
                field,
                values,
            } => {
                let actual = resolved_or_null(data, field);
                Ok(!values.iter().any(|candidate| values_equal(actual, candidate)))
            }
            Self::Exists {
                field,
            } => Ok(resolve_path(data, field).is_some()),
            Self::NotExists {
                field,
            } => Ok(resolve_path(data, field).is_none()),
            Self::IsEmpty {
                field,
            } => Ok(resolve_path(data, field).is_none_or(|value| value_len(value) == Some(0))),
            Self::NotEmpty {
                field,
            } => Ok(resolve_path(data, field)
                .is_some_and(|value| value_len(value).is_none_or(|len| len > 0))),
            Self::Contains {
                field,
                value,
            } => Ok(resolve_path(data, field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.contains(&literal_text(value)))),
            Self::NotContains {
                field,
                value,
            } => Ok(resolve_path(data, field)
                .and_then(Value::as_str)
                .is_none_or(|text| !text.contains(&literal_text(value)))),
            Self::StartsWith {
                field,
                value,
            } => Ok(resolve_path(data, field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.starts_with(&literal_text(value)))),
            Self::EndsWith {
                field,
                value,
            } => Ok(resolve_path(data, field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.ends_with(&literal_text(value)))),
        }
    }

    /// Renders this condition back into its wire form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut node = Map::new();
        node.insert("operator".to_string(), Value::String(self.operator().to_string()));
        match self {
            Self::And {
                conditions,
            }
            | Self::Or {
                conditions,
            } => {
                let children = conditions.iter().map(Self::to_value).collect();
                node.insert("conditions".to_string(), Value::Array(children));
            }
            Self::Not {
                condition,
            } => {
                node.insert("condition".to_string(), condition.to_value());
            }
            Self::Equals {
                field,
                value,
            }
            | Self::NotEquals {
                field,
                value,
            }
            | Self::Gt {
                field,
                value,
            }
            | Self::Gte {
                field,
                value,
            }
            | Self::Lt {
                field,
                value,
            }
            | Self::Lte {
                field,
                value,
            }
            | Self::Contains {
                field,
                value,
            }
            | Self::NotContains {
                field,
                value,
            }
            | Self::StartsWith {
                field,
                value,
            }
            | Self::EndsWith {
                field,
                value,
            } => {
                node.insert("field".to_string(), Value::String(field.clone()));
                node.insert("value".to_string(), value.clone());
            }
            Self::In {
                field,
                values,
            }
            | Self::NotIn {
                field,
                values,
            } => {
                node.insert("field".to_string(), Value::String(field.clone()));
                node.insert("values".to_string(), Value::Array(values.clone()));
            }
            Self::Exists {
                field,
            }
            | Self::NotExists {
                field,
            }
            | Self::IsEmpty {
                field,
            }
            | Self::NotEmpty {
                field,
            } => {
                node.insert("field".to_string(), Value::String(field.clone()));
            }
        }
        Value::Object(node)
    }
}

impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parses and evaluates a wire-form condition in one step.
///
/// # Errors
///
/// Returns [`ConditionError`] for disallowed operators, excessive nesting,
/// or unordered comparison operands.
pub fn evaluate_condition(condition: &Value, data: &Value) -> Result<bool, ConditionError> {
    Condition::from_value(condition)?.evaluate(data, 0)
}

// ============================================================================
// SECTION: Operand Extraction
// ============================================================================

/// Reads the `field` operand, defaulting to the empty path.
fn field_operand(value: &Value) -> String {
    value.get("field").and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Reads the `value` operand, defaulting to null.
fn value_operand(value: &Value) -> Value {
    value.get("value").cloned().unwrap_or(Value::Null)
}

/// Reads the `values` operand, defaulting to an empty list.
fn values_operand(value: &Value) -> Vec<Value> {
    value.get("values").and_then(Value::as_array).cloned().unwrap_or_default()
}

// ============================================================================
// SECTION: Field Resolution
// ============================================================================

/// Resolves a dot-path through nested objects and arrays.
///
/// Numeric segments index arrays; any missing key, non-traversable value,
/// out-of-range index, or explicit null resolves to `None`. Absence is not
/// an error.
#[must_use]
pub fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = data;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// Resolves a dot-path, substituting null for absent values.
///
/// Equality and membership treat absence as null so that `equals` against a
/// null literal matches a missing field.
fn resolved_or_null<'a>(data: &'a Value, path: &str) -> &'a Value {
    resolve_path(data, path).unwrap_or(&Value::Null)
}

// ============================================================================
// SECTION: Value Comparison
// ============================================================================

/// Compares two values for equality, decimal-aware for numbers.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left_num), Value::Number(right_num)) => {
            match (decimal_from_number(left_num), decimal_from_number(right_num)) {
                (Some(left_dec), Some(right_dec)) => left_dec == right_dec,
                _ => false,
            }
        }
        _ => left == right,
    }
}

/// Orders a resolved field value against a comparison literal.
///
/// A missing field orders as `None` (callers turn that into `false`).
/// Numbers order decimal-aware; strings order lexicographically; anything
/// else has no defined order and is an [`ConditionError::Incomparable`].
fn compare_order(
    operator: &'static str,
    resolved: Option<&Value>,
    expected: &Value,
) -> Result<Option<Ordering>, ConditionError> {
    let Some(actual) = resolved else {
        return Ok(None);
    };

    match (actual, expected) {
        (Value::Number(left), Value::Number(right)) => {
            match (decimal_from_number(left), decimal_from_number(right)) {
                (Some(left_dec), Some(right_dec)) => Ok(Some(left_dec.cmp(&right_dec))),
                _ => Err(ConditionError::Incomparable {
                    operator,
                    detail: "non-finite numeric operands".to_string(),
                }),
            }
        }
        (Value::String(left), Value::String(right)) => Ok(Some(left.as_str().cmp(right))),
        _ => Err(ConditionError::Incomparable {
            operator,
            detail: format!("{} with {}", value_kind(actual), value_kind(expected)),
        }),
    }
}

/// Parses a JSON number into `BigDecimal` via its stable string rendering.
fn decimal_from_number(number: &Number) -> Option<BigDecimal> {
    BigDecimal::from_str(&number.to_string()).ok()
}

/// Returns the length of a value when emptiness is defined for its type.
fn value_len(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}

/// Renders a literal operand as text for string operators.
fn literal_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Names a value's JSON kind for diagnostics.
const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Simple Conditions
// ============================================================================

/// The inline `"<field> == <literal>"` condition grammar.
///
/// Text blocks, tables, and field definitions carry these one-line
/// conditions, distinct from (and much simpler than) the full DSL. Literal
/// coercion is attempted as integer, then boolean, then string.
///
/// # Invariants
/// - Parsing never panics; an input without `==` is simply unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleCondition {
    /// Dot-path field reference (left of `==`).
    field: String,
    /// Raw literal text (right of `==`).
    literal: String,
}

impl SimpleCondition {
    /// Parses a simple condition, returning `None` when the grammar does not
    /// match.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let (field, literal) = input.split_once("==")?;
        Some(Self {
            field: field.trim().to_string(),
            literal: literal.trim().to_string(),
        })
    }

    /// Returns the referenced field path.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Evaluates the condition against a data context.
    ///
    /// Integer literals compare numerically, `true`/`false` literals compare
    /// against booleans only, and anything else compares against the string
    /// rendering of the resolved value.
    #[must_use]
    pub fn evaluate(&self, data: &Value) -> bool {
        let resolved = resolve_path(data, &self.field);

        if let Ok(expected) = self.literal.parse::<i64>() {
            return values_equal(
                resolved.unwrap_or(&Value::Null),
                &Value::Number(Number::from(expected)),
            );
        }

        if self.literal.eq_ignore_ascii_case("true") {
            return resolved == Some(&Value::Bool(true));
        }
        if self.literal.eq_ignore_ascii_case("false") {
            return resolved == Some(&Value::Bool(false));
        }

        match resolved {
            Some(Value::String(text)) => *text == self.literal,
            Some(Value::Number(number)) => number.to_string() == self.literal,
            Some(Value::Bool(flag)) => flag.to_string() == self.literal,
            _ => false,
        }
    }
}

/// Evaluates an inline condition string, defaulting to visible on parse
/// failure.
///
/// The fail-open default is deliberate and load-bearing: a malformed inline
/// condition shows the block rather than silently dropping document content.
/// (The full DSL fails closed instead; the two defaults are intentionally
/// different per call site.)
#[must_use]
pub fn evaluate_simple_condition(input: &str, data: &Value) -> bool {
    SimpleCondition::parse(input).is_none_or(|condition| condition.evaluate(data))
}
