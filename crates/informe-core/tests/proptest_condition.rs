// crates/informe-core/tests/proptest_condition.rs
// ============================================================================
// Module: Condition Property-Based Tests
// Description: Property tests for allowlist enforcement and comparison laws.
// Purpose: Detect panics and invariant violations across wide input ranges.
// ============================================================================

//! Property-based tests for condition DSL invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use informe_core::ConditionError;
use informe_core::evaluate_condition;
use informe_core::is_operator_allowed;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn non_allowlisted_operators_always_raise(operator in "[a-z_]{1,16}") {
        prop_assume!(!is_operator_allowed(&operator));
        let condition = json!({"operator": operator, "field": "x", "value": 1});
        let result = evaluate_condition(&condition, &json!({"x": 1}));
        let matched = matches!(result, Err(ConditionError::OperatorNotAllowed { .. }));
        prop_assert!(matched);
    }

    #[test]
    fn equality_matches_integer_semantics(a in any::<i64>(), b in any::<i64>()) {
        let condition = json!({"operator": "equals", "field": "value", "value": b});
        let data = json!({"value": a});
        let result = evaluate_condition(&condition, &data);
        prop_assert_eq!(result.ok(), Some(a == b));
    }

    #[test]
    fn ordering_matches_integer_semantics(a in any::<i64>(), b in any::<i64>()) {
        let data = json!({"value": a});
        let gt = evaluate_condition(&json!({"operator": "gt", "field": "value", "value": b}), &data);
        let lt = evaluate_condition(&json!({"operator": "lt", "field": "value", "value": b}), &data);
        let gte =
            evaluate_condition(&json!({"operator": "gte", "field": "value", "value": b}), &data);
        let lte =
            evaluate_condition(&json!({"operator": "lte", "field": "value", "value": b}), &data);
        prop_assert_eq!(gt.ok(), Some(a > b));
        prop_assert_eq!(lt.ok(), Some(a < b));
        prop_assert_eq!(gte.ok(), Some(a >= b));
        prop_assert_eq!(lte.ok(), Some(a <= b));
    }

    #[test]
    fn ordering_against_missing_fields_never_raises(b in any::<i64>()) {
        let data = json!({"present": 1});
        for operator in ["gt", "gte", "lt", "lte"] {
            let condition = json!({"operator": operator, "field": "absent", "value": b});
            let result = evaluate_condition(&condition, &data);
            prop_assert_eq!(result.ok(), Some(false));
        }
    }

    #[test]
    fn membership_is_consistent_with_negation(
        needle in any::<i32>(),
        haystack in prop::collection::vec(any::<i32>(), 0 .. 8),
    ) {
        let data = json!({"value": needle});
        let member = evaluate_condition(
            &json!({"operator": "in", "field": "value", "values": haystack.clone()}),
            &data,
        );
        let non_member = evaluate_condition(
            &json!({"operator": "not_in", "field": "value", "values": haystack.clone()}),
            &data,
        );
        let expected = haystack.contains(&needle);
        prop_assert_eq!(member.ok(), Some(expected));
        prop_assert_eq!(non_member.ok(), Some(!expected));
    }

    #[test]
    fn evaluation_is_deterministic(a in any::<i64>(), b in any::<i64>(), text in ".{0,16}") {
        let condition = json!({
            "operator": "or",
            "conditions": [
                {"operator": "gte", "field": "value", "value": b},
                {"operator": "contains", "field": "text", "value": "x"},
            ]
        });
        let data = json!({"value": a, "text": text});
        let first = evaluate_condition(&condition, &data).ok();
        for _ in 0 .. 8 {
            prop_assert_eq!(evaluate_condition(&condition, &data).ok(), first);
        }
    }
}
