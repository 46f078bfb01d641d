// crates/informe-config/src/validate.rs
// ============================================================================
// Module: Informe Pack Validation
// Description: Static integrity validation of rule-pack directories.
// Purpose: Surface configuration-shape problems the runtime deliberately ignores.
// Dependencies: crate::pack, informe-core, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! The runtime silently skips unknown rule and field references so packs
//! can be authored incrementally; this static pass is where those shapes
//! get flagged. It works over the raw YAML values (not the typed model) so
//! it can report every problem in a pack that would refuse to load, and it
//! finishes with a typed load so schema mismatches surface too.
//!
//! Operator-allowlist and nesting-depth violations are errors; they are
//! the DSL's security boundary. Dangling references are warnings: the
//! runtime treats them as no-ops by design.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;

use informe_core::MAX_CONDITION_DEPTH;
use informe_core::PluginId;
use informe_core::is_operator_allowed;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::pack::REQUIRED_PACK_FILES;
use crate::pack::load_pack;
use crate::pack::read_pack_file;

// ============================================================================
// SECTION: Validation Report
// ============================================================================

/// Findings of one static pack validation run.
///
/// # Invariants
/// - `is_valid` is true exactly when `errors` is empty; mutators maintain
///   the invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackValidationReport {
    /// Pack identifier (directory name) the report covers.
    pub plugin_id: PluginId,
    /// Whether the pack passed with zero errors.
    pub is_valid: bool,
    /// Integrity violations that must block deployment.
    pub errors: Vec<String>,
    /// Advisory findings (dangling references, missing provenance).
    pub warnings: Vec<String>,
    /// Informational notes.
    pub info: Vec<String>,
}

impl PackValidationReport {
    /// Creates an empty, valid report for a pack.
    #[must_use]
    pub fn new(plugin_id: PluginId) -> Self {
        Self {
            plugin_id,
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Records an integrity violation.
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
}

// ============================================================================
// SECTION: Pack Validation
// ============================================================================

/// Statically validates a pack directory.
///
/// Never fails: every problem lands in the returned report.
#[must_use]
pub fn validate_pack(dir: &Path) -> PackValidationReport {
    let plugin_id = PluginId::new(
        dir.file_name().map_or_else(String::new, |name| name.to_string_lossy().into_owned()),
    );
    let mut report = PackValidationReport::new(plugin_id);

    check_required_files(&mut report, dir);

    let fields = raw_section(dir, "fields.yaml", "fields");
    let derived = raw_section(dir, "derived.yaml", "derived_fields");
    let known_fields = known_field_names(fields.as_ref(), derived.as_ref());

    let rules = raw_section(dir, "logic.yaml", "rules");
    if let Some(rules) = rules.as_ref().and_then(Value::as_object) {
        check_rule_conditions(&mut report, rules);
        check_decision_references(&mut report, dir, rules);
    }

    check_table_references(&mut report, dir, &known_fields);
    check_derived_dependencies(&mut report, derived.as_ref(), &known_fields);
    check_text_provenance(&mut report, dir);

    // Finish with a typed load so schema mismatches surface as errors.
    if let Err(err) = load_pack(dir) {
        report.add_error(format!("Pack failed to load: {err}"));
    }

    report
}

/// Checks the required-file list.
fn check_required_files(report: &mut PackValidationReport, dir: &Path) {
    for file in REQUIRED_PACK_FILES {
        if dir.join(file).is_file() {
            report.add_info(format!("Found: {file}"));
        } else {
            report.add_error(format!("Required file missing: {file}"));
        }
    }
}

/// Validates every rule condition against the allowlist and depth bound.
fn check_rule_conditions(
    report: &mut PackValidationReport,
    rules: &serde_json::Map<String, Value>,
) {
    for (rule_id, rule) in rules {
        let Some(condition) = rule.get("condition") else {
            continue;
        };
        check_condition_node(report, rule_id, condition, 0);

        let depth = raw_condition_depth(condition);
        if depth > MAX_CONDITION_DEPTH {
            report.add_error(format!(
                "Rule '{rule_id}' has nesting depth {depth} (max {MAX_CONDITION_DEPTH})"
            ));
        }
    }
}

/// Recursively checks one raw condition node's operator and children.
fn check_condition_node(
    report: &mut PackValidationReport,
    rule_id: &str,
    condition: &Value,
    depth: usize,
) {
    if depth > MAX_CONDITION_DEPTH {
        return;
    }

    let operator = condition.get("operator").and_then(Value::as_str).unwrap_or_default();
    if !operator.is_empty() && !is_operator_allowed(operator) {
        report.add_error(format!("Rule '{rule_id}' uses disallowed operator: {operator}"));
    }

    if let Some(children) = condition.get("conditions").and_then(Value::as_array) {
        for child in children {
            check_condition_node(report, rule_id, child, depth + 1);
        }
    }
    if let Some(inner) = condition.get("condition")
        && inner.is_object()
    {
        check_condition_node(report, rule_id, inner, depth + 1);
    }
}

/// Computes the logical nesting depth of a raw condition value.
fn raw_condition_depth(condition: &Value) -> usize {
    let children = condition.get("conditions").and_then(Value::as_array);
    let inner = condition.get("condition").filter(|value| value.is_object());

    let child_max = children
        .into_iter()
        .flatten()
        .chain(inner)
        .map(raw_condition_depth)
        .max();
    child_max.map_or(0, |max| max + 1)
}

/// Warns on decisions referencing rules with no definition.
fn check_decision_references(
    report: &mut PackValidationReport,
    dir: &Path,
    rules: &serde_json::Map<String, Value>,
) {
    let section = raw_section(dir, "decision_map.yaml", "decisions");
    let Some(decisions) = section.as_ref().and_then(Value::as_array) else {
        return;
    };

    for decision in decisions {
        let decision_id =
            decision.get("decision_id").and_then(Value::as_str).unwrap_or("unknown");
        let referenced = decision.get("rules").and_then(Value::as_array);
        for rule_id in referenced.into_iter().flatten().filter_map(Value::as_str) {
            if !rules.contains_key(rule_id) {
                report.add_warning(format!(
                    "Decision '{decision_id}' references unknown rule: {rule_id}"
                ));
            }
        }
    }
}

/// Warns on table rows and columns referencing unknown fields.
fn check_table_references(
    report: &mut PackValidationReport,
    dir: &Path,
    known_fields: &BTreeSet<String>,
) {
    let Some(tables) =
        raw_section(dir, "tables.yaml", "tables").as_ref().and_then(Value::as_object).cloned()
    else {
        return;
    };

    for (table_id, table) in &tables {
        for row in table.get("rows").and_then(Value::as_array).into_iter().flatten() {
            let row_fields = row.get("fields").and_then(Value::as_array);
            for field in row_fields.into_iter().flatten().filter_map(Value::as_str) {
                if !field.is_empty() && !known_fields.contains(field) {
                    report.add_warning(format!(
                        "Table '{table_id}' references unknown field: {field}"
                    ));
                }
            }
        }

        for column in table.get("columns").and_then(Value::as_array).into_iter().flatten() {
            if let Some(field) = column.get("field").and_then(Value::as_str)
                && !field.is_empty()
                && !known_fields.contains(field)
            {
                report.add_warning(format!(
                    "Table '{table_id}' column references unknown field: {field}"
                ));
            }
        }
    }
}

/// Warns on derived declarations depending on unknown fields.
fn check_derived_dependencies(
    report: &mut PackValidationReport,
    derived: Option<&Value>,
    known_fields: &BTreeSet<String>,
) {
    let Some(derived) = derived.and_then(Value::as_object) else {
        return;
    };

    for (derived_id, declaration) in derived {
        let dependencies = declaration.get("dependencies").and_then(Value::as_array);
        for dependency in dependencies.into_iter().flatten().filter_map(Value::as_str) {
            if !known_fields.contains(dependency) {
                report.add_warning(format!(
                    "Derived field '{derived_id}' depends on unknown field: {dependency}"
                ));
            }
        }
    }
}

/// Warns on text blocks without source-document provenance.
fn check_text_provenance(report: &mut PackValidationReport, dir: &Path) {
    let Some(texts) =
        raw_section(dir, "texts.yaml", "texts").as_ref().and_then(Value::as_object).cloned()
    else {
        return;
    };

    for (text_key, text) in &texts {
        let missing = text
            .get("source_block_ids")
            .and_then(Value::as_array)
            .is_none_or(Vec::is_empty);
        if missing {
            report.add_warning(format!("Text block '{text_key}' has no source block ids"));
        }
    }
}

// ============================================================================
// SECTION: Raw Section Access
// ============================================================================

/// Reads one top-level section of a pack file as a raw JSON value.
///
/// Unreadable or unparseable files yield `None`; the typed load at the end
/// of validation reports those as errors.
fn raw_section(dir: &Path, file: &str, section: &str) -> Option<Value> {
    let content = read_pack_file(dir, file).ok()?;
    if content.trim().is_empty() {
        return None;
    }
    let document: Value = serde_yaml::from_str(&content).ok()?;
    document.get(section).cloned()
}

/// Collects the names of declared input and derived fields.
fn known_field_names(fields: Option<&Value>, derived: Option<&Value>) -> BTreeSet<String> {
    let mut known = BTreeSet::new();
    for section in [fields, derived] {
        if let Some(map) = section.and_then(Value::as_object) {
            known.extend(map.keys().cloned());
        }
    }
    known
}
