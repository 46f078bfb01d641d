// crates/informe-core/src/core/fields.rs
// ============================================================================
// Module: Informe Field Definitions
// Description: Field, text-block, table, and derived-field metadata.
// Purpose: Provide the declarative shapes contract validation and assembly consume.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! These types mirror the declarative sections of a rule pack: input field
//! metadata with validation constraints, text blocks and tables with
//! optional inline conditions, and derived-field declarations. Calculation
//! logic for derived fields is hard-coded per field id in the runtime; the
//! declarations only select which fields a pack wants computed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ElementId;
use crate::core::identifiers::FieldId;

// ============================================================================
// SECTION: Field Types
// ============================================================================

/// Value type of an input or derived field.
///
/// # Invariants
/// - Variants are stable for serialization and pack authoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    #[default]
    Text,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    /// Integer.
    Int,
    /// Fixed-point decimal.
    Decimal,
    /// Monetary amount (decimal semantics).
    Currency,
    /// Percentage (decimal semantics).
    Percentage,
    /// Boolean flag.
    Bool,
    /// One of a fixed set of values.
    Enum,
    /// Repeating group of items.
    List,
}

/// Length and cardinality constraints for a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConstraints {
    /// Minimum trimmed length for text fields.
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum trimmed length for text fields.
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Minimum item count for list fields.
    #[serde(default)]
    pub min_items: Option<usize>,
}

/// An allowed value of an enum field, with or without a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumOption {
    /// Bare allowed value.
    Plain(String),
    /// Allowed value with a display label.
    Labeled {
        /// Stored value.
        value: String,
        /// Display label shown to authors.
        #[serde(default)]
        label: Option<String>,
    },
}

impl EnumOption {
    /// Returns the stored value of this option.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Plain(value) => value,
            Self::Labeled {
                value, ..
            } => value,
        }
    }
}

/// Extra format constraint applied on top of a field's type.
///
/// # Invariants
/// - Variants are stable for serialization and pack authoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    /// Value must look like an email address.
    Email,
}

/// Declarative metadata for one input field.
///
/// # Invariants
/// - `condition`, when present, uses the inline simple-condition grammar
///   (`"<field> == <literal>"`), not the full DSL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Value type of the field.
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    /// Whether the field must be populated.
    #[serde(default)]
    pub required: bool,
    /// Display label used in validation messages.
    #[serde(default)]
    pub label: Option<String>,
    /// Inline condition gating whether the field is validated at all.
    #[serde(default)]
    pub condition: Option<String>,
    /// Length and cardinality constraints.
    #[serde(default)]
    pub validation: FieldConstraints,
    /// Allowed values for enum fields.
    #[serde(default)]
    pub values: Vec<EnumOption>,
    /// Extra format constraint.
    #[serde(default)]
    pub format: Option<FieldFormat>,
}

impl FieldDef {
    /// Returns the validation display label, falling back to the field id.
    #[must_use]
    pub fn display_label<'a>(&'a self, field_id: &'a FieldId) -> &'a str {
        self.label.as_deref().unwrap_or_else(|| field_id.as_str())
    }
}

// ============================================================================
// SECTION: Text Blocks and Tables
// ============================================================================

/// Declarative metadata for one conditional text block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlockDef {
    /// Optional block title.
    #[serde(default)]
    pub title: Option<String>,
    /// Block body handed to the template layer.
    #[serde(default)]
    pub text: Option<String>,
    /// Inline visibility condition (overrides rule-driven visibility).
    #[serde(default)]
    pub condition: Option<String>,
    /// Source-document block identifiers backing this text.
    #[serde(default)]
    pub source_block_ids: Vec<ElementId>,
}

/// A column of a declarative table, bound to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Field rendered in this column.
    pub field: FieldId,
    /// Optional column header label.
    #[serde(default)]
    pub label: Option<String>,
}

/// A row of a declarative table, bound to one or more fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Fields rendered in this row.
    #[serde(default)]
    pub fields: Vec<FieldId>,
    /// Optional row label.
    #[serde(default)]
    pub label: Option<String>,
}

/// Declarative metadata for one conditional table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Optional table title.
    #[serde(default)]
    pub title: Option<String>,
    /// Inline visibility condition (overrides rule-driven visibility).
    #[serde(default)]
    pub condition: Option<String>,
    /// Column definitions.
    #[serde(default)]
    pub columns: Vec<TableColumn>,
    /// Row definitions.
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

// ============================================================================
// SECTION: Derived Fields and Formatting
// ============================================================================

/// Declaration selecting a hard-coded derived-field computation.
///
/// # Invariants
/// - `formula` is an identifier, not an expression; the runtime matches on
///   the field id and ignores unknown formulas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFieldDef {
    /// Formula identifier documenting the computation.
    #[serde(default)]
    pub formula: Option<String>,
    /// Value type of the computed result.
    #[serde(default, rename = "type")]
    pub value_type: FieldType,
    /// Fields this computation reads, for static reference checks.
    #[serde(default)]
    pub dependencies: Vec<FieldId>,
}

/// Formatting directives for the context assembler.
///
/// # Invariants
/// - Field lists name the fields that receive `<field>_formatted`
///   companions; unknown fields are ignored at runtime and flagged by
///   static pack validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingSpec {
    /// Fields formatted as EUR currency.
    #[serde(default)]
    pub currency_fields: Vec<FieldId>,
    /// Fields formatted as percentages.
    #[serde(default)]
    pub percentage_fields: Vec<FieldId>,
}

/// One evaluative-comment slot: a question plus the boilerplate text
/// included when the author answers `si`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComentarioDef {
    /// Question shown to the report author.
    #[serde(default)]
    pub question: Option<String>,
    /// Boilerplate text injected into the context when selected.
    #[serde(default)]
    pub text: Option<String>,
}
