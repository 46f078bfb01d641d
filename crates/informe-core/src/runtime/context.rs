// crates/informe-core/src/runtime/context.rs
// ============================================================================
// Module: Informe Context Assembly
// Description: Rendering-context construction with locale-aware formatting.
// Purpose: Merge input, derived values, formatted companions, and pack texts.
// Dependencies: crate::core, crate::runtime::derived, bigdecimal, serde_json, time
// ============================================================================

//! ## Overview
//! The context assembler produces the final dictionary the template layer
//! binds against: raw input, derived values, `<field>_formatted` companions
//! (EUR currency, percentages, fiscal dates), the pack's text blocks and
//! fixed lists, and the evaluative-comment context. Every string value is
//! trimmed on the way out so stray whitespace cannot disturb table layouts
//! in the rendered document.
//!
//! Formatting prefers the exact decimal results of the derived-field
//! calculator over their JSON renderings, so displayed figures never pick
//! up binary-float artifacts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use bigdecimal::RoundingMode;
use serde_json::Map;
use serde_json::Value;
use time::Date;

use crate::core::identifiers::FieldId;
use crate::core::pack::RulePack;
use crate::core::time::parse_iso_date;
use crate::runtime::derived::DerivedValue;
use crate::runtime::derived::calculate_derived_fields;
use crate::runtime::derived::decimal_from_value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Input field holding the fiscal-year end date.
const FISCAL_DATE_FIELD: &str = "fecha_fin_fiscal";
/// Number of evaluative-comment slots in the report template.
const COMENTARIO_SLOTS: usize = 17;
/// Suffix appended to formatted companion fields.
const FORMATTED_SUFFIX: &str = "_formatted";

/// Spanish month names for long-form dates.
const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// English month abbreviations for short-form dates.
const ENGLISH_MONTH_ABBR: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

// ============================================================================
// SECTION: Formatting Helpers
// ============================================================================

/// Formats a date in Spanish long form: `31 de diciembre de 2025`.
#[must_use]
pub fn format_spanish_date(date: Date) -> String {
    let month = SPANISH_MONTHS[usize::from(u8::from(date.month())) - 1];
    format!("{} de {} de {}", date.day(), month, date.year())
}

/// Formats a date in short English form: `31 Dec 2025`.
#[must_use]
pub fn format_date_short_english(date: Date) -> String {
    let month = ENGLISH_MONTH_ABBR[usize::from(u8::from(date.month())) - 1];
    format!("{} {} {}", date.day(), month, date.year())
}

/// Formats an amount as EUR currency: `1.500.000 €`.
///
/// The amount is rounded half-up to whole units and grouped with dot
/// thousands separators.
#[must_use]
pub fn format_currency_eur(value: &BigDecimal) -> String {
    let rounded = value.with_scale_round(0, RoundingMode::HalfUp);
    let rendered = rounded.to_string();
    let (sign, digits) = rendered.strip_prefix('-').map_or(("", rendered.as_str()), |rest| {
        ("-", rest)
    });
    format!("{sign}{} €", group_thousands(digits))
}

/// Formats a ratio as a percentage: `15,00 %`.
///
/// The value is rounded half-up to two decimals and rendered with a comma
/// decimal separator.
#[must_use]
pub fn format_percentage(value: &BigDecimal) -> String {
    let rounded = value.with_scale_round(2, RoundingMode::HalfUp);
    format!("{} %", rounded.to_string().replace('.', ","))
}

/// Inserts dot thousands separators into an unsigned digit string.
fn group_thousands(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / 3);
    for (position, ch) in chars.iter().enumerate() {
        let remaining = chars.len() - position;
        if position > 0 && remaining.is_multiple_of(3) {
            out.push('.');
        }
        out.push(*ch);
    }
    out
}

/// Recursively trims string values for safe template insertion.
#[must_use]
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(text.trim().to_string()),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter().map(|(key, item)| (key.clone(), sanitize_value(item))).collect(),
        ),
        other => other.clone(),
    }
}

// ============================================================================
// SECTION: Context Assembler
// ============================================================================

/// Builds the rendering context for one generation request.
///
/// The assembler borrows an immutable pack and holds no other state.
pub struct ContextAssembler<'pack> {
    /// Pack supplying derived declarations, formatting, and texts.
    pack: &'pack RulePack,
}

impl<'pack> ContextAssembler<'pack> {
    /// Creates an assembler over a loaded pack.
    #[must_use]
    pub const fn new(pack: &'pack RulePack) -> Self {
        Self {
            pack,
        }
    }

    /// Builds the complete rendering context.
    ///
    /// Order matters: derived values land after raw input so computed
    /// figures win, formatted companions are derived from the exact decimal
    /// results, and the final recursive sanitation pass trims every string.
    #[must_use]
    pub fn build_context(&self, data: &Value) -> Value {
        let mut context = data.as_object().cloned().unwrap_or_default();

        let derived = calculate_derived_fields(data, &self.pack.derived);
        for (field_id, value) in &derived {
            context.insert(field_id.to_string(), value.to_json());
        }

        self.apply_formatting(&mut context, &derived);

        context.insert(
            "texts".to_string(),
            serde_json::to_value(&self.pack.texts).unwrap_or_default(),
        );
        let fixed_lists = match &self.pack.fixed_lists {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        context.insert("fixed_lists".to_string(), fixed_lists);

        self.apply_comentarios(&mut context, data);

        sanitize_value(&Value::Object(context))
    }

    /// Adds `<field>_formatted` companions for dates, currency, and
    /// percentage fields.
    fn apply_formatting(
        &self,
        context: &mut Map<String, Value>,
        derived: &BTreeMap<FieldId, DerivedValue>,
    ) {
        if let Some(raw) = context.get(FISCAL_DATE_FIELD).cloned() {
            let formatted = raw
                .as_str()
                .and_then(parse_iso_date)
                .map_or_else(|| raw.clone(), |date| {
                    Value::String(format_date_short_english(date))
                });
            context.insert(format!("{FISCAL_DATE_FIELD}{FORMATTED_SUFFIX}"), formatted);
        }

        for field_id in &self.pack.formatting.currency_fields {
            if let Some(amount) = formatted_operand(context, derived, field_id) {
                context.insert(
                    format!("{field_id}{FORMATTED_SUFFIX}"),
                    Value::String(format_currency_eur(&amount)),
                );
            }
        }

        for field_id in &self.pack.formatting.percentage_fields {
            if let Some(ratio) = formatted_operand(context, derived, field_id) {
                context.insert(
                    format!("{field_id}{FORMATTED_SUFFIX}"),
                    Value::String(format_percentage(&ratio)),
                );
            }
        }
    }

    /// Builds the evaluative-comment context: selected slots inject their
    /// boilerplate text, and a summary list drives template iteration.
    fn apply_comentarios(&self, context: &mut Map<String, Value>, data: &Value) {
        if self.pack.comentarios.is_empty() {
            return;
        }

        let mut selected = Vec::new();
        for index in 1 ..= COMENTARIO_SLOTS {
            let field_name = format!("comentario_valorativo_{index}");
            let text_field = format!("{field_name}_text");

            let answer = data.get(&field_name).and_then(Value::as_str).unwrap_or("no");
            let text = self
                .pack
                .comentarios
                .get(&FieldId::new(field_name.as_str()))
                .and_then(|def| def.text.clone())
                .unwrap_or_default();

            if answer == "si" {
                context.insert(text_field, Value::String(text.clone()));
                let mut entry = Map::new();
                entry.insert("index".to_string(), Value::from(index));
                entry.insert("id".to_string(), Value::String(field_name));
                entry.insert("text".to_string(), Value::String(text));
                selected.push(Value::Object(entry));
            } else {
                context.insert(text_field, Value::String(String::new()));
            }
        }

        context.insert(
            "has_comentarios_valorativos".to_string(),
            Value::Bool(!selected.is_empty()),
        );
        context.insert("comentarios_valorativos_selected".to_string(), Value::Array(selected));
    }
}

/// Resolves the exact decimal behind a formatted field, preferring derived
/// results over the context's JSON rendering.
fn formatted_operand(
    context: &Map<String, Value>,
    derived: &BTreeMap<FieldId, DerivedValue>,
    field_id: &FieldId,
) -> Option<BigDecimal> {
    if let Some(value) = derived.get(field_id) {
        return Some(value.as_decimal());
    }
    context.get(field_id.as_str()).and_then(decimal_from_value)
}
