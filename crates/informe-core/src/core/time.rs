// crates/informe-core/src/core/time.rs
// ============================================================================
// Module: Informe Time Model
// Description: Caller-supplied timestamps and fiscal-date parsing.
// Purpose: Keep evaluation deterministic by never reading wall-clock time in the core.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! The core never reads wall-clock time; hosts supply explicit [`Timestamp`]
//! values for audit records so replays are deterministic. Fiscal dates
//! travel as `YYYY-MM-DD` strings and are parsed here with the `time`
//! crate's calendar validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::Month;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp embedded in audit records.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads
///   wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns a stable textual rendering for digest derivation.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::UnixMillis(value) => format!("unix_millis:{value}"),
            Self::Logical(value) => format!("logical:{value}"),
        }
    }
}

// ============================================================================
// SECTION: Fiscal Dates
// ============================================================================

/// Parses a `YYYY-MM-DD` date string with calendar validation.
///
/// Returns `None` for any other shape; absence of a parseable date is a
/// data condition, not an error.
#[must_use]
pub fn parse_iso_date(value: &str) -> Option<Date> {
    let mut parts = value.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Renders a date in canonical `YYYY-MM-DD` form.
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}
