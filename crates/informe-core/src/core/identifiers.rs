// crates/informe-core/src/core/identifiers.rs
// ============================================================================
// Module: Informe Identifiers
// Description: Canonical opaque identifiers for rule packs and audit records.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Informe.
//! Identifiers are opaque UTF-8 strings that serialize transparently on the
//! wire. They are ordered and hashable so they can key deterministic
//! (`BTreeMap`-backed) collections.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares an opaque string identifier newtype with stable wire form.
macro_rules! string_identifier {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        ///
        /// # Invariants
        /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

string_identifier! {
    /// Rule-pack (plugin) identifier, e.g. `pt_review`.
    PluginId
}

string_identifier! {
    /// Rule identifier within a rule pack's logic definitions.
    RuleId
}

string_identifier! {
    /// Decision identifier grouping rules for audit traces.
    DecisionId
}

string_identifier! {
    /// Field identifier for input, derived, and validation definitions.
    FieldId
}

string_identifier! {
    /// Text-block key addressed by `include_text` actions and `text:` visibility.
    TextKey
}

string_identifier! {
    /// Table key addressed by `include_table` actions and `table:` visibility.
    TableKey
}

string_identifier! {
    /// Document-element identifier addressed by `include_block` actions.
    ElementId
}

string_identifier! {
    /// Audit trace identifier derived from the request's input digest.
    TraceId
}
