// crates/informe-core/src/core/trace.rs
// ============================================================================
// Module: Informe Audit Trace
// Description: Generation-level audit records with canonical input digests.
// Purpose: Give hosts a persistable, masked, replay-stable audit artifact.
// Dependencies: crate::core::{identifiers, rules, time}, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! The audit record is the log: every generation request yields one
//! [`GenerationTrace`] carrying the canonical-JSON digest of its input, the
//! per-decision [`EvaluationTrace`] list, validation errors, and the names
//! of masked sensitive fields. Hosts persist the record; the core only
//! builds it. Input digests use RFC 8785 (JCS) canonicalization so the same
//! logical input always hashes identically.
//!
//! Security posture: traces must not leak sensitive field values; only
//! digests, masked previews, and field names leave the core.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::identifiers::FieldId;
use crate::core::identifiers::PluginId;
use crate::core::identifiers::TraceId;
use crate::core::rules::EvaluationTrace;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Deterministic SHA-256 content digest of canonical JSON.
///
/// # Invariants
/// - `value` is the lowercase hex encoding of the digest bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDigest {
    /// Digest algorithm identifier (always `sha256`).
    pub algorithm: String,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl InputDigest {
    /// Hashes a serializable value over its RFC 8785 canonical JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Canonicalization`] when the value cannot be
    /// canonicalized.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, TraceError> {
        let bytes =
            serde_jcs::to_vec(value).map_err(|err| TraceError::Canonicalization(err.to_string()))?;
        Ok(Self::of_bytes(&bytes))
    }

    /// Hashes raw bytes.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            algorithm: "sha256".to_string(),
            value: hex_encode(&hasher.finalize()),
        }
    }
}

/// Errors raised while building audit records.
#[derive(Debug, Error)]
pub enum TraceError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: Generation Trace
// ============================================================================

/// Number of leading hex characters kept in derived trace identifiers.
const TRACE_ID_HEX_LEN: usize = 32;

/// Complete audit record of one generation request.
///
/// # Invariants
/// - Append-only from the host's perspective; the core builds it once and
///   never mutates it afterwards.
/// - `trace_id` is a pure function of `timestamp` and `input_hash`, so
///   replaying the same request reproduces the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTrace {
    /// Trace identifier derived from timestamp and input digest.
    pub trace_id: TraceId,
    /// Pack that served the request.
    pub plugin_id: PluginId,
    /// Caller-supplied request timestamp.
    pub timestamp: Timestamp,
    /// Canonical digest of the (unmasked) input data.
    pub input_hash: InputDigest,
    /// Per-decision rule evaluation traces in evaluation order.
    pub decision_traces: Vec<EvaluationTrace>,
    /// Validation errors surfaced for the request.
    pub validation_errors: Vec<String>,
    /// Names of fields masked in any logged previews.
    pub masked_fields: Vec<FieldId>,
    /// Wall-clock duration measured by the caller, when available.
    pub duration_ms: Option<u64>,
}

impl GenerationTrace {
    /// Builds the audit record for one generation request.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] when the input data cannot be canonicalized.
    pub fn build(
        plugin_id: PluginId,
        timestamp: Timestamp,
        input: &Value,
        decision_traces: Vec<EvaluationTrace>,
        validation_errors: Vec<String>,
        masked_fields: Vec<FieldId>,
        duration_ms: Option<u64>,
    ) -> Result<Self, TraceError> {
        let input_hash = InputDigest::of(input)?;
        let trace_id = derive_trace_id(timestamp, &input_hash);
        Ok(Self {
            trace_id,
            plugin_id,
            timestamp,
            input_hash,
            decision_traces,
            validation_errors,
            masked_fields,
            duration_ms,
        })
    }
}

/// Derives a stable trace identifier from the timestamp and input digest.
fn derive_trace_id(timestamp: Timestamp, input_hash: &InputDigest) -> TraceId {
    let seed = format!("{}:{}", timestamp.render(), input_hash.value);
    let digest = InputDigest::of_bytes(seed.as_bytes());
    let short: String = digest.value.chars().take(TRACE_ID_HEX_LEN).collect();
    TraceId::new(short)
}

// ============================================================================
// SECTION: Sensitive-Field Masking
// ============================================================================

/// Number of leading characters preserved by masking.
const MASK_VISIBLE_PREFIX: usize = 2;

/// Masks sensitive fields in a data object for logging or previews.
///
/// Present, non-empty values keep their first two characters; everything
/// else in the value is replaced with `*`. Values two characters or shorter
/// become `**`. Non-object inputs are returned unchanged.
#[must_use]
pub fn mask_sensitive_data(data: &Value, sensitive_fields: &[FieldId]) -> Value {
    let Value::Object(map) = data else {
        return data.clone();
    };

    let mut masked = Map::new();
    for (key, value) in map {
        let is_sensitive = sensitive_fields.iter().any(|field| field.as_str() == key);
        if is_sensitive && !value.is_null() {
            masked.insert(key.clone(), Value::String(mask_value(value)));
        } else {
            masked.insert(key.clone(), value.clone());
        }
    }
    Value::Object(masked)
}

/// Masks a single value, preserving a two-character prefix.
fn mask_value(value: &Value) -> String {
    let rendered = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    let total = rendered.chars().count();
    if total <= MASK_VISIBLE_PREFIX {
        return "**".to_string();
    }
    let prefix: String = rendered.chars().take(MASK_VISIBLE_PREFIX).collect();
    let stars = "*".repeat(total - MASK_VISIBLE_PREFIX);
    format!("{prefix}{stars}")
}
