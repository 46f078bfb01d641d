// crates/informe-config/src/pack.rs
// ============================================================================
// Module: Informe Pack Loading
// Description: Strict, fail-closed loading of YAML rule packs.
// Purpose: Turn a pack directory into an immutable `RulePack` with hard limits.
// Dependencies: informe-core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! A rule pack is a directory of YAML files (`manifest.yaml`,
//! `fields.yaml`, `logic.yaml`, ...). Loading is strict and fail-closed:
//! oversized files, non-UTF-8 content, overlong paths, and malformed YAML
//! all refuse to load rather than degrade. Missing optional sections
//! default to empty; the required-file list is enforced up front.
//!
//! Security posture: pack files are untrusted input. Size and path limits
//! bound resource use, and the condition parser inside `informe-core`
//! rejects operators outside the allowlist during deserialization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Component;
use std::path::Path;

use informe_core::ComentarioDef;
use informe_core::Decision;
use informe_core::DerivedFieldDef;
use informe_core::FieldDef;
use informe_core::FieldId;
use informe_core::FormattingSpec;
use informe_core::PluginId;
use informe_core::Rule;
use informe_core::RuleId;
use informe_core::RulePack;
use informe_core::TableDef;
use informe_core::TableKey;
use informe_core::TextBlockDef;
use informe_core::TextKey;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum pack file size in bytes.
pub(crate) const MAX_PACK_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Pack manifest filename (presence marks a directory as a pack).
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Files every pack must provide.
pub const REQUIRED_PACK_FILES: &[&str] = &[
    "manifest.yaml",
    "fields.yaml",
    "texts.yaml",
    "tables.yaml",
    "logic.yaml",
    "decision_map.yaml",
    "derived.yaml",
    "formatting.yaml",
];

/// Optional pack file carrying evaluative-comment definitions.
pub const COMENTARIOS_FILE: &str = "comentarios_valorativos.yaml";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading a pack.
///
/// # Invariants
/// - Variants are stable for programmatic handling; messages carry the
///   offending file name for operator diagnostics.
#[derive(Debug, Error)]
pub enum PackError {
    /// Pack directory does not exist.
    #[error("pack directory not found: {path}")]
    NotFound {
        /// The missing directory path.
        path: String,
    },
    /// A required pack file is absent.
    #[error("required pack file missing: {file}")]
    MissingFile {
        /// The missing file name.
        file: String,
    },
    /// Filesystem read failure.
    #[error("io error reading {file}: {detail}")]
    Io {
        /// File being read.
        file: String,
        /// Underlying error text.
        detail: String,
    },
    /// A guard limit or encoding requirement was violated.
    #[error("{detail}")]
    Invalid {
        /// Guard violation description.
        detail: String,
    },
    /// YAML parsing or schema mismatch.
    #[error("failed to parse {file}: {detail}")]
    Parse {
        /// File being parsed.
        file: String,
        /// Underlying parse error text.
        detail: String,
    },
}

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// `manifest.yaml` wire shape.
#[derive(Debug, Deserialize, Default)]
struct ManifestFile {
    /// Pack identifier.
    #[serde(default)]
    plugin_id: PluginId,
    /// Fields masked in audit output.
    #[serde(default)]
    sensitive_fields: Vec<FieldId>,
}

/// `fields.yaml` wire shape.
#[derive(Debug, Deserialize, Default)]
struct FieldsFile {
    /// Field definitions keyed by field id.
    #[serde(default)]
    fields: BTreeMap<FieldId, FieldDef>,
}

/// `texts.yaml` wire shape.
#[derive(Debug, Deserialize, Default)]
struct TextsFile {
    /// Text blocks keyed by text key.
    #[serde(default)]
    texts: BTreeMap<TextKey, TextBlockDef>,
    /// Fixed lists passed through to the template layer.
    #[serde(default)]
    fixed_lists: Value,
}

/// `tables.yaml` wire shape.
#[derive(Debug, Deserialize, Default)]
struct TablesFile {
    /// Tables keyed by table key.
    #[serde(default)]
    tables: BTreeMap<TableKey, TableDef>,
}

/// `logic.yaml` wire shape.
#[derive(Debug, Deserialize, Default)]
struct LogicFile {
    /// Rules keyed by rule id.
    #[serde(default)]
    rules: BTreeMap<RuleId, Rule>,
}

/// `decision_map.yaml` wire shape.
#[derive(Debug, Deserialize, Default)]
struct DecisionMapFile {
    /// Decisions in declaration order.
    #[serde(default)]
    decisions: Vec<Decision>,
}

/// `derived.yaml` wire shape.
#[derive(Debug, Deserialize, Default)]
struct DerivedFile {
    /// Derived-field declarations keyed by field id.
    #[serde(default)]
    derived_fields: BTreeMap<FieldId, DerivedFieldDef>,
}

/// `comentarios_valorativos.yaml` wire shape.
#[derive(Debug, Deserialize, Default)]
struct ComentariosFile {
    /// Evaluative-comment definitions keyed by slot field id.
    #[serde(default)]
    comentarios_valorativos: BTreeMap<FieldId, ComentarioDef>,
}

// ============================================================================
// SECTION: Pack Loading
// ============================================================================

/// Loads a rule pack from a directory.
///
/// # Errors
///
/// Returns [`PackError`] when the directory or a required file is missing,
/// a guard limit is violated, or any file fails to parse.
pub fn load_pack(dir: &Path) -> Result<RulePack, PackError> {
    validate_pack_path(dir)?;
    if !dir.is_dir() {
        return Err(PackError::NotFound {
            path: dir.display().to_string(),
        });
    }

    for file in REQUIRED_PACK_FILES {
        if !dir.join(file).is_file() {
            return Err(PackError::MissingFile {
                file: (*file).to_string(),
            });
        }
    }

    let manifest: ManifestFile = load_file(dir, MANIFEST_FILE)?;
    let fields: FieldsFile = load_file(dir, "fields.yaml")?;
    let texts: TextsFile = load_file(dir, "texts.yaml")?;
    let tables: TablesFile = load_file(dir, "tables.yaml")?;
    let logic: LogicFile = load_file(dir, "logic.yaml")?;
    let decision_map: DecisionMapFile = load_file(dir, "decision_map.yaml")?;
    let derived: DerivedFile = load_file(dir, "derived.yaml")?;
    let formatting: FormattingSpec = load_file(dir, "formatting.yaml")?;
    let comentarios: ComentariosFile = load_optional_file(dir, COMENTARIOS_FILE)?;

    let mut rules = logic.rules;
    for (rule_id, rule) in &mut rules {
        if rule.rule_id.as_str().is_empty() {
            rule.rule_id = rule_id.clone();
        }
    }

    // A manifest without an explicit id falls back to the directory name.
    let plugin_id = if manifest.plugin_id.as_str().is_empty() {
        PluginId::new(dir.file_name().map_or_else(String::new, |name| {
            name.to_string_lossy().into_owned()
        }))
    } else {
        manifest.plugin_id
    };

    Ok(RulePack {
        plugin_id,
        fields: fields.fields,
        texts: texts.texts,
        fixed_lists: texts.fixed_lists,
        tables: tables.tables,
        rules,
        decisions: decision_map.decisions,
        derived: derived.derived_fields,
        formatting,
        sensitive_fields: manifest.sensitive_fields,
        comentarios: comentarios.comentarios_valorativos,
    })
}

/// Loads and parses a required pack file.
fn load_file<T>(dir: &Path, file: &str) -> Result<T, PackError>
where
    T: DeserializeOwned + Default,
{
    let content = read_pack_file(dir, file)?;
    parse_yaml(file, &content)
}

/// Loads and parses an optional pack file, defaulting when absent.
fn load_optional_file<T>(dir: &Path, file: &str) -> Result<T, PackError>
where
    T: DeserializeOwned + Default,
{
    if !dir.join(file).is_file() {
        return Ok(T::default());
    }
    load_file(dir, file)
}

/// Reads a pack file with size and encoding guards.
pub(crate) fn read_pack_file(dir: &Path, file: &str) -> Result<String, PackError> {
    let path = dir.join(file);
    validate_pack_path(&path)?;

    let bytes = fs::read(&path).map_err(|err| PackError::Io {
        file: file.to_string(),
        detail: err.to_string(),
    })?;
    if bytes.len() > MAX_PACK_FILE_SIZE {
        return Err(PackError::Invalid {
            detail: format!("pack file exceeds size limit: {file}"),
        });
    }
    String::from_utf8(bytes).map_err(|_| PackError::Invalid {
        detail: format!("pack file must be utf-8: {file}"),
    })
}

/// Parses YAML content, treating an empty document as the default shape.
pub(crate) fn parse_yaml<T>(file: &str, content: &str) -> Result<T, PackError>
where
    T: DeserializeOwned + Default,
{
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(content).map_err(|err| PackError::Parse {
        file: file.to_string(),
        detail: err.to_string(),
    })
}

/// Validates path length guards before touching the filesystem.
pub(crate) fn validate_pack_path(path: &Path) -> Result<(), PackError> {
    let rendered = path.display().to_string();
    if rendered.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(PackError::Invalid {
            detail: "pack path exceeds max length".to_string(),
        });
    }
    for component in path.components() {
        if let Component::Normal(part) = component
            && part.len() > MAX_PATH_COMPONENT_LENGTH
        {
            return Err(PackError::Invalid {
                detail: "pack path component too long".to_string(),
            });
        }
    }
    Ok(())
}
