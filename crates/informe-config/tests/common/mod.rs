// crates/informe-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Support
// Description: Shared helpers building pack directories for tests.
// Purpose: Keep pack fixtures consistent across load and validation tests.
// ============================================================================

//! Shared pack fixtures for informe-config tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    dead_code,
    reason = "Test-only helpers; not every test file uses every helper."
)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Contents of a minimal, fully valid pack, keyed by file name.
pub fn minimal_pack_files() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "manifest.yaml",
            "plugin_id: pt_review\nsensitive_fields:\n  - denominacion\n",
        ),
        (
            "fields.yaml",
            concat!(
                "fields:\n",
                "  denominacion:\n",
                "    type: text\n",
                "    required: true\n",
                "    label: Denominación social\n",
                "  master_file:\n",
                "    type: int\n",
                "    required: false\n",
                "    label: Master file\n",
                "  cifra_1:\n",
                "    type: currency\n",
                "    label: Cifra de negocio\n",
                "  ebit_1:\n",
                "    type: currency\n",
                "    label: EBIT\n",
            ),
        ),
        (
            "texts.yaml",
            concat!(
                "texts:\n",
                "  s1_master_file_no_access:\n",
                "    text: Sin acceso al master file.\n",
                "    source_block_ids:\n",
                "      - blk_001\n",
                "  s2_intro:\n",
                "    text: Introducción.\n",
                "    condition: master_file == 1\n",
                "    source_block_ids:\n",
                "      - blk_002\n",
            ),
        ),
        (
            "tables.yaml",
            concat!(
                "tables:\n",
                "  financials:\n",
                "    title: Cifras principales\n",
                "    rows:\n",
                "      - fields:\n",
                "          - cifra_1\n",
                "          - ebit_1\n",
            ),
        ),
        (
            "logic.yaml",
            concat!(
                "rules:\n",
                "  RULE_S1_NO_ACCESS:\n",
                "    name: Master file access warning\n",
                "    condition:\n",
                "      operator: equals\n",
                "      field: master_file\n",
                "      value: 0\n",
                "    action:\n",
                "      type: include_text\n",
                "      text_key: s1_master_file_no_access\n",
                "    source_block_ids:\n",
                "      - blk_001\n",
            ),
        ),
        (
            "decision_map.yaml",
            concat!(
                "decisions:\n",
                "  - decision_id: DEC_S1\n",
                "    name: Section 1 access\n",
                "    rules:\n",
                "      - RULE_S1_NO_ACCESS\n",
            ),
        ),
        (
            "derived.yaml",
            concat!(
                "derived_fields:\n",
                "  om_1:\n",
                "    formula: operating_margin\n",
                "    type: percentage\n",
                "    dependencies:\n",
                "      - ebit_1\n",
                "      - cifra_1\n",
            ),
        ),
        (
            "formatting.yaml",
            concat!(
                "currency_fields:\n",
                "  - cifra_1\n",
                "percentage_fields:\n",
                "  - om_1\n",
            ),
        ),
    ]
}

/// Writes the minimal pack into `dir`.
pub fn write_minimal_pack(dir: &Path) {
    fs::create_dir_all(dir).expect("pack dir should be creatable");
    for (file, content) in minimal_pack_files() {
        fs::write(dir.join(file), content).expect("pack file should be writable");
    }
}

/// Writes the minimal pack with one file's content replaced.
pub fn write_pack_with_override(dir: &Path, file: &str, content: &str) {
    write_minimal_pack(dir);
    fs::write(dir.join(file), content).expect("override file should be writable");
}

/// Creates a pack directory under a root and returns its path.
pub fn pack_dir(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    write_minimal_pack(&dir);
    dir
}
