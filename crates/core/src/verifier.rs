//! Offline index verification: checks an existing `.ark/index` artifact set
//! for presence, parseability, and internal consistency without touching the
//! repository tree or rebuilding anything.

use crate::model::{FileHashes, IndexMeta, RepoMap, TestMap};
use std::path::Path;

const ARTIFACT_NAMES: &[&str] =
    &["file_hashes.json", "symbols.jsonl", "repo_map.json", "test_map.json", "meta.json"];

const SUPPORTED_SCHEMA_MAJOR: &str = "1";

#[derive(Debug, Clone, Default)]
pub struct VerifyOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

fn schema_major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

fn count_symbol_lines(text: &str) -> usize {
    text.lines().filter(|l| !l.trim().is_empty()).count()
}

/// Run all checks against the artifact set under `ark_dir`.
///
/// Missing artifacts are checked first and short-circuit the rest: a
/// half-written index can't meaningfully be cross-checked for consistency.
pub fn verify_index(ark_dir: &Path) -> VerifyOutcome {
    let mut errors = Vec::new();
    let warnings = Vec::new();

    for name in ARTIFACT_NAMES {
        if !ark_dir.join(name).is_file() {
            errors.push(format!("missing artifact: {name}"));
        }
    }
    if !errors.is_empty() {
        return VerifyOutcome { valid: false, errors, warnings };
    }

    let mut warnings = warnings;

    let file_hashes_text = std::fs::read_to_string(ark_dir.join("file_hashes.json")).unwrap_or_default();
    let file_hashes: Option<FileHashes> = serde_json::from_str(&file_hashes_text).ok();
    if file_hashes.is_none() {
        errors.push("file_hashes.json is not valid JSON".to_string());
    }

    let repo_map_text = std::fs::read_to_string(ark_dir.join("repo_map.json")).unwrap_or_default();
    let repo_map: Option<RepoMap> = serde_json::from_str(&repo_map_text).ok();
    if repo_map.is_none() {
        errors.push("repo_map.json is not valid JSON".to_string());
    }

    let test_map_text = std::fs::read_to_string(ark_dir.join("test_map.json")).unwrap_or_default();
    let test_map: Option<TestMap> = serde_json::from_str(&test_map_text).ok();
    if test_map.is_none() {
        errors.push("test_map.json is not valid JSON".to_string());
    }

    let symbols_text = std::fs::read_to_string(ark_dir.join("symbols.jsonl")).unwrap_or_default();
    let mut symbol_parse_failed = false;
    for line in symbols_text.lines().filter(|l| !l.trim().is_empty()) {
        if serde_json::from_str::<crate::model::Symbol>(line).is_err() {
            symbol_parse_failed = true;
            break;
        }
    }
    if symbol_parse_failed {
        errors.push("symbols.jsonl contains an unparseable line".to_string());
    }

    let meta_text = std::fs::read_to_string(ark_dir.join("meta.json")).unwrap_or_default();
    let meta: Option<IndexMeta> = serde_json::from_str(&meta_text).ok();
    let Some(meta) = meta else {
        errors.push("meta.json is not valid JSON".to_string());
        return VerifyOutcome { valid: false, errors, warnings };
    };

    let major = schema_major(&meta.schema_version);
    if major != SUPPORTED_SCHEMA_MAJOR {
        errors.push(format!("unsupported schema version {} (expected major {})", meta.schema_version, SUPPORTED_SCHEMA_MAJOR));
    }

    if let Some(fh) = &file_hashes {
        if fh.files.len() != meta.stats.total_files {
            warnings.push(format!(
                "file_hashes.json has {} entries but meta.stats.total_files is {}",
                fh.files.len(),
                meta.stats.total_files
            ));
        }
    }

    if !symbol_parse_failed {
        let symbol_count = count_symbol_lines(&symbols_text);
        if symbol_count != meta.stats.total_symbols {
            warnings.push(format!(
                "symbols.jsonl has {symbol_count} lines but meta.stats.total_symbols is {}",
                meta.stats.total_symbols
            ));
        }
    }

    VerifyOutcome { valid: errors.is_empty(), errors, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildCommands, BuildStats, BuildStatus, ConfigSnapshot, DirectoryOverview};

    fn build_minimal_index(dir: &Path, total_files: usize, total_symbols: usize) {
        let file_hashes = FileHashes { schema_version: "1.0.0".to_string(), git_commit: None, files: Default::default() };
        let repo_map = RepoMap {
            schema_version: "1.1.0".to_string(),
            modules: vec![],
            owners: Default::default(),
            build_commands: BuildCommands::default(),
            overview: DirectoryOverview::default(),
        };
        let test_map = TestMap { schema_version: "1.0.0".to_string(), tests: vec![] };
        let meta = IndexMeta {
            schema_version: "1.0.0".to_string(),
            tool_version: "0.1.0".to_string(),
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            repo_root: dir.display().to_string(),
            git_commit: None,
            status: BuildStatus::Success,
            stats: BuildStats {
                total_files,
                total_symbols,
                total_tests: 0,
                incremental: false,
                files_changed: 0,
                files_new: total_files,
                files_deleted: 0,
            },
            config: ConfigSnapshot {
                include_globs: vec![],
                exclude_globs: vec![],
                max_file_kb: 512,
                max_files: 50_000,
                respect_gitignore: true,
                follow_symlinks: false,
                adapters_used: vec![],
            },
            warnings: vec![],
        };

        let symbols: Vec<crate::model::Symbol> = (0..total_symbols)
            .map(|i| crate::model::Symbol {
                symbol_id: format!("a.rs::f{i}"),
                name: format!("f{i}"),
                kind: crate::model::SymbolKind::Function,
                file: "a.rs".to_string(),
                span: None,
                signature: None,
                docstring_summary: None,
                visibility: crate::model::Visibility::Export,
                top_callers: vec![],
                top_callees: vec![],
                tags: vec![],
            })
            .collect();

        crate::writer::write_all(dir, &file_hashes, &symbols, &repo_map, &test_map, &meta).unwrap();
    }

    #[test]
    fn missing_artifacts_reported_and_nothing_else_checked() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = verify_index(dir.path());
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 5);
    }

    #[test]
    fn complete_consistent_index_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        build_minimal_index(dir.path(), 0, 0);
        let outcome = verify_index(dir.path());
        assert!(outcome.valid, "{:?}", outcome.errors);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn symbol_count_mismatch_is_a_warning_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        build_minimal_index(dir.path(), 0, 0);
        let text = std::fs::read_to_string(dir.path().join("symbols.jsonl")).unwrap();
        std::fs::write(
            dir.path().join("symbols.jsonl"),
            text + r#"{"symbol_id":"a.rs::x","name":"x","kind":"function","file":"a.rs","visibility":"export"}"#
                + "\n",
        )
        .unwrap();

        let outcome = verify_index(dir.path());
        assert!(outcome.valid);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn corrupt_meta_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        build_minimal_index(dir.path(), 0, 0);
        std::fs::write(dir.path().join("meta.json"), "{not json").unwrap();
        let outcome = verify_index(dir.path());
        assert!(!outcome.valid);
        assert!(outcome.errors.iter().any(|e| e.contains("meta.json")));
    }
}
