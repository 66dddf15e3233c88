//! Atomic artifact writer: serialize to `.{name}.tmp`, rename into place, in
//! the fixed order `file_hashes, symbols, repo_map, test_map, meta`.

use crate::error::BuilderError;
use crate::model::{FileHashes, IndexMeta, RepoMap, Symbol, TestMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

fn tmp_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!(".{name}.tmp"))
}

fn atomic_write(dir: &Path, name: &str, bytes: &[u8]) -> Result<(), BuilderError> {
    let tmp = tmp_path(dir, name);
    let write_result = (|| -> std::io::Result<()> {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        std::fs::rename(&tmp, dir.join(name))?;
        Ok(())
    })();

    write_result.map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        BuilderError::WriteError { file: name.to_string(), source }
    })
}

fn write_json<T: serde::Serialize>(dir: &Path, name: &str, value: &T) -> Result<(), BuilderError> {
    let text = serde_json::to_vec_pretty(value)
        .map_err(|e| BuilderError::WriteError { file: name.to_string(), source: std::io::Error::other(e) })?;
    atomic_write(dir, name, &text)
}

fn write_symbols(dir: &Path, symbols: &[Symbol]) -> Result<(), BuilderError> {
    let mut buf = Vec::new();
    for symbol in symbols {
        serde_json::to_writer(&mut buf, symbol)
            .map_err(|e| BuilderError::WriteError { file: "symbols.jsonl".to_string(), source: std::io::Error::other(e) })?;
        buf.push(b'\n');
    }
    atomic_write(dir, "symbols.jsonl", &buf)
}

/// Clean up any lingering `.*.tmp` files in `dir`, best-effort.
pub fn clean_temp_files(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') && name.ends_with(".tmp") {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Write the full artifact set in the fixed order. `meta` last: its presence
/// with `status ∈ {success, partial}` is the index-complete marker.
pub fn write_all(
    dir: &Path,
    file_hashes: &FileHashes,
    symbols: &[Symbol],
    repo_map: &RepoMap,
    test_map: &TestMap,
    meta: &IndexMeta,
) -> Result<(), BuilderError> {
    std::fs::create_dir_all(dir)
        .map_err(|source| BuilderError::WriteError { file: "(artifact dir)".to_string(), source })?;

    let result = (|| {
        write_json(dir, "file_hashes.json", file_hashes)?;
        write_symbols(dir, symbols)?;
        write_json(dir, "repo_map.json", repo_map)?;
        write_json(dir, "test_map.json", test_map)?;
        write_json(dir, "meta.json", meta)
    })();

    if let Err(e) = &result {
        warn!(error = %e, dir = %dir.display(), "artifact write failed, cleaning up temp files");
        clean_temp_files(dir);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildCommands, BuildStats, BuildStatus, ConfigSnapshot, DirectoryOverview};

    fn empty_meta() -> IndexMeta {
        IndexMeta {
            schema_version: "1.0.0".to_string(),
            tool_version: "0.1.0".to_string(),
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            repo_root: "/repo".to_string(),
            git_commit: None,
            status: BuildStatus::Success,
            stats: BuildStats::default(),
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
        }
    }

    fn empty_repo_map() -> RepoMap {
        RepoMap {
            schema_version: "1.1.0".to_string(),
            modules: vec![],
            owners: Default::default(),
            build_commands: BuildCommands::default(),
            overview: DirectoryOverview::default(),
        }
    }

    #[test]
    fn writes_all_five_artifacts_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let file_hashes = FileHashes { schema_version: "1.0.0".to_string(), git_commit: None, files: Default::default() };
        let test_map = TestMap { schema_version: "1.0.0".to_string(), tests: vec![] };
        write_all(dir.path(), &file_hashes, &[], &empty_repo_map(), &test_map, &empty_meta()).unwrap();

        for name in ["file_hashes.json", "symbols.jsonl", "repo_map.json", "test_map.json", "meta.json"] {
            assert!(dir.path().join(name).is_file(), "missing {name}");
        }
        for entry in std::fs::read_dir(dir.path()).unwrap().flatten() {
            assert!(!entry.file_name().to_string_lossy().ends_with(".tmp"));
        }
    }

    #[test]
    fn symbols_are_newline_delimited_json() {
        let dir = tempfile::tempdir().unwrap();
        let symbol = Symbol {
            symbol_id: "a.rs::f".to_string(),
            name: "f".to_string(),
            kind: crate::model::SymbolKind::Function,
            file: "a.rs".to_string(),
            span: None,
            signature: None,
            docstring_summary: None,
            visibility: crate::model::Visibility::Export,
            top_callers: vec![],
            top_callees: vec![],
            tags: vec![],
        };
        let file_hashes = FileHashes { schema_version: "1.0.0".to_string(), git_commit: None, files: Default::default() };
        let test_map = TestMap { schema_version: "1.0.0".to_string(), tests: vec![] };
        write_all(dir.path(), &file_hashes, &[symbol], &empty_repo_map(), &test_map, &empty_meta()).unwrap();

        let text = std::fs::read_to_string(dir.path().join("symbols.jsonl")).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn clean_temp_files_removes_lingering_tmp_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".meta.json.tmp"), "{}").unwrap();
        clean_temp_files(dir.path());
        assert!(!dir.path().join(".meta.json.tmp").exists());
    }
}
