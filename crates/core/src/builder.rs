//! Build orchestration: the pipeline that turns a repository tree into the
//! `.ark/index/*` artifact set.

use crate::change::{self, Verdict};
use crate::config::BuildConfig;
use crate::error::{BuilderError, ErrorPayload, Warning};
use crate::fsutil::language_of;
use crate::model::{
    BuildStats, BuildStatus, ConfigSnapshot, FileHashes, IndexMeta, Symbol,
};
use crate::symbols::{self, Adapter};
use crate::{git, ledger, repo_map, test_map, writer};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of [`build_index`]: mirrors the contract callers build tooling around.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub success: bool,
    pub error: Option<ErrorPayload>,
    pub stats: BuildStats,
    pub warnings: Vec<Warning>,
}

impl BuildOutcome {
    fn fatal(err: &BuilderError) -> Self {
        BuildOutcome { success: false, error: Some(err.into()), stats: BuildStats::default(), warnings: Vec::new() }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

fn load_previous_symbols(ark_dir: &Path) -> Vec<Symbol> {
    let Ok(text) = std::fs::read_to_string(ark_dir.join("symbols.jsonl")) else { return Vec::new() };
    text.lines().filter_map(|line| serde_json::from_str(line).ok()).collect()
}

/// `adapters_available` is the configured/available adapter set (not which
/// ones actually fired on some file) so that a no-op rerun with the same
/// adapters configured compares equal to the previous snapshot.
fn config_snapshot(config: &BuildConfig, adapters_available: &[String]) -> ConfigSnapshot {
    ConfigSnapshot {
        include_globs: config.include_globs.clone(),
        exclude_globs: config.exclude_globs.clone(),
        max_file_kb: config.max_file_kb,
        max_files: config.max_files,
        respect_gitignore: config.respect_gitignore,
        follow_symlinks: config.follow_symlinks,
        adapters_used: adapters_available.to_vec(),
    }
}

/// `true` if the relevant discovery/extraction-affecting settings differ from
/// the previous run, which forces a full reindex regardless of the ledger.
/// `configured_adapters` must be the same "available adapter set" quantity
/// stored in `previous.adapters_used` by [`config_snapshot`], not the subset
/// that actually fired on some file.
fn config_changed(config: &BuildConfig, configured_adapters: &[String], previous: &ConfigSnapshot) -> bool {
    let mut current_include = config.include_globs.clone();
    let mut previous_include = previous.include_globs.clone();
    current_include.sort();
    previous_include.sort();

    let mut current_exclude = config.exclude_globs.clone();
    let mut previous_exclude = previous.exclude_globs.clone();
    current_exclude.sort();
    previous_exclude.sort();

    let mut current_adapters = configured_adapters.to_vec();
    let mut previous_adapters = previous.adapters_used.clone();
    current_adapters.sort();
    previous_adapters.sort();

    current_include != previous_include
        || current_exclude != previous_exclude
        || config.max_file_kb != previous.max_file_kb
        || config.respect_gitignore != previous.respect_gitignore
        || config.follow_symlinks != previous.follow_symlinks
        || current_adapters != previous_adapters
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Run the full build pipeline. `adapters` are tried, in order, ahead of the
/// regex baseline for every changed or new file.
pub fn build_index(config: &BuildConfig, adapters: &[Box<dyn Adapter>]) -> BuildOutcome {
    let ark_path = config.repo_root.join(&config.ark_dir);

    let git_commit = git::resolve_head(&config.repo_root);

    let previous_meta: Option<IndexMeta> =
        if config.force { None } else { read_json(&ark_path.join("meta.json")) };
    let previous_ledger: Option<FileHashes> =
        if config.force { None } else { read_json(&ark_path.join("file_hashes.json")) };
    let previous_symbols = if config.force { Vec::new() } else { load_previous_symbols(&ark_path) };

    let adapter_names: Vec<String> = adapters.iter().filter(|a| a.is_available()).map(|a| a.name().to_string()).collect();
    let force_reindex = config.force
        || previous_meta.as_ref().map(|m| config_changed(config, &adapter_names, &m.config)).unwrap_or(true);

    if force_reindex {
        debug!(forced = config.force, had_previous = previous_meta.is_some(), "running a full reindex");
    }

    let discovery_result = match crate::discovery::discover(config) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "discovery failed");
            return BuildOutcome::fatal(&e);
        }
    };
    debug!(files = discovery_result.files.len(), skipped = discovery_result.skipped.len(), "discovery complete");

    let mut warnings: Vec<Warning> = discovery_result
        .skipped
        .iter()
        .map(|s| Warning::file_skipped(s.path.clone(), s.reason.clone()))
        .collect();
    for err in &discovery_result.errors {
        warnings.push(Warning { code: "ARK_INDEX_READ_ERROR".to_string(), file: Some(err.path.clone()), message: err.error.clone() });
    }

    let previous_files = previous_ledger.as_ref().map(|l| l.files.clone()).unwrap_or_default();
    let change_entries = change::classify(&discovery_result.files, &previous_files, force_reindex);

    let files_by_path: BTreeMap<&str, &crate::model::DiscoveredFile> =
        discovery_result.files.iter().map(|f| (f.rel_path.as_str(), f)).collect();
    let previous_symbols_by_file: BTreeMap<&str, Vec<Symbol>> = {
        let mut map: BTreeMap<&str, Vec<Symbol>> = BTreeMap::new();
        for s in &previous_symbols {
            map.entry(s.file.as_str()).or_default().push(s.clone());
        }
        map
    };

    let mut symbols_out = Vec::new();

    for entry in &change_entries {
        if entry.verdict == Verdict::Deleted {
            continue;
        }

        if entry.verdict == Verdict::Unchanged {
            if let Some(cached) = previous_symbols_by_file.get(entry.rel_path.as_str()) {
                symbols_out.extend(cached.iter().cloned());
                continue;
            }
        }

        let Some(file) = files_by_path.get(entry.rel_path.as_str()) else { continue };
        let language = language_of(Path::new(&file.rel_path));
        let text = match std::fs::read_to_string(&file.abs_path) {
            Ok(t) => t,
            Err(e) => {
                warnings.push(Warning::extraction_error(file.rel_path.clone(), e.to_string()));
                continue;
            }
        };

        let (extracted, _adapter_used) = symbols::extract_for_file(&file.rel_path, &text, language, adapters);
        symbols_out.extend(extracted);
    }

    let built_repo_map = repo_map::build(&config.repo_root, &discovery_result.files);
    let built_test_map = test_map::build(&discovery_result.files);
    let file_hashes = ledger::build(&change_entries, &discovery_result.files, git_commit.clone());

    let files_new = change_entries.iter().filter(|e| e.verdict == Verdict::New).count();
    let files_changed = change_entries.iter().filter(|e| e.verdict == Verdict::Changed).count();
    let files_deleted = change_entries.iter().filter(|e| e.verdict == Verdict::Deleted).count();

    let stats = BuildStats {
        total_files: file_hashes.files.len(),
        total_symbols: symbols_out.len(),
        total_tests: built_test_map.tests.len(),
        incremental: !force_reindex,
        files_changed,
        files_new,
        files_deleted,
    };

    let status = if warnings.is_empty() { BuildStatus::Success } else { BuildStatus::Partial };

    let meta = IndexMeta {
        schema_version: "1.0.0".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: now_iso(),
        repo_root: config.repo_root.display().to_string(),
        git_commit,
        status,
        stats: stats.clone(),
        config: config_snapshot(config, &adapter_names),
        warnings: warnings.clone(),
    };

    if let Err(e) = writer::write_all(&ark_path, &file_hashes, &symbols_out, &built_repo_map, &built_test_map, &meta) {
        warn!(error = %e, "failed to write artifact set");
        return BuildOutcome::fatal(&e);
    }

    info!(
        total_files = stats.total_files,
        total_symbols = stats.total_symbols,
        total_tests = stats.total_tests,
        incremental = stats.incremental,
        warnings = warnings.len(),
        "build complete"
    );
    BuildOutcome { success: true, error: None, stats, warnings }
}
