//! File discovery: enumerate in-scope files honoring include/exclude globs,
//! ignore-file semantics, size/count caps, and symlink policy.

use crate::config::BuildConfig;
use crate::error::BuilderError;
use crate::fsutil;
use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct DiscoveryError {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    pub files: Vec<crate::model::DiscoveredFile>,
    pub skipped: Vec<SkippedFile>,
    pub errors: Vec<DiscoveryError>,
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, globset::Error> {
    if patterns.is_empty() || patterns == ["**/*"] {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p)?);
    }
    Ok(Some(builder.build()?))
}

fn mtime_iso(meta: &std::fs::Metadata) -> String {
    let modified = meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH);
    let dt: DateTime<Utc> = modified.into();
    dt.to_rfc3339()
}

/// Enumerate eligible files under `config.repo_root`. Never aborts on a
/// per-file problem; only `TOO_MANY_FILES` is fatal.
pub fn discover(config: &BuildConfig) -> Result<DiscoveryResult, BuilderError> {
    let root = &config.repo_root;

    let include = build_globset(&config.include_globs)
        .map_err(|e| BuilderError::ConfigError { path: PathBuf::from("include_globs"), message: e.to_string() })?;
    let exclude = build_globset(&config.exclude_globs)
        .map_err(|e| BuilderError::ConfigError { path: PathBuf::from("exclude_globs"), message: e.to_string() })?;

    let mut walker = WalkBuilder::new(root);
    walker
        .hidden(false)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .ignore(config.respect_gitignore)
        .parents(config.respect_gitignore)
        .follow_links(false)
        .threads(std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));

    let ark_dir_name = config.ark_dir.split('/').next().unwrap_or(".ark").to_string();
    walker.filter_entry(move |entry| {
        let name = entry.file_name().to_string_lossy();
        if entry.depth() > 0 && (name == ".git" || name == ark_dir_name) {
            return false;
        }
        true
    });

    let candidates: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());
    walker.build_parallel().run(|| {
        Box::new(|entry| {
            if let Ok(entry) = entry {
                if entry.file_type().map(|t| t.is_file() || t.is_symlink()).unwrap_or(false) {
                    candidates.lock().unwrap().push(entry.into_path());
                }
            }
            ignore::WalkState::Continue
        })
    });

    let mut candidates = candidates.into_inner().unwrap();
    candidates.sort();

    debug!(candidates = candidates.len(), max_files = config.max_files, "walked candidate files");
    if candidates.len() > config.max_files {
        return Err(BuilderError::TooManyFiles);
    }

    let mut result = DiscoveryResult::default();
    for abs_path in candidates {
        let Some(rel) = fsutil::relativize(&abs_path, root) else { continue };
        let rel = fsutil::to_forward_slashes(&rel);

        if let Some(ex) = &exclude {
            if ex.is_match(&rel) {
                continue;
            }
        }
        if let Some(inc) = &include {
            if !inc.is_match(&rel) {
                continue;
            }
        }

        if fsutil::is_symlink(&abs_path) {
            if !config.follow_symlinks {
                result.skipped.push(SkippedFile { path: rel.clone(), reason: "symlink not followed".to_string() });
                continue;
            }
            match std::fs::canonicalize(&abs_path) {
                Ok(target) => {
                    let root_canon = std::fs::canonicalize(root).unwrap_or_else(|_| root.clone());
                    if !target.starts_with(&root_canon) {
                        result.skipped.push(SkippedFile {
                            path: rel.clone(),
                            reason: "symlink target outside repo root".to_string(),
                        });
                        continue;
                    }
                }
                Err(e) => {
                    result.skipped.push(SkippedFile { path: rel.clone(), reason: format!("broken symlink: {e}") });
                    continue;
                }
            }
        }

        let meta = match std::fs::metadata(&abs_path) {
            Ok(m) => m,
            Err(e) => {
                result.errors.push(DiscoveryError { path: rel.clone(), error: e.to_string() });
                continue;
            }
        };

        let size_kb = fsutil::size_kb(meta.len());
        if size_kb > config.max_file_kb {
            result.skipped.push(SkippedFile {
                path: rel.clone(),
                reason: format!("exceeds max_file_kb ({size_kb} > {})", config.max_file_kb),
            });
            continue;
        }

        if !fsutil::within_root(&rel, root) {
            result.skipped.push(SkippedFile { path: rel.clone(), reason: "resolved outside repo root".to_string() });
            continue;
        }

        result.files.push(crate::model::DiscoveredFile {
            rel_path: rel,
            abs_path,
            size: meta.len(),
            mtime: mtime_iso(&meta),
        });
    }

    result.files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(result)
}

pub fn is_always_excluded(rel: &Path, ark_dir_name: &str) -> bool {
    rel.components().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        s == ".git" || s == ark_dir_name
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;

    fn cfg(root: &Path) -> BuildConfig {
        BuildConfig { repo_root: root.to_path_buf(), ..BuildConfig::default() }
    }

    #[test]
    fn discovers_plain_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.rs"), "fn b() {}").unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        let result = discover(&cfg(dir.path())).unwrap();
        let paths: Vec<_> = result.files.iter().map(|f| f.rel_path.clone()).collect();
        assert_eq!(paths, vec!["a.rs".to_string(), "b.rs".to_string()]);
    }

    #[test]
    fn excludes_git_and_ark_dirs_always() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        std::fs::create_dir_all(dir.path().join(".ark/index")).unwrap();
        std::fs::write(dir.path().join(".ark/index/meta.json"), "{}").unwrap();
        std::fs::write(dir.path().join("real.rs"), "fn x() {}").unwrap();
        let result = discover(&cfg(dir.path())).unwrap();
        let paths: Vec<_> = result.files.iter().map(|f| f.rel_path.clone()).collect();
        assert_eq!(paths, vec!["real.rs".to_string()]);
    }

    #[test]
    fn oversize_file_is_skipped_with_reason() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.txt"), vec![b'x'; 2048]).unwrap();
        let mut c = cfg(dir.path());
        c.max_file_kb = 1;
        let result = discover(&c).unwrap();
        assert!(result.files.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].reason.contains("max_file_kb"));
    }

    #[test]
    fn too_many_files_fails() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            std::fs::write(dir.path().join(format!("f{i}.txt")), "x").unwrap();
        }
        let mut c = cfg(dir.path());
        c.max_files = 3;
        let err = discover(&c).unwrap_err();
        assert!(matches!(err, BuilderError::TooManyFiles));
    }

    #[test]
    fn exclude_globs_filter_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("keep.rs"), "x").unwrap();
        std::fs::write(dir.path().join("drop.generated.rs"), "x").unwrap();
        let mut c = cfg(dir.path());
        c.exclude_globs = vec!["**/*.generated.rs".to_string()];
        let result = discover(&c).unwrap();
        let paths: Vec<_> = result.files.iter().map(|f| f.rel_path.clone()).collect();
        assert_eq!(paths, vec!["keep.rs".to_string()]);
    }
}
