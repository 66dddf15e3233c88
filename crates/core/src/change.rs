//! Change analysis: classify each discovered file against the previous
//! ledger as `new | changed | unchanged | deleted`.

use crate::fsutil;
use crate::model::{DiscoveredFile, FileHashEntry};
use rayon::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    New,
    Changed,
    Unchanged,
    Deleted,
}

#[derive(Debug, Clone)]
pub struct ChangeEntry {
    pub rel_path: String,
    pub verdict: Verdict,
    /// Fresh hash, computed whenever the file still exists (i.e. not `Deleted`).
    pub hash: Option<String>,
}

/// Compare `discovered` files against the `previous` ledger.
///
/// When `force` is set every discovered file is classified `New` regardless of
/// the previous ledger (a full re-index), matching builder orchestration step 6.
pub fn classify(
    discovered: &[DiscoveredFile],
    previous: &BTreeMap<String, FileHashEntry>,
    force: bool,
) -> Vec<ChangeEntry> {
    let mut entries: Vec<ChangeEntry> = discovered
        .par_iter()
        .map(|file| classify_one(file, previous, force))
        .collect();

    let discovered_paths: std::collections::HashSet<&str> =
        discovered.iter().map(|f| f.rel_path.as_str()).collect();
    for (path, _) in previous {
        if !discovered_paths.contains(path.as_str()) {
            entries.push(ChangeEntry { rel_path: path.clone(), verdict: Verdict::Deleted, hash: None });
        }
    }

    entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    entries
}

fn classify_one(file: &DiscoveredFile, previous: &BTreeMap<String, FileHashEntry>, force: bool) -> ChangeEntry {
    let Some(prior) = (if force { None } else { previous.get(&file.rel_path) }) else {
        let hash = fsutil::hash_file(&file.abs_path).ok();
        return ChangeEntry { rel_path: file.rel_path.clone(), verdict: Verdict::New, hash };
    };

    if prior.mtime == file.mtime && prior.size == file.size {
        return ChangeEntry {
            rel_path: file.rel_path.clone(),
            verdict: Verdict::Unchanged,
            hash: Some(prior.hash.clone()),
        };
    }

    match fsutil::hash_file(&file.abs_path) {
        Ok(hash) if hash == prior.hash => {
            ChangeEntry { rel_path: file.rel_path.clone(), verdict: Verdict::Unchanged, hash: Some(hash) }
        }
        Ok(hash) => ChangeEntry { rel_path: file.rel_path.clone(), verdict: Verdict::Changed, hash: Some(hash) },
        Err(_) => ChangeEntry { rel_path: file.rel_path.clone(), verdict: Verdict::Changed, hash: None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(rel: &str, abs: PathBuf, size: u64, mtime: &str) -> DiscoveredFile {
        DiscoveredFile { rel_path: rel.to_string(), abs_path: abs, size, mtime: mtime.to_string() }
    }

    #[test]
    fn new_file_with_no_prior_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rs");
        std::fs::write(&path, "fn a() {}").unwrap();
        let discovered = vec![file("a.rs", path, 9, "2024-01-01T00:00:00Z")];
        let entries = classify(&discovered, &BTreeMap::new(), false);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].verdict, Verdict::New);
    }

    #[test]
    fn unchanged_via_quick_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rs");
        std::fs::write(&path, "fn a() {}").unwrap();
        let discovered = vec![file("a.rs", path.clone(), 9, "2024-01-01T00:00:00Z")];
        let mut prev = BTreeMap::new();
        let hash = fsutil::hash_file(&path).unwrap();
        prev.insert("a.rs".to_string(), FileHashEntry { hash, mtime: "2024-01-01T00:00:00Z".to_string(), size: 9 });
        let entries = classify(&discovered, &prev, false);
        assert_eq!(entries[0].verdict, Verdict::Unchanged);
    }

    #[test]
    fn stat_drift_but_same_hash_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rs");
        std::fs::write(&path, "fn a() {}").unwrap();
        let hash = fsutil::hash_file(&path).unwrap();
        let discovered = vec![file("a.rs", path, 9, "2024-02-02T00:00:00Z")];
        let mut prev = BTreeMap::new();
        prev.insert("a.rs".to_string(), FileHashEntry { hash, mtime: "2024-01-01T00:00:00Z".to_string(), size: 9 });
        let entries = classify(&discovered, &prev, false);
        assert_eq!(entries[0].verdict, Verdict::Unchanged);
    }

    #[test]
    fn content_change_is_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rs");
        std::fs::write(&path, "fn a() { 1 }").unwrap();
        let discovered = vec![file("a.rs", path, 12, "2024-02-02T00:00:00Z")];
        let mut prev = BTreeMap::new();
        prev.insert(
            "a.rs".to_string(),
            FileHashEntry { hash: "sha256:deadbeef".to_string(), mtime: "2024-01-01T00:00:00Z".to_string(), size: 9 },
        );
        let entries = classify(&discovered, &prev, false);
        assert_eq!(entries[0].verdict, Verdict::Changed);
    }

    #[test]
    fn missing_from_discovery_is_deleted() {
        let mut prev = BTreeMap::new();
        prev.insert(
            "gone.rs".to_string(),
            FileHashEntry { hash: "sha256:deadbeef".to_string(), mtime: "2024-01-01T00:00:00Z".to_string(), size: 9 },
        );
        let entries = classify(&[], &prev, false);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].verdict, Verdict::Deleted);
    }

    #[test]
    fn force_marks_everything_new() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rs");
        std::fs::write(&path, "fn a() {}").unwrap();
        let hash = fsutil::hash_file(&path).unwrap();
        let discovered = vec![file("a.rs", path, 9, "2024-01-01T00:00:00Z")];
        let mut prev = BTreeMap::new();
        prev.insert("a.rs".to_string(), FileHashEntry { hash, mtime: "2024-01-01T00:00:00Z".to_string(), size: 9 });
        let entries = classify(&discovered, &prev, true);
        assert_eq!(entries[0].verdict, Verdict::New);
    }
}
