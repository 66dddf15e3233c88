//! Hash ledger construction from change verdicts (feeds `file_hashes.json`).

use crate::change::{ChangeEntry, Verdict};
use crate::model::{DiscoveredFile, FileHashEntry, FileHashes};
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Build the new ledger from this build's change entries and discovered files.
/// Deleted entries are dropped; everything else carries its fresh hash and stat.
pub fn build(entries: &[ChangeEntry], files: &[DiscoveredFile], git_commit: Option<String>) -> FileHashes {
    let by_path: BTreeMap<&str, &DiscoveredFile> = files.iter().map(|f| (f.rel_path.as_str(), f)).collect();
    let mut out = BTreeMap::new();

    for entry in entries {
        if entry.verdict == Verdict::Deleted {
            continue;
        }
        let Some(hash) = &entry.hash else { continue };
        let Some(file) = by_path.get(entry.rel_path.as_str()) else { continue };
        out.insert(
            entry.rel_path.clone(),
            FileHashEntry { hash: hash.clone(), mtime: file.mtime.clone(), size: file.size },
        );
    }

    FileHashes { schema_version: SCHEMA_VERSION.to_string(), git_commit, files: out }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn df(rel: &str, size: u64, mtime: &str) -> DiscoveredFile {
        DiscoveredFile { rel_path: rel.to_string(), abs_path: PathBuf::from(rel), size, mtime: mtime.to_string() }
    }

    #[test]
    fn deleted_entries_are_dropped() {
        let entries = vec![
            ChangeEntry { rel_path: "a.rs".to_string(), verdict: Verdict::New, hash: Some("sha256:aaa".to_string()) },
            ChangeEntry { rel_path: "gone.rs".to_string(), verdict: Verdict::Deleted, hash: None },
        ];
        let files = vec![df("a.rs", 10, "2024-01-01T00:00:00Z")];
        let ledger = build(&entries, &files, None);
        assert_eq!(ledger.files.len(), 1);
        assert!(ledger.files.contains_key("a.rs"));
    }

    #[test]
    fn carries_git_commit_through() {
        let ledger = build(&[], &[], Some("deadbeef".to_string()));
        assert_eq!(ledger.git_commit.as_deref(), Some("deadbeef"));
    }
}
