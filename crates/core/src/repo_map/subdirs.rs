//! Subdirectory detection and scoring within a non-root module.

use crate::fsutil::language_of;
use crate::model::{DiscoveredFile, SubDirectory};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const IMPORTANT_NAMES: &[&str] = &[
    "components", "lib", "hooks", "utils", "services", "handlers", "actions", "api", "store", "data", "types",
    "models", "views", "controllers", "middleware", "routes", "pages", "features", "modules", "core", "common",
    "shared",
];

struct Candidate {
    path: String,
    basename: String,
    depth: usize,
    total_files: usize,
    recursive_code: usize,
    direct_code: usize,
    important: bool,
}

fn basename_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn strip_module_prefix<'a>(rel: &'a str, module_dir: &str) -> Option<&'a str> {
    if module_dir == "." {
        Some(rel)
    } else {
        rel.strip_prefix(module_dir).and_then(|s| s.strip_prefix('/'))
    }
}

fn is_under_other_module(dir_path: &str, module_dir: &str, all_modules: &[String]) -> bool {
    all_modules.iter().any(|m| {
        m != module_dir && m != "." && (dir_path == m || dir_path.starts_with(&format!("{m}/")))
    })
}

/// Select and score up to 10 subdirectories of `module_dir`.
pub fn detect(module_dir: &str, all_modules: &[String], files: &[DiscoveredFile]) -> Vec<SubDirectory> {
    let mut dirs: BTreeSet<String> = BTreeSet::new();
    for f in files {
        let Some(within_module) = strip_module_prefix(&f.rel_path, module_dir) else { continue };
        let Some((dir, _)) = within_module.rsplit_once('/') else { continue };
        let mut prefix = String::new();
        for (i, seg) in dir.split('/').enumerate() {
            if i >= 3 {
                break;
            }
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(seg);
            let full = if module_dir == "." { prefix.clone() } else { format!("{module_dir}/{prefix}") };
            dirs.insert(full);
        }
    }
    dirs.retain(|d| !is_under_other_module(d, module_dir, all_modules));

    let mut candidates: BTreeMap<String, Candidate> = BTreeMap::new();
    for dir in &dirs {
        let within = strip_module_prefix(dir, module_dir).unwrap_or(dir);
        let depth = within.split('/').count();
        let total_files = files.iter().filter(|f| f.rel_path.starts_with(&format!("{dir}/"))).count();
        let recursive_code = files
            .iter()
            .filter(|f| f.rel_path.starts_with(&format!("{dir}/")) && language_of(Path::new(&f.rel_path)).is_code())
            .count();
        let direct_code = files
            .iter()
            .filter(|f| {
                f.rel_path.rsplit_once('/').map(|(p, _)| p) == Some(dir.as_str())
                    && language_of(Path::new(&f.rel_path)).is_code()
            })
            .count();
        let basename = basename_of(dir).to_string();
        let important = IMPORTANT_NAMES.contains(&basename.as_str()) || recursive_code >= 3;
        candidates.insert(
            dir.clone(),
            Candidate { path: dir.clone(), basename, depth, total_files, recursive_code, direct_code, important },
        );
    }

    // Promote children of large important parents (>= 20 code files).
    let large_parents: Vec<String> =
        candidates.values().filter(|c| c.important && c.recursive_code >= 20).map(|c| c.path.clone()).collect();
    let mut promote: Vec<String> = Vec::new();
    for parent in &large_parents {
        for c in candidates.values() {
            if c.important {
                continue;
            }
            if c.depth == candidates.get(parent).map(|p| p.depth + 1).unwrap_or(usize::MAX)
                && c.path.starts_with(&format!("{parent}/"))
                && (IMPORTANT_NAMES.contains(&c.basename.as_str()) || c.recursive_code >= 6)
            {
                promote.push(c.path.clone());
            }
        }
    }
    for p in &promote {
        if let Some(c) = candidates.get_mut(p) {
            c.important = true;
        }
    }

    // A large parent is penalized only when it has at least one important (selected) child.
    let penalized_parents: BTreeSet<String> = large_parents
        .iter()
        .filter(|parent| candidates.values().any(|c| c.important && c.path.starts_with(&format!("{parent}/"))))
        .cloned()
        .collect();

    // Specificity: drop a parent when a child is selected, unless its own direct code count >= 10.
    let mut dropped: BTreeSet<String> = BTreeSet::new();
    for c in candidates.values() {
        if !c.important {
            continue;
        }
        let prefix = format!("{}/", c.path);
        let has_important_child = candidates.values().any(|other| other.important && other.path.starts_with(&prefix));
        if has_important_child && c.direct_code < 10 {
            dropped.insert(c.path.clone());
        }
    }

    let mut scored: Vec<(&Candidate, i64)> = candidates
        .values()
        .filter(|c| c.important && !dropped.contains(&c.path))
        .map(|c| {
            let mut score = c.recursive_code as i64 + 50;
            if c.depth > 1 {
                score += 10;
            }
            if penalized_parents.contains(&c.path) {
                score -= 30;
            }
            (c, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.path.cmp(&b.0.path)));
    scored.truncate(10);

    scored
        .into_iter()
        .map(|(c, score)| SubDirectory {
            name: c.basename.clone(),
            path: c.path.clone(),
            file_count: c.total_files,
            code_file_count: c.recursive_code,
            key_files: super::keyfiles::select_for_subdir(&c.path, files, score),
            description: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn df(rel: &str) -> DiscoveredFile {
        DiscoveredFile { rel_path: rel.to_string(), abs_path: PathBuf::from(rel), size: 100, mtime: String::new() }
    }

    #[test]
    fn recognized_important_name_is_selected() {
        let files = vec![df("src/utils/a.ts"), df("src/utils/b.ts")];
        let subdirs = detect("src", &["src".to_string()], &files);
        assert!(subdirs.iter().any(|s| s.path == "src/utils"));
    }

    #[test]
    fn directory_with_three_plus_code_files_is_important() {
        let files = vec![df("src/widgets/a.ts"), df("src/widgets/b.ts"), df("src/widgets/c.ts")];
        let subdirs = detect("src", &["src".to_string()], &files);
        assert!(subdirs.iter().any(|s| s.path == "src/widgets"));
    }

    #[test]
    fn excludes_directories_under_other_modules() {
        let files = vec![df("src/pkg/a.ts"), df("src/pkg/b.ts"), df("src/pkg/c.ts")];
        let subdirs = detect("src", &["src".to_string(), "src/pkg".to_string()], &files);
        assert!(!subdirs.iter().any(|s| s.path == "src/pkg"));
    }

    #[test]
    fn caps_at_ten_subdirectories() {
        let mut files = Vec::new();
        for i in 0..15 {
            files.push(df(&format!("src/utils{i}/a.ts")));
            files.push(df(&format!("src/utils{i}/b.ts")));
            files.push(df(&format!("src/utils{i}/c.ts")));
        }
        let subdirs = detect("src", &["src".to_string()], &files);
        assert!(subdirs.len() <= 10);
    }
}
