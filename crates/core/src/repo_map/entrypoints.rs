//! Entrypoint detection: basename-matched executables, modules, and libraries.

use crate::model::{Entrypoint, EntrypointType};

const EXECUTABLE_NAMES: &[&str] = &["main.ts", "main.js", "main.mjs", "main.go", "main.rs", "main.py"];
const MODULE_NAMES: &[&str] = &["index.ts", "index.js", "index.mjs", "index.py", "mod.rs", "__init__.py"];
const LIBRARY_NAMES: &[&str] = &["lib.ts", "lib.js", "lib.rs"];

fn classify(basename: &str) -> Option<EntrypointType> {
    if EXECUTABLE_NAMES.contains(&basename) {
        Some(EntrypointType::Executable)
    } else if MODULE_NAMES.contains(&basename) {
        Some(EntrypointType::Module)
    } else if LIBRARY_NAMES.contains(&basename) {
        Some(EntrypointType::Library)
    } else {
        None
    }
}

/// Entrypoints among files directly inside `module_dir` (no descent). `rel_paths`
/// is the full repo file list; `module_dir` is `"."` for the root module.
pub fn detect(module_dir: &str, rel_paths: &[String]) -> Vec<Entrypoint> {
    let mut out = Vec::new();
    for rel in rel_paths {
        let Some(parent) = parent_dir(rel) else { continue };
        if parent != module_dir {
            continue;
        }
        let basename = rel.rsplit('/').next().unwrap_or(rel);
        if let Some(kind) = classify(basename) {
            out.push(Entrypoint { path: rel.clone(), kind, description: None });
        }
    }

    if module_dir == "." {
        for rel in rel_paths {
            if rel.starts_with("bin/") && !out.iter().any(|e| e.path == *rel) {
                out.push(Entrypoint { path: rel.clone(), kind: EntrypointType::Executable, description: None });
            }
        }
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

fn parent_dir(rel: &str) -> Option<String> {
    match rel.rsplit_once('/') {
        Some((dir, _)) => Some(dir.to_string()),
        None => Some(".".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_root_level_entrypoints() {
        let files = vec!["main.rs".to_string(), "lib.rs".to_string(), "other.rs".to_string()];
        let eps = detect(".", &files);
        assert_eq!(eps.len(), 2);
        assert!(eps.iter().any(|e| e.path == "main.rs" && e.kind == EntrypointType::Executable));
        assert!(eps.iter().any(|e| e.path == "lib.rs" && e.kind == EntrypointType::Library));
    }

    #[test]
    fn does_not_descend_into_subdirectories() {
        let files = vec!["src/main.rs".to_string()];
        let eps = detect(".", &files);
        assert!(eps.is_empty());
        let eps = detect("src", &files);
        assert_eq!(eps.len(), 1);
    }

    #[test]
    fn bin_files_promoted_to_executable_at_root_only() {
        let files = vec!["bin/tool.rs".to_string()];
        let eps = detect(".", &files);
        assert_eq!(eps[0].kind, EntrypointType::Executable);
    }
}
