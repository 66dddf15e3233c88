//! Module inference: package-manifest-rooted modules, or top-level
//! directories with code files when no root manifest exists.

use crate::fsutil::language_of;
use std::collections::BTreeSet;
use std::path::Path;

const MANIFESTS: &[&str] = &["package.json", "Cargo.toml", "go.mod", "pyproject.toml", "setup.py"];

fn has_manifest(dir: &Path) -> bool {
    MANIFESTS.iter().any(|m| dir.join(m).is_file())
}

/// Every directory (root included, as `"."`) that is a manifest-rooted module.
fn manifest_dirs(root: &Path, rel_paths: &[String]) -> BTreeSet<String> {
    let mut dirs = BTreeSet::new();
    if has_manifest(root) {
        dirs.insert(".".to_string());
    }
    let mut seen_dirs = BTreeSet::new();
    for rel in rel_paths {
        if let Some((dir, _)) = rel.rsplit_once('/') {
            let mut prefix = String::new();
            for seg in dir.split('/') {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(seg);
                seen_dirs.insert(prefix.clone());
            }
        }
    }
    for dir in seen_dirs {
        if has_manifest(&root.join(&dir)) {
            dirs.insert(dir);
        }
    }
    dirs
}

/// Resolve the module set: sorted paths, root module first as `"."`.
pub fn infer(root: &Path, rel_paths: &[String]) -> Vec<String> {
    let manifests = manifest_dirs(root, rel_paths);
    let mut modules: BTreeSet<String> = manifests.clone();

    if !manifests.contains(".") {
        modules.insert(".".to_string());
        let mut top_levels: BTreeSet<String> = BTreeSet::new();
        for rel in rel_paths {
            if let Some((top, _)) = rel.split_once('/') {
                top_levels.insert(top.to_string());
            }
        }
        for top in top_levels {
            if modules.iter().any(|m| m == &top || top.starts_with(&format!("{m}/"))) {
                continue;
            }
            let has_code = rel_paths
                .iter()
                .filter(|r| r.starts_with(&format!("{top}/")))
                .any(|r| language_of(Path::new(r)).is_code());
            if has_code {
                modules.insert(top);
            }
        }
    }

    let mut out: Vec<String> = modules.into_iter().collect();
    out.sort_by(|a, b| if a == "." { std::cmp::Ordering::Less } else if b == "." { std::cmp::Ordering::Greater } else { a.cmp(b) });
    out
}

/// First non-heading, non-badge, non-code-fence paragraph of `README.md`,
/// whitespace-collapsed and truncated to 200 chars.
pub fn description_of(root: &Path, module_dir: &str) -> Option<String> {
    let path = if module_dir == "." { root.join("README.md") } else { root.join(module_dir).join("README.md") };
    let text = std::fs::read_to_string(path).ok()?;
    let mut in_fence = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if trimmed.is_empty() {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with("[![") || trimmed.starts_with("![") {
            continue;
        }
        paragraph.push(trimmed);
    }

    if paragraph.is_empty() {
        return None;
    }
    let joined = paragraph.join(" ");
    let collapsed: String = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= 200 {
        Some(collapsed)
    } else {
        let truncated: String = collapsed.chars().take(200).collect();
        Some(format!("{truncated}..."))
    }
}
