//! Key file scoring: lines-of-code, import count, and semantic-name boost,
//! combined into a rank used to pick the most load-bearing files per directory.

use crate::fsutil::{language_of, Language};
use crate::model::{DiscoveredFile, KeyFile, SubDirectory};
use std::path::Path;

const LOC_CAP: usize = 100_000;

fn is_comment_line(trimmed: &str, language: Language) -> bool {
    match language {
        Language::Python => trimmed.starts_with('#'),
        Language::Rust | Language::TypeScript | Language::JavaScript | Language::C | Language::Cpp | Language::Java => {
            trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
        }
        Language::Go => trimmed.starts_with("//"),
        _ => false,
    }
}

fn loc_of(text: &str, language: Language) -> usize {
    let count = text
        .lines()
        .filter(|l| {
            let t = l.trim();
            !t.is_empty() && !is_comment_line(t, language)
        })
        .count();
    count.min(LOC_CAP)
}

fn import_count(text: &str, language: Language) -> usize {
    match language {
        Language::TypeScript | Language::JavaScript => {
            text.lines().filter(|l| { let t = l.trim(); t.starts_with("import ") || t.contains("require(") }).count()
        }
        Language::Python => text.lines().filter(|l| { let t = l.trim(); t.starts_with("import ") || t.starts_with("from ") }).count(),
        Language::Rust => text.lines().filter(|l| l.trim_start().starts_with("use ")).count(),
        Language::Go => text.lines().filter(|l| l.trim_start().starts_with("import ") || l.trim_start().starts_with('"')).count(),
        _ => 0,
    }
}

/// Semantic name boost by filename stem/extension, per the fixed rule table.
fn semantic_boost(rel_path: &str) -> i64 {
    let basename = rel_path.rsplit('/').next().unwrap_or(rel_path);
    let (stem, ext) = basename.rsplit_once('.').unwrap_or((basename, ""));

    if stem.ends_with("Complete") && (ext == "tsx" || ext == "jsx") {
        return 300;
    }
    if stem.ends_with("Client") || stem.ends_with("Server") {
        return 250;
    }
    if stem.ends_with("Handler") || stem.ends_with("Manager") || stem.ends_with("Controller") || stem.ends_with("Service")
    {
        return 200;
    }
    if stem.ends_with("Store") || stem.ends_with("Context") || stem.ends_with("Provider") || stem.ends_with("Router")
        || stem.ends_with("Reducer")
    {
        return 150;
    }
    let lower = stem.to_ascii_lowercase();
    if lower == "types" || lower == "utils" || lower == "helper" || lower == "helpers" || lower == "constant"
        || lower == "constants" || lower == "config"
    {
        return 100;
    }
    if lower == "index" {
        return 50;
    }
    0
}

struct Scored {
    rel_path: String,
    score: i64,
    boost: i64,
}

fn score_file(f: &DiscoveredFile) -> Option<Scored> {
    let language = language_of(Path::new(&f.rel_path));
    if !language.is_code() {
        return None;
    }
    let text = std::fs::read_to_string(&f.abs_path).ok()?;
    let loc = loc_of(&text, language);
    let imports = import_count(&text, language);
    let boost = semantic_boost(&f.rel_path);

    let qualifies = loc >= 300 || imports >= 10 || (boost > 0 && loc >= 100);
    if !qualifies {
        return None;
    }
    Some(Scored { rel_path: f.rel_path.clone(), score: loc as i64 + boost, boost })
}

fn rank_files<'a>(files: impl Iterator<Item = &'a DiscoveredFile>) -> Vec<Scored> {
    let mut scored: Vec<Scored> = files.filter_map(score_file).collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.rel_path.cmp(&b.rel_path)));
    scored
}

/// Up to 3 key files for a subdirectory, considering files anywhere beneath
/// it. If any qualifier carries a semantic boost, the highest-boost one is
/// guaranteed a slot even if its total score wouldn't otherwise rank top 3.
pub fn select_for_subdir(dir_path: &str, files: &[DiscoveredFile], _parent_score: i64) -> Vec<KeyFile> {
    let prefix = format!("{dir_path}/");
    let ranked = rank_files(files.iter().filter(|f| f.rel_path.starts_with(&prefix)));

    let top_boosted = ranked
        .iter()
        .filter(|s| s.boost > 0)
        .max_by(|a, b| a.boost.cmp(&b.boost).then_with(|| b.rel_path.cmp(&a.rel_path)))
        .map(|s| s.rel_path.clone());

    let mut out: Vec<KeyFile> = ranked.iter().take(3).map(|s| KeyFile { path: s.rel_path.clone(), score: s.score }).collect();

    if let Some(path) = top_boosted {
        if !out.iter().any(|kf| kf.path == path) {
            if let Some(s) = ranked.iter().find(|s| s.rel_path == path) {
                out.pop();
                out.push(KeyFile { path: s.rel_path.clone(), score: s.score });
            }
        }
    }

    out
}

/// Up to 15 key files for a module: round-robin over its subdirectories'
/// selections, then top up with the module's highest remaining qualifiers.
/// The root module (`"."`) only considers files directly in the repo root.
pub fn select_for_module(module_dir: &str, subdirs: &[SubDirectory], files: &[DiscoveredFile]) -> Vec<KeyFile> {
    if module_dir == "." {
        let ranked = rank_files(files.iter().filter(|f| !f.rel_path.contains('/')));
        return ranked.into_iter().take(15).map(|s| KeyFile { path: s.rel_path, score: s.score }).collect();
    }

    let mut out: Vec<KeyFile> = Vec::new();
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

    let max_rank = subdirs.iter().map(|s| s.key_files.len()).max().unwrap_or(0);
    for rank in 0..max_rank {
        for sub in subdirs {
            if let Some(kf) = sub.key_files.get(rank) {
                if seen.insert(kf.path.clone()) {
                    out.push(kf.clone());
                }
            }
        }
        if out.len() >= 15 {
            break;
        }
    }

    if out.len() < 15 {
        let module_prefix = if module_dir == "." { String::new() } else { format!("{module_dir}/") };
        let direct_files = files.iter().filter(|f| {
            f.rel_path.starts_with(&module_prefix)
                && !subdirs.iter().any(|s| f.rel_path.starts_with(&format!("{}/", s.path)))
        });
        let ranked = rank_files(direct_files);
        for s in ranked {
            if out.len() >= 15 {
                break;
            }
            if seen.insert(s.rel_path.clone()) {
                out.push(KeyFile { path: s.rel_path, score: s.score });
            }
        }
    }

    out.truncate(15);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_file(dir: &tempfile::TempDir, rel: &str, content: &str) -> DiscoveredFile {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        DiscoveredFile { rel_path: rel.to_string(), abs_path: path, size: content.len() as u64, mtime: String::new() }
    }

    #[test]
    fn large_file_qualifies_by_loc() {
        let dir = tempfile::tempdir().unwrap();
        let body = "const x = 1;\n".repeat(320);
        let f = write_file(&dir, "src/big.ts", &body);
        let scored = score_file(&f).unwrap();
        assert!(scored.score >= 300);
    }

    #[test]
    fn small_file_does_not_qualify() {
        let dir = tempfile::tempdir().unwrap();
        let f = write_file(&dir, "src/small.ts", "const x = 1;\n");
        assert!(score_file(&f).is_none());
    }

    #[test]
    fn semantic_name_with_lower_loc_bar_qualifies() {
        let dir = tempfile::tempdir().unwrap();
        let body = "export const a = 1;\n".repeat(120);
        let f = write_file(&dir, "src/UserService.ts", &body);
        let scored = score_file(&f).unwrap();
        assert!(scored.score > 120);
    }

    #[test]
    fn nonexistent_file_is_skipped_gracefully() {
        let f = DiscoveredFile { rel_path: "gone.rs".to_string(), abs_path: PathBuf::from("/nonexistent/gone.rs"), size: 0, mtime: String::new() };
        assert!(score_file(&f).is_none());
    }

    #[test]
    fn boosted_qualifier_guaranteed_a_slot_over_larger_unboosted_files() {
        let dir = tempfile::tempdir().unwrap();
        // Three large, unboosted files that would otherwise fill all 3 slots by raw LOC.
        for name in ["src/a.ts", "src/b.ts", "src/c.ts"] {
            write_file(&dir, name, &"const x = 1;\n".repeat(1000));
        }
        // A semantically boosted file with much lower LOC but still qualifying via boost.
        write_file(&dir, "src/UserHandler.ts", &"export const a = 1;\n".repeat(120));

        let files: Vec<DiscoveredFile> = ["src/a.ts", "src/b.ts", "src/c.ts", "src/UserHandler.ts"]
            .iter()
            .map(|rel| {
                let path = dir.path().join(rel);
                DiscoveredFile {
                    rel_path: rel.to_string(),
                    abs_path: path,
                    size: 0,
                    mtime: String::new(),
                }
            })
            .collect();

        let selected = select_for_subdir("src", &files, 0);
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().any(|kf| kf.path == "src/UserHandler.ts"));
    }
}
