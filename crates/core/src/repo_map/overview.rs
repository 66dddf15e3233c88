//! Directory overview: totals, language histogram, top-level directory ranking.

use crate::fsutil::{language_of, Language};
use crate::model::{DiscoveredFile, DirectoryOverview};
use std::collections::BTreeMap;
use std::path::Path;

pub fn build(files: &[DiscoveredFile]) -> DirectoryOverview {
    let mut languages: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_code_files = 0usize;
    let mut top_level: BTreeMap<String, usize> = BTreeMap::new();

    for f in files {
        let lang = language_of(Path::new(&f.rel_path));
        if lang.is_code() {
            total_code_files += 1;
        }
        if lang != Language::Unknown {
            *languages.entry(lang.as_str().to_string()).or_insert(0) += 1;
        }

        let top = f.rel_path.split('/').next().unwrap_or(&f.rel_path);
        if top != f.rel_path {
            *top_level.entry(top.to_string()).or_insert(0) += 1;
        }
    }

    let mut top_level_dirs: Vec<(String, usize)> = top_level.into_iter().collect();
    top_level_dirs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_level_dirs.truncate(10);

    DirectoryOverview { total_files: files.len(), total_code_files, languages, top_level_dirs }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn df(rel: &str) -> DiscoveredFile {
        DiscoveredFile { rel_path: rel.to_string(), abs_path: Path::new(rel).to_path_buf(), size: 10, mtime: String::new() }
    }

    #[test]
    fn counts_code_files_and_languages() {
        let files = vec![df("src/a.rs"), df("src/b.py"), df("README.md")];
        let overview = build(&files);
        assert_eq!(overview.total_files, 3);
        assert_eq!(overview.total_code_files, 2);
        assert_eq!(overview.languages.get("rust"), Some(&1));
        assert_eq!(overview.languages.get("markdown"), Some(&1));
    }

    #[test]
    fn top_level_dirs_ranked_by_file_count() {
        let files = vec![df("a/x.rs"), df("a/y.rs"), df("b/z.rs"), df("top.rs")];
        let overview = build(&files);
        assert_eq!(overview.top_level_dirs[0], ("a".to_string(), 2));
        assert_eq!(overview.top_level_dirs[1], ("b".to_string(), 1));
    }
}
