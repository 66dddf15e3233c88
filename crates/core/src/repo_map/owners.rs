//! CODEOWNERS parsing.

use std::collections::BTreeMap;
use std::path::Path;

const CANDIDATES: &[&str] = &["CODEOWNERS", ".github/CODEOWNERS", "docs/CODEOWNERS"];

pub fn parse(root: &Path) -> BTreeMap<String, Vec<String>> {
    for candidate in CANDIDATES {
        let path = root.join(candidate);
        if let Ok(text) = std::fs::read_to_string(&path) {
            return parse_text(&text);
        }
    }
    BTreeMap::new()
}

fn parse_text(text: &str) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(pattern) = parts.next() else { continue };
        let owners: Vec<String> = parts.filter(|p| p.starts_with('@')).map(|p| p.to_string()).collect();
        if owners.is_empty() {
            continue;
        }
        out.insert(pattern.to_string(), owners);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_patterns_and_owners_skipping_comments() {
        let text = "# top comment\n*.rs @rustaceans @lead\n\n/docs/ @docs-team\nno-owner-line\n";
        let owners = parse_text(text);
        assert_eq!(owners.get("*.rs"), Some(&vec!["@rustaceans".to_string(), "@lead".to_string()]));
        assert_eq!(owners.get("/docs/"), Some(&vec!["@docs-team".to_string()]));
        assert!(!owners.contains_key("no-owner-line"));
    }

    #[test]
    fn missing_codeowners_file_yields_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse(dir.path()).is_empty());
    }

    #[test]
    fn first_candidate_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".github")).unwrap();
        std::fs::write(dir.path().join(".github/CODEOWNERS"), "*.rs @a\n").unwrap();
        std::fs::write(dir.path().join("CODEOWNERS"), "*.rs @b\n").unwrap();
        let owners = parse(dir.path());
        assert_eq!(owners.get("*.rs"), Some(&vec!["@b".to_string()]));
    }
}
