//! Test map builder: test-file detection, framework selection, regex-based
//! name parsing, test ID/tier/tag assignment, and package inference.

use crate::fsutil::{language_of, Language};
use crate::model::{DiscoveredFile, Tier, TestEntry, TestMap};
use regex::Regex;
use std::sync::OnceLock;

pub const SCHEMA_VERSION: &str = "1.0.0";

const TEST_DIR_SEGMENTS: &[&str] =
    &["__tests__", "tests", "test", "spec", "specs", "__test__", "__spec__", "__specs__"];

const NON_PACKAGE_SEGMENTS: &[&str] = &["src", "lib", "pkg", "internal", "cmd", "__tests__", "tests", "test", "spec", "specs"];

const TAG_VOCAB: &[&str] = &["unit", "integration", "e2e", "smoke", "regression", "api", "ui", "component"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framework {
    Go,
    Rust,
    Pytest,
    Jest,
}

fn is_test_file(rel_path: &str) -> bool {
    let basename = rel_path.rsplit('/').next().unwrap_or(rel_path);
    if re_jest_name().is_match(basename) || re_py_test_name().is_match(basename) || re_go_test_name().is_match(basename)
        || re_rust_test_name().is_match(basename)
    {
        return true;
    }
    rel_path.split('/').any(|seg| TEST_DIR_SEGMENTS.contains(&seg))
}

fn re_jest_name() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^.+[._](test|spec)\.[jt]sx?$").unwrap())
}
fn re_py_test_name() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^(.+_test\.py|test_.+\.py)$").unwrap())
}
fn re_go_test_name() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^.+_test\.go$").unwrap())
}
fn re_rust_test_name() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^(.+_test\.rs|tests\.rs)$").unwrap())
}

fn framework_of(rel_path: &str) -> Option<Framework> {
    match language_of(std::path::Path::new(rel_path)) {
        Language::Go => Some(Framework::Go),
        Language::Rust => Some(Framework::Rust),
        Language::Python => Some(Framework::Pytest),
        Language::TypeScript | Language::JavaScript => Some(Framework::Jest),
        _ => None,
    }
}

struct ParsedTest {
    name: Option<String>,
    line: u32,
}

fn re_jest_call() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r#"(describe|it|test)\s*\(\s*['"`](.+?)['"`]"#).unwrap())
}
fn re_pytest_def() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^\s*def\s+(test_\w+)\s*\(").unwrap())
}
fn re_go_func() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^\s*func\s+(Test\w+)\s*\(").unwrap())
}
fn re_rust_attr() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^\s*#\[test\]\s*$").unwrap())
}
fn re_rust_fn() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^\s*(?:pub\s+)?(?:async\s+)?fn\s+(\w+)\s*\(").unwrap())
}

fn parse_tests(text: &str, framework: Framework) -> Vec<ParsedTest> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();

    match framework {
        Framework::Jest => {
            for (idx, line) in lines.iter().enumerate() {
                if let Some(c) = re_jest_call().captures(line) {
                    out.push(ParsedTest { name: Some(c.get(2).unwrap().as_str().to_string()), line: (idx + 1) as u32 });
                }
            }
        }
        Framework::Pytest => {
            for (idx, line) in lines.iter().enumerate() {
                if let Some(c) = re_pytest_def().captures(line) {
                    out.push(ParsedTest { name: Some(c.get(1).unwrap().as_str().to_string()), line: (idx + 1) as u32 });
                }
            }
        }
        Framework::Go => {
            for (idx, line) in lines.iter().enumerate() {
                if let Some(c) = re_go_func().captures(line) {
                    out.push(ParsedTest { name: Some(c.get(1).unwrap().as_str().to_string()), line: (idx + 1) as u32 });
                }
            }
        }
        Framework::Rust => {
            let mut pending_attr: Option<usize> = None;
            for (idx, line) in lines.iter().enumerate() {
                if re_rust_attr().is_match(line) {
                    pending_attr = Some(idx);
                    continue;
                }
                if pending_attr.is_some() {
                    if let Some(c) = re_rust_fn().captures(line) {
                        out.push(ParsedTest {
                            name: Some(c.get(1).unwrap().as_str().to_string()),
                            line: (idx + 1) as u32,
                        });
                        pending_attr = None;
                    } else if !line.trim().is_empty() {
                        pending_attr = None;
                    }
                }
            }
        }
    }

    out
}

fn test_id(file: &str, name: &Option<String>, line: Option<u32>, counter: usize) -> String {
    match (name, line) {
        (Some(n), _) => format!("{file}::{n}"),
        (None, Some(l)) => format!("{file}::unnamed_test:L{l}"),
        (None, None) => format!("{file}::unnamed_test:{counter}"),
    }
}

fn tier_of(file: &str, name: &Option<String>) -> Tier {
    let haystack = format!("{} {}", file.to_ascii_lowercase(), name.as_deref().unwrap_or("").to_ascii_lowercase());
    if haystack.contains("integration") || haystack.contains("e2e") {
        Tier::Integration
    } else if haystack.contains("slow") || haystack.contains("benchmark") || haystack.contains("perf") {
        Tier::Slow
    } else {
        Tier::Fast
    }
}

fn tags_of(file: &str, name: &Option<String>) -> Vec<String> {
    let haystack = format!("{} {}", file.to_ascii_lowercase(), name.as_deref().unwrap_or("").to_ascii_lowercase());
    TAG_VOCAB.iter().filter(|tag| haystack.contains(*tag)).map(|t| t.to_string()).collect()
}

fn package_of(file: &str) -> Option<String> {
    let segments: Vec<&str> = file.split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    if let Some(pos) = segments.iter().position(|s| *s == "node_modules") {
        if let Some(scope) = segments.get(pos + 1) {
            if let Some(name) = segments.get(pos + 2) {
                if scope.starts_with('@') {
                    return Some(format!("{scope}/{name}"));
                }
            }
        }
    }
    segments.iter().find(|seg| !NON_PACKAGE_SEGMENTS.contains(*seg) && !seg.contains('.')).map(|s| s.to_string())
}

/// Build the full test map from discovered files.
pub fn build(files: &[DiscoveredFile]) -> TestMap {
    let mut tests = Vec::new();

    for f in files {
        if !is_test_file(&f.rel_path) {
            continue;
        }
        let Some(framework) = framework_of(&f.rel_path) else { continue };
        let text = std::fs::read_to_string(&f.abs_path).unwrap_or_default();
        let parsed = parse_tests(&text, framework);

        if parsed.is_empty() {
            tests.push(TestEntry {
                test_id: format!("{}::unnamed_test:1", f.rel_path),
                file: f.rel_path.clone(),
                name: None,
                tags: Vec::new(),
                tier: tier_of(&f.rel_path, &None),
                files_touched: Vec::new(),
                package: package_of(&f.rel_path),
            });
            continue;
        }

        let mut unnamed_counter = 0usize;
        for p in parsed {
            if p.name.is_none() {
                unnamed_counter += 1;
            }
            tests.push(TestEntry {
                test_id: test_id(&f.rel_path, &p.name, Some(p.line), unnamed_counter),
                file: f.rel_path.clone(),
                name: p.name.clone(),
                tags: tags_of(&f.rel_path, &p.name),
                tier: tier_of(&f.rel_path, &p.name),
                files_touched: Vec::new(),
                package: package_of(&f.rel_path),
            });
        }
    }

    TestMap { schema_version: SCHEMA_VERSION.to_string(), tests }
}
