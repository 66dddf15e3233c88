//! TypeScript/JavaScript baseline extractor: regex-based, export-only,
//! top-level declarations plus one level of class methods.

use super::{collapse_truncate, is_ts_keyword, RawSymbol};
use crate::model::{SymbolKind, Visibility};
use regex::Regex;
use std::sync::OnceLock;

fn re_function() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^export\s+(default\s+)?(async\s+)?function\s*\*?\s+([A-Za-z_$][\w$]*)").unwrap())
}
fn re_class() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^export\s+(default\s+)?(abstract\s+)?class\s+([A-Za-z_$][\w$]*)").unwrap())
}
fn re_interface() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^export\s+interface\s+([A-Za-z_$][\w$]*)").unwrap())
}
fn re_type() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^export\s+type\s+([A-Za-z_$][\w$]*)").unwrap())
}
fn re_enum() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^export\s+(const\s+)?enum\s+([A-Za-z_$][\w$]*)").unwrap())
}
fn re_variable() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^export\s+(const|let|var)\s+([A-Za-z_$][\w$]*)\s*[:=]").unwrap())
}
fn re_method() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"^\s*(public\s+|private\s+|protected\s+|static\s+|async\s+|\*\s*)*(#?[A-Za-z_$][\w$]*)\s*\(")
            .unwrap()
    })
}

fn leading_doc(lines: &[&str], decl_idx: usize) -> Option<String> {
    if decl_idx == 0 {
        return None;
    }
    let above = lines[decl_idx - 1].trim();
    if let Some(stripped) = above.strip_prefix("//") {
        let s = stripped.trim();
        return if s.is_empty() { None } else { Some(collapse_truncate(s, 200)) };
    }
    if above.ends_with("*/") {
        // Walk up collecting the JSDoc block.
        let mut start = decl_idx - 1;
        loop {
            if lines[start].trim_start().starts_with("/**") || lines[start].trim_start().starts_with("/*") {
                break;
            }
            if start == 0 {
                break;
            }
            start -= 1;
        }
        for raw in &lines[start..decl_idx] {
            let trimmed = raw.trim().trim_start_matches("/**").trim_start_matches("/*").trim_end_matches("*/");
            let trimmed = trimmed.trim().trim_start_matches('*').trim();
            if trimmed.is_empty() || trimmed.starts_with('@') {
                continue;
            }
            return Some(collapse_truncate(trimmed, 200));
        }
    }
    None
}

fn signature_of(line: &str) -> String {
    let head = line.split('{').next().unwrap_or(line);
    collapse_truncate(head.trim(), 200)
}

pub fn extract(text: &str) -> Vec<RawSymbol> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut depth: i32 = 0;
    let mut class_stack: Vec<(String, i32)> = Vec::new();

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;
        let trimmed = raw_line.trim_start();

        if depth == 0 {
            if let Some(c) = re_function().captures(trimmed) {
                let name = c.get(3).unwrap().as_str().to_string();
                out.push(RawSymbol {
                    name,
                    id_fragment: None,
                    kind: SymbolKind::Function,
                    line: line_no,
                    end_line: None,
                    col: 0,
                    end_col: None,
                    signature: Some(signature_of(trimmed)),
                    docstring_summary: leading_doc(&lines, idx),
                    visibility: Visibility::Export,
                });
            } else if let Some(c) = re_class().captures(trimmed) {
                let name = c.get(3).unwrap().as_str().to_string();
                out.push(RawSymbol {
                    name: name.clone(),
                    id_fragment: None,
                    kind: SymbolKind::Class,
                    line: line_no,
                    end_line: None,
                    col: 0,
                    end_col: None,
                    signature: Some(signature_of(trimmed)),
                    docstring_summary: leading_doc(&lines, idx),
                    visibility: Visibility::Export,
                });
                class_stack.push((name, depth));
            } else if let Some(c) = re_interface().captures(trimmed) {
                out.push(simple(c.get(1).unwrap().as_str(), SymbolKind::Interface, line_no, trimmed, &lines, idx));
            } else if let Some(c) = re_type().captures(trimmed) {
                out.push(simple(c.get(1).unwrap().as_str(), SymbolKind::Type, line_no, trimmed, &lines, idx));
            } else if let Some(c) = re_enum().captures(trimmed) {
                out.push(simple(c.get(2).unwrap().as_str(), SymbolKind::Enum, line_no, trimmed, &lines, idx));
            } else if let Some(c) = re_variable().captures(trimmed) {
                out.push(simple(c.get(2).unwrap().as_str(), SymbolKind::Variable, line_no, trimmed, &lines, idx));
            }
        } else if let Some((class_name, class_depth)) = class_stack.last().cloned() {
            if depth == class_depth + 1 {
                if let Some(c) = re_method().captures(raw_line) {
                    let name = c.get(2).unwrap().as_str().to_string();
                    if !is_ts_keyword(&name) {
                        out.push(RawSymbol {
                            name: name.clone(),
                            id_fragment: Some(format!("{class_name}.{name}")),
                            kind: SymbolKind::Method,
                            line: line_no,
                            end_line: None,
                            col: 0,
                            end_col: None,
                            signature: Some(signature_of(raw_line.trim())),
                            docstring_summary: leading_doc(&lines, idx),
                            visibility: if name.starts_with('#') { Visibility::Private } else { Visibility::Public },
                        });
                    }
                }
            }
        }

        for ch in raw_line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if let Some((_, class_depth)) = class_stack.last() {
                        if depth <= *class_depth {
                            class_stack.pop();
                        }
                    }
                }
                _ => {}
            }
        }
    }

    out
}

fn simple(name: &str, kind: SymbolKind, line_no: u32, trimmed: &str, lines: &[&str], idx: usize) -> RawSymbol {
    RawSymbol {
        name: name.to_string(),
        id_fragment: None,
        kind,
        line: line_no,
        end_line: None,
        col: 0,
        end_col: None,
        signature: Some(signature_of(trimmed)),
        docstring_summary: leading_doc(lines, idx),
        visibility: Visibility::Export,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_function_class_and_colliding_method() {
        let text = "export function f() {}\n\nexport class C {\n  f() {}\n}\n";
        let raws = extract(text);
        assert_eq!(raws.len(), 3);
        assert_eq!(raws[0].name, "f");
        assert_eq!(raws[0].line, 1);
        assert_eq!(raws[1].name, "C");
        assert_eq!(raws[1].line, 3);
        assert_eq!(raws[2].name, "f");
        assert_eq!(raws[2].line, 4);
        assert_eq!(raws[2].id_fragment.as_deref(), Some("C.f"));
    }

    #[test]
    fn non_exported_top_level_function_is_ignored() {
        let raws = extract("function helper() {}\n");
        assert!(raws.is_empty());
    }

    #[test]
    fn jsdoc_above_function_is_captured() {
        let text = "/**\n * Adds two numbers.\n * @param a first\n */\nexport function add(a, b) {}\n";
        let raws = extract(text);
        assert_eq!(raws[0].docstring_summary.as_deref(), Some("Adds two numbers."));
    }

    #[test]
    fn export_const_is_variable() {
        let raws = extract("export const MAX = 10;\n");
        assert_eq!(raws[0].kind, SymbolKind::Variable);
    }
}
