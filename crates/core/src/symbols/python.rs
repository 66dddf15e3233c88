//! Python baseline extractor: regex/indentation-based, dunder/underscore
//! visibility convention, one level of class methods.

use super::{collapse_truncate, RawSymbol};
use crate::model::{SymbolKind, Visibility};
use regex::Regex;
use std::sync::OnceLock;

fn re_class() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^class\s+([A-Za-z_]\w*)").unwrap())
}
fn re_def() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^(async\s+)?def\s+([A-Za-z_]\w*)").unwrap())
}
fn re_constant() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^([A-Z][A-Z0-9_]*)\s*(:[^=]+)?=[^=]").unwrap())
}

fn visibility_of(name: &str) -> Visibility {
    if name.starts_with("__") {
        Visibility::Private
    } else if name.starts_with('_') {
        Visibility::Internal
    } else {
        Visibility::Export
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn signature_head(trimmed: &str) -> String {
    let head = trimmed.split(':').next().unwrap_or(trimmed);
    collapse_truncate(head.trim(), 200)
}

/// First statement after a def/class header: a triple-quoted docstring,
/// single-line or the first line of a multi-line one.
fn docstring_after(lines: &[&str], header_idx: usize) -> Option<String> {
    let mut i = header_idx + 1;
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }
    let candidate = lines.get(i)?.trim();
    for quote in ["\"\"\"", "'''"] {
        if let Some(rest) = candidate.strip_prefix(quote) {
            let content = rest.strip_suffix(quote).unwrap_or(rest);
            let content = content.trim();
            if !content.is_empty() {
                return Some(collapse_truncate(content, 200));
            }
            // Multi-line: first line is empty, fall through to next line.
            if let Some(next) = lines.get(i + 1) {
                let next = next.trim();
                if !next.is_empty() {
                    return Some(collapse_truncate(next, 200));
                }
            }
            return None;
        }
    }
    None
}

enum FrameKind {
    Class(String),
    Def,
}

struct Frame {
    kind: FrameKind,
    indent: usize,
}

pub fn extract(text: &str) -> Vec<RawSymbol> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for (idx, raw_line) in lines.iter().enumerate() {
        if raw_line.trim().is_empty() {
            continue;
        }
        let line_no = (idx + 1) as u32;
        let indent = indent_of(raw_line);
        let trimmed = raw_line.trim_start();

        while stack.last().map(|f| f.indent >= indent).unwrap_or(false) {
            stack.pop();
        }

        if let Some(c) = re_class().captures(trimmed) {
            let name = c.get(1).unwrap().as_str().to_string();
            out.push(RawSymbol {
                name: name.clone(),
                id_fragment: None,
                kind: SymbolKind::Class,
                line: line_no,
                end_line: None,
                col: indent as u32,
                end_col: None,
                signature: Some(signature_head(trimmed)),
                docstring_summary: docstring_after(&lines, idx),
                visibility: visibility_of(&name),
            });
            stack.push(Frame { kind: FrameKind::Class(name), indent });
            continue;
        }

        if let Some(c) = re_def().captures(trimmed) {
            let name = c.get(2).unwrap().as_str().to_string();
            let parent_class = match stack.last() {
                Some(Frame { kind: FrameKind::Class(class_name), .. }) => Some(class_name.clone()),
                Some(Frame { kind: FrameKind::Def, .. }) => None,
                None => None,
            };
            let is_nested_in_function = matches!(stack.last(), Some(Frame { kind: FrameKind::Def, .. }));
            if !is_nested_in_function {
                let (kind, id_fragment) = match &parent_class {
                    Some(class_name) => (SymbolKind::Method, Some(format!("{class_name}.{name}"))),
                    None => (SymbolKind::Function, None),
                };
                out.push(RawSymbol {
                    name: name.clone(),
                    id_fragment,
                    kind,
                    line: line_no,
                    end_line: None,
                    col: indent as u32,
                    end_col: None,
                    signature: Some(signature_head(trimmed)),
                    docstring_summary: docstring_after(&lines, idx),
                    visibility: visibility_of(&name),
                });
            }
            stack.push(Frame { kind: FrameKind::Def, indent });
            continue;
        }

        if indent == 0 && stack.is_empty() {
            if let Some(c) = re_constant().captures(trimmed) {
                let name = c.get(1).unwrap().as_str().to_string();
                out.push(RawSymbol {
                    name: name.clone(),
                    id_fragment: None,
                    kind: SymbolKind::Constant,
                    line: line_no,
                    end_line: None,
                    col: 0,
                    end_col: None,
                    signature: Some(collapse_truncate(trimmed, 100)),
                    docstring_summary: None,
                    visibility: Visibility::Export,
                });
            }
        }
    }

    out
}
