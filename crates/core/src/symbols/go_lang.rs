//! Go baseline extractor: regex-based, uppercase-leading-letter visibility,
//! receiver-qualified methods.

use super::{collapse_truncate, RawSymbol};
use crate::model::{SymbolKind, Visibility};
use regex::Regex;
use std::sync::OnceLock;

fn re_method() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^func\s*\(\s*\w+\s+\*?([A-Za-z_]\w*)\s*\)\s*([A-Za-z_]\w*)\s*\(").unwrap())
}
fn re_func() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^func\s+([A-Za-z_]\w*)\s*[\(\[]").unwrap())
}
fn re_struct() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^type\s+([A-Za-z_]\w*)\s+struct\b").unwrap())
}
fn re_interface() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^type\s+([A-Za-z_]\w*)\s+interface\b").unwrap())
}
fn re_type_alias() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^type\s+([A-Za-z_]\w*)\s*=?\s*[A-Za-z_\[\*]").unwrap())
}
fn re_const_single() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^const\s+([A-Za-z_]\w*)").unwrap())
}
fn re_var_single() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^var\s+([A-Za-z_]\w*)").unwrap())
}
fn re_block_member() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^([A-Za-z_]\w*)\b").unwrap())
}

fn visibility_of(name: &str) -> Visibility {
    match name.chars().next() {
        Some(c) if c.is_ascii_uppercase() => Visibility::Export,
        _ => Visibility::Private,
    }
}

fn signature_of(trimmed: &str) -> String {
    let head = trimmed.split('{').next().unwrap_or(trimmed);
    collapse_truncate(head.trim(), 200)
}

/// Contiguous `//` lines immediately above.
fn leading_doc(lines: &[&str], decl_idx: usize) -> Option<String> {
    let mut i = decl_idx;
    let mut doc_lines: Vec<&str> = Vec::new();
    while i > 0 {
        let above = lines[i - 1].trim();
        if let Some(rest) = above.strip_prefix("//") {
            doc_lines.push(rest.trim());
            i -= 1;
            continue;
        }
        break;
    }
    doc_lines.reverse();
    for line in &doc_lines {
        if !line.is_empty() {
            return Some(collapse_truncate(line, 200));
        }
    }
    None
}

#[derive(PartialEq)]
enum Block {
    Const,
    Var,
}

pub fn extract(text: &str) -> Vec<RawSymbol> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut block: Option<Block> = None;

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;
        let trimmed = raw_line.trim();

        if trimmed == ")" {
            block = None;
            continue;
        }
        if trimmed == "const (" {
            block = Some(Block::Const);
            continue;
        }
        if trimmed == "var (" {
            block = Some(Block::Var);
            continue;
        }

        if let Some(kind) = &block {
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }
            if let Some(c) = re_block_member().captures(trimmed) {
                let name = c.get(1).unwrap().as_str().to_string();
                let symbol_kind = if *kind == Block::Const { SymbolKind::Constant } else { SymbolKind::Variable };
                out.push(RawSymbol {
                    name: name.clone(),
                    id_fragment: None,
                    kind: symbol_kind,
                    line: line_no,
                    end_line: None,
                    col: 0,
                    end_col: None,
                    signature: Some(collapse_truncate(trimmed, 100)),
                    docstring_summary: leading_doc(&lines, idx),
                    visibility: visibility_of(&name),
                });
            }
            continue;
        }

        if let Some(c) = re_method().captures(trimmed) {
            let type_name = c.get(1).unwrap().as_str().to_string();
            let name = c.get(2).unwrap().as_str().to_string();
            out.push(RawSymbol {
                name: name.clone(),
                id_fragment: Some(format!("{type_name}.{name}")),
                kind: SymbolKind::Method,
                line: line_no,
                end_line: None,
                col: 0,
                end_col: None,
                signature: Some(signature_of(trimmed)),
                docstring_summary: leading_doc(&lines, idx),
                visibility: visibility_of(&name),
            });
        } else if let Some(c) = re_func().captures(trimmed) {
            let name = c.get(1).unwrap().as_str().to_string();
            out.push(RawSymbol {
                name: name.clone(),
                id_fragment: None,
                kind: SymbolKind::Function,
                line: line_no,
                end_line: None,
                col: 0,
                end_col: None,
                signature: Some(signature_of(trimmed)),
                docstring_summary: leading_doc(&lines, idx),
                visibility: visibility_of(&name),
            });
        } else if let Some(c) = re_struct().captures(trimmed) {
            let name = c.get(1).unwrap().as_str().to_string();
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
                visibility: visibility_of(&name),
            });
        } else if let Some(c) = re_interface().captures(trimmed) {
            let name = c.get(1).unwrap().as_str().to_string();
            out.push(RawSymbol {
                name: name.clone(),
                id_fragment: None,
                kind: SymbolKind::Interface,
                line: line_no,
                end_line: None,
                col: 0,
                end_col: None,
                signature: Some(signature_of(trimmed)),
                docstring_summary: leading_doc(&lines, idx),
                visibility: visibility_of(&name),
            });
        } else if let Some(c) = re_const_single().captures(trimmed) {
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
                docstring_summary: leading_doc(&lines, idx),
                visibility: visibility_of(&name),
            });
        } else if let Some(c) = re_var_single().captures(trimmed) {
            let name = c.get(1).unwrap().as_str().to_string();
            out.push(RawSymbol {
                name: name.clone(),
                id_fragment: None,
                kind: SymbolKind::Variable,
                line: line_no,
                end_line: None,
                col: 0,
                end_col: None,
                signature: Some(collapse_truncate(trimmed, 100)),
                docstring_summary: leading_doc(&lines, idx),
                visibility: visibility_of(&name),
            });
        } else if let Some(c) = re_type_alias().captures(trimmed) {
            let name = c.get(1).unwrap().as_str().to_string();
            out.push(RawSymbol {
                name: name.clone(),
                id_fragment: None,
                kind: SymbolKind::Type,
                line: line_no,
                end_line: None,
                col: 0,
                end_col: None,
                signature: Some(signature_of(trimmed)),
                docstring_summary: leading_doc(&lines, idx),
                visibility: visibility_of(&name),
            });
        }
    }

    out
}
