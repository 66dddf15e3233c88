//! Rust baseline extractor: regex-based, `pub`-gated visibility, impl-block
//! methods grouped under their owning type.

use super::{collapse_truncate, RawSymbol};
use crate::model::{SymbolKind, Visibility};
use regex::Regex;
use std::sync::OnceLock;

fn re_impl() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^impl(?:<[^>]*>)?\s+(?:[\w:<>, ]+?\s+for\s+)?([A-Za-z_]\w*)").unwrap())
}
fn re_struct() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^(pub(?:\([^)]*\))?\s+)?struct\s+([A-Za-z_]\w*)").unwrap())
}
fn re_trait() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^(pub(?:\([^)]*\))?\s+)?trait\s+([A-Za-z_]\w*)").unwrap())
}
fn re_enum() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^(pub(?:\([^)]*\))?\s+)?enum\s+([A-Za-z_]\w*)").unwrap())
}
fn re_const() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^(pub(?:\([^)]*\))?\s+)?(const|static)\s+([A-Za-z_]\w*)").unwrap())
}
fn re_fn() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"^(pub(?:\([^)]*\))?\s+)?(async\s+)?(unsafe\s+)?(extern\s+\x22[^\x22]*\x22\s+)?fn\s+([A-Za-z_]\w*)")
            .unwrap()
    })
}

fn visibility_of(pub_group: Option<&str>) -> Visibility {
    if pub_group.is_some() {
        Visibility::Export
    } else {
        Visibility::Private
    }
}

fn signature_of(trimmed: &str) -> String {
    let head = trimmed.split('{').next().unwrap_or(trimmed);
    collapse_truncate(head.trim(), 200)
}

/// Contiguous `///` lines immediately above, tolerating `#[...]` attributes in between.
fn leading_doc(lines: &[&str], decl_idx: usize) -> Option<String> {
    let mut i = decl_idx;
    let mut doc_lines: Vec<&str> = Vec::new();
    while i > 0 {
        let above = lines[i - 1].trim();
        if let Some(rest) = above.strip_prefix("///") {
            doc_lines.push(rest.trim());
            i -= 1;
            continue;
        }
        if above.starts_with("#[") {
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

pub fn extract(text: &str) -> Vec<RawSymbol> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut depth: i32 = 0;
    let mut impl_stack: Vec<(String, i32)> = Vec::new();

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;
        let trimmed = raw_line.trim_start();

        if depth == 0 {
            if let Some(c) = re_impl().captures(trimmed) {
                let type_name = c.get(1).unwrap().as_str().to_string();
                impl_stack.push((type_name, depth));
            } else if let Some(c) = re_struct().captures(trimmed) {
                let name = c.get(2).unwrap().as_str().to_string();
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
                    visibility: visibility_of(c.get(1).map(|m| m.as_str())),
                });
            } else if let Some(c) = re_trait().captures(trimmed) {
                let name = c.get(2).unwrap().as_str().to_string();
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
                    visibility: visibility_of(c.get(1).map(|m| m.as_str())),
                });
            } else if let Some(c) = re_enum().captures(trimmed) {
                let name = c.get(2).unwrap().as_str().to_string();
                out.push(RawSymbol {
                    name: name.clone(),
                    id_fragment: None,
                    kind: SymbolKind::Enum,
                    line: line_no,
                    end_line: None,
                    col: 0,
                    end_col: None,
                    signature: Some(signature_of(trimmed)),
                    docstring_summary: leading_doc(&lines, idx),
                    visibility: visibility_of(c.get(1).map(|m| m.as_str())),
                });
            } else if let Some(c) = re_const().captures(trimmed) {
                let name = c.get(3).unwrap().as_str().to_string();
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
                    visibility: visibility_of(c.get(1).map(|m| m.as_str())),
                });
            } else if let Some(c) = re_fn().captures(trimmed) {
                let name = c.get(5).unwrap().as_str().to_string();
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
                    visibility: visibility_of(c.get(1).map(|m| m.as_str())),
                });
            }
        } else if let Some((type_name, impl_depth)) = impl_stack.last().cloned() {
            if depth == impl_depth + 1 {
                if let Some(c) = re_fn().captures(trimmed) {
                    let name = c.get(5).unwrap().as_str().to_string();
                    out.push(RawSymbol {
                        name: name.clone(),
                        id_fragment: Some(format!("{type_name}::{name}")),
                        kind: SymbolKind::Method,
                        line: line_no,
                        end_line: None,
                        col: 0,
                        end_col: None,
                        signature: Some(signature_of(trimmed)),
                        docstring_summary: leading_doc(&lines, idx),
                        visibility: visibility_of(c.get(1).map(|m| m.as_str())),
                    });
                }
            }
        }

        for ch in raw_line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if let Some((_, impl_depth)) = impl_stack.last() {
                        if depth <= *impl_depth {
                            impl_stack.pop();
                        }
                    }
                }
                _ => {}
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_struct_and_impl_method() {
        let text = "pub struct S {}\n\nimpl S {\n    pub fn new() -> S { S {} }\n}\n";
        let raws = extract(text);
        assert_eq!(raws.len(), 2);
        assert_eq!(raws[0].name, "S");
        assert_eq!(raws[0].kind, SymbolKind::Class);
        assert_eq!(raws[0].visibility, Visibility::Export);
        assert_eq!(raws[1].name, "new");
        assert_eq!(raws[1].kind, SymbolKind::Method);
        assert_eq!(raws[1].id_fragment.as_deref(), Some("S::new"));
    }

    #[test]
    fn private_items_have_private_visibility() {
        let raws = extract("fn helper() {}\n");
        assert_eq!(raws[0].visibility, Visibility::Private);
    }

    #[test]
    fn trait_and_enum_are_recognized() {
        let raws = extract("pub trait Greeter {}\npub enum Color { Red, Green }\n");
        assert_eq!(raws[0].kind, SymbolKind::Interface);
        assert_eq!(raws[1].kind, SymbolKind::Enum);
    }

    #[test]
    fn doc_comment_tolerates_attributes() {
        let text = "/// Computes the answer.\n#[inline]\npub fn answer() -> i32 { 42 }\n";
        let raws = extract(text);
        assert_eq!(raws[0].docstring_summary.as_deref(), Some("Computes the answer."));
    }

    #[test]
    fn impl_trait_for_type_groups_methods_under_type() {
        let text = "struct S;\nimpl std::fmt::Display for S {\n    fn fmt(&self) {}\n}\n";
        let raws = extract(text);
        let method = raws.iter().find(|r| r.name == "fmt").unwrap();
        assert_eq!(method.id_fragment.as_deref(), Some("S::fmt"));
    }
}
