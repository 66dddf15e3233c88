//! Symbol extraction: per-language regex baselines plus an optional ordered
//! sequence of adapters that may pre-empt the baseline.

mod go_lang;
mod python;
mod rust_lang;
mod ts;

#[cfg(feature = "treesitter")]
pub mod treesitter;

use crate::error::Warning;
use crate::fsutil::Language;
use crate::model::{Position, Span, Symbol, SymbolKind, Visibility};
use std::collections::HashMap;

/// Extractor output before symbol-ID assignment.
#[derive(Debug, Clone)]
pub struct RawSymbol {
    /// Bare name as it should appear in `Symbol.name`, and the key used for
    /// collision tracking (e.g. `"f"`, `"new"`, `"Method"`).
    pub name: String,
    /// Fragment appended after `{file}::` to build the symbol ID, e.g. `"f"`,
    /// `"C.f"`, `"S::new"`. Defaults to `name` when unset.
    pub id_fragment: Option<String>,
    pub kind: SymbolKind,
    pub line: u32,
    pub end_line: Option<u32>,
    pub col: u32,
    pub end_col: Option<u32>,
    pub signature: Option<String>,
    pub docstring_summary: Option<String>,
    pub visibility: Visibility,
}

impl RawSymbol {
    fn id_fragment(&self) -> &str {
        self.id_fragment.as_deref().unwrap_or(&self.name)
    }
}

/// An optional pre-empting extractor, tried in the order supplied.
pub trait Adapter: Send + Sync {
    fn name(&self) -> &str;
    fn is_available(&self) -> bool;
    fn extract_symbols(&self, rel_path: &str, text: &str) -> Option<Vec<RawSymbol>>;
}

/// Run the baseline regex extractor for `language` over `text`.
pub fn baseline_extract(language: Language, text: &str) -> Vec<RawSymbol> {
    match language {
        Language::TypeScript | Language::JavaScript => ts::extract(text),
        Language::Python => python::extract(text),
        Language::Rust => rust_lang::extract(text),
        Language::Go => go_lang::extract(text),
        _ => Vec::new(),
    }
}

/// Extract symbols for one file: try adapters in order, falling back to the
/// regex baseline. Returns the finished, ID-assigned symbols plus the name of
/// the adapter used, if any.
pub fn extract_for_file(
    rel_path: &str,
    text: &str,
    language: Language,
    adapters: &[Box<dyn Adapter>],
) -> (Vec<Symbol>, Option<String>) {
    for adapter in adapters {
        if !adapter.is_available() {
            continue;
        }
        if let Some(raw) = adapter.extract_symbols(rel_path, text) {
            if !raw.is_empty() {
                return (assign_ids(rel_path, raw), Some(adapter.name().to_string()));
            }
        }
    }
    let raw = baseline_extract(language, text);
    (assign_ids(rel_path, raw), None)
}

/// Assign stable `symbol_id`s. Collisions are tracked by bare `name`; only
/// the second-and-later occurrence of a given name gets a `:L{line}` suffix,
/// so the first occurrence keeps a clean, line-independent ID.
pub fn assign_ids(file: &str, raws: Vec<RawSymbol>) -> Vec<Symbol> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raws.len());
    for r in raws {
        let count = seen.entry(r.name.clone()).or_insert(0);
        *count += 1;
        let base = format!("{file}::{}", r.id_fragment());
        let symbol_id = if *count == 1 { base } else { format!("{base}:L{}", r.line) };

        let span = Some(Span {
            start: Position { line: r.line, col: r.col },
            end: Position { line: r.end_line.unwrap_or(r.line), col: r.end_col.unwrap_or(r.col) },
        });

        out.push(Symbol {
            symbol_id,
            name: r.name,
            kind: r.kind,
            file: file.to_string(),
            span,
            signature: r.signature,
            docstring_summary: r.docstring_summary,
            visibility: r.visibility,
            top_callers: Vec::new(),
            top_callees: Vec::new(),
            tags: Vec::new(),
        });
    }
    out
}

/// Collapse runs of whitespace to single spaces and truncate to `max` chars
/// with a trailing `...` when truncated.
pub fn collapse_truncate(s: &str, max: usize) -> String {
    let collapsed: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        collapsed
    } else {
        let truncated: String = collapsed.chars().take(max).collect();
        format!("{truncated}...")
    }
}

/// TS/JS "name followed by parens" heuristic keyword rejection set.
pub const TS_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "return", "throw", "try", "catch", "finally", "new",
    "typeof", "instanceof", "void", "delete", "await", "yield", "import", "export", "default", "from", "as", "with",
    "debugger", "super", "this", "constructor", "get", "set",
];

pub fn is_ts_keyword(name: &str) -> bool {
    TS_KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, id_fragment: Option<&str>, line: u32) -> RawSymbol {
        RawSymbol {
            name: name.to_string(),
            id_fragment: id_fragment.map(str::to_string),
            kind: SymbolKind::Function,
            line,
            end_line: None,
            col: 0,
            end_col: None,
            signature: None,
            docstring_summary: None,
            visibility: Visibility::Export,
        }
    }

    #[test]
    fn first_occurrence_keeps_base_id() {
        let symbols = assign_ids("src/a.ts", vec![raw("f", None, 1)]);
        assert_eq!(symbols[0].symbol_id, "src/a.ts::f");
    }

    #[test]
    fn second_occurrence_of_bare_name_gets_line_suffix() {
        let raws = vec![raw("f", None, 1), raw("C", None, 3), raw("f", Some("C.f"), 5)];
        let symbols = assign_ids("src/a.ts", raws);
        assert_eq!(symbols[0].symbol_id, "src/a.ts::f");
        assert_eq!(symbols[1].symbol_id, "src/a.ts::C");
        assert_eq!(symbols[2].symbol_id, "src/a.ts::C.f:L5");
    }

    #[test]
    fn collapse_truncate_collapses_whitespace() {
        assert_eq!(collapse_truncate("a   b\tc\n d", 100), "a b c d");
    }

    #[test]
    fn collapse_truncate_truncates_with_ellipsis() {
        let long = "a".repeat(250);
        let out = collapse_truncate(&long, 200);
        assert_eq!(out.chars().count(), 203);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn keyword_filter_rejects_control_flow_names() {
        assert!(is_ts_keyword("constructor"));
        assert!(is_ts_keyword("get"));
        assert!(!is_ts_keyword("handleClick"));
    }
}
