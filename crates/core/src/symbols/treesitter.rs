//! Tree-sitter backed adapter, behind the `treesitter` feature. Parses Rust,
//! TypeScript/JS, Python, and Go with real grammars instead of the regex
//! baseline; falls back to `None` (letting the baseline run) for anything
//! else or on a parse failure.

use super::{collapse_truncate, Adapter, RawSymbol};
use crate::fsutil::{language_of, Language};
use crate::model::{SymbolKind, Visibility};
use std::path::Path;
use tree_sitter::{Node, Parser, Point};

pub struct TreesitterAdapter;

impl TreesitterAdapter {
    pub fn new() -> Self {
        TreesitterAdapter
    }
}

impl Default for TreesitterAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for TreesitterAdapter {
    fn name(&self) -> &str {
        "treesitter"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn extract_symbols(&self, rel_path: &str, text: &str) -> Option<Vec<RawSymbol>> {
        let language = language_of(Path::new(rel_path));
        let ts_language = match language {
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::JavaScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
            _ => return None,
        };

        let mut parser = Parser::new();
        parser.set_language(&ts_language).ok()?;
        let tree = parser.parse(text, None)?;
        let bytes = text.as_bytes();

        Some(match language {
            Language::Rust => extract_rust(tree.root_node(), bytes),
            Language::Python => extract_python(tree.root_node(), bytes),
            Language::Go => extract_go(tree.root_node(), bytes),
            Language::TypeScript | Language::JavaScript => extract_typescript(tree.root_node(), bytes),
            _ => Vec::new(),
        })
    }
}

fn text_of<'a>(node: Node, bytes: &'a [u8]) -> &'a str {
    node.utf8_text(bytes).unwrap_or("")
}

fn line_of(point: Point) -> u32 {
    point.row as u32 + 1
}

fn signature_of(node: Node, bytes: &[u8]) -> String {
    let full = text_of(node, bytes);
    let head = full.split(['{', ';']).next().unwrap_or(full);
    collapse_truncate(head.trim(), 200)
}

/// Nearest preceding `///`/`//!` line-comment run, joined, first non-empty line kept.
fn rust_doc_comment(node: Node, bytes: &[u8]) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = node.prev_sibling();
    while let Some(n) = current {
        if n.kind() != "line_comment" {
            break;
        }
        let t = text_of(n, bytes);
        if let Some(stripped) = t.strip_prefix("///").or_else(|| t.strip_prefix("//!")) {
            lines.push(stripped.trim().to_string());
            current = n.prev_sibling();
        } else {
            break;
        }
    }
    lines.reverse();
    lines.into_iter().find(|l| !l.is_empty()).map(|l| collapse_truncate(&l, 200))
}

fn raw(name: &str, id_fragment: Option<String>, kind: SymbolKind, node: Node, bytes: &[u8], doc: Option<String>, vis: Visibility) -> RawSymbol {
    let start = node.start_position();
    let end = node.end_position();
    RawSymbol {
        name: name.to_string(),
        id_fragment,
        kind,
        line: line_of(start),
        end_line: Some(line_of(end)),
        col: start.column as u32,
        end_col: Some(end.column as u32),
        signature: Some(signature_of(node, bytes)),
        docstring_summary: doc,
        visibility: vis,
    }
}

fn extract_rust(root: Node, bytes: &[u8]) -> Vec<RawSymbol> {
    let mut out = Vec::new();
    let mut cursor = root.walk();

    for child in root.children(&mut cursor) {
        match child.kind() {
            "function_item" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = text_of(name_node, bytes);
                    out.push(raw(name, None, SymbolKind::Function, child, bytes, rust_doc_comment(child, bytes), Visibility::Public));
                }
            }
            "struct_item" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = text_of(name_node, bytes);
                    out.push(raw(name, None, SymbolKind::Class, child, bytes, rust_doc_comment(child, bytes), Visibility::Public));
                }
            }
            "trait_item" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = text_of(name_node, bytes);
                    out.push(raw(name, None, SymbolKind::Interface, child, bytes, rust_doc_comment(child, bytes), Visibility::Public));
                }
            }
            "enum_item" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = text_of(name_node, bytes);
                    out.push(raw(name, None, SymbolKind::Enum, child, bytes, rust_doc_comment(child, bytes), Visibility::Public));
                }
            }
            "const_item" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = text_of(name_node, bytes);
                    out.push(raw(name, None, SymbolKind::Constant, child, bytes, rust_doc_comment(child, bytes), Visibility::Public));
                }
            }
            "impl_item" => {
                let type_name = child.child_by_field_name("type").map(|n| text_of(n, bytes).to_string());
                let Some(type_name) = type_name else { continue };
                let Some(body) = child.child_by_field_name("body") else { continue };
                let mut body_cursor = body.walk();
                for member in body.children(&mut body_cursor) {
                    if member.kind() != "function_item" {
                        continue;
                    }
                    let Some(name_node) = member.child_by_field_name("name") else { continue };
                    let name = text_of(name_node, bytes);
                    out.push(raw(
                        name,
                        Some(format!("{type_name}::{name}")),
                        SymbolKind::Method,
                        member,
                        bytes,
                        rust_doc_comment(member, bytes),
                        Visibility::Public,
                    ));
                }
            }
            _ => {}
        }
    }

    out
}

fn extract_typescript(root: Node, bytes: &[u8]) -> Vec<RawSymbol> {
    let mut out = Vec::new();
    let mut cursor = root.walk();

    for top in root.children(&mut cursor) {
        let candidates: Vec<Node> = if top.kind() == "export_statement" {
            let mut inner_cursor = top.walk();
            top.children(&mut inner_cursor).collect()
        } else {
            vec![top]
        };

        for child in candidates {
            match child.kind() {
                "function_declaration" => {
                    if top.kind() != "export_statement" {
                        continue;
                    }
                    if let Some(name_node) = child.child_by_field_name("name") {
                        let name = text_of(name_node, bytes);
                        out.push(raw(name, None, SymbolKind::Function, child, bytes, None, Visibility::Export));
                    }
                }
                "class_declaration" => {
                    if top.kind() != "export_statement" {
                        continue;
                    }
                    if let Some(name_node) = child.child_by_field_name("name") {
                        let name = text_of(name_node, bytes).to_string();
                        out.push(raw(&name, None, SymbolKind::Class, child, bytes, None, Visibility::Export));
                        if let Some(body) = child.child_by_field_name("body") {
                            let mut body_cursor = body.walk();
                            for member in body.children(&mut body_cursor) {
                                if member.kind() != "method_definition" {
                                    continue;
                                }
                                let Some(name_node) = member.child_by_field_name("name") else { continue };
                                let method_name = text_of(name_node, bytes);
                                out.push(raw(
                                    method_name,
                                    Some(format!("{name}.{method_name}")),
                                    SymbolKind::Method,
                                    member,
                                    bytes,
                                    None,
                                    Visibility::Public,
                                ));
                            }
                        }
                    }
                }
                "interface_declaration" => {
                    if top.kind() != "export_statement" {
                        continue;
                    }
                    if let Some(name_node) = child.child_by_field_name("name") {
                        out.push(raw(text_of(name_node, bytes), None, SymbolKind::Interface, child, bytes, None, Visibility::Export));
                    }
                }
                "type_alias_declaration" => {
                    if top.kind() != "export_statement" {
                        continue;
                    }
                    if let Some(name_node) = child.child_by_field_name("name") {
                        out.push(raw(text_of(name_node, bytes), None, SymbolKind::Type, child, bytes, None, Visibility::Export));
                    }
                }
                "enum_declaration" => {
                    if top.kind() != "export_statement" {
                        continue;
                    }
                    if let Some(name_node) = child.child_by_field_name("name") {
                        out.push(raw(text_of(name_node, bytes), None, SymbolKind::Enum, child, bytes, None, Visibility::Export));
                    }
                }
                "lexical_declaration" => {
                    if top.kind() != "export_statement" {
                        continue;
                    }
                    let mut decl_cursor = child.walk();
                    for declarator in child.children(&mut decl_cursor) {
                        if declarator.kind() != "variable_declarator" {
                            continue;
                        }
                        if let Some(name_node) = declarator.child_by_field_name("name") {
                            out.push(raw(text_of(name_node, bytes), None, SymbolKind::Variable, child, bytes, None, Visibility::Export));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    out
}

fn extract_python(root: Node, bytes: &[u8]) -> Vec<RawSymbol> {
    let mut out = Vec::new();
    let mut cursor = root.walk();

    for child in root.children(&mut cursor) {
        match child.kind() {
            "function_definition" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = text_of(name_node, bytes);
                    let vis = if name.starts_with("__") && name.ends_with("__") {
                        Visibility::Public
                    } else if name.starts_with('_') {
                        Visibility::Private
                    } else {
                        Visibility::Public
                    };
                    out.push(raw(name, None, SymbolKind::Function, child, bytes, python_docstring(child, bytes), vis));
                }
            }
            "class_definition" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = text_of(name_node, bytes).to_string();
                    out.push(raw(&name, None, SymbolKind::Class, child, bytes, python_docstring(child, bytes), Visibility::Public));
                    if let Some(body) = child.child_by_field_name("body") {
                        let mut body_cursor = body.walk();
                        for member in body.children(&mut body_cursor) {
                            if member.kind() != "function_definition" {
                                continue;
                            }
                            let Some(name_node) = member.child_by_field_name("name") else { continue };
                            let method_name = text_of(name_node, bytes);
                            let vis = if method_name.starts_with('_') { Visibility::Private } else { Visibility::Public };
                            out.push(raw(
                                method_name,
                                Some(format!("{name}.{method_name}")),
                                SymbolKind::Method,
                                member,
                                bytes,
                                python_docstring(member, bytes),
                                vis,
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    out
}

/// First statement of `node`'s body, if it's a bare string expression (the
/// idiomatic Python docstring position).
fn python_docstring(node: Node, bytes: &[u8]) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let first = body.children(&mut cursor).next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let mut inner_cursor = first.walk();
    let string_node = first.children(&mut inner_cursor).find(|n| n.kind() == "string")?;
    let raw_text = text_of(string_node, bytes);
    let trimmed = raw_text.trim_matches(['"', '\'']);
    let first_line = trimmed.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        None
    } else {
        Some(collapse_truncate(first_line, 200))
    }
}

fn go_receiver_type(node: Node, bytes: &[u8]) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    let param = receiver.children(&mut cursor).find(|n| n.kind() == "parameter_declaration")?;
    let type_node = param.child_by_field_name("type")?;
    let text = text_of(type_node, bytes);
    Some(text.trim_start_matches('*').to_string())
}

fn extract_go(root: Node, bytes: &[u8]) -> Vec<RawSymbol> {
    let mut out = Vec::new();
    let mut cursor = root.walk();

    for child in root.children(&mut cursor) {
        match child.kind() {
            "function_declaration" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = text_of(name_node, bytes);
                    let vis = if name.chars().next().is_some_and(char::is_uppercase) { Visibility::Export } else { Visibility::Private };
                    out.push(raw(name, None, SymbolKind::Function, child, bytes, None, vis));
                }
            }
            "method_declaration" => {
                let Some(name_node) = child.child_by_field_name("name") else { continue };
                let name = text_of(name_node, bytes);
                let vis = if name.chars().next().is_some_and(char::is_uppercase) { Visibility::Export } else { Visibility::Private };
                let id_fragment = go_receiver_type(child, bytes).map(|recv| format!("{recv}.{name}"));
                out.push(raw(name, id_fragment, SymbolKind::Method, child, bytes, None, vis));
            }
            "type_declaration" => {
                let mut spec_cursor = child.walk();
                for spec in child.children(&mut spec_cursor) {
                    if spec.kind() != "type_spec" {
                        continue;
                    }
                    let Some(name_node) = spec.child_by_field_name("name") else { continue };
                    let name = text_of(name_node, bytes);
                    let vis = if name.chars().next().is_some_and(char::is_uppercase) { Visibility::Export } else { Visibility::Private };
                    let kind = match spec.child_by_field_name("type").map(|n| n.kind()) {
                        Some("struct_type") => SymbolKind::Class,
                        Some("interface_type") => SymbolKind::Interface,
                        _ => SymbolKind::Type,
                    };
                    out.push(raw(name, None, kind, spec, bytes, None, vis));
                }
            }
            "const_declaration" | "var_declaration" => {
                let mut spec_cursor = child.walk();
                for spec in child.children(&mut spec_cursor) {
                    if spec.kind() != "const_spec" && spec.kind() != "var_spec" {
                        continue;
                    }
                    let mut name_cursor = spec.walk();
                    for name_node in spec.children(&mut name_cursor) {
                        if name_node.kind() != "identifier" {
                            continue;
                        }
                        let name = text_of(name_node, bytes);
                        let vis = if name.chars().next().is_some_and(char::is_uppercase) { Visibility::Export } else { Visibility::Private };
                        out.push(raw(name, None, SymbolKind::Constant, spec, bytes, None, vis));
                    }
                }
            }
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_function_and_impl_method_are_extracted() {
        let adapter = TreesitterAdapter::new();
        let text = "/// Adds two numbers.\npub fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n\nstruct Point;\n\nimpl Point {\n    fn new() -> Self {\n        Point\n    }\n}\n";
        let raws = adapter.extract_symbols("src/lib.rs", text).unwrap();
        assert!(raws.iter().any(|r| r.name == "add" && r.docstring_summary.as_deref() == Some("Adds two numbers.")));
        assert!(raws.iter().any(|r| r.name == "Point" && r.kind == SymbolKind::Class));
        assert!(raws.iter().any(|r| r.id_fragment.as_deref() == Some("Point::new")));
    }

    #[test]
    fn go_method_receiver_is_captured_in_id_fragment() {
        let adapter = TreesitterAdapter::new();
        let text = "package main\n\ntype Server struct{}\n\nfunc (s *Server) Start() {}\n";
        let raws = adapter.extract_symbols("main.go", text).unwrap();
        assert!(raws.iter().any(|r| r.id_fragment.as_deref() == Some("Server.Start")));
    }

    #[test]
    fn python_class_and_docstring_method_extracted() {
        let adapter = TreesitterAdapter::new();
        let text = "class Widget:\n    \"\"\"A widget.\"\"\"\n\n    def render(self):\n        pass\n";
        let raws = adapter.extract_symbols("widget.py", text).unwrap();
        assert!(raws.iter().any(|r| r.name == "Widget" && r.docstring_summary.as_deref() == Some("A widget.")));
        assert!(raws.iter().any(|r| r.id_fragment.as_deref() == Some("Widget.render")));
    }

    #[test]
    fn unsupported_language_returns_none() {
        let adapter = TreesitterAdapter::new();
        assert!(adapter.extract_symbols("README.md", "# hi").is_none());
    }
}
