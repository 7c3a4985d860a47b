//! Swift extraction. The grammar folds class, struct, enum and actor
//! declarations into one node kind; the introducing keyword token decides
//! the symbol kind. The first inheritance entry is the superclass, the rest
//! are protocol conformances.

use super::{
    CstCall, CstHeritage, CstSymbol, LanguageCst, join_scope, new_parser, node_text, parse, span,
    type_name,
};
use crate::error::Result;
use crate::model::{SymbolKind, TypeRelation};
use crate::util::first_line;
use tree_sitter::{Node, Parser};

pub struct SwiftCst {
    parser: Parser,
}

impl SwiftCst {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: new_parser(tree_sitter_swift::LANGUAGE)?,
        })
    }
}

impl LanguageCst for SwiftCst {
    fn symbols(&mut self, source: &str) -> Result<Vec<CstSymbol>> {
        let tree = parse(&mut self.parser, source)?;
        let mut out = Vec::new();
        walk_symbols(tree.root_node(), "", source, &mut out);
        Ok(out)
    }

    fn calls(&mut self, source: &str) -> Result<Vec<CstCall>> {
        let tree = parse(&mut self.parser, source)?;
        let mut out = Vec::new();
        walk_calls(tree.root_node(), "", None, source, &mut out);
        Ok(out)
    }

    fn heritage(&mut self, source: &str) -> Result<Vec<CstHeritage>> {
        let tree = parse(&mut self.parser, source)?;
        let mut out = Vec::new();
        walk_heritage(tree.root_node(), "", source, &mut out);
        Ok(out)
    }
}

/// The keyword token introducing a `class_declaration` node.
fn class_like_kind(node: Node<'_>) -> SymbolKind {
    for idx in 0..node.child_count() {
        if let Some(child) = node.child(idx) {
            match child.kind() {
                "class" | "actor" => return SymbolKind::Class,
                "struct" => return SymbolKind::Struct,
                "enum" => return SymbolKind::Enum,
                _ => {}
            }
        }
    }
    SymbolKind::Class
}

fn walk_symbols(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstSymbol>) {
    let mut child_scope = scope.to_string();
    let entry = match node.kind() {
        "function_declaration" => {
            let kind = if scope.is_empty() {
                SymbolKind::Function
            } else {
                SymbolKind::Method
            };
            Some((kind, Some(first_line(node_text(node, source)))))
        }
        "class_declaration" => Some((class_like_kind(node), None)),
        "protocol_declaration" => Some((SymbolKind::Interface, None)),
        _ => None,
    };
    if let Some((kind, signature)) = entry {
        if let Some(name_node) = node.child_by_field_name("name") {
            let name = node_text(name_node, source);
            if !name.is_empty() {
                let (start_line, start_col, end_line, end_col) = span(node);
                out.push(CstSymbol {
                    name: name.to_string(),
                    kind,
                    scope: scope.to_string(),
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                    signature,
                });
                child_scope = join_scope(scope, name);
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_symbols(child, &child_scope, source, out);
    }
}

fn walk_calls(
    node: Node<'_>,
    scope: &str,
    enclosing: Option<&str>,
    source: &str,
    out: &mut Vec<CstCall>,
) {
    let mut child_scope = scope.to_string();
    let owned;
    let mut enclosing = enclosing;
    match node.kind() {
        "function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                child_scope = join_scope(scope, node_text(name_node, source));
                owned = child_scope.clone();
                enclosing = Some(&owned);
            }
        }
        "class_declaration" | "protocol_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                child_scope = join_scope(scope, node_text(name_node, source));
            }
        }
        "call_expression" => {
            if let (Some(caller), Some(callee)) = (enclosing, callee_name(node, source)) {
                let (line, column, _, _) = span(node);
                out.push(CstCall {
                    caller: caller.to_string(),
                    callee,
                    line,
                    column,
                });
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_calls(child, &child_scope, enclosing, source, out);
    }
}

fn callee_name(node: Node<'_>, source: &str) -> Option<String> {
    let target = node.named_child(0)?;
    match target.kind() {
        "simple_identifier" => Some(node_text(target, source).to_string()),
        "navigation_expression" => {
            let suffix = target.child_by_field_name("suffix")?;
            let name = suffix
                .named_child(0)
                .map(|inner| node_text(inner, source))
                .unwrap_or_else(|| node_text(suffix, source));
            let trimmed = name.trim_start_matches('.');
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

fn walk_heritage(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstHeritage>) {
    let mut child_scope = scope.to_string();
    if node.kind() == "class_declaration" {
        if let Some(name_node) = node.child_by_field_name("name") {
            let child = join_scope(scope, node_text(name_node, source));
            let mut cursor = node.walk();
            let mut position = 0usize;
            for spec in node.named_children(&mut cursor) {
                if spec.kind() != "inheritance_specifier" {
                    continue;
                }
                let parent = spec
                    .named_child(0)
                    .map(|inner| type_name(inner, source))
                    .unwrap_or_default();
                if parent.is_empty() {
                    continue;
                }
                let relation = if position == 0 {
                    TypeRelation::Extends
                } else {
                    TypeRelation::Implements
                };
                out.push(CstHeritage {
                    child: child.clone(),
                    parent,
                    relation,
                });
                position += 1;
            }
            child_scope = child;
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_heritage(child, &child_scope, source, out);
    }
}
