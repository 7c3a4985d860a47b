//! Go extraction: declarations, call expressions, struct embedding.

use super::{
    CstCall, CstHeritage, CstSymbol, LanguageCst, new_parser, node_text, parse, span, type_name,
};
use crate::error::Result;
use crate::model::{SymbolKind, TypeRelation};
use crate::util::first_line;
use tree_sitter::{Node, Parser};

pub struct GoCst {
    parser: Parser,
}

impl GoCst {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: new_parser(tree_sitter_go::LANGUAGE)?,
        })
    }
}

impl LanguageCst for GoCst {
    fn symbols(&mut self, source: &str) -> Result<Vec<CstSymbol>> {
        let tree = parse(&mut self.parser, source)?;
        let mut out = Vec::new();
        walk_symbols(tree.root_node(), "", source, &mut out);
        Ok(out)
    }

    fn calls(&mut self, source: &str) -> Result<Vec<CstCall>> {
        let tree = parse(&mut self.parser, source)?;
        let mut out = Vec::new();
        walk_calls(tree.root_node(), None, source, &mut out);
        Ok(out)
    }

    fn heritage(&mut self, source: &str) -> Result<Vec<CstHeritage>> {
        let tree = parse(&mut self.parser, source)?;
        let mut out = Vec::new();
        super::for_each_node(tree.root_node(), &mut |node| {
            if node.kind() == "type_declaration" {
                collect_embeds(node, source, &mut out);
            }
        });
        Ok(out)
    }
}

fn walk_symbols(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstSymbol>) {
    match node.kind() {
        "function_declaration" => {
            if let Some(symbol) = named_symbol(node, scope, source, SymbolKind::Function, true) {
                out.push(symbol);
            }
        }
        "method_declaration" => {
            if let Some(symbol) = named_symbol(node, scope, source, SymbolKind::Method, true) {
                out.push(symbol);
            }
        }
        "type_declaration" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() != "type_spec" {
                    continue;
                }
                let Some(name_node) = child.child_by_field_name("name") else {
                    continue;
                };
                let kind = match child.child_by_field_name("type").map(|t| t.kind()) {
                    Some("struct_type") => SymbolKind::Struct,
                    Some("interface_type") => SymbolKind::Interface,
                    _ => SymbolKind::Type,
                };
                let (start_line, start_col, end_line, end_col) = span(child);
                out.push(CstSymbol {
                    name: node_text(name_node, source).to_string(),
                    kind,
                    scope: scope.to_string(),
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                    signature: None,
                });
            }
        }
        "const_declaration" | "var_declaration" => {
            let kind = if node.kind() == "const_declaration" {
                SymbolKind::Constant
            } else {
                SymbolKind::Variable
            };
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() != "const_spec" && child.kind() != "var_spec" {
                    continue;
                }
                let Some(name_node) = child.child_by_field_name("name") else {
                    continue;
                };
                let (start_line, start_col, end_line, end_col) = span(child);
                out.push(CstSymbol {
                    name: node_text(name_node, source).to_string(),
                    kind,
                    scope: scope.to_string(),
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                    signature: None,
                });
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_symbols(child, scope, source, out);
    }
}

fn named_symbol(
    node: Node<'_>,
    scope: &str,
    source: &str,
    kind: SymbolKind,
    with_signature: bool,
) -> Option<CstSymbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source);
    if name.is_empty() {
        return None;
    }
    let (start_line, start_col, end_line, end_col) = span(node);
    Some(CstSymbol {
        name: name.to_string(),
        kind,
        scope: scope.to_string(),
        start_line,
        start_col,
        end_line,
        end_col,
        signature: with_signature.then(|| first_line(node_text(node, source))),
    })
}

fn walk_calls(node: Node<'_>, enclosing: Option<&str>, source: &str, out: &mut Vec<CstCall>) {
    let owned;
    let mut enclosing = enclosing;
    match node.kind() {
        "function_declaration" | "method_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                owned = node_text(name_node, source).to_string();
                enclosing = Some(&owned);
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
        walk_calls(child, enclosing, source, out);
    }
}

fn callee_name(node: Node<'_>, source: &str) -> Option<String> {
    let func = node.child_by_field_name("function")?;
    match func.kind() {
        "selector_expression" => func
            .child_by_field_name("field")
            .map(|field| node_text(field, source).to_string()),
        "identifier" => Some(node_text(func, source).to_string()),
        _ => None,
    }
}

/// Embedded struct fields declare `embeds` edges: a field with a type but no
/// name inside a struct literal type.
fn collect_embeds(decl: Node<'_>, source: &str, out: &mut Vec<CstHeritage>) {
    let mut cursor = decl.walk();
    for type_spec in decl.named_children(&mut cursor) {
        if type_spec.kind() != "type_spec" {
            continue;
        }
        let Some(name_node) = type_spec.child_by_field_name("name") else {
            continue;
        };
        let Some(type_node) = type_spec.child_by_field_name("type") else {
            continue;
        };
        if type_node.kind() != "struct_type" {
            continue;
        }
        let child_name = node_text(name_node, source).to_string();
        let mut body_cursor = type_node.walk();
        for field_list in type_node.named_children(&mut body_cursor) {
            if field_list.kind() != "field_declaration_list" {
                continue;
            }
            let mut field_cursor = field_list.walk();
            for field in field_list.named_children(&mut field_cursor) {
                if field.kind() != "field_declaration" {
                    continue;
                }
                if field.child_by_field_name("name").is_some() {
                    continue;
                }
                let Some(embedded) = field.child_by_field_name("type") else {
                    continue;
                };
                out.push(CstHeritage {
                    child: child_name.clone(),
                    parent: embedded_type_name(embedded, source),
                    relation: TypeRelation::Embeds,
                });
            }
        }
    }
}

fn embedded_type_name(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        // *Base strips to Base; pkg.Base keeps the qualifier.
        "pointer_type" => node
            .named_child(0)
            .map(|inner| embedded_type_name(inner, source))
            .unwrap_or_default(),
        _ => type_name(node, source),
    }
}
