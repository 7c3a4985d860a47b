//! TypeScript / TSX / JavaScript extraction. JavaScript rides the
//! TypeScript grammar, the way the analyzers treat it too.

use super::{
    CstCall, CstHeritage, CstSymbol, LanguageCst, join_scope, new_parser, node_text, parse, span,
    type_name,
};
use crate::error::Result;
use crate::model::{SymbolKind, TypeRelation};
use crate::util::first_line;
use tree_sitter::{Node, Parser};

pub struct TypescriptCst {
    parser: Parser,
}

impl TypescriptCst {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: new_parser(tree_sitter_typescript::LANGUAGE_TYPESCRIPT)?,
        })
    }
}

impl LanguageCst for TypescriptCst {
    fn symbols(&mut self, source: &str) -> Result<Vec<CstSymbol>> {
        extract_symbols(&mut self.parser, source)
    }

    fn calls(&mut self, source: &str) -> Result<Vec<CstCall>> {
        extract_calls(&mut self.parser, source)
    }

    fn heritage(&mut self, source: &str) -> Result<Vec<CstHeritage>> {
        extract_heritage(&mut self.parser, source)
    }
}

pub struct TsxCst {
    parser: Parser,
}

impl TsxCst {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: new_parser(tree_sitter_typescript::LANGUAGE_TSX)?,
        })
    }
}

impl LanguageCst for TsxCst {
    fn symbols(&mut self, source: &str) -> Result<Vec<CstSymbol>> {
        extract_symbols(&mut self.parser, source)
    }

    fn calls(&mut self, source: &str) -> Result<Vec<CstCall>> {
        extract_calls(&mut self.parser, source)
    }

    fn heritage(&mut self, source: &str) -> Result<Vec<CstHeritage>> {
        extract_heritage(&mut self.parser, source)
    }
}

fn extract_symbols(parser: &mut Parser, source: &str) -> Result<Vec<CstSymbol>> {
    let tree = parse(parser, source)?;
    let mut out = Vec::new();
    walk_symbols(tree.root_node(), "", source, &mut out);
    Ok(out)
}

fn extract_calls(parser: &mut Parser, source: &str) -> Result<Vec<CstCall>> {
    let tree = parse(parser, source)?;
    let mut out = Vec::new();
    walk_calls(tree.root_node(), "", None, source, &mut out);
    Ok(out)
}

fn extract_heritage(parser: &mut Parser, source: &str) -> Result<Vec<CstHeritage>> {
    let tree = parse(parser, source)?;
    let mut out = Vec::new();
    walk_heritage(tree.root_node(), "", source, &mut out);
    Ok(out)
}

fn definition_kind(node: Node<'_>) -> Option<SymbolKind> {
    match node.kind() {
        "function_declaration" => Some(SymbolKind::Function),
        "class_declaration" => Some(SymbolKind::Class),
        "interface_declaration" => Some(SymbolKind::Interface),
        "enum_declaration" => Some(SymbolKind::Enum),
        "type_alias_declaration" => Some(SymbolKind::Type),
        "method_definition" => Some(SymbolKind::Method),
        _ => None,
    }
}

fn walk_symbols(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstSymbol>) {
    let mut child_scope = scope.to_string();
    if let Some(kind) = definition_kind(node) {
        if let Some(name_node) = node.child_by_field_name("name") {
            let name = node_text(name_node, source);
            if !name.is_empty() {
                let (start_line, start_col, end_line, end_col) = span(node);
                let signature = matches!(kind, SymbolKind::Function | SymbolKind::Method)
                    .then(|| first_line(node_text(node, source)));
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
        "function_declaration" | "method_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                child_scope = join_scope(scope, node_text(name_node, source));
                owned = child_scope.clone();
                enclosing = Some(&owned);
            }
        }
        "class_declaration" => {
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
    let func = node
        .child_by_field_name("function")
        .or_else(|| node.named_child(0))?;
    match func.kind() {
        "member_expression" => func
            .child_by_field_name("property")
            .map(|prop| node_text(prop, source).to_string()),
        "identifier" => Some(node_text(func, source).to_string()),
        _ => None,
    }
}

/// `class Foo extends Bar implements Baz`: the heritage clause separates
/// the two relationships explicitly.
fn walk_heritage(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstHeritage>) {
    let mut child_scope = scope.to_string();
    if node.kind() == "class_declaration" {
        if let Some(name_node) = node.child_by_field_name("name") {
            let child = join_scope(scope, node_text(name_node, source));
            let mut cursor = node.walk();
            for heritage in node.named_children(&mut cursor) {
                if heritage.kind() != "class_heritage" {
                    continue;
                }
                let mut clause_cursor = heritage.walk();
                for clause in heritage.named_children(&mut clause_cursor) {
                    let relation = match clause.kind() {
                        "extends_clause" => TypeRelation::Extends,
                        "implements_clause" => TypeRelation::Implements,
                        _ => continue,
                    };
                    let mut type_cursor = clause.walk();
                    for parent_node in clause.named_children(&mut type_cursor) {
                        if parent_node.kind() == "type_arguments" {
                            continue;
                        }
                        let parent = type_name(parent_node, source);
                        if parent.is_empty() {
                            continue;
                        }
                        out.push(CstHeritage {
                            child: child.clone(),
                            parent,
                            relation,
                        });
                    }
                }
            }
            child_scope = child;
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_heritage(child, &child_scope, source, out);
    }
}
