//! Java extraction: class/interface/enum declarations, method invocations,
//! extends/implements heritage.

use super::{
    CstCall, CstHeritage, CstSymbol, LanguageCst, join_scope, new_parser, node_text, parse, span,
    type_name,
};
use crate::error::Result;
use crate::model::{SymbolKind, TypeRelation};
use crate::util::first_line;
use tree_sitter::{Node, Parser};

pub struct JavaCst {
    parser: Parser,
}

impl JavaCst {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: new_parser(tree_sitter_java::LANGUAGE)?,
        })
    }
}

impl LanguageCst for JavaCst {
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

fn definition_kind(node: Node<'_>) -> Option<SymbolKind> {
    match node.kind() {
        "class_declaration" => Some(SymbolKind::Class),
        "interface_declaration" => Some(SymbolKind::Interface),
        "enum_declaration" => Some(SymbolKind::Enum),
        "method_declaration" => Some(SymbolKind::Method),
        "constructor_declaration" => Some(SymbolKind::Constructor),
        "enum_constant" => Some(SymbolKind::EnumMember),
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
                let signature =
                    matches!(kind, SymbolKind::Method | SymbolKind::Constructor)
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
        "method_declaration" | "constructor_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                child_scope = join_scope(scope, node_text(name_node, source));
                owned = child_scope.clone();
                enclosing = Some(&owned);
            }
        }
        "class_declaration" | "interface_declaration" | "enum_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                child_scope = join_scope(scope, node_text(name_node, source));
            }
        }
        "method_invocation" => {
            if let (Some(caller), Some(name_node)) = (enclosing, node.child_by_field_name("name"))
            {
                let callee = node_text(name_node, source);
                if !callee.is_empty() {
                    let (line, column, _, _) = span(node);
                    out.push(CstCall {
                        caller: caller.to_string(),
                        callee: callee.to_string(),
                        line,
                        column,
                    });
                }
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_calls(child, &child_scope, enclosing, source, out);
    }
}

/// `class Foo extends Bar implements IBaz, IQux`.
fn walk_heritage(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstHeritage>) {
    let mut child_scope = scope.to_string();
    if node.kind() == "class_declaration" {
        if let Some(name_node) = node.child_by_field_name("name") {
            let child = join_scope(scope, node_text(name_node, source));

            if let Some(superclass) = node.child_by_field_name("superclass") {
                let mut cursor = superclass.walk();
                for parent_node in superclass.named_children(&mut cursor) {
                    let parent = type_name(parent_node, source);
                    if parent.is_empty() {
                        continue;
                    }
                    out.push(CstHeritage {
                        child: child.clone(),
                        parent,
                        relation: TypeRelation::Extends,
                    });
                }
            }

            if let Some(interfaces) = node.child_by_field_name("interfaces") {
                let mut cursor = interfaces.walk();
                for type_list in interfaces.named_children(&mut cursor) {
                    if type_list.kind() != "type_list" {
                        continue;
                    }
                    let mut list_cursor = type_list.walk();
                    for parent_node in type_list.named_children(&mut list_cursor) {
                        let parent = type_name(parent_node, source);
                        if parent.is_empty() {
                            continue;
                        }
                        out.push(CstHeritage {
                            child: child.clone(),
                            parent,
                            relation: TypeRelation::Implements,
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
