//! Rust extraction. Functions inside an `impl` block take the implemented
//! type as their scope; `impl Trait for Type` yields `implements` edges.

use super::{
    CstCall, CstHeritage, CstSymbol, LanguageCst, join_scope, new_parser, node_text, parse, span,
    type_name,
};
use crate::error::Result;
use crate::model::{SymbolKind, TypeRelation};
use crate::util::first_line;
use tree_sitter::{Node, Parser};

pub struct RustCst {
    parser: Parser,
}

impl RustCst {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: new_parser(tree_sitter_rust::LANGUAGE)?,
        })
    }
}

impl LanguageCst for RustCst {
    fn symbols(&mut self, source: &str) -> Result<Vec<CstSymbol>> {
        let tree = parse(&mut self.parser, source)?;
        let mut out = Vec::new();
        walk_symbols(tree.root_node(), "", false, source, &mut out);
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
        super::for_each_node(tree.root_node(), &mut |node| {
            if node.kind() != "impl_item" {
                return;
            }
            let trait_node = node.child_by_field_name("trait");
            let type_node = node.child_by_field_name("type");
            if let (Some(trait_node), Some(type_node)) = (trait_node, type_node) {
                let parent = type_name(trait_node, source);
                let child = type_name(type_node, source);
                if !parent.is_empty() && !child.is_empty() {
                    out.push(CstHeritage {
                        child,
                        parent,
                        relation: TypeRelation::Implements,
                    });
                }
            }
        });
        Ok(out)
    }
}

fn walk_symbols(
    node: Node<'_>,
    scope: &str,
    in_impl: bool,
    source: &str,
    out: &mut Vec<CstSymbol>,
) {
    let mut child_scope = scope.to_string();
    let mut child_in_impl = in_impl;
    match node.kind() {
        "function_item" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source);
                let kind = if in_impl {
                    SymbolKind::Method
                } else {
                    SymbolKind::Function
                };
                let (start_line, start_col, end_line, end_col) = span(node);
                out.push(CstSymbol {
                    name: name.to_string(),
                    kind,
                    scope: scope.to_string(),
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                    signature: Some(first_line(node_text(node, source))),
                });
                child_scope = join_scope(scope, name);
                child_in_impl = false;
            }
        }
        "struct_item" | "enum_item" | "trait_item" | "mod_item" | "type_item" | "const_item"
        | "static_item" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source);
                let kind = match node.kind() {
                    "struct_item" => SymbolKind::Struct,
                    "enum_item" => SymbolKind::Enum,
                    "trait_item" => SymbolKind::Interface,
                    "mod_item" => SymbolKind::Module,
                    "type_item" => SymbolKind::Type,
                    "const_item" => SymbolKind::Constant,
                    _ => SymbolKind::Variable,
                };
                let (start_line, start_col, end_line, end_col) = span(node);
                out.push(CstSymbol {
                    name: name.to_string(),
                    kind,
                    scope: scope.to_string(),
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                    signature: None,
                });
                child_scope = join_scope(scope, name);
            }
        }
        "impl_item" => {
            // Methods belong to the implemented type, not the impl block.
            if let Some(type_node) = node.child_by_field_name("type") {
                let type_display = type_name(type_node, source);
                if !type_display.is_empty() {
                    child_scope = join_scope(scope, &type_display);
                    child_in_impl = true;
                }
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_symbols(child, &child_scope, child_in_impl, source, out);
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
        "function_item" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                child_scope = join_scope(scope, node_text(name_node, source));
                owned = child_scope.clone();
                enclosing = Some(&owned);
            }
        }
        "impl_item" => {
            if let Some(type_node) = node.child_by_field_name("type") {
                let type_display = type_name(type_node, source);
                if !type_display.is_empty() {
                    child_scope = join_scope(scope, &type_display);
                }
            }
        }
        "mod_item" => {
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
    let func = node.child_by_field_name("function")?;
    match func.kind() {
        "field_expression" => func
            .child_by_field_name("field")
            .map(|field| node_text(field, source).to_string()),
        "identifier" => Some(node_text(func, source).to_string()),
        // path::to::func keeps only the tail identifier.
        "scoped_identifier" => {
            let count = func.named_child_count();
            if count == 0 {
                return None;
            }
            func.named_child(count - 1)
                .map(|last| node_text(last, source).to_string())
        }
        _ => None,
    }
}
