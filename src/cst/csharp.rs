//! C# extraction. The base list does not syntactically separate the base
//! class from interfaces, so the first entry counts as `extends` unless it
//! follows the I-prefix interface naming convention.

use super::{
    CstCall, CstHeritage, CstSymbol, LanguageCst, join_scope, new_parser, node_text, parse, span,
    type_name,
};
use crate::error::Result;
use crate::model::{SymbolKind, TypeRelation};
use crate::util::first_line;
use tree_sitter::{Node, Parser};

pub struct CSharpCst {
    parser: Parser,
}

impl CSharpCst {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: new_parser(tree_sitter_c_sharp::LANGUAGE)?,
        })
    }
}

impl LanguageCst for CSharpCst {
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
        "struct_declaration" => Some(SymbolKind::Struct),
        "interface_declaration" => Some(SymbolKind::Interface),
        "enum_declaration" => Some(SymbolKind::Enum),
        "method_declaration" => Some(SymbolKind::Method),
        "constructor_declaration" => Some(SymbolKind::Constructor),
        "enum_member_declaration" => Some(SymbolKind::EnumMember),
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
        "class_declaration" | "struct_declaration" | "interface_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                child_scope = join_scope(scope, node_text(name_node, source));
            }
        }
        "invocation_expression" => {
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
        "member_access_expression" => func
            .child_by_field_name("name")
            .map(|name| node_text(name, source).to_string()),
        "identifier" => Some(node_text(func, source).to_string()),
        _ => None,
    }
}

fn walk_heritage(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstHeritage>) {
    let mut child_scope = scope.to_string();
    if matches!(node.kind(), "class_declaration" | "struct_declaration") {
        if let Some(name_node) = node.child_by_field_name("name") {
            let child = join_scope(scope, node_text(name_node, source));
            let mut cursor = node.walk();
            for base_list in node.named_children(&mut cursor) {
                if base_list.kind() != "base_list" {
                    continue;
                }
                let mut base_cursor = base_list.walk();
                for (idx, base) in base_list.named_children(&mut base_cursor).enumerate() {
                    let parent = type_name(base, source);
                    if parent.is_empty() {
                        continue;
                    }
                    let relation = if idx == 0 && !looks_like_interface(&parent) {
                        TypeRelation::Extends
                    } else {
                        TypeRelation::Implements
                    };
                    out.push(CstHeritage {
                        child: child.clone(),
                        parent,
                        relation,
                    });
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

/// `IReader`-style names follow the interface naming convention.
fn looks_like_interface(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 1 && bytes[0] == b'I' && bytes[1].is_ascii_uppercase()
}
