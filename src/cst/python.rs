//! Python extraction: def/class definitions, call sites, base classes.
//! Python draws no extends/implements distinction; every base is `extends`.

use super::{
    CstCall, CstHeritage, CstSymbol, LanguageCst, join_scope, new_parser, node_text, parse, span,
    type_name,
};
use crate::error::Result;
use crate::model::{SymbolKind, TypeRelation};
use crate::util::first_line;
use tree_sitter::{Node, Parser};

pub struct PythonCst {
    parser: Parser,
}

impl PythonCst {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: new_parser(tree_sitter_python::LANGUAGE)?,
        })
    }
}

impl LanguageCst for PythonCst {
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

fn walk_symbols(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstSymbol>) {
    let mut child_scope = scope.to_string();
    match node.kind() {
        "function_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source);
                let (start_line, start_col, end_line, end_col) = span(node);
                out.push(CstSymbol {
                    name: name.to_string(),
                    kind: SymbolKind::Function,
                    scope: scope.to_string(),
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                    signature: Some(first_line(node_text(node, source))),
                });
                child_scope = join_scope(scope, name);
            }
        }
        "class_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source);
                let (start_line, start_col, end_line, end_col) = span(node);
                out.push(CstSymbol {
                    name: name.to_string(),
                    kind: SymbolKind::Class,
                    scope: scope.to_string(),
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                    signature: Some(first_line(node_text(node, source))),
                });
                child_scope = join_scope(scope, name);
            }
        }
        _ => {}
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
        "function_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source);
                child_scope = join_scope(scope, name);
                owned = child_scope.clone();
                enclosing = Some(&owned);
            }
        }
        "class_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                child_scope = join_scope(scope, node_text(name_node, source));
            }
        }
        "call" => {
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
        "attribute" => func
            .child_by_field_name("attribute")
            .map(|attr| node_text(attr, source).to_string()),
        "identifier" => Some(node_text(func, source).to_string()),
        _ => None,
    }
}

fn walk_heritage(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstHeritage>) {
    let mut child_scope = scope.to_string();
    if node.kind() == "class_definition" {
        if let Some(name_node) = node.child_by_field_name("name") {
            let name = node_text(name_node, source);
            let child = join_scope(scope, name);
            if let Some(bases) = node.child_by_field_name("superclasses") {
                let mut cursor = bases.walk();
                for base in bases.named_children(&mut cursor) {
                    if base.kind() == "keyword_argument" {
                        // metaclass=... is not inheritance
                        continue;
                    }
                    let parent = type_name(base, source);
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
            child_scope = child;
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_heritage(child, &child_scope, source, out);
    }
}
