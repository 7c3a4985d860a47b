//! OCaml extraction. Let bindings with parameters are functions, bare
//! bindings are values; a module constrained by an explicit module type
//! (`module M : SIG = struct … end`) implements that signature.

use super::{
    CstCall, CstHeritage, CstSymbol, LanguageCst, join_scope, new_parser, node_text, parse, span,
};
use crate::error::Result;
use crate::model::{SymbolKind, TypeRelation};
use crate::util::first_line;
use tree_sitter::{Node, Parser};

pub struct OcamlCst {
    parser: Parser,
}

impl OcamlCst {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: new_parser(tree_sitter_ocaml::LANGUAGE_OCAML)?,
        })
    }
}

impl LanguageCst for OcamlCst {
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
        super::for_each_node(tree.root_node(), &mut |node| {
            if node.kind() != "module_definition" {
                return;
            }
            let mut cursor = node.walk();
            for binding in node.named_children(&mut cursor) {
                if binding.kind() != "module_binding" {
                    continue;
                }
                let mut name = None;
                let mut module_type = None;
                let mut inner = binding.walk();
                for part in binding.named_children(&mut inner) {
                    match part.kind() {
                        "module_name" => name = Some(node_text(part, source).to_string()),
                        "module_type_path" | "module_type_name" => {
                            module_type = Some(node_text(part, source).to_string())
                        }
                        _ => {}
                    }
                }
                if let (Some(child), Some(parent)) = (name, module_type) {
                    out.push(CstHeritage {
                        child,
                        parent,
                        relation: TypeRelation::Implements,
                    });
                }
                break;
            }
        });
        Ok(out)
    }
}

fn has_parameters(binding: Node<'_>) -> bool {
    let mut cursor = binding.walk();
    let result = binding
        .named_children(&mut cursor)
        .any(|child| child.kind() == "parameter");
    result
}

fn walk_symbols(node: Node<'_>, scope: &str, source: &str, out: &mut Vec<CstSymbol>) {
    let mut child_scope = scope.to_string();
    match node.kind() {
        "let_binding" => {
            if let Some(pattern) = node.child_by_field_name("pattern") {
                let name = node_text(pattern, source);
                if !name.is_empty() {
                    let kind = if has_parameters(node) {
                        SymbolKind::Function
                    } else {
                        SymbolKind::Variable
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
                }
            }
        }
        "type_binding" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source);
                let (start_line, start_col, end_line, end_col) = span(node);
                out.push(CstSymbol {
                    name: name.to_string(),
                    kind: SymbolKind::Type,
                    scope: scope.to_string(),
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                    signature: None,
                });
            }
        }
        "module_binding" => {
            if let Some(name) = module_binding_name(node, source) {
                let (start_line, start_col, end_line, end_col) = span(node);
                out.push(CstSymbol {
                    name: name.clone(),
                    kind: SymbolKind::Module,
                    scope: scope.to_string(),
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                    signature: None,
                });
                child_scope = join_scope(scope, &name);
            }
        }
        "module_type_definition" => {
            let mut cursor = node.walk();
            for part in node.named_children(&mut cursor) {
                if part.kind() == "module_type_name" {
                    let (start_line, start_col, end_line, end_col) = span(node);
                    out.push(CstSymbol {
                        name: node_text(part, source).to_string(),
                        kind: SymbolKind::Interface,
                        scope: scope.to_string(),
                        start_line,
                        start_col,
                        end_line,
                        end_col,
                        signature: None,
                    });
                    break;
                }
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_symbols(child, &child_scope, source, out);
    }
}

fn module_binding_name(node: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let result = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "module_name")
        .map(|name| node_text(name, source).to_string());
    result
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
        "let_binding" => {
            if let Some(pattern) = node.child_by_field_name("pattern") {
                let name = node_text(pattern, source);
                if !name.is_empty() {
                    child_scope = join_scope(scope, name);
                    owned = child_scope.clone();
                    enclosing = Some(&owned);
                }
            }
        }
        "module_binding" => {
            if let Some(name) = module_binding_name(node, source) {
                child_scope = join_scope(scope, &name);
            }
        }
        "application_expression" => {
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
    let name = match func.kind() {
        // Module.func: the tail is the function name.
        "value_path" | "constructor_path" => {
            let count = func.named_child_count();
            func.named_child(count.saturating_sub(1))
                .map(|last| node_text(last, source))
                .unwrap_or_else(|| node_text(func, source))
        }
        "value_name" => node_text(func, source),
        "field_get_expression" => func
            .child_by_field_name("field")
            .map(|field| node_text(field, source))
            .unwrap_or(""),
        _ => node_text(func, source),
    };
    let name = name.trim();
    if name.is_empty() || !name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
        None
    } else {
        Some(name.to_string())
    }
}
