//! Concrete-syntax-tree extraction: the fallback path when no analyzer is
//! available for a language.
//!
//! Each language module owns a parser and implements the same three passes:
//! symbol definitions, call sites with their nearest enclosing function, and
//! type heritage. Scope chains are dotted and mirror the ids the symbol pass
//! produces, so a call's caller name always resolves to a stored symbol.

use crate::error::{EngineError, Result};
use crate::model::{Language, SymbolKind, TypeRelation};
use tree_sitter::{Node, Parser, Tree};

pub mod csharp;
pub mod go;
pub mod java;
pub mod ocaml;
pub mod python;
pub mod rust;
pub mod swift;
pub mod typescript;

/// A definition found in a parse tree. Positions follow the store's
/// convention: 1-indexed lines, 0-indexed columns.
#[derive(Debug, Clone)]
pub struct CstSymbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Dotted scope chain, empty at top level.
    pub scope: String,
    pub start_line: i64,
    pub start_col: i64,
    pub end_line: i64,
    pub end_col: i64,
    pub signature: Option<String>,
}

impl CstSymbol {
    /// The scope-qualified display name (`scope.name` or bare `name`).
    pub fn qualified(&self) -> String {
        if self.scope.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.scope, self.name)
        }
    }
}

/// A call site inside a known enclosing function.
#[derive(Debug, Clone)]
pub struct CstCall {
    /// Scope-qualified name of the enclosing function.
    pub caller: String,
    /// Callee display name (last identifier of the call target).
    pub callee: String,
    pub line: i64,
    pub column: i64,
}

/// One heritage declaration: `child` extends/implements/embeds `parent`.
#[derive(Debug, Clone)]
pub struct CstHeritage {
    pub child: String,
    pub parent: String,
    pub relation: TypeRelation,
}

/// The extraction surface every language module implements.
pub trait LanguageCst: Send {
    fn symbols(&mut self, source: &str) -> Result<Vec<CstSymbol>>;
    fn calls(&mut self, source: &str) -> Result<Vec<CstCall>>;
    fn heritage(&mut self, source: &str) -> Result<Vec<CstHeritage>>;
}

pub fn extractor_for(language: Language) -> Result<Box<dyn LanguageCst>> {
    Ok(match language {
        Language::Go => Box::new(go::GoCst::new()?),
        Language::Python => Box::new(python::PythonCst::new()?),
        Language::Typescript | Language::Javascript => {
            Box::new(typescript::TypescriptCst::new()?)
        }
        Language::TypescriptReact => Box::new(typescript::TsxCst::new()?),
        Language::Java => Box::new(java::JavaCst::new()?),
        Language::CSharp => Box::new(csharp::CSharpCst::new()?),
        Language::Swift => Box::new(swift::SwiftCst::new()?),
        Language::Rust => Box::new(rust::RustCst::new()?),
        Language::Ocaml => Box::new(ocaml::OcamlCst::new()?),
    })
}

// ---- shared tree helpers --------------------------------------------------

pub(crate) fn new_parser(language: impl Into<tree_sitter::Language>) -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|err| EngineError::Extraction(format!("load grammar: {err}")))?;
    Ok(parser)
}

pub(crate) fn parse(parser: &mut Parser, source: &str) -> Result<Tree> {
    parser
        .parse(source, None)
        .ok_or_else(|| EngineError::Extraction("parser produced no tree".into()))
}

pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// (start_line 1-indexed, start_col, end_line, end_col)
pub(crate) fn span(node: Node<'_>) -> (i64, i64, i64, i64) {
    (
        node.start_position().row as i64 + 1,
        node.start_position().column as i64,
        node.end_position().row as i64 + 1,
        node.end_position().column as i64,
    )
}

pub(crate) fn join_scope(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

/// Extract a base type name from a heritage clause node: generic parameters
/// are stripped down to the base name, qualified names keep their original
/// form.
pub(crate) fn type_name(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        "identifier" | "type_identifier" | "simple_identifier" | "module_type_name" => {
            node_text(node, source).to_string()
        }
        "generic_name" | "generic_type" => {
            if let Some(name) = node.child_by_field_name("name") {
                return node_text(name, source).to_string();
            }
            if let Some(first) = node.named_child(0) {
                return type_name(first, source);
            }
            strip_generics(node_text(node, source))
        }
        "qualified_name" | "scoped_type_identifier" | "module_type_path" => {
            node_text(node, source).to_string()
        }
        _ => {
            if node.named_child_count() == 1 {
                if let Some(only) = node.named_child(0) {
                    return type_name(only, source);
                }
            }
            strip_generics(node_text(node, source))
        }
    }
}

pub(crate) fn strip_generics(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.find('<') {
        Some(idx) => trimmed[..idx].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Pre-order walk calling `visit` on every named node.
pub(crate) fn for_each_node<'t>(root: Node<'t>, visit: &mut impl FnMut(Node<'t>)) {
    visit(root);
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        for_each_node(child, visit);
    }
}
