//! Language Server Protocol types used by the client.
//!
//! Deserialization is deliberately lenient: servers disagree about which
//! optional fields they send, so everything structural defaults to zero.

use crate::model::SymbolKind;
use serde::{Deserialize, Serialize};

/// Position in a text document (0-indexed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: i64,
    pub character: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Range {
    #[serde(default)]
    pub start: Position,
    #[serde(default)]
    pub end: Position,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub range: Range,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

/// Collapse the 26-value LSP SymbolKind enumeration onto the engine's closed
/// vocabulary. Unknown numbers become `Unknown` rather than widening the set.
pub fn collapse_symbol_kind(kind: u32) -> SymbolKind {
    match kind {
        2 | 3 | 4 => SymbolKind::Module,
        5 => SymbolKind::Class,
        6 => SymbolKind::Method,
        7 | 8 => SymbolKind::Field,
        9 => SymbolKind::Constructor,
        10 => SymbolKind::Enum,
        11 => SymbolKind::Interface,
        12 => SymbolKind::Function,
        13 => SymbolKind::Variable,
        14 => SymbolKind::Constant,
        22 => SymbolKind::EnumMember,
        23 => SymbolKind::Struct,
        26 => SymbolKind::TypeParameter,
        _ => SymbolKind::Unknown,
    }
}

/// Hierarchical symbol returned by textDocument/documentSymbol.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentSymbol {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub kind: u32,
    #[serde(default)]
    pub range: Range,
    #[serde(default, rename = "selectionRange")]
    pub selection_range: Range,
    #[serde(default)]
    pub children: Vec<DocumentSymbol>,
}

/// Flat symbol returned by workspace/symbol.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolInformation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: u32,
    #[serde(default)]
    pub location: Location,
    #[serde(default, rename = "containerName")]
    pub container_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallHierarchyItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub range: Range,
    #[serde(default, rename = "selectionRange")]
    pub selection_range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallHierarchyIncomingCall {
    #[serde(default)]
    pub from: CallHierarchyItem,
    #[serde(default, rename = "fromRanges")]
    pub from_ranges: Vec<Range>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallHierarchyOutgoingCall {
    #[serde(default)]
    pub to: CallHierarchyItem,
    #[serde(default, rename = "fromRanges")]
    pub from_ranges: Vec<Range>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeHierarchyItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub range: Range,
    #[serde(default, rename = "selectionRange")]
    pub selection_range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Capabilities advertised to every analyzer: hierarchical document symbols,
/// call hierarchy, type hierarchy, workspace symbol. No dynamic registration.
pub fn client_capabilities() -> serde_json::Value {
    serde_json::json!({
        "textDocument": {
            "documentSymbol": {
                "hierarchicalDocumentSymbolSupport": true
            },
            "callHierarchy": {
                "dynamicRegistration": false
            },
            "typeHierarchy": {
                "dynamicRegistration": false
            }
        },
        "workspace": {
            "symbol": {
                "dynamicRegistration": false
            }
        }
    })
}

/// Server capability summary from the initialize response. Servers send
/// either booleans or option objects, so fields stay as raw values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, rename = "documentSymbolProvider")]
    pub document_symbol_provider: Option<serde_json::Value>,
    #[serde(default, rename = "referencesProvider")]
    pub references_provider: Option<serde_json::Value>,
    #[serde(default, rename = "implementationProvider")]
    pub implementation_provider: Option<serde_json::Value>,
    #[serde(default, rename = "callHierarchyProvider")]
    pub call_hierarchy_provider: Option<serde_json::Value>,
    #[serde(default, rename = "typeHierarchyProvider")]
    pub type_hierarchy_provider: Option<serde_json::Value>,
    #[serde(default, rename = "workspaceSymbolProvider")]
    pub workspace_symbol_provider: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeResult {
    #[serde(default)]
    pub capabilities: ServerCapabilities,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_collapse_matches_vocabulary() {
        assert_eq!(collapse_symbol_kind(12), SymbolKind::Function);
        assert_eq!(collapse_symbol_kind(6), SymbolKind::Method);
        assert_eq!(collapse_symbol_kind(5), SymbolKind::Class);
        assert_eq!(collapse_symbol_kind(23), SymbolKind::Struct);
        assert_eq!(collapse_symbol_kind(11), SymbolKind::Interface);
        assert_eq!(collapse_symbol_kind(2), SymbolKind::Module);
        assert_eq!(collapse_symbol_kind(3), SymbolKind::Module);
        assert_eq!(collapse_symbol_kind(22), SymbolKind::EnumMember);
        assert_eq!(collapse_symbol_kind(26), SymbolKind::TypeParameter);
        // String(15), Event(24), Operator(25) and out-of-range numbers all
        // collapse to unknown.
        assert_eq!(collapse_symbol_kind(15), SymbolKind::Unknown);
        assert_eq!(collapse_symbol_kind(24), SymbolKind::Unknown);
        assert_eq!(collapse_symbol_kind(99), SymbolKind::Unknown);
        assert_eq!(collapse_symbol_kind(0), SymbolKind::Unknown);
    }

    #[test]
    fn document_symbol_tolerates_missing_fields() {
        let raw = r#"{"name":"Run","kind":12,"range":{"start":{"line":3,"character":0},"end":{"line":9,"character":1}},"selectionRange":{"start":{"line":3,"character":5},"end":{"line":3,"character":8}}}"#;
        let sym: DocumentSymbol = serde_json::from_str(raw).unwrap();
        assert_eq!(sym.name, "Run");
        assert!(sym.children.is_empty());
        assert_eq!(sym.selection_range.start.line, 3);
    }
}
