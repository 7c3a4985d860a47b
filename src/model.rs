use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Language tags accepted by the engine. Files carrying any other tag are
/// rejected before a single row is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Language {
    #[serde(rename = "go")]
    Go,
    #[serde(rename = "python")]
    Python,
    #[serde(rename = "typescript")]
    Typescript,
    #[serde(rename = "typescriptreact")]
    TypescriptReact,
    #[serde(rename = "javascript")]
    Javascript,
    #[serde(rename = "java")]
    Java,
    #[serde(rename = "csharp")]
    CSharp,
    #[serde(rename = "swift")]
    Swift,
    #[serde(rename = "rust")]
    Rust,
    #[serde(rename = "ocaml")]
    Ocaml,
}

impl Language {
    pub const ALL: &'static [Language] = &[
        Language::Go,
        Language::Python,
        Language::Typescript,
        Language::TypescriptReact,
        Language::Javascript,
        Language::Java,
        Language::CSharp,
        Language::Swift,
        Language::Rust,
        Language::Ocaml,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Python => "python",
            Language::Typescript => "typescript",
            Language::TypescriptReact => "typescriptreact",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Swift => "swift",
            Language::Rust => "rust",
            Language::Ocaml => "ocaml",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Language> {
        Language::ALL.iter().copied().find(|l| l.as_str() == tag)
    }

    /// The languageId sent in textDocument/didOpen.
    pub fn lsp_id(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized symbol kinds. The set is closed: anything an analyzer reports
/// outside it collapses to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    Struct,
    Enum,
    EnumMember,
    Type,
    Module,
    Field,
    Constructor,
    Variable,
    Constant,
    TypeParameter,
    Unknown,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumMember => "enum_member",
            SymbolKind::Type => "type",
            SymbolKind::Module => "module",
            SymbolKind::Field => "field",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::TypeParameter => "type_parameter",
            SymbolKind::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> SymbolKind {
        match value {
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "class" => SymbolKind::Class,
            "interface" => SymbolKind::Interface,
            "struct" => SymbolKind::Struct,
            "enum" => SymbolKind::Enum,
            "enum_member" => SymbolKind::EnumMember,
            "type" => SymbolKind::Type,
            "module" => SymbolKind::Module,
            "field" => SymbolKind::Field,
            "constructor" => SymbolKind::Constructor,
            "variable" => SymbolKind::Variable,
            "constant" => SymbolKind::Constant,
            "type_parameter" => SymbolKind::TypeParameter,
            _ => SymbolKind::Unknown,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a symbol reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Lsp,
    Cst,
}

impl ExtractionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionSource::Lsp => "lsp",
            ExtractionSource::Cst => "cst",
        }
    }

    pub fn parse(value: &str) -> ExtractionSource {
        match value {
            "lsp" => ExtractionSource::Lsp,
            _ => ExtractionSource::Cst,
        }
    }
}

/// Inheritance/implementation relationship tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRelation {
    Extends,
    Implements,
    Embeds,
}

impl TypeRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeRelation::Extends => "extends",
            TypeRelation::Implements => "implements",
            TypeRelation::Embeds => "embeds",
        }
    }
}

/// Deterministic symbol identity: `<rel_path>#<scope>.<name>`, scope omitted
/// at top level. Stable across rebuilds for unchanged input.
pub fn symbol_id(rel_path: &str, scope: &str, name: &str) -> String {
    if scope.is_empty() {
        format!("{rel_path}#{name}")
    } else {
        format!("{rel_path}#{scope}.{name}")
    }
}

/// A definition discovered in source.
#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    pub id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    /// 1-indexed start line.
    pub line: i64,
    /// 0-indexed start column.
    pub column: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<i64>,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    pub language: Language,
    pub source: ExtractionSource,
    pub created_at: i64,
}

/// A caller of the queried symbol together with the concrete call site.
#[derive(Debug, Clone, Serialize)]
pub struct CallerHit {
    #[serde(flatten)]
    pub symbol: Symbol,
    pub call_file: String,
    pub call_line: i64,
    pub call_column: i64,
}

/// A symbol called from the queried symbol together with the call site.
#[derive(Debug, Clone, Serialize)]
pub struct CalleeHit {
    #[serde(flatten)]
    pub symbol: Symbol,
    pub call_file: String,
    pub call_line: i64,
    pub call_column: i64,
}

/// One row per indexed file; drives the incremental skip.
#[derive(Debug, Clone, Serialize)]
pub struct FileMeta {
    pub path: String,
    /// Unix seconds of the file mtime observed at indexing.
    pub mod_time: i64,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageStat {
    pub language: String,
    pub count: i64,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub total_symbols: i64,
    pub kinds: BTreeMap<String, i64>,
    pub call_edges: i64,
    pub type_edges: i64,
    pub languages: Vec<LanguageStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_build_time: Option<i64>,
    pub files_indexed: i64,
    pub database_path: String,
    pub database_size: i64,
}

/// A file handed to the pipeline by the collaborator's walker.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub abs_path: PathBuf,
    pub rel_path: String,
    pub language: Language,
}

/// Aggregate result of an index run.
#[derive(Debug, Default, Serialize)]
pub struct IndexSummary {
    pub indexed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub symbols: usize,
    pub calls: usize,
    pub type_edges: usize,
    pub languages_failed: Vec<String>,
    pub aborted: bool,
    pub duration_ms: u64,
}
