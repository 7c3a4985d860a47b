use srcgraph::cst::go::GoCst;
use srcgraph::cst::LanguageCst;
use srcgraph::model::{SymbolKind, TypeRelation};

const SOURCE: &str = r#"
package storage

import "fmt"

type Reader interface {
    Read(p []byte) (int, error)
}

type Buffer struct {
    data []byte
}

type FileReader struct {
    Buffer
    path string
}

const MaxSize = 4096

var defaultReader = NewFileReader("")

func NewFileReader(path string) *FileReader {
    return &FileReader{path: path}
}

func (r *FileReader) Read(p []byte) (int, error) {
    return len(p), nil
}

func process(r Reader) {
    buf := make([]byte, 8)
    r.Read(buf)
    fmt.Println(describe())
}

func describe() string { return "reader" }
"#;

#[test]
fn extracts_declarations() {
    let mut cst = GoCst::new().unwrap();
    let symbols = cst.symbols(SOURCE).unwrap();

    let found: Vec<_> = symbols
        .iter()
        .map(|s| (s.kind, s.qualified()))
        .collect();

    assert!(found.contains(&(SymbolKind::Interface, "Reader".to_string())));
    assert!(found.contains(&(SymbolKind::Struct, "Buffer".to_string())));
    assert!(found.contains(&(SymbolKind::Struct, "FileReader".to_string())));
    assert!(found.contains(&(SymbolKind::Constant, "MaxSize".to_string())));
    assert!(found.contains(&(SymbolKind::Variable, "defaultReader".to_string())));
    assert!(found.contains(&(SymbolKind::Function, "NewFileReader".to_string())));
    assert!(found.contains(&(SymbolKind::Method, "Read".to_string())));
    assert!(found.contains(&(SymbolKind::Function, "process".to_string())));
}

#[test]
fn function_signature_is_first_line() {
    let mut cst = GoCst::new().unwrap();
    let symbols = cst.symbols(SOURCE).unwrap();
    let ctor = symbols
        .iter()
        .find(|s| s.name == "NewFileReader")
        .unwrap();
    assert_eq!(
        ctor.signature.as_deref(),
        Some("func NewFileReader(path string) *FileReader {")
    );
    assert!(ctor.start_line >= 1);
    assert!(ctor.end_line >= ctor.start_line);
}

#[test]
fn calls_track_enclosing_function() {
    let mut cst = GoCst::new().unwrap();
    let calls = cst.calls(SOURCE).unwrap();

    assert!(
        calls
            .iter()
            .any(|c| c.caller == "process" && c.callee == "Read")
    );
    assert!(
        calls
            .iter()
            .any(|c| c.caller == "process" && c.callee == "describe")
    );
    assert!(
        calls
            .iter()
            .any(|c| c.caller == "NewFileReader" || c.caller == "process"),
    );
    // Nothing outside a function body produces a call; the top-level
    // NewFileReader("") initializer has no enclosing function.
    assert!(!calls.iter().any(|c| c.caller == "defaultReader"));
}

#[test]
fn embedded_struct_fields_become_embeds_edges() {
    let mut cst = GoCst::new().unwrap();
    let heritage = cst.heritage(SOURCE).unwrap();

    assert!(heritage.iter().any(|h| {
        h.child == "FileReader" && h.parent == "Buffer" && h.relation == TypeRelation::Embeds
    }));
    // The named field `path` does not embed anything.
    assert!(!heritage.iter().any(|h| h.parent == "string"));
}
