use srcgraph::cst::rust::RustCst;
use srcgraph::cst::LanguageCst;
use srcgraph::model::{SymbolKind, TypeRelation};

const SOURCE: &str = r#"
pub trait Formatter {
    fn format(&self) -> String;
}

pub struct Plain;

pub enum Mode {
    Fast,
    Slow,
}

pub const LIMIT: usize = 16;

impl Formatter for Plain {
    fn format(&self) -> String {
        render(self)
    }
}

impl Plain {
    pub fn reset(&mut self) {
        self.clear();
    }
}

pub fn render(value: &Plain) -> String {
    helpers::escape(header())
}

fn header() -> String {
    String::new()
}
"#;

#[test]
fn extracts_rust_items() {
    let mut cst = RustCst::new().unwrap();
    let symbols = cst.symbols(SOURCE).unwrap();

    let found: Vec<_> = symbols.iter().map(|s| (s.kind, s.qualified())).collect();
    assert!(found.contains(&(SymbolKind::Interface, "Formatter".to_string())));
    assert!(found.contains(&(SymbolKind::Struct, "Plain".to_string())));
    assert!(found.contains(&(SymbolKind::Enum, "Mode".to_string())));
    assert!(found.contains(&(SymbolKind::Constant, "LIMIT".to_string())));
    assert!(found.contains(&(SymbolKind::Function, "render".to_string())));
    // Functions inside an impl block are methods scoped to the type.
    assert!(found.contains(&(SymbolKind::Method, "Plain.format".to_string())));
    assert!(found.contains(&(SymbolKind::Method, "Plain.reset".to_string())));
}

#[test]
fn calls_cover_plain_method_and_scoped_paths() {
    let mut cst = RustCst::new().unwrap();
    let calls = cst.calls(SOURCE).unwrap();

    assert!(
        calls
            .iter()
            .any(|c| c.caller == "Plain.format" && c.callee == "render")
    );
    assert!(
        calls
            .iter()
            .any(|c| c.caller == "Plain.reset" && c.callee == "clear")
    );
    // path::to::func keeps only the tail identifier.
    assert!(calls.iter().any(|c| c.caller == "render" && c.callee == "escape"));
    assert!(calls.iter().any(|c| c.caller == "render" && c.callee == "header"));
}

#[test]
fn trait_impl_is_implements_edge() {
    let mut cst = RustCst::new().unwrap();
    let heritage = cst.heritage(SOURCE).unwrap();

    assert_eq!(heritage.len(), 1);
    assert_eq!(heritage[0].child, "Plain");
    assert_eq!(heritage[0].parent, "Formatter");
    assert_eq!(heritage[0].relation, TypeRelation::Implements);
}

#[test]
fn inherent_impl_produces_no_edge() {
    let source = "struct Only;\nimpl Only { fn a(&self) {} }\n";
    let mut cst = RustCst::new().unwrap();
    assert!(cst.heritage(source).unwrap().is_empty());
}
