use srcgraph::cst::swift::SwiftCst;
use srcgraph::cst::LanguageCst;
use srcgraph::model::{SymbolKind, TypeRelation};

const SOURCE: &str = r#"
protocol Greeter {
    func greet() -> String
}

class Base {
}

class Person: Base, Greeter {
    func greet() -> String {
        return describe()
    }

    func describe() -> String {
        return "person"
    }
}

struct Point {
    var x: Int
}

func main() {
    let person = Person()
    person.greet()
    report()
}

func report() {
}
"#;

#[test]
fn extracts_swift_declarations() {
    let mut cst = SwiftCst::new().unwrap();
    let symbols = cst.symbols(SOURCE).unwrap();

    let found: Vec<_> = symbols.iter().map(|s| (s.kind, s.qualified())).collect();
    assert!(found.contains(&(SymbolKind::Interface, "Greeter".to_string())));
    assert!(found.contains(&(SymbolKind::Class, "Person".to_string())));
    assert!(found.contains(&(SymbolKind::Struct, "Point".to_string())));
    assert!(found.contains(&(SymbolKind::Method, "Person.greet".to_string())));
    assert!(found.contains(&(SymbolKind::Function, "main".to_string())));
}

#[test]
fn calls_from_functions_and_methods() {
    let mut cst = SwiftCst::new().unwrap();
    let calls = cst.calls(SOURCE).unwrap();

    assert!(calls.iter().any(|c| c.caller == "main" && c.callee == "greet"));
    assert!(calls.iter().any(|c| c.caller == "main" && c.callee == "report"));
    assert!(
        calls
            .iter()
            .any(|c| c.caller == "Person.greet" && c.callee == "describe")
    );
}

#[test]
fn first_inheritance_entry_is_superclass() {
    let mut cst = SwiftCst::new().unwrap();
    let heritage = cst.heritage(SOURCE).unwrap();

    assert!(heritage.iter().any(|h| {
        h.child == "Person" && h.parent == "Base" && h.relation == TypeRelation::Extends
    }));
    assert!(heritage.iter().any(|h| {
        h.child == "Person" && h.parent == "Greeter" && h.relation == TypeRelation::Implements
    }));
}
