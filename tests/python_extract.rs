use srcgraph::cst::python::PythonCst;
use srcgraph::cst::LanguageCst;
use srcgraph::model::{SymbolKind, TypeRelation};

const SOURCE: &str = r#"
class Animal:
    def speak(self):
        return ""

class Dog(Animal, Loggable):
    def speak(self):
        return self.bark()

    def bark(self):
        return "woof"

def feed(animal):
    animal.speak()
    log_meal()

def log_meal():
    pass
"#;

#[test]
fn extracts_classes_and_functions() {
    let mut cst = PythonCst::new().unwrap();
    let symbols = cst.symbols(SOURCE).unwrap();

    let found: Vec<_> = symbols.iter().map(|s| (s.kind, s.qualified())).collect();
    assert!(found.contains(&(SymbolKind::Class, "Animal".to_string())));
    assert!(found.contains(&(SymbolKind::Class, "Dog".to_string())));
    assert!(found.contains(&(SymbolKind::Function, "Animal.speak".to_string())));
    assert!(found.contains(&(SymbolKind::Function, "Dog.bark".to_string())));
    assert!(found.contains(&(SymbolKind::Function, "feed".to_string())));

    let dog = symbols.iter().find(|s| s.name == "Dog").unwrap();
    assert_eq!(dog.signature.as_deref(), Some("class Dog(Animal, Loggable):"));
}

#[test]
fn methods_carry_class_scope() {
    let mut cst = PythonCst::new().unwrap();
    let symbols = cst.symbols(SOURCE).unwrap();
    let bark = symbols.iter().find(|s| s.name == "bark").unwrap();
    assert_eq!(bark.scope, "Dog");
}

#[test]
fn calls_resolve_attribute_and_plain_names() {
    let mut cst = PythonCst::new().unwrap();
    let calls = cst.calls(SOURCE).unwrap();

    assert!(calls.iter().any(|c| c.caller == "feed" && c.callee == "speak"));
    assert!(calls.iter().any(|c| c.caller == "feed" && c.callee == "log_meal"));
    assert!(
        calls
            .iter()
            .any(|c| c.caller == "Dog.speak" && c.callee == "bark")
    );
}

#[test]
fn every_base_is_extends() {
    let mut cst = PythonCst::new().unwrap();
    let heritage = cst.heritage(SOURCE).unwrap();

    let dog_edges: Vec<_> = heritage.iter().filter(|h| h.child == "Dog").collect();
    assert_eq!(dog_edges.len(), 2);
    assert!(dog_edges.iter().all(|h| h.relation == TypeRelation::Extends));
    assert!(dog_edges.iter().any(|h| h.parent == "Animal"));
    assert!(dog_edges.iter().any(|h| h.parent == "Loggable"));
    assert!(heritage.iter().all(|h| h.child != "Animal"));
}
