use srcgraph::cst::typescript::{TsxCst, TypescriptCst};
use srcgraph::cst::LanguageCst;
use srcgraph::model::{SymbolKind, TypeRelation};

const SOURCE: &str = r#"
interface Repository<T> {
    save(item: T): void;
}

enum Level {
    Info,
    Error,
}

type Handler = (event: string) => void;

class BaseStore {
    flush(): void {}
}

class UserStore extends BaseStore implements Repository<User>, Closeable {
    save(item: User): void {
        this.validate(item);
        persist(item);
    }

    validate(item: User): void {}
}

function persist(item: User): void {
    audit();
}

function audit(): void {}
"#;

#[test]
fn extracts_typescript_declarations() {
    let mut cst = TypescriptCst::new().unwrap();
    let symbols = cst.symbols(SOURCE).unwrap();

    let found: Vec<_> = symbols.iter().map(|s| (s.kind, s.qualified())).collect();
    assert!(found.contains(&(SymbolKind::Interface, "Repository".to_string())));
    assert!(found.contains(&(SymbolKind::Enum, "Level".to_string())));
    assert!(found.contains(&(SymbolKind::Type, "Handler".to_string())));
    assert!(found.contains(&(SymbolKind::Class, "UserStore".to_string())));
    assert!(found.contains(&(SymbolKind::Method, "UserStore.save".to_string())));
    assert!(found.contains(&(SymbolKind::Method, "UserStore.validate".to_string())));
    assert!(found.contains(&(SymbolKind::Function, "persist".to_string())));
}

#[test]
fn method_calls_attribute_to_scoped_caller() {
    let mut cst = TypescriptCst::new().unwrap();
    let calls = cst.calls(SOURCE).unwrap();

    assert!(
        calls
            .iter()
            .any(|c| c.caller == "UserStore.save" && c.callee == "validate")
    );
    assert!(
        calls
            .iter()
            .any(|c| c.caller == "UserStore.save" && c.callee == "persist")
    );
    assert!(calls.iter().any(|c| c.caller == "persist" && c.callee == "audit"));
}

#[test]
fn heritage_separates_extends_and_implements() {
    let mut cst = TypescriptCst::new().unwrap();
    let heritage = cst.heritage(SOURCE).unwrap();

    assert!(heritage.iter().any(|h| {
        h.child == "UserStore" && h.parent == "BaseStore" && h.relation == TypeRelation::Extends
    }));
    // Generic parameters are stripped to the base name.
    assert!(heritage.iter().any(|h| {
        h.child == "UserStore"
            && h.parent == "Repository"
            && h.relation == TypeRelation::Implements
    }));
    assert!(heritage.iter().any(|h| {
        h.child == "UserStore" && h.parent == "Closeable" && h.relation == TypeRelation::Implements
    }));
}

#[test]
fn tsx_grammar_handles_components() {
    let source = r#"
class Widget extends Component {
    render() {
        return <div onClick={() => this.handle()}>ok</div>;
    }

    handle() {}
}
"#;
    let mut cst = TsxCst::new().unwrap();
    let symbols = cst.symbols(source).unwrap();
    let found: Vec<_> = symbols.iter().map(|s| s.qualified()).collect();
    assert!(found.contains(&"Widget".to_string()));
    assert!(found.contains(&"Widget.render".to_string()));

    let heritage = cst.heritage(source).unwrap();
    assert!(heritage.iter().any(|h| {
        h.child == "Widget" && h.parent == "Component" && h.relation == TypeRelation::Extends
    }));
}
