use srcgraph::cst::java::JavaCst;
use srcgraph::cst::LanguageCst;
use srcgraph::model::{SymbolKind, TypeRelation};

const SOURCE: &str = r#"
public class OrderService extends BaseService implements Auditable, Closeable {
    private final Repository<Order> repository;

    public OrderService(Repository<Order> repository) {
        this.repository = repository;
    }

    public void submit(Order order) {
        validate(order);
        repository.save(order);
    }

    private void validate(Order order) {
        if (order == null) {
            throw new IllegalArgumentException();
        }
    }
}

enum Status {
    OPEN,
    CLOSED,
}
"#;

#[test]
fn extracts_java_declarations() {
    let mut cst = JavaCst::new().unwrap();
    let symbols = cst.symbols(SOURCE).unwrap();

    let found: Vec<_> = symbols.iter().map(|s| (s.kind, s.qualified())).collect();
    assert!(found.contains(&(SymbolKind::Class, "OrderService".to_string())));
    assert!(found.contains(&(SymbolKind::Constructor, "OrderService.OrderService".to_string())));
    assert!(found.contains(&(SymbolKind::Method, "OrderService.submit".to_string())));
    assert!(found.contains(&(SymbolKind::Method, "OrderService.validate".to_string())));
    assert!(found.contains(&(SymbolKind::Enum, "Status".to_string())));
    assert!(found.contains(&(SymbolKind::EnumMember, "Status.OPEN".to_string())));

    let submit = symbols.iter().find(|s| s.name == "submit").unwrap();
    assert_eq!(
        submit.signature.as_deref(),
        Some("public void submit(Order order) {")
    );
}

#[test]
fn invocations_keep_class_qualified_caller() {
    let mut cst = JavaCst::new().unwrap();
    let calls = cst.calls(SOURCE).unwrap();

    assert!(
        calls
            .iter()
            .any(|c| c.caller == "OrderService.submit" && c.callee == "validate")
    );
    assert!(
        calls
            .iter()
            .any(|c| c.caller == "OrderService.submit" && c.callee == "save")
    );
}

#[test]
fn extends_and_implements_split() {
    let mut cst = JavaCst::new().unwrap();
    let heritage = cst.heritage(SOURCE).unwrap();

    assert!(heritage.iter().any(|h| {
        h.child == "OrderService"
            && h.parent == "BaseService"
            && h.relation == TypeRelation::Extends
    }));
    assert!(heritage.iter().any(|h| {
        h.child == "OrderService"
            && h.parent == "Auditable"
            && h.relation == TypeRelation::Implements
    }));
    assert!(heritage.iter().any(|h| {
        h.child == "OrderService"
            && h.parent == "Closeable"
            && h.relation == TypeRelation::Implements
    }));
}
