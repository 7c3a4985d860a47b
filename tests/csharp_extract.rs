use srcgraph::cst::csharp::CSharpCst;
use srcgraph::cst::LanguageCst;
use srcgraph::model::{SymbolKind, TypeRelation};

const SOURCE: &str = r#"
public interface IShape
{
    double Area();
}

public class Shape
{
    public virtual double Area() => 0;
}

public class Circle : Shape, IShape, IDrawable
{
    private double radius;

    public Circle(double radius)
    {
        this.radius = radius;
    }

    public override double Area()
    {
        return Compute();
    }

    private double Compute()
    {
        return Math.Round(radius * radius * 3.14159);
    }
}

public struct Point : IShape
{
    public double Area() => 0;
}
"#;

#[test]
fn extracts_csharp_declarations() {
    let mut cst = CSharpCst::new().unwrap();
    let symbols = cst.symbols(SOURCE).unwrap();

    let found: Vec<_> = symbols.iter().map(|s| (s.kind, s.qualified())).collect();
    assert!(found.contains(&(SymbolKind::Interface, "IShape".to_string())));
    assert!(found.contains(&(SymbolKind::Class, "Circle".to_string())));
    assert!(found.contains(&(SymbolKind::Struct, "Point".to_string())));
    assert!(found.contains(&(SymbolKind::Constructor, "Circle.Circle".to_string())));
    assert!(found.contains(&(SymbolKind::Method, "Circle.Area".to_string())));
    assert!(found.contains(&(SymbolKind::Method, "Circle.Compute".to_string())));
}

#[test]
fn invocations_resolve_member_access() {
    let mut cst = CSharpCst::new().unwrap();
    let calls = cst.calls(SOURCE).unwrap();

    assert!(
        calls
            .iter()
            .any(|c| c.caller == "Circle.Area" && c.callee == "Compute")
    );
    assert!(
        calls
            .iter()
            .any(|c| c.caller == "Circle.Compute" && c.callee == "Round")
    );
}

#[test]
fn base_list_follows_interface_convention() {
    let mut cst = CSharpCst::new().unwrap();
    let heritage = cst.heritage(SOURCE).unwrap();

    assert!(heritage.iter().any(|h| {
        h.child == "Circle" && h.parent == "Shape" && h.relation == TypeRelation::Extends
    }));
    assert!(heritage.iter().any(|h| {
        h.child == "Circle" && h.parent == "IShape" && h.relation == TypeRelation::Implements
    }));
    assert!(heritage.iter().any(|h| {
        h.child == "Circle" && h.parent == "IDrawable" && h.relation == TypeRelation::Implements
    }));
    // An I-prefixed first base is a conformance, not a superclass.
    assert!(heritage.iter().any(|h| {
        h.child == "Point" && h.parent == "IShape" && h.relation == TypeRelation::Implements
    }));
}
