use srcgraph::model::{ExtractionSource, Language, Symbol, SymbolKind, TypeRelation};
use srcgraph::store::{CallEdge, Store, TypeEdge};
use tempfile::TempDir;

fn sym(id: &str, name: &str, kind: SymbolKind, file: &str, line: i64, language: Language) -> Symbol {
    Symbol {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        file: file.to_string(),
        line,
        column: 0,
        end_line: Some(line + 10),
        end_column: Some(1),
        scope: String::new(),
        signature: None,
        documentation: None,
        language,
        source: ExtractionSource::Cst,
        created_at: 1,
    }
}

fn open_store(dir: &TempDir) -> Store {
    Store::open(&dir.path().join("graph.db")).unwrap()
}

#[test]
fn upsert_is_idempotent_and_last_write_wins() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let first = sym("a.go#Run", "Run", SymbolKind::Function, "/p/a.go", 5, Language::Go);
    store.upsert_symbol(&first).unwrap();

    let mut second = first.clone();
    second.line = 9;
    second.signature = Some("func Run() error {".to_string());
    store.upsert_symbol(&second).unwrap();

    assert_eq!(store.symbol_count().unwrap(), 1);
    let rows = store.get_by_name("Run", None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].line, 9);
    assert_eq!(rows[0].signature.as_deref(), Some("func Run() error {"));
}

#[test]
fn clear_all_empties_every_table() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let caller = sym("a.go#main", "main", SymbolKind::Function, "/p/a.go", 1, Language::Go);
    let callee = sym("a.go#helper", "helper", SymbolKind::Function, "/p/a.go", 20, Language::Go);
    store.upsert_symbols(&[caller, callee]).unwrap();
    store
        .insert_call(&CallEdge {
            caller_id: "a.go#main".into(),
            callee_id: "a.go#helper".into(),
            file: "/p/a.go".into(),
            line: 3,
            column: 4,
        })
        .unwrap();
    store
        .insert_type_edge(&TypeEdge {
            child_id: "a.go#main".into(),
            parent: "Base".into(),
            relation: TypeRelation::Extends,
        })
        .unwrap();
    store.upsert_file_meta("/p/a.go", 100, Language::Go).unwrap();

    store.clear_all().unwrap();

    assert_eq!(store.symbol_count().unwrap(), 0);
    assert_eq!(store.call_count().unwrap(), 0);
    assert_eq!(store.type_edge_count().unwrap(), 0);
    assert!(store.file_meta("/p/a.go").unwrap().is_none());
}

#[test]
fn per_language_clear_then_reindex_restores_baseline() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let go_caller = sym("a.go#main", "main", SymbolKind::Function, "/p/a.go", 1, Language::Go);
    let go_callee = sym("a.go#helper", "helper", SymbolKind::Function, "/p/a.go", 30, Language::Go);
    let py_caller = sym("b.py#run", "run", SymbolKind::Function, "/p/b.py", 1, Language::Python);
    let py_callee = sym("b.py#util", "util", SymbolKind::Function, "/p/b.py", 30, Language::Python);
    store
        .upsert_symbols(&[go_caller, go_callee, py_caller, py_callee])
        .unwrap();

    let go_call = CallEdge {
        caller_id: "a.go#main".into(),
        callee_id: "a.go#helper".into(),
        file: "/p/a.go".into(),
        line: 3,
        column: 0,
    };
    let py_call = CallEdge {
        caller_id: "b.py#run".into(),
        callee_id: "b.py#util".into(),
        file: "/p/b.py".into(),
        line: 4,
        column: 0,
    };
    store.insert_calls(&[go_call.clone(), py_call]).unwrap();
    store
        .insert_type_edge(&TypeEdge {
            child_id: "a.go#main".into(),
            parent: "Base".into(),
            relation: TypeRelation::Embeds,
        })
        .unwrap();

    let baseline_calls = store.call_count().unwrap();
    assert_eq!(baseline_calls, 2);

    store.clear_calls_for_language(Language::Go).unwrap();
    assert_eq!(store.call_count().unwrap(), 1);
    store.clear_type_edges_for_language(Language::Go).unwrap();
    assert_eq!(store.type_edge_count().unwrap(), 0);

    // Re-running only the Go pass returns the totals to the baseline.
    store.insert_call(&go_call).unwrap();
    assert_eq!(store.call_count().unwrap(), baseline_calls);
}

#[test]
fn file_meta_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    assert!(store.file_meta("/p/a.go").unwrap().is_none());
    store.upsert_file_meta("/p/a.go", 1000, Language::Go).unwrap();
    let meta = store.file_meta("/p/a.go").unwrap().unwrap();
    assert_eq!(meta.mod_time, 1000);
    assert_eq!(meta.language, "go");

    store.upsert_file_meta("/p/a.go", 2000, Language::Go).unwrap();
    let meta = store.file_meta("/p/a.go").unwrap().unwrap();
    assert_eq!(meta.mod_time, 2000);
}

#[test]
fn stats_summarize_kinds_and_languages() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .upsert_symbols(&[
            sym("a.go#main", "main", SymbolKind::Function, "/p/a.go", 1, Language::Go),
            sym("a.go#Cfg", "Cfg", SymbolKind::Struct, "/p/a.go", 20, Language::Go),
            sym("b.py#run", "run", SymbolKind::Function, "/p/b.py", 1, Language::Python),
        ])
        .unwrap();
    store.upsert_file_meta("/p/a.go", 111, Language::Go).unwrap();
    store.upsert_file_meta("/p/b.py", 222, Language::Python).unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_symbols, 3);
    assert_eq!(stats.kinds.get("function"), Some(&2));
    assert_eq!(stats.kinds.get("struct"), Some(&1));
    assert_eq!(stats.files_indexed, 2);
    assert_eq!(stats.last_build_time, Some(222));
    assert_eq!(stats.languages.len(), 2);
    let go = stats.languages.iter().find(|l| l.language == "go").unwrap();
    assert_eq!(go.count, 2);
    assert!((go.percent - 66.6).abs() < 1.0);
    assert!(stats.database_size > 0);
}
