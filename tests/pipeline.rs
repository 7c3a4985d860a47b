//! End-to-end pipeline runs against a real temp project with no analyzers
//! configured: every language rides the CST path.

use srcgraph::indexer::Indexer;
use srcgraph::indexer::progress::{CancelToken, LanguageProgress, ProgressSink};
use srcgraph::model::{ExtractionSource, Language};
use srcgraph::scan;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

const GO_SOURCE: &str = r#"package app

type Greeter interface {
	Greet() string
}

type Base struct{}

type Impl struct {
	Base
}

func helper() string { return "hi" }

func caller() string {
	return helper()
}
"#;

const PY_SOURCE: &str = r#"class Service:
    def run(self):
        return prepare()

def prepare():
    return 1
"#;

struct CollectSink {
    latest: Mutex<HashMap<Language, LanguageProgress>>,
}

impl CollectSink {
    fn new() -> CollectSink {
        CollectSink {
            latest: Mutex::new(HashMap::new()),
        }
    }

    fn progress(&self, language: Language) -> LanguageProgress {
        self.latest
            .lock()
            .unwrap()
            .get(&language)
            .cloned()
            .expect("progress for language")
    }
}

impl ProgressSink for CollectSink {
    fn report(&self, progress: &LanguageProgress) {
        self.latest
            .lock()
            .unwrap()
            .insert(progress.language, progress.clone());
    }
}

fn write_project(dir: &TempDir) {
    std::fs::write(dir.path().join("main.go"), GO_SOURCE).unwrap();
    std::fs::write(dir.path().join("lib.py"), PY_SOURCE).unwrap();
}

fn new_indexer(dir: &TempDir) -> Indexer {
    Indexer::new(
        dir.path().to_path_buf(),
        &dir.path().join("graph.db"),
        HashMap::new(),
    )
    .unwrap()
}

#[test]
fn cst_fallback_populates_symbols_calls_and_hierarchy() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    let indexer = new_indexer(&dir);
    let files = scan::scan_project(dir.path(), false).unwrap();
    assert_eq!(files.len(), 2);

    let sink = CollectSink::new();
    let summary = indexer
        .index_project(files, false, &CancelToken::new(), &sink)
        .unwrap();

    assert_eq!(summary.indexed, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.errors, 0);
    assert!(!summary.aborted);

    // No analyzer configured: the partition degrades to CST and says so.
    let go = sink.progress(Language::Go);
    assert!(!go.lsp_available);
    assert_eq!(go.cst_count, 1);
    assert_eq!(go.lsp_count, 0);

    let store = indexer.store();
    let symbols = store.get_by_name("helper", None).unwrap();
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].source, ExtractionSource::Cst);

    // Call edges resolved through the store.
    let callers = store.callers("helper", None).unwrap();
    assert_eq!(callers.len(), 1);
    assert_eq!(callers[0].symbol.name, "caller");

    let py_callers = store.callers("prepare", None).unwrap();
    assert_eq!(py_callers.len(), 1);
    assert_eq!(py_callers[0].symbol.name, "run");

    // Struct embedding shows up through the implementations query.
    let embedders = store.implementations("Base").unwrap();
    assert_eq!(embedders.len(), 1);
    assert_eq!(embedders[0].name, "Impl");
}

#[test]
fn second_run_skips_unchanged_files_and_totals_are_stable() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    let indexer = new_indexer(&dir);
    let files = scan::scan_project(dir.path(), false).unwrap();

    let sink = CollectSink::new();
    indexer
        .index_project(files.clone(), false, &CancelToken::new(), &sink)
        .unwrap();
    let store = indexer.store();
    let symbols_before = store.symbol_count().unwrap();
    let calls_before = store.call_count().unwrap();
    let edges_before = store.type_edge_count().unwrap();
    let go_meta_before = store
        .file_meta(&dir.path().join("main.go").canonicalize().unwrap().display().to_string())
        .unwrap();

    let summary = indexer
        .index_project(files.clone(), false, &CancelToken::new(), &sink)
        .unwrap();
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.indexed, 0);

    assert_eq!(store.symbol_count().unwrap(), symbols_before);
    assert_eq!(store.call_count().unwrap(), calls_before);
    assert_eq!(store.type_edge_count().unwrap(), edges_before);

    let go_meta_after = store
        .file_meta(&dir.path().join("main.go").canonicalize().unwrap().display().to_string())
        .unwrap();
    assert_eq!(
        go_meta_before.map(|m| m.mod_time),
        go_meta_after.map(|m| m.mod_time)
    );

    let go = sink.progress(Language::Go);
    assert_eq!(go.files_seen, 1);
    assert_eq!(go.files_skipped, 1);
}

#[test]
fn stale_metadata_forces_a_file_back_through_the_pipeline() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    let indexer = new_indexer(&dir);
    let files = scan::scan_project(dir.path(), false).unwrap();

    indexer
        .index_project(files.clone(), false, &CancelToken::new(), &CollectSink::new())
        .unwrap();

    // Pretend the Go file was indexed long before its current mtime.
    let go_abs = dir
        .path()
        .join("main.go")
        .canonicalize()
        .unwrap()
        .display()
        .to_string();
    indexer
        .store()
        .upsert_file_meta(&go_abs, 0, Language::Go)
        .unwrap();

    let summary = indexer
        .index_project(files, false, &CancelToken::new(), &CollectSink::new())
        .unwrap();
    assert_eq!(summary.indexed, 1);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn force_rebuild_reindexes_everything_deterministically() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    let indexer = new_indexer(&dir);
    let files = scan::scan_project(dir.path(), false).unwrap();

    indexer
        .index_project(files.clone(), false, &CancelToken::new(), &CollectSink::new())
        .unwrap();
    let store = indexer.store();
    let symbols_before = store.symbol_count().unwrap();
    let calls_before = store.call_count().unwrap();
    let edges_before = store.type_edge_count().unwrap();
    let mut ids_before: Vec<String> = store
        .search("", None, None, false, None)
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    ids_before.sort();

    let summary = indexer
        .index_project(files, true, &CancelToken::new(), &CollectSink::new())
        .unwrap();
    assert_eq!(summary.indexed, 2);
    assert_eq!(summary.skipped, 0);

    assert_eq!(store.symbol_count().unwrap(), symbols_before);
    assert_eq!(store.call_count().unwrap(), calls_before);
    assert_eq!(store.type_edge_count().unwrap(), edges_before);

    let mut ids_after: Vec<String> = store
        .search("", None, None, false, None)
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    ids_after.sort();
    assert_eq!(ids_before, ids_after);
}

#[test]
fn cancelled_run_reports_aborted() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);
    let indexer = new_indexer(&dir);
    let files = scan::scan_project(dir.path(), false).unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let summary = indexer
        .index_project(files, false, &cancel, &CollectSink::new())
        .unwrap();
    assert!(summary.aborted);
    assert_eq!(summary.indexed, 0);
}
