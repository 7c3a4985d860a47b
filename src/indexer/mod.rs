//! Indexing pipeline: partition the file stream by language, extract
//! symbols LSP-first with CST fallback, then resolve call edges and type
//! hierarchy per language.
//!
//! Partitions run in parallel on a bounded worker pool; files within a
//! partition are sequential because analyzers serve one stdio pair. Store
//! failures abort the run; everything else degrades per file or per
//! language.

use crate::config::Config;
use crate::cst::{self, LanguageCst};
use crate::error::{EngineError, Result};
use crate::lsp::{self, Client, types::DocumentSymbol};
use crate::model::{
    ExtractionSource, IndexSummary, Language, SourceFile, Symbol, symbol_id,
};
use crate::store::Store;
use crate::util::{file_mtime, first_line, now_unix, path_to_uri};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub mod callgraph;
pub mod hierarchy;
pub mod progress;

use progress::{CancelToken, LanguageProgress, PartitionState, ProgressSink};

#[derive(Debug, Default)]
struct PartitionReport {
    indexed: usize,
    skipped: usize,
    errors: usize,
    symbols: usize,
    calls: usize,
    type_edges: usize,
}

pub struct Indexer {
    root: PathBuf,
    store: Store,
    lsp: Arc<lsp::Manager>,
}

impl Indexer {
    pub fn new(
        root: PathBuf,
        db_path: &Path,
        launch: HashMap<Language, lsp::LaunchSpec>,
    ) -> Result<Indexer> {
        let root = std::fs::canonicalize(&root).unwrap_or(root);
        let store = Store::open(db_path)?;
        let root_uri = path_to_uri(&root);
        Ok(Indexer {
            root,
            store,
            lsp: Arc::new(lsp::Manager::new(root_uri, launch)),
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Index the supplied files. `force` clears all four tables first;
    /// otherwise files whose stored mtime is current are skipped.
    pub fn index_project(
        &self,
        files: Vec<SourceFile>,
        force: bool,
        cancel: &CancelToken,
        sink: &dyn ProgressSink,
    ) -> Result<IndexSummary> {
        let started = Instant::now();

        if force {
            self.store.clear_all()?;
        }

        let mut partitions: BTreeMap<Language, Vec<SourceFile>> = BTreeMap::new();
        for file in files {
            partitions.entry(file.language).or_default().push(file);
        }

        let worker_count = Config::get()
            .concurrency
            .min(partitions.len())
            .max(1);
        let queue: Mutex<VecDeque<(Language, Vec<SourceFile>)>> =
            Mutex::new(partitions.into_iter().collect());
        let summary = Mutex::new(IndexSummary::default());
        let fatal: Mutex<Option<EngineError>> = Mutex::new(None);

        std::thread::scope(|scope| {
            for _ in 0..worker_count {
                scope.spawn(|| {
                    loop {
                        if cancel.is_cancelled() || fatal.lock().unwrap().is_some() {
                            break;
                        }
                        let Some((language, files)) = queue.lock().unwrap().pop_front() else {
                            break;
                        };
                        match self.run_partition(language, &files, force, cancel, sink) {
                            Ok(report) => {
                                let mut summary = summary.lock().unwrap();
                                summary.indexed += report.indexed;
                                summary.skipped += report.skipped;
                                summary.errors += report.errors;
                                summary.symbols += report.symbols;
                                summary.calls += report.calls;
                                summary.type_edges += report.type_edges;
                            }
                            Err(EngineError::Cancelled) => break,
                            Err(err @ EngineError::Store(_)) => {
                                *fatal.lock().unwrap() = Some(err);
                                break;
                            }
                            Err(err) => {
                                tracing::warn!("{language} partition failed: {err}");
                                let mut failed = LanguageProgress::new(language, files.len());
                                failed.state = PartitionState::Failed;
                                sink.report(&failed);
                                summary
                                    .lock()
                                    .unwrap()
                                    .languages_failed
                                    .push(language.as_str().to_string());
                            }
                        }
                    }
                });
            }
        });

        self.lsp.shutdown_all();

        if let Some(err) = fatal.into_inner().unwrap() {
            return Err(err);
        }

        let mut summary = summary.into_inner().unwrap();
        summary.aborted = cancel.is_cancelled();
        summary.duration_ms = started.elapsed().as_millis() as u64;
        if summary.aborted {
            sink.aborted();
        }
        Ok(summary)
    }

    fn run_partition(
        &self,
        language: Language,
        files: &[SourceFile],
        force: bool,
        cancel: &CancelToken,
        sink: &dyn ProgressSink,
    ) -> Result<PartitionReport> {
        let mut progress = LanguageProgress::new(language, files.len());
        let mut report = PartitionReport::default();
        sink.report(&progress);

        progress.state = PartitionState::Initializing;
        sink.report(&progress);
        let client: Option<Arc<Client>> = if self.lsp.is_configured(language) {
            match self.lsp.client(language) {
                Ok(client) => Some(client),
                Err(err) => {
                    tracing::warn!("{language}: analyzer unavailable, using CST: {err}");
                    None
                }
            }
        } else {
            tracing::debug!("{language}: no analyzer configured, using CST");
            None
        };
        progress.lsp_available = client.is_some();

        if client.is_some() {
            progress.state = PartitionState::Settling;
            sink.report(&progress);
            sleep_cancellable(lsp::Manager::settle_delay(language), cancel)?;
        }

        progress.state = PartitionState::SymbolsIndexing;
        sink.report(&progress);
        let mut extractor: Option<Box<dyn LanguageCst>> = None;

        for file in files {
            cancel.checkpoint()?;
            progress.files_seen += 1;

            let abs = file.abs_path.display().to_string();
            let current_mtime = file_mtime(&file.abs_path).ok();

            if !force {
                if let (Some(current), Some(meta)) =
                    (current_mtime, self.store.file_meta(&abs)?)
                {
                    if meta.mod_time >= current {
                        progress.files_skipped += 1;
                        report.skipped += 1;
                        sink.report(&progress);
                        continue;
                    }
                }
            }

            let mut stored: Option<(usize, ExtractionSource)> = None;
            if let Some(client) = &client {
                match self.index_file_lsp(client, file) {
                    Ok(count) => stored = Some((count, ExtractionSource::Lsp)),
                    Err(err @ EngineError::Store(_)) => return Err(err),
                    Err(err) => {
                        tracing::debug!("{}: LSP symbols failed: {err}", file.rel_path)
                    }
                }
            }
            if stored.is_none() {
                if extractor.is_none() {
                    extractor = Some(cst::extractor_for(language)?);
                }
                match self.index_file_cst(extractor.as_mut().unwrap(), file) {
                    Ok(count) => stored = Some((count, ExtractionSource::Cst)),
                    Err(err @ EngineError::Store(_)) => return Err(err),
                    Err(err) => {
                        tracing::warn!("{}: extraction failed: {err}", file.rel_path)
                    }
                }
            }

            match stored {
                Some((count, source)) => {
                    // No meta row on failure, so the file retries next run.
                    let mtime = current_mtime.unwrap_or_else(now_unix);
                    self.store.upsert_file_meta(&abs, mtime, language)?;
                    report.indexed += 1;
                    report.symbols += count;
                    match source {
                        ExtractionSource::Lsp => progress.lsp_count += 1,
                        ExtractionSource::Cst => progress.cst_count += 1,
                    }
                }
                None => {
                    progress.errors += 1;
                    report.errors += 1;
                }
            }
            sink.report(&progress);
        }

        progress.state = PartitionState::CallsIndexing;
        sink.report(&progress);
        self.store.clear_calls_for_language(language)?;
        let mut calls: Option<usize> = None;
        if let Some(client) = &client {
            match callgraph::run_lsp(&self.store, client, language, cancel) {
                Ok(outcome) => calls = outcome,
                Err(err @ EngineError::Cancelled) | Err(err @ EngineError::Store(_)) => {
                    return Err(err);
                }
                Err(err) => {
                    tracing::debug!("{language}: LSP call graph unavailable: {err}");
                }
            }
        }
        report.calls = match calls {
            Some(count) => count,
            None => callgraph::run_cst(&self.store, files, cancel)?,
        };

        progress.state = PartitionState::HierarchyIndexing;
        sink.report(&progress);
        self.store.clear_type_edges_for_language(language)?;
        let mut type_edges: Option<usize> = None;
        if let Some(client) = &client {
            match hierarchy::run_lsp(&self.store, client, language, cancel) {
                Ok(outcome) => type_edges = outcome,
                Err(err @ EngineError::Cancelled) | Err(err @ EngineError::Store(_)) => {
                    return Err(err);
                }
                Err(err) => {
                    tracing::debug!("{language}: LSP type hierarchy unavailable: {err}");
                }
            }
        }
        report.type_edges = match type_edges {
            Some(count) => count,
            None => hierarchy::run_cst(&self.store, files, cancel)?,
        };

        progress.state = PartitionState::Done;
        sink.report(&progress);
        Ok(report)
    }

    fn index_file_lsp(&self, client: &Client, file: &SourceFile) -> Result<usize> {
        let uri = path_to_uri(&file.abs_path);
        let symbols = client.document_symbols(&uri)?;
        let now = now_unix();
        let mut records = Vec::new();
        flatten_document_symbols(file, &symbols, "", now, &mut records);
        let count = records.len();
        self.store.upsert_symbols(&records)?;
        Ok(count)
    }

    fn index_file_cst(
        &self,
        extractor: &mut Box<dyn LanguageCst>,
        file: &SourceFile,
    ) -> Result<usize> {
        let source = std::fs::read_to_string(&file.abs_path)
            .map_err(|err| EngineError::Extraction(format!("read {}: {err}", file.rel_path)))?;
        let now = now_unix();
        let abs = file.abs_path.display().to_string();
        let records: Vec<Symbol> = extractor
            .symbols(&source)?
            .into_iter()
            .map(|sym| Symbol {
                id: symbol_id(&file.rel_path, &sym.scope, &sym.name),
                name: sym.name,
                kind: sym.kind,
                file: abs.clone(),
                line: sym.start_line,
                column: sym.start_col,
                end_line: Some(sym.end_line),
                end_column: Some(sym.end_col),
                scope: sym.scope,
                signature: sym.signature,
                documentation: None,
                language: file.language,
                source: ExtractionSource::Cst,
                created_at: now,
            })
            .collect();
        let count = records.len();
        self.store.upsert_symbols(&records)?;
        Ok(count)
    }
}

/// Flatten the hierarchical documentSymbol response into storable rows,
/// dot-joining ancestor names into the scope path.
fn flatten_document_symbols(
    file: &SourceFile,
    symbols: &[DocumentSymbol],
    scope: &str,
    now: i64,
    out: &mut Vec<Symbol>,
) {
    for sym in symbols {
        if sym.name.is_empty() {
            continue;
        }
        let id = symbol_id(&file.rel_path, scope, &sym.name);
        let signature = sym
            .detail
            .as_deref()
            .map(str::trim)
            .filter(|detail| !detail.is_empty())
            .map(|detail| first_line(detail));
        out.push(Symbol {
            id,
            name: sym.name.clone(),
            kind: crate::lsp::types::collapse_symbol_kind(sym.kind),
            file: file.abs_path.display().to_string(),
            // LSP positions are 0-indexed lines.
            line: sym.selection_range.start.line + 1,
            column: sym.selection_range.start.character,
            end_line: Some(sym.range.end.line + 1),
            end_column: Some(sym.range.end.character),
            scope: scope.to_string(),
            signature,
            documentation: None,
            language: file.language,
            source: ExtractionSource::Lsp,
            created_at: now,
        });

        if !sym.children.is_empty() {
            let child_scope = if scope.is_empty() {
                sym.name.clone()
            } else {
                format!("{scope}.{}", sym.name)
            };
            flatten_document_symbols(file, &sym.children, &child_scope, now, out);
        }
    }
}

fn sleep_cancellable(delay: Duration, cancel: &CancelToken) -> Result<()> {
    let mut remaining = delay;
    let slice = Duration::from_millis(250);
    while remaining > Duration::ZERO {
        cancel.checkpoint()?;
        let step = remaining.min(slice);
        std::thread::sleep(step);
        remaining -= step;
    }
    cancel.checkpoint()
}
