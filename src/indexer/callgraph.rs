//! Call-graph pass: resolve references into caller → callee edges.
//!
//! The LSP path asks the analyzer for references to every function symbol
//! and maps each location back to its enclosing function. When references
//! are unavailable or dry, the CST path re-parses each file and resolves
//! callee display names against the stored symbols.

use crate::cst;
use crate::error::{EngineError, Result};
use crate::indexer::progress::CancelToken;
use crate::lsp::Client;
use crate::lsp::types::Position;
use crate::model::{Language, SourceFile, symbol_id};
use crate::store::{CallEdge, Store};
use crate::util::{path_to_uri, uri_to_path};
use std::collections::HashSet;

/// Outcome of the LSP pass: `None` means the analyzer produced nothing and
/// the caller should downgrade to CST extraction.
pub fn run_lsp(
    store: &Store,
    client: &Client,
    language: Language,
    cancel: &CancelToken,
) -> Result<Option<usize>> {
    let functions = store.function_symbols(language)?;
    if functions.is_empty() {
        return Ok(Some(0));
    }

    let mut opened: HashSet<String> = HashSet::new();
    let mut seen_sites: HashSet<(String, i64, i64)> = HashSet::new();
    let mut references_seen = 0usize;
    let mut inserted = 0usize;

    for sym in &functions {
        cancel.checkpoint()?;
        let uri = path_to_uri(std::path::Path::new(&sym.file));

        if !opened.contains(&uri) {
            let Ok(content) = std::fs::read_to_string(&sym.file) else {
                continue;
            };
            if client.did_open(&uri, &content).is_err() {
                continue;
            }
            opened.insert(uri.clone());
        }

        let pos = Position {
            line: sym.line - 1,
            character: sym.column,
        };
        let refs = match client.references(&uri, pos, false) {
            Ok(refs) => refs,
            Err(err) if err.is_unsupported() => {
                close_all(client, &opened);
                return Err(err);
            }
            Err(EngineError::Transport(message)) => {
                close_all(client, &opened);
                return Err(EngineError::Transport(message));
            }
            Err(err) => {
                tracing::debug!("references for {} failed: {err}", sym.id);
                continue;
            }
        };
        references_seen += refs.len();

        for reference in refs {
            let ref_path = uri_to_path(&reference.uri);
            let ref_line = reference.range.start.line + 1;

            // The declaration itself is not a call site.
            if ref_path == sym.file && ref_line == sym.line {
                continue;
            }
            let Some(caller) = store.enclosing_function(&ref_path, ref_line, language)? else {
                continue;
            };
            let site = (
                ref_path.clone(),
                ref_line,
                reference.range.start.character,
            );
            if !seen_sites.insert(site) {
                continue;
            }
            let edge = CallEdge {
                caller_id: caller.id,
                callee_id: sym.id.clone(),
                file: ref_path,
                line: ref_line,
                column: reference.range.start.character,
            };
            match store.insert_call(&edge) {
                Ok(()) => inserted += 1,
                Err(err) => tracing::debug!("call edge rejected: {err}"),
            }
        }
    }

    close_all(client, &opened);

    if references_seen == 0 {
        return Ok(None);
    }
    Ok(Some(inserted))
}

fn close_all(client: &Client, opened: &HashSet<String>) {
    for uri in opened {
        let _ = client.did_close(uri);
    }
}

/// CST fallback: parse each file, resolve callee display names against the
/// stored symbols. Unresolvable callees are dropped, never stored with a
/// sentinel.
pub fn run_cst(store: &Store, files: &[SourceFile], cancel: &CancelToken) -> Result<usize> {
    let Some(language) = files.first().map(|f| f.language) else {
        return Ok(0);
    };
    let mut extractor = cst::extractor_for(language)?;
    let lang_filter = [language];

    let mut seen_sites: HashSet<(String, i64, i64)> = HashSet::new();
    let mut inserted = 0usize;

    for file in files {
        cancel.checkpoint()?;
        let source = match std::fs::read_to_string(&file.abs_path) {
            Ok(source) => source,
            Err(err) => {
                tracing::debug!("read {}: {err}", file.rel_path);
                continue;
            }
        };
        let calls = match extractor.calls(&source) {
            Ok(calls) => calls,
            Err(err) => {
                tracing::debug!("call extraction {}: {err}", file.rel_path);
                continue;
            }
        };

        for call in calls {
            let mut matches = store.get_by_name(&call.callee, Some(&lang_filter))?;
            if matches.is_empty() {
                matches = store.get_by_name(&call.callee, None)?;
            }
            let Some(callee) = matches.into_iter().next() else {
                continue;
            };
            let abs = file.abs_path.display().to_string();
            let site = (abs.clone(), call.line, call.column);
            if !seen_sites.insert(site) {
                continue;
            }
            let edge = CallEdge {
                caller_id: symbol_id(&file.rel_path, "", &call.caller),
                callee_id: callee.id,
                file: abs,
                line: call.line,
                column: call.column,
            };
            // The caller id is reconstructed from the parse; when the symbol
            // pass stored LSP-shaped names instead, the foreign key rejects
            // the edge and it is skipped.
            match store.insert_call(&edge) {
                Ok(()) => inserted += 1,
                Err(err) => tracing::debug!("call edge rejected: {err}"),
            }
        }
    }

    Ok(inserted)
}
