//! Type-hierarchy pass: extends / implements / embeds edges.
//!
//! The LSP path prepares a type hierarchy at every stored type symbol and
//! records its supertypes; parents are stored late-bound by display name.
//! The CST path reads heritage clauses per file and resolves parents
//! against stored symbols, falling back to the display name.

use crate::cst;
use crate::error::{EngineError, Result};
use crate::indexer::progress::CancelToken;
use crate::lsp::Client;
use crate::lsp::types::Position;
use crate::model::{Language, SourceFile, SymbolKind, symbol_id};
use crate::store::{Store, TypeEdge};
use crate::util::path_to_uri;
use std::collections::HashSet;

// LSP SymbolKind 11 = Interface, used to pick extends vs implements.
const LSP_KIND_INTERFACE: u32 = 11;

/// `None` means the analyzer yielded nothing; the caller downgrades to CST.
pub fn run_lsp(
    store: &Store,
    client: &Client,
    language: Language,
    cancel: &CancelToken,
) -> Result<Option<usize>> {
    let types = store.type_symbols(language)?;
    if types.is_empty() {
        return Ok(Some(0));
    }

    let mut opened: HashSet<String> = HashSet::new();
    let mut inserted = 0usize;

    for sym in &types {
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
        let items = match client.prepare_type_hierarchy(&uri, pos) {
            Ok(items) => items,
            Err(err) if err.is_unsupported() => {
                close_all(client, &opened);
                return Err(err);
            }
            Err(EngineError::Transport(message)) => {
                close_all(client, &opened);
                return Err(EngineError::Transport(message));
            }
            Err(err) => {
                tracing::debug!("prepareTypeHierarchy for {} failed: {err}", sym.id);
                continue;
            }
        };
        let Some(item) = items.into_iter().next() else {
            continue;
        };

        let supertypes = match client.supertypes(&item) {
            Ok(supertypes) => supertypes,
            Err(err) => {
                tracing::debug!("supertypes for {} failed: {err}", sym.id);
                continue;
            }
        };

        for parent in supertypes {
            let relation = if sym.kind == SymbolKind::Class && parent.kind == LSP_KIND_INTERFACE {
                crate::model::TypeRelation::Implements
            } else {
                crate::model::TypeRelation::Extends
            };
            let edge = TypeEdge {
                child_id: sym.id.clone(),
                // Resolved lazily at query time; the parent may live in a
                // file this run never indexed.
                parent: parent.name,
                relation,
            };
            match store.insert_type_edge(&edge) {
                Ok(()) => inserted += 1,
                Err(err) => tracing::debug!("type edge rejected: {err}"),
            }
        }
    }

    close_all(client, &opened);

    if inserted == 0 {
        return Ok(None);
    }
    Ok(Some(inserted))
}

fn close_all(client: &Client, opened: &HashSet<String>) {
    for uri in opened {
        let _ = client.did_close(uri);
    }
}

pub fn run_cst(store: &Store, files: &[SourceFile], cancel: &CancelToken) -> Result<usize> {
    let Some(language) = files.first().map(|f| f.language) else {
        return Ok(0);
    };
    let mut extractor = cst::extractor_for(language)?;
    let lang_filter = [language];
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
        let relationships = match extractor.heritage(&source) {
            Ok(relationships) => relationships,
            Err(err) => {
                tracing::debug!("heritage extraction {}: {err}", file.rel_path);
                continue;
            }
        };

        for rel in relationships {
            // A child may extend a parent defined in another language in
            // mixed repos; retry the lookup without the language filter.
            let mut parents = store.get_by_name(&rel.parent, Some(&lang_filter))?;
            if parents.is_empty() {
                parents = store.get_by_name(&rel.parent, None)?;
            }
            let parent = parents
                .into_iter()
                .next()
                .map(|p| p.id)
                .unwrap_or_else(|| rel.parent.clone());

            let edge = TypeEdge {
                child_id: symbol_id(&file.rel_path, "", &rel.child),
                parent,
                relation: rel.relation,
            };
            match store.insert_type_edge(&edge) {
                Ok(()) => inserted += 1,
                Err(err) => tracing::debug!("type edge rejected: {err}"),
            }
        }
    }

    Ok(inserted)
}
