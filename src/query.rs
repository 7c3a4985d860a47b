//! Query façade: shapes store results for the front-end. Flexible name
//! matching lives in the store; this layer only picks the query, validates
//! language tags, and applies the requested limit.

use crate::error::{EngineError, Result};
use crate::model::{CalleeHit, CallerHit, Language, StatsReport, Symbol, SymbolKind};
use crate::store::Store;

pub struct QueryEngine<'a> {
    store: &'a Store,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a Store) -> QueryEngine<'a> {
        QueryEngine { store }
    }

    pub fn search(
        &self,
        query: &str,
        kind: Option<&str>,
        languages: &[String],
        exact: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Symbol>> {
        let languages = parse_languages(languages)?;
        self.store.search(
            query,
            kind.map(SymbolKind::parse),
            languages_opt(&languages),
            exact,
            limit,
        )
    }

    pub fn get_by_name(&self, name: &str, languages: &[String]) -> Result<Vec<Symbol>> {
        let languages = parse_languages(languages)?;
        self.store.get_by_name(name, languages_opt(&languages))
    }

    pub fn callers(
        &self,
        name: &str,
        languages: &[String],
        limit: Option<usize>,
    ) -> Result<Vec<CallerHit>> {
        let languages = parse_languages(languages)?;
        let mut hits = self.store.callers(name, languages_opt(&languages))?;
        truncate(&mut hits, limit);
        Ok(hits)
    }

    pub fn callees(
        &self,
        name: &str,
        languages: &[String],
        limit: Option<usize>,
    ) -> Result<Vec<CalleeHit>> {
        let languages = parse_languages(languages)?;
        let mut hits = self.store.callees(name, languages_opt(&languages))?;
        truncate(&mut hits, limit);
        Ok(hits)
    }

    pub fn implementations(&self, parent: &str, limit: Option<usize>) -> Result<Vec<Symbol>> {
        let mut hits = self.store.implementations(parent)?;
        truncate(&mut hits, limit);
        Ok(hits)
    }

    pub fn signatures(&self, name: &str, languages: &[String]) -> Result<Vec<Symbol>> {
        let languages = parse_languages(languages)?;
        self.store.signatures(name, languages_opt(&languages))
    }

    pub fn stats(&self) -> Result<StatsReport> {
        self.store.stats()
    }
}

fn parse_languages(tags: &[String]) -> Result<Vec<Language>> {
    tags.iter()
        .map(|tag| {
            Language::from_tag(tag)
                .ok_or_else(|| EngineError::Unsupported(format!("unknown language tag: {tag}")))
        })
        .collect()
}

fn languages_opt(languages: &[Language]) -> Option<&[Language]> {
    if languages.is_empty() {
        None
    } else {
        Some(languages)
    }
}

fn truncate<T>(items: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
}
