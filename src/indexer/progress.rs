//! Progress events and cooperative cancellation for the pipeline.
//! Rendering is the front-end's concern; the pipeline only emits.

use crate::error::{EngineError, Result};
use crate::model::Language;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lifecycle of one language partition. `Failed` is reachable from any
/// non-terminal state; failure stays local to the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionState {
    Pending,
    Initializing,
    Settling,
    SymbolsIndexing,
    CallsIndexing,
    HierarchyIndexing,
    Done,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageProgress {
    pub language: Language,
    pub state: PartitionState,
    pub files_seen: usize,
    pub files_total: usize,
    pub files_skipped: usize,
    pub lsp_count: usize,
    pub cst_count: usize,
    pub errors: usize,
    /// False when the analyzer failed to launch and the partition is riding
    /// the CST path.
    pub lsp_available: bool,
}

impl LanguageProgress {
    pub fn new(language: Language, files_total: usize) -> LanguageProgress {
        LanguageProgress {
            language,
            state: PartitionState::Pending,
            files_seen: 0,
            files_total,
            files_skipped: 0,
            lsp_count: 0,
            cst_count: 0,
            errors: 0,
            lsp_available: true,
        }
    }
}

/// Pluggable event receiver for the collaborator front-end.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &LanguageProgress);

    /// Terminal event when the run was cancelled mid-flight.
    fn aborted(&self) {}
}

/// Discards everything.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _progress: &LanguageProgress) {}
}

/// Forwards progress to the log.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, progress: &LanguageProgress) {
        tracing::info!(
            language = %progress.language,
            state = ?progress.state,
            seen = progress.files_seen,
            total = progress.files_total,
            skipped = progress.files_skipped,
            lsp = progress.lsp_count,
            cst = progress.cst_count,
            errors = progress.errors,
            "indexing"
        );
    }

    fn aborted(&self) {
        tracing::warn!("index run aborted");
    }
}

/// Cooperative cancellation token, checked at every suspension point.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_fires_once_set() {
        let token = CancelToken::new();
        assert!(token.checkpoint().is_ok());
        token.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.checkpoint(), Err(EngineError::Cancelled)));
        // Clones observe the same flag.
        let clone = token.clone();
        assert!(clone.is_cancelled());
    }
}
