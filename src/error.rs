use std::time::Duration;

/// Unified error type for the engine.
///
/// Per-file failures (`Extraction`, single-request `Protocol`/`Timeout`) are
/// recovered by the pipeline; `Store` failures are fatal; `Unsupported` tells
/// the caller to downgrade to the next extraction strategy.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("used before initialization")]
    NotInitialized,

    #[error("failed to launch analyzer: {0}")]
    Launcher(String),

    #[error("analyzer transport failure: {0}")]
    Transport(String),

    #[error("analyzer error {code}: {message}")]
    Protocol { code: i64, message: String },

    #[error("not supported: {0}")]
    Unsupported(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("store failure: {0}")]
    Store(String),

    #[error("cancelled")]
    Cancelled,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl EngineError {
    /// True for errors the caller should treat as "try the next strategy"
    /// rather than a hard failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            EngineError::Unsupported(_) | EngineError::Protocol { code: -32601, .. }
        )
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError::Store(err.to_string())
    }
}

impl From<r2d2::Error> for EngineError {
    fn from(err: r2d2::Error) -> Self {
        EngineError::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
