//! srcgraph: a local, multi-language code intelligence engine.
//!
//! The indexing pipeline drives out-of-process language servers over
//! framed JSON-RPC and falls back to concrete-syntax-tree extraction where
//! no analyzer is available. Symbols, call edges, and type-hierarchy edges
//! land in an embedded SQLite store that answers structural queries: symbol
//! search, callers, callees, implementations, and signatures.

pub mod cli;
pub mod config;
pub mod cst;
pub mod error;
pub mod indexer;
pub mod lsp;
pub mod model;
pub mod query;
pub mod scan;
pub mod store;
pub mod util;

pub use error::{EngineError, Result};
