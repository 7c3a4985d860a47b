//! Thin command-line adapter over the engine. Parsing and JSON printing
//! only; everything structural lives in the library.

use crate::lsp::LaunchSpec;
use crate::model::Language;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "srcgraph",
    version,
    about = "Local multi-language code intelligence over LSP and syntax trees",
    after_help = r#"Examples:
  srcgraph index --project .
  srcgraph index --project . --force
  srcgraph search Reader --kind interface
  srcgraph callers Read --lang go
  srcgraph callees main --lang java
  srcgraph implementations Formatter
  srcgraph signature parse_config
  srcgraph stats
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Index the project: symbols, call graph, type hierarchy.
    Index {
        #[arg(long, default_value = ".")]
        project: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
        /// Clear the store and rebuild from scratch.
        #[arg(long)]
        force: bool,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
    },
    /// Fuzzy-search symbols by name.
    Search {
        query: String,
        #[arg(long, default_value = ".")]
        project: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
        /// Filter by kind (function, method, class, interface, ...).
        #[arg(long)]
        kind: Option<String>,
        /// Restrict to language tags; repeatable.
        #[arg(long = "lang")]
        languages: Vec<String>,
        /// Exact name match instead of substring.
        #[arg(long)]
        exact: bool,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Who calls this symbol.
    Callers {
        name: String,
        #[arg(long, default_value = ".")]
        project: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long = "lang")]
        languages: Vec<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// What this symbol calls.
    Callees {
        name: String,
        #[arg(long, default_value = ".")]
        project: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long = "lang")]
        languages: Vec<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Types that implement or extend the named parent.
    Implementations {
        parent: String,
        #[arg(long, default_value = ".")]
        project: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Stored declaration signatures for a symbol.
    Signature {
        name: String,
        #[arg(long, default_value = ".")]
        project: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long = "lang")]
        languages: Vec<String>,
    },
    /// Store statistics: counts by kind, language breakdown, build info.
    Stats {
        #[arg(long, default_value = ".")]
        project: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

pub fn default_db_path(project: &PathBuf) -> PathBuf {
    project.join(".srcgraph").join("graphs").join("srcgraph.db")
}

/// Default analyzer launch map. Commands resolve against PATH at spawn
/// time; a missing binary degrades that language to the CST path. C# has
/// no default analyzer and always rides CST.
pub fn default_launch_map() -> HashMap<Language, LaunchSpec> {
    let mut map = HashMap::new();
    map.insert(
        Language::Go,
        LaunchSpec {
            command: "gopls".into(),
            args: vec!["serve".into()],
        },
    );
    map.insert(
        Language::Python,
        LaunchSpec {
            command: "pyright-langserver".into(),
            args: vec!["--stdio".into()],
        },
    );
    for language in [
        Language::Typescript,
        Language::TypescriptReact,
        Language::Javascript,
    ] {
        map.insert(
            language,
            LaunchSpec {
                command: "typescript-language-server".into(),
                args: vec!["--stdio".into()],
            },
        );
    }
    map.insert(
        Language::Java,
        LaunchSpec {
            command: "jdtls".into(),
            args: vec!["-data".into(), "/tmp/jdtls-workspace".into()],
        },
    );
    map.insert(
        Language::Swift,
        LaunchSpec {
            command: "sourcekit-lsp".into(),
            args: vec![],
        },
    );
    map.insert(
        Language::Rust,
        LaunchSpec {
            command: "rust-analyzer".into(),
            args: vec![],
        },
    );
    map.insert(
        Language::Ocaml,
        LaunchSpec {
            command: "ocamllsp".into(),
            args: vec![],
        },
    );
    map
}
