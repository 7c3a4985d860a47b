use anyhow::Result;
use clap::Parser;
use srcgraph::indexer::Indexer;
use srcgraph::indexer::progress::{CancelToken, LogSink};
use srcgraph::query::QueryEngine;
use srcgraph::store::Store;
use srcgraph::{cli, scan};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SRCGRAPH_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    match args.command {
        cli::Command::Index {
            project,
            db,
            force,
            no_ignore,
        } => {
            let db_path = db.unwrap_or_else(|| cli::default_db_path(&project));
            let indexer = Indexer::new(project.clone(), &db_path, cli::default_launch_map())?;
            let files = scan::scan_project(&project, no_ignore)?;
            let summary =
                indexer.index_project(files, force, &CancelToken::new(), &LogSink)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        cli::Command::Search {
            query,
            project,
            db,
            kind,
            languages,
            exact,
            limit,
        } => {
            let store = open_store(&project, db)?;
            let results = QueryEngine::new(&store).search(
                &query,
                kind.as_deref(),
                &languages,
                exact,
                Some(limit),
            )?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        cli::Command::Callers {
            name,
            project,
            db,
            languages,
            limit,
        } => {
            let store = open_store(&project, db)?;
            let results = QueryEngine::new(&store).callers(&name, &languages, Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        cli::Command::Callees {
            name,
            project,
            db,
            languages,
            limit,
        } => {
            let store = open_store(&project, db)?;
            let results = QueryEngine::new(&store).callees(&name, &languages, Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        cli::Command::Implementations {
            parent,
            project,
            db,
            limit,
        } => {
            let store = open_store(&project, db)?;
            let results = QueryEngine::new(&store).implementations(&parent, Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        cli::Command::Signature {
            name,
            project,
            db,
            languages,
        } => {
            let store = open_store(&project, db)?;
            let results = QueryEngine::new(&store).signatures(&name, &languages)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        cli::Command::Stats { project, db } => {
            let store = open_store(&project, db)?;
            let stats = QueryEngine::new(&store).stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

fn open_store(project: &PathBuf, db: Option<PathBuf>) -> Result<Store> {
    let db_path = db.unwrap_or_else(|| cli::default_db_path(project));
    Ok(Store::open(&db_path)?)
}
