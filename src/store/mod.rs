//! Embedded graph store: symbols, call edges, type edges, file metadata.
//!
//! One write connection behind a mutex, a pooled set of readers. Readers run
//! concurrently with the single writer (WAL). All name-matching queries that
//! bridge LSP and CST identifier conventions live here.

use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::model::{
    CalleeHit, CallerHit, ExtractionSource, FileMeta, Language, LanguageStat, StatsReport, Symbol,
    SymbolKind, TypeRelation,
};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod schema;

/// A directed reference from caller to callee at a concrete call site.
#[derive(Debug, Clone)]
pub struct CallEdge {
    pub caller_id: String,
    pub callee_id: String,
    pub file: String,
    pub line: i64,
    pub column: i64,
}

/// A hierarchy edge awaiting insertion. `parent` is either a stored symbol
/// id or a bare display name when the parent never resolved.
#[derive(Debug, Clone)]
pub struct TypeEdge {
    pub child_id: String,
    pub parent: String,
    pub relation: TypeRelation,
}

#[derive(Debug)]
struct ConnectionCustomizer;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.busy_timeout(Duration::from_secs(30))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}

pub struct Store {
    db_path: PathBuf,
    write_conn: Arc<Mutex<Connection>>,
    read_pool: Pool<SqliteConnectionManager>,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Store> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| EngineError::Store(format!("create {}: {err}", parent.display())))?;
        }

        let write_conn = Connection::open(db_path)?;
        write_conn.busy_timeout(Duration::from_secs(30))?;
        write_conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;
        schema::init(&write_conn)?;

        let config = Config::get();
        let manager = SqliteConnectionManager::file(db_path);
        let read_pool = Pool::builder()
            .max_size(config.pool_size)
            .min_idle(Some(config.pool_min_idle))
            .connection_timeout(Duration::from_secs(30))
            .connection_customizer(Box::new(ConnectionCustomizer))
            .build(manager)?;

        Ok(Store {
            db_path: db_path.to_path_buf(),
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.write_conn.lock().unwrap()
    }

    fn read_conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.read_pool.get()?)
    }

    // ---- writes -----------------------------------------------------------

    /// Insert or replace by identity. Re-indexing the same definition twice
    /// leaves exactly one row matching the last insert.
    pub fn upsert_symbol(&self, symbol: &Symbol) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO symbols
             (id, name, kind, file, line, column, end_line, end_column,
              scope, signature, documentation, language, source, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                symbol.id,
                symbol.name,
                symbol.kind.as_str(),
                symbol.file,
                symbol.line,
                symbol.column,
                symbol.end_line,
                symbol.end_column,
                symbol.scope,
                symbol.signature,
                symbol.documentation,
                symbol.language.as_str(),
                symbol.source.as_str(),
                symbol.created_at,
            ],
        )?;
        Ok(())
    }

    /// Batched variant for a pipeline pass; one transaction for the lot.
    pub fn upsert_symbols(&self, symbols: &[Symbol]) -> Result<()> {
        if symbols.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO symbols
                 (id, name, kind, file, line, column, end_line, end_column,
                  scope, signature, documentation, language, source, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for symbol in symbols {
                stmt.execute(params![
                    symbol.id,
                    symbol.name,
                    symbol.kind.as_str(),
                    symbol.file,
                    symbol.line,
                    symbol.column,
                    symbol.end_line,
                    symbol.end_column,
                    symbol.scope,
                    symbol.signature,
                    symbol.documentation,
                    symbol.language.as_str(),
                    symbol.source.as_str(),
                    symbol.created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn insert_call(&self, call: &CallEdge) -> Result<()> {
        self.conn().execute(
            "INSERT INTO calls (caller_id, callee_id, file, line, column)
             VALUES (?, ?, ?, ?, ?)",
            params![call.caller_id, call.callee_id, call.file, call.line, call.column],
        )?;
        Ok(())
    }

    pub fn insert_calls(&self, calls: &[CallEdge]) -> Result<()> {
        if calls.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO calls (caller_id, callee_id, file, line, column)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            for call in calls {
                stmt.execute(params![
                    call.caller_id,
                    call.callee_id,
                    call.file,
                    call.line,
                    call.column
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn insert_type_edge(&self, edge: &TypeEdge) -> Result<()> {
        self.conn().execute(
            "INSERT INTO type_hierarchy (child_id, parent_id, relationship)
             VALUES (?, ?, ?)",
            params![edge.child_id, edge.parent, edge.relation.as_str()],
        )?;
        Ok(())
    }

    pub fn upsert_file_meta(&self, path: &str, mod_time: i64, language: Language) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO file_meta (path, mod_time, language)
             VALUES (?, ?, ?)",
            params![path, mod_time, language.as_str()],
        )?;
        Ok(())
    }

    pub fn file_meta(&self, path: &str) -> Result<Option<FileMeta>> {
        self.read_conn()?
            .query_row(
                "SELECT path, mod_time, language FROM file_meta WHERE path = ?",
                params![path],
                |row| {
                    Ok(FileMeta {
                        path: row.get(0)?,
                        mod_time: row.get(1)?,
                        language: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Forced rebuild: empty all four tables.
    pub fn clear_all(&self) -> Result<()> {
        self.conn().execute_batch(
            "
            DELETE FROM calls;
            DELETE FROM type_hierarchy;
            DELETE FROM symbols;
            DELETE FROM file_meta;
            ",
        )?;
        Ok(())
    }

    pub fn clear_calls_for_language(&self, language: Language) -> Result<()> {
        self.conn().execute(
            "DELETE FROM calls WHERE caller_id IN (
                SELECT id FROM symbols WHERE language = ?
            )",
            params![language.as_str()],
        )?;
        Ok(())
    }

    pub fn clear_type_edges_for_language(&self, language: Language) -> Result<()> {
        self.conn().execute(
            "DELETE FROM type_hierarchy WHERE child_id IN (
                SELECT id FROM symbols WHERE language = ?
            )",
            params![language.as_str()],
        )?;
        Ok(())
    }

    // ---- reads ------------------------------------------------------------

    /// Substring search against the symbol name. Module/package declarations
    /// stay out of fuzzy results unless the caller asks for them by kind.
    pub fn search(
        &self,
        query: &str,
        kind: Option<SymbolKind>,
        languages: Option<&[Language]>,
        exact: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Symbol>> {
        let mut sql = String::from(
            "SELECT id, name, kind, file, line, column, end_line, end_column,
                    scope, signature, documentation, language, source, created_at
             FROM symbols WHERE ",
        );
        let pattern = if exact {
            sql.push_str("name = ?");
            query.to_string()
        } else {
            sql.push_str("name LIKE ?");
            format!("%{query}%")
        };
        let mut args: Vec<&dyn rusqlite::ToSql> = vec![&pattern];

        let kind_tag = kind.map(|k| k.as_str());
        match &kind_tag {
            Some(tag) => {
                sql.push_str(" AND kind = ?");
                args.push(tag);
            }
            None => {
                sql.push_str(" AND kind != 'module'");
            }
        }

        let lang_tags = language_tags(languages);
        push_language_filter(&mut sql, &mut args, "language", &lang_tags);

        sql.push_str(" ORDER BY name, file, line");
        let limit = limit.map(|l| l as i64);
        if let Some(limit) = &limit {
            sql.push_str(" LIMIT ?");
            args.push(limit);
        }

        self.query_symbols(&sql, &args)
    }

    /// Flexible name matching, reconciling analyzer naming conventions:
    /// exact `name`, `name(` prefix (parameter list embedded in the stored
    /// name), or `*.name(` dotted qualified form.
    pub fn get_by_name(&self, name: &str, languages: Option<&[Language]>) -> Result<Vec<Symbol>> {
        let mut sql = String::from(
            "SELECT id, name, kind, file, line, column, end_line, end_column,
                    scope, signature, documentation, language, source, created_at
             FROM symbols
             WHERE (name = ? OR name LIKE ? OR name LIKE ?)",
        );
        let with_params = format!("{name}(%");
        let qualified = format!("%.{name}(%");
        let mut args: Vec<&dyn rusqlite::ToSql> = vec![&name, &with_params, &qualified];

        let lang_tags = language_tags(languages);
        push_language_filter(&mut sql, &mut args, "language", &lang_tags);
        sql.push_str(" ORDER BY file, line");

        self.query_symbols(&sql, &args)
    }

    /// Callers of `name`, one row per call site. The callee id is matched
    /// against three suffix shapes (`#name`, `#…name(…`, `.name`) so bare
    /// CST ids and parenthesized LSP ids both hit. Grouping by the call-site
    /// triple collapses a site that resolved to overlapping symbols
    /// (interface plus implementation) into a single row.
    pub fn callers(&self, name: &str, languages: Option<&[Language]>) -> Result<Vec<CallerHit>> {
        let mut sql = String::from(
            "SELECT s.id, s.name, s.kind, s.file, s.line, s.column, s.end_line, s.end_column,
                    s.scope, s.signature, s.documentation, s.language, s.source, s.created_at,
                    c.file, c.line, c.column
             FROM symbols s
             JOIN calls c ON s.id = c.caller_id
             WHERE (c.callee_id LIKE ? OR c.callee_id LIKE ? OR c.callee_id LIKE ?)",
        );
        let plain = format!("%#{name}");
        let with_params = format!("%#%.{name}(%");
        let dotted = format!("%.{name}");
        let mut args: Vec<&dyn rusqlite::ToSql> = vec![&plain, &with_params, &dotted];

        let lang_tags = language_tags(languages);
        push_language_filter(&mut sql, &mut args, "s.language", &lang_tags);
        sql.push_str(" GROUP BY c.file, c.line, c.column ORDER BY c.file, c.line");

        let conn = self.read_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(&*args, |row| {
            Ok(CallerHit {
                symbol: symbol_from_row(row)?,
                call_file: row.get(14)?,
                call_line: row.get(15)?,
                call_column: row.get(16)?,
            })
        })?;
        collect(rows)
    }

    /// Symbols called from `name`, one row per call site, with the caller
    /// name matched through the same flexible patterns.
    pub fn callees(&self, name: &str, languages: Option<&[Language]>) -> Result<Vec<CalleeHit>> {
        let mut sql = String::from(
            "SELECT s.id, s.name, s.kind, s.file, s.line, s.column, s.end_line, s.end_column,
                    s.scope, s.signature, s.documentation, s.language, s.source, s.created_at,
                    c.file, c.line, c.column
             FROM symbols s
             JOIN calls c ON s.id = c.callee_id
             JOIN symbols caller ON c.caller_id = caller.id
             WHERE (caller.name = ? OR caller.name LIKE ? OR caller.name LIKE ?)",
        );
        let with_params = format!("{name}(%");
        let qualified = format!("%.{name}(%");
        let mut args: Vec<&dyn rusqlite::ToSql> = vec![&name, &with_params, &qualified];

        let lang_tags = language_tags(languages);
        push_language_filter(&mut sql, &mut args, "s.language", &lang_tags);
        sql.push_str(" GROUP BY c.file, c.line, c.column ORDER BY c.file, c.line");

        let conn = self.read_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(&*args, |row| {
            Ok(CalleeHit {
                symbol: symbol_from_row(row)?,
                call_file: row.get(14)?,
                call_line: row.get(15)?,
                call_column: row.get(16)?,
            })
        })?;
        collect(rows)
    }

    /// Children whose hierarchy edge points at `parent_name`, whether the
    /// edge was stored with a resolved parent id or late-bound by display
    /// name.
    pub fn implementations(&self, parent_name: &str) -> Result<Vec<Symbol>> {
        let sql = "SELECT s.id, s.name, s.kind, s.file, s.line, s.column, s.end_line, s.end_column,
                          s.scope, s.signature, s.documentation, s.language, s.source, s.created_at
                   FROM symbols s
                   JOIN type_hierarchy th ON s.id = th.child_id
                   LEFT JOIN symbols p ON th.parent_id = p.id
                   WHERE th.parent_id = ?1 OR p.name = ?1
                   ORDER BY s.file, s.line";
        let args: Vec<&dyn rusqlite::ToSql> = vec![&parent_name];
        self.query_symbols(sql, &args)
    }

    /// Flexible-match symbols carrying a non-empty signature.
    pub fn signatures(&self, name: &str, languages: Option<&[Language]>) -> Result<Vec<Symbol>> {
        let mut sql = String::from(
            "SELECT id, name, kind, file, line, column, end_line, end_column,
                    scope, signature, documentation, language, source, created_at
             FROM symbols
             WHERE (name = ? OR name LIKE ? OR name LIKE ?)
               AND signature IS NOT NULL AND signature != ''",
        );
        let with_params = format!("{name}(%");
        let qualified = format!("%.{name}(%");
        let mut args: Vec<&dyn rusqlite::ToSql> = vec![&name, &with_params, &qualified];

        let lang_tags = language_tags(languages);
        push_language_filter(&mut sql, &mut args, "language", &lang_tags);
        sql.push_str(" ORDER BY file, line");

        self.query_symbols(&sql, &args)
    }

    /// Pipeline input for the call-graph pass.
    pub fn function_symbols(&self, language: Language) -> Result<Vec<Symbol>> {
        let tag = language.as_str();
        let args: Vec<&dyn rusqlite::ToSql> = vec![&tag];
        self.query_symbols(
            "SELECT id, name, kind, file, line, column, end_line, end_column,
                    scope, signature, documentation, language, source, created_at
             FROM symbols
             WHERE kind IN ('function', 'method') AND language = ?
             ORDER BY file, line",
            &args,
        )
    }

    /// Pipeline input for the type-hierarchy pass.
    pub fn type_symbols(&self, language: Language) -> Result<Vec<Symbol>> {
        let tag = language.as_str();
        let args: Vec<&dyn rusqlite::ToSql> = vec![&tag];
        self.query_symbols(
            "SELECT id, name, kind, file, line, column, end_line, end_column,
                    scope, signature, documentation, language, source, created_at
             FROM symbols
             WHERE kind IN ('class', 'interface', 'struct', 'type', 'enum') AND language = ?
             ORDER BY file, line",
            &args,
        )
    }

    /// The function or method whose range covers `line` of `file`. Smallest
    /// covering range wins so nested definitions resolve to the innermost.
    pub fn enclosing_function(
        &self,
        file: &str,
        line: i64,
        language: Language,
    ) -> Result<Option<Symbol>> {
        self.read_conn()?
            .query_row(
                "SELECT id, name, kind, file, line, column, end_line, end_column,
                        scope, signature, documentation, language, source, created_at
                 FROM symbols
                 WHERE file = ?
                   AND language = ?
                   AND kind IN ('function', 'method')
                   AND line <= ?
                   AND (end_line IS NULL OR end_line >= ?)
                 ORDER BY CASE WHEN end_line IS NULL THEN 1 ELSE 0 END,
                          (end_line - line) ASC, line DESC
                 LIMIT 1",
                params![file, language.as_str(), line, line],
                symbol_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn symbols_in_file(&self, file: &str) -> Result<Vec<Symbol>> {
        let args: Vec<&dyn rusqlite::ToSql> = vec![&file];
        self.query_symbols(
            "SELECT id, name, kind, file, line, column, end_line, end_column,
                    scope, signature, documentation, language, source, created_at
             FROM symbols WHERE file = ? ORDER BY line",
            &args,
        )
    }

    pub fn symbol_count(&self) -> Result<i64> {
        self.scalar("SELECT COUNT(*) FROM symbols")
    }

    pub fn call_count(&self) -> Result<i64> {
        self.scalar("SELECT COUNT(*) FROM calls")
    }

    pub fn type_edge_count(&self) -> Result<i64> {
        self.scalar("SELECT COUNT(*) FROM type_hierarchy")
    }

    pub fn stats(&self) -> Result<StatsReport> {
        let conn = self.read_conn()?;

        let total_symbols: i64 = conn.query_row("SELECT COUNT(*) FROM symbols", [], |r| r.get(0))?;
        let call_edges: i64 = conn.query_row("SELECT COUNT(*) FROM calls", [], |r| r.get(0))?;
        let type_edges: i64 =
            conn.query_row("SELECT COUNT(*) FROM type_hierarchy", [], |r| r.get(0))?;

        let mut kinds = BTreeMap::new();
        {
            let mut stmt = conn.prepare("SELECT kind, COUNT(*) FROM symbols GROUP BY kind")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (kind, count) = row?;
                kinds.insert(kind, count);
            }
        }

        let mut languages = Vec::new();
        {
            let mut stmt = conn.prepare(
                "SELECT language, COUNT(*) AS count FROM symbols
                 GROUP BY language ORDER BY count DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (language, count) = row?;
                let percent = if total_symbols > 0 {
                    count as f64 / total_symbols as f64 * 100.0
                } else {
                    0.0
                };
                languages.push(LanguageStat {
                    language,
                    count,
                    percent,
                });
            }
        }

        let last_build_time: Option<i64> =
            conn.query_row("SELECT MAX(mod_time) FROM file_meta", [], |r| r.get(0))?;
        let files_indexed: i64 =
            conn.query_row("SELECT COUNT(*) FROM file_meta", [], |r| r.get(0))?;

        let database_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len() as i64)
            .unwrap_or(0);

        Ok(StatsReport {
            total_symbols,
            kinds,
            call_edges,
            type_edges,
            languages,
            last_build_time,
            files_indexed,
            database_path: self.db_path.display().to_string(),
            database_size,
        })
    }

    fn scalar(&self, sql: &str) -> Result<i64> {
        Ok(self.read_conn()?.query_row(sql, [], |r| r.get(0))?)
    }

    fn query_symbols(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Symbol>> {
        let conn = self.read_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, symbol_from_row)?;
        collect(rows)
    }
}

fn collect<T>(
    rows: impl Iterator<Item = std::result::Result<T, rusqlite::Error>>,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn language_tags(languages: Option<&[Language]>) -> Vec<String> {
    languages
        .map(|langs| langs.iter().map(|l| l.as_str().to_string()).collect())
        .unwrap_or_default()
}

fn push_language_filter<'a>(
    sql: &mut String,
    args: &mut Vec<&'a dyn rusqlite::ToSql>,
    column: &str,
    lang_tags: &'a [String],
) {
    if lang_tags.is_empty() {
        return;
    }
    sql.push_str(&format!(" AND {column} IN ("));
    for (idx, tag) in lang_tags.iter().enumerate() {
        if idx > 0 {
            sql.push(',');
        }
        sql.push('?');
        args.push(tag);
    }
    sql.push(')');
}

fn symbol_from_row(row: &Row<'_>) -> std::result::Result<Symbol, rusqlite::Error> {
    let kind: String = row.get(2)?;
    let language: String = row.get(11)?;
    let source: String = row.get(12)?;
    let language = Language::from_tag(&language).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            11,
            rusqlite::types::Type::Text,
            format!("unknown language tag {language}").into(),
        )
    })?;
    Ok(Symbol {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: SymbolKind::parse(&kind),
        file: row.get(3)?,
        line: row.get(4)?,
        column: row.get(5)?,
        end_line: row.get(6)?,
        end_column: row.get(7)?,
        scope: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        signature: row.get(9)?,
        documentation: row.get(10)?,
        language,
        source: ExtractionSource::parse(&source),
        created_at: row.get(13)?,
    })
}
