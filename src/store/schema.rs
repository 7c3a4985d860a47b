use crate::error::Result;
use rusqlite::Connection;

/// Canonical schema: four tables plus the secondary indexes the query
/// surface leans on. `type_hierarchy.parent_id` carries no foreign key on
/// purpose: unresolved parents are stored late-bound by display name.
pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        BEGIN;
        CREATE TABLE IF NOT EXISTS symbols (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            column INTEGER NOT NULL,
            end_line INTEGER,
            end_column INTEGER,
            scope TEXT,
            signature TEXT,
            documentation TEXT,
            language TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT 'lsp',
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS calls (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            caller_id TEXT NOT NULL,
            callee_id TEXT NOT NULL,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            column INTEGER NOT NULL,
            FOREIGN KEY(caller_id) REFERENCES symbols(id) ON DELETE CASCADE,
            FOREIGN KEY(callee_id) REFERENCES symbols(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS type_hierarchy (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            child_id TEXT NOT NULL,
            parent_id TEXT NOT NULL,
            relationship TEXT NOT NULL,
            FOREIGN KEY(child_id) REFERENCES symbols(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS file_meta (
            path TEXT PRIMARY KEY,
            mod_time INTEGER NOT NULL,
            language TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name);
        CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file);
        CREATE INDEX IF NOT EXISTS idx_symbols_kind ON symbols(kind);
        CREATE INDEX IF NOT EXISTS idx_symbols_language ON symbols(language);
        CREATE INDEX IF NOT EXISTS idx_calls_caller ON calls(caller_id);
        CREATE INDEX IF NOT EXISTS idx_calls_callee ON calls(callee_id);
        CREATE INDEX IF NOT EXISTS idx_type_hierarchy_child ON type_hierarchy(child_id);
        CREATE INDEX IF NOT EXISTS idx_type_hierarchy_parent ON type_hierarchy(parent_id);
        COMMIT;
        ",
    )?;
    Ok(())
}
