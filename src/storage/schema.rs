//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the esaj-crawler database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Processes found while enumerating OAB listings
CREATE TABLE IF NOT EXISTS process_seeds (
    process_id TEXT PRIMARY KEY,
    oab TEXT NOT NULL,
    url TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_process_seeds_oab ON process_seeds(oab);

-- Header data read from each process "show" page
CREATE TABLE IF NOT EXISTS process_basic_info (
    process_id TEXT PRIMARY KEY,
    forum_code TEXT NOT NULL,
    forum_name TEXT NOT NULL,
    process_code TEXT NOT NULL,
    judge TEXT NOT NULL,
    class TEXT NOT NULL,
    claimant TEXT NOT NULL,
    defendant TEXT NOT NULL,
    court_section TEXT NOT NULL,
    url TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Every OAB a process was reached from
CREATE TABLE IF NOT EXISTS process_basic_info_oabs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    process_id TEXT NOT NULL REFERENCES process_basic_info(process_id),
    oab TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(process_id, oab)
);

CREATE INDEX IF NOT EXISTS idx_basic_info_oabs_oab ON process_basic_info_oabs(oab);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
