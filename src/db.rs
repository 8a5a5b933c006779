use std::path::Path;

use rusqlite::Connection;

const SCHEMA: &str = include_str!("../schema.sql");

/// Open the SQLite database at `path` with foreign keys enforced.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Create the schema. Safe to run against an existing database.
pub fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
