use rusqlite::Connection;

const SCHEMA: &str = include_str!("schema.sql");

pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;

    // Databases created before the revision row existed start at zero
    conn.execute(
        "INSERT OR IGNORE INTO session_revision (id, revision, origin, updated_at) VALUES (1, 0, '', '')",
        [],
    )?;

    Ok(())
}
