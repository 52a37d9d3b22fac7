use anyhow::Result;
use log::debug;
use rusqlite::Connection;

use crate::db::repository::MetaRepo;

pub const SCHEMA_VERSION: &str = "1";

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS fast_sessions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            protocol      TEXT NOT NULL,
            started_at    INTEGER NOT NULL,
            target_hours  REAL NOT NULL,
            ended_at      INTEGER,
            status        TEXT NOT NULL DEFAULT 'active'
                          CHECK(status IN ('active','completed','cancelled')),
            note          TEXT,
            created_at    TEXT DEFAULT (datetime('now'))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_single_active_session
            ON fast_sessions(status) WHERE status = 'active';

        CREATE INDEX IF NOT EXISTS idx_sessions_ended_at
            ON fast_sessions(ended_at);

        CREATE TABLE IF NOT EXISTS mood_checkins (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            date        TEXT NOT NULL UNIQUE,
            mood        TEXT NOT NULL CHECK(mood IN ('great','good','okay','low','bad')),
            energy      INTEGER NOT NULL CHECK(energy BETWEEN 1 AND 5),
            note        TEXT,
            created_at  TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    MetaRepo::set(conn, "schema_version", SCHEMA_VERSION)?;
    debug!("migrations applied, schema version {}", SCHEMA_VERSION);
    Ok(())
}
