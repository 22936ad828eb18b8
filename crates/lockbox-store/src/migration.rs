//! Versioned schema migrations.
//!
//! Each step is a batch of SQL tagged with a version number. Applied
//! versions are recorded in `_migrations`, so opening an up-to-date
//! database is a no-op and a half-applied step rolls back as a whole.

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// `(version, description, sql)`, strictly increasing by version.
/// New steps go at the end.
const STEPS: &[(u32, &str, &str)] = &[
    (
        1,
        "credentials table",
        r#"
        CREATE TABLE credentials (
            seq               INTEGER PRIMARY KEY AUTOINCREMENT,
            id                TEXT NOT NULL UNIQUE,
            domain            TEXT NOT NULL CHECK(length(domain) > 0),
            identity          TEXT NOT NULL CHECK(length(identity) > 0),
            secret_ciphertext BLOB NOT NULL,
            secret_key        BLOB NOT NULL,
            created_at        INTEGER NOT NULL,
            updated_at        INTEGER NOT NULL
        );
        "#,
    ),
    (
        2,
        "domain and identity lookup indexes",
        r#"
        CREATE INDEX idx_credentials_domain ON credentials(domain);
        CREATE INDEX idx_credentials_identity ON credentials(identity);
        "#,
    ),
];

/// Bring the schema up to [`latest_version`]. Returns the number of steps
/// applied.
pub fn run_all(conn: &mut Connection) -> StoreResult<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version    INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        );",
    )
    .map_err(|e| failed(0, "create _migrations", e))?;

    let from = current_version(conn)?;
    let mut applied = 0;
    for &(version, description, sql) in STEPS.iter().filter(|(v, ..)| *v > from) {
        info!(version, description, "applying schema migration");

        let tx = conn
            .transaction()
            .map_err(|e| failed(version, "begin", e))?;
        tx.execute_batch(sql)
            .map_err(|e| failed(version, "execute", e))?;
        tx.execute(
            "INSERT INTO _migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
            params![version, description, chrono::Utc::now().timestamp()],
        )
        .map_err(|e| failed(version, "record", e))?;
        tx.commit().map_err(|e| failed(version, "commit", e))?;

        applied += 1;
    }

    if applied == 0 {
        debug!(version = from, "schema up to date");
    } else {
        info!(from, to = latest_version(), applied, "schema migrated");
    }
    Ok(applied)
}

/// Highest applied version, or 0 for a fresh database.
pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| {
        row.get(0)
    })
    .map_err(|e| failed(0, "read version", e))
}

/// The version a fully migrated database reports.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, ..)| *version)
}

fn failed(version: u32, stage: &str, err: rusqlite::Error) -> StoreError {
    StoreError::Migration {
        version,
        message: format!("{stage}: {err}"),
    }
}
