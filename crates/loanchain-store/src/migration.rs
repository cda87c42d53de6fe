//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, chrono::Utc::now().timestamp_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Applicants and institutions. The password verifier lives elsewhere.
        CREATE TABLE principals (
            id TEXT PRIMARY KEY,
            role TEXT NOT NULL CHECK (role IN ('applicant', 'institution')),
            display_name TEXT,
            salt BLOB NOT NULL CHECK (length(salt) = 16),
            created_at INTEGER NOT NULL
        );

        -- Agents that may be attached to a loan at creation
        CREATE TABLE intermediaries (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        -- One envelope per loan: the data key wrapped for each party
        CREATE TABLE key_envelopes (
            loan_id TEXT PRIMARY KEY,
            wrapped_applicant BLOB NOT NULL,
            nonce_applicant BLOB NOT NULL,       -- 12 bytes
            wrapped_institution BLOB NOT NULL,
            nonce_institution BLOB NOT NULL,     -- 12 bytes
            created_at INTEGER NOT NULL
        );

        -- Append-only status records
        CREATE TABLE loan_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            loan_id TEXT NOT NULL REFERENCES key_envelopes(loan_id),
            seq INTEGER NOT NULL,                -- 1 for genesis
            status TEXT NOT NULL,
            previous_hash TEXT NOT NULL,         -- 64 hex chars
            hash TEXT NOT NULL,                  -- 64 hex chars
            ciphertext TEXT NOT NULL,            -- base64, identical across a loan
            nonce BLOB NOT NULL,                 -- 12 bytes, identical across a loan
            timestamp TEXT NOT NULL,             -- hash input, replayed verbatim
            applicant_id TEXT NOT NULL,
            institution_id TEXT NOT NULL,
            institution_name TEXT,
            intermediary_id TEXT,

            UNIQUE(loan_id, seq)
        );

        CREATE INDEX idx_records_applicant ON loan_records(applicant_id);
        CREATE INDEX idx_records_institution ON loan_records(institution_id);
        "#,
    )?;

    Ok(())
}
