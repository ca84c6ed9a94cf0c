#![forbid(unsafe_code)]

mod attachments;
mod clients;
mod error;
mod forms;
mod requests;
mod support;

pub use error::{ErrorKind, StoreError};
pub use requests::*;

use ob_core::StepSchema;
use ob_core::ids::ClientId;
use rusqlite::{
    Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior, params,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use support::*;

const DB_FILE_NAME: &str = "onboard.db";

/// SQLite-backed persistence for clients, their forms and attachment
/// metadata. Every mutating call runs in its own transaction.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
    schema: StepSchema,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>, schema: StepSchema) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let conn = Connection::open(storage_dir.join(DB_FILE_NAME))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        preflight_gate(&conn)?;
        migrate_sqlite_schema(&conn)?;

        Ok(Self {
            conn,
            storage_dir,
            schema,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join(DB_FILE_NAME)
    }

    pub fn schema(&self) -> &StepSchema {
        &self.schema
    }

    pub fn schema_version(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key='schema_version'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?)
    }
}

/// Write transactions take the write lock up front, so a second handle waits
/// on the busy timeout instead of failing mid-transaction.
fn write_tx(conn: &mut Connection) -> Result<Transaction<'_>, StoreError> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

/// Refuses to adopt a database that was not created by this store.
fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() {
        return Ok(());
    }

    if tables
        .iter()
        .any(|table| !REQUIRED_TABLES.contains(&table.as_str()))
    {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: unsupported tables detected",
        ));
    }

    for table in REQUIRED_TABLES {
        if !tables.contains(table) {
            return Err(StoreError::InvalidInput(
                "RESET_REQUIRED: required table is missing",
            ));
        }
    }

    let version = conn
        .query_row(
            "SELECT value FROM meta WHERE key='schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    match version.as_deref() {
        Some(SCHEMA_VERSION) | None => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: unsupported schema version",
        )),
    }
}

fn client_exists(conn: &Connection, client_id: ClientId) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM clients WHERE id=?1",
            params![client_id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

fn ensure_client_exists(conn: &Connection, client_id: ClientId) -> Result<(), StoreError> {
    if client_exists(conn, client_id)? {
        Ok(())
    } else {
        Err(StoreError::UnknownClient(client_id))
    }
}

/// Turns a uniqueness failure into the domain error produced by `conflict`.
fn map_insert_conflict(err: rusqlite::Error, conflict: impl FnOnce() -> StoreError) -> StoreError {
    if is_constraint_violation(&err) {
        return conflict();
    }
    StoreError::Sql(err)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

fn to_sqlite_i64(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
}

fn now_ms() -> i64 {
    ob_core::clock::now_ms()
}
