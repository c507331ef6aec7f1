//! # tb-db-sqlite
//!
//! SQLite implementation of the tb-core record-store ports. This crate owns
//! the mapping between the relational model and the domain models, and the
//! rendering of `Predicate` trees into parameterized SQL.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tb_core::error::{AppError, Result};
use uuid::Uuid;

mod posts;
mod sql;
mod tasks;
mod views;

pub use posts::SqlitePostRepo;
pub use tasks::SqliteTaskRepo;
pub use views::SqliteViewRepo;

/// Opens (creating if missing) the database at `url` and applies the schema.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(db_err)?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .map_err(db_err)?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Applies the schema. Idempotent; safe to run on every startup.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS posts (
            id              BLOB PRIMARY KEY,
            title           TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'draft',
            author_name     TEXT NOT NULL,
            comments_number INTEGER NOT NULL DEFAULT 0,
            created_at      TIMESTAMP NOT NULL,
            updated_at      TIMESTAMP NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(db_err)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tasks (
            id         BLOB PRIMARY KEY,
            code       TEXT NOT NULL UNIQUE,
            title      TEXT,
            status     TEXT NOT NULL DEFAULT 'todo',
            label      TEXT NOT NULL DEFAULT 'bug',
            priority   TEXT NOT NULL DEFAULT 'low',
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(db_err)?;

    for table in ["post_views", "task_views"] {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id            BLOB PRIMARY KEY,
                name          TEXT NOT NULL UNIQUE,
                columns       TEXT,
                filter_params TEXT,
                created_at    TIMESTAMP NOT NULL,
                updated_at    TIMESTAMP NOT NULL
            )"
        ))
        .execute(pool)
        .await
        .map_err(db_err)?;
    }

    log::debug!("sqlite schema is up to date");
    Ok(())
}

// Helpers for UUID conversion
pub(crate) fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

pub(crate) fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

pub(crate) fn db_err(err: impl std::fmt::Display) -> AppError {
    AppError::Internal(err.to_string())
}

/// SQLite reports unique-key conflicts only through the error message.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed")
    )
}
