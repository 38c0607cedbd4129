//! Database module for persistent storage.
//!
//! Provides async SQLite access using SQLx for the activity request table.
//! Handlers never share a transaction: each one opens a [`Session`], does its
//! work through [`Session::requests`], and commits or drops it.

mod requests;

pub use requests::{ActivityRequest, NewActivityRequest, RequestRepository, RequestStatus};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// Database handle with connection pool.
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout - prevents connection storms from blocking indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Open the database at `path` and create the schema if it is missing.
    ///
    /// `":memory:"` opens a private in-memory database, which is what the
    /// tests use.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            // Each call gets its own shared-cache name so parallel tests never
            // see each other's rows.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:activity-registry-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        // WAL lets readers proceed while a writer holds the lock.
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&pool)
            .await?;

        let db = Self { pool };
        db.init_db().await?;
        Ok(db)
    }

    /// Create the schema if it does not exist yet. Safe to call repeatedly.
    pub async fn init_db(&self) -> Result<(), DbError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS activity_requests (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                full_name    TEXT    NOT NULL,
                group_name   TEXT    NOT NULL DEFAULT '',
                supervisor   TEXT    NOT NULL DEFAULT '',
                activity     TEXT    NOT NULL,
                file_name    TEXT    NOT NULL DEFAULT '',
                file_content TEXT    NOT NULL,
                file_type    TEXT    NOT NULL,
                status       TEXT    NOT NULL DEFAULT 'pending'
                             CHECK (status IN ('pending', 'approved', 'rejected')),
                created_at   INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_activity_requests_status_created
            ON activity_requests (status, created_at DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database schema checked/created");
        Ok(())
    }

    /// Get reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a new session.
    ///
    /// The caller decides whether to [`Session::commit`] or
    /// [`Session::rollback`]. A session dropped without either is rolled back
    /// and its connection goes back to the pool.
    pub async fn session(&self) -> Result<Session, DbError> {
        let tx = self.pool.begin().await?;
        Ok(Session { tx })
    }

    /// Begin a session that holds the write lock from its first statement.
    ///
    /// Every session that writes goes through here. Under WAL a deferred
    /// read-then-write transaction fails with `SQLITE_BUSY` instead of
    /// waiting for a concurrent writer.
    pub async fn write_session(&self) -> Result<Session, DbError> {
        let tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        Ok(Session { tx })
    }
}

/// A unit of work bound to one pooled connection.
pub struct Session {
    tx: Transaction<'static, Sqlite>,
}

impl Session {
    /// Get request repository for this session.
    pub fn requests(&mut self) -> RequestRepository<'_> {
        RequestRepository::new(&mut *self.tx)
    }

    /// Commit everything done in this session.
    pub async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discard everything done in this session.
    pub async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
