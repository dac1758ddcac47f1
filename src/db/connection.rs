//! Database connection management
//!
//! Connections are handed out by an r2d2 pool. Each request checks one out,
//! and it goes back to the pool when the guard drops.

use std::path::Path;

use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use super::schema::{SCHEMA, STATS_ROW_ID};

pub type Connection = PooledConnection<SqliteConnectionManager>;

pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    path: String,
}

impl Database {
    /// Open (or create) the database file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder()
            .max_size(8)
            .build(manager)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        let db = Self {
            pool,
            path: path.to_string_lossy().to_string(),
        };
        db.initialize()?;

        info!("Database initialized at {:?}", path);
        Ok(db)
    }

    /// In-memory database backed by a single pooled connection
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        // More than one connection would mean more than one database.
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)
            .context("Failed to open in-memory database")?;

        let db = Self {
            pool,
            path: ":memory:".to_string(),
        };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to apply schema")?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO user_stats (id) VALUES (?1)",
            [STATS_ROW_ID],
        )?;
        if inserted > 0 {
            info!("UserStats initialized");
        }
        Ok(())
    }

    /// Check out a connection from the pool
    pub fn conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .context("Failed to get a database connection")
    }

    /// Run `f` against a pooled connection on the blocking thread pool
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .context("Failed to get a database connection")?;
            f(&mut conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Get the database path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check if database is accessible (for health checks)
    pub async fn health_check(&self) -> Result<bool> {
        self.run(|conn| {
            match conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)) {
                Ok(_) => Ok(true),
                Err(e) => {
                    tracing::warn!("Database health check failed: {}", e);
                    Ok(false)
                }
            }
        })
        .await
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            path: self.path.clone(),
        }
    }
}
