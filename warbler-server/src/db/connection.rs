use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use uuid::Uuid;

use super::schema::{DROP_ALL, SCHEMA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// `path` is a file path, or ":memory:" for a private in-memory database
    /// shared by every connection of this pool.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let trimmed_path = path_str.trim();

        let (manager, in_memory) = if trimmed_path.eq_ignore_ascii_case(MEMORY_DB_PATH) {
            (Self::shared_memory_manager(), true)
        } else {
            (SqliteConnectionManager::file(path.as_ref()), false)
        };

        let manager = manager.with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });

        let mut builder = Pool::builder();
        if in_memory {
            // The database lives only as long as one connection stays open
            builder = builder.max_lifetime(None).idle_timeout(None).min_idle(Some(1));
        }

        let pool = builder
            .build(manager)
            .context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    /// Connections to a plain ":memory:" path would each see their own empty
    /// database, so every pool gets a uniquely named shared-cache one instead.
    fn shared_memory_manager() -> SqliteConnectionManager {
        let uri = format!("file:warbler-{}?mode=memory&cache=shared", Uuid::new_v4().simple());
        SqliteConnectionManager::file(uri)
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Create all tables that do not exist yet
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Drop every table and recreate the schema from scratch
    pub fn reset(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(DROP_ALL)
            .context("Failed to drop database tables")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to recreate database schema")?;
        tracing::info!("Database reset");
        Ok(())
    }

    /// Row count of a single table
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let conn = self.connection()?;
        // Table names cannot be bound as parameters; only known names are accepted
        if !super::schema::TABLES.contains(&table) {
            anyhow::bail!("Unknown table '{}'", table);
        }
        let count = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .with_context(|| format!("Failed to count rows in {}", table))?;
        Ok(count)
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
