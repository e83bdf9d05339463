//! SQLite persistence: pool setup, migrations, row models and one module of
//! queries per entity.
//!
//! Every query function is generic over [`sqlx::SqliteExecutor`], so the same
//! code runs against the shared pool or against the dedicated connection of
//! an open transaction.

pub mod accounts;
pub mod blogs;
pub mod catalog;
pub mod error;
pub mod favorites;
pub mod orders;
pub mod posts;

use std::str::FromStr;

use {
    sqlx::{
        SqlitePool,
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    },
    tracing::{debug, info},
};

pub use error::{Error, Result};

/// Run the bundled migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Handle to the shared connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        info!(url, max_connections, "connected to database");
        Ok(Self { pool })
    }

    /// Private in-memory database with migrations applied.
    ///
    /// Limited to one connection that never expires: every connection to
    /// `:memory:` opens a separate, empty database.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        run_migrations(&self.pool).await?;
        debug!("migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Placeholder list `?, ?, ?` for an `IN (...)` clause with `n` binds.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
