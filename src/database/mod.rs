use error_stack::{Report, ResultExt};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{str::FromStr, time::Duration};

use crate::config;

pub mod error;
pub use error::*;

pub type PoolConnection = sqlx::pool::PoolConnection<sqlx::Sqlite>;
pub type Connection = sqlx::SqliteConnection;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS members (
  id TEXT PRIMARY KEY NOT NULL,
  email TEXT NOT NULL UNIQUE,
  name TEXT NOT NULL,
  password TEXT NOT NULL,
  role TEXT NOT NULL,
  created_at TEXT NOT NULL
)";

#[derive(Clone)]
pub struct Pool {
  pool: sqlx::SqlitePool,
}

impl Pool {
  /// Builds the shared connection pool and waits until the first
  /// connection is established. Failing to connect is fatal.
  pub async fn new(cfg: &config::Database) -> Result<Self> {
    let pool_opts = SqlitePoolOptions::new()
      .acquire_timeout(Duration::from_secs(cfg.timeout_secs.get()))
      .max_connections(cfg.pool_size.get())
      .min_connections(cfg.min_idle)
      .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs.get()));

    let connect_opts = SqliteConnectOptions::from_str(cfg.url.as_str())
      .change_context(Error::InvalidUrl)?
      .create_if_missing(true);

    let pool = Self::from_sqlx(pool_opts.connect_lazy_with(connect_opts));
    pool.wait_until_healthy().await?;
    pool.ensure_schema().await?;

    Ok(pool)
  }

  #[must_use]
  pub(crate) fn from_sqlx(pool: sqlx::SqlitePool) -> Self {
    Self { pool }
  }
}

impl std::fmt::Debug for Pool {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.pool.fmt(f)
  }
}

impl Pool {
  #[inline(always)]
  pub fn connections(&self) -> u32 {
    self.pool.size()
  }

  #[inline(always)]
  pub fn is_healthy(&self) -> bool {
    !self.pool.is_closed() && self.connections() > 0
  }

  #[tracing::instrument(name = "db.connect", skip(self))]
  pub async fn get(&self) -> Result<PoolConnection> {
    if let Some(inner) = self.pool.try_acquire() {
      Ok(inner)
    } else if self.pool.is_closed() {
      Err(Error::UnhealthyPool.into())
    } else {
      self.pool.acquire().await.into_db_error()
    }
  }

  #[tracing::instrument(name = "db.ping", skip(self))]
  pub async fn ping(&self) -> Result<()> {
    let mut conn = self.get().await?;
    sqlx::query("SELECT 1")
      .execute(&mut *conn)
      .await
      .into_db_error()?;

    Ok(())
  }

  #[tracing::instrument(skip(self))]
  pub async fn wait_until_healthy(&self) -> Result<()> {
    match self.pool.acquire().await {
      Ok(..) => Ok(()),
      Err(e) if !self.is_healthy() => Err(Report::new(Error::Internal(e)))
        .change_context(Error::UnhealthyPool),
      Err(err) => Err(Report::new(Error::Internal(err))),
    }
  }

  /// Creates the `members` table if it does not exist yet.
  #[tracing::instrument(name = "db.ensure_schema", skip(self))]
  pub async fn ensure_schema(&self) -> Result<()> {
    let mut conn = self.get().await?;
    sqlx::query(SCHEMA)
      .execute(&mut *conn)
      .await
      .into_db_error()?;

    Ok(())
  }

  pub async fn close(&self) {
    self.pool.close().await;
  }
}
