use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::{auth::TokenAuthority, config, database};

/// Shared state of every request handler. Cloning it is cheap.
#[derive(Debug, Clone)]
pub struct App {
  pub config: Arc<config::Server>,
  pub db: database::Pool,
  pub tokens: Arc<TokenAuthority>,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
  #[tracing::instrument(skip_all)]
  pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
    let db = database::Pool::new(&cfg.db)
      .await
      .change_context(AppError)
      .attach_printable("could not connect to the member store")?;

    Ok(Self::with_pool(cfg, db))
  }

  #[must_use]
  pub fn with_pool(cfg: config::Server, db: database::Pool) -> Self {
    if cfg.auth.uses_default_secret() {
      tracing::warn!(
        "No JWT secret is configured, falling back to an insecure default. \
         Set `JWT_SECRET_KEY` before running this in production!"
      );
    }

    let tokens = Arc::new(TokenAuthority::new(cfg.auth.jwt_secret()));
    Self {
      config: Arc::new(cfg),
      db,
      tokens,
    }
  }
}
