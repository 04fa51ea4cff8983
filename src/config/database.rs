use serde::Deserialize;
use std::num::{NonZeroU32, NonZeroU64};

use crate::util::Sensitive;

/// Configuration for connecting to the member store.
#[derive(Debug, Deserialize)]
pub struct Database {
  /// Connection URL of the SQLite database.
  ///
  /// **Environment variables**:
  /// - `MEMBERSHIP_DB_URL` or `DATABASE_URL`
  #[serde(default = "Database::default_url")]
  pub url: Sensitive<String>,
  /// Maximum amount of connections that can be opened at the
  /// same time.
  ///
  /// **Environment variables**:
  /// - `MEMBERSHIP_DB_POOL_SIZE`
  #[serde(default = "Database::default_pool_size")]
  pub pool_size: NonZeroU32,
  /// Connections kept warm even when there are no requests.
  ///
  /// **Environment variables**:
  /// - `MEMBERSHIP_DB_MIN_IDLE`
  #[serde(default = "Database::default_min_idle")]
  pub min_idle: u32,
  /// How long a connection may live before it gets recycled.
  ///
  /// **Environment variables**:
  /// - `MEMBERSHIP_DB_MAX_LIFETIME_SECS`
  #[serde(default = "Database::default_max_lifetime_secs")]
  pub max_lifetime_secs: NonZeroU64,
  /// How long this server can wait to obtain a connection
  /// from the pool.
  ///
  /// **Environment variables**:
  /// - `MEMBERSHIP_DB_TIMEOUT_SECS`
  #[serde(default = "Database::default_timeout_secs")]
  pub timeout_secs: NonZeroU64,
}

impl Default for Database {
  fn default() -> Self {
    Self {
      url: Self::default_url(),
      pool_size: Self::default_pool_size(),
      min_idle: Self::default_min_idle(),
      max_lifetime_secs: Self::default_max_lifetime_secs(),
      timeout_secs: Self::default_timeout_secs(),
    }
  }
}

impl Database {
  const DEFAULT_URL: &'static str = "sqlite://membership.db";
  const DEFAULT_POOL_SIZE: u32 = 100;
  const DEFAULT_MIN_IDLE: u32 = 10;
  const DEFAULT_MAX_LIFETIME_SECS: u64 = 60 * 60;
  const DEFAULT_TIMEOUT_SECS: u64 = 5;

  // Required by serde
  fn default_url() -> Sensitive<String> {
    Sensitive::new(Self::DEFAULT_URL.to_string())
  }

  const fn default_pool_size() -> NonZeroU32 {
    match NonZeroU32::new(Self::DEFAULT_POOL_SIZE) {
      Some(n) => n,
      None => panic!("DEFAULT_POOL_SIZE is accidentally set to 0"),
    }
  }

  const fn default_min_idle() -> u32 {
    Self::DEFAULT_MIN_IDLE
  }

  const fn default_max_lifetime_secs() -> NonZeroU64 {
    match NonZeroU64::new(Self::DEFAULT_MAX_LIFETIME_SECS) {
      Some(n) => n,
      None => panic!("DEFAULT_MAX_LIFETIME_SECS is accidentally set to 0"),
    }
  }

  const fn default_timeout_secs() -> NonZeroU64 {
    match NonZeroU64::new(Self::DEFAULT_TIMEOUT_SECS) {
      Some(n) => n,
      None => panic!("DEFAULT_TIMEOUT_SECS is accidentally set to 0"),
    }
  }
}
