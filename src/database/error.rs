use error_stack::Report;
use thiserror::Error;

/// Database related errors
#[derive(Debug, Error)]
pub enum Error {
  /// An error caused by an invalid SQLite connection url.
  #[error("invalid connection url")]
  InvalidUrl,
  /// An error caused by an [`sqlx`] error.
  #[error("received a pool error: {0}")]
  Internal(sqlx::Error),
  /// The database pool does not have a reliable connection
  /// to transact to the database (or it is already closed).
  #[error("unhealthy database pool")]
  UnhealthyPool,
  /// A stored `created_at` value is not in `YYYY-MM-DD HH:MM:SS` form.
  #[error("stored timestamp is malformed")]
  MalformedTimestamp,
  /// The member's password could not be hashed before writing.
  #[error("could not hash member password")]
  HashPassword,
}

/// Converts from a generic [sqlx] result into a [database compatible error](Error).
pub trait ErrorExt<T> {
  fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
  fn into_db_error(self) -> Result<T> {
    self.map_err(|e| match e {
      sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
        Report::new(Error::Internal(e)).change_context(Error::UnhealthyPool)
      }
      e => Report::new(Error::Internal(e)),
    })
  }
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a database error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

/// This trait deals with `error_stack::Report<Error>` because it is
/// annoying to match against the context of a report every time:
///
/// ```rust,ignore
/// let result = pool.get().await;
/// if let Err(e) = result {
///   let is_unhealthy = e.downcast_ref::<membership::database::Error>()
///     .map(|v| matches!(v, membership::database::Error::UnhealthyPool))
///     .unwrap_or_default();
///   ...
/// }
/// ```
pub trait ErrorExt2 {
  fn is_unhealthy(&self) -> bool;
  fn is_malformed_timestamp(&self) -> bool;
}

impl ErrorExt2 for error_stack::Report<Error> {
  fn is_unhealthy(&self) -> bool {
    self
      .frames()
      .filter_map(|frame| frame.downcast_ref::<Error>())
      .any(|v| matches!(v, Error::UnhealthyPool))
  }

  fn is_malformed_timestamp(&self) -> bool {
    self
      .frames()
      .filter_map(|frame| frame.downcast_ref::<Error>())
      .any(|v| matches!(v, Error::MalformedTimestamp))
  }
}
