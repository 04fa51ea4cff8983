use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::config::{Logging, LoggingStyle};

#[derive(Debug, Error)]
#[error("Failed to initialize tracing")]
pub struct TracingInitError;

pub fn init(config: &Logging) -> Result<(), TracingInitError> {
  let filter = make_env_filter(&config.targets);
  let registry = Registry::default().with(filter).with(ErrorLayer::default());

  let result = match config.style {
    LoggingStyle::Pretty => tracing::subscriber::set_global_default(registry.with(fmt::layer().pretty())),
    LoggingStyle::Compact => tracing::subscriber::set_global_default(registry.with(fmt::layer().compact())),
    LoggingStyle::Json => tracing::subscriber::set_global_default(registry.with(fmt::layer().json())),
  };

  result
    .change_context(TracingInitError)
    .attach_printable("already initialized tracing")
}

fn make_env_filter(targets: &str) -> EnvFilter {
  let default_level = if cfg!(debug_assertions) {
    LevelFilter::DEBUG
  } else {
    LevelFilter::INFO
  };

  let targets = if targets.is_empty() {
    std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default()
  } else {
    targets.to_string()
  };

  EnvFilter::builder()
    .with_default_directive(default_level.into())
    .parse_lossy(targets)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn explicit_targets() {
    let filter = make_env_filter("membership=trace");
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
  }

  #[test]
  fn default_level() {
    assert!(make_env_filter("").max_level_hint().is_some());
  }
}
