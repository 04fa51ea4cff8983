use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Logging {
  /// **Environment variables**:
  /// - `MEMBERSHIP_LOGGING_STYLE`
  #[serde(default)]
  pub style: LoggingStyle,
  /// Filter directives in `EnvFilter` syntax. `RUST_LOG` is used
  /// instead if this is empty.
  ///
  /// **Environment variables**:
  /// - `MEMBERSHIP_LOGGING_TARGETS`
  #[serde(default)]
  pub targets: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggingStyle {
  #[default]
  Pretty,
  Compact,
  Json,
}
