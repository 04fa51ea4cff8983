use error_stack::{Report, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use super::ParseError;
use crate::util::figment::FigmentErrorAttachable;

#[derive(Debug, Deserialize)]
pub struct Server {
  /// Name of the service, shown in logs.
  #[serde(default = "Server::default_name")]
  pub name: String,
  #[serde(default = "Server::default_ip")]
  pub ip: IpAddr,
  /// **Environment variables**:
  /// - `MEMBERSHIP_PORT` or `PORT`
  #[serde(default = "Server::default_port")]
  pub port: u16,
  /// Amount of HTTP workers. Defaults to the amount of
  /// physical CPU cores.
  pub workers: Option<NonZeroUsize>,
  /// Whether member routes need a session token.
  ///
  /// **Environment variables**:
  /// - `MEMBERSHIP_MEMBER_ROUTES`
  #[serde(default)]
  pub member_routes: MemberRoutes,
  #[serde(default)]
  pub db: super::Database,
  #[serde(default)]
  pub auth: super::Auth,
  #[serde(default)]
  pub logging: super::Logging,
}

/// Deployment profile of the `/api/members` routes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRoutes {
  /// Every member route goes through the authorization gate.
  #[default]
  Protected,
  /// Member routes are reachable without a token.
  Open,
}

impl MemberRoutes {
  #[must_use]
  pub const fn is_protected(self) -> bool {
    matches!(self, Self::Protected)
  }
}

impl Server {
  pub fn load() -> Result<Self, ParseError> {
    dotenvy::dotenv().ok();

    Self::figment()
      .extract::<Self>()
      .map_err(|e| Report::new(ParseError).attach_figment_error(e))
  }
}

impl Server {
  const DEFAULT_CONFIG_FILE: &'static str = "config/config.json";
  const DEFAULT_NAME: &'static str = "membership";
  const DEFAULT_PORT: u16 = 8001;

  fn default_name() -> String {
    Self::DEFAULT_NAME.to_string()
  }

  const fn default_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
  }

  const fn default_port() -> u16 {
    Self::DEFAULT_PORT
  }

  /// Path of the JSON config file. It is optional; a missing file
  /// leaves everything to the defaults and environment variables.
  ///
  /// **Environment variables**:
  /// - `MEMBERSHIP_CONFIG_FILE`
  #[must_use]
  pub fn config_file() -> PathBuf {
    std::env::var_os("MEMBERSHIP_CONFIG_FILE")
      .map_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILE), PathBuf::from)
  }

  /// Creates a default [`Figment`] object to load server
  /// configuration. This function is there for loading and testing.
  ///
  /// [`Figment`]: figment::Figment
  pub(crate) fn figment() -> figment::Figment {
    use figment::{
      providers::{Env, Format, Json},
      Figment,
    };

    Figment::new()
      .merge(Json::file(Self::config_file()))
      // figment's env provider splits every underscore, so fields
      // that have one in their names are mapped by hand.
      .merge(
        Env::prefixed("MEMBERSHIP_")
          .ignore(&["CONFIG_FILE"])
          .map(|v| match v.as_str() {
            "MEMBER_ROUTES" => "member_routes".into(),

            "DB_POOL_SIZE" => "db.pool_size".into(),
            "DB_MIN_IDLE" => "db.min_idle".into(),
            "DB_MAX_LIFETIME_SECS" => "db.max_lifetime_secs".into(),
            "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

            "AUTH_JWT_SECRET" => "auth.jwt_secret".into(),

            _ => v.as_str().replace('_', ".").into(),
          }),
      )
      // Environment variable aliases
      .merge(Env::raw().only(&["DATABASE_URL", "PORT", "JWT_SECRET_KEY"]).map(
        |v| match v.as_str() {
          "DATABASE_URL" => "db.url".into(),
          "PORT" => "port".into(),
          "JWT_SECRET_KEY" => "auth.jwt_secret".into(),
          _ => v.into(),
        },
      ))
  }
}
