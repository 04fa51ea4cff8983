use serde::Deserialize;

use crate::util::Sensitive;

#[derive(Debug, Default, Deserialize)]
pub struct Auth {
  /// Secret used to sign and verify session tokens.
  ///
  /// **Environment variables**:
  /// - `MEMBERSHIP_AUTH_JWT_SECRET` or `JWT_SECRET_KEY`
  pub jwt_secret: Option<Sensitive<String>>,
}

impl Auth {
  /// Not meant for production. Used when no secret is configured.
  pub const INSECURE_DEFAULT_SECRET: &'static str = "secret";

  #[must_use]
  pub fn uses_default_secret(&self) -> bool {
    self.jwt_secret.is_none()
  }

  #[must_use]
  pub fn jwt_secret(&self) -> &str {
    self.jwt_secret
      .as_ref()
      .map_or(Self::INSECURE_DEFAULT_SECRET, Sensitive::as_str)
  }
}
