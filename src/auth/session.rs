use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use thiserror::Error;

use super::MemberClaims;
use crate::{http::Error, types};

/// The member identified by the authorization gate.
///
/// Only available on routes behind an enabled gate. Use
/// `Option<MemberSession>` for routes that can be deployed either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSession {
  pub member_id: String,
  /// UNIX timestamp of when the token stops being valid.
  pub expires_at: i64,
}

impl From<MemberClaims> for MemberSession {
  fn from(claims: MemberClaims) -> Self {
    Self {
      member_id: claims.sub,
      expires_at: claims.exp,
    }
  }
}

impl MemberSession {
  /// Who is behind a request, for logging. Routes without an enabled
  /// gate have no session and show up as `anonymous`.
  #[must_use]
  pub fn actor(session: Option<&Self>) -> &str {
    session.map_or("anonymous", |s| s.member_id.as_str())
  }
}

#[derive(Debug, Error)]
#[error("Attempt to access a member-only route without a session")]
struct NoSession;

impl FromRequest for MemberSession {
  type Error = Error;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let session = req.extensions().get::<MemberSession>().cloned();
    ready(session.ok_or_else(|| Error::from_context(types::Error::AuthorizationRequired, NoSession)))
  }
}
