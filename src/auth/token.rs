use chrono::{DateTime, TimeDelta, Utc};
use error_stack::{Report, Result, ResultExt};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims of a session token minted on login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemberClaims {
  /// ID of the member who logged in.
  #[serde(default)]
  pub sub: String,
  #[serde(default)]
  pub iat: i64,
  #[serde(default)]
  pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
  #[error("no token was given")]
  MissingToken,
  #[error("token is malformed")]
  Malformed,
  #[error("token signature does not match")]
  BadSignature,
  #[error("token is signed with an unexpected algorithm")]
  WrongAlgorithm,
  #[error("token has expired")]
  Expired,
  #[error("token has no subject")]
  MissingSubject,
}

#[derive(Debug, Error)]
#[error("Failed to issue session token")]
pub struct IssueTokenError;

/// Mints and checks session tokens with one shared secret.
///
/// Tokens are signed with HS256. Only the HMAC family is accepted
/// when verifying, so a token claiming any other algorithm (or none
/// at all) never gets its signature checked against the secret.
pub struct TokenAuthority {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  validation: Validation,
}

impl TokenAuthority {
  const ALGORITHM: Algorithm = Algorithm::HS256;
  const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

  #[must_use]
  pub fn new(secret: &str) -> Self {
    let mut validation = Validation::new(Self::ALGORITHM);
    validation.algorithms = Self::ACCEPTED_ALGORITHMS.to_vec();
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      validation,
    }
  }

  /// How long a session token stays valid after it is issued.
  #[must_use]
  pub fn lifetime() -> TimeDelta {
    TimeDelta::hours(1)
  }

  #[tracing::instrument(skip_all, name = "auth.issue")]
  pub fn issue(&self, member_id: &str) -> Result<String, IssueTokenError> {
    self.issue_at(member_id, Utc::now())
  }

  pub(crate) fn issue_at(
    &self,
    member_id: &str,
    issued_at: DateTime<Utc>,
  ) -> Result<String, IssueTokenError> {
    let claims = MemberClaims {
      sub: member_id.to_string(),
      iat: issued_at.timestamp(),
      exp: (issued_at + Self::lifetime()).timestamp(),
    };

    jsonwebtoken::encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding_key)
      .change_context(IssueTokenError)
      .attach_printable("could not encode member claims")
  }

  #[tracing::instrument(skip_all, name = "auth.verify")]
  pub fn verify(&self, token: &str) -> Result<MemberClaims, AuthError> {
    let token = token.trim();
    if token.is_empty() {
      return Err(Report::new(AuthError::MissingToken));
    }

    let claims = match jsonwebtoken::decode::<MemberClaims>(token, &self.decoding_key, &self.validation) {
      Ok(data) => data.claims,
      Err(error) => {
        let context = match error.kind() {
          ErrorKind::InvalidSignature => AuthError::BadSignature,
          ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName | ErrorKind::InvalidKeyFormat => {
            AuthError::WrongAlgorithm
          }
          ErrorKind::ExpiredSignature => AuthError::Expired,
          ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => AuthError::MissingSubject,
          _ => AuthError::Malformed,
        };
        return Err(Report::new(error).change_context(context));
      }
    };

    if claims.sub.is_empty() {
      return Err(Report::new(AuthError::MissingSubject));
    }

    Ok(claims)
  }
}

impl std::fmt::Debug for TokenAuthority {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenAuthority")
      .field("algorithms", &self.validation.algorithms)
      .finish_non_exhaustive()
  }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
  use super::*;
  use base64::engine::general_purpose::URL_SAFE_NO_PAD;
  use base64::Engine;
  use serde_json::json;

  const SECRET: &str = "a shared secret for tests";

  fn forge(header: &serde_json::Value, claims: &serde_json::Value, signature: &[u8]) -> String {
    format!(
      "{}.{}.{}",
      URL_SAFE_NO_PAD.encode(header.to_string()),
      URL_SAFE_NO_PAD.encode(claims.to_string()),
      URL_SAFE_NO_PAD.encode(signature),
    )
  }

  #[test]
  fn test_issue_then_verify() {
    let authority = TokenAuthority::new(SECRET);
    let token = authority.issue("member-1").unwrap();
    assert!(!token.is_empty());

    let claims = authority.verify(&token).unwrap();
    assert_eq!(claims.sub, "member-1");
    assert_eq!(claims.exp - claims.iat, 3600);
  }

  #[test]
  fn test_expiry_window() {
    let authority = TokenAuthority::new(SECRET);

    let issued = Utc::now() - TimeDelta::minutes(59);
    let token = authority.issue_at("member-1", issued).unwrap();
    assert_eq!(authority.verify(&token).unwrap().sub, "member-1");

    let issued = Utc::now() - TimeDelta::minutes(61);
    let token = authority.issue_at("member-1", issued).unwrap();
    let error = authority.verify(&token).unwrap_err();
    assert_eq!(error.current_context(), &AuthError::Expired);
  }

  #[test]
  fn test_missing_token() {
    let authority = TokenAuthority::new(SECRET);
    let error = authority.verify("  ").unwrap_err();
    assert_eq!(error.current_context(), &AuthError::MissingToken);
  }

  #[test]
  fn test_malformed_token() {
    let authority = TokenAuthority::new(SECRET);
    let error = authority.verify("definitely.not.a-jwt").unwrap_err();
    assert_eq!(error.current_context(), &AuthError::Malformed);

    let error = authority.verify("garbage").unwrap_err();
    assert_eq!(error.current_context(), &AuthError::Malformed);
  }

  #[test]
  fn test_bad_signature() {
    let token = TokenAuthority::new("some other secret").issue("member-1").unwrap();
    let error = TokenAuthority::new(SECRET).verify(&token).unwrap_err();
    assert_eq!(error.current_context(), &AuthError::BadSignature);
  }

  #[test]
  fn test_rejects_other_algorithms() {
    let authority = TokenAuthority::new(SECRET);
    let exp = (Utc::now() + TimeDelta::minutes(30)).timestamp();
    let claims = json!({ "sub": "member-1", "exp": exp });

    let rsa = forge(&json!({ "alg": "RS256", "typ": "JWT" }), &claims, b"not really rsa");
    let error = authority.verify(&rsa).unwrap_err();
    assert_eq!(error.current_context(), &AuthError::WrongAlgorithm);

    let ecdsa = forge(&json!({ "alg": "ES256", "typ": "JWT" }), &claims, b"nope");
    let error = authority.verify(&ecdsa).unwrap_err();
    assert_eq!(error.current_context(), &AuthError::WrongAlgorithm);

    let unsigned = forge(&json!({ "alg": "none", "typ": "JWT" }), &claims, b"");
    assert!(authority.verify(&unsigned).is_err());
  }

  #[test]
  fn test_missing_subject() {
    let authority = TokenAuthority::new(SECRET);
    let exp = (Utc::now() + TimeDelta::minutes(30)).timestamp();
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(SECRET.as_bytes());

    let token = jsonwebtoken::encode(&header, &json!({ "exp": exp }), &key).unwrap();
    let error = authority.verify(&token).unwrap_err();
    assert_eq!(error.current_context(), &AuthError::MissingSubject);

    let token = jsonwebtoken::encode(&header, &json!({ "sub": "", "exp": exp }), &key).unwrap();
    let error = authority.verify(&token).unwrap_err();
    assert_eq!(error.current_context(), &AuthError::MissingSubject);
  }

  #[test]
  fn test_accepts_hmac_family() {
    let authority = TokenAuthority::new(SECRET);
    let exp = (Utc::now() + TimeDelta::minutes(30)).timestamp();
    let key = EncodingKey::from_secret(SECRET.as_bytes());

    let token = jsonwebtoken::encode(
      &Header::new(Algorithm::HS512),
      &json!({ "sub": "member-1", "exp": exp }),
      &key,
    )
    .unwrap();
    assert_eq!(authority.verify(&token).unwrap().sub, "member-1");
  }
}
