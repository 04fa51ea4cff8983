use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use error_stack::{Result, ResultExt};
use once_cell::sync::Lazy;
use rand_core::OsRng;
use thiserror::Error;

static CONTEXT: Lazy<Argon2<'static>> = Lazy::new(|| {
  Argon2::new(
    argon2::Algorithm::Argon2id,
    argon2::Version::V0x13,
    argon2::Params::DEFAULT,
  )
});

#[derive(Debug, Error)]
#[error("Failed to generate password hash")]
pub struct HashPasswordError;

/// Hashes the password in PHC string form with a random salt.
pub fn hash(password: impl AsRef<[u8]>) -> Result<String, HashPasswordError> {
  let salt = SaltString::generate(&mut OsRng);
  let password_hash = CONTEXT
    .hash_password(password.as_ref(), &salt)
    .map_err(|e| error_stack::Report::new(HashPasswordError).attach_printable(e.to_string()))?;

  Ok(password_hash.to_string())
}

#[derive(Debug, Error)]
#[error("Failed to verify password")]
pub struct VerifyPasswordError;

/// Returns `Ok(false)` if the password does not match. An error is
/// only returned if the stored hash cannot be used.
pub fn verify(hash: &str, password: impl AsRef<[u8]>) -> Result<bool, VerifyPasswordError> {
  let hash = PasswordHash::new(hash)
    .map_err(|e| error_stack::Report::new(VerifyPasswordError).attach_printable(e.to_string()))
    .attach_printable("could not parse password hash")?;

  match CONTEXT.verify_password(password.as_ref(), &hash) {
    Ok(..) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(error) => {
      Err(error_stack::Report::new(VerifyPasswordError).attach_printable(error.to_string()))
    }
  }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_hash_and_verify() {
    let hash = super::hash("correct horse battery staple").unwrap();
    assert_ne!(hash, "correct horse battery staple");
    assert!(hash.starts_with("$argon2id$"));

    assert!(verify(&hash, "correct horse battery staple").unwrap());
    assert!(!verify(&hash, "correct horse battery stapler").unwrap());
  }

  #[test]
  fn test_hash_is_salted() {
    let first = super::hash("password").unwrap();
    let second = super::hash("password").unwrap();
    assert_ne!(first, second);
    assert!(verify(&first, "password").unwrap());
    assert!(verify(&second, "password").unwrap());
  }

  #[test]
  fn test_malformed_hash() {
    assert!(verify("plaintext-not-a-hash", "plaintext-not-a-hash").is_err());
    assert!(verify("", "").is_err());
  }
}
