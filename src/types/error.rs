use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Client facing error kinds. Nothing in here should ever carry
/// internal error details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Error {
  Internal,
  NotFound,
  InvalidFormBody { reason: String },
  AuthorizationRequired,
  InvalidToken,
  InvalidCredentials,
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Error::Internal => f.write_str("Failed to perform request"),
      Error::NotFound => f.write_str("Member not found"),
      Error::InvalidFormBody { .. } => f.write_str("Invalid request body"),
      Error::AuthorizationRequired => f.write_str("Authorization header required"),
      Error::InvalidToken => f.write_str("Invalid token"),
      Error::InvalidCredentials => f.write_str("Invalid credentials"),
    }
  }
}
