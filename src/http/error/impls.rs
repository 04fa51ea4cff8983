use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};
use error_stack::Report;
use serde::Serialize;

use super::Error;
use crate::{crypto::password, database, types::Error as ErrorType};

#[derive(Serialize)]
struct ErrorBody<'a> {
  #[serde(flatten)]
  kind: &'a ErrorType,
  message: String,
}

impl actix_web::ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self.error_type {
      ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      ErrorType::NotFound => StatusCode::NOT_FOUND,
      ErrorType::InvalidFormBody { .. } => StatusCode::BAD_REQUEST,
      ErrorType::AuthorizationRequired | ErrorType::InvalidToken | ErrorType::InvalidCredentials => {
        StatusCode::UNAUTHORIZED
      }
    }
  }

  fn error_response(&self) -> HttpResponse<BoxBody> {
    if matches!(self.error_type, ErrorType::Internal) {
      tracing::error!(report = ?self.report, "request failed with an internal error");
    } else {
      tracing::debug!(report = ?self.report, "request rejected");
    }

    HttpResponse::build(self.status_code()).json(ErrorBody {
      kind: &self.error_type,
      message: self.error_type.to_string(),
    })
  }
}

impl From<Report<database::Error>> for Error {
  fn from(value: Report<database::Error>) -> Self {
    Error::from_report(ErrorType::Internal, value)
  }
}

impl From<Report<password::HashPasswordError>> for Error {
  fn from(value: Report<password::HashPasswordError>) -> Self {
    Error::from_report(ErrorType::Internal, value)
  }
}

impl From<Report<password::VerifyPasswordError>> for Error {
  fn from(value: Report<password::VerifyPasswordError>) -> Self {
    Error::from_report(ErrorType::Internal, value)
  }
}

impl From<Report<crate::auth::IssueTokenError>> for Error {
  fn from(value: Report<crate::auth::IssueTokenError>) -> Self {
    Error::from_report(ErrorType::Internal, value)
  }
}

impl From<tokio::task::JoinError> for Error {
  fn from(value: tokio::task::JoinError) -> Self {
    Error::from_context(ErrorType::Internal, value)
  }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{body::MessageBody, ResponseError};

  #[derive(Debug, thiserror::Error)]
  #[error("connection refused by 10.0.0.3:3306")]
  struct Leaky;

  #[test]
  fn test_internal_details_stay_hidden() {
    let error = Error::from_context(ErrorType::Internal, Leaky);
    let response = error.error_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.into_body().try_into_bytes().unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["type"], "internal");
    assert_eq!(body["message"], "Failed to perform request");
    assert!(!body.to_string().contains("10.0.0.3"));
  }

  #[test]
  fn test_status_codes() {
    let cases = [
      (ErrorType::NotFound, StatusCode::NOT_FOUND),
      (ErrorType::InvalidFormBody { reason: String::new() }, StatusCode::BAD_REQUEST),
      (ErrorType::AuthorizationRequired, StatusCode::UNAUTHORIZED),
      (ErrorType::InvalidToken, StatusCode::UNAUTHORIZED),
      (ErrorType::InvalidCredentials, StatusCode::UNAUTHORIZED),
    ];

    for (kind, status) in cases {
      assert_eq!(Error::from_context(kind, Leaky).status_code(), status);
    }
  }
}
