use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{web, HttpRequest};
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};

use super::Error;
use crate::types;

/// Same as [`DefaultRootSpanBuilder`] except health checks are only
/// traced at the `DEBUG` level since load balancers poll them a lot.
pub struct QuieterRootSpanBuilder;

impl RootSpanBuilder for QuieterRootSpanBuilder {
  fn on_request_start(request: &ServiceRequest) -> Span {
    if request.path() == "/health" {
      tracing_actix_web::root_span!(level = tracing::Level::DEBUG, request)
    } else {
      tracing_actix_web::root_span!(request)
    }
  }

  fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, actix_web::Error>) {
    DefaultRootSpanBuilder::on_request_end(span, outcome);
  }
}

#[derive(Debug, thiserror::Error)]
#[error("Received an invalid request body")]
struct InvalidBody;

#[allow(clippy::needless_pass_by_value)]
fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let reason = error.to_string();
  Error::from_context(types::Error::InvalidFormBody { reason }, InvalidBody)
    .attach_printable(error.to_string())
    .into()
}

#[allow(clippy::needless_pass_by_value)]
fn query_error_handler(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let reason = error.to_string();
  Error::from_context(types::Error::InvalidFormBody { reason }, InvalidBody).into()
}

/// Makes malformed JSON bodies and query strings come back as
/// `invalid_form_body` errors.
#[must_use]
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(json_error_handler)
}

#[must_use]
pub fn query_config() -> web::QueryConfig {
  web::QueryConfig::default().error_handler(query_error_handler)
}
