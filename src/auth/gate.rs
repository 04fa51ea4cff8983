use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{http::header, web, HttpMessage};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use thiserror::Error;

use super::{AuthError, MemberSession};
use crate::{http::Error, types, App};

/// Authorization gate for member routes.
///
/// Every request needs a valid session token in the `Authorization`
/// header. The resolved member is put into the request extensions
/// as [`MemberSession`]. A disabled gate lets everything through.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
  enabled: bool,
}

/// Creates the authorization gate.
#[must_use]
pub const fn gate(enabled: bool) -> Gate {
  Gate { enabled }
}

impl<S, B> Transform<S, ServiceRequest> for Gate
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = actix_web::Error;
  type Transform = GateMiddleware<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(GateMiddleware {
      service: Rc::new(service),
      enabled: self.enabled,
    }))
  }
}

pub struct GateMiddleware<S> {
  service: Rc<S>,
  enabled: bool,
}

impl<S, B> Service<ServiceRequest> for GateMiddleware<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = actix_web::Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    if self.enabled {
      match authenticate(&req) {
        Ok(session) => {
          req.extensions_mut().insert(session);
        }
        Err(error) => {
          let response = req.error_response(error).map_into_right_body();
          return Box::pin(ready(Ok(response)));
        }
      }
    }

    let fut = self.service.call(req);
    Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
  }
}

#[tracing::instrument(skip_all, name = "middleware.auth")]
fn authenticate(req: &ServiceRequest) -> Result<MemberSession, Error> {
  // an empty header counts as not sending one at all
  let value = req
    .headers()
    .get(header::AUTHORIZATION)
    .filter(|v| !v.as_bytes().iter().all(u8::is_ascii_whitespace));

  let Some(value) = value else {
    return Err(Error::from_context(
      types::Error::AuthorizationRequired,
      AuthError::MissingToken,
    ));
  };

  let Some(app) = req.app_data::<web::Data<App>>() else {
    #[derive(Debug, Error)]
    #[error("The web app has no available configuration")]
    struct NoConfig;
    return Err(Error::from_context(types::Error::Internal, NoConfig));
  };

  let token = value
    .to_str()
    .map_err(|e| Error::from_context(types::Error::InvalidToken, AuthError::Malformed).attach_printable(e))?;

  // The token is normally sent verbatim but some clients insist on
  // the bearer scheme.
  let token = token.strip_prefix("Bearer ").unwrap_or(token);

  let claims = app.tokens.verify(token).map_err(|report| {
    tracing::debug!(reason = %report.current_context(), "rejected session token");
    Error::from_report(types::Error::InvalidToken, report)
  })?;

  Ok(MemberSession::from(claims))
}
