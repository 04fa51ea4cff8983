use actix_web::{
  web::{self, Json},
  HttpResponse,
};
use thiserror::Error;

use crate::{
  crypto::password,
  http::Error,
  schema::Member,
  types::{self, form::login},
  App,
};

#[derive(Debug, Error)]
#[error("Member gave invalid credentials")]
struct InvalidCredentials;

fn invalid_credentials() -> Error {
  Error::from_context(types::Error::InvalidCredentials, InvalidCredentials)
}

#[tracing::instrument(skip_all, name = "login")]
pub async fn login(app: web::Data<App>, form: Json<login::Request>) -> Result<HttpResponse, Error> {
  let form = form.into_inner();

  let mut conn = app.db.get().await?;
  let member = Member::by_email(&mut conn, form.email.as_str()).await?;
  drop(conn);

  let Some(member) = member else {
    return Err(invalid_credentials().attach_printable("no member has this email"));
  };

  let hash = member.password.into_inner();
  let matched =
    tokio::task::spawn_blocking(move || password::verify(&hash, form.password.as_str())).await??;

  if !matched {
    return Err(invalid_credentials().attach_printable("password does not match"));
  }

  let token = app.tokens.issue(&member.id)?;
  tracing::info!(member.id = %member.id, "member logged in");

  Ok(HttpResponse::Ok().json(login::Response {
    token: token.into(),
  }))
}
