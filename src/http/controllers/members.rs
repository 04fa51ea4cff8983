use actix_web::{
  web::{self, Json},
  HttpResponse,
};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::{
  auth::MemberSession,
  http::Error,
  schema::Member,
  types,
  util::validation::{is_valid_email, is_valid_member_id},
  App,
};

#[derive(Debug, Error)]
#[error("Member not found")]
struct MemberNotFound;

#[derive(Debug, Error)]
#[error("Member has invalid fields")]
struct InvalidMember;

fn invalid_member(reason: &str) -> Error {
  let reason = reason.to_string();
  Error::from_context(types::Error::InvalidFormBody { reason }, InvalidMember)
}

fn validate(member: &Member) -> Result<(), Error> {
  if !is_valid_member_id(&member.id) {
    return Err(invalid_member("invalid member id"));
  }
  if !is_valid_email(&member.email) {
    return Err(invalid_member("invalid email address"));
  }
  Ok(())
}

#[tracing::instrument(skip(app, session, form), fields(actor = MemberSession::actor(session.as_ref())))]
pub async fn create(
  app: web::Data<App>,
  session: Option<MemberSession>,
  form: Json<Member>,
) -> Result<HttpResponse, Error> {
  let member = form.into_inner();
  validate(&member)?;

  let mut conn = app.db.get().await?;
  let member = Member::insert(&mut conn, &member).await?;

  Ok(HttpResponse::Created().json(member))
}

#[tracing::instrument(skip(app, session), fields(actor = MemberSession::actor(session.as_ref())))]
pub async fn get(
  app: web::Data<App>,
  session: Option<MemberSession>,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let mut conn = app.db.get().await?;
  let Some(member) = Member::by_id(&mut conn, path.as_str()).await? else {
    return Err(Error::from_context(types::Error::NotFound, MemberNotFound));
  };

  Ok(HttpResponse::Ok().json(member))
}

#[tracing::instrument(skip(app, session, form), fields(actor = MemberSession::actor(session.as_ref())))]
pub async fn update(
  app: web::Data<App>,
  session: Option<MemberSession>,
  path: web::Path<String>,
  form: Json<Member>,
) -> Result<HttpResponse, Error> {
  let mut member = form.into_inner();
  member.id = path.into_inner();
  validate(&member)?;

  let mut conn = app.db.get().await?;
  let member = Member::update(&mut conn, &member).await?;

  Ok(HttpResponse::Ok().json(member))
}

#[tracing::instrument(skip(app, session), fields(actor = MemberSession::actor(session.as_ref())))]
pub async fn delete(
  app: web::Data<App>,
  session: Option<MemberSession>,
  path: web::Path<String>,
) -> Result<HttpResponse, Error> {
  let mut conn = app.db.get().await?;
  Member::delete(&mut conn, path.as_str()).await?;

  Ok(HttpResponse::Ok().json(json!({ "message": "Member deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
  #[serde(default)]
  pub name: String,
}

#[tracing::instrument(skip(app, session), fields(actor = MemberSession::actor(session.as_ref())))]
pub async fn search(
  app: web::Data<App>,
  session: Option<MemberSession>,
  query: web::Query<SearchQuery>,
) -> Result<HttpResponse, Error> {
  let mut conn = app.db.get().await?;
  let members = Member::search_by_name(&mut conn, &query.name).await?;

  Ok(HttpResponse::Ok().json(members))
}
