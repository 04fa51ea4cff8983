use actix_web::web;

use crate::{auth, config::MemberRoutes};

pub mod health;
pub mod login;
pub mod members;

pub fn configure(cfg: &mut web::ServiceConfig, member_routes: MemberRoutes) {
  cfg
    .app_data(super::util::json_config())
    .app_data(super::util::query_config())
    .route("/health", web::get().to(health::health))
    .route("/login", web::post().to(login::login))
    .service(
      web::scope("/api")
        .wrap(auth::gate(member_routes.is_protected()))
        .route("/members", web::post().to(members::create))
        .route("/members/search", web::get().to(members::search))
        .service(
          web::resource("/members/{id}")
            .route(web::get().to(members::get))
            .route(web::put().to(members::update))
            .route(web::delete().to(members::delete)),
        ),
    );
}
