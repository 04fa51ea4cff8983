use actix_web::{web, HttpServer};
use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing_actix_web::TracingLogger;

use crate::http::{controllers, util::QuieterRootSpanBuilder};
use crate::{config, App};

#[derive(Debug, Error)]
#[error("Failed to start the HTTP server")]
pub struct StartServerError;

/// Serves the health, login and member routes until the
/// server gets a shutdown signal.
pub async fn run(config: config::Server) -> Result<(), StartServerError> {
  let app = App::new(config)
    .await
    .change_context(StartServerError)?;

  let member_routes = app.config.member_routes;
  let addr = (app.config.ip, app.config.port);
  let workers = app.config.workers;

  let factory = {
    let app = app.clone();
    move || {
      actix_web::App::new()
        .app_data(web::Data::new(app.clone()))
        .wrap(TracingLogger::<QuieterRootSpanBuilder>::new())
        .configure(|cfg| controllers::configure(cfg, member_routes))
    }
  };

  let mut server = HttpServer::new(factory);
  if let Some(workers) = workers {
    server = server.workers(workers.get());
  }

  let server = server
    .bind(addr)
    .change_context(StartServerError)
    .attach_printable_lazy(|| format!("could not bind server to {}:{}", addr.0, addr.1))?;

  tracing::info!(
    "{} is listening at http://{}:{}",
    app.config.name,
    addr.0,
    addr.1
  );

  let result = server.run().await;
  app.db.close().await;

  result
    .change_context(StartServerError)
    .attach_printable("HTTP server stopped unexpectedly")
}
