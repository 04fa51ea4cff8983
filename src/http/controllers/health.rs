use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::App;

#[tracing::instrument(skip_all)]
pub async fn health(app: web::Data<App>) -> HttpResponse {
  match app.db.ping().await {
    Ok(()) => HttpResponse::Ok().json(json!({ "status": "healthy" })),
    Err(report) => {
      tracing::warn!(?report, "Database ping failed");
      HttpResponse::InternalServerError().json(json!({ "status": "unhealthy" }))
    }
  }
}
