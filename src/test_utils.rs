use sqlx::sqlite::SqlitePoolOptions;

use crate::{
  config::{self, MemberRoutes},
  database,
  schema::Member,
  types::Timestamp,
  util::Sensitive,
  App,
};

pub const JWT_SECRET: &str = "members only, no exceptions";

/// Connects to a fresh in-memory database with the member table.
///
/// There is only one connection and it is never recycled since every
/// new SQLite memory connection gets its own empty database.
pub async fn memory_pool() -> database::Pool {
  let pool = SqlitePoolOptions::new()
    .max_connections(1)
    .min_connections(1)
    .idle_timeout(None)
    .max_lifetime(None)
    .connect("sqlite::memory:")
    .await
    .unwrap_or_else(|e| panic!("could not open in-memory database: {e}"));

  let pool = database::Pool::from_sqlx(pool);
  pool.ensure_schema()
    .await
    .unwrap_or_else(|e| panic!("could not create member table: {e:?}"));

  pool
}

pub fn config(member_routes: MemberRoutes) -> config::Server {
  config::Server {
    name: "membership-test".into(),
    ip: [127, 0, 0, 1].into(),
    port: 0,
    workers: None,
    member_routes,
    db: config::Database::default(),
    auth: config::Auth {
      jwt_secret: Some(Sensitive::new(JWT_SECRET.into())),
    },
    logging: config::Logging::default(),
  }
}

pub async fn app(member_routes: MemberRoutes) -> App {
  App::with_pool(config(member_routes), memory_pool().await)
}

pub fn member(id: &str, email: &str, name: &str, password: &str) -> Member {
  Member {
    id: id.into(),
    email: email.into(),
    name: name.into(),
    password: password.into(),
    role: "member".into(),
    created_at: Timestamp::parse("2024-03-09 14:05:59")
      .unwrap_or_else(|e| panic!("invalid test timestamp: {e}")),
  }
}
