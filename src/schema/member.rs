use error_stack::{Report, ResultExt};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
  crypto::password,
  database::{error::ErrorExt, Connection, Error, Result},
  types::Timestamp,
  util::Sensitive,
};

/// A member record.
///
/// `password` holds the plaintext when a member comes from a request
/// and the password hash once it has been read back from the store.
/// It is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Member {
  #[serde(default)]
  pub id: String,
  pub email: String,
  pub name: String,
  #[serde(skip_serializing)]
  pub password: Sensitive<String>,
  pub role: String,
  #[serde(default = "Timestamp::now")]
  pub created_at: Timestamp,
}

/// A member row as it is stored, before `created_at` is parsed.
#[derive(FromRow)]
struct MemberRow {
  id: String,
  email: String,
  name: String,
  password: String,
  role: String,
  created_at: String,
}

impl TryFrom<MemberRow> for Member {
  type Error = Report<Error>;

  fn try_from(row: MemberRow) -> Result<Self> {
    let created_at = Timestamp::parse(&row.created_at)
      .change_context(Error::MalformedTimestamp)
      .attach_printable_lazy(|| format!("member {:?} has created_at {:?}", row.id, row.created_at))?;

    Ok(Self {
      id: row.id,
      email: row.email,
      name: row.name,
      password: Sensitive::new(row.password),
      role: row.role,
      created_at,
    })
  }
}

/// Hashes on the blocking thread pool since it is slow on purpose.
async fn hash_password(plaintext: &Sensitive<String>) -> Result<String> {
  let plaintext = plaintext.clone();
  tokio::task::spawn_blocking(move || password::hash(plaintext.as_str()))
    .await
    .change_context(Error::HashPassword)?
    .change_context(Error::HashPassword)
}

/// Escapes `LIKE` wildcards so the input is matched literally.
fn escape_like(input: &str) -> String {
  let mut escaped = String::with_capacity(input.len() + 2);
  escaped.push('%');
  for c in input.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

impl Member {
  /// Hashes the plaintext password and writes a new row. Returns the
  /// member as it was stored.
  #[tracing::instrument(skip_all, fields(id = %member.id))]
  pub async fn insert(conn: &mut Connection, member: &Member) -> Result<Member> {
    let hash = hash_password(&member.password).await?;
    sqlx::query(
      r"INSERT INTO members (id, email, name, password, role, created_at)
        VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&member.id)
    .bind(&member.email)
    .bind(&member.name)
    .bind(&hash)
    .bind(&member.role)
    .bind(member.created_at.to_string())
    .execute(conn)
    .await
    .into_db_error()?;

    Ok(Member {
      password: Sensitive::new(hash),
      ..member.clone()
    })
  }

  /// Overwrites every field of the row with the same id. Updating a
  /// member that does not exist is not an error.
  #[tracing::instrument(skip_all, fields(id = %member.id))]
  pub async fn update(conn: &mut Connection, member: &Member) -> Result<Member> {
    let hash = hash_password(&member.password).await?;
    let result = sqlx::query(
      r"UPDATE members
        SET email = ?, name = ?, password = ?, role = ?, created_at = ?
        WHERE id = ?",
    )
    .bind(&member.email)
    .bind(&member.name)
    .bind(&hash)
    .bind(&member.role)
    .bind(member.created_at.to_string())
    .bind(&member.id)
    .execute(conn)
    .await
    .into_db_error()?;

    tracing::debug!(rows = result.rows_affected(), "updated member");
    Ok(Member {
      password: Sensitive::new(hash),
      ..member.clone()
    })
  }

  /// Deleting a member that does not exist is not an error.
  #[tracing::instrument(skip(conn))]
  pub async fn delete(conn: &mut Connection, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM members WHERE id = ?")
      .bind(id)
      .execute(conn)
      .await
      .into_db_error()?;

    tracing::debug!(rows = result.rows_affected(), "deleted member");
    Ok(())
  }

  #[tracing::instrument(skip(conn))]
  pub async fn by_id(conn: &mut Connection, id: &str) -> Result<Option<Self>> {
    sqlx::query_as::<_, MemberRow>(
      "SELECT id, email, name, password, role, created_at FROM members WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .into_db_error()?
    .map(Member::try_from)
    .transpose()
  }

  #[tracing::instrument(skip_all, fields(email = "<hidden>"))]
  pub async fn by_email(conn: &mut Connection, email: &str) -> Result<Option<Self>> {
    sqlx::query_as::<_, MemberRow>(
      "SELECT id, email, name, password, role, created_at FROM members WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(conn)
    .await
    .into_db_error()?
    .map(Member::try_from)
    .transpose()
  }

  /// Finds every member whose name contains `name`.
  #[tracing::instrument(skip(conn))]
  pub async fn search_by_name(conn: &mut Connection, name: &str) -> Result<Vec<Self>> {
    let mut rows = sqlx::query_as::<_, MemberRow>(
      r"SELECT id, email, name, password, role, created_at FROM members
        WHERE name LIKE ? ESCAPE '\'",
    )
    .bind(escape_like(name))
    .fetch(conn);

    let mut members = Vec::new();
    while let Some(row) = rows.try_next().await.into_db_error()? {
      members.push(Member::try_from(row)?);
    }

    Ok(members)
  }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
  use super::*;
  use crate::database::ErrorExt2;
  use crate::test_utils;

  #[test]
  fn test_escape_like() {
    assert_eq!(escape_like("lic"), "%lic%");
    assert_eq!(escape_like("50%_off\\"), "%50\\%\\_off\\\\%");
    assert_eq!(escape_like(""), "%%");
  }

  #[actix_web::test]
  async fn test_insert_then_get() {
    let pool = test_utils::memory_pool().await;
    let mut conn = pool.get().await.unwrap();

    let input = test_utils::member("m-1", "alice@example.com", "Alice Smith", "alice password");
    let stored = Member::insert(&mut conn, &input).await.unwrap();
    assert_ne!(stored.password, input.password);

    let fetched = Member::by_id(&mut conn, "m-1").await.unwrap().unwrap();
    assert_eq!(fetched.id, input.id);
    assert_eq!(fetched.email, input.email);
    assert_eq!(fetched.name, input.name);
    assert_eq!(fetched.role, input.role);
    assert_eq!(fetched.created_at, input.created_at);

    assert_ne!(fetched.password.as_str(), "alice password");
    assert!(password::verify(fetched.password.as_str(), "alice password").unwrap());
  }

  #[actix_web::test]
  async fn test_absent_member() {
    let pool = test_utils::memory_pool().await;
    let mut conn = pool.get().await.unwrap();

    assert!(Member::by_id(&mut conn, "nobody").await.unwrap().is_none());
    assert!(Member::by_email(&mut conn, "nobody@example.com").await.unwrap().is_none());
  }

  #[actix_web::test]
  async fn test_get_on_closed_store_is_an_error() {
    let pool = test_utils::memory_pool().await;
    pool.close().await;

    let error = pool.get().await.unwrap_err();
    assert!(error.is_unhealthy());
  }

  #[actix_web::test]
  async fn test_by_email() {
    let pool = test_utils::memory_pool().await;
    let mut conn = pool.get().await.unwrap();

    let input = test_utils::member("m-1", "alice@example.com", "Alice Smith", "alice password");
    Member::insert(&mut conn, &input).await.unwrap();

    let fetched = Member::by_email(&mut conn, "alice@example.com").await.unwrap().unwrap();
    assert_eq!(fetched.id, "m-1");
  }

  #[actix_web::test]
  async fn test_duplicate_insert_fails() {
    let pool = test_utils::memory_pool().await;
    let mut conn = pool.get().await.unwrap();

    let input = test_utils::member("m-1", "alice@example.com", "Alice Smith", "alice password");
    Member::insert(&mut conn, &input).await.unwrap();
    assert!(Member::insert(&mut conn, &input).await.is_err());
  }

  #[actix_web::test]
  async fn test_update_overwrites_every_field() {
    let pool = test_utils::memory_pool().await;
    let mut conn = pool.get().await.unwrap();

    let input = test_utils::member("m-1", "alice@example.com", "Alice Smith", "alice password");
    Member::insert(&mut conn, &input).await.unwrap();

    let changed = Member {
      email: "alice.smith@example.com".into(),
      name: "Alice B. Smith".into(),
      password: "new password".into(),
      role: "admin".into(),
      created_at: Timestamp::parse("2020-01-01 00:00:00").unwrap(),
      ..input.clone()
    };
    Member::update(&mut conn, &changed).await.unwrap();

    let fetched = Member::by_id(&mut conn, "m-1").await.unwrap().unwrap();
    assert_eq!(fetched.email, changed.email);
    assert_eq!(fetched.name, changed.name);
    assert_eq!(fetched.role, changed.role);
    assert_eq!(fetched.created_at, changed.created_at);
    assert!(password::verify(fetched.password.as_str(), "new password").unwrap());
  }

  #[actix_web::test]
  async fn test_update_and_delete_missing_member() {
    let pool = test_utils::memory_pool().await;
    let mut conn = pool.get().await.unwrap();

    let ghost = test_utils::member("ghost", "ghost@example.com", "Ghost", "boo");
    Member::update(&mut conn, &ghost).await.unwrap();
    assert!(Member::by_id(&mut conn, "ghost").await.unwrap().is_none());

    Member::delete(&mut conn, "ghost").await.unwrap();
    Member::delete(&mut conn, "ghost").await.unwrap();
  }

  #[actix_web::test]
  async fn test_delete() {
    let pool = test_utils::memory_pool().await;
    let mut conn = pool.get().await.unwrap();

    let input = test_utils::member("m-1", "alice@example.com", "Alice Smith", "alice password");
    Member::insert(&mut conn, &input).await.unwrap();
    Member::delete(&mut conn, "m-1").await.unwrap();
    assert!(Member::by_id(&mut conn, "m-1").await.unwrap().is_none());
  }

  #[actix_web::test]
  async fn test_search_by_name() {
    let pool = test_utils::memory_pool().await;
    let mut conn = pool.get().await.unwrap();

    for (id, name) in [("m-1", "Alice Smith"), ("m-2", "Bob Alice"), ("m-3", "Carol")] {
      let email = format!("{id}@example.com");
      let member = test_utils::member(id, &email, name, "password");
      Member::insert(&mut conn, &member).await.unwrap();
    }

    let mut ids = Member::search_by_name(&mut conn, "lic")
      .await
      .unwrap()
      .into_iter()
      .map(|m| m.id)
      .collect::<Vec<_>>();
    ids.sort();
    assert_eq!(ids, ["m-1", "m-2"]);

    assert!(Member::search_by_name(&mut conn, "Zed").await.unwrap().is_empty());
    assert!(Member::search_by_name(&mut conn, "%").await.unwrap().is_empty());
    assert_eq!(Member::search_by_name(&mut conn, "").await.unwrap().len(), 3);
  }

  #[actix_web::test]
  async fn test_malformed_timestamp_is_not_absent() {
    let pool = test_utils::memory_pool().await;
    let mut conn = pool.get().await.unwrap();

    sqlx::query(
      "INSERT INTO members (id, email, name, password, role, created_at)
       VALUES ('m-1', 'alice@example.com', 'Alice', 'x', 'member', '09/03/2024')",
    )
    .execute(&mut *conn)
    .await
    .unwrap();

    let error = Member::by_id(&mut conn, "m-1").await.unwrap_err();
    assert!(error.is_malformed_timestamp());

    let error = Member::search_by_name(&mut conn, "Ali").await.unwrap_err();
    assert!(error.is_malformed_timestamp());
  }
}
