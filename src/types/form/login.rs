use serde::{Deserialize, Serialize};

use crate::util::Sensitive;

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub email: Sensitive<String>,
  pub password: Sensitive<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  pub token: Sensitive<String>,
}
