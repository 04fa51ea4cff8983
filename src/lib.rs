pub mod app;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod database;
pub mod http;
pub mod logging;
pub mod schema;
pub mod server;
pub mod types;
pub mod util;

pub use app::App;

#[cfg(test)]
mod test_utils;
