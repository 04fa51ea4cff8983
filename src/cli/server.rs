use clap::Parser;
use error_stack::{Result, ResultExt};
use membership::config::Server as Config;
use membership::server::StartServerError;
use std::net::IpAddr;
use std::num::NonZeroUsize;

/// Expose the membership HTTP server
#[derive(Debug, Parser)]
pub struct ServerCommand {
  #[clap(long)]
  pub address: Option<IpAddr>,
  #[clap(long)]
  pub port: Option<u16>,
  #[clap(long)]
  pub workers: Option<NonZeroUsize>,
}

pub fn run(args: &ServerCommand) -> Result<(), StartServerError> {
  let mut config = Config::load().change_context(StartServerError)?;
  args.override_config(&mut config);

  membership::logging::init(&config.logging).change_context(StartServerError)?;

  let config_file = Config::config_file();
  if config_file.is_file() {
    tracing::info!(path = %config_file.display(), "loaded configuration file");
  } else {
    tracing::warn!(
      path = %config_file.display(),
      "configuration file not found, using defaults and environment variables"
    );
  }

  actix_web::rt::System::new().block_on(membership::server::run(config))
}

impl ServerCommand {
  fn override_config(&self, config: &mut Config) {
    // command line flags win over the config file and env
    if let Some(address) = self.address {
      config.ip = address;
    }

    if let Some(port) = self.port {
      config.port = port;
    }

    if let Some(workers) = self.workers {
      config.workers = Some(workers);
    }
  }
}
