use clap::Parser;
use error_stack::Result;

mod server;

/// Command line options for the membership service.
#[derive(Debug, Parser)]
#[command(about = "Member management service", version, author, long_about)]
pub struct Cli {
  #[clap(subcommand)]
  pub subcommand: Subcommand,
}

impl Cli {
  pub fn run(self) -> Result<(), membership::server::StartServerError> {
    match self.subcommand {
      Subcommand::Server(args) => self::server::run(&args),
    }
  }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
  Server(self::server::ServerCommand),
}
