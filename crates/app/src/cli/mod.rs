use clap::{Parser, Subcommand};

mod batch;
mod db;

#[derive(Debug, Parser)]
#[command(name = "jerrycan-app", about = "Jerry Can provenance admin CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Batch(batch::BatchCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Batch(command) => batch::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
