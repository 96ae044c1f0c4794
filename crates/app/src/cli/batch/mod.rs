use clap::{Args, Subcommand};
use jerrycan_app::{
    database::{self, Db},
    domain::batches::PgBatchesService,
};

mod create;
mod list;
mod status;

#[derive(Debug, Args)]
pub(crate) struct BatchCommand {
    #[command(subcommand)]
    command: BatchSubcommand,
}

#[derive(Debug, Subcommand)]
enum BatchSubcommand {
    Create(create::CreateBatchArgs),
    List(list::ListBatchesArgs),
    Status(status::BatchStatusArgs),
}

pub(crate) async fn run(command: BatchCommand) -> Result<(), String> {
    match command.command {
        BatchSubcommand::Create(args) => create::run(args).await,
        BatchSubcommand::List(args) => list::run(args).await,
        BatchSubcommand::Status(args) => status::run(args).await,
    }
}

async fn connect(database_url: &str) -> Result<PgBatchesService, String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(PgBatchesService::new(Db::new(pool)))
}
