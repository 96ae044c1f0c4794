use clap::Args;
use jerrycan_app::domain::batches::{BatchesService, records::BatchStatus};

#[derive(Debug, Args)]
pub(crate) struct BatchStatusArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long)]
    id: String,

    /// New status; must not move the batch backwards
    #[arg(long)]
    status: BatchStatus,
}

pub(crate) async fn run(args: BatchStatusArgs) -> Result<(), String> {
    let service = super::connect(&args.database_url).await?;

    let batch = service
        .update_batch_status(&args.id, args.status)
        .await
        .map_err(|error| format!("failed to update batch {}: {error}", args.id))?;

    println!("batch_id: {}", batch.id);
    println!("status: {}", batch.status);

    Ok(())
}
