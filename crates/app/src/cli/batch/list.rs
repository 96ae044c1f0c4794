use clap::Args;
use jerrycan_app::domain::batches::BatchesService;
use jiff::Zoned;

#[derive(Debug, Args)]
pub(crate) struct ListBatchesArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListBatchesArgs) -> Result<(), String> {
    let service = super::connect(&args.database_url).await?;

    let batches = service
        .list_batches()
        .await
        .map_err(|error| format!("failed to list batches: {error}"))?;

    if batches.is_empty() {
        println!("no batches found");
        return Ok(());
    }

    let today = Zoned::now().date();

    for batch in batches {
        let stats = service
            .get_batch_stats(&batch.id, today)
            .await
            .map_err(|error| format!("failed to read stats for {}: {error}", batch.id))?;

        println!("batch_id: {}", batch.id);
        println!("name: {}", batch.name);
        println!("status: {}", batch.status);

        if let Some(stats) = stats {
            println!(
                "bottles: {} total, {} available, {} sold",
                stats.total_bottles, stats.available, stats.sold
            );
            println!("days_aged: {}", stats.days_aged);
        }

        println!();
    }

    Ok(())
}
