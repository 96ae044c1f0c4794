use clap::Args;
use jerrycan_app::domain::batches::{BatchesService, data::NewBatch, records::BatchStatus};
use jiff::civil::Date;
use rust_decimal::Decimal;

#[derive(Debug, Args)]
pub(crate) struct CreateBatchArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Batch identifier used in certificate URLs, e.g. `batch-007`
    #[arg(long)]
    id: String,

    /// Display name
    #[arg(long)]
    name: String,

    #[arg(long)]
    cask_type: Option<String>,

    /// Distillation date (YYYY-MM-DD)
    #[arg(long)]
    distillation_date: Option<Date>,

    /// Bottling date (YYYY-MM-DD)
    #[arg(long)]
    bottling_date: Option<Date>,

    /// Nominal number of bottles
    #[arg(long)]
    bottle_count: Option<u32>,

    /// Alcohol by volume, e.g. `46.3`
    #[arg(long)]
    abv: Option<Decimal>,

    #[arg(long, default_value = "ageing")]
    status: BatchStatus,

    #[arg(long)]
    tasting_notes: Option<String>,

    #[arg(long)]
    founder_notes: Option<String>,
}

pub(crate) async fn run(args: CreateBatchArgs) -> Result<(), String> {
    let service = super::connect(&args.database_url).await?;

    let batch = service
        .create_batch(NewBatch {
            id: args.id,
            name: args.name,
            cask_type: args.cask_type,
            distillation_date: args.distillation_date,
            bottling_date: args.bottling_date,
            bottle_count: args.bottle_count,
            abv: args.abv,
            status: args.status,
            tasting_notes: args.tasting_notes,
            founder_notes: args.founder_notes,
        })
        .await
        .map_err(|error| format!("failed to create batch: {error}"))?;

    println!("batch_id: {}", batch.id);
    println!("name: {}", batch.name);
    println!("status: {}", batch.status);

    Ok(())
}
