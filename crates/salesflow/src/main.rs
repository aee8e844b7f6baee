use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use salesflow_core::{Pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Load the sales export into the sales table and announce completion",
    long_about = None
)]
struct Cli {
    /// TOML file with config overrides
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Source bucket
    #[arg(long)]
    bucket: Option<String>,
    /// Source object key
    #[arg(long)]
    key: Option<String>,
    /// Destination table
    #[arg(long)]
    table: Option<String>,
    /// Notification topic ARN
    #[arg(long)]
    topic_arn: Option<String>,
    /// Endpoint for S3/DynamoDB/SNS-compatible emulators
    #[arg(long)]
    endpoint_url: Option<String>,
    /// Print the resolved config and exit without running
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if cli.print_config {
        let mut shown = config.clone();
        shown.aws.secret_access_key = shown.aws.secret_access_key.map(|_| "<redacted>".into());
        shown.aws.session_token = shown.aws.session_token.map(|_| "<redacted>".into());
        print!("{}", shown.to_toml_string()?);
        return Ok(());
    }

    info!(
        bucket = %config.source.bucket,
        key = %config.source.key,
        table = %config.table.name,
        topic = %config.notification.topic_arn,
        "starting sales data run"
    );

    let pipeline = Pipeline::connect(config)
        .await
        .context("failed to configure AWS clients")?;
    let report = pipeline.run().await.context("sales data run failed")?;

    info!(
        run_id = %report.run_id,
        rows = report.transform.rows,
        items_written = report.load.items_written,
        "sales data processed"
    );
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    dotenvy::dotenv().ok();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config
        .apply_env()
        .context("invalid SALESFLOW_* environment override")?;
    apply_flags(cli, &mut config);

    Ok(config)
}

/// Command-line flags win over the file and the environment.
fn apply_flags(cli: &Cli, config: &mut PipelineConfig) {
    if let Some(bucket) = &cli.bucket {
        config.source.bucket = bucket.clone();
    }
    if let Some(key) = &cli.key {
        config.source.key = key.clone();
    }
    if let Some(table) = &cli.table {
        config.table.name = table.clone();
    }
    if let Some(topic_arn) = &cli.topic_arn {
        config.notification.topic_arn = topic_arn.clone();
    }
    if let Some(endpoint_url) = &cli.endpoint_url {
        config.aws.endpoint_url = Some(endpoint_url.clone());
    }
}
