// Entry point for the AAP job report

use aap_client::{AapClient, JobRange};
use anyhow::{Context, Result};
use clap::Parser;
use job_report::{config, pipeline, ReportWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "job-report")]
#[command(about = "Generate a CSV report of AAP job runs")]
struct Cli {
    /// YAML file with aap_url, verify_ssl and token
    #[arg(long, default_value = "~/.config.yml")]
    config: String,

    /// Output CSV path
    #[arg(long, default_value = "report.csv")]
    report: String,

    /// First job id to include
    #[arg(long)]
    start_id: Option<i64>,

    /// Last job id to include
    #[arg(long)]
    end_id: Option<i64>,

    /// Concurrent stdout downloads per batch
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u64).range(1..))]
    batch: u64,

    /// Jobs per listing page
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the result line
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_report=debug,aap_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = config::expand_home(&cli.config);
    let aap_config = config::load(&config_path).context("Failed to load configuration")?;
    tracing::info!(base_url = %aap_config.base_url, verify_ssl = aap_config.verify_ssl, "Configuration loaded");

    let client = AapClient::new(aap_config)
        .context("Failed to build AAP client")?
        .with_page_size(cli.page_size);

    let report_path = config::expand_home(&cli.report);
    let mut writer = ReportWriter::create(&report_path)
        .with_context(|| format!("Failed to create report {}", report_path.display()))?;

    let range = JobRange::new(cli.start_id, cli.end_id);
    let batch_size = usize::try_from(cli.batch).context("Batch size too large")?;

    let stats = pipeline::run(&client, range, batch_size, &mut writer)
        .await
        .context("Report run failed")?;

    println!(
        "Report written to {} ({} jobs in {} batches, {} without stdout)",
        writer.path().display(),
        stats.jobs,
        stats.batches,
        stats.missing_logs
    );

    Ok(())
}
