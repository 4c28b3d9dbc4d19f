mod config;
mod dispatch;
mod extract;
mod paginate;
mod record;
mod session;
mod sink;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;

use config::Settings;
use sink::CsvSink;

#[derive(Parser)]
#[command(
    name = "catalog_scraper",
    about = "Supplier catalog scraper: product listings to CSV via a real browser"
)]
struct Cli {
    /// Output CSV file name; its category folder is derived from the name
    #[arg(long)]
    filename: String,
    /// One page spec per job: "all", a single page number, or "start,end"
    #[arg(long, num_args = 1.., required = true)]
    pages: Vec<String>,
    /// One catalog path per job, relative to SUPPLIER_URL
    #[arg(long, num_args = 1.., required = true)]
    urls: Vec<String>,
    /// Number of collections; must equal the number of page specs
    #[arg(long, default_value_t = 1)]
    n_collections: usize,
    /// Concurrent browser sessions
    #[arg(long, default_value_t = 6)]
    max_workers: usize,
    /// Per-job wall-clock deadline in seconds
    #[arg(long, default_value_t = 1800)]
    job_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let started_at = chrono::Local::now();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    // All configuration errors surface here, before any browser starts.
    let jobs = dispatch::build_jobs(&settings, &cli.urls, &cli.pages, cli.n_collections)?;
    let sink = Arc::new(CsvSink::create(&cli.filename)?);

    println!("====================");
    println!("Starting the scraper");
    println!("====================");
    println!("Output file: {}", sink.path().display());
    println!("Jobs: {} | Workers: {}", jobs.len(), cli.max_workers);

    let stats = dispatch::run_jobs(
        settings,
        jobs,
        Arc::clone(&sink),
        cli.max_workers,
        Duration::from_secs(cli.job_timeout_secs),
    )
    .await;

    let finished_at = chrono::Local::now();
    println!(
        "Jobs finished: {} ok, {} failed ({} total)",
        stats.ok, stats.failed, stats.total
    );
    println!("Start time: {}", started_at.format("%Y-%m-%d %H:%M:%S"));
    println!("End time: {}", finished_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Total execution time: {}", format_duration(t0.elapsed()));

    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
