use std::sync::Arc;

use clap::{Parser, ValueEnum};

use core_yado::batch::{self, CancelToken};
use core_yado::config::AppConfig;
use core_yado::fetch::HttpFetcher;
use core_yado::llms::Gemini;
use core_yado::repo;
use worker_yado::{analyze_unit, generate_unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Scrape and analyze reviews for every eligible hotel
    Analyze,
    /// Generate an article for every page
    Generate,
}

#[derive(Parser)]
#[command(name = "yadogen-worker")]
#[command(about = "Batch runner for review analysis and article generation", long_about = None)]
struct Cli {
    #[arg(long, value_enum)]
    mode: Mode,
    /// Maximum units in flight at once
    #[arg(long, default_value_t = 10)]
    concurrency: usize,
    /// Only process the first N units
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if it exists
    dotenvy::dotenv().ok();

    common_yado::setup_logging("yadogen_worker=info,worker_yado=info,core_yado=info");

    let cli = Cli::parse();
    let config = Arc::new(AppConfig::from_env()?);
    let pool = repo::connect(&config).await?;

    // Ctrl-C flips the cancel flag; in-flight units finish, queued units are
    // recorded as skipped.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("cancellation requested, draining in-flight units");
                cancel.cancel();
            }
        });
    }

    let report = match cli.mode {
        Mode::Analyze => {
            let fetcher = Arc::new(HttpFetcher::new(config.http_timeout, config.max_retries)?);
            let provider = Arc::new(Gemini::new(&config)?.json_output());

            let mut hotels = repo::analyzable_hotels(&pool).await?;
            if let Some(limit) = cli.limit {
                hotels.truncate(limit);
            }
            tracing::info!(hotels = hotels.len(), concurrency = cli.concurrency, "starting analyze batch");

            batch::run_units(
                hotels,
                cli.concurrency,
                &cancel,
                |h| format!("{} ({})", h.hotel_name, h.hotel_no),
                move |hotel| {
                    let fetcher = fetcher.clone();
                    let provider = provider.clone();
                    let pool = pool.clone();
                    async move { analyze_unit(fetcher.as_ref(), provider.as_ref(), &pool, hotel).await }
                },
            )
            .await
        }

        Mode::Generate => {
            let provider = Arc::new(Gemini::new(&config)?);

            let mut page_ids = repo::all_page_ids(&pool).await?;
            if let Some(limit) = cli.limit {
                page_ids.truncate(limit);
            }
            tracing::info!(pages = page_ids.len(), concurrency = cli.concurrency, "starting generate batch");

            batch::run_units(
                page_ids,
                cli.concurrency,
                &cancel,
                |id| format!("page {id}"),
                move |page_id| {
                    let config = config.clone();
                    let provider = provider.clone();
                    let pool = pool.clone();
                    async move { generate_unit(&config, provider.as_ref(), &pool, page_id).await }
                },
            )
            .await
        }
    };

    report.log_summary();
    if report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
