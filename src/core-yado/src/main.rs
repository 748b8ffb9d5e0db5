use std::path::PathBuf;

use clap::{Parser, Subcommand};

use core_yado::config::AppConfig;
use core_yado::fetch::HttpFetcher;
use core_yado::llms::Gemini;
use core_yado::pipeline::{self, PipelineOptions};
use core_yado::{output, repo};

#[derive(Parser)]
#[command(name = "yadogen")]
#[command(about = "Onsen article generation toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an article for one page
    Generate {
        /// Page to generate
        #[arg(long)]
        page_id: i32,
        /// How many candidate hotels to offer the model
        #[arg(long)]
        candidate_count: Option<usize>,
        /// Build and print the prompt without calling the model
        #[arg(long)]
        dry_run: bool,
        /// Explicit output file; .json/.md/.html siblings are derived from it
        #[arg(long)]
        output: Option<PathBuf>,
        /// Directory for timestamped output files
        #[arg(long, default_value = "./output")]
        output_dir: PathBuf,
        /// Skip the database write
        #[arg(long)]
        no_save_db: bool,
        /// Save through the Data API gateway instead of the direct connection
        #[arg(long)]
        data_api: bool,
    },

    /// Scrape and analyze one hotel's reviews, caching the result
    Analyze {
        #[arg(long)]
        hotel_no: i32,
    },

    /// Render a stored page to a standalone HTML preview
    Export {
        #[arg(long)]
        page_id: i32,
        #[arg(long, default_value = "./output")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if it exists
    dotenvy::dotenv().ok();

    common_yado::setup_logging("yadogen=info,core_yado=info");

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Generate {
            page_id,
            candidate_count,
            dry_run,
            output,
            output_dir,
            no_save_db,
            data_api,
        } => {
            let pool = repo::connect(&config).await?;

            if dry_run {
                let prompt = pipeline::build_page_prompt(&config, &pool, page_id, candidate_count).await?;
                println!("{prompt}");
                return Ok(());
            }

            let provider = Gemini::new(&config)?;
            let options = PipelineOptions {
                candidate_count,
                save_db: !no_save_db,
                data_api,
            };
            let article = pipeline::generate_for_page(&config, &provider, &pool, page_id, &options).await?;

            let (dir, stem) = match &output {
                Some(path) => {
                    let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
                    let stem = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| output::timestamped_stem(page_id));
                    (dir, stem)
                }
                None => (output_dir, output::timestamped_stem(page_id)),
            };
            for path in output::write_article_files(&dir, &stem, &article)? {
                println!("wrote {}", path.display());
            }
            println!("title: {}", article.title);
        }

        Commands::Analyze { hotel_no } => {
            let pool = repo::connect(&config).await?;
            let fetcher = HttpFetcher::new(config.http_timeout, config.max_retries)?;
            let provider = Gemini::new(&config)?.json_output();

            let hotel = repo::get_hotel(&pool, hotel_no).await?;
            let record = pipeline::analyze_hotel(&fetcher, &provider, &pool, &hotel).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Export { page_id, output_dir } => {
            let pool = repo::connect(&config).await?;
            let page = repo::get_page(&pool, page_id).await?;
            let content = page
                .content
                .ok_or_else(|| anyhow::anyhow!("page {page_id} has no stored content to export"))?;

            let html = output::render_html_document(
                &page.page_title,
                page.meta_description.as_deref().unwrap_or(""),
                &content,
            )?;
            std::fs::create_dir_all(&output_dir)?;
            let path = output_dir.join(format!("preview_{page_id}.html"));
            std::fs::write(&path, html)?;
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}
