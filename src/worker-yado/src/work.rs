//! Unit-of-work wrappers: map pipeline results onto batch outcomes.
//!
//! Sentinel conditions (no review URL, empty scrape, too few candidates) are
//! skips; everything else that goes wrong fails the unit without touching the
//! rest of the batch.

use core_yado::batch::UnitOutcome;
use core_yado::config::AppConfig;
use core_yado::errors::GenError;
use core_yado::fetch::HttpFetcher;
use core_yado::llms::LlmProvider;
use core_yado::pipeline::{self, PipelineOptions};
use data_model_yado::db::DbPool;
use data_model_yado::models::Hotel;

/// Scrape one hotel's reviews, analyze, and cache the result.
pub async fn analyze_unit<P: LlmProvider>(
    fetcher: &HttpFetcher,
    provider: &P,
    pool: &DbPool,
    hotel: Hotel,
) -> UnitOutcome {
    match pipeline::analyze_hotel(fetcher, provider, pool, &hotel).await {
        Ok(record) => {
            tracing::info!(
                hotel_no = hotel.hotel_no,
                hotel_name = %hotel.hotel_name,
                trust_score = ?record.trust_score,
                "analysis stored"
            );
            UnitOutcome::Success
        }
        Err(e @ (GenError::MissingReviewUrl(_) | GenError::EmptyScrape(_))) => UnitOutcome::Skipped(e.to_string()),
        Err(e) => UnitOutcome::Failed(e.to_string()),
    }
}

/// Generate and store one page's article.
pub async fn generate_unit<P: LlmProvider>(
    config: &AppConfig,
    provider: &P,
    pool: &DbPool,
    page_id: i32,
) -> UnitOutcome {
    let options = PipelineOptions::default();
    match pipeline::generate_for_page(config, provider, pool, page_id, &options).await {
        Ok(article) => {
            tracing::info!(page_id, title = %article.title, words = article.word_count, "article generated");
            UnitOutcome::Success
        }
        Err(e @ GenError::TooFewCandidates { .. }) => UnitOutcome::Skipped(e.to_string()),
        Err(e) => UnitOutcome::Failed(e.to_string()),
    }
}
