//! The per-page article pipeline and the per-hotel analysis pipeline.
//!
//! Control flow is strictly sequential per unit of work: load rows, build the
//! prompt, one LLM call, resolve selected entities, post-process, persist.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

use data_model_yado::analysis::{self, AnalysisRecord};
use data_model_yado::db::DbPool;
use data_model_yado::models::{Article, ArticleStatus, Hotel, PageData, Theme};

use crate::candidates::{CandidateFilter, split_keywords};
use crate::config::AppConfig;
use crate::dataapi::DataApiClient;
use crate::errors::{GenError, Result};
use crate::fetch::HttpFetcher;
use crate::llms::{self, LlmProvider, prompts};
use crate::persona::{self, Persona};
use crate::postprocess::{AffiliateConfig, PostProcessor, extract_title};
use crate::repo;
use crate::reviews;

const MIN_SCRAPE_CHARS: usize = 100;
const RELATED_PAGES_LIMIT: usize = 5;

/// Everything the article prompt is built from.
pub struct PromptInputs {
    pub page: PageData,
    pub theme: Theme,
    pub persona: Persona,
    pub candidates: Vec<Hotel>,
    pub analyses: HashMap<i32, AnalysisRecord>,
    pub area_highlights: String,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Override for how many candidates are offered to the model
    pub candidate_count: Option<usize>,
    /// Persist the article to the database
    pub save_db: bool,
    /// Save through the Data API gateway instead of the direct connection
    pub data_api: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            candidate_count: None,
            save_db: true,
            data_api: false,
        }
    }
}

/// Result of one article generation, as written to files and the database.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleOutput {
    pub page_id: i32,
    pub page_title: String,
    pub url_slug: String,
    pub title: String,
    pub content: String,
    pub meta_description: String,
    pub seo_tags: Vec<String>,
    pub selected_hotels: Vec<String>,
    pub author_name: Option<String>,
    pub related_pages_count: usize,
    pub word_count: usize,
    pub raw_output: String,
    pub generated_at: String,
}

/// Loads every row the prompt needs and derives the persona.
///
/// # Errors
///
/// Propagates query errors; returns `TooFewCandidates` when the area cannot
/// support an article.
pub async fn load_prompt_inputs(
    config: &AppConfig,
    pool: &DbPool,
    page_id: i32,
    candidate_count: Option<usize>,
) -> Result<PromptInputs> {
    let page = repo::get_page(pool, page_id).await?;
    let theme = repo::get_theme(pool, page.theme_id).await?;

    let keywords = split_keywords(theme.hotel_search_keywords.as_deref());
    let filter = CandidateFilter::from_selection(&config.selection, keywords);
    let limit = candidate_count.unwrap_or(config.selection.candidate_count);
    let candidates = repo::candidate_hotels(pool, &page.rakuten_area_code, &filter, limit).await?;

    if candidates.len() < config.selection.absolute_min {
        return Err(GenError::TooFewCandidates {
            page_id,
            found: candidates.len(),
            minimum: config.selection.absolute_min,
        });
    }

    let candidate_ids: Vec<i32> = candidates.iter().map(|h| h.hotel_no).collect();
    let analyses = repo::fetch_analyses(pool, &candidate_ids).await?;

    let area_highlights = repo::area_highlights(pool, &page.rakuten_area_code).await?.unwrap_or_default();
    let persona = persona::build_persona(&theme);

    tracing::info!(
        page_id,
        page_title = %page.page_title,
        theme = %theme.theme_title,
        candidates = candidates.len(),
        analyses = analyses.len(),
        "prompt inputs loaded"
    );

    Ok(PromptInputs {
        page,
        theme,
        persona,
        candidates,
        analyses,
        area_highlights,
    })
}

/// Builds the article prompt for a page without calling the model. This is
/// the dry-run path.
///
/// # Errors
///
/// Propagates input-loading and substitution errors.
pub async fn build_page_prompt(
    config: &AppConfig,
    pool: &DbPool,
    page_id: i32,
    candidate_count: Option<usize>,
) -> Result<String> {
    let inputs = load_prompt_inputs(config, pool, page_id, candidate_count).await?;
    article_prompt_from_inputs(config, &inputs)
}

fn article_prompt_from_inputs(config: &AppConfig, inputs: &PromptInputs) -> Result<String> {
    prompts::article_prompt(
        &inputs.page.rakuten_area_name,
        &inputs.theme.theme_title,
        &inputs.persona,
        &inputs.candidates,
        &inputs.analyses,
        &inputs.area_highlights,
        config.selection.target_count,
    )
}

/// Generates, post-processes, and (optionally) persists one page's article.
///
/// # Errors
///
/// Propagates loading, generation, and persistence errors. `TooFewCandidates`
/// marks a page that should be skipped rather than treated as broken.
pub async fn generate_for_page<P: LlmProvider>(
    config: &AppConfig,
    provider: &P,
    pool: &DbPool,
    page_id: i32,
    options: &PipelineOptions,
) -> Result<ArticleOutput> {
    let inputs = load_prompt_inputs(config, pool, page_id, options.candidate_count).await?;
    let prompt = article_prompt_from_inputs(config, &inputs)?;
    tracing::info!(page_id, prompt_chars = prompt.chars().count(), "calling the model");

    let generated = llms::generate_article(provider, &prompt).await?;
    tracing::info!(
        page_id,
        content_chars = generated.content.chars().count(),
        selected = generated.selected_hotels.len(),
        "model response received"
    );

    let hotels = repo::hotels_by_names(pool, &generated.selected_hotels).await?;
    let author = match inputs.page.author_id {
        Some(author_id) => repo::get_author(pool, author_id).await?,
        None => None,
    };
    let related = repo::related_pages(
        pool,
        page_id,
        inputs.page.theme_id,
        inputs.page.rakuten_prefecture.as_deref().unwrap_or(""),
        RELATED_PAGES_LIMIT,
    )
    .await?;

    let processor = PostProcessor {
        page_id,
        hotels,
        affiliate: AffiliateConfig {
            affiliate_id: config.affiliate_id.clone(),
        },
        author: author.clone(),
        related_pages: related.clone(),
        site_base_url: config.site_base_url.clone(),
        media_base_url: config.media_base_url.clone(),
        hero_image_url: inputs.page.hero_image_url.clone(),
        area_name: inputs.page.rakuten_area_name.clone(),
    };
    let content = processor.process(&generated.content);

    let title = extract_title(&content).unwrap_or_else(|| inputs.page.page_title.clone());
    let word_count = content.chars().count();

    let output = ArticleOutput {
        page_id,
        page_title: inputs.page.page_title.clone(),
        url_slug: inputs.page.url_slug.clone(),
        title,
        content,
        meta_description: generated.meta_description.clone(),
        seo_tags: generated.seo_tags.clone(),
        selected_hotels: generated.selected_hotels.clone(),
        author_name: author.map(|a| a.author_name),
        related_pages_count: related.len(),
        word_count,
        raw_output: generated.raw_output,
        generated_at: Utc::now().to_rfc3339(),
    };

    if options.save_db {
        persist_article(config, pool, &output, options.data_api).await?;
    }

    Ok(output)
}

async fn persist_article(config: &AppConfig, pool: &DbPool, output: &ArticleOutput, via_data_api: bool) -> Result<()> {
    if via_data_api {
        let api_config = config
            .data_api
            .as_ref()
            .ok_or_else(|| GenError::Config("TIDB_DATA_API_BASE/USER/PASSWORD must be set for --data-api".to_string()))?;
        let client = DataApiClient::new(api_config)?;
        return client.save_page_content(output.page_id, &output.content).await;
    }

    let article = Article {
        page_id: output.page_id,
        status: ArticleStatus::Draft,
        title: output.title.clone(),
        content: output.content.clone(),
        meta_description: if output.meta_description.is_empty() {
            None
        } else {
            Some(output.meta_description.clone())
        },
        seo_tags: if output.seo_tags.is_empty() {
            None
        } else {
            Some(output.seo_tags.join(","))
        },
        word_count: output.word_count as i32,
        generated_at: Utc::now().naive_utc(),
    };
    repo::store_article(pool, &article).await?;
    tracing::info!(page_id = output.page_id, words = output.word_count, "article stored");
    Ok(())
}

/// Scrapes one hotel's reviews, analyzes them with the model, validates the
/// JSON, and upserts the normalized record.
///
/// # Errors
///
/// `MissingReviewUrl` and `EmptyScrape` mark hotels to skip; everything else
/// is a real failure for the unit.
pub async fn analyze_hotel<P: LlmProvider>(
    fetcher: &HttpFetcher,
    provider: &P,
    pool: &DbPool,
    hotel: &Hotel,
) -> Result<AnalysisRecord> {
    let review_url = hotel
        .review_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or(GenError::MissingReviewUrl(hotel.hotel_no))?;

    let scrape = reviews::fetch_review_content(fetcher, review_url).await;
    if scrape.is_empty() || scrape.text.chars().count() < MIN_SCRAPE_CHARS {
        return Err(GenError::EmptyScrape(hotel.hotel_no));
    }
    tracing::debug!(
        hotel_no = hotel.hotel_no,
        fragments = scrape.count,
        chars = scrape.text.chars().count(),
        "reviews scraped"
    );

    let prompt = prompts::review_analysis_prompt(&hotel.hotel_name, &scrape.source_url, &scrape.text)?;
    let raw = provider.complete_prompt(&prompt).await?;

    // Validate and normalize before storing, so readers only ever see the
    // canonical shape.
    let record = analysis::parse_analysis(&raw)?.ok_or(GenError::LlmEmptyResponse)?;
    let normalized = serde_json::to_string(&record)?;
    repo::upsert_analysis(pool, hotel.hotel_no, &normalized).await?;

    Ok(record)
}
