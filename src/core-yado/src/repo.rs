//! Database queries. One connection is checked out of the pool per call and
//! returned when it drops; upserts use MySQL REPLACE semantics (last write
//! wins, no history).

use std::collections::HashMap;

use data_model_yado::analysis::{self, AnalysisRecord};
use data_model_yado::db::{DbPool, establish_connection_pool};
use data_model_yado::models::{Article, Author, Hotel, NewReviewAnalysis, OnsenArea, PageData, ReviewAnalysisRow, Theme};
use data_model_yado::schema;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::candidates::{CandidateFilter, matches_filter, rank_candidates};
use crate::config::AppConfig;
use crate::errors::{GenError, Result};

/// Builds the connection pool from `AppConfig.database_url`.
///
/// # Errors
///
/// Returns a configuration error when no DATABASE_URL is set, or a pool
/// error when the database is unreachable.
pub async fn connect(config: &AppConfig) -> Result<DbPool> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| GenError::Config("DATABASE_URL must be set for direct database access".to_string()))?;
    Ok(establish_connection_pool(url).await?)
}

pub async fn get_page(pool: &DbPool, page_id: i32) -> Result<PageData> {
    let mut conn = pool.get().await?;
    schema::page_data::table
        .find(page_id)
        .select(PageData::as_select())
        .first(&mut conn)
        .await
        .map_err(|e| not_found(e, format!("page {page_id}")))
}

pub async fn get_theme(pool: &DbPool, theme_id: i32) -> Result<Theme> {
    let mut conn = pool.get().await?;
    schema::themes::table
        .find(theme_id)
        .select(Theme::as_select())
        .first(&mut conn)
        .await
        .map_err(|e| not_found(e, format!("theme {theme_id}")))
}

pub async fn get_hotel(pool: &DbPool, hotel_no: i32) -> Result<Hotel> {
    let mut conn = pool.get().await?;
    schema::hotels::table
        .find(hotel_no)
        .select(Hotel::as_select())
        .first(&mut conn)
        .await
        .map_err(|e| not_found(e, format!("hotel {hotel_no}")))
}

pub async fn get_author(pool: &DbPool, author_id: i32) -> Result<Option<Author>> {
    let mut conn = pool.get().await?;
    let author = schema::authors::table
        .find(author_id)
        .select(Author::as_select())
        .first(&mut conn)
        .await
        .optional()?;
    Ok(author)
}

/// Composes the area highlight text (spring quality, scenery, nearby sights)
/// from the onsen_areas row, when one exists.
pub async fn area_highlights(pool: &DbPool, area_code: &str) -> Result<Option<String>> {
    let mut conn = pool.get().await?;
    let row: Option<OnsenArea> = schema::onsen_areas::table
        .find(area_code)
        .select(OnsenArea::as_select())
        .first(&mut conn)
        .await
        .optional()?;

    let Some(area) = row else {
        return Ok(None);
    };

    let mut parts: Vec<String> = Vec::new();
    if let Some(note) = area.spring_quality_note.filter(|t| !t.is_empty()) {
        parts.push(format!("### 温泉・泉質の特徴\n\n{note}"));
    }
    if let Some(scenic) = area.scenic_features.filter(|t| !t.is_empty()) {
        parts.push(format!("### 景観・自然の魅力\n\n{scenic}"));
    }
    if let Some(nearby) = area.nearby_attractions.filter(|t| !t.is_empty()) {
        parts.push(format!("### 周辺の観光スポット・名所\n\n{nearby}"));
    }

    Ok(if parts.is_empty() { None } else { Some(parts.join("\n\n")) })
}

/// Candidate hotels for an area, filtered by the quality thresholds and
/// theme keywords, ranked by the composite confidence score.
pub async fn candidate_hotels(
    pool: &DbPool,
    area_code: &str,
    filter: &CandidateFilter,
    limit: usize,
) -> Result<Vec<Hotel>> {
    let mut conn = pool.get().await?;
    let rows: Vec<Hotel> = schema::hotels::table
        .filter(schema::hotels::rakuten_area_code.eq(area_code))
        .filter(schema::hotels::review_count.ge(filter.min_review_count))
        .filter(schema::hotels::review_average.ge(filter.min_review_average))
        .filter(schema::hotels::hotel_special.is_not_null())
        .select(Hotel::as_select())
        .load(&mut conn)
        .await?;

    // Keyword and text-length filtering plus the score ordering happen here
    // rather than in SQL, so the scoring stays in one tested place.
    let filtered: Vec<Hotel> = rows.into_iter().filter(|h| matches_filter(h, filter)).collect();
    Ok(rank_candidates(filtered, limit))
}

/// Resolves hotel rows by exact name, keyed by name for the post-processor.
pub async fn hotels_by_names(pool: &DbPool, names: &[String]) -> Result<HashMap<String, Hotel>> {
    if names.is_empty() {
        return Ok(HashMap::new());
    }
    let mut conn = pool.get().await?;
    let rows: Vec<Hotel> = schema::hotels::table
        .filter(schema::hotels::hotel_name.eq_any(names))
        .select(Hotel::as_select())
        .load(&mut conn)
        .await?;
    Ok(rows.into_iter().map(|h| (h.hotel_name.clone(), h)).collect())
}

/// Related pages for the footer card grid: same theme first, then same
/// prefecture, the current page excluded.
pub async fn related_pages(
    pool: &DbPool,
    page_id: i32,
    theme_id: i32,
    prefecture: &str,
    limit: usize,
) -> Result<Vec<PageData>> {
    let mut conn = pool.get().await?;
    let mut rows: Vec<PageData> = schema::page_data::table
        .filter(schema::page_data::id.ne(page_id))
        .filter(
            schema::page_data::theme_id
                .eq(theme_id)
                .or(schema::page_data::rakuten_prefecture.eq(prefecture)),
        )
        .order(schema::page_data::id.asc())
        .select(PageData::as_select())
        .load(&mut conn)
        .await?;

    rows.sort_by_key(|p| if p.theme_id == theme_id { 0 } else { 1 });
    rows.truncate(limit);
    Ok(rows)
}

/// Every page id, for batch generation runs.
pub async fn all_page_ids(pool: &DbPool) -> Result<Vec<i32>> {
    let mut conn = pool.get().await?;
    Ok(schema::page_data::table
        .select(schema::page_data::id)
        .order(schema::page_data::id.asc())
        .load(&mut conn)
        .await?)
}

/// Hotels eligible for review analysis (a non-empty review URL), most
/// reviewed first.
pub async fn analyzable_hotels(pool: &DbPool) -> Result<Vec<Hotel>> {
    let mut conn = pool.get().await?;
    Ok(schema::hotels::table
        .filter(schema::hotels::review_url.is_not_null())
        .filter(schema::hotels::review_url.ne(""))
        .order(schema::hotels::review_count.desc())
        .select(Hotel::as_select())
        .load(&mut conn)
        .await?)
}

/// Upserts one hotel's analysis JSON. REPLACE semantics: the previous
/// analysis is gone after this commits.
pub async fn upsert_analysis(pool: &DbPool, hotel_id: i32, analysis_json: &str) -> Result<()> {
    let mut conn = pool.get().await?;
    let record = NewReviewAnalysis {
        hotel_id,
        analysis_json: analysis_json.to_string(),
    };
    diesel::replace_into(schema::hotel_review_analysis::table)
        .values(&record)
        .execute(&mut conn)
        .await?;
    Ok(())
}

/// Loads cached analyses for the given hotels, normalized to the canonical
/// record shape. Unparseable payloads are logged and skipped.
pub async fn fetch_analyses(pool: &DbPool, hotel_ids: &[i32]) -> Result<HashMap<i32, AnalysisRecord>> {
    if hotel_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut conn = pool.get().await?;
    let rows: Vec<ReviewAnalysisRow> = schema::hotel_review_analysis::table
        .filter(schema::hotel_review_analysis::hotel_id.eq_any(hotel_ids))
        .select(ReviewAnalysisRow::as_select())
        .load(&mut conn)
        .await?;

    let mut analyses = HashMap::new();
    for row in rows {
        match analysis::parse_analysis(&row.analysis_json) {
            Ok(Some(record)) => {
                analyses.insert(row.hotel_id, record);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(hotel_id = row.hotel_id, error = %e, "skipping unparseable analysis payload");
            }
        }
    }
    Ok(analyses)
}

/// Stores a generated article and updates the page row, atomically as a pair.
/// Both writes use last-write-wins semantics.
pub async fn store_article(pool: &DbPool, article: &Article) -> Result<()> {
    let mut conn = pool.get().await?;
    let record = article.clone();
    conn.transaction::<_, diesel::result::Error, _>(|mut conn| {
        Box::pin(async move {
            diesel::replace_into(schema::articles::table)
                .values(&record)
                .execute(&mut conn)
                .await?;

            diesel::update(schema::page_data::table.find(record.page_id))
                .set((
                    schema::page_data::content.eq(&record.content),
                    schema::page_data::meta_description.eq(&record.meta_description),
                ))
                .execute(&mut conn)
                .await?;

            Ok(())
        })
    })
    .await?;
    Ok(())
}

fn not_found(e: diesel::result::Error, what: String) -> GenError {
    match e {
        diesel::result::Error::NotFound => GenError::NotFound(what),
        other => other.into(),
    }
}
