//! Process-wide configuration, sourced from the environment exactly once at
//! startup and passed explicitly to every component that needs it.

use std::time::Duration;

use common_yado::{TimeUnit, env_duration};

use crate::errors::{GenError, Result};

/// Thresholds governing which hotels become article candidates.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// How many hotels an article should feature
    pub target_count: usize,
    /// Usual lower bound before an article is considered thin
    pub min_count: usize,
    /// Absolute minimum; below this the page is skipped (niche onsen areas)
    pub absolute_min: usize,
    /// How many candidate rows are offered to the LLM
    pub candidate_count: usize,
    pub min_review_count: i32,
    pub min_review_average: f64,
    /// Minimum length (chars) of the hotel's special-feature text
    pub min_special_len: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            target_count: 10,
            min_count: 5,
            absolute_min: 1,
            candidate_count: 20,
            min_review_count: 10,
            min_review_average: 3.5,
            min_special_len: 50,
        }
    }
}

/// Credentials for the HTTP Data API gateway, the write path used when a
/// direct database connection is not available.
#[derive(Debug, Clone)]
pub struct DataApiConfig {
    pub base_url: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Direct MySQL-wire connection string (TiDB). Optional: the Data API
    /// gateway can stand in for the write path when this is unset.
    pub database_url: Option<String>,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub affiliate_id: String,
    pub site_base_url: String,
    /// Base URL for hero/author media assets
    pub media_base_url: String,
    pub data_api: Option<DataApiConfig>,
    /// Per-call timeout for scraping requests. The LLM call itself carries no
    /// timeout and relies on the remote endpoint.
    pub http_timeout: Duration,
    /// Bounded retry attempts for HTTP 429/5xx responses
    pub max_retries: u32,
    pub selection: SelectionConfig,
}

impl AppConfig {
    /// Reads configuration from the environment. `dotenvy::dotenv()` should
    /// have been called by the binary beforehand.
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| GenError::Config("GEMINI_API_KEY or GOOGLE_API_KEY must be set".to_string()))?;

        let http_timeout = env_duration(TimeUnit::Seconds, "HTTP_TIMEOUT_SECS", 15)
            .map_err(|e| GenError::Config(format!("HTTP_TIMEOUT_SECS must be a valid number: {e}")))?;

        let max_retries = match std::env::var("LLM_MAX_RETRIES") {
            Ok(v) => v
                .trim()
                .parse::<u32>()
                .map_err(|e| GenError::Config(format!("LLM_MAX_RETRIES must be a valid number: {e}")))?,
            Err(_) => 3,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            gemini_api_key,
            gemini_model: env_or("GEMINI_MODEL", "gemini-2.0-flash"),
            affiliate_id: env_or("RAKUTEN_AFFILIATE_ID", ""),
            site_base_url: env_or("SITE_BASE_URL", "https://premium-onsen.com"),
            media_base_url: env_or("MEDIA_BASE_URL", "https://media.premium-onsen.com"),
            data_api: data_api_from_env(),
            http_timeout,
            max_retries,
            selection: SelectionConfig::default(),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn data_api_from_env() -> Option<DataApiConfig> {
    let base_url = std::env::var("TIDB_DATA_API_BASE").ok()?;
    let user = std::env::var("TIDB_DATA_API_USER").ok()?;
    let password = std::env::var("TIDB_DATA_API_PASSWORD").ok()?;
    Some(DataApiConfig { base_url, user, password })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_defaults() {
        let selection = SelectionConfig::default();
        assert_eq!(selection.candidate_count, 20);
        assert_eq!(selection.min_review_count, 10);
        assert!(selection.absolute_min <= selection.min_count);
    }

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(env_or("YADOGEN_TEST_UNSET_XYZ", "fallback"), "fallback");
    }
}
