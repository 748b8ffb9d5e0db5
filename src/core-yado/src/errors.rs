//! Error types for the article generation pipeline.

use thiserror::Error;

/// Main error type for article generation operations.
#[derive(Debug, Error)]
pub enum GenError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The LLM endpoint returned a non-success status
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// The LLM returned a response with no usable text
    #[error("LLM returned no content")]
    LlmEmptyResponse,

    /// Internal error: prompt substitution failed
    #[error("Failed to build prompt: {0}")]
    Prompt(#[from] subst::Error),

    /// A JSON payload (analysis output or cache) could not be parsed
    #[error("Invalid JSON payload: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Db(#[from] diesel::result::Error),

    /// Database pool error
    #[error("Database pool error: {0}")]
    Pool(String),

    /// A row the pipeline needs does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The candidate query matched fewer hotels than the configured minimum
    #[error("only {found} candidate hotels for page {page_id} (minimum {minimum})")]
    TooFewCandidates { page_id: i32, found: usize, minimum: usize },

    /// The hotel row carries no review URL to scrape
    #[error("hotel {0} has no review URL")]
    MissingReviewUrl(i32),

    /// The review page yielded too little text to analyze
    #[error("hotel {0} review page yielded no usable content")]
    EmptyScrape(i32),

    /// The Data API gateway rejected a request
    #[error("Data API error: {0}")]
    DataApi(String),

    /// File output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<data_model_yado::db::PoolError> for GenError {
    fn from(error: data_model_yado::db::PoolError) -> Self {
        GenError::Pool(format!("{:?}", error))
    }
}

impl From<data_model_yado::db::ConnectionPoolError> for GenError {
    fn from(error: data_model_yado::db::ConnectionPoolError) -> Self {
        GenError::Pool(error.to_string())
    }
}

/// Type alias for Result with GenError
pub type Result<T> = std::result::Result<T, GenError>;
