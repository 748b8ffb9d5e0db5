//! HTTP Data API gateway client (basic auth, JSON), the write path used when
//! a direct database connection is unavailable.

use serde_json::{Value, json};

use crate::config::DataApiConfig;
use crate::errors::{GenError, Result};

pub struct DataApiClient {
    base_url: String,
    user: String,
    password: String,
    client: reqwest::Client,
}

impl DataApiClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &DataApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
            client,
        })
    }

    /// Fetches rows from a named endpoint. The gateway wraps result sets as
    /// `{"data": {"rows": [...]}}`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn rows(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Vec<Value>> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenError::DataApi(format!("{endpoint}: {status}: {body}")));
        }

        let value: Value = response.json().await?;
        Ok(rows_from_payload(value))
    }

    /// Saves generated page content through the gateway.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn save_page_content(&self, page_id: i32, content: &str) -> Result<()> {
        let url = format!("{}/save_page_content", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&json!({ "page_id": page_id, "content": content }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenError::DataApi(format!("save_page_content: {status}: {body}")));
        }
        tracing::info!(page_id, "page content saved via Data API");
        Ok(())
    }
}

fn rows_from_payload(value: Value) -> Vec<Value> {
    value
        .pointer("/data/rows")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
