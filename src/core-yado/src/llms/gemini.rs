//! Gemini REST client (Google AI Studio, API-key auth).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::LlmProvider;
use crate::config::AppConfig;
use crate::errors::{GenError, Result};
use crate::fetch::RETRYABLE_STATUS;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 65_536,
            response_mime_type: None,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
    generation_config: GenerationConfig,
    max_retries: u32,
}

impl Gemini {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self> {
        // No request timeout here: long generations legitimately take minutes.
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            generation_config: GenerationConfig::default(),
            max_retries: config.max_retries,
        })
    }

    /// Switches the client to strict-JSON output (used for review analysis).
    pub fn json_output(mut self) -> Self {
        self.generation_config.response_mime_type = Some("application/json".to_string());
        self
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl LlmProvider for Gemini {
    async fn complete_prompt(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: &self.generation_config,
        };

        let mut attempt = 0u32;
        loop {
            let response = self
                .client
                .post(self.endpoint())
                .query(&[("key", self.api_key.as_str())])
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if RETRYABLE_STATUS.contains(&status.as_u16()) && attempt < self.max_retries {
                let wait = Duration::from_secs(1u64 << attempt);
                tracing::warn!(model = %self.model, %status, attempt, "retryable LLM status, backing off");
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GenError::LlmApi(format!("{status}: {body}")));
            }

            let parsed: GenerateResponse = response.json().await?;
            let text: String = parsed
                .candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
                .unwrap_or_default();

            if text.is_empty() {
                return Err(GenError::LlmEmptyResponse);
            }
            return Ok(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_serializes_camel_case() {
        let config = GenerationConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["topP"], 0.95);
        assert_eq!(json["topK"], 40);
        assert_eq!(json["maxOutputTokens"], 65_536);
        assert!(json.get("responseMimeType").is_none());
    }

    #[test]
    fn test_json_output_sets_mime_type() {
        let mut config = GenerationConfig::default();
        config.response_mime_type = Some("application/json".to_string());
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["responseMimeType"], "application/json");
    }

    #[test]
    fn test_response_parsing_concatenates_parts() {
        let raw = r#"{"candidates": [{"content": {"parts": [{"text": "前半"}, {"text": "後半"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(text, "前半後半");
    }

    #[test]
    fn test_empty_candidates_yield_empty_text() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_complete_prompt_live() {
        if !common_yado::is_env_set("GEMINI_API_KEY") {
            println!("[SKIP] GEMINI_API_KEY is not set");
            return;
        }

        let config = AppConfig::from_env().expect("GEMINI_API_KEY is set");
        let provider = Gemini::new(&config).expect("client builds");
        let response = provider
            .complete_prompt("温泉旅行の魅力を一文で教えてください。")
            .await
            .expect("live API call succeeds");
        assert!(!response.is_empty());
    }
}
