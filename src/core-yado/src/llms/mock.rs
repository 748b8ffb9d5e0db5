//! Configurable stand-in for the hosted model, for tests that need an
//! [`LlmProvider`] without network access.

use async_trait::async_trait;

use crate::errors::{GenError, Result};
use crate::llms::LlmProvider;

/// Canned-response provider. Responses are matched against the prompt in the
/// order they were registered; the first rule whose substring appears in the
/// prompt wins. With no matching rule, the fallback response is returned, and
/// with no fallback either the call errors.
pub struct MockLlmProvider {
    /// (prompt substring, canned response), checked in registration order.
    rules: Vec<(String, String)>,
    fallback: Option<String>,
    fail: bool,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: None,
            fail: false,
        }
    }

    /// A provider with one substring-triggered canned response.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let mut provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// A provider that answers every prompt with the same text.
    pub fn with_default(response: &str) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Some(response.to_string()),
            fail: false,
        }
    }

    /// A provider that fails every call, for exercising error paths.
    pub fn with_failure() -> Self {
        Self {
            rules: Vec::new(),
            fallback: None,
            fail: true,
        }
    }

    pub fn add_response(&mut self, prompt_contains: &str, response: &str) {
        self.rules.push((prompt_contains.to_string(), response.to_string()));
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete_prompt(&self, prompt: &str) -> Result<String> {
        if self.fail {
            return Err(GenError::LlmApi("mock provider configured to fail".to_string()));
        }

        if let Some((_, response)) = self.rules.iter().find(|(needle, _)| prompt.contains(needle)) {
            return Ok(response.clone());
        }

        self.fallback
            .clone()
            .ok_or_else(|| GenError::LlmApi("mock provider has no response for this prompt".to_string()))
    }
}

//
// Fixtures
//

/// A model response in the shape the article prompt asks for: markdown body
/// with placeholder tokens, then the meta-description and SEO-tag blocks.
pub fn sample_article_output() -> &'static str {
    "# 奥日光温泉で記念日を祝う宿\n\n\
静かな湖畔で、ふたりだけの時間を過ごしませんか。\n\n\
[AREA_CTA]\n\n\
## [HOTEL_LINK:山水館]\n\n\
[HOTEL_IMAGE:山水館]\n\n\
渓流沿いの露天風呂が自慢の宿です。\n\n\
[REVIEW_BLOCK:山水館]\n\n\
### ふたりで紡ぐ、宿の記憶\n\n\
湯けむりの向こうで妻がつぶやいた。「来てよかったね」「ああ、また来よう」ふたりの声が渓流の音に溶けていく。\n\n\
[CTA_BUTTON:山水館]\n\n\
[ACCESS_LINK:山水館]\n\n\
## まとめ\n\n\
「山水館」: 渓流露天と会席の宿。\n\n\
---\n\
【メタディスクリプション】\n\
奥日光で記念日を過ごせる露天風呂付きの宿を厳選紹介。\n\
---\n\
【SEOタグ】\n\
奥日光 温泉, 記念日, 露天風呂付き客室"
}

/// A model response in the shape the review-analysis prompt asks for.
pub fn sample_analysis_output() -> &'static str {
    r#"{
  "overall_summary": "渓流沿いの露天風呂と会席料理が高く評価される宿。",
  "positive_keywords": [{"word": "露天風呂", "count": 12, "context": "渓流の音を聞きながら入る露天が最高"}],
  "negative_keywords": [],
  "radar_chart_data": {"atmosphere": 4.6, "cleanliness": 4.3, "onsen_quality": 4.8, "meals": 4.5, "hospitality": 4.4},
  "persona_match": {"couple": {"score": 92, "reason": "静かで記念日向き"}},
  "trust_score": 88,
  "last_analyzed": "2025-11-01"
}"#
}
