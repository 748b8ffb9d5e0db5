pub mod gemini;
pub mod mock;
pub mod prompts;

use async_trait::async_trait;
use regex::Regex;

pub use gemini::Gemini;
pub use mock::MockLlmProvider;

use crate::errors::Result;

/// Interface to a hosted LLM that lets us complete a prompt and await a response.
#[async_trait]
pub trait LlmProvider {
    async fn complete_prompt(&self, prompt: &str) -> Result<String>;
}

/// Literal marker the model is instructed to emit before the meta description.
pub const META_DESCRIPTION_MARKER: &str = "【メタディスクリプション】";
/// Literal marker the model is instructed to emit before the SEO tag list.
pub const SEO_TAGS_MARKER: &str = "【SEOタグ】";

/// A raw model response split into its structured parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArticle {
    /// Article body with the trailing meta block removed
    pub content: String,
    pub meta_description: String,
    pub seo_tags: Vec<String>,
    /// Hotel names the model chose, in order of first appearance
    pub selected_hotels: Vec<String>,
    pub raw_output: String,
}

/// Sends the prompt and splits the response into its structured parts.
pub async fn generate_article<P: LlmProvider>(provider: &P, prompt: &str) -> Result<GeneratedArticle> {
    let raw = provider.complete_prompt(prompt).await?;
    Ok(split_generated(&raw))
}

/// Splits a raw model response by literal marker search.
///
/// The output format is only as stable as the prompt makes it: missing
/// markers simply yield empty fields, never an error.
pub fn split_generated(raw: &str) -> GeneratedArticle {
    let meta_description = raw
        .split_once(META_DESCRIPTION_MARKER)
        .map(|(_, after)| after.split("---").next().unwrap_or("").trim().to_string())
        .unwrap_or_default();

    let seo_tags = raw
        .split_once(SEO_TAGS_MARKER)
        .map(|(_, after)| {
            after
                .trim()
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let selected_hotels = selected_hotel_names(raw);

    let mut content = raw
        .split_once(META_DESCRIPTION_MARKER)
        .map(|(before, _)| before)
        .unwrap_or(raw)
        .trim_end()
        .to_string();
    if let Some(stripped) = content.strip_suffix("---") {
        content = stripped.trim_end().to_string();
    }

    GeneratedArticle {
        content,
        meta_description,
        seo_tags,
        selected_hotels,
        raw_output: raw.to_string(),
    }
}

/// Hotel names referenced by `[HOTEL_LINK:...]` tokens, deduplicated with the
/// first-appearance order preserved.
pub fn selected_hotel_names(raw: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r"\[HOTEL_LINK:(.+?)\]") else {
        return Vec::new();
    };
    let mut names: Vec<String> = Vec::new();
    for caps in re.captures_iter(raw) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "はい、承知いたしました。\n\n# 奥日光の露天風呂付き客室7選\n\n\
[HOTEL_LINK:山水館]は渓流沿いの宿。\n[HOTEL_LINK:湯の宿 花菱]も人気です。\n\
[HOTEL_LINK:山水館]のアクセスは良好。\n\n## まとめ\n\n---\n\
【メタディスクリプション】\n奥日光で露天風呂付き客室を楽しめる宿を厳選紹介。\n---\n\
【SEOタグ】\n奥日光 温泉, 露天風呂付き客室, 記念日旅行";

    #[test]
    fn test_split_extracts_meta_description() {
        let generated = split_generated(RAW);
        assert_eq!(generated.meta_description, "奥日光で露天風呂付き客室を楽しめる宿を厳選紹介。");
    }

    #[test]
    fn test_split_extracts_seo_tags() {
        let generated = split_generated(RAW);
        assert_eq!(generated.seo_tags, vec!["奥日光 温泉", "露天風呂付き客室", "記念日旅行"]);
    }

    #[test]
    fn test_split_dedups_selected_hotels_in_order() {
        let generated = split_generated(RAW);
        assert_eq!(generated.selected_hotels, vec!["山水館", "湯の宿 花菱"]);
    }

    #[test]
    fn test_split_strips_meta_block_and_trailing_rule_from_content() {
        let generated = split_generated(RAW);
        assert!(generated.content.ends_with("## まとめ"));
        assert!(!generated.content.contains(META_DESCRIPTION_MARKER));
    }

    #[test]
    fn test_split_without_markers() {
        let generated = split_generated("# タイトル\n\n本文のみ。");
        assert_eq!(generated.content, "# タイトル\n\n本文のみ。");
        assert!(generated.meta_description.is_empty());
        assert!(generated.seo_tags.is_empty());
        assert!(generated.selected_hotels.is_empty());
    }

    #[tokio::test]
    async fn test_generate_article_with_mock_provider() {
        let provider = mock::MockLlmProvider::with_default(mock::sample_article_output());
        let generated = generate_article(&provider, "記事を執筆してください").await.unwrap();

        assert_eq!(generated.selected_hotels, vec!["山水館"]);
        assert!(generated.content.starts_with("# 奥日光温泉で記念日を祝う宿"));
        assert!(!generated.meta_description.is_empty());
        assert_eq!(generated.seo_tags.len(), 3);
    }
}
