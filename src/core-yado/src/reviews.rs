//! Review page scraping: URL rewriting, fragment extraction, and the
//! raw-text fallback used when the expected DOM structure is absent.

use regex::Regex;
use scraper::{Html, Selector};

use crate::fetch::HttpFetcher;

/// How many review elements are extracted per page.
pub const MAX_REVIEW_FRAGMENTS: usize = 20;

/// Character budget for the whole-page fallback dump.
pub const FALLBACK_CHAR_BUDGET: usize = 10_000;

/// Count value marking that structured extraction failed and the text is a
/// truncated whole-page dump instead.
pub const RAW_DUMP_COUNT: i32 = -1;

/// Scraped review text for one hotel, plus how it was obtained.
/// `count` is the number of extracted review fragments, [`RAW_DUMP_COUNT`]
/// for the fallback path, or 0 when nothing could be fetched.
#[derive(Debug, Clone)]
pub struct ReviewScrape {
    pub text: String,
    pub source_url: String,
    pub count: i32,
}

impl ReviewScrape {
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.text.trim().is_empty()
    }
}

/// Rewrites image-API URLs (`img.travel.rakuten.co.jp/...?...hotel_no=N`) to
/// the hotel's review page. Other URLs pass through unchanged.
pub fn review_page_url(raw: &str) -> String {
    if raw.contains("img.travel.rakuten.co.jp") {
        if let Some(caps) = Regex::new(r"hotel_no=(\d+)").ok().and_then(|re| re.captures(raw)) {
            return format!("https://review.travel.rakuten.co.jp/hotel/voice/{}/", &caps[1]);
        }
    }
    raw.to_string()
}

/// Extracts review text from a review page.
///
/// Takes the first `max_fragments` review elements (`dl.commentRep`) and
/// formats each as a `- ...` bullet. When the page carries none of the
/// expected elements, falls back to the whole page's text truncated to
/// `fallback_budget` characters, with [`RAW_DUMP_COUNT`] as the count.
pub fn extract_reviews(html: &str, max_fragments: usize, fallback_budget: usize) -> (String, i32) {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("dl.commentRep") else {
        return (String::new(), 0);
    };

    let mut text = String::new();
    let mut count = 0i32;
    for element in document.select(&selector).take(max_fragments) {
        let fragment = element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("");
        text.push_str("- ");
        text.push_str(&fragment);
        text.push_str("\n\n");
        count += 1;
    }

    if count == 0 {
        let whole = document
            .root_element()
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("");
        text = whole.chars().take(fallback_budget).collect();
        count = RAW_DUMP_COUNT;
    }

    (text, count)
}

/// Fetches and extracts a hotel's review page. Transient 429/5xx responses
/// are retried by the fetcher; beyond that this never errors: any network or
/// parse failure yields the empty sentinel (`text: "", count: 0`) so the
/// caller treats the unit as skipped.
pub async fn fetch_review_content(fetcher: &HttpFetcher, url: &str) -> ReviewScrape {
    let target = review_page_url(url);
    match fetcher.get_text_with_retry(&target).await {
        Ok(html) => {
            let (text, count) = extract_reviews(&html, MAX_REVIEW_FRAGMENTS, FALLBACK_CHAR_BUDGET);
            ReviewScrape {
                text,
                source_url: target,
                count,
            }
        }
        Err(e) => {
            tracing::warn!(url = %target, error = %e, "review page fetch failed");
            ReviewScrape {
                text: String::new(),
                source_url: target,
                count: 0,
            }
        }
    }
}
