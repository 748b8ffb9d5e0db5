//! Persona derivation from theme rows.
//!
//! Themes carry free-text audience descriptions and keyword lists; the prompt
//! wants one stable audience keyword plus a tone concept.

use data_model_yado::models::Theme;

// Checked in priority order against the theme's keyword list.
const AUDIENCE_KEYWORDS: &[&str] = &[
    "50代夫婦",
    "40代夫婦",
    "60代夫婦",
    "70代夫婦",
    "シニア夫婦",
    "カップル",
    "夫婦",
    "女子旅",
    "一人旅",
    "家族",
];

// Fallback scan of the theme title / audience text, most specific first.
const TITLE_FALLBACKS: &[(&str, &str)] = &[
    ("50代", "50代夫婦"),
    ("40代", "40代夫婦"),
    ("60代", "60代夫婦"),
    ("70代", "70代夫婦"),
    ("シニア", "シニア夫婦"),
    ("夫婦", "夫婦"),
    ("カップル", "カップル"),
];

const DEFAULT_KEYWORD: &str = "方";
const DEFAULT_CONCEPT: &str = "ふたりの時間を紡ぐ旅";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub description: String,
    pub keyword: String,
    pub concept: String,
}

pub fn build_persona(theme: &Theme) -> Persona {
    let audience_text = theme.target_audience.as_deref().unwrap_or("");
    let target_keywords = theme.target_keywords.as_deref().unwrap_or("");

    let keyword = keyword_from_list(target_keywords)
        .or_else(|| keyword_from_text(&theme.theme_title, audience_text))
        .unwrap_or_else(|| DEFAULT_KEYWORD.to_string());

    let description = if audience_text.is_empty() {
        format!("{keyword}向けの上質な温泉旅行")
    } else {
        audience_text.to_string()
    };

    Persona {
        description,
        keyword,
        concept: theme
            .content_tone
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CONCEPT.to_string()),
    }
}

fn keyword_from_list(target_keywords: &str) -> Option<String> {
    if target_keywords.is_empty() {
        return None;
    }
    let keywords: Vec<&str> = target_keywords.split(',').map(str::trim).filter(|k| !k.is_empty()).collect();
    for candidate in AUDIENCE_KEYWORDS {
        if keywords.contains(candidate) {
            return Some((*candidate).to_string());
        }
    }
    // Nothing from the priority list; the last keyword is the most specific.
    keywords.last().map(|k| (*k).to_string())
}

fn keyword_from_text(theme_title: &str, audience_text: &str) -> Option<String> {
    TITLE_FALLBACKS
        .iter()
        .find(|(marker, _)| theme_title.contains(marker) || audience_text.contains(marker))
        .map(|(_, keyword)| (*keyword).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(title: &str, audience: Option<&str>, keywords: Option<&str>, tone: Option<&str>) -> Theme {
        Theme {
            id: 1,
            theme_title: title.to_string(),
            theme_slug: "slug".to_string(),
            target_audience: audience.map(str::to_string),
            content_tone: tone.map(str::to_string),
            preferred_hotel_types: None,
            hotel_search_keywords: None,
            target_keywords: keywords.map(str::to_string),
        }
    }

    #[test]
    fn test_priority_keyword_wins_over_list_order() {
        let t = theme("記念日の宿", None, Some("温泉, 50代夫婦, 露天風呂"), None);
        let persona = build_persona(&t);
        assert_eq!(persona.keyword, "50代夫婦");
    }

    #[test]
    fn test_unmatched_list_uses_last_keyword() {
        let t = theme("記念日の宿", None, Some("温泉, 絶景"), None);
        assert_eq!(build_persona(&t).keyword, "絶景");
    }

    #[test]
    fn test_title_fallback() {
        let t = theme("60代からの温泉旅", None, None, None);
        assert_eq!(build_persona(&t).keyword, "60代夫婦");
    }

    #[test]
    fn test_generic_default() {
        let t = theme("絶景の温泉宿", None, None, None);
        let persona = build_persona(&t);
        assert_eq!(persona.keyword, "方");
        assert_eq!(persona.description, "方向けの上質な温泉旅行");
        assert_eq!(persona.concept, DEFAULT_CONCEPT);
    }

    #[test]
    fn test_audience_text_kept_as_description() {
        let t = theme("記念日の宿", Some("結婚記念日を祝う夫婦"), None, Some("静かで上質"));
        let persona = build_persona(&t);
        assert_eq!(persona.description, "結婚記念日を祝う夫婦");
        assert_eq!(persona.keyword, "夫婦");
        assert_eq!(persona.concept, "静かで上質");
    }
}
