//! Normalization boundary for cached review-analysis payloads.
//!
//! Historically the `analysis_json` column holds either a bare JSON object or
//! a one-element array wrapping that object. Both shapes are accepted here,
//! exactly once, at the deserialization boundary; everything downstream only
//! ever sees the canonical [`AnalysisRecord`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One keyword surfaced by the review analysis, with how often it appeared
/// and a short supporting quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KeywordStat {
    pub word: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// How well the hotel fits one guest persona (couple, family, solo, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PersonaScore {
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub reason: String,
}

/// Per-axis scores used for the radar chart on hotel detail pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RadarChart {
    #[serde(default)]
    pub atmosphere: f64,
    #[serde(default)]
    pub cleanliness: f64,
    #[serde(default)]
    pub onsen_quality: f64,
    #[serde(default)]
    pub meals: f64,
    #[serde(default)]
    pub hospitality: f64,
}

/// Canonical shape of one hotel's cached review analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisRecord {
    #[serde(default)]
    pub overall_summary: String,
    #[serde(default)]
    pub positive_keywords: Vec<KeywordStat>,
    #[serde(default)]
    pub negative_keywords: Vec<KeywordStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radar_chart_data: Option<RadarChart>,
    #[serde(default)]
    pub persona_match: BTreeMap<String, PersonaScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_analyzed: Option<String>,
}

// Stored payloads are either a bare record or an array of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnalysisPayload {
    Many(Vec<AnalysisRecord>),
    One(AnalysisRecord),
}

/// Parses a stored analysis payload, normalizing both historical shapes to a
/// single record. An empty array yields `Ok(None)`; malformed JSON is an
/// error for the caller to log and skip.
pub fn parse_analysis(raw: &str) -> Result<Option<AnalysisRecord>, serde_json::Error> {
    let payload: AnalysisPayload = serde_json::from_str(raw)?;
    Ok(match payload {
        AnalysisPayload::Many(records) => records.into_iter().next(),
        AnalysisPayload::One(record) => Some(record),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE_OBJECT: &str = r#"{
        "overall_summary": "絶景の露天風呂が評判の宿。",
        "positive_keywords": [{"word": "絶景", "count": 10, "context": "露天風呂からの富士山が最高"}],
        "negative_keywords": [{"word": "Wi-Fi", "count": 3, "context": "部屋で繋がりにくい", "severity": "中"}],
        "persona_match": {"couple": {"score": 90, "reason": "記念日プランの満足度が高い"}},
        "trust_score": 85,
        "last_analyzed": "2025-11-01"
    }"#;

    #[test]
    fn test_parse_bare_object() {
        let record = parse_analysis(BARE_OBJECT).unwrap().unwrap();
        assert_eq!(record.overall_summary, "絶景の露天風呂が評判の宿。");
        assert_eq!(record.positive_keywords.len(), 1);
        assert_eq!(record.positive_keywords[0].word, "絶景");
        assert_eq!(record.negative_keywords[0].severity.as_deref(), Some("中"));
        assert_eq!(record.persona_match["couple"].score, 90);
        assert_eq!(record.trust_score, Some(85));
    }

    #[test]
    fn test_array_and_object_shapes_normalize_to_same_record() {
        let wrapped = format!("[{}]", BARE_OBJECT);
        let from_object = parse_analysis(BARE_OBJECT).unwrap().unwrap();
        let from_array = parse_analysis(&wrapped).unwrap().unwrap();
        assert_eq!(from_object, from_array);
    }

    #[test]
    fn test_multi_element_array_takes_first() {
        let raw = r#"[{"overall_summary": "first"}, {"overall_summary": "second"}]"#;
        let record = parse_analysis(raw).unwrap().unwrap();
        assert_eq!(record.overall_summary, "first");
    }

    #[test]
    fn test_empty_array_is_none() {
        assert_eq!(parse_analysis("[]").unwrap(), None);
    }

    #[test]
    fn test_missing_fields_default() {
        let record = parse_analysis(r#"{"overall_summary": "静かな宿"}"#).unwrap().unwrap();
        assert!(record.positive_keywords.is_empty());
        assert!(record.persona_match.is_empty());
        assert_eq!(record.trust_score, None);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse_analysis("not json at all").is_err());
    }

    #[test]
    fn test_serialized_record_round_trips() {
        let record = parse_analysis(BARE_OBJECT).unwrap().unwrap();
        let serialized = serde_json::to_string(&record).unwrap();
        let reparsed = parse_analysis(&serialized).unwrap().unwrap();
        assert_eq!(record, reparsed);
    }
}
