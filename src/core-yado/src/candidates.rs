//! Candidate hotel filtering and confidence-score ranking.

use data_model_yado::models::Hotel;

use crate::config::SelectionConfig;

/// Composite confidence score: rating weighted by review volume.
/// A hotel with zero reviews is scored as if it had one, so the log term is
/// always defined.
pub fn confidence_score(review_average: f64, review_count: i64) -> f64 {
    review_average * (1.0 + (review_count.max(1) as f64).log10() / 3.0)
}

#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    pub min_review_count: i32,
    pub min_review_average: f64,
    pub min_special_len: usize,
    /// Theme keywords; a hotel qualifies if its name or special-feature text
    /// contains any of them. Empty means no keyword restriction.
    pub keywords: Vec<String>,
}

impl CandidateFilter {
    pub fn from_selection(selection: &SelectionConfig, keywords: Vec<String>) -> Self {
        Self {
            min_review_count: selection.min_review_count,
            min_review_average: selection.min_review_average,
            min_special_len: selection.min_special_len,
            keywords,
        }
    }
}

/// Splits a comma-separated keyword column into trimmed, non-empty keywords.
pub fn split_keywords(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn matches_filter(hotel: &Hotel, filter: &CandidateFilter) -> bool {
    let Some(special) = hotel.hotel_special.as_deref() else {
        return false;
    };
    if special.chars().count() < filter.min_special_len {
        return false;
    }
    if hotel.review_count.unwrap_or(0) < filter.min_review_count {
        return false;
    }
    if hotel.review_average.unwrap_or(0.0) < filter.min_review_average {
        return false;
    }
    if filter.keywords.is_empty() {
        return true;
    }
    filter
        .keywords
        .iter()
        .any(|k| hotel.hotel_name.contains(k.as_str()) || special.contains(k.as_str()))
}

/// Orders candidates by descending confidence score and truncates to `limit`.
/// The sort is stable: hotels with equal scores keep their query order.
pub fn rank_candidates(mut hotels: Vec<Hotel>, limit: usize) -> Vec<Hotel> {
    hotels.sort_by(|a, b| hotel_score(b).total_cmp(&hotel_score(a)));
    hotels.truncate(limit);
    hotels
}

fn hotel_score(hotel: &Hotel) -> f64 {
    confidence_score(
        hotel.review_average.unwrap_or(0.0),
        hotel.review_count.unwrap_or(0) as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(no: i32, name: &str, average: f64, count: i32) -> Hotel {
        Hotel {
            hotel_no: no,
            hotel_name: name.to_string(),
            hotel_special: Some("貸切露天風呂と季節の会席料理が自慢の宿。全客室から渓流を望み、静かな大人の時間を過ごせます。".to_string()),
            user_review: None,
            review_average: Some(average),
            review_count: Some(count),
            review_url: None,
            hotel_image_url: None,
            room_image_url: None,
            address1: None,
            address2: None,
            access: None,
            rakuten_area_code: Some("nikko".to_string()),
        }
    }

    #[test]
    fn test_zero_reviews_scores_like_one_review() {
        // log10 must never see zero.
        let zero = confidence_score(4.0, 0);
        let one = confidence_score(4.0, 1);
        assert!(zero.is_finite());
        assert_eq!(zero, one);
        assert_eq!(zero, 4.0);
    }

    #[test]
    fn test_score_grows_with_review_volume() {
        let few = confidence_score(4.5, 10);
        let many = confidence_score(4.5, 1000);
        assert!(many > few);
        // 4.5 * (1 + 3/3) at 1000 reviews
        assert!((many - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let hotels = vec![
            hotel(1, "A", 4.0, 100),
            hotel(2, "B", 4.8, 100),
            hotel(3, "C", 4.0, 100), // same score as A, must stay after it
            hotel(4, "D", 3.6, 0),
        ];
        let ranked = rank_candidates(hotels, 10);
        let names: Vec<&str> = ranked.iter().map(|h| h.hotel_name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let hotels = vec![hotel(1, "A", 4.0, 10), hotel(2, "B", 4.5, 10), hotel(3, "C", 3.9, 10)];
        assert_eq!(rank_candidates(hotels, 2).len(), 2);
    }

    #[test]
    fn test_filter_requires_special_text() {
        let filter = CandidateFilter {
            min_review_count: 10,
            min_review_average: 3.5,
            min_special_len: 50,
            keywords: vec![],
        };
        let mut h = hotel(1, "A", 4.2, 50);
        assert!(matches_filter(&h, &filter));

        h.hotel_special = Some("短い".to_string());
        assert!(!matches_filter(&h, &filter));

        h.hotel_special = None;
        assert!(!matches_filter(&h, &filter));
    }

    #[test]
    fn test_filter_keywords_match_name_or_special() {
        let filter = CandidateFilter {
            min_review_count: 0,
            min_review_average: 0.0,
            min_special_len: 0,
            keywords: vec!["露天風呂".to_string(), "離れ".to_string()],
        };
        let h = hotel(1, "渓谷の湯宿", 4.2, 50);
        assert!(matches_filter(&h, &filter)); // special text mentions 露天風呂

        let mut miss = hotel(2, "ビジネスホテル駅前", 4.0, 200);
        miss.hotel_special = Some("駅徒歩1分。シングルルーム中心の素泊まり向けホテルです。朝食バイキングあり、チェックイン24時まで対応。".to_string());
        assert!(!matches_filter(&miss, &filter));
    }

    #[test]
    fn test_split_keywords() {
        assert_eq!(
            split_keywords(Some("露天風呂, 離れ ,,貸切")),
            vec!["露天風呂", "離れ", "貸切"]
        );
        assert!(split_keywords(None).is_empty());
    }
}
