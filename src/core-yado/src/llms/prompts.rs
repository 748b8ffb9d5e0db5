use std::collections::HashMap;

use data_model_yado::analysis::AnalysisRecord;
use data_model_yado::models::Hotel;
use indoc::indoc;
use serde_json::json;
use subst::substitute;

use crate::errors::Result;
use crate::persona::Persona;

const ARTICLE_PROMPT: &str = indoc! { "
  あなたは温泉旅行を専門とするプロのトラベルライターです。
  以下の条件で、${ONSEN_AREA}の宿を紹介する記事を日本語のMarkdownで執筆してください。

  【テーマ】
  ${THEME_TITLE}

  【読者ペルソナ】
  ${PERSONA_DESCRIPTION}
  本文では読者を「${PERSONA_KEYWORD}」と呼びかけてください。
  記事全体のコンセプト: ${CONCEPT}

  【地域情報】
  ${AREA_HIGHLIGHTS}

  【候補の宿データ】
  以下のJSONは候補となる宿の一覧です（1行1軒）。この中から記事にふさわしい宿を最大${TARGET_COUNT}軒選んでください。
  ここに無い宿を創作してはいけません。
  ${CANDIDATE_HOTELS}

  【記事の構成】
  1. タイトル（# で始まる見出し1行。地名とテーマを必ず含める）
  2. 導入文（読者の悩みに共感し、記事を読む価値を伝える。導入文の直後に [AREA_CTA] を1つ置く）
  3. 各宿の紹介セクション（## [HOTEL_LINK:宿名] の見出しで始める）
     - 見出し直後に [HOTEL_IMAGE:宿名]
     - 宿の魅力を具体的に（お風呂、食事、部屋、サービス）
     - [REVIEW_BLOCK:宿名] を1つ
     - 「### ふたりで紡ぐ、宿の記憶」として、その宿で過ごすふたりの情景を
       短い会話（「」の会話文）を交えた物語風に描く
     - 最後に [CTA_BUTTON:宿名] と [ACCESS_LINK:宿名]
  4. ## まとめ（紹介した宿を一言ずつ振り返る）

  【プレースホルダーの規則】
  [HOTEL_LINK:宿名] [HOTEL_IMAGE:宿名] [CTA_BUTTON:宿名] [ACCESS_LINK:宿名] [REVIEW_BLOCK:宿名] [AREA_CTA]
  は後工程で実データに置換されます。宿名は候補データのhotel_nameと一字一句同じ表記で書いてください。

  【禁止事項】
  - 候補データに無い事実の創作（料金、泉質、設備など）
  - 「いかがでしたか」などの定型的な締め

  記事本文の後に、次の形式でメタ情報を出力してください:
  ---
  【メタディスクリプション】
  （120文字以内の検索結果向け要約）
  ---
  【SEOタグ】
  （カンマ区切りで5個前後）
"};

/// Builds the single-shot article prompt.
///
/// Every placeholder is always substituted; data the caller does not have
/// becomes the empty string rather than a leftover `${...}` marker.
///
/// # Errors
///
/// Returns an error if template substitution fails.
pub fn article_prompt(
    onsen_area: &str,
    theme_title: &str,
    persona: &Persona,
    candidates: &[Hotel],
    analyses: &HashMap<i32, AnalysisRecord>,
    area_highlights: &str,
    target_count: usize,
) -> Result<String> {
    let candidate_lines = candidates
        .iter()
        .map(|h| candidate_json(h, analyses.get(&h.hotel_no)))
        .collect::<Vec<_>>()
        .join("\n");

    let mut vars = HashMap::new();
    vars.insert("ONSEN_AREA".to_string(), onsen_area.to_string());
    vars.insert("THEME_TITLE".to_string(), theme_title.to_string());
    vars.insert("PERSONA_DESCRIPTION".to_string(), persona.description.clone());
    vars.insert("PERSONA_KEYWORD".to_string(), persona.keyword.clone());
    vars.insert("CONCEPT".to_string(), persona.concept.clone());
    vars.insert("AREA_HIGHLIGHTS".to_string(), area_highlights.to_string());
    vars.insert("TARGET_COUNT".to_string(), target_count.to_string());
    vars.insert("CANDIDATE_HOTELS".to_string(), candidate_lines);

    Ok(substitute(ARTICLE_PROMPT, &vars)?)
}

// One candidate per line keeps the prompt diffable and the token cost visible.
fn candidate_json(hotel: &Hotel, analysis: Option<&AnalysisRecord>) -> String {
    let value = json!({
        "hotel_no": hotel.hotel_no,
        "hotel_name": hotel.hotel_name,
        "hotel_special": hotel.hotel_special.as_deref().unwrap_or(""),
        "review_average": hotel.review_average.unwrap_or(0.0),
        "review_count": hotel.review_count.unwrap_or(0),
        "address": hotel.full_address(),
        "access": hotel.access.as_deref().unwrap_or(""),
        "review_summary": analysis.map(|a| a.overall_summary.as_str()).unwrap_or(""),
    });
    value.to_string()
}

const REVIEW_ANALYSIS_PROMPT: &str = indoc! { "
  あなたはプロのトラベルライター兼データアナリストです。
  以下の宿泊施設の口コミ（最新のもの）を深く分析し、
  宿泊検討者が「知りたいこと」を客観的かつ魅力的にまとめてください。

  【基本情報】
  旅館名: ${HOTEL_NAME}
  ソースURL: ${SOURCE_URL}

  【口コミデータ】
  ${REVIEWS}

  【分析タスク】
  以下のJSONフォーマットで出力してください。全ての項目を埋めてください。

  {
    \"overall_summary\": \"300文字程度の魅力的な要約。プロのライターが書いたような文章で。\",
    \"positive_keywords\": [
      {\"word\": \"絶景\", \"count\": 10, \"context\": \"露天風呂からの富士山が最高\"}
    ],
    \"negative_keywords\": [
      {\"word\": \"Wi-Fi\", \"count\": 3, \"context\": \"部屋で繋がりにくい\", \"severity\": \"中\"}
    ],
    \"radar_chart_data\": {
      \"atmosphere\": 4.5,
      \"cleanliness\": 4.2,
      \"onsen_quality\": 4.8,
      \"meals\": 4.6,
      \"hospitality\": 4.7
    },
    \"persona_match\": {
      \"couple\": {\"score\": 90, \"reason\": \"記念日プランの満足度が高い\"},
      \"family\": {\"score\": 70, \"reason\": \"子供向け設備は少ないが大人は満足\"},
      \"solo\": {\"score\": 80, \"reason\": \"一人でも気兼ねなく過ごせる\"}
    },
    \"trust_score\": 85,
    \"last_analyzed\": \"${TODAY}\"
  }
"};

/// Builds the per-hotel review analysis prompt (strict-JSON output).
///
/// # Errors
///
/// Returns an error if template substitution fails.
pub fn review_analysis_prompt(hotel_name: &str, source_url: &str, reviews: &str) -> Result<String> {
    let mut vars = HashMap::new();
    vars.insert("HOTEL_NAME".to_string(), hotel_name.to_string());
    vars.insert("SOURCE_URL".to_string(), source_url.to_string());
    vars.insert("REVIEWS".to_string(), reviews.to_string());
    vars.insert("TODAY".to_string(), chrono::Local::now().format("%Y-%m-%d").to_string());

    Ok(substitute(REVIEW_ANALYSIS_PROMPT, &vars)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(no: i32, name: &str) -> Hotel {
        Hotel {
            hotel_no: no,
            hotel_name: name.to_string(),
            hotel_special: Some("渓流沿いの露天風呂".to_string()),
            user_review: None,
            review_average: Some(4.5),
            review_count: Some(120),
            review_url: None,
            hotel_image_url: None,
            room_image_url: None,
            address1: Some("栃木県".to_string()),
            address2: Some("日光市".to_string()),
            access: Some("東武日光駅からバス90分".to_string()),
            rakuten_area_code: None,
        }
    }

    fn persona() -> Persona {
        Persona {
            description: "結婚記念日を祝う夫婦".to_string(),
            keyword: "夫婦".to_string(),
            concept: "ふたりの時間を紡ぐ旅".to_string(),
        }
    }

    #[test]
    fn test_article_prompt_substitutes_everything() {
        let candidates = vec![hotel(101, "山水館"), hotel(102, "湯の宿 花菱")];
        let mut analyses = HashMap::new();
        analyses.insert(
            101,
            AnalysisRecord {
                overall_summary: "絶景の露天風呂が評判。".to_string(),
                ..Default::default()
            },
        );

        let prompt = article_prompt("奥日光温泉", "記念日の宿", &persona(), &candidates, &analyses, "", 10).unwrap();

        assert!(prompt.contains("奥日光温泉"));
        assert!(prompt.contains("記念日の宿"));
        assert!(prompt.contains("\"hotel_name\":\"山水館\""));
        assert!(prompt.contains("絶景の露天風呂が評判。"));
        assert!(prompt.contains("最大10軒"));
        assert!(!prompt.contains("${"));
    }

    #[test]
    fn test_article_prompt_one_candidate_per_line() {
        let candidates = vec![hotel(101, "山水館"), hotel(102, "湯の宿 花菱")];
        let prompt = article_prompt("奥日光温泉", "記念日の宿", &persona(), &candidates, &HashMap::new(), "", 7).unwrap();
        let json_lines: Vec<&str> = prompt.lines().filter(|l| l.trim_start().starts_with('{')).collect();
        // The analysis-format skeleton is not part of this template, so the
        // only JSON lines are the two candidates.
        assert_eq!(json_lines.len(), 2);
    }

    #[test]
    fn test_review_analysis_prompt_substitutes_everything() {
        let prompt = review_analysis_prompt(
            "山水館",
            "https://review.travel.rakuten.co.jp/hotel/voice/13462/",
            "- 露天風呂が最高でした。\n\n- 食事が絶品。\n\n",
        )
        .unwrap();

        assert!(prompt.contains("旅館名: 山水館"));
        assert!(prompt.contains("voice/13462"));
        assert!(prompt.contains("露天風呂が最高でした"));
        assert!(prompt.contains("\"overall_summary\""));
        assert!(!prompt.contains("${"));
    }
}
