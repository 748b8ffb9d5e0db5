use chrono::NaiveDateTime;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::mysql::{Mysql, MysqlValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Publication status of a generated article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum ArticleStatus {
    /// Generated but not yet published on the site
    Draft,
    /// Live on the site
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ArticleStatus::Draft),
            "published" => Some(ArticleStatus::Published),
            _ => None,
        }
    }
}

impl ToSql<Text, Mysql> for ArticleStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Mysql>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Mysql> for ArticleStatus {
    fn from_sql(bytes: MysqlValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        ArticleStatus::parse(raw).ok_or_else(|| "Unrecognized enum variant".into())
    }
}

// hotels table model (database representation)
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::hotels)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct Hotel {
    pub hotel_no: i32,
    pub hotel_name: String,
    pub hotel_special: Option<String>,
    pub user_review: Option<String>,
    pub review_average: Option<f64>,
    pub review_count: Option<i32>,
    pub review_url: Option<String>,
    pub hotel_image_url: Option<String>,
    pub room_image_url: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub access: Option<String>,
    pub rakuten_area_code: Option<String>,
}

impl Hotel {
    /// Full postal address, as far as the row carries one.
    pub fn full_address(&self) -> String {
        let mut address = String::new();
        if let Some(a1) = &self.address1 {
            address.push_str(a1);
        }
        if let Some(a2) = &self.address2 {
            address.push_str(a2);
        }
        address
    }
}

// page_data table model (database representation)
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::page_data)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct PageData {
    pub id: i32,
    pub page_title: String,
    pub url_slug: String,
    pub theme_id: i32,
    pub rakuten_area_code: String,
    pub rakuten_area_name: String,
    pub rakuten_prefecture: Option<String>,
    pub author_id: Option<i32>,
    pub hero_image_url: Option<String>,
    pub content: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::themes)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct Theme {
    pub id: i32,
    pub theme_title: String,
    pub theme_slug: String,
    pub target_audience: Option<String>,
    pub content_tone: Option<String>,
    pub preferred_hotel_types: Option<String>,
    pub hotel_search_keywords: Option<String>,
    pub target_keywords: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::authors)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct Author {
    pub author_id: i32,
    pub author_name: String,
    pub author_title: Option<String>,
    pub author_bio: Option<String>,
    pub author_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::onsen_areas)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct OnsenArea {
    pub rakuten_area_code: String,
    pub scenic_features: Option<String>,
    pub nearby_attractions: Option<String>,
    pub spring_quality_note: Option<String>,
}

// articles table model (database representation).
// Written with REPLACE semantics: one row per page, last write wins.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::articles)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct Article {
    pub page_id: i32,
    pub status: ArticleStatus,
    pub title: String,
    pub content: String,
    pub meta_description: Option<String>,
    pub seo_tags: Option<String>,
    pub word_count: i32,
    pub generated_at: NaiveDateTime,
}

// hotel_review_analysis table models. The JSON column holds one LLM-derived
// analysis per hotel; updated_at is maintained by the database.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::hotel_review_analysis)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct ReviewAnalysisRow {
    pub hotel_id: i32,
    pub analysis_json: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = crate::schema::hotel_review_analysis)]
pub struct NewReviewAnalysis {
    pub hotel_id: i32,
    pub analysis_json: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_status_round_trip() {
        for status in [ArticleStatus::Draft, ArticleStatus::Published] {
            assert_eq!(ArticleStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ArticleStatus::parse("archived"), None);
    }

    #[test]
    fn test_hotel_full_address() {
        let hotel = Hotel {
            hotel_no: 1234,
            hotel_name: "山水館".to_string(),
            hotel_special: None,
            user_review: None,
            review_average: None,
            review_count: None,
            review_url: None,
            hotel_image_url: None,
            room_image_url: None,
            address1: Some("栃木県".to_string()),
            address2: Some("日光市湯元100".to_string()),
            access: None,
            rakuten_area_code: None,
        };
        assert_eq!(hotel.full_address(), "栃木県日光市湯元100");

        let bare = Hotel {
            address1: None,
            address2: None,
            ..hotel
        };
        assert_eq!(bare.full_address(), "");
    }
}
