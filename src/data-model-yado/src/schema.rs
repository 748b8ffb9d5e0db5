diesel::table! {
    hotels (hotel_no) {
        hotel_no -> Integer,
        hotel_name -> Varchar,
        hotel_special -> Nullable<Text>,
        user_review -> Nullable<Text>,
        review_average -> Nullable<Double>,
        review_count -> Nullable<Integer>,
        review_url -> Nullable<Varchar>,
        hotel_image_url -> Nullable<Varchar>,
        room_image_url -> Nullable<Varchar>,
        address1 -> Nullable<Varchar>,
        address2 -> Nullable<Varchar>,
        access -> Nullable<Text>,
        rakuten_area_code -> Nullable<Varchar>,
    }
}

diesel::table! {
    page_data (id) {
        id -> Integer,
        page_title -> Varchar,
        url_slug -> Varchar,
        theme_id -> Integer,
        rakuten_area_code -> Varchar,
        rakuten_area_name -> Varchar,
        rakuten_prefecture -> Nullable<Varchar>,
        author_id -> Nullable<Integer>,
        hero_image_url -> Nullable<Varchar>,
        content -> Nullable<Text>,
        meta_description -> Nullable<Text>,
    }
}

diesel::table! {
    themes (id) {
        id -> Integer,
        theme_title -> Varchar,
        theme_slug -> Varchar,
        target_audience -> Nullable<Text>,
        content_tone -> Nullable<Text>,
        preferred_hotel_types -> Nullable<Text>,
        hotel_search_keywords -> Nullable<Text>,
        target_keywords -> Nullable<Text>,
    }
}

diesel::table! {
    authors (author_id) {
        author_id -> Integer,
        author_name -> Varchar,
        author_title -> Nullable<Varchar>,
        author_bio -> Nullable<Text>,
        author_image_url -> Nullable<Varchar>,
    }
}

diesel::table! {
    onsen_areas (rakuten_area_code) {
        rakuten_area_code -> Varchar,
        scenic_features -> Nullable<Text>,
        nearby_attractions -> Nullable<Text>,
        spring_quality_note -> Nullable<Text>,
    }
}

diesel::table! {
    articles (page_id) {
        page_id -> Integer,
        status -> Text,
        title -> Varchar,
        content -> Text,
        meta_description -> Nullable<Text>,
        seo_tags -> Nullable<Text>,
        word_count -> Integer,
        generated_at -> Timestamp,
    }
}

diesel::table! {
    hotel_review_analysis (hotel_id) {
        hotel_id -> Integer,
        analysis_json -> Text,
        updated_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    hotels,
    page_data,
    themes,
    authors,
    onsen_areas,
    articles,
    hotel_review_analysis,
);
