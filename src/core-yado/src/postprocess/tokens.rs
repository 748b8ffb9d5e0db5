//! Bracket-token replacement: `[HOTEL_LINK:x]`, `[HOTEL_IMAGE:x]`,
//! `[CTA_BUTTON:x]`, `[ACCESS_LINK:x]`, `[REVIEW_BLOCK:x]`, `[AREA_CTA]`.
//!
//! Tokens are consumed by replacement, so every stage here is idempotent.
//! An entity that cannot be resolved by exact name match degrades to plain
//! text or an empty string, never an error.

use regex::{Captures, Regex};

use super::PostProcessor;

fn replace_token(text: &str, pattern: &str, f: impl Fn(&str) -> String) -> String {
    let Ok(re) = Regex::new(pattern) else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures| f(&caps[1])).into_owned()
}

pub(super) fn hotel_links(ctx: &PostProcessor, text: &str) -> String {
    replace_token(text, r"\[HOTEL_LINK:(.+?)\]", |name| match ctx.hotels.get(name) {
        Some(hotel) => {
            let url = ctx.booking_url(hotel);
            format!(r#"<a href="{url}" target="_blank" rel="noopener" class="hotel-name-link">{name}</a>"#)
        }
        None => name.to_string(),
    })
}

pub(super) fn hotel_images(ctx: &PostProcessor, text: &str) -> String {
    replace_token(text, r"\[HOTEL_IMAGE:(.+?)\]", |name| {
        let image_url = ctx.hotels.get(name).and_then(|h| h.hotel_image_url.as_deref());
        match image_url {
            Some(url) if !url.is_empty() => format!(
                "\n\n<figure class=\"hotel-image\" style=\"width:100%; max-width:800px; margin:20px auto;\">\
                 <img src=\"{url}\" alt=\"{name}の外観\" style=\"width:100%; height:400px; object-fit:cover; border-radius:12px; display:block;\">\
                 <figcaption style=\"text-align:center; margin-top:8px;\"><small>画像提供: 楽天トラベル</small></figcaption>\
                 </figure>\n\n"
            ),
            _ => String::new(),
        }
    })
}

pub(super) fn cta_buttons(ctx: &PostProcessor, text: &str) -> String {
    replace_token(text, r"\[CTA_BUTTON:(.+?)\]", |name| match ctx.hotels.get(name) {
        Some(hotel) => {
            let url = ctx.booking_url(hotel);
            format!(
                "\n\n<div class=\"cta-container\" style=\"text-align:center; margin:30px 0;\">\
                 <a href=\"{url}\" target=\"_blank\" rel=\"noopener\" class=\"cta-button\" \
                 style=\"display:inline-block; background:linear-gradient(135deg, #667eea 0%, #764ba2 100%); color:white; \
                 padding:16px 32px; border-radius:30px; text-decoration:none; font-weight:bold; font-size:1.1em; \
                 box-shadow:0 4px 15px rgba(102,126,234,0.4);\">\
                 【楽天トラベル】空室・最安値をチェック ➜\
                 </a></div>\n\n"
            )
        }
        None => format!("<p><strong>{name}の詳細はこちら</strong></p>"),
    })
}

pub(super) fn access_links(ctx: &PostProcessor, text: &str) -> String {
    replace_token(text, r"\[ACCESS_LINK:(.+?)\]", |name| match ctx.hotels.get(name) {
        Some(hotel) => {
            let url = ctx.booking_url(hotel);
            format!(r#"<a href="{url}" target="_blank" rel="noopener" class="access-link">📍 {name}の詳細・予約はこちら</a>"#)
        }
        None => String::new(),
    })
}

pub(super) fn area_cta(ctx: &PostProcessor, text: &str) -> String {
    if !text.contains("[AREA_CTA]") {
        return text.to_string();
    }

    let area_name = if ctx.area_name.is_empty() {
        "この温泉地"
    } else {
        ctx.area_name.as_str()
    };

    let base_url = if ctx.affiliate.affiliate_id.is_empty() {
        "https://travel.rakuten.co.jp/".to_string()
    } else {
        format!("https://hb.afl.rakuten.co.jp/hgc/{}/", ctx.affiliate.affiliate_id)
    };

    let cta_html = format!(
        "\n\n<div style=\"background:linear-gradient(135deg, #f0f4ff 0%, #e8eeff 100%); padding:20px; \
         border-radius:12px; margin:30px 0; text-align:center; border:1px solid #d0d8f0;\">\
         <p style=\"margin:0 0 15px 0; font-size:0.95em; color:#555;\">すでに{area_name}への旅行を決めている方へ</p>\
         <a href=\"{base_url}\" target=\"_blank\" rel=\"noopener\" style=\"display:inline-block; \
         background:linear-gradient(135deg, #ff6b6b 0%, #ee5a5a 100%); color:white; padding:14px 28px; \
         border-radius:25px; text-decoration:none; font-weight:bold; font-size:1em; \
         box-shadow:0 4px 12px rgba(238,90,90,0.3);\">\
         楽天トラベルで{area_name}の露天風呂付き客室を探す →\
         </a></div>\n\n"
    );

    text.replace("[AREA_CTA]", &cta_html)
}

pub(super) fn review_blocks(ctx: &PostProcessor, text: &str) -> String {
    replace_token(text, r"\[REVIEW_BLOCK:(.+?)\]", |name| {
        ctx.hotels.get(name).map(|h| review_block_html(ctx, h)).unwrap_or_default()
    })
}

fn review_block_html(ctx: &PostProcessor, hotel: &data_model_yado::models::Hotel) -> String {
    let average = hotel.review_average.unwrap_or(0.0);
    let count = hotel.review_count.unwrap_or(0);
    if average <= 0.0 || count == 0 {
        return String::new();
    }

    let filled = (average as usize).min(5);
    let stars = format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled));

    let blockquote_html = hotel
        .user_review
        .as_deref()
        .filter(|raw| raw.chars().count() > 20)
        .map(clean_review_excerpt)
        .filter(|cleaned| cleaned.chars().count() > 20)
        .map(|cleaned| {
            let excerpt = if cleaned.chars().count() > 150 {
                format!("{}...", cleaned.chars().take(150).collect::<String>())
            } else {
                cleaned
            };
            format!(
                "<blockquote style=\"background:#fff; border-left:4px solid #f5a623; padding:15px 18px; \
                 margin:0 0 15px 0; border-radius:0 8px 8px 0; font-style:italic; color:#555; line-height:1.7;\">\
                 「{excerpt}」</blockquote>"
            )
        })
        .unwrap_or_default();

    let review_url = ctx.review_listing_url(hotel);
    let review_link_html = format!(
        "<div style=\"text-align:right; margin-top:10px;\">\
         <a href=\"{review_url}\" target=\"_blank\" rel=\"noopener\" \
         style=\"color:#667eea; font-size:0.9em; text-decoration:none;\">📖 この宿のレビュー全文はこちら →</a></div>"
    );

    format!(
        "\n\n<div class=\"review-block\" style=\"background:linear-gradient(135deg, #fff9e6 0%, #fff5d6 100%); \
         padding:15px 10px; border-radius:10px; margin:20px 0; border:1px solid #f0e6c8;\">\
         <div style=\"display:flex; align-items:center; gap:8px; margin-bottom:10px; padding-bottom:10px; \
         border-bottom:1px dashed #e8d9a8;\">\
         <span style=\"font-size:1.2em;\">💬</span>\
         <span style=\"font-weight:bold; color:#8b7355; font-size:0.9em;\">宿泊者が語る、この宿の魅力</span>\
         </div>\
         <div style=\"display:flex; align-items:center; gap:6px;\">\
         <span style=\"color:#f5a623; font-size:1em; letter-spacing:1px;\">{stars}</span>\
         <span style=\"font-weight:bold; color:#333; font-size:1em;\">{average}</span>\
         </div>\
         <div style=\"color:#666; font-size:0.85em; margin-bottom:12px;\">（{count}件のレビュー）</div>\
         {blockquote_html}{review_link_html}</div>\n\n"
    )
}

/// Strips HTML tags, timestamps, URLs, and review-site boilerplate from a raw
/// stored review so the excerpt reads as a clean quote.
pub(super) fn clean_review_excerpt(raw: &str) -> String {
    let mut cleaned = raw.to_string();
    let passes = [
        r"<[^>]+>",
        r"\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}投稿.*$",
        r"https?://\S+",
        r"(クチコミ|口コミ|レビュー)の詳細は(こちら|コチラ)から?",
    ];
    for pattern in passes {
        if let Ok(re) = Regex::new(pattern) {
            cleaned = re.replace_all(&cleaned, "").into_owned();
        }
    }
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::testing;

    #[test]
    fn test_hotel_link_known_entity_becomes_anchor() {
        let ctx = testing::context();
        let out = hotel_links(&ctx, "おすすめは[HOTEL_LINK:山水館]です。");
        assert!(out.contains(r#"class="hotel-name-link">山水館</a>"#));
        assert!(!out.contains("[HOTEL_LINK:"));
    }

    #[test]
    fn test_hotel_link_unknown_entity_falls_back_to_plain_text() {
        let ctx = testing::context();
        let out = hotel_links(&ctx, "おすすめは[HOTEL_LINK:存在しない宿]です。");
        assert_eq!(out, "おすすめは存在しない宿です。");
    }

    #[test]
    fn test_hotel_image_unknown_entity_is_removed() {
        let ctx = testing::context();
        assert_eq!(hotel_images(&ctx, "[HOTEL_IMAGE:存在しない宿]"), "");
    }

    #[test]
    fn test_hotel_image_known_entity_renders_figure() {
        let ctx = testing::context();
        let out = hotel_images(&ctx, "[HOTEL_IMAGE:山水館]");
        assert!(out.contains("<figure"));
        assert!(out.contains("山水館の外観"));
        assert!(out.contains("img.example.com"));
    }

    #[test]
    fn test_cta_button_unknown_entity_falls_back_to_text() {
        let ctx = testing::context();
        let out = cta_buttons(&ctx, "[CTA_BUTTON:存在しない宿]");
        assert_eq!(out, "<p><strong>存在しない宿の詳細はこちら</strong></p>");
    }

    #[test]
    fn test_access_link_unknown_entity_is_removed() {
        let ctx = testing::context();
        assert_eq!(access_links(&ctx, "[ACCESS_LINK:存在しない宿]"), "");
    }

    #[test]
    fn test_area_cta_uses_area_name() {
        let ctx = testing::context();
        let out = area_cta(&ctx, "導入文。\n\n[AREA_CTA]\n");
        assert!(out.contains("奥日光温泉への旅行を決めている方へ"));
        assert!(!out.contains("[AREA_CTA]"));
    }

    #[test]
    fn test_area_cta_without_area_name_uses_generic_phrase() {
        let mut ctx = testing::context();
        ctx.area_name.clear();
        let out = area_cta(&ctx, "[AREA_CTA]");
        assert!(out.contains("この温泉地"));
    }

    #[test]
    fn test_review_block_renders_stars_and_excerpt() {
        let ctx = testing::context();
        let out = review_blocks(&ctx, "[REVIEW_BLOCK:山水館]");
        assert!(out.contains("★★★★☆"));
        assert!(out.contains("128件のレビュー"));
        assert!(out.contains("渓流の音を聞きながら"));
        // Boilerplate and markup must not leak into the excerpt.
        assert!(!out.contains("<p>"));
        assert!(!out.contains("クチコミの詳細は"));
        assert!(!out.contains("example.com/review"));
    }

    #[test]
    fn test_review_block_without_stats_is_removed() {
        let mut ctx = testing::context();
        if let Some(h) = ctx.hotels.get_mut("山水館") {
            h.review_count = Some(0);
        }
        assert_eq!(review_blocks(&ctx, "[REVIEW_BLOCK:山水館]"), "");
    }

    #[test]
    fn test_clean_review_excerpt_truncation_is_character_based() {
        let raw = "あ".repeat(200);
        let cleaned = clean_review_excerpt(&raw);
        assert_eq!(cleaned.chars().count(), 200);
    }
}
