//! Structural stages: preamble/scaffold removal, hero header insertion,
//! summary link decoration, and the appended related-pages / author sections.

use regex::Regex;
use std::sync::LazyLock;

use super::PostProcessor;
use crate::llms::META_DESCRIPTION_MARKER;

// Scaffold lines like "3. 宿の紹介" that the model sometimes echoes from the
// prompt's structure listing.
const SCAFFOLD_KEYWORDS: &[&str] = &["宿の紹介", "タイトル", "導入文", "まとめ", "メタディスクリプション", "SEOタグ"];

const MAX_RELATED_PAGES: usize = 5;

fn is_h1(line: &str) -> bool {
    let stripped = line.trim();
    stripped.starts_with("# ") && !stripped.starts_with("## ")
}

/// Drops any model preamble ("はい、承知いたしました" and the like) before the
/// first H1 heading.
pub(super) fn strip_preamble(_ctx: &PostProcessor, text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    match lines.iter().position(|line| is_h1(line)) {
        Some(start) if start > 0 => lines[start..].join("\n"),
        _ => text.to_string(),
    }
}

/// Removes numbered scaffold lines ("3. 宿の紹介" etc.).
pub(super) fn strip_section_numbers(_ctx: &PostProcessor, text: &str) -> String {
    text.split('\n')
        .filter(|line| {
            let stripped = line.trim();
            let numbered = stripped.chars().next().is_some_and(|c| c.is_ascii_digit())
                && stripped.chars().take(4).collect::<String>().contains(". ");
            !(numbered && SCAFFOLD_KEYWORDS.iter().any(|k| stripped.contains(k)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inserts the hero figure, PR disclosure, and author byline directly under
/// the title (or wherever `[HERO_IMAGE]` sits). Runs exactly once.
pub(super) fn hero_image(ctx: &PostProcessor, text: &str) -> String {
    let hero_url = ctx
        .hero_image_url
        .clone()
        .unwrap_or_else(|| format!("{}/page_data/{}.webp", ctx.media_base_url, ctx.page_id));

    let header_elements = build_header_elements(ctx);

    // Single-line HTML so the markdown renderer does not interleave.
    let hero_html = format!(
        "\n\n<figure class=\"hero-image-container\" style=\"width:100%; margin:20px 0;\">\
         <img src=\"{hero_url}\" alt=\"記事ヒーロー画像\" class=\"hero-image\" style=\"width:100%; max-width:1200px; \
         height:auto; object-fit:cover; border-radius:12px; display:block; margin:0 auto;\">\
         </figure>\n\n{header_elements}\n\n"
    );

    if text.contains("[HERO_IMAGE]") {
        return text.replace("[HERO_IMAGE]", &hero_html);
    }

    let mut out_lines: Vec<String> = Vec::new();
    let mut inserted = false;
    for line in text.split('\n') {
        out_lines.push(line.to_string());
        if !inserted && is_h1(line) {
            out_lines.push(hero_html.clone());
            inserted = true;
        }
    }
    out_lines.join("\n")
}

fn build_header_elements(ctx: &PostProcessor) -> String {
    let mut elements = vec![
        "<p class=\"ad-disclosure\" style=\"font-size:0.75em; color:#888; text-align:right; margin:5px 0 15px 0;\">\
         <span style=\"background:#f5f5f5; padding:2px 8px; border-radius:3px;\">PR・広告を含みます</span></p>"
            .to_string(),
    ];

    if let Some(author) = &ctx.author {
        let author_name = author.author_name.as_str();
        let author_title = author.author_title.as_deref().unwrap_or("");
        let author_image = author_image_url(ctx, author);
        elements.push(format!(
            "<div class=\"author-byline\" style=\"display:flex; align-items:center; gap:10px; margin:15px 0 25px 0; \
             padding:10px 15px; background:#fafafa; border-radius:8px; border-left:3px solid #667eea;\">\
             <img src=\"{author_image}\" alt=\"{author_name}\" style=\"width:40px; height:40px; border-radius:50%; object-fit:cover;\">\
             <div><span style=\"font-size:0.9em; color:#333; font-weight:500;\">{author_title}・{author_name}</span>\
             <span style=\"font-size:0.8em; color:#666;\"> が執筆</span></div></div>"
        ));
    }

    elements.join("\n\n")
}

fn author_image_url(ctx: &PostProcessor, author: &data_model_yado::models::Author) -> String {
    author
        .author_image_url
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| format!("{}/authors/{}.webp", ctx.media_base_url, author.author_id))
}

/// Inside the まとめ section, wraps known hotel names in booking links and
/// spaces the entries out. Runs exactly once: re-running would double the
/// `：` line breaks.
pub(super) fn summary_hotel_links(ctx: &PostProcessor, text: &str) -> String {
    if !text.contains("## まとめ") {
        return text.to_string();
    }

    let mut result_lines: Vec<String> = Vec::new();
    let mut in_summary = false;

    for line in text.split('\n') {
        let stripped = line.trim();

        if stripped.contains("## まとめ") {
            in_summary = true;
            result_lines.push(line.to_string());
            continue;
        }
        if in_summary && stripped.starts_with("## ") && !stripped.contains("## まとめ") {
            in_summary = false;
        }
        if stripped == "---" {
            in_summary = false;
            result_lines.push(line.to_string());
            continue;
        }
        if !in_summary {
            result_lines.push(line.to_string());
            continue;
        }

        let mut modified = line.to_string();
        let mut has_hotel = false;
        for (name, hotel) in &ctx.hotels {
            if !modified.contains(name.as_str()) {
                continue;
            }
            has_hotel = true;
            let url = ctx.booking_url(hotel);
            let anchor =
                format!(r#"<a href="{url}" target="_blank" rel="noopener" style="color:#667eea;">{name}</a>"#);

            modified = modified.replace(&format!("「{name}」"), &format!("「{anchor}」"));
            // Bare name, unless it is already inside the anchor we just made.
            if modified.contains(name.as_str()) && !modified.contains(&format!(">{name}</a>")) {
                modified = modified.replace(name.as_str(), &anchor);
            }
            if modified.contains(':') || modified.contains('：') {
                modified = modified.replace(": ", ":<br>\n");
                modified = modified.replace('：', "：<br>\n");
            }
        }

        result_lines.push(modified);
        if has_hotel && !stripped.is_empty() {
            result_lines.push(String::new());
        }
    }

    result_lines.join("\n")
}

/// Appends the related-article card grid. Runs exactly once.
pub(super) fn related_pages_section(ctx: &PostProcessor, text: &str) -> String {
    if ctx.related_pages.is_empty() {
        return text.to_string();
    }

    let mut cards_html = String::new();
    for page in ctx.related_pages.iter().take(MAX_RELATED_PAGES) {
        let page_url = format!("{}/{}", ctx.site_base_url, page.url_slug);
        let hero_url = page
            .hero_image_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("{}/page_data/{}.webp", ctx.media_base_url, page.id));

        cards_html.push_str(&format!(
            "<a href=\"{page_url}\" class=\"related-page-card\" style=\"display:block; text-decoration:none; \
             color:inherit; border:1px solid #e0e0e0; border-radius:12px; overflow:hidden; \
             transition:transform 0.2s, box-shadow 0.2s;\">\
             <img src=\"{hero_url}\" alt=\"{title}\" style=\"width:100%; height:160px; object-fit:cover;\">\
             <div style=\"padding:12px;\">\
             <p style=\"font-size:0.85em; color:#666; margin:0 0 5px 0;\">{area}</p>\
             <h4 style=\"margin:0; font-size:1em; line-height:1.4;\">{title}</h4>\
             </div></a>",
            title = page.page_title,
            area = page.rakuten_area_name,
        ));
    }

    let related_html = format!(
        "\n\n---\n\n## 関連記事\n\n<div class=\"related-pages\" style=\"display:grid; \
         grid-template-columns:repeat(auto-fit, minmax(280px, 1fr)); gap:20px; margin:30px 0;\">{cards_html}</div>\n\n"
    );

    insert_before_meta_block(text, &related_html)
}

/// Appends the author profile box. Runs exactly once.
pub(super) fn author_section(ctx: &PostProcessor, text: &str) -> String {
    let Some(author) = &ctx.author else {
        return text.to_string();
    };

    let author_name = author.author_name.as_str();
    let author_title = author.author_title.as_deref().unwrap_or("");
    let author_bio = author.author_bio.as_deref().unwrap_or("");
    let author_image = author_image_url(ctx, author);

    let author_html = format!(
        "\n\n---\n\n## この記事を書いた人\n\n<div class=\"author-box\">\
         <div class=\"author-header\">\
         <img src=\"{author_image}\" alt=\"{author_name}\" class=\"author-image\">\
         <div class=\"author-info\">\
         <h4 class=\"author-name\">{author_name}</h4>\
         <p class=\"author-title\">{author_title}</p>\
         </div></div>\
         <p class=\"author-bio\">{author_bio}</p></div>\n\n"
    );

    insert_before_meta_block(text, &author_html)
}

// The meta-description block, when still present, must stay last.
fn insert_before_meta_block(text: &str, section_html: &str) -> String {
    let divider = format!("---\n{META_DESCRIPTION_MARKER}");
    match text.split_once(&divider) {
        Some((before, after)) => format!("{before}{section_html}{divider}{after}"),
        None => {
            let mut out = text.to_string();
            out.push_str(section_html);
            out
        }
    }
}

static RE_H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("static pattern"));

/// Appends the featured-hotel count to the title, unless the title already
/// carries an N選-style marker.
pub(super) fn title_hotel_count(ctx: &PostProcessor, text: &str) -> String {
    let hotel_count = ctx.hotels.len();
    if hotel_count == 0 {
        return text.to_string();
    }

    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    for line in lines.iter_mut() {
        if is_h1(line) {
            let title = line.trim()[2..].trim().to_string();
            if !title.contains('選') {
                *line = format!("# {title}【厳選{hotel_count}宿】");
            }
            break;
        }
    }
    lines.join("\n")
}

/// First H1 heading of a processed article, used as the stored title.
pub fn extract_title(content: &str) -> Option<String> {
    RE_H1
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::testing;

    #[test]
    fn test_strip_preamble_drops_text_before_h1() {
        let ctx = testing::context();
        let out = strip_preamble(&ctx, "はい、承知いたしました。\n以下が記事です。\n\n# タイトル\n\n本文");
        assert!(out.starts_with("# タイトル"));
    }

    #[test]
    fn test_strip_preamble_keeps_text_without_h1() {
        let ctx = testing::context();
        let text = "見出しのないテキスト。\n本文のみ。";
        assert_eq!(strip_preamble(&ctx, text), text);
    }

    #[test]
    fn test_strip_section_numbers_removes_scaffold_lines() {
        let ctx = testing::context();
        let out = strip_section_numbers(&ctx, "# タイトル\n3. 宿の紹介\n1. 導入文\n本文 2. は残る\n");
        assert!(!out.contains("宿の紹介"));
        assert!(!out.contains("導入文"));
        assert!(out.contains("本文 2. は残る"));
    }

    #[test]
    fn test_hero_image_replaces_token() {
        let ctx = testing::context();
        let out = hero_image(&ctx, "# タイトル\n\n[HERO_IMAGE]\n\n本文");
        assert!(!out.contains("[HERO_IMAGE]"));
        assert!(out.contains("hero-image-container"));
        assert!(out.contains("PR・広告を含みます"));
        assert!(out.contains("佐藤 葵"));
    }

    #[test]
    fn test_hero_image_inserted_after_h1_when_token_missing() {
        let ctx = testing::context();
        let out = hero_image(&ctx, "# タイトル\n\n本文");
        let title_pos = out.find("# タイトル").unwrap();
        let hero_pos = out.find("hero-image-container").unwrap();
        let body_pos = out.find("本文").unwrap();
        assert!(title_pos < hero_pos && hero_pos < body_pos);
    }

    #[test]
    fn test_summary_links_wrap_hotel_names() {
        let ctx = testing::context();
        let text = "## まとめ\n\n「山水館」: 渓流露天と会席の宿。\n";
        let out = summary_hotel_links(&ctx, text);
        assert!(out.contains(r#">山水館</a>」"#));
        assert!(out.contains(":<br>\n"));
    }

    #[test]
    fn test_summary_links_only_touch_summary_section() {
        let ctx = testing::context();
        let text = "## 宿の紹介\n\n山水館は渓流沿いの宿。\n\n## まとめ\n\n山水館をもう一度。\n";
        let out = summary_hotel_links(&ctx, text);
        assert!(out.contains("山水館は渓流沿いの宿。"));
        assert_eq!(out.matches("</a>").count(), 1);
    }

    #[test]
    fn test_related_pages_appended_with_cards() {
        let ctx = testing::context();
        let out = related_pages_section(&ctx, "# タイトル\n\n本文\n\n## まとめ\n\nおわり\n");
        assert!(out.contains("## 関連記事"));
        assert!(out.contains("hakone-rotenburo"));
        assert!(out.contains("箱根温泉"));
    }

    #[test]
    fn test_author_section_appended() {
        let ctx = testing::context();
        let out = author_section(&ctx, "# タイトル\n\n本文\n");
        assert!(out.contains("## この記事を書いた人"));
        assert!(out.contains("温泉ソムリエ"));
        assert!(out.contains("300軒以上"));
    }

    #[test]
    fn test_author_section_skipped_without_author() {
        let mut ctx = testing::context();
        ctx.author = None;
        let text = "# タイトル\n\n本文\n";
        assert_eq!(author_section(&ctx, text), text);
    }

    #[test]
    fn test_sections_insert_before_meta_block_when_present() {
        let ctx = testing::context();
        let text = "# タイトル\n\n本文\n\n---\n【メタディスクリプション】\n要約です。\n";
        let out = author_section(&ctx, text);
        let author_pos = out.find("この記事を書いた人").unwrap();
        let meta_pos = out.find("【メタディスクリプション】").unwrap();
        assert!(author_pos < meta_pos);
    }

    #[test]
    fn test_title_count_appended() {
        let ctx = testing::context();
        let out = title_hotel_count(&ctx, "# 奥日光の宿\n\n本文");
        assert!(out.starts_with("# 奥日光の宿【厳選2宿】"));
    }

    #[test]
    fn test_title_count_skipped_when_marker_present() {
        let ctx = testing::context();
        let text = "# 奥日光の宿7選\n\n本文";
        assert_eq!(title_hotel_count(&ctx, text), text);
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title("# 奥日光の宿\n\n本文").as_deref(), Some("奥日光の宿"));
        assert_eq!(extract_title("本文のみ"), None);
    }
}
