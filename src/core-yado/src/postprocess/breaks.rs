//! Dialogue line-break formatting for story sections.
//!
//! Conversational text (「」 quotes) inside the story sections gets `<br>`
//! separators between dialogue and prose. Duplicate `<br>` runs are always
//! collapsed to one, which is what makes the whole pass idempotent.

use regex::Regex;
use std::sync::LazyLock;

use super::PostProcessor;

// Only story-style sections get dialogue treatment.
const DIALOGUE_SECTIONS: &[&str] = &["ふたりで紡ぐ", "宿の記憶"];

static RE_CHECKMARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\S)\s*✅").expect("static pattern"));
static RE_QUOTE_AFTER_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([。、」])\s*「").expect("static pattern"));
static RE_QUOTE_AFTER_PROSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([^\n「<])\s*「").expect("static pattern"));
static RE_PROSE_AFTER_QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"」\s*([^」\n\s「<])").expect("static pattern"));
static RE_BR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(<br>\s*)+").expect("static pattern"));

pub(super) fn dialogue_breaks(_ctx: &PostProcessor, text: &str) -> String {
    format_dialogue_sections(text)
}

/// Applies the dialogue formatting rules:
/// full-width period before a closing quote is dropped, checklist marks get
/// their own line, and dialogue inside story sections is separated from
/// prose. `<br>` runs are collapsed everywhere at the end.
pub fn format_dialogue_sections(content: &str) -> String {
    // 。」 reads doubled in Japanese typography; the quote alone closes the sentence.
    let content = content.replace("。」", "」");

    // ✅ checklist items break onto their own line, everywhere.
    let content = RE_CHECKMARK.replace_all(&content, "${1}<br>\n✅").into_owned();

    // Dialogue separators only inside story sections.
    let mut result_lines: Vec<String> = Vec::new();
    let mut section_lines: Vec<&str> = Vec::new();
    let mut in_dialogue_section = false;

    let flush = |lines: &mut Vec<&str>, dialogue: bool, out: &mut Vec<String>| {
        if lines.is_empty() {
            return;
        }
        let section_text = lines.join("\n");
        out.push(if dialogue {
            apply_dialogue_breaks(&section_text)
        } else {
            section_text
        });
        lines.clear();
    };

    for line in content.split('\n') {
        let stripped = line.trim();
        if stripped.starts_with("## ") || stripped.starts_with("### ") {
            flush(&mut section_lines, in_dialogue_section, &mut result_lines);
            in_dialogue_section = DIALOGUE_SECTIONS.iter().any(|s| stripped.contains(s));
            result_lines.push(line.to_string());
        } else {
            section_lines.push(line);
        }
    }
    flush(&mut section_lines, in_dialogue_section, &mut result_lines);

    // Collapse duplicate breaks everywhere so re-running the pass is a no-op.
    RE_BR_RUN.replace_all(&result_lines.join("\n"), "<br>\n").into_owned()
}

/// Inserts `<br>` separators between dialogue quotes and surrounding prose.
pub fn apply_dialogue_breaks(text: &str) -> String {
    let text = RE_QUOTE_AFTER_PUNCT.replace_all(text, "${1}<br>\n「");
    let text = RE_QUOTE_AFTER_PROSE.replace_all(&text, "${1}<br>\n「");
    let text = RE_PROSE_AFTER_QUOTE.replace_all(&text, "」<br>\n${1}");
    RE_BR_RUN.replace_all(&text, "<br>\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::testing;

    #[test]
    fn test_adjacent_quotes_get_one_separator() {
        assert_eq!(apply_dialogue_breaks("「こんにちは」「元気？」"), "「こんにちは」<br>\n「元気？」");
    }

    #[test]
    fn test_adjacent_quotes_not_duplicated_on_reapplication() {
        let once = apply_dialogue_breaks("「こんにちは」「元気？」");
        let twice = apply_dialogue_breaks(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_quote_after_prose_breaks() {
        let out = apply_dialogue_breaks("妻がつぶやいた。「来てよかったね」");
        assert_eq!(out, "妻がつぶやいた。<br>\n「来てよかったね」");
    }

    #[test]
    fn test_prose_after_quote_breaks() {
        let out = apply_dialogue_breaks("「また来よう」ふたりは頷いた。");
        assert_eq!(out, "「また来よう」<br>\nふたりは頷いた。");
    }

    #[test]
    fn test_period_before_closing_quote_is_dropped() {
        let out = format_dialogue_sections("「来てよかったね。」と妻が言った。");
        assert!(out.contains("「来てよかったね」"));
        assert!(!out.contains("。」"));
    }

    #[test]
    fn test_breaks_only_apply_in_story_sections() {
        let content = "## 宿の紹介\n\n静かな宿です。「お風呂が良い」と評判。\n\n\
### ふたりで紡ぐ、宿の記憶\n\n妻が言った。「来てよかったね」「ああ」\n";
        let out = format_dialogue_sections(content);

        // The ordinary section keeps its inline quote.
        assert!(out.contains("静かな宿です。「お風呂が良い」と評判。"));
        // The story section gets separators.
        assert!(out.contains("妻が言った。<br>\n「来てよかったね」<br>\n「ああ」"));
    }

    #[test]
    fn test_checkmark_gets_own_line_everywhere() {
        let out = format_dialogue_sections("おすすめポイント ✅ 貸切露天 ✅ 部屋食");
        assert_eq!(out, "おすすめポイント<br>\n✅ 貸切露天<br>\n✅ 部屋食");
    }

    #[test]
    fn test_whole_stage_is_idempotent() {
        let ctx = testing::context();
        let content = "### ふたりで紡ぐ、宿の記憶\n\n妻がつぶやいた。「来てよかったね」「ああ、また来よう」ふたりの声が溶けた。\n\n✅ 記念日プランあり\n";
        let once = dialogue_breaks(&ctx, content);
        let twice = dialogue_breaks(&ctx, &once);
        assert_eq!(once, twice);
    }
}
