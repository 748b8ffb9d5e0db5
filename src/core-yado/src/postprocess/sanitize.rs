//! Denylist sanitizer for generated prose.
//!
//! Age brackets and "no information" filler phrases must not reach published
//! articles. Substitution order matters: the 60代/70代 rewrites produce
//! シニア, which the later シニア rule folds into the neutral term.

use regex::Regex;
use std::sync::LazyLock;

use super::PostProcessor;

const FORBIDDEN_PHRASES: &[(&str, &str)] = &[
    ("50代", "大人"),
    ("40代", "大人"),
    ("60代", "シニア"),
    ("70代", "シニア"),
    ("熟年", "大人"),
    ("シニア", "大人"),
    ("高齢者", "年配の方"),
    ("情報なし", ""),
    ("記載なし", ""),
    ("車でのアクセス: なし", ""),
    ("車でのアクセス情報は直接の記載がありません", ""),
];

// Lines apologizing for missing car-access data read as broken output.
static RE_CAR_ACCESS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)■\s*\*\*車でのアクセス\*\*[:：]?\s*なし",
        r"(?m)■\s*車でのアクセス[:：]?\s*なし",
        r"(?m)■\s*車でのアクセス情報は記載がありません",
        r"(?m)■\s*車でのアクセスに関する具体的な情報はございません",
        r"(?m)■\s*車でのアクセス[:：]?\s*（情報はありません）",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

static RE_EMPTY_BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*[-*]\s*$").expect("static pattern"));
static RE_BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("static pattern"));

pub(super) fn sanitize(_ctx: &PostProcessor, text: &str) -> String {
    sanitize_text(text)
}

/// Applies the denylist and cleanup passes. Idempotent: no replacement
/// reintroduces a denylisted phrase.
pub fn sanitize_text(text: &str) -> String {
    let mut sanitized = text.to_string();
    for (phrase, replacement) in FORBIDDEN_PHRASES {
        sanitized = sanitized.replace(phrase, replacement);
    }

    for re in RE_CAR_ACCESS.iter() {
        sanitized = re.replace_all(&sanitized, "").into_owned();
    }

    sanitized = RE_EMPTY_BULLET.replace_all(&sanitized, "").into_owned();
    RE_BLANK_RUN.replace_all(&sanitized, "\n\n").into_owned()
}
