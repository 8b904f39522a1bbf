// SPDX-License-Identifier: MIT OR Apache-2.0
//! Score-based extraction of the main content block.
//!
//! Site-specific selectors do not generalise across job boards, so block
//! candidates are scored instead: text mass and long paragraphs up,
//! JD keywords way up, link-heavy and menu-shaped blocks down. The best
//! block is flattened to cleaned lines.

use crate::JD_INDICATOR_KEYWORDS;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Tags that can host the JD body.
static BLOCK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, section, article, main, td").expect("valid selector"));
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("valid selector"));
static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("valid selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid selector"));

/// Subtrees that never contain JD text.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "path", "header", "footer", "nav",
];

/// Blocks with less text than this are not candidates.
const MIN_BLOCK_CHARS: usize = 50;
/// Sentences longer than this count as long paragraphs.
const LONG_PARAGRAPH_CHARS: usize = 50;
/// Link-density above this starts the menu penalty.
const LINK_DENSITY_PENALTY_AT: f64 = 0.3;
/// Share of short lines above which a block is menu-shaped.
const SHORT_LINE_DENSITY_AT: f64 = 0.8;
const SHORT_LINE_CHARS: usize = 30;

/// Explicit UI labels stripped during final line cleaning.
const UI_LINE_NOISE: &[&str] = &[
    "닫기", "Close", "Share", "공유하기", "지원하기", "Apply", "Filter", "초기화", "검색",
];

/// Extraction result: page title plus the cleaned body lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// `<title>` text, empty when absent.
    pub title: String,
    /// Cleaned body lines of the winning block.
    pub lines: Vec<String>,
}

/// Extract the main content block of an HTML document.
pub fn extract_main_block(html: &str) -> ParsedPage {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let mut best: Option<(f64, ElementRef)> = None;
    for element in doc.select(&BLOCK_SELECTOR) {
        if let Some(score) = score_block(element) {
            let better = match &best {
                Some((best_score, _)) => score > *best_score,
                None => true,
            };
            if better {
                best = Some((score, element));
            }
        }
    }

    let root = best.map(|(score, el)| {
        debug!(score, tag = el.value().name(), "main block selected");
        el
    });
    let lines = match root {
        Some(el) => clean_lines(&text_segments(el)),
        None => doc
            .select(&BODY_SELECTOR)
            .next()
            .map(|body| clean_lines(&text_segments(body)))
            .unwrap_or_default(),
    };

    ParsedPage { title, lines }
}

/// Score one candidate block; `None` when it is too small to matter.
fn score_block(element: ElementRef<'_>) -> Option<f64> {
    let segments = text_segments(element);
    let joined = segments.join(" ");
    let total_chars = joined.chars().count();
    if total_chars < MIN_BLOCK_CHARS {
        return None;
    }

    let mut score = total_chars as f64 * 0.1;

    let long_paragraphs = joined
        .split('.')
        .filter(|s| s.trim().chars().count() > LONG_PARAGRAPH_CHARS)
        .count();
    score += long_paragraphs as f64 * 100.0;

    let keyword_hits = JD_INDICATOR_KEYWORDS
        .iter()
        .filter(|kw| joined.contains(*kw))
        .count();
    score += keyword_hits as f64 * 300.0;

    // Menus and footers are links; bodies are prose.
    let link_chars: usize = element
        .select(&ANCHOR_SELECTOR)
        .map(|a| a.text().collect::<String>().trim().chars().count())
        .sum();
    let link_density = link_chars as f64 / total_chars as f64;
    if link_density > LINK_DENSITY_PENALTY_AT {
        score *= 1.0 - link_density * 2.0;
    }

    // Mostly-short lines look like a menu, unless keywords vouch for a
    // bullet-heavy JD.
    if !segments.is_empty() {
        let short = segments
            .iter()
            .filter(|s| s.chars().count() < SHORT_LINE_CHARS)
            .count();
        if short as f64 / segments.len() as f64 > SHORT_LINE_DENSITY_AT && keyword_hits < 2 {
            score *= 0.5;
        }
    }

    Some(score)
}

/// Text chunks of a subtree in document order, skipping excluded tags.
fn text_segments(element: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();
    collect_segments(element, &mut out);
    out
}

fn collect_segments(element: ElementRef<'_>, out: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let chunk = text.text.trim();
            if !chunk.is_empty() {
                out.push(chunk.to_string());
            }
        } else if let Some(el) = ElementRef::wrap(child) {
            if EXCLUDED_TAGS.contains(&el.value().name()) {
                continue;
            }
            collect_segments(el, out);
        }
    }
}

/// Per-line cleaning of the winning block's segments.
fn clean_lines(segments: &[String]) -> Vec<String> {
    segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| !UI_LINE_NOISE.contains(s))
        .filter(|s| s.chars().count() >= 2 || s.chars().any(|c| c.is_ascii_digit()))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jd_html() -> String {
        let menu: String = (0..20)
            .map(|i| format!(r#"<a href="/m{i}">메뉴항목{i}</a>"#))
            .collect();
        format!(
            r#"<html><head><title>백엔드 엔지니어 채용</title>
            <script>var x = "자격요건 아님";</script></head>
            <body>
            <nav>{menu}</nav>
            <div id="content">
              <h2>주요업무</h2>
              <p>대규모 커머스 트래픽을 처리하는 백엔드 시스템을 설계하고 운영하는 일을 맡게 됩니다. 서비스 안정성을 함께 책임집니다.</p>
              <h2>자격요건</h2>
              <ul><li>Java 또는 Kotlin 경험</li><li>AWS 운영 경험</li></ul>
              <h2>우대사항</h2>
              <ul><li>Kafka 운영 경험</li></ul>
            </div>
            <footer>회사 주소와 저작권 안내</footer>
            </body></html>"#
        )
    }

    #[test]
    fn title_is_extracted() {
        let page = extract_main_block(&jd_html());
        assert_eq!(page.title, "백엔드 엔지니어 채용");
    }

    #[test]
    fn content_block_beats_navigation() {
        let page = extract_main_block(&jd_html());
        let joined = page.lines.join("\n");
        assert!(joined.contains("주요업무"));
        assert!(joined.contains("Java 또는 Kotlin 경험"));
        assert!(!joined.contains("메뉴항목3"));
    }

    #[test]
    fn script_and_footer_text_never_leak() {
        let page = extract_main_block(&jd_html());
        let joined = page.lines.join("\n");
        assert!(!joined.contains("자격요건 아님"));
        assert!(!joined.contains("저작권"));
    }

    #[test]
    fn ui_labels_are_cleaned_from_lines() {
        let html = format!(
            "<html><body><div>자격요건 {} <p>지원하기</p><p>상세한 본문 설명이 이어집니다</p></div></body></html>",
            "본문 ".repeat(30)
        );
        let page = extract_main_block(&html);
        assert!(!page.lines.iter().any(|l| l == "지원하기"));
    }

    #[test]
    fn empty_document_extracts_nothing() {
        let page = extract_main_block("<html><body></body></html>");
        assert!(page.lines.is_empty());
        assert!(page.title.is_empty());
    }
}
