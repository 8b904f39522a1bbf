// SPDX-License-Identifier: MIT OR Apache-2.0
//! Header-grouped section extraction over OCR lines.
//!
//! The OCR header decision mixes lexical and visual evidence: a keyword
//! match carries length/token limits scaled by how specific the keyword
//! is, and keyword-less lines can still be headers on strong visual
//! signals (header score, glyph height, trailing colon).

use crate::line::OcrLine;
use jdp_core::Section;
use jdp_keywords::KeywordRegistry;

/// Line length/token ceilings for a header backed by a specific (≥ 6
/// char) keyword.
const KEYWORD_LONG_MAX_CHARS: usize = 60;
const KEYWORD_LONG_MAX_TOKENS: usize = 10;
/// Tighter ceilings when the matched keyword is short.
const KEYWORD_SHORT_MAX_CHARS: usize = 40;
const KEYWORD_SHORT_MAX_TOKENS: usize = 6;
/// Keyword length at which the looser ceilings apply.
const KEYWORD_TRUST_LEN: usize = 6;
/// Visual-only signals.
const HEADER_SCORE_FLOOR: i32 = 4;
const HEADER_HEIGHT_FLOOR: f64 = 45.0;

/// Whether an OCR line names a section.
pub fn is_ocr_header_line(line: &OcrLine, registry: &KeywordRegistry) -> bool {
    let text = line.text.trim();
    if text.is_empty() {
        return false;
    }
    if text.starts_with(['•', '·', '-', '*']) {
        return false;
    }
    if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }

    let lowered = text.to_lowercase();
    let len = text.chars().count();

    if let Some(kw_len) = longest_matched_keyword(&lowered, registry) {
        return if kw_len >= KEYWORD_TRUST_LEN {
            len <= KEYWORD_LONG_MAX_CHARS && line.token_count <= KEYWORD_LONG_MAX_TOKENS
        } else {
            len <= KEYWORD_SHORT_MAX_CHARS
                && line.token_count <= KEYWORD_SHORT_MAX_TOKENS
                && !looks_like_sentence(&lowered)
        };
    }

    line.header_score >= HEADER_SCORE_FLOOR
        || line.height >= HEADER_HEIGHT_FLOOR
        || text.ends_with(':')
}

/// Longest header keyword contained in the lowered line, by char count.
fn longest_matched_keyword(lowered: &str, registry: &KeywordRegistry) -> Option<usize> {
    registry
        .header_keywords()
        .iter()
        .filter(|kw| lowered.contains(kw.as_str()))
        .map(|kw| kw.chars().count())
        .max()
}

fn looks_like_sentence(text: &str) -> bool {
    if text.ends_with('.') || text.ends_with('다') {
        return true;
    }
    const SENTENCE_MARKERS: &[&str] = &[
        "합니다", "됩니다", "있습니다", "하는 ", "하며", "및 ", "으로 ", "에서 ", "하여 ",
    ];
    SENTENCE_MARKERS.iter().any(|m| text.contains(m))
}

/// Group OCR lines into sections by header.
///
/// Pre-header lines collect into the intro bucket; every other line
/// belongs to the most recent header. Headers with no body survive here
/// and are repaired by post-validation.
pub fn extract_sections(lines: &[OcrLine], registry: &KeywordRegistry) -> Vec<Section> {
    let mut intro = Section::intro();
    let mut sections: Vec<Section> = Vec::new();

    for line in lines {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }

        if is_ocr_header_line(line, registry) {
            sections.push(Section::with_header(normalize_header_key(text)));
            continue;
        }

        match sections.last_mut() {
            Some(current) => current.lines.push(text.to_string()),
            None => intro.lines.push(text.to_string()),
        }
    }

    let mut out = Vec::with_capacity(sections.len() + 1);
    if intro.has_content() {
        out.push(intro);
    }
    out.extend(sections);
    out
}

/// Header text to canonical key: lower-case, whitespace removed. No
/// meaning-level rewriting.
fn normalize_header_key(text: &str) -> String {
    text.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}
