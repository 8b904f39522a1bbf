// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lexical header detection for TEXT and URL lines.
//!
//! Misses are acceptable; false headers are not. The post-validator's
//! coverage check is the final gate, so everything here only proposes
//! candidates.

use jdp_keywords::KeywordRegistry;
use std::sync::Arc;

/// Characters that open a bullet line in unnormalised web text.
pub(crate) const BULLET_CHARS: &[char] = &['•', '-', '·', '*', '–', '▪', '▶', '○', '●'];

/// Longest line that can still be a header.
const HEADER_MAX_CHARS: usize = 80;
/// Bounds for the short-standalone-heading rule.
const STANDALONE_MIN: usize = 2;
const STANDALONE_MAX: usize = 15;
/// Keywords at least this long skip the sentence guard; short keywords
/// false-positive inside prose too easily.
const KEYWORD_TRUST_LEN: usize = 6;
/// Minimum share of the candidate a keyword must cover.
pub(crate) const KEYWORD_COVERAGE_THRESHOLD: f64 = 0.4;

/// Canonical header key: trimmed, one layer of enclosing brackets removed,
/// lower-cased, all whitespace removed.
pub fn canonical_header_key(raw: &str) -> String {
    let mut text = raw.trim();
    for (open, close) in [('[', ']'), ('<', '>'), ('【', '】')] {
        if text.starts_with(open) && text.ends_with(close) && text.chars().count() >= 2 {
            text = text
                .strip_prefix(open)
                .and_then(|t| t.strip_suffix(close))
                .unwrap_or(text)
                .trim();
            break;
        }
    }
    text.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}

/// Normalisation used for keyword-coverage matching: like
/// [`canonical_header_key`] but with bracket characters removed anywhere.
pub(crate) fn normalize_for_match(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '[' | ']' | '<' | '>' | '【' | '】'))
        .collect()
}

/// Whether a header key covers ≥ 40% of some configured header keyword
/// (or vice versa). This is the authoritative header gate: it keeps
/// `자격요건` and rejects `커넥트웨이브·서울금천구·신입 경력0년` against
/// `경력`.
pub(crate) fn matches_any_keyword(key: &str, registry: &KeywordRegistry) -> bool {
    let normalized = normalize_for_match(key);
    if normalized.is_empty() {
        return false;
    }
    let norm_len = normalized.chars().count();
    for kw in registry.header_keywords() {
        let kw_ns: String = kw.chars().filter(|c| !c.is_whitespace()).collect();
        if kw_ns.is_empty() {
            continue;
        }
        if normalized.contains(&kw_ns) || kw_ns.contains(&normalized) {
            let coverage = kw_ns.chars().count() as f64 / norm_len as f64;
            if coverage >= KEYWORD_COVERAGE_THRESHOLD {
                return true;
            }
        }
    }
    false
}

/// Prose detector shared by the lexical rules: description sentences are
/// never headers however short the match was.
pub(crate) fn looks_like_sentence(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    if lowered.ends_with('.') {
        return true;
    }
    let len = lowered.chars().count();
    if len > 25 {
        return true;
    }
    if len > 15
        && (lowered.ends_with('다')
            || lowered.ends_with('요')
            || lowered.ends_with('음')
            || lowered.ends_with('함'))
    {
        return true;
    }
    const SENTENCE_MARKERS: &[&str] = &[
        "합니다", "됩니다", "있습니다", "입니다", "하는 ", "하며 ", "및 ", "으로 ", "에서 ",
        "하여 ", "것입니다", "바랍니다",
    ];
    SENTENCE_MARKERS.iter().any(|m| lowered.contains(m))
}

// ---------------------------------------------------------------------------
// LexicalHeaderDetector
// ---------------------------------------------------------------------------

/// Header detector over plain text lines (TEXT and URL sources).
#[derive(Debug, Clone)]
pub struct LexicalHeaderDetector {
    registry: Arc<KeywordRegistry>,
}

impl LexicalHeaderDetector {
    /// Build against a loaded keyword registry.
    pub fn new(registry: Arc<KeywordRegistry>) -> Self {
        Self { registry }
    }

    /// Decide whether `line` names a section, with one line of lookahead.
    pub fn is_header(&self, line: &str, next_line: Option<&str>) -> bool {
        let stripped = line.trim();
        if stripped.is_empty() {
            return false;
        }
        if stripped.starts_with(BULLET_CHARS) {
            return false;
        }

        let lowered = stripped.to_lowercase();
        let len = stripped.chars().count();

        // Keyword path: exact match, or whitespace-stripped containment
        // with enough coverage.
        if self.registry.is_header_keyword(&lowered) {
            return true;
        }
        if let Some(kw_len) = self.matched_keyword_len(stripped) {
            if kw_len >= KEYWORD_TRUST_LEN || !looks_like_sentence(stripped) {
                return true;
            }
        }

        // Bracket-titled lines ("[자격요건]", "<복리후생>").
        if len <= HEADER_MAX_CHARS && is_bracket_enclosed(stripped) {
            return true;
        }

        // The remaining shape rules only apply to short, parenthesis-free
        // candidates.
        if len > HEADER_MAX_CHARS || stripped.contains('(') || stripped.contains(')') {
            return false;
        }

        if stripped.ends_with(':') {
            return true;
        }

        let next = next_line.map(str::trim).unwrap_or("");
        if next.starts_with(BULLET_CHARS)
            && (STANDALONE_MIN..=STANDALONE_MAX).contains(&len)
        {
            return true;
        }

        // Short standalone heading above a long body line.
        if (STANDALONE_MIN..=STANDALONE_MAX).contains(&len)
            && !next.is_empty()
            && !next.starts_with(BULLET_CHARS)
            && next.chars().count() >= 20
            && starts_like_heading(stripped)
            && !looks_like_sentence(stripped)
        {
            return true;
        }

        false
    }

    /// Char length of the matched keyword when the coverage gate passes.
    fn matched_keyword_len(&self, stripped: &str) -> Option<usize> {
        let normalized = normalize_for_match(stripped);
        if normalized.is_empty() {
            return None;
        }
        let norm_len = normalized.chars().count();
        for kw in self.registry.header_keywords() {
            let kw_ns: String = kw.chars().filter(|c| !c.is_whitespace()).collect();
            let kw_len = kw_ns.chars().count();
            if kw_len == 0 {
                continue;
            }
            if (normalized.contains(&kw_ns) || kw_ns.contains(&normalized))
                && kw_len as f64 / norm_len as f64 >= KEYWORD_COVERAGE_THRESHOLD
            {
                return Some(kw_len);
            }
        }
        None
    }
}

fn is_bracket_enclosed(text: &str) -> bool {
    (text.starts_with('[') && text.ends_with(']'))
        || (text.starts_with('<') && text.ends_with('>'))
        || (text.starts_with('【') && text.ends_with('】'))
}

fn starts_like_heading(text: &str) -> bool {
    match text.chars().next() {
        Some(c) if c.is_ascii_uppercase() => true,
        Some(c) if ('가'..='힣').contains(&c) => true,
        _ => false,
    }
}
