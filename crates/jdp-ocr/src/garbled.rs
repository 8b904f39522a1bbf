// SPDX-License-Identifier: MIT OR Apache-2.0
//! Garbled-Hangul detection.
//!
//! OCR over stylised Korean produces short all-Hangul strings that look
//! like words but mean nothing. Real Korean prose carries particles and
//! verb endings; a Hangul-dense line without any of them is junk at the
//! ratios below. Lines containing a header or meta keyword are protected
//! before any ratio is consulted.

use jdp_keywords::KeywordRegistry;
use once_cell::sync::Lazy;
use regex::Regex;

/// Particles and endings that mark real Korean prose.
const KOREAN_PARTICLES: &[&str] = &[
    "은", "는", "이", "가", "을", "를", "에", "의", "와", "과", "로", "도", "만", "까지", "부터",
    "에서", "으로", "하고", "이다", "하다", "되다", "하는", "되는", "하며", "하여", "합니다",
    "됩니다", "입니다", "있습니다", "습니다", "해요", "어요", "아요",
];

/// Hangul blocks interleaved with short capital runs, twice or more:
/// a recognition artefact, not text.
static HANGUL_CAPS_INTERLEAVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Hangul}+[A-Z]{1,3}){2,}\p{Hangul}+").expect("valid regex"));

/// Runs of compatibility jamo, fragments of syllables that never
/// composed.
static FRAGMENTED_JAMO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{3131}-\x{3163}]{2,}").expect("valid regex"));

/// Whether an OCR line is garbled Hangul and should be dropped.
pub fn is_garbled_korean(text: &str, registry: &KeywordRegistry) -> bool {
    let stripped = text.trim();
    if stripped.is_empty() {
        return false;
    }

    // Keyword lines are structure, never junk.
    let lowered = stripped.to_lowercase();
    if registry.is_header_keyword(&lowered) || registry.contains_meta_keyword(stripped) {
        return false;
    }

    if HANGUL_CAPS_INTERLEAVE.is_match(stripped) || FRAGMENTED_JAMO.is_match(stripped) {
        return true;
    }

    let len = stripped.chars().count();
    let hangul = stripped
        .chars()
        .filter(|c| ('가'..='힣').contains(c))
        .count();
    if hangul == 0 {
        return false;
    }
    let ratio = hangul as f64 / len as f64;
    let has_particle = KOREAN_PARTICLES.iter().any(|p| stripped.contains(p));
    if has_particle {
        return false;
    }

    match len {
        0..=12 => ratio > 0.9,
        13..=30 => ratio > 0.8,
        _ => hangul < 50 && ratio > 0.9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> KeywordRegistry {
        KeywordRegistry::builtin()
    }

    #[test]
    fn header_keywords_are_protected() {
        // All-Hangul, no particle; only the keyword protection keeps it.
        assert!(!is_garbled_korean("주요업무", &registry()));
        assert!(!is_garbled_korean("자격요건", &registry()));
    }

    #[test]
    fn meta_keyword_lines_are_protected() {
        assert!(!is_garbled_korean("서류전형안내", &registry()));
    }

    #[test]
    fn short_hangul_junk_is_garbled() {
        assert!(is_garbled_korean("뚫홟짻꿿", &registry()));
        assert!(is_garbled_korean("믓칡퓚섥없", &registry()));
    }

    #[test]
    fn real_sentences_have_particles() {
        assert!(!is_garbled_korean("대규모 트래픽을 처리합니다", &registry()));
        assert!(!is_garbled_korean("데이터 파이프라인 구축 및 운영", &registry()));
    }

    #[test]
    fn mixed_script_lines_are_not_garbled() {
        assert!(!is_garbled_korean("Java 백엔드 개발", &registry()));
    }

    #[test]
    fn fragmented_jamo_is_garbled() {
        assert!(is_garbled_korean("ㅁㄴㅇㄹ 채용공고", &registry()));
    }

    #[test]
    fn hangul_caps_interleaving_is_garbled() {
        assert!(is_garbled_korean("솨AB훉CD뷁", &registry()));
    }
}
