// SPDX-License-Identifier: MIT OR Apache-2.0
//! Domain post-processing of gate-passed OCR lines.
//!
//! Produces the cleaned JD line stream. No structuring happens here,
//! only protection of structural/meta lines, garbled-Hangul removal, and
//! token repair on technical fragments.

use crate::garbled::is_garbled_korean;
use crate::line::OcrLine;
use crate::repair::normalize_token;
use jdp_keywords::KeywordRegistry;

/// Hangul character count at which a line counts as a Korean sentence.
const KOREAN_SENTENCE_MIN_HANGUL: usize = 3;

/// Post-process gated lines, in order per line: noise filter, header
/// protection, garbled drop, meta protection, sentence protection, token
/// repair.
pub fn postprocess_lines(lines: Vec<OcrLine>, registry: &KeywordRegistry) -> Vec<OcrLine> {
    let noise = registry.noise();
    let vocab = registry.jd_vocab();
    let mut processed = Vec::with_capacity(lines.len());

    for mut line in lines {
        if noise.is_noise_line(&line.text) {
            continue;
        }

        let lowered = line.text.to_lowercase();

        // Structural lines stay untouched.
        if registry.is_header_keyword(lowered.trim()) {
            processed.push(line);
            continue;
        }

        if is_garbled_korean(&line.text, registry) {
            continue;
        }

        // Recruitment metadata stays untouched.
        if registry.contains_meta_keyword(&line.text) {
            processed.push(line);
            continue;
        }

        // Natural Korean prose breaks when tokenised; protect it.
        if is_korean_sentence(&line.text) {
            processed.push(line);
            continue;
        }

        let repaired: Vec<String> = line
            .text
            .split_whitespace()
            .filter_map(|token| normalize_token(token, vocab))
            .collect();

        // A line whose tokens all dropped keeps its original text; losing
        // the whole line to token repair is worse than keeping noise.
        if !repaired.is_empty() {
            line.text = repaired.join(" ");
            line.token_count = line.text.split_whitespace().count();
        }
        processed.push(line);
    }

    processed
}

/// A line with enough Hangul reads as a Korean sentence.
pub fn is_korean_sentence(text: &str) -> bool {
    text.chars().filter(|c| ('가'..='힣').contains(c)).count() >= KOREAN_SENTENCE_MIN_HANGUL
}
