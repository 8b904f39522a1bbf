// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vocabulary-guarded token repair.
//!
//! Policy: never fix what isn't certainly broken. A token is only
//! rewritten when it is clearly OCR damage, a dictionary candidate sits
//! within edit distance 2 (or one confusable substitution away), and the
//! best candidate both clears the score floor and leads the runner-up by
//! a margin.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Acceptance floor for the best candidate, on a 0–100 scale.
const CONFIDENCE_THRESHOLD: f64 = 88.0;
/// Minimum lead over the second-best candidate.
const MIN_SCORE_GAP: f64 = 6.0;
/// Cap on generated candidates.
const MAX_CANDIDATES: usize = 10;

/// Special characters OCR commonly substitutes into Latin tokens.
static CONFUSABLE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[×¥¬¦§]").expect("valid regex"));

/// Confusable substitutions tried during candidate generation.
const CONFUSABLE_MAP: &[(char, &[char])] = &[
    ('0', &['o']),
    ('1', &['l', 'i']),
    ('5', &['s']),
    ('8', &['b']),
    ('×', &['x']),
    ('¥', &['y']),
];

/// Canonical comparison form: lower-case, separators and punctuation
/// removed, ASCII alphanumerics only.
pub fn to_canonical(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Whether the canonical form of `token` is protected vocabulary.
pub fn is_known_vocab(token: &str, vocab: &BTreeSet<String>) -> bool {
    let canonical = to_canonical(token);
    if canonical.is_empty() {
        return false;
    }
    vocab.contains(&canonical)
}

/// Whether a token is clearly OCR damage worth attempting to repair.
///
/// Only shapes that plausibly decode to a real word qualify; anything
/// ambiguous is left alone.
pub fn looks_broken(token: &str) -> bool {
    let t = token.trim();
    if t.chars().count() <= 2 {
        return false;
    }
    let alpha = t.chars().filter(|c| c.is_ascii_alphabetic()).count();
    if alpha < 2 {
        return false;
    }
    let has_digit = t.chars().any(|c| c.is_ascii_digit());
    if has_digit {
        return true;
    }
    if CONFUSABLE_CHARS.is_match(t) {
        return true;
    }
    let non_alpha_ratio = (t.chars().count() - alpha) as f64 / t.chars().count() as f64;
    non_alpha_ratio <= 0.3 && alpha >= 4
}

/// Repair one token against the protected vocabulary.
///
/// Returns `None` when the token is garbage to drop, otherwise the kept
/// or repaired token.
pub fn normalize_token(token: &str, vocab: &BTreeSet<String>) -> Option<String> {
    if crate::quality::looks_garbage_token(token) {
        return None;
    }
    if is_known_vocab(token, vocab) {
        return Some(token.to_string());
    }
    if !looks_broken(token) {
        return Some(token.to_string());
    }

    let candidates = generate_candidates(token, vocab);
    if candidates.is_empty() {
        return Some(token.to_string());
    }

    match select_best_candidate(token, &candidates) {
        Some(best) => Some(best),
        None => Some(token.to_string()),
    }
}

/// Dictionary candidates within edit distance 2, plus confusable-repaired
/// variants within distance 1 of a dictionary word.
fn generate_candidates(token: &str, vocab: &BTreeSet<String>) -> Vec<String> {
    let canonical = to_canonical(token);
    if canonical.is_empty() {
        return Vec::new();
    }

    let mut candidates: BTreeSet<String> = BTreeSet::new();

    for word in vocab {
        if strsim::levenshtein(&canonical, word) <= 2 {
            candidates.insert(word.clone());
        }
    }
    for variant in confusable_variants(&canonical) {
        for word in vocab {
            if strsim::levenshtein(&variant, word) <= 1 {
                candidates.insert(word.clone());
            }
        }
    }

    candidates.remove(&canonical);
    candidates.into_iter().take(MAX_CANDIDATES).collect()
}

fn confusable_variants(token: &str) -> Vec<String> {
    let chars: Vec<char> = token.chars().collect();
    let mut variants = Vec::new();
    for (i, c) in chars.iter().enumerate() {
        for (from, to) in CONFUSABLE_MAP {
            if c == from {
                for repl in *to {
                    let mut v = chars.clone();
                    v[i] = *repl;
                    variants.push(v.into_iter().collect());
                }
            }
        }
    }
    variants
}

/// Pick the winning candidate, or `None` when confidence is lacking.
fn select_best_candidate(original: &str, candidates: &[String]) -> Option<String> {
    let canonical = to_canonical(original);
    let mut scored: Vec<(f64, &String)> = candidates
        .iter()
        .map(|cand| (strsim::jaro_winkler(&canonical, cand) * 100.0, cand))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let (best_score, best) = scored.first()?;
    let second_score = scored.get(1).map(|(s, _)| *s).unwrap_or(0.0);

    if *best_score >= CONFIDENCE_THRESHOLD && best_score - second_score >= MIN_SCORE_GAP {
        Some((*best).clone())
    } else {
        None
    }
}
