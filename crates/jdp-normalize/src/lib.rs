// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-normalize
#![deny(unsafe_code)]
#![warn(missing_docs)]

use jdp_keywords::{KeywordRegistry, NoisePatterns};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

// ---------------------------------------------------------------------------
// Precompiled patterns
// ---------------------------------------------------------------------------

/// Space insertion at Hangul→ASCII boundaries.
static HANGUL_THEN_ASCII: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Hangul})([A-Za-z0-9])").expect("valid regex"));

/// Space insertion at ASCII-letter→Hangul boundaries. Digits stay glued
/// to a following Hangul counter ("3년", "0년").
static ASCII_THEN_HANGUL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z])(\p{Hangul})").expect("valid regex"));

/// Runs of two or more spaces (newlines untouched).
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid regex"));

/// Bullet and enumeration prefixes unified to `"• "`.
///
/// Circled digits are listed for completeness although NFKC usually folds
/// them to plain digits before this pattern runs.
static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<indent>\s*)
        (?:
            [•·\-–—*▪○●▶] |
            \d{1,3}[.)] |
            \(\d{1,3}\) |
            [①②③④⑤⑥⑦⑧⑨⑩] |
            [가나다라마바사아자차카타파하][.)]
        )
        \s+
        (?P<content>.+)$",
    )
    .expect("valid regex")
});

/// Characters that carry meaning for the damage guard.
static MEANING_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9\p{Hangul}]").expect("valid regex"));

/// Everything that is neither meaning character nor whitespace.
static SPECIAL_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9\p{Hangul}\s]").expect("valid regex"));

/// The unified bullet prefix produced by [`normalize_bullets`].
pub const STANDARD_BULLET: &str = "• ";

// ---------------------------------------------------------------------------
// CoreNormalizer
// ---------------------------------------------------------------------------

/// Core preprocessing entry point shared by every source pipeline.
///
/// Stages run in fixed order: character normalisation, whole-line noise
/// removal, line segmentation, bullet unification, damage guard.
#[derive(Debug, Clone)]
pub struct CoreNormalizer {
    registry: Arc<KeywordRegistry>,
}

impl CoreNormalizer {
    /// Build against a loaded keyword registry.
    pub fn new(registry: Arc<KeywordRegistry>) -> Self {
        Self { registry }
    }

    /// Reduce one raw text blob to the line document contract.
    pub fn process(&self, raw: &str) -> Vec<String> {
        let text = normalize_text(raw);
        let text = remove_ui_noise(&text, self.registry.noise());
        let lines = segment_lines(&text);
        let lines = normalize_bullets(lines);
        guard_text_damage(lines)
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Character-level normalisation of the whole blob.
///
/// NFKC, LF line endings, BOM/zero-width/control removal, tabs to spaces,
/// a space at every Hangul↔ASCII boundary, space runs collapsed.
pub fn normalize_text(raw: &str) -> String {
    let composed: String = raw.nfkc().collect();

    let mut cleaned = String::with_capacity(composed.len());
    let mut chars = composed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                // CRLF and bare CR both become LF.
                if chars.peek() == Some(&'\n') {
                    continue;
                }
                cleaned.push('\n');
            }
            '\t' => cleaned.push(' '),
            '\u{FEFF}' | '\u{200B}'..='\u{200D}' | '\u{2060}' => {}
            c if c.is_control() && c != '\n' => {}
            c => cleaned.push(c),
        }
    }

    let spaced = HANGUL_THEN_ASCII.replace_all(&cleaned, "$1 $2");
    let spaced = ASCII_THEN_HANGUL.replace_all(&spaced, "$1 $2");
    MULTI_SPACE.replace_all(&spaced, " ").into_owned()
}

/// Drop whole lines that match the configured UI/system noise patterns.
/// Substrings are never removed from inside a line.
pub fn remove_ui_noise(text: &str, patterns: &NoisePatterns) -> String {
    text.lines()
        .filter(|line| !patterns.is_noise_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split on LF, trim, drop empty lines. Order is preserved; blank lines
/// carry no structural signal downstream.
pub fn segment_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Unify every bullet/enumeration prefix to [`STANDARD_BULLET`], keeping
/// indent and content untouched.
pub fn normalize_bullets(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| match BULLET_PREFIX.captures(&line) {
            Some(caps) => format!("{}{}{}", &caps["indent"], STANDARD_BULLET, &caps["content"]),
            None => line,
        })
        .collect()
}

/// Drop obviously broken lines; keep everything else.
pub fn guard_text_damage(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| !is_obviously_broken(line))
        .collect()
}

/// A line is obviously broken when it is very short with no meaning
/// character, or long enough that a > 60% special-character share cannot
/// be a formatting accident.
fn is_obviously_broken(line: &str) -> bool {
    let stripped = line.trim();
    if stripped.is_empty() {
        return false;
    }
    let len = stripped.chars().count();

    if len <= 3 && !MEANING_CHAR.is_match(stripped) {
        return true;
    }
    if len >= 5 {
        let special = SPECIAL_CHAR.find_iter(stripped).count();
        if special as f64 / len as f64 > 0.6 {
            return true;
        }
    }
    false
}
