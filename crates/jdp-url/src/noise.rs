// SPDX-License-Identifier: MIT OR Apache-2.0
//! Web-specific line noise filtering.
//!
//! Scraped pages repeat chrome the other sources never see: view
//! counters, D-day badges, copyright lines, and menu residue: long runs
//! of very short lines. Filtering is line-wise and conservative; body
//! prose is never shortened.

use jdp_keywords::KeywordRegistry;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Standalone UI labels dropped on sight.
const UI_WORDS: &[&str] = &[
    "지원하기", "즉시지원", "공유하기", "스크랩", "더보기", "접기", "닫기", "목록으로",
    "이전", "다음", "홈", "로그인", "검색", "초기화", "필터", "apply", "apply now", "share",
    "save", "close", "filter", "search", "menu",
];

/// Platform badge patterns: "3일 전", "조회 1,234", "D-7", "© …".
static BADGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d+\s*(일|시간|분)\s*전$",
        r"^조회\s*[\d,]+$",
        r"^지원자\s*[\d,]+$",
        r"^[Dd]-\d+$",
        r"^(©|ⓒ|\(c\)|Copyright)\s?.*$",
        r"^북마크\s*[\d,]*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Runs of at least this many consecutive short lines are menu residue.
const MENU_RUN_MIN: usize = 5;
/// Line length ceiling for a menu-residue member.
const MENU_LINE_MAX_CHARS: usize = 10;

/// Filter scraped lines: explicit UI words and badges out, duplicates
/// out (case-insensitive, first kept), then menu residue runs out unless
/// a header keyword vouches for the run.
pub fn filter_url_noise(lines: Vec<String>, registry: &KeywordRegistry) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept: Vec<String> = Vec::new();

    for line in lines {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let lowered = text.to_lowercase();
        if UI_WORDS.contains(&lowered.as_str()) {
            continue;
        }
        if BADGE_PATTERNS.iter().any(|p| p.is_match(text)) {
            continue;
        }
        if !seen.insert(lowered) {
            continue;
        }
        kept.push(text.to_string());
    }

    drop_menu_runs(kept, registry)
}

/// Remove runs of ≥ [`MENU_RUN_MIN`] consecutive short lines, keeping any
/// run that contains a header keyword.
fn drop_menu_runs(lines: Vec<String>, registry: &KeywordRegistry) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<String> = Vec::new();

    let flush = |run: &mut Vec<String>, out: &mut Vec<String>| {
        let is_menu = run.len() >= MENU_RUN_MIN
            && !run
                .iter()
                .any(|l| registry.is_header_keyword(l.trim().to_lowercase().as_str()));
        if !is_menu {
            out.append(run);
        } else {
            run.clear();
        }
    };

    for line in lines {
        if line.chars().count() <= MENU_LINE_MAX_CHARS {
            run.push(line);
        } else {
            flush(&mut run, &mut out);
            out.push(line);
        }
    }
    flush(&mut run, &mut out);

    out
}
