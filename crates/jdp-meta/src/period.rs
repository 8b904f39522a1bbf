// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recruitment period detection.
//!
//! One pass over the line document. A date range wins over everything;
//! otherwise schedule phrases decide, in priority FIXED > ALWAYS > OPEN >
//! UNKNOWN. `HH:MM` times are scrubbed from a working copy first so
//! `09:00` never reads as part of a date.

use jdp_core::RecruitmentPeriod;
use once_cell::sync::Lazy;
use regex::Regex;

/// Clock times, removed before date matching.
static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}:\d{2}").expect("valid regex"));

/// `YYYY.MM.DD ~ YYYY.MM.DD` with `.`/`-`/`/` separators.
static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        (\d{4}[./-]\d{1,2}[./-]\d{1,2})
        \s*~\s*
        (\d{4}[./-]\d{1,2}[./-]\d{1,2})",
    )
    .expect("valid regex")
});

/// Phrases marking an always-open posting.
const ALWAYS_TERMS: &[&str] = &["상시채용", "상시"];
/// Phrases marking a rolling (closes-when-filled) posting.
const OPEN_TERMS: &[&str] = &["수시채용", "수시", "채용시", "조기 마감"];

/// Detect the recruitment period for a document.
pub fn extract_recruitment_period(lines: &[String]) -> RecruitmentPeriod {
    // First date range wins outright.
    for line in lines {
        let working = TIME.replace_all(line, "");
        if let Some(caps) = DATE_RANGE.captures(&working) {
            return RecruitmentPeriod::fixed(
                caps[1].to_string(),
                caps[2].to_string(),
                vec![line.clone()],
            );
        }
    }

    // No range: collect schedule phrases from the original lines.
    let mut raw_texts: Vec<String> = Vec::new();
    let mut has_always = false;
    let mut has_open = false;
    for line in lines {
        let always_hit = ALWAYS_TERMS.iter().any(|t| line.contains(t));
        let open_hit = OPEN_TERMS.iter().any(|t| line.contains(t));
        if always_hit {
            has_always = true;
        }
        if open_hit {
            has_open = true;
        }
        if (always_hit || open_hit) && !raw_texts.contains(line) {
            raw_texts.push(line.clone());
        }
    }

    if has_always {
        RecruitmentPeriod::always(raw_texts)
    } else if has_open {
        RecruitmentPeriod::open(raw_texts)
    } else {
        RecruitmentPeriod::unknown()
    }
}
