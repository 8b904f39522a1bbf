// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual header scoring over a page of OCR lines.
//!
//! Headers in JD images are bigger than body text and short. The score is
//! relative to the page's median glyph height; right-edge UI chrome and
//! date/metadata lines are excluded outright.

use crate::line::OcrLine;
use once_cell::sync::Lazy;
use regex::Regex;

/// A page needs at least this many measurable heights for useful stats.
const MIN_HEIGHT_SAMPLES: usize = 5;
/// Lines centred in the rightmost share of the page are UI chrome.
const RIGHT_UI_SHARE: f64 = 0.65;
/// Digit share at which a line reads as date/metadata.
const META_DIGIT_RATIO: f64 = 0.4;

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[./-]\d{1,2}[./-]\d{1,2}").expect("valid regex"));
static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}:\d{2}").expect("valid regex"));

/// Assign `header_score` to every line on the page.
///
/// With too few height samples every score stays zero and header
/// detection falls back to keywords alone.
pub fn detect_visual_headers(mut lines: Vec<OcrLine>) -> Vec<OcrLine> {
    let mut heights: Vec<f64> = lines.iter().map(|l| l.height).filter(|h| *h > 0.0).collect();
    if heights.len() < MIN_HEIGHT_SAMPLES {
        for line in &mut lines {
            line.header_score = 0;
        }
        return lines;
    }
    heights.sort_by(f64::total_cmp);
    let median = heights[heights.len() / 2];

    let page_width = lines
        .iter()
        .map(|l| l.bbox.x + l.bbox.w)
        .fold(0.0_f64, f64::max);

    for line in &mut lines {
        line.header_score = score_line(line, median, page_width);
    }
    lines
}

/// Score one line as a header candidate.
pub fn score_line(line: &OcrLine, median_height: f64, page_width: f64) -> i32 {
    if line.height <= 0.0 || median_height <= 0.0 {
        return 0;
    }
    if page_width > 0.0 && line.bbox.center_x() >= page_width * RIGHT_UI_SHARE {
        return 0;
    }
    if looks_like_date_or_meta(&line.text) {
        return 0;
    }

    let mut score = 0;
    let ratio = line.height / median_height;
    if ratio >= 1.5 {
        score += 3;
    } else if ratio >= 1.3 {
        score += 2;
    }
    if line.token_count <= 6 {
        score += 1;
    }
    if line.bbox.h > 0.0 && line.bbox.h / median_height >= 1.3 {
        score += 1;
    }
    score
}

fn looks_like_date_or_meta(text: &str) -> bool {
    if DATE.is_match(text) || TIME.is_match(text) {
        return true;
    }
    let len = text.chars().count().max(1);
    let digits = text.chars().filter(char::is_ascii_digit).count();
    digits as f64 / len as f64 >= META_DIGIT_RATIO
}
