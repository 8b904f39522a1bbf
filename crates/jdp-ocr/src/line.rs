// SPDX-License-Identifier: MIT OR Apache-2.0
//! OCR line model and raw-fragment assembly.
//!
//! The engine returns positioned text fragments in recognition order.
//! [`build_lines`] puts them into visual reading order (rows bucketed by
//! a small y tolerance, then x), merges wrapped bullet continuations, and
//! applies minimal per-line normalisation.

use jdp_normalize::normalize_text;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Vertical bucket size for visual row ordering, px.
const ROW_TOLERANCE: f64 = 5.0;
/// Largest vertical gap a wrapped bullet continuation may bridge, px.
const MAX_Y_GAP: f64 = 25.0;
/// Glyph heights must be at least this similar for a merge.
const HEIGHT_SIMILAR_RATIO: f64 = 0.8;

/// Characters OCR engines sprinkle into Korean text; removed outright.
static OCR_NOISE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[|=~^]").expect("valid regex"));

/// Spurious spacing that OCR inserts between Hangul syllables.
static HANGUL_GAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Hangul}) +(\p{Hangul})").expect("valid regex"));

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box, px.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl BBox {
    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.w).max(other.x + other.w);
        let bottom = (self.y + self.h).max(other.y + other.h);
        BBox {
            x,
            y,
            w: right - x,
            h: bottom - y,
        }
    }

    /// Horizontal centre.
    pub fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }
}

/// One raw fragment as the engine reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrFragment {
    /// Recognised text.
    pub text: String,
    /// Engine confidence, 0–100.
    pub confidence: f64,
    /// Quadrilateral corner points.
    #[serde(rename = "box")]
    pub polygon: Vec<(f64, f64)>,
    /// Estimated glyph height, px.
    pub height: f64,
}

/// One normalised OCR line flowing through the pipeline. Built once by
/// [`build_lines`] and treated as immutable apart from token repair
/// rewriting `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrLine {
    /// Line text.
    pub text: String,
    /// Line confidence, 0–100.
    pub confidence: f64,
    /// Bounding box.
    pub bbox: BBox,
    /// Estimated glyph height, px.
    pub height: f64,
    /// Whitespace token count.
    pub token_count: usize,
    /// Visual header score assigned by the header detector.
    pub header_score: i32,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Assemble engine fragments into ordered, normalised lines.
pub fn build_lines(fragments: &[OcrFragment]) -> Vec<OcrLine> {
    let mut lines: Vec<OcrLine> = fragments
        .iter()
        .filter_map(|frag| {
            let text = normalize_line_text(&frag.text)?;
            let bbox = bbox_from_polygon(&frag.polygon);
            Some(OcrLine {
                token_count: text.split_whitespace().count(),
                text,
                confidence: frag.confidence,
                bbox,
                height: frag.height,
                header_score: 0,
            })
        })
        .collect();

    lines.sort_by(|a, b| {
        let row_a = (a.bbox.y / ROW_TOLERANCE).floor() as i64;
        let row_b = (b.bbox.y / ROW_TOLERANCE).floor() as i64;
        row_a.cmp(&row_b).then(a.bbox.x.total_cmp(&b.bbox.x))
    });

    merge_wrapped_lines(lines)
}

/// Per-line text normalisation: common character normalisation, OCR noise
/// chars removed, spurious gaps between Hangul syllables closed. Lines
/// reduced to a single character or one token of ≤ 2 chars are dropped.
fn normalize_line_text(raw: &str) -> Option<String> {
    let text = normalize_text(raw);
    let mut text = OCR_NOISE_CHARS.replace_all(&text, "").into_owned();
    // Fixpoint: consecutive gaps overlap, so one pass is not enough.
    while HANGUL_GAP.is_match(&text) {
        text = HANGUL_GAP.replace_all(&text, "$1$2").into_owned();
    }
    let text = text.trim().to_string();

    if text.is_empty() || text.chars().count() == 1 {
        return None;
    }
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() == 1 && tokens[0].chars().count() <= 2 {
        return None;
    }
    Some(text)
}

/// Merge a wrapped bullet continuation into its opening line.
///
/// A continuation merges when the previous line opens with a bullet, the
/// vertical gap is within [`MAX_Y_GAP`], glyph heights are similar, and
/// the continuation is not itself a bullet line. Bbox becomes the union,
/// confidence the minimum.
fn merge_wrapped_lines(lines: Vec<OcrLine>) -> Vec<OcrLine> {
    let mut merged: Vec<OcrLine> = Vec::with_capacity(lines.len());

    for line in lines {
        let Some(prev) = merged.last_mut() else {
            merged.push(line);
            continue;
        };

        let prev_is_bullet = prev.text.starts_with('•');
        let line_is_bullet = line.text.starts_with('•');
        let gap = line.bbox.y - (prev.bbox.y + prev.bbox.h);
        let height_ratio = if prev.height > 0.0 && line.height > 0.0 {
            prev.height.min(line.height) / prev.height.max(line.height)
        } else {
            0.0
        };

        if prev_is_bullet
            && !line_is_bullet
            && gap >= 0.0
            && gap <= MAX_Y_GAP
            && height_ratio >= HEIGHT_SIMILAR_RATIO
        {
            prev.text = format!("{} {}", prev.text, line.text);
            prev.bbox = prev.bbox.union(&line.bbox);
            prev.confidence = prev.confidence.min(line.confidence);
            prev.token_count = prev.text.split_whitespace().count();
        } else {
            merged.push(line);
        }
    }

    merged
}

fn bbox_from_polygon(polygon: &[(f64, f64)]) -> BBox {
    if polygon.is_empty() {
        return BBox::default();
    }
    let min_x = polygon.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let min_y = polygon.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_x = polygon.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let max_y = polygon.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    BBox {
        x: min_x,
        y: min_y,
        w: max_x - min_x,
        h: max_y - min_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f64, y: f64, w: f64, h: f64) -> OcrFragment {
        OcrFragment {
            text: text.into(),
            confidence: 90.0,
            polygon: vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)],
            height: h,
        }
    }

    #[test]
    fn lines_sort_into_reading_order() {
        let frags = vec![
            frag("오른쪽 위", 300.0, 10.0, 100.0, 20.0),
            frag("왼쪽 위", 10.0, 12.0, 100.0, 20.0),
            frag("아래 줄", 10.0, 60.0, 100.0, 20.0),
        ];
        let lines = build_lines(&frags);
        // Spurious spaces between Hangul syllables close up entirely.
        assert_eq!(lines[0].text, "왼쪽위");
        assert_eq!(lines[1].text, "오른쪽위");
        assert_eq!(lines[2].text, "아래줄");
    }

    #[test]
    fn noise_chars_and_hangul_gaps_are_cleaned() {
        let frags = vec![frag("백 엔드 |개발", 0.0, 0.0, 100.0, 20.0)];
        let lines = build_lines(&frags);
        assert_eq!(lines[0].text, "백엔드개발");
    }

    #[test]
    fn single_char_and_stub_lines_are_dropped() {
        let frags = vec![
            frag("-", 0.0, 0.0, 10.0, 20.0),
            frag("ab", 0.0, 30.0, 10.0, 20.0),
            frag("Java", 0.0, 60.0, 40.0, 20.0),
        ];
        let lines = build_lines(&frags);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Java");
    }

    #[test]
    fn wrapped_bullet_continuation_merges() {
        let frags = vec![
            frag("• 대용량 트래픽 환경에서", 0.0, 0.0, 200.0, 20.0),
            frag("안정적인 서비스 운영", 10.0, 24.0, 180.0, 19.0),
        ];
        let lines = build_lines(&frags);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "• 대용량트래픽환경에서 안정적인서비스운영");
        assert!(lines[0].bbox.h > 20.0);
    }

    #[test]
    fn distant_lines_do_not_merge() {
        let frags = vec![
            frag("• 첫 번째 항목", 0.0, 0.0, 200.0, 20.0),
            frag("멀리 떨어진 줄", 0.0, 100.0, 180.0, 20.0),
        ];
        let lines = build_lines(&frags);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn bullet_lines_do_not_merge_into_each_other() {
        let frags = vec![
            frag("• 첫 항목", 0.0, 0.0, 200.0, 20.0),
            frag("• 둘째 항목", 0.0, 24.0, 200.0, 20.0),
        ];
        let lines = build_lines(&frags);
        assert_eq!(lines.len(), 2);
    }
}
