// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-level quality gate and page confidence classification.
//!
//! The gate blocks only lines the engine itself does not trust or that
//! are mostly garbage tokens; it never corrects text and never judges JD
//! meaning. Dropped lines are kept with their reason for threshold
//! tuning.

use crate::line::OcrLine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default engine-confidence floor for a line.
pub const MIN_LINE_CONFIDENCE: f64 = 45.0;
/// Default garbage-token share above which a line is dropped.
pub const MAX_GARBAGE_RATIO: f64 = 0.6;

/// Page confidence at or above this is usable as-is.
pub const GOOD_THRESHOLD: f64 = 85.0;
/// Page confidence at or above this is usable but worth re-running.
pub const RETRY_THRESHOLD: f64 = 60.0;

// ---------------------------------------------------------------------------
// OcrStatus
// ---------------------------------------------------------------------------

/// Overall usability of an OCR extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OcrStatus {
    /// Usable directly.
    Good,
    /// Usable, but a re-capture would help.
    Retry,
    /// Unusable; the pipeline fails the request.
    Fail,
}

impl fmt::Display for OcrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Good => "GOOD",
            Self::Retry => "RETRY",
            Self::Fail => "FAIL",
        };
        f.write_str(s)
    }
}

/// Classify a page-averaged confidence.
pub fn classify_confidence(confidence: f64) -> OcrStatus {
    if confidence >= GOOD_THRESHOLD {
        OcrStatus::Good
    } else if confidence >= RETRY_THRESHOLD {
        OcrStatus::Retry
    } else {
        OcrStatus::Fail
    }
}

// ---------------------------------------------------------------------------
// Quality gate
// ---------------------------------------------------------------------------

/// Why a line was dropped by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Text empty after normalisation.
    EmptyText,
    /// Engine confidence under the floor.
    LowConfidence,
    /// Garbage-token share over the ceiling.
    HighGarbageRatio,
}

/// A dropped line with its reason, retained for analysis.
#[derive(Debug, Clone)]
pub struct DroppedLine {
    /// Why the line was dropped.
    pub reason: DropReason,
    /// The line itself.
    pub line: OcrLine,
}

/// Split lines into gate-passing and dropped.
pub fn filter_low_quality_lines(
    lines: Vec<OcrLine>,
    min_confidence: f64,
    max_garbage_ratio: f64,
) -> (Vec<OcrLine>, Vec<DroppedLine>) {
    let mut passed = Vec::with_capacity(lines.len());
    let mut dropped = Vec::new();

    for line in lines {
        let text = line.text.trim();
        if text.is_empty() {
            dropped.push(DroppedLine {
                reason: DropReason::EmptyText,
                line,
            });
            continue;
        }
        if line.confidence < min_confidence {
            dropped.push(DroppedLine {
                reason: DropReason::LowConfidence,
                line,
            });
            continue;
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let garbage = tokens.iter().filter(|t| looks_garbage_token(t)).count();
        if garbage as f64 / tokens.len() as f64 > max_garbage_ratio {
            dropped.push(DroppedLine {
                reason: DropReason::HighGarbageRatio,
                line,
            });
            continue;
        }

        passed.push(line);
    }

    (passed, dropped)
}

/// Conservative garbage-token detector: single characters and tokens that
/// are mostly non-alphanumeric. Technical tokens (k8s, gRPC, Node.js) all
/// clear the 40% alphanumeric bar easily.
pub fn looks_garbage_token(token: &str) -> bool {
    let len = token.chars().count();
    if len <= 1 {
        return true;
    }
    let alnum = token.chars().filter(|c| c.is_alphanumeric()).count();
    (alnum as f64 / len as f64) < 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::BBox;

    fn line(text: &str, confidence: f64) -> OcrLine {
        OcrLine {
            text: text.into(),
            confidence,
            bbox: BBox::default(),
            height: 20.0,
            token_count: text.split_whitespace().count(),
            header_score: 0,
        }
    }

    #[test]
    fn confidence_classification_thresholds() {
        assert_eq!(classify_confidence(91.0), OcrStatus::Good);
        assert_eq!(classify_confidence(85.0), OcrStatus::Good);
        assert_eq!(classify_confidence(70.0), OcrStatus::Retry);
        assert_eq!(classify_confidence(60.0), OcrStatus::Retry);
        assert_eq!(classify_confidence(59.9), OcrStatus::Fail);
    }

    #[test]
    fn low_confidence_lines_are_dropped_with_reason() {
        let (passed, dropped) =
            filter_low_quality_lines(vec![line("주요업무", 30.0)], MIN_LINE_CONFIDENCE, MAX_GARBAGE_RATIO);
        assert!(passed.is_empty());
        assert_eq!(dropped[0].reason, DropReason::LowConfidence);
    }

    #[test]
    fn garbage_heavy_lines_are_dropped() {
        let (passed, dropped) = filter_low_quality_lines(
            vec![line("%% ~~ ## Java", 90.0)],
            MIN_LINE_CONFIDENCE,
            MAX_GARBAGE_RATIO,
        );
        assert!(passed.is_empty());
        assert_eq!(dropped[0].reason, DropReason::HighGarbageRatio);
    }

    #[test]
    fn clean_lines_pass() {
        let (passed, dropped) = filter_low_quality_lines(
            vec![line("• 백엔드 API 개발", 92.0)],
            MIN_LINE_CONFIDENCE,
            MAX_GARBAGE_RATIO,
        );
        assert_eq!(passed.len(), 1);
        assert!(dropped.is_empty());
    }

    #[test]
    fn technical_tokens_are_not_garbage() {
        for token in ["k8s", "gRPC", "Node.js", "CI/CD"] {
            assert!(!looks_garbage_token(token), "{token}");
        }
        for token in ["%", "~~~", "##!!"] {
            assert!(looks_garbage_token(token), "{token}");
        }
    }
}
