// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-ocr
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// OCR engine trait and the fixture engine used in tests.
pub mod engine;
/// Whole-input extraction across pages.
pub mod extraction;
/// Garbled-Hangul detection.
pub mod garbled;
/// Line model and raw-fragment assembly.
pub mod line;
/// Domain post-processing of gated lines.
pub mod postprocess;
/// Line-level quality gate and confidence classification.
pub mod quality;
/// Vocabulary-guarded token repair.
pub mod repair;
/// Header-grouped section extraction over OCR lines.
pub mod sections;
/// Visual header scoring.
pub mod visual;

pub use engine::{DisabledOcrEngine, FixtureOcrEngine, OcrEngine, OcrEngineError, OcrPage};
pub use extraction::{extract_document, OcrExtraction};
pub use garbled::is_garbled_korean;
pub use line::{build_lines, BBox, OcrFragment, OcrLine};
pub use postprocess::postprocess_lines;
pub use quality::{classify_confidence, filter_low_quality_lines, OcrStatus};
pub use sections::extract_sections;
pub use visual::detect_visual_headers;
