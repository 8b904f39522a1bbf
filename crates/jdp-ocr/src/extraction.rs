// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-input OCR extraction: per page, recognise → assemble lines →
//! visual header scoring → quality gate → post-process; pages concatenate
//! in input order and confidence is page-averaged.

use crate::engine::{OcrEngine, OcrEngineError};
use crate::line::{build_lines, OcrLine};
use crate::postprocess::postprocess_lines;
use crate::quality::{
    classify_confidence, filter_low_quality_lines, OcrStatus, MAX_GARBAGE_RATIO,
    MIN_LINE_CONFIDENCE,
};
use crate::visual::detect_visual_headers;
use jdp_keywords::KeywordRegistry;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of OCR over all pages of one request.
#[derive(Debug)]
pub struct OcrExtraction {
    /// Cleaned lines across pages, in input order.
    pub lines: Vec<OcrLine>,
    /// Page-averaged confidence, 0–100.
    pub confidence: f64,
    /// Usability classification of `confidence`.
    pub status: OcrStatus,
    /// Per-page failures that did not abort the extraction.
    pub page_errors: Vec<OcrEngineError>,
}

impl OcrExtraction {
    /// Line texts, for metadata extraction.
    pub fn line_texts(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text.clone()).collect()
    }
}

/// Run the engine over every image and assemble the document.
///
/// A failing page is recorded and skipped; the call only errors when no
/// page produced anything.
pub fn extract_document(
    engine: &dyn OcrEngine,
    image_paths: &[String],
    registry: &KeywordRegistry,
) -> Result<OcrExtraction, OcrEngineError> {
    let mut all_lines: Vec<OcrLine> = Vec::new();
    let mut confidences: Vec<f64> = Vec::new();
    let mut page_errors: Vec<OcrEngineError> = Vec::new();

    for path in image_paths {
        match process_page(engine, Path::new(path), registry) {
            Ok((lines, confidence)) => {
                debug!(page = %path, lines = lines.len(), confidence, "ocr page done");
                all_lines.extend(lines);
                if confidence > 0.0 {
                    confidences.push(confidence);
                }
            }
            Err(err) => {
                warn!(page = %path, error = %err, "ocr page failed");
                page_errors.push(err);
            }
        }
    }

    if confidences.is_empty() {
        // Nothing recognised at all; surface the first page error when
        // one exists so decode problems keep their identity.
        return Err(page_errors
            .into_iter()
            .next()
            .unwrap_or(OcrEngineError::Engine("no pages produced output".into())));
    }

    let confidence = confidences.iter().sum::<f64>() / confidences.len() as f64;
    Ok(OcrExtraction {
        lines: all_lines,
        confidence,
        status: classify_confidence(confidence),
        page_errors,
    })
}

fn process_page(
    engine: &dyn OcrEngine,
    path: &Path,
    registry: &KeywordRegistry,
) -> Result<(Vec<OcrLine>, f64), OcrEngineError> {
    let page = engine.recognize(path)?;
    let lines = build_lines(&page.fragments);
    let lines = detect_visual_headers(lines);
    let (passed, dropped) =
        filter_low_quality_lines(lines, MIN_LINE_CONFIDENCE, MAX_GARBAGE_RATIO);
    if !dropped.is_empty() {
        debug!(page = %path.display(), dropped = dropped.len(), "quality gate dropped lines");
    }
    let lines = postprocess_lines(passed, registry);
    Ok((lines, page.confidence))
}
