// SPDX-License-Identifier: MIT OR Apache-2.0
//! IMAGE pipeline: OCR extraction → visual/lexical section grouping →
//! canonical tail.
//!
//! Structure is already decided at the OCR layer; the core and lexical
//! section stages never re-run over OCR output.

use crate::{canonical_tail, PipelineOutput, SourcePipeline};
use jdp_core::{ErrorCode, JobSource, ProcessingError, RawRequest, stage};
use jdp_keywords::KeywordRegistry;
use jdp_meta::DocumentMetaExtractor;
use jdp_ocr::{extract_document, extract_sections, OcrEngine, OcrEngineError, OcrStatus};
use std::sync::Arc;
use tracing::{debug, warn};

/// Pipeline for image requests.
pub struct OcrPipeline {
    registry: Arc<KeywordRegistry>,
    engine: Arc<dyn OcrEngine>,
    meta: DocumentMetaExtractor,
}

impl OcrPipeline {
    /// Build against a registry and a recognition engine.
    pub fn new(registry: Arc<KeywordRegistry>, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            meta: DocumentMetaExtractor::new(Arc::clone(&registry)),
            registry,
            engine,
        }
    }
}

impl SourcePipeline for OcrPipeline {
    fn source(&self) -> JobSource {
        JobSource::Image
    }

    fn process(&self, request: &RawRequest) -> Result<PipelineOutput, ProcessingError> {
        if request.images.is_empty() {
            return Err(
                ProcessingError::new(ErrorCode::OcrExtract, "request carries no image paths")
                    .with_stage(stage::OCR_EXTRACT),
            );
        }

        let extraction = extract_document(&*self.engine, &request.images, &self.registry)
            .map_err(|err| {
                let code = match &err {
                    OcrEngineError::ImageDecode { .. } => ErrorCode::OcrImageDecode,
                    _ => ErrorCode::OcrExtract,
                };
                ProcessingError::new(code, err.to_string())
                    .with_stage(stage::OCR_EXTRACT)
                    .with_source(err)
            })?;

        match extraction.status {
            OcrStatus::Fail => {
                return Err(ProcessingError::new(
                    ErrorCode::OcrExtract,
                    format!(
                        "ocr confidence {:.1} below the usable floor",
                        extraction.confidence
                    ),
                )
                .with_stage(stage::OCR_EXTRACT));
            }
            OcrStatus::Retry => {
                warn!(
                    request_id = %request.request_id,
                    confidence = extraction.confidence,
                    "ocr confidence low, proceeding"
                );
            }
            OcrStatus::Good => {}
        }
        debug!(
            request_id = %request.request_id,
            lines = extraction.lines.len(),
            confidence = extraction.confidence,
            "ocr extraction done"
        );

        // Metadata reads every OCR line, not just what survives the
        // section stages.
        let document_meta = self.meta.process(&extraction.line_texts());

        let sections = extract_sections(&extraction.lines, &self.registry);
        let canonical_map = canonical_tail(sections, &self.registry);

        Ok(PipelineOutput {
            canonical_map,
            document_meta,
        })
    }
}
