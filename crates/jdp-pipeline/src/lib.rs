// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-pipeline
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// IMAGE/OCR pipeline.
pub mod ocr;
/// TEXT pipeline.
pub mod text;
/// URL pipeline.
pub mod url;

pub use ocr::OcrPipeline;
pub use text::TextPipeline;
pub use url::UrlPipeline;

use jdp_core::{CanonicalMap, DocumentMeta, JobSource, ProcessingError, RawRequest, Section};
use jdp_keywords::KeywordRegistry;
use jdp_section::{build_canonical_map, filter_sections, post_validate, tag_sections};

/// Result of one pipeline activation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    /// Zone-keyed canonical output.
    pub canonical_map: CanonicalMap,
    /// Document-level metadata.
    pub document_meta: DocumentMeta,
}

/// One source's preprocessing pipeline.
///
/// Exactly one outcome per request: a [`PipelineOutput`] or a single
/// tagged [`ProcessingError`] with a code from the closed set.
pub trait SourcePipeline: Send + Sync {
    /// The source this pipeline serves.
    fn source(&self) -> JobSource;

    /// Run the full pipeline for one request.
    fn process(&self, request: &RawRequest) -> Result<PipelineOutput, ProcessingError>;
}

/// Shared tail of all three pipelines: structural repair, zone tagging,
/// blacklist filtering, canonical flattening.
pub(crate) fn canonical_tail(
    sections: Vec<Section>,
    registry: &KeywordRegistry,
) -> CanonicalMap {
    let sections = post_validate(sections, registry);
    let sections = tag_sections(sections, registry);
    let sections = filter_sections(sections);
    build_canonical_map(&sections)
}
