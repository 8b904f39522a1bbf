// SPDX-License-Identifier: MIT OR Apache-2.0
//! TEXT pipeline: Core → Metadata → Sections → canonical tail.

use crate::{canonical_tail, PipelineOutput, SourcePipeline};
use jdp_core::{ErrorCode, JobSource, ProcessingError, RawRequest, stage};
use jdp_keywords::KeywordRegistry;
use jdp_meta::DocumentMetaExtractor;
use jdp_normalize::CoreNormalizer;
use jdp_section::{build_sections, LexicalHeaderDetector};
use std::sync::Arc;
use tracing::debug;

/// Pipeline for raw-text requests.
#[derive(Debug, Clone)]
pub struct TextPipeline {
    registry: Arc<KeywordRegistry>,
    normalizer: CoreNormalizer,
    detector: LexicalHeaderDetector,
    meta: DocumentMetaExtractor,
}

impl TextPipeline {
    /// Build against a loaded keyword registry.
    pub fn new(registry: Arc<KeywordRegistry>) -> Self {
        Self {
            normalizer: CoreNormalizer::new(Arc::clone(&registry)),
            detector: LexicalHeaderDetector::new(Arc::clone(&registry)),
            meta: DocumentMetaExtractor::new(Arc::clone(&registry)),
            registry,
        }
    }
}

impl SourcePipeline for TextPipeline {
    fn source(&self) -> JobSource {
        JobSource::Text
    }

    fn process(&self, request: &RawRequest) -> Result<PipelineOutput, ProcessingError> {
        let text = request.text.as_deref().ok_or_else(|| {
            ProcessingError::new(ErrorCode::TextPipeline, "request carries no text payload")
                .with_stage(stage::CORE)
        })?;

        let lines = self.normalizer.process(text);
        debug!(request_id = %request.request_id, lines = lines.len(), "core normalisation done");

        // Metadata reads the full line document, before any section is
        // dropped or filtered.
        let document_meta = self.meta.process(&lines);

        let sections = build_sections(&lines, &self.detector);
        let canonical_map = canonical_tail(sections, &self.registry);

        Ok(PipelineOutput {
            canonical_map,
            document_meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdp_core::{PeriodType, SemanticZone};

    fn pipeline() -> TextPipeline {
        TextPipeline::new(Arc::new(KeywordRegistry::builtin()))
    }

    fn request(text: &str) -> RawRequest {
        RawRequest {
            request_id: "req-1".into(),
            brand_name: "커넥트웨이브".into(),
            position_name: "백엔드 엔지니어".into(),
            source: JobSource::Text,
            text: Some(text.into()),
            images: Vec::new(),
            url: None,
            event_id: None,
            occurred_at: None,
            version: None,
        }
    }

    const KOREAN_JD: &str = "주요업무\n\
        • 백엔드 API 개발\n\
        • 데이터 파이프라인 운영\n\
        \n\
        자격요건\n\
        • Java/Kotlin 3년 이상\n\
        • AWS 운영 경험\n\
        \n\
        우대사항\n\
        • Kafka 운영 경험\n\
        \n\
        마감일\n\
        상시채용";

    #[test]
    fn korean_jd_with_sections_maps_to_zones() {
        let out = pipeline().process(&request(KOREAN_JD)).unwrap();
        assert_eq!(
            out.canonical_map.get(SemanticZone::Responsibilities).unwrap(),
            &["백엔드 API 개발".to_string(), "데이터 파이프라인 운영".to_string()][..]
        );
        assert_eq!(
            out.canonical_map.get(SemanticZone::Requirements).unwrap(),
            &["Java/Kotlin 3년 이상".to_string(), "AWS 운영 경험".to_string()][..]
        );
        assert_eq!(
            out.canonical_map.get(SemanticZone::Preferred).unwrap(),
            &["Kafka 운영 경험".to_string()][..]
        );
        // The 마감일 section is blacklisted out of the canonical map.
        assert!(out.canonical_map.get(SemanticZone::Others).is_none());
    }

    #[test]
    fn korean_jd_metadata() {
        let out = pipeline().process(&request(KOREAN_JD)).unwrap();
        assert_eq!(
            out.document_meta.recruitment_period.period_type,
            PeriodType::Always
        );
        for skill in ["aws", "java", "kafka", "kotlin"] {
            assert!(
                out.document_meta.skill_set.skills.contains(&skill.to_string()),
                "missing {skill}"
            );
        }
    }

    #[test]
    fn fixed_date_range_is_detected() {
        let out = pipeline()
            .process(&request("모집기간\n2026.01.19 ~ 2026.02.06 (17:00)"))
            .unwrap();
        let period = &out.document_meta.recruitment_period;
        assert_eq!(period.period_type, PeriodType::Fixed);
        assert_eq!(period.open_date.as_deref(), Some("2026.01.19"));
        assert_eq!(period.close_date.as_deref(), Some("2026.02.06"));
    }

    #[test]
    fn empty_text_is_an_empty_success() {
        let out = pipeline().process(&request("")).unwrap();
        assert!(out.canonical_map.is_empty());
        assert_eq!(
            out.document_meta.recruitment_period.period_type,
            PeriodType::Unknown
        );
        assert!(out.document_meta.skill_set.is_empty());
    }

    #[test]
    fn deterministic_across_runs() {
        let p = pipeline();
        let a = p.process(&request(KOREAN_JD)).unwrap();
        let b = p.process(&request(KOREAN_JD)).unwrap();
        assert_eq!(a, b);
    }
}
