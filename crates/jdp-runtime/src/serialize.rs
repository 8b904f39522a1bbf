// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outbound event construction.
//!
//! The pipelines keep dates in whatever raw form the document carried;
//! the wire contract is ISO-8601, normalised here. A date that does not
//! parse is logged and omitted rather than failing an otherwise good
//! event.

use chrono::{NaiveDate, Utc};
use jdp_broker::MessageCoordinates;
use jdp_core::event::{EVENT_VERSION, FAIL_EVENT_TYPE, SUCCESS_EVENT_TYPE};
use jdp_core::{
    BrokerCoordinates, FailEvent, PeriodType, ProcessingError, RawRequest, SuccessEvent,
};
use jdp_pipeline::PipelineOutput;
use tracing::warn;
use uuid::Uuid;

/// Date formats the extractors may deliver.
const DATE_FORMATS: &[&str] = &["%Y.%m.%d", "%Y-%m-%d", "%Y/%m/%d"];

/// Normalise one raw date to ISO-8601 (`YYYY-MM-DD`).
pub fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    warn!(raw, "unparseable date dropped from event");
    None
}

/// Build the success event for one processed request.
pub fn build_success_event(request: &RawRequest, output: &PipelineOutput) -> SuccessEvent {
    let period = &output.document_meta.recruitment_period;
    let period_type = match period.period_type {
        PeriodType::Unknown => None,
        other => Some(other),
    };

    SuccessEvent {
        event_id: Uuid::new_v4(),
        request_id: request.request_id.clone(),
        event_type: SUCCESS_EVENT_TYPE.to_string(),
        version: EVENT_VERSION.to_string(),
        occurred_at: Utc::now().timestamp_millis(),
        brand_name: request.brand_name.clone(),
        position_name: request.position_name.clone(),
        source: request.source,
        source_url: request.url.clone(),
        canonical_map: output.canonical_map.clone(),
        recruitment_period_type: period_type,
        opened_date: period.open_date.as_deref().and_then(normalize_date),
        closed_date: period.close_date.as_deref().and_then(normalize_date),
        skills: output.document_meta.skill_set.skills.clone(),
    }
}

/// Build the fail event for one failed request. Never copies any payload
/// field of the inbound message.
pub fn build_fail_event(
    request_id: &str,
    source: jdp_core::JobSource,
    error: &ProcessingError,
    worker_host: &str,
    processing_duration_ms: u64,
    coordinates: Option<&MessageCoordinates>,
) -> FailEvent {
    FailEvent {
        event_id: Uuid::new_v4(),
        request_id: request_id.to_string(),
        event_type: FAIL_EVENT_TYPE.to_string(),
        version: EVENT_VERSION.to_string(),
        occurred_at: Utc::now().timestamp_millis(),
        source,
        error_code: error.code,
        error_message: error.message.clone(),
        error_category: error.category(),
        pipeline_stage: error.stage.clone(),
        worker_host: worker_host.to_string(),
        processing_duration_ms,
        kafka_metadata: BrokerCoordinates {
            original_topic: coordinates.map(|c| c.topic.clone()),
            original_partition: coordinates.map(|c| c.partition),
            original_offset: coordinates.map(|c| c.offset),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdp_core::{
        CanonicalMap, DocumentMeta, ErrorCode, JobSource, RecruitmentPeriod, SemanticZone,
        SkillSet, stage,
    };

    fn request() -> RawRequest {
        RawRequest {
            request_id: "req-1".into(),
            brand_name: "브랜드".into(),
            position_name: "포지션".into(),
            source: JobSource::Text,
            text: Some("본문".into()),
            images: Vec::new(),
            url: None,
            event_id: None,
            occurred_at: None,
            version: None,
        }
    }

    #[test]
    fn dates_normalize_across_formats() {
        assert_eq!(normalize_date("2026.01.19").as_deref(), Some("2026-01-19"));
        assert_eq!(normalize_date("2026-01-19").as_deref(), Some("2026-01-19"));
        assert_eq!(normalize_date("2026/1/9").as_deref(), Some("2026-01-09"));
        assert_eq!(normalize_date("어제"), None);
    }

    #[test]
    fn success_event_carries_normalised_dates() {
        let mut map = CanonicalMap::new();
        map.push(SemanticZone::Requirements, "Java");
        let output = PipelineOutput {
            canonical_map: map,
            document_meta: DocumentMeta {
                recruitment_period: RecruitmentPeriod::fixed(
                    "2026.01.19",
                    "2026.02.06",
                    vec!["2026.01.19 ~ 2026.02.06".into()],
                ),
                skill_set: SkillSet::from_names(["java"]),
            },
        };
        let event = build_success_event(&request(), &output);
        assert_eq!(event.event_type, "JD_PREPROCESS_COMPLETED");
        assert_eq!(event.version, "v1");
        assert_eq!(event.opened_date.as_deref(), Some("2026-01-19"));
        assert_eq!(event.closed_date.as_deref(), Some("2026-02-06"));
        assert_eq!(event.recruitment_period_type, Some(PeriodType::Fixed));
        assert!(event.occurred_at > 0);
    }

    #[test]
    fn unknown_period_is_omitted() {
        let output = PipelineOutput::default();
        let event = build_success_event(&request(), &output);
        assert_eq!(event.recruitment_period_type, None);
        assert_eq!(event.opened_date, None);
        assert!(event.skills.is_empty());
    }

    #[test]
    fn fail_event_has_no_payload_and_full_coordinates() {
        let error = ProcessingError::new(ErrorCode::UrlFetch, "boom").with_stage(stage::FETCH);
        let coordinates = MessageCoordinates {
            topic: "jd.preprocess.url.request".into(),
            partition: 2,
            offset: 41,
        };
        let event = build_fail_event("req-9", JobSource::Url, &error, "worker-1", 1234, Some(&coordinates));
        assert_eq!(event.error_code, ErrorCode::UrlFetch);
        assert_eq!(event.pipeline_stage, "fetch");
        assert_eq!(event.kafka_metadata.original_offset, Some(41));
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("text").is_none());
        assert!(json.get("url").is_none());
    }

    #[test]
    fn event_ids_are_fresh_per_event() {
        let output = PipelineOutput::default();
        let a = build_success_event(&request(), &output);
        let b = build_success_event(&request(), &output);
        assert_ne!(a.event_id, b.event_id);
    }
}
