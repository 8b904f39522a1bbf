// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outbound event DTOs for the result and fail topics.
//!
//! Both events are camelCase JSON. The fail event never carries any field
//! of the inbound payload, only identifiers, the error description, and
//! the broker coordinates of the original message.

use crate::error::{ErrorCategory, ErrorCode};
use crate::meta::PeriodType;
use crate::request::JobSource;
use crate::CanonicalMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire value of [`SuccessEvent::event_type`].
pub const SUCCESS_EVENT_TYPE: &str = "JD_PREPROCESS_COMPLETED";
/// Wire value of [`FailEvent::event_type`].
pub const FAIL_EVENT_TYPE: &str = "JD_PREPROCESS_FAILED";
/// Wire value of the `version` field on both events.
pub const EVENT_VERSION: &str = "v1";

// ---------------------------------------------------------------------------
// SuccessEvent
// ---------------------------------------------------------------------------

/// Preprocessing result published to the success topic, keyed by
/// `requestId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEvent {
    /// Fresh id for this event.
    pub event_id: Uuid,
    /// Correlation id of the originating request.
    pub request_id: String,
    /// Always [`SUCCESS_EVENT_TYPE`].
    pub event_type: String,
    /// Always [`EVENT_VERSION`].
    pub version: String,
    /// Emission time, ms epoch.
    pub occurred_at: i64,
    /// Company name from the request.
    pub brand_name: String,
    /// Position title from the request.
    pub position_name: String,
    /// Source tag of the request.
    pub source: JobSource,
    /// Original page URL for URL-sourced requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Zone-keyed canonical output.
    pub canonical_map: CanonicalMap,
    /// Detected recruitment period type, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruitment_period_type: Option<PeriodType>,
    /// ISO-8601 (`YYYY-MM-DD`) open date for FIXED periods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_date: Option<String>,
    /// ISO-8601 (`YYYY-MM-DD`) close date for FIXED periods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_date: Option<String>,
    /// Canonical skill names, sorted ascending; may be empty.
    pub skills: Vec<String>,
}

// ---------------------------------------------------------------------------
// FailEvent
// ---------------------------------------------------------------------------

/// Broker coordinates of the original message, for upstream reprocessing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerCoordinates {
    /// Topic the request arrived on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_topic: Option<String>,
    /// Partition of the original message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_partition: Option<i32>,
    /// Offset of the original message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_offset: Option<i64>,
}

/// Processing failure published to the fail topic.
///
/// Carries everything downstream needs to decide on a retry and nothing of
/// the original payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailEvent {
    /// Fresh id for this event.
    pub event_id: Uuid,
    /// Correlation id of the originating request, when it could be read.
    pub request_id: String,
    /// Always [`FAIL_EVENT_TYPE`].
    pub event_type: String,
    /// Always [`EVENT_VERSION`].
    pub version: String,
    /// Emission time, ms epoch.
    pub occurred_at: i64,
    /// Source tag of the request.
    pub source: JobSource,
    /// Stable error code.
    pub error_code: ErrorCode,
    /// Human-readable description; no payload content.
    pub error_message: String,
    /// Retry hint derived from the code.
    pub error_category: ErrorCategory,
    /// Pipeline stage the failure was raised in.
    pub pipeline_stage: String,
    /// Hostname of the worker that failed, for node triage.
    pub worker_host: String,
    /// Wall-clock processing time until the failure.
    pub processing_duration_ms: u64,
    /// Location of the original message.
    pub kafka_metadata: BrokerCoordinates,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SemanticZone;

    #[test]
    fn success_event_wire_shape_is_camel_case() {
        let mut map = CanonicalMap::new();
        map.push(SemanticZone::Responsibilities, "백엔드 API 개발");
        let event = SuccessEvent {
            event_id: Uuid::nil(),
            request_id: "req-1".into(),
            event_type: SUCCESS_EVENT_TYPE.into(),
            version: EVENT_VERSION.into(),
            occurred_at: 1_770_000_000_000,
            brand_name: "브랜드".into(),
            position_name: "포지션".into(),
            source: JobSource::Text,
            source_url: None,
            canonical_map: map,
            recruitment_period_type: Some(PeriodType::Always),
            opened_date: None,
            closed_date: None,
            skills: vec!["java".into()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventType"], "JD_PREPROCESS_COMPLETED");
        assert_eq!(json["requestId"], "req-1");
        assert_eq!(json["source"], "TEXT");
        assert_eq!(json["recruitmentPeriodType"], "ALWAYS");
        assert_eq!(json["canonicalMap"]["responsibilities"][0], "백엔드 API 개발");
        // Absent optionals are omitted, not null.
        assert!(json.get("openedDate").is_none());
        assert!(json.get("sourceUrl").is_none());
    }

    #[test]
    fn fail_event_wire_shape() {
        let event = FailEvent {
            event_id: Uuid::nil(),
            request_id: "req-2".into(),
            event_type: FAIL_EVENT_TYPE.into(),
            version: EVENT_VERSION.into(),
            occurred_at: 1_770_000_000_000,
            source: JobSource::Url,
            error_code: ErrorCode::UrlFetch,
            error_message: "connect timed out".into(),
            error_category: ErrorCode::UrlFetch.category(),
            pipeline_stage: "fetch".into(),
            worker_host: "worker-1".into(),
            processing_duration_ms: 1200,
            kafka_metadata: BrokerCoordinates {
                original_topic: Some("jd.preprocess.url.request".into()),
                original_partition: Some(0),
                original_offset: Some(42),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["errorCode"], "PIPELINE_URL_001");
        assert_eq!(json["errorCategory"], "RECOVERABLE");
        assert_eq!(json["kafkaMetadata"]["originalOffset"], 42);
        // The original payload never rides along.
        assert!(json.get("text").is_none());
        assert!(json.get("url").is_none());
        assert!(json.get("images").is_none());
    }
}
