// SPDX-License-Identifier: MIT OR Apache-2.0
//! Inbound request model and lenient message parsing.
//!
//! The broker delivers UTF-8 JSON; [`RawRequest::parse`] turns one value
//! into a validated request or a tagged parse error. Parsing is lenient
//! where producers historically varied: `images` may arrive as a list or a
//! comma-separated string, `url` may arrive as `sourceUrl`, and `source`
//! matching is case-insensitive.

use crate::error::{ErrorCode, ProcessingError, stage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// JobSource
// ---------------------------------------------------------------------------

/// Where the JD content comes from. Selects the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobSource {
    /// Raw text payload.
    Text,
    /// One or more image paths, OCR'd per page.
    Image,
    /// A web URL, fetched and parsed.
    Url,
}

impl JobSource {
    /// Stable wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
            Self::Url => "URL",
        }
    }

    /// Case-insensitive parse from the wire string.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" => Some(Self::Text),
            "IMAGE" => Some(Self::Image),
            "URL" => Some(Self::Url),
            _ => None,
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RawRequest
// ---------------------------------------------------------------------------

/// A validated JD preprocessing request.
///
/// Exactly one payload field matches `source`: `text` for TEXT, `images`
/// for IMAGE, `url` for URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawRequest {
    /// Correlation id, unique per request.
    pub request_id: String,
    /// Company name.
    pub brand_name: String,
    /// Position title.
    pub position_name: String,
    /// Payload source tag.
    pub source: JobSource,
    /// Raw JD text (TEXT source).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image paths in page order (IMAGE source).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Page URL (URL source).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Upstream event id, when the producer sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Upstream emission time, ms epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<i64>,
    /// Producer message version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RawRequest {
    /// Parse one broker value into a request.
    ///
    /// Invalid JSON maps to `MSG_PARSE_001`; a missing or malformed field
    /// maps to `MSG_PARSE_002`. Error messages name the field, never the
    /// payload content.
    pub fn parse(raw: &str) -> Result<Self, ProcessingError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            ProcessingError::new(ErrorCode::MsgParseJson, "request value is not valid JSON")
                .with_stage(stage::PARSE)
                .with_source(e)
        })?;
        Self::from_value(&value)
    }

    /// Validate an already-decoded JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ProcessingError> {
        let obj = value
            .as_object()
            .ok_or_else(|| missing_field("request must be a JSON object"))?;

        let request_id = required_str(obj, "requestId")?;
        let brand_name = required_str(obj, "brandName")?;
        let position_name = required_str(obj, "positionName")?;

        let source_raw = required_str(obj, "source")?;
        let source = JobSource::from_wire(&source_raw).ok_or_else(|| {
            missing_field(format!(
                "invalid source '{source_raw}', expected one of TEXT | IMAGE | URL"
            ))
        })?;

        let mut text = None;
        let mut images = Vec::new();
        let mut url = None;

        match source {
            JobSource::Text => {
                text = Some(required_str(obj, "text")?);
            }
            JobSource::Image => {
                images = parse_images(obj.get("images"))?;
            }
            JobSource::Url => {
                url = Some(match obj.get("url").and_then(Value::as_str) {
                    Some(u) if !u.trim().is_empty() => u.to_string(),
                    _ => required_str(obj, "sourceUrl").map_err(|_| {
                        missing_field("'url' (or 'sourceUrl') is required when source=URL")
                    })?,
                });
            }
        }

        Ok(Self {
            request_id,
            brand_name,
            position_name,
            source,
            text,
            images,
            url,
            event_id: obj.get("eventId").and_then(Value::as_str).map(str::to_string),
            occurred_at: obj.get("occurredAt").and_then(Value::as_i64),
            version: obj.get("version").and_then(Value::as_str).map(str::to_string),
        })
    }
}

fn missing_field(message: impl Into<String>) -> ProcessingError {
    ProcessingError::new(ErrorCode::MsgParseMissingField, message).with_stage(stage::PARSE)
}

fn required_str(
    obj: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<String, ProcessingError> {
    match obj.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(missing_field(format!("missing required field '{field}'"))),
    }
}

/// `images` arrives as a list of paths, a list whose elements may embed
/// commas, or a single comma-separated string.
fn parse_images(value: Option<&Value>) -> Result<Vec<String>, ProcessingError> {
    let mut paths = Vec::new();
    match value {
        Some(Value::String(s)) => {
            paths.extend(s.split(',').map(str::trim).filter(|p| !p.is_empty()).map(String::from));
        }
        Some(Value::Array(items)) => {
            for item in items {
                let Some(s) = item.as_str() else {
                    return Err(missing_field("'images' entries must be strings"));
                };
                paths.extend(
                    s.split(',').map(str::trim).filter(|p| !p.is_empty()).map(String::from),
                );
            }
        }
        _ => {}
    }
    if paths.is_empty() {
        return Err(missing_field("'images' is required when source=IMAGE"));
    }
    Ok(paths)
}
