// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unified error taxonomy for the preprocessing workers.
//!
//! Every processing failure carries an [`ErrorCode`] (a machine-readable,
//! stable string tag from a closed set) plus the pipeline stage it was
//! raised in and a human-readable message. The worker runtime converts a
//! [`ProcessingError`] into a fail event at the outermost level; nothing
//! below the runtime unwinds past a message boundary.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Retry hint attached to every fail event.
///
/// The preprocessor itself never retries; this is advisory for the
/// downstream consumer of the fail topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorCategory {
    /// Transient failure; reprocessing the same request may succeed.
    Recoverable,
    /// Data problem; reprocessing the same request will fail again.
    Permanent,
    /// Cause unclassified.
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Recoverable => "RECOVERABLE",
            Self::Permanent => "PERMANENT",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serialises to the `{DOMAIN}_{NNN}` string that the fail
/// topic contract fixes; the strings never change across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ErrorCode {
    // -- Message parsing --
    /// Inbound value is not valid JSON.
    #[serde(rename = "MSG_PARSE_001")]
    MsgParseJson,
    /// A required field is missing or malformed.
    #[serde(rename = "MSG_PARSE_002")]
    MsgParseMissingField,

    // -- OCR pipeline --
    /// OCR produced no usable text or confidence below the floor.
    #[serde(rename = "PIPELINE_OCR_001")]
    OcrExtract,
    /// Image could not be read or decoded.
    #[serde(rename = "PIPELINE_OCR_002")]
    OcrImageDecode,

    // -- TEXT pipeline --
    /// Internal failure in the text pipeline.
    #[serde(rename = "PIPELINE_TEXT_001")]
    TextPipeline,

    // -- URL pipeline --
    /// Fetch failed on both the static and the browser leg.
    #[serde(rename = "PIPELINE_URL_001")]
    UrlFetch,
    /// Fetched document could not be parsed into a content block.
    #[serde(rename = "PIPELINE_URL_002")]
    UrlHtmlParse,

    // -- Infrastructure --
    /// Broker produce failed.
    #[serde(rename = "INFRA_KAFKA_001")]
    BrokerProduce,
    /// Local failure-backup write failed.
    #[serde(rename = "INFRA_STORAGE_001")]
    BackupWrite,

    // -- Catch-all --
    /// Anything not covered by a specific code.
    #[serde(rename = "UNKNOWN_001")]
    Unknown,
}

/// Every error code, for exhaustiveness checks in tests.
pub const ALL_CODES: &[ErrorCode] = &[
    ErrorCode::MsgParseJson,
    ErrorCode::MsgParseMissingField,
    ErrorCode::OcrExtract,
    ErrorCode::OcrImageDecode,
    ErrorCode::TextPipeline,
    ErrorCode::UrlFetch,
    ErrorCode::UrlHtmlParse,
    ErrorCode::BrokerProduce,
    ErrorCode::BackupWrite,
    ErrorCode::Unknown,
];

impl ErrorCode {
    /// Stable wire string for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MsgParseJson => "MSG_PARSE_001",
            Self::MsgParseMissingField => "MSG_PARSE_002",
            Self::OcrExtract => "PIPELINE_OCR_001",
            Self::OcrImageDecode => "PIPELINE_OCR_002",
            Self::TextPipeline => "PIPELINE_TEXT_001",
            Self::UrlFetch => "PIPELINE_URL_001",
            Self::UrlHtmlParse => "PIPELINE_URL_002",
            Self::BrokerProduce => "INFRA_KAFKA_001",
            Self::BackupWrite => "INFRA_STORAGE_001",
            Self::Unknown => "UNKNOWN_001",
        }
    }

    /// Retry-hint category for this code.
    ///
    /// Parse and pipeline failures are data problems, except the URL fetch
    /// leg where the network may simply have been unlucky. Infrastructure
    /// failures are worth retrying.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MsgParseJson
            | Self::MsgParseMissingField
            | Self::OcrExtract
            | Self::OcrImageDecode
            | Self::TextPipeline
            | Self::UrlHtmlParse => ErrorCategory::Permanent,

            Self::UrlFetch | Self::BrokerProduce | Self::BackupWrite => {
                ErrorCategory::Recoverable
            }

            Self::Unknown => ErrorCategory::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Well-known pipeline stage names carried on errors and fail events.
///
/// Stages are plain strings on the wire; these constants keep the spelling
/// in one place.
pub mod stage {
    /// Inbound message parsing.
    pub const PARSE: &str = "parse";
    /// Core line normalisation.
    pub const CORE: &str = "core_normalize";
    /// OCR engine invocation and line extraction.
    pub const OCR_EXTRACT: &str = "ocr_extract";
    /// Static or browser page fetch.
    pub const FETCH: &str = "fetch";
    /// HTML main-block extraction.
    pub const HTML_PARSE: &str = "html_parse";
    /// Header detection and section building.
    pub const SECTIONS: &str = "section_build";
    /// Structural repair of the section stream.
    pub const POST_VALIDATE: &str = "post_validate";
    /// Recruitment-period and skill extraction.
    pub const METADATA: &str = "metadata";
    /// Semantic zone tagging and section filtering.
    pub const SEMANTIC: &str = "semantic";
    /// Canonical map construction.
    pub const CANONICAL: &str = "canonical";
    /// Result publish to the success topic.
    pub const PUBLISH_RESULT: &str = "publish_result";
    /// Fail-event publish to the fail topic.
    pub const PUBLISH_FAIL: &str = "publish_fail";
    /// Local JSONL backup append.
    pub const BACKUP: &str = "backup";
}

// ---------------------------------------------------------------------------
// ProcessingError
// ---------------------------------------------------------------------------

/// Tagged processing failure raised inside a pipeline.
///
/// Built fluently:
///
/// ```
/// use jdp_core::error::{ErrorCode, ProcessingError, stage};
///
/// let err = ProcessingError::new(ErrorCode::UrlFetch, "connect timed out")
///     .with_stage(stage::FETCH);
/// assert_eq!(err.code.as_str(), "PIPELINE_URL_001");
/// assert_eq!(err.stage, "fetch");
/// ```
#[derive(Debug)]
pub struct ProcessingError {
    /// Stable error code.
    pub code: ErrorCode,
    /// Pipeline stage the error was raised in.
    pub stage: String,
    /// Human-readable description. Never contains request payload.
    pub message: String,
    /// Underlying cause, when one exists.
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ProcessingError {
    /// Create an error with the given code and message. Stage defaults to
    /// the code's domain-agnostic `"unknown"` until a stage is attached.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            stage: "unknown".to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Attach the pipeline stage the error belongs to.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Retry-hint category of the carried code.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Wrap an arbitrary error as `UNKNOWN_001`, preserving the cause.
    pub fn unknown(
        stage: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::new(ErrorCode::Unknown, source.to_string())
            .with_stage(stage)
            .with_source(source)
    }
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ProcessingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io;

    #[test]
    fn all_codes_have_unique_wire_strings() {
        let mut seen = HashSet::new();
        for code in ALL_CODES {
            assert!(seen.insert(code.as_str()), "duplicate: {}", code.as_str());
        }
        assert_eq!(seen.len(), ALL_CODES.len());
    }

    #[test]
    fn codes_serialize_to_wire_strings() {
        for code in ALL_CODES {
            let json = serde_json::to_string(code).unwrap();
            assert_eq!(json, format!(r#""{}""#, code.as_str()));
            let back: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *code);
        }
    }

    #[test]
    fn category_mapping_matches_contract() {
        assert_eq!(ErrorCode::MsgParseJson.category(), ErrorCategory::Permanent);
        assert_eq!(ErrorCode::OcrExtract.category(), ErrorCategory::Permanent);
        // URL fetch is the one recoverable pipeline code.
        assert_eq!(ErrorCode::UrlFetch.category(), ErrorCategory::Recoverable);
        assert_eq!(ErrorCode::UrlHtmlParse.category(), ErrorCategory::Permanent);
        assert_eq!(ErrorCode::BrokerProduce.category(), ErrorCategory::Recoverable);
        assert_eq!(ErrorCode::BackupWrite.category(), ErrorCategory::Recoverable);
        assert_eq!(ErrorCode::Unknown.category(), ErrorCategory::Unknown);
    }

    #[test]
    fn category_serializes_uppercase() {
        let json = serde_json::to_string(&ErrorCategory::Recoverable).unwrap();
        assert_eq!(json, r#""RECOVERABLE""#);
    }

    #[test]
    fn error_display_and_source_chain() {
        let inner = io::Error::new(io::ErrorKind::TimedOut, "connect timed out");
        let err = ProcessingError::new(ErrorCode::UrlFetch, "static fetch failed")
            .with_stage(stage::FETCH)
            .with_source(inner);
        assert_eq!(err.to_string(), "[PIPELINE_URL_001] static fetch failed");
        assert_eq!(err.stage, "fetch");
        let src = std::error::Error::source(&err).unwrap();
        assert_eq!(src.to_string(), "connect timed out");
    }

    #[test]
    fn unknown_wraps_any_error() {
        let inner = io::Error::other("boom");
        let err = ProcessingError::unknown(stage::CORE, inner);
        assert_eq!(err.code, ErrorCode::Unknown);
        assert_eq!(err.category(), ErrorCategory::Unknown);
        assert_eq!(err.message, "boom");
    }
}
