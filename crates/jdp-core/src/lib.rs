// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-core
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Canonical-map output type.
pub mod canonical;
/// Unified error taxonomy with stable error codes.
pub mod error;
/// Outbound success and fail event DTOs.
pub mod event;
/// Document-level metadata: recruitment period and skill set.
pub mod meta;
/// Inbound request model and lenient message parsing.
pub mod request;
/// Section document model and semantic zones.
pub mod section;

pub use canonical::CanonicalMap;
pub use error::{ErrorCategory, ErrorCode, ProcessingError, stage, ALL_CODES};
pub use event::{BrokerCoordinates, FailEvent, SuccessEvent};
pub use meta::{DocumentMeta, PeriodType, RecruitmentPeriod, SkillSet};
pub use request::{JobSource, RawRequest};
pub use section::{Section, SemanticZone, ALL_ZONES};
