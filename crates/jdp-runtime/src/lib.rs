// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-runtime
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Append-only JSONL backup of last resort.
pub mod backup;
/// Outbound event construction and date normalisation.
pub mod serialize;
/// Service wiring: worker threads and graceful shutdown.
pub mod service;
/// The per-source worker loop.
pub mod worker;

pub use backup::{BackupRecord, FailBackupSink};
pub use serialize::{build_fail_event, build_success_event, normalize_date};
pub use service::Service;
pub use worker::WorkerRuntime;
