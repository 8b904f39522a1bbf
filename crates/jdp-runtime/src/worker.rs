// SPDX-License-Identifier: MIT OR Apache-2.0
//! The per-source worker loop.
//!
//! One blocking consumer, one shared producer. Per message: parse, run
//! the source pipeline, publish exactly one outbound event (success or
//! fail), falling back to the local backup when the fail publish itself
//! fails, then advance the offset. Nothing thrown by a single message
//! may stop the loop.

use crate::backup::{BackupRecord, FailBackupSink};
use crate::serialize::{build_fail_event, build_success_event};
use chrono::Utc;
use jdp_broker::{BrokerConsumer, BrokerError, BrokerProducer, InboundMessage};
use jdp_core::{ErrorCode, JobSource, ProcessingError, RawRequest, stage};
use jdp_pipeline::SourcePipeline;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Fallback request id when the inbound value could not be read at all.
const UNKNOWN_REQUEST_ID: &str = "unknown";

/// A single source's worker: consumer loop plus outbound publishing.
pub struct WorkerRuntime {
    name: String,
    consumer: Box<dyn BrokerConsumer>,
    producer: Arc<dyn BrokerProducer>,
    pipeline: Box<dyn SourcePipeline>,
    result_topic: String,
    fail_topic: String,
    backup: Arc<FailBackupSink>,
    stop: Arc<AtomicBool>,
    poll_timeout: Duration,
    worker_host: String,
}

impl WorkerRuntime {
    /// Assemble a worker. `stop` is shared across all workers of the
    /// process.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        consumer: Box<dyn BrokerConsumer>,
        producer: Arc<dyn BrokerProducer>,
        pipeline: Box<dyn SourcePipeline>,
        result_topic: impl Into<String>,
        fail_topic: impl Into<String>,
        backup: Arc<FailBackupSink>,
        stop: Arc<AtomicBool>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            consumer,
            producer,
            pipeline,
            result_topic: result_topic.into(),
            fail_topic: fail_topic.into(),
            backup,
            stop,
            poll_timeout,
            worker_host: hostname::get()
                .map(|h| h.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_string()),
        }
    }

    /// The source this worker serves.
    pub fn source(&self) -> JobSource {
        self.pipeline.source()
    }

    /// Run until the stop flag is set, then close the consumer.
    pub fn run(mut self) {
        info!(worker = %self.name, source = %self.source(), "worker started");
        while !self.stop.load(Ordering::Relaxed) {
            match self.run_once() {
                Ok(_) => {}
                Err(err) => {
                    warn!(worker = %self.name, error = %err, "poll failed");
                }
            }
        }
        self.consumer.close();
        info!(worker = %self.name, "worker stopped");
    }

    /// Poll once and process at most one message. Returns whether a
    /// message was handled. The offset advances unconditionally, even
    /// when the commit call itself fails.
    pub fn run_once(&mut self) -> Result<bool, BrokerError> {
        let Some(message) = self.consumer.poll(self.poll_timeout)? else {
            return Ok(false);
        };

        self.handle_message(&message);

        if let Err(err) = self.consumer.commit(&message.coordinates) {
            // The message was fully handled; a failed commit means at
            // most a duplicate on redelivery, never a stall.
            error!(
                worker = %self.name,
                offset = message.coordinates.offset,
                error = %err,
                "offset commit failed"
            );
        }
        Ok(true)
    }

    /// Parse → pipeline → publish. Exactly one outbound event (or a
    /// backup record) leaves this function.
    fn handle_message(&self, message: &InboundMessage) {
        let started = Instant::now();
        debug!(worker = %self.name, offset = message.coordinates.offset, "message received");

        let (request_id, outcome) = match RawRequest::parse(&message.value) {
            Ok(request) => {
                let outcome = self
                    .run_pipeline(&request)
                    .and_then(|output| self.publish_success(&request, &output));
                (request.request_id.clone(), outcome)
            }
            Err(parse_error) => (salvage_request_id(&message.value), Err(parse_error)),
        };

        match outcome {
            Ok(()) => {
                info!(
                    worker = %self.name,
                    request_id = %request_id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "request processed"
                );
            }
            Err(error) => {
                self.publish_fail(&request_id, &error, message, started);
            }
        }
    }

    /// Run the pipeline with panic containment: anything that unwinds
    /// out of a pipeline becomes `UNKNOWN_001` instead of taking the
    /// worker thread down with it.
    fn run_pipeline(
        &self,
        request: &RawRequest,
    ) -> Result<jdp_pipeline::PipelineOutput, ProcessingError> {
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.pipeline.process(request)
        }))
        .unwrap_or_else(|payload| {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "pipeline panicked".to_string());
            Err(ProcessingError::new(ErrorCode::Unknown, detail).with_stage("pipeline"))
        })
    }

    fn publish_success(
        &self,
        request: &RawRequest,
        output: &jdp_pipeline::PipelineOutput,
    ) -> Result<(), ProcessingError> {
        let event = build_success_event(request, output);
        let value = serde_json::to_string(&event)
            .map_err(|e| ProcessingError::unknown(stage::PUBLISH_RESULT, e))?;
        self.producer
            .publish(&self.result_topic, &request.request_id, &value)
            .map_err(|e| {
                ProcessingError::new(ErrorCode::BrokerProduce, e.to_string())
                    .with_stage(stage::PUBLISH_RESULT)
                    .with_source(e)
            })
    }

    fn publish_fail(
        &self,
        request_id: &str,
        error: &ProcessingError,
        message: &InboundMessage,
        started: Instant,
    ) {
        let duration_ms = started.elapsed().as_millis() as u64;
        warn!(
            worker = %self.name,
            request_id = %request_id,
            code = %error.code,
            stage = %error.stage,
            duration_ms,
            "request failed"
        );

        let event = build_fail_event(
            request_id,
            self.source(),
            error,
            &self.worker_host,
            duration_ms,
            Some(&message.coordinates),
        );
        let value = match serde_json::to_string(&event) {
            Ok(value) => value,
            Err(e) => {
                error!(request_id = %request_id, error = %e, "fail event serialisation failed");
                return;
            }
        };

        if let Err(publish_error) = self.producer.publish(&self.fail_topic, request_id, &value) {
            self.write_backup(request_id, error, &publish_error);
        }
    }

    /// Last resort: the fail topic is unreachable, keep the record
    /// locally. A failing backup leaves only the log line.
    fn write_backup(
        &self,
        request_id: &str,
        error: &ProcessingError,
        publish_error: &BrokerError,
    ) {
        let record = BackupRecord {
            request_id: request_id.to_string(),
            source: self.source().as_str().to_string(),
            error_code: error.code.as_str().to_string(),
            error_message: error.message.clone(),
            occurred_at: Utc::now().to_rfc3339(),
            publish_error: publish_error.to_string(),
            worker_host: self.worker_host.clone(),
        };
        match self.backup.write(&record) {
            Ok(()) => {
                warn!(
                    request_id = %request_id,
                    code = %record.error_code,
                    "fail event backed up locally"
                );
            }
            Err(backup_error) => {
                error!(
                    request_id = %request_id,
                    code = %record.error_code,
                    publish_error = %publish_error,
                    backup_error = %backup_error,
                    "fail event lost: backup write failed"
                );
            }
        }
    }
}

/// Best-effort request id from an arbitrary inbound value.
fn salvage_request_id(value: &str) -> String {
    serde_json::from_str::<serde_json::Value>(value)
        .ok()
        .and_then(|v| v.get("requestId").and_then(|id| id.as_str()).map(String::from))
        .unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_string())
}
