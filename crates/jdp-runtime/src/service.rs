// SPDX-License-Identifier: MIT OR Apache-2.0
//! Service wiring: one OS thread per worker, a shared stop flag, and
//! graceful shutdown with a bounded drain.

use crate::worker::WorkerRuntime;
use jdp_broker::BrokerProducer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Poll interval while waiting for stop or for workers to drain.
const WAIT_TICK: Duration = Duration::from_millis(100);

/// The running service: all workers plus the shared producer.
pub struct Service {
    workers: Vec<WorkerRuntime>,
    producer: Arc<dyn BrokerProducer>,
    stop: Arc<AtomicBool>,
    shutdown_timeout: Duration,
}

impl Service {
    /// Assemble an empty service around the shared producer.
    pub fn new(
        producer: Arc<dyn BrokerProducer>,
        stop: Arc<AtomicBool>,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            workers: Vec::new(),
            producer,
            stop,
            shutdown_timeout,
        }
    }

    /// Register one worker. Workers share the service's stop flag by
    /// construction.
    pub fn add_worker(&mut self, worker: WorkerRuntime) {
        self.workers.push(worker);
    }

    /// The shared stop flag; setting it ends [`Service::run`].
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Request shutdown from any thread.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Install SIGTERM/SIGINT handling onto the stop flag.
    pub fn install_signal_handler(&self) -> Result<(), ctrlc::Error> {
        let stop = self.stop_flag();
        ctrlc::set_handler(move || {
            info!("shutdown signal received");
            stop.store(true, Ordering::Relaxed);
        })
    }

    /// Run all workers to completion.
    ///
    /// Blocks until the stop flag is set, gives each worker the
    /// shutdown timeout to finish its current message, then flushes and
    /// releases the producer. A worker exceeding the timeout is logged
    /// and left behind; the process is exiting anyway.
    pub fn run(self) {
        let mut handles = Vec::with_capacity(self.workers.len());
        for (idx, worker) in self.workers.into_iter().enumerate() {
            let handle = std::thread::Builder::new()
                .name(format!("jd-worker-{idx}"))
                .spawn(move || worker.run())
                .expect("spawn worker thread");
            handles.push(handle);
        }
        info!(workers = handles.len(), "service running");

        while !self.stop.load(Ordering::Relaxed) {
            std::thread::sleep(WAIT_TICK);
        }

        info!("service stopping");
        let deadline = Instant::now() + self.shutdown_timeout;
        for handle in handles {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(WAIT_TICK);
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                warn!(worker = %name, "worker exceeded shutdown timeout");
            }
        }

        if let Err(err) = self.producer.flush(self.shutdown_timeout) {
            warn!(error = %err, "producer flush failed at shutdown");
        }
        info!("service stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::FailBackupSink;
    use jdp_broker::InMemoryBroker;
    use jdp_core::{CanonicalMap, JobSource, ProcessingError, RawRequest};
    use jdp_pipeline::{PipelineOutput, SourcePipeline};

    struct OkPipeline;

    impl SourcePipeline for OkPipeline {
        fn source(&self) -> JobSource {
            JobSource::Text
        }

        fn process(&self, _request: &RawRequest) -> Result<PipelineOutput, ProcessingError> {
            Ok(PipelineOutput {
                canonical_map: CanonicalMap::new(),
                document_meta: Default::default(),
            })
        }
    }

    #[test]
    fn service_drains_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let broker = InMemoryBroker::new();
        broker.seed(
            "t",
            None,
            &serde_json::json!({
                "requestId": "req-1",
                "brandName": "b",
                "positionName": "p",
                "source": "TEXT",
                "text": "본문",
            })
            .to_string(),
        );

        let stop = Arc::new(AtomicBool::new(false));
        let producer: Arc<dyn BrokerProducer> = Arc::new(broker.producer());
        let mut service = Service::new(
            Arc::clone(&producer),
            Arc::clone(&stop),
            Duration::from_secs(5),
        );
        service.add_worker(WorkerRuntime::new(
            "text",
            Box::new(broker.consumer("t", "g")),
            producer,
            Box::new(OkPipeline),
            "out",
            "fail",
            Arc::new(FailBackupSink::new(dir.path())),
            Arc::clone(&stop),
            Duration::from_millis(5),
        ));

        let runner = std::thread::spawn(move || service.run());
        // Give the worker time to drain the seeded message, then stop.
        std::thread::sleep(Duration::from_millis(300));
        stop.store(true, Ordering::Relaxed);
        runner.join().unwrap();

        assert_eq!(broker.records("out").len(), 1);
        assert_eq!(broker.committed_offset("g", "t"), Some(1));
    }
}
