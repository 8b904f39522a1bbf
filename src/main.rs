// SPDX-License-Identifier: MIT OR Apache-2.0
//! Service entry point: `serve` runs the three source workers against a
//! broker; `inspect` runs one pipeline over local input and prints the
//! result, without touching any broker.
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use jdp_broker::{BrokerProducer, InMemoryBroker};
use jdp_config::ServiceConfig;
use jdp_core::{JobSource, RawRequest};
use jdp_keywords::KeywordRegistry;
use jdp_ocr::{DisabledOcrEngine, FixtureOcrEngine, OcrEngine};
use jdp_pipeline::{OcrPipeline, SourcePipeline, TextPipeline, UrlPipeline};
use jdp_runtime::{build_success_event, FailBackupSink, Service, WorkerRuntime};
use jdp_url::{HttpFetcher, UnavailableBrowser};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit code for runtime errors.
const EXIT_RUNTIME_ERROR: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "jd-preprocess", version, about = "JD preprocessing workers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the TEXT/IMAGE/URL workers until SIGTERM/SIGINT.
    Serve {
        /// Broker transport: memory (local log, for smoke runs). A real
        /// broker client is provided by an adapter implementing the
        /// jdp-broker traits.
        #[arg(long, default_value = "memory")]
        broker: String,
    },

    /// One-shot pipeline runs over local input.
    #[command(subcommand)]
    Inspect(InspectCommands),
}

#[derive(Subcommand, Debug)]
enum InspectCommands {
    /// Run the TEXT pipeline over a local file and print the result.
    Text {
        /// Path to a UTF-8 text file holding one JD.
        #[arg(long)]
        file: PathBuf,
    },
    /// Fetch a URL through the URL pipeline and print the result.
    Url {
        /// JD page URL.
        #[arg(long)]
        url: String,
    },
    /// Run the IMAGE pipeline over local images and print the result.
    ///
    /// Requires an OCR engine (set OCR_FIXTURE_DIR for recorded pages).
    Image {
        /// Image paths in page order.
        #[arg(long, required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(EXIT_RUNTIME_ERROR);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { broker } => serve(&broker),
        Commands::Inspect(InspectCommands::Text { file }) => inspect_text(&file),
        Commands::Inspect(InspectCommands::Url { url }) => inspect_url(&url),
        Commands::Inspect(InspectCommands::Image { files }) => inspect_image(&files),
    }
}

fn load_registry(config: &ServiceConfig) -> Result<Arc<KeywordRegistry>> {
    let registry = match &config.keyword_dir {
        Some(dir) => KeywordRegistry::load_dir(dir)
            .with_context(|| format!("loading keyword files from {}", dir.display()))?,
        None => KeywordRegistry::builtin(),
    };
    Ok(Arc::new(registry))
}

fn ocr_engine() -> Arc<dyn OcrEngine> {
    // A real engine adapter plugs in here; the fixture engine covers
    // recorded pages for local runs.
    match std::env::var("OCR_FIXTURE_DIR") {
        Ok(dir) if !dir.trim().is_empty() => Arc::new(FixtureOcrEngine::with_root(dir)),
        _ => Arc::new(DisabledOcrEngine),
    }
}

fn serve(broker_mode: &str) -> Result<()> {
    if broker_mode != "memory" {
        bail!(
            "unknown broker '{broker_mode}': this binary ships the in-memory transport; \
             external brokers are wired through a jdp-broker adapter"
        );
    }

    let config = ServiceConfig::from_env().context("reading configuration")?;
    let registry = load_registry(&config)?;
    info!(
        group = %config.broker.consumer_group,
        text = %config.topics.text_request,
        ocr = %config.topics.ocr_request,
        url = %config.topics.url_request,
        concurrency = config.broker.consumer_concurrency,
        "starting workers"
    );

    let broker = InMemoryBroker::new();
    let producer: Arc<dyn BrokerProducer> = Arc::new(broker.producer());
    let backup = Arc::new(FailBackupSink::new(&config.fail_backup_dir));
    let stop = Arc::new(AtomicBool::new(false));

    let mut service = Service::new(
        Arc::clone(&producer),
        Arc::clone(&stop),
        config.worker.shutdown_timeout,
    );

    let pipelines: Vec<(String, Box<dyn SourcePipeline>)> = vec![
        (
            config.topics.text_request.clone(),
            Box::new(TextPipeline::new(Arc::clone(&registry))),
        ),
        (
            config.topics.ocr_request.clone(),
            Box::new(OcrPipeline::new(Arc::clone(&registry), ocr_engine())),
        ),
        (
            config.topics.url_request.clone(),
            Box::new(UrlPipeline::new(
                Arc::clone(&registry),
                Box::new(HttpFetcher::new().context("building http client")?),
                Box::new(UnavailableBrowser),
            )),
        ),
    ];
    for (topic, pipeline) in pipelines {
        let name = format!("{}-worker", pipeline.source().as_str().to_lowercase());
        service.add_worker(WorkerRuntime::new(
            name,
            Box::new(broker.consumer(&topic, &config.broker.consumer_group)),
            Arc::clone(&producer),
            pipeline,
            config.topics.result.clone(),
            config.topics.fail.clone(),
            Arc::clone(&backup),
            Arc::clone(&stop),
            config.broker.poll_timeout,
        ));
    }

    service
        .install_signal_handler()
        .context("installing signal handler")?;
    service.run();
    Ok(())
}

fn inspect_text(file: &PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let registry = Arc::new(KeywordRegistry::builtin());
    let pipeline = TextPipeline::new(registry);
    let request = inspect_request(JobSource::Text, Some(text), None);
    print_outcome(&pipeline, &request)
}

fn inspect_url(url: &str) -> Result<()> {
    let registry = Arc::new(KeywordRegistry::builtin());
    let pipeline = UrlPipeline::new(
        registry,
        Box::new(HttpFetcher::new().context("building http client")?),
        Box::new(UnavailableBrowser),
    );
    let request = inspect_request(JobSource::Url, None, Some(url.to_string()));
    print_outcome(&pipeline, &request)
}

fn inspect_image(files: &[PathBuf]) -> Result<()> {
    let registry = Arc::new(KeywordRegistry::builtin());
    let pipeline = OcrPipeline::new(registry, ocr_engine());
    let mut request = inspect_request(JobSource::Image, None, None);
    request.images = files.iter().map(|p| p.display().to_string()).collect();
    print_outcome(&pipeline, &request)
}

fn inspect_request(source: JobSource, text: Option<String>, url: Option<String>) -> RawRequest {
    RawRequest {
        request_id: "inspect".into(),
        brand_name: "inspect".into(),
        position_name: "inspect".into(),
        source,
        text,
        images: Vec::new(),
        url,
        event_id: None,
        occurred_at: None,
        version: None,
    }
}

fn print_outcome(pipeline: &dyn SourcePipeline, request: &RawRequest) -> Result<()> {
    match pipeline.process(request) {
        Ok(output) => {
            let event = build_success_event(request, &output);
            println!("{}", serde_json::to_string_pretty(&event)?);
            Ok(())
        }
        Err(error) => {
            bail!("[{}] {} (stage={})", error.code, error.message, error.stage)
        }
    }
}
