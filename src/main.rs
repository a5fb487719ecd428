use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tender_watch::config::AppConfig;
use tender_watch::error::AppError;
use tender_watch::telemetry;
use tender_watch::workflows::screening::{
    screening_router, InMemoryCaseStore, JsonFileCaseStore, JsonFileTenderSource,
    ReferencePriceIndex, ScoringConfig, ScoringEngine, ScreeningPipeline, Vocabulary,
};
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "tender-watch",
    about = "Score public procurement tenders for overpricing and collusion risk",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one screening batch against a tender feed and write the case file
    Screen(ScreenArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Tender feed to screen when a run is triggered (defaults to the data dir)
    #[arg(long)]
    feed: Option<PathBuf>,
    /// Reference price table as CSV (defaults to the built-in table)
    #[arg(long)]
    reference: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScreenArgs {
    /// Tender feed to screen (defaults to the data dir)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Destination for the ranked case file (defaults to the data dir)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Lookback window handed to the ingestion collaborator
    #[arg(long, default_value_t = 7)]
    days_back: u32,
    /// Reference price table as CSV (defaults to the built-in table)
    #[arg(long)]
    reference: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Screen(args) => run_screen(args),
    }
}

fn build_engine(reference: Option<&PathBuf>) -> Result<ScoringEngine, AppError> {
    let index = match reference {
        Some(path) => ReferencePriceIndex::from_csv_reader(File::open(path)?)?,
        None => ReferencePriceIndex::builtin(),
    };
    Ok(ScoringEngine::new(
        ScoringConfig::default(),
        index,
        Vocabulary::default(),
    )?)
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let engine = Arc::new(build_engine(args.reference.as_ref())?);
    let feed = args.feed.unwrap_or_else(|| config.storage.tender_feed());
    let source = Arc::new(JsonFileTenderSource::new(feed));
    let store = Arc::new(InMemoryCaseStore::default());
    let pipeline = Arc::new(ScreeningPipeline::new(source, store, engine));

    let app = screening_router(pipeline)
        .merge(
            Router::new()
                .route("/health", get(healthcheck))
                .route("/ready", get(readiness_endpoint))
                .route("/metrics", get(metrics_endpoint)),
        )
        .layer(Extension(state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tender screening service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let engine = Arc::new(build_engine(args.reference.as_ref())?);
    let input = args.input.unwrap_or_else(|| config.storage.tender_feed());
    let output = args.output.unwrap_or_else(|| config.storage.case_file());

    let source = Arc::new(JsonFileTenderSource::new(input));
    let store = Arc::new(JsonFileCaseStore::new(output.clone()));
    let pipeline = ScreeningPipeline::new(source, store, engine);

    let report = pipeline.run(args.days_back)?;

    println!(
        "screened {} tender(s): {} scored, {} skipped, {} suspicious",
        report.collected, report.scored, report.skipped, report.suspicious
    );
    println!("ranked cases written to {}", output.display());
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
