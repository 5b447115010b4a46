// Catalog scraper CLI
//
// Loads a JSON config, scrapes the configured shop with Chromium sessions
// and writes the records to SQLite and/or JSON/CSV files.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use kodegen_tools_shopscrape::{
    ChromiumSessionFactory, CompactRecord, HttpAssetResolver, LoggingProgress, OutputFormat,
    PersistenceGateway, PipelineOptions, Projection, ScrapeConfig, ScrapeOrchestrator, run_pipeline,
};

#[derive(Debug, Parser)]
#[command(name = "kodegen-shopscrape", version, about = "Concurrent catalog scraper")]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Write to the database only, no files
    #[arg(long, conflicts_with = "no_db")]
    db_only: bool,

    /// Skip the database, write files only
    #[arg(long)]
    no_db: bool,

    /// File output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Both)]
    format: OutputFormat,

    /// Write the compact per-record projection instead of full records
    #[arg(long)]
    custom_format: bool,

    /// Delete all stored products before scraping
    #[arg(long)]
    clear_db: bool,

    /// Directory for scraper.log
    #[arg(long, env = "SHOPSCRAPE_LOG_DIR", default_value = ".")]
    log_dir: PathBuf,
}

fn init_logging(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(log_dir, "scraper.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(false)
        .with_ansi(false); // No ANSI color codes for file output

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match ScrapeConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: could not load config {}: {e:#}", cli.config.display());
            eprintln!("Example: cp config.json.example config.json");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_logging(&cli.log_dir);

    let mut format = cli.format;
    if cli.db_only {
        config.override_database_enabled(true);
        format = OutputFormat::None;
    } else if cli.no_db {
        config.override_database_enabled(false);
    }
    let save_db = config.database().enabled;

    let gateway = match PersistenceGateway::connect(config.database()).await {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("Database unavailable: {e}");
            return ExitCode::FAILURE;
        }
    };

    let assets = match HttpAssetResolver::new(config.output_dir()) {
        Ok(assets) => assets,
        Err(e) => {
            error!("HTTP client setup failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    let factory = ChromiumSessionFactory::new(config.headless(), config.timeout());
    let orchestrator =
        ScrapeOrchestrator::new(config, factory, assets).with_progress(LoggingProgress);

    let stop = orchestrator.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight products...");
            stop.stop();
        }
    });

    let options = PipelineOptions {
        save_db,
        format,
        projection: if cli.custom_format {
            Some(Arc::new(CompactRecord) as Arc<dyn Projection>)
        } else {
            None
        },
        clear_db: cli.clear_db,
    };

    let outcome = run_pipeline(&orchestrator, &gateway, &options).await;
    gateway.close().await;

    match outcome {
        Ok(summary) if summary.is_success() => {
            info!("Done: {} products", summary.records.len());
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("Scrape failed: {e}");
            ExitCode::FAILURE
        }
    }
}
