//! A complete run: scrape, then persist, then write files.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::assets::AssetResolver;
use crate::content_saver::{self, FullRecord, Projection, project_all};
use crate::crawl_engine::{ProgressReporter, ScrapeOrchestrator, ScrapeResult};
use crate::page_extractor::ProductRecord;
use crate::persistence::PersistenceGateway;
use crate::session::SessionFactory;

/// Which flat files a run writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    #[default]
    Both,
    None,
}

impl OutputFormat {
    #[must_use]
    pub fn writes_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }

    #[must_use]
    pub fn writes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }
}

/// Where the records of a run end up
#[derive(Clone, Default)]
pub struct PipelineOptions {
    pub save_db: bool,
    pub format: OutputFormat,
    /// Applied to every record before file output; `None` writes full records
    pub projection: Option<Arc<dyn Projection>>,
    /// Empty the database before scraping
    pub clear_db: bool,
}

impl std::fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("save_db", &self.save_db)
            .field("format", &self.format)
            .field("projection", &self.projection.is_some())
            .field("clear_db", &self.clear_db)
            .finish()
    }
}

/// Outcome of [`run_pipeline`]
#[derive(Debug, Default)]
pub struct RunSummary {
    pub records: Vec<ProductRecord>,
    pub saved_to_db: usize,
    pub json_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// A run with zero records counts as failed
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Scrape with `orchestrator`, then hand the records to `gateway` and the
/// file writers as `options` dictate.
///
/// Persistence and file failures are logged and do not fail the run.
///
/// # Errors
///
/// Only the orchestrator's run-level errors.
pub async fn run_pipeline<F, A, P>(
    orchestrator: &ScrapeOrchestrator<F, A, P>,
    gateway: &PersistenceGateway,
    options: &PipelineOptions,
) -> ScrapeResult<RunSummary>
where
    F: SessionFactory,
    A: AssetResolver,
    P: ProgressReporter,
{
    let start = Instant::now();
    let config = orchestrator.config();
    info!("{}", "=".repeat(60));
    info!("Product scraper started: {}", config.base_url());
    info!(
        "Targets -> DB: {} | JSON: {} | CSV: {}",
        options.save_db,
        options.format.writes_json(),
        options.format.writes_csv()
    );
    info!("{}", "=".repeat(60));

    if options.clear_db {
        if gateway.clear_all().await {
            info!("Database cleared before run");
        } else {
            warn!("Database clear requested but nothing was cleared");
        }
    }

    let records = orchestrator.run().await?;
    let mut summary = RunSummary::default();

    if records.is_empty() {
        warn!("No products found");
        summary.elapsed = start.elapsed();
        return Ok(summary);
    }

    if options.save_db {
        if gateway.is_enabled() {
            info!("Writing to database...");
            summary.saved_to_db = gateway.save_batch(&records).await;
            info!("Database result: {}/{} rows", summary.saved_to_db, records.len());
        } else {
            warn!("Database storage requested, but the database is disabled in config");
        }
    }

    if options.format.writes_json() || options.format.writes_csv() {
        let rows = match &options.projection {
            Some(projection) => project_all(&records, projection.as_ref()),
            None => project_all(&records, &FullRecord),
        };
        let output_dir = config.output_dir();

        if options.format.writes_json() {
            match content_saver::save_json(rows.clone(), output_dir).await {
                Ok(path) => summary.json_path = Some(path),
                Err(e) => error!("JSON output failed: {e:#}"),
            }
        }
        if options.format.writes_csv() {
            match content_saver::save_csv(rows, output_dir).await {
                Ok(path) => summary.csv_path = path,
                Err(e) => error!("CSV output failed: {e:#}"),
            }
        }
    }

    summary.elapsed = start.elapsed();
    info!("{}", "-".repeat(60));
    info!("Finished. Total: {} products", records.len());
    info!("Time: {:.2} seconds", summary.elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));

    summary.records = records;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flags() {
        assert!(OutputFormat::Both.writes_json() && OutputFormat::Both.writes_csv());
        assert!(OutputFormat::Json.writes_json() && !OutputFormat::Json.writes_csv());
        assert!(!OutputFormat::None.writes_json() && !OutputFormat::None.writes_csv());
        assert_eq!(OutputFormat::default(), OutputFormat::Both);
    }

    #[test]
    fn empty_summary_is_failure() {
        assert!(!RunSummary::default().is_success());
    }
}
