pub mod assets;
pub mod browser_profile;
pub mod browser_setup;
pub mod config;
pub mod content_saver;
pub mod crawl_engine;
pub mod page_extractor;
pub mod persistence;
pub mod pipeline;
pub mod session;
pub mod utils;

pub use assets::{AssetError, AssetResolver, HttpAssetResolver};
pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{DatabaseConfig, LoginConfig, ScrapeConfig, SelectorMap};
pub use content_saver::{CompactRecord, FullRecord, Projection};
pub use crawl_engine::{
    FolderCounter, LoggingProgress, NoOpProgress, ProgressReporter, ScrapeError, ScrapeOrchestrator,
    ScrapeResult, StopFlag,
};
pub use page_extractor::schema::*;
pub use persistence::{PersistenceError, PersistenceGateway};
pub use pipeline::{OutputFormat, PipelineOptions, RunSummary, run_pipeline};
pub use session::{
    BrowserSession, ChromiumSessionFactory, SessionCredential, SessionError, SessionFactory,
};
#[cfg(any(test, feature = "testing"))]
pub use session::{StaticDomFactory, StaticSite};
pub use utils::sanitize_folder_name;

/// Scrape `config`'s site with headless-aware Chromium sessions and HTTP
/// image downloads, returning the records without persisting them.
pub async fn scrape(config: ScrapeConfig) -> ScrapeResult<Vec<ProductRecord>> {
    let factory = ChromiumSessionFactory::new(config.headless(), config.timeout());
    let assets = HttpAssetResolver::new(config.output_dir())
        .map_err(|e| ScrapeError::Config(format!("output directory: {e}")))?;
    ScrapeOrchestrator::new(config, factory, assets).run().await
}
