//! Crawl Engine Module
//!
//! Login, paginated link discovery and the bounded-concurrency scrape of
//! product detail pages. `ScrapeOrchestrator` ties the pieces together.

// Sub-modules
pub mod auth;
pub mod cleanup;
pub mod crawl_types;
pub mod discovery;
pub mod orchestrator;
pub mod progress;
pub mod shared;
pub(crate) mod worker;

// Re-exports for public API
pub use auth::SessionAuthenticator;
pub use cleanup::{CleanupResult, shutdown_session};
pub use crawl_types::{ScrapeError, ScrapeResult};
pub use discovery::LinkDiscoverer;
pub use orchestrator::ScrapeOrchestrator;
pub use progress::{LoggingProgress, NoOpProgress, ProgressReporter};
pub use shared::{FolderCounter, SharedResults, StopFlag};
