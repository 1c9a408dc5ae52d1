pub mod cli;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use config::ScraperConfig;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use logging::{init_logging, Logger};
pub use manager::{IngestReport, ScraperManager};
pub use scrapers::{Scraper, ScraperRegistry};

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use super::{ScraperConfig, ScraperManager, ScraperRegistry};
    pub use ft_core::{ArticleStub, Error, Result, SourceId};
}
