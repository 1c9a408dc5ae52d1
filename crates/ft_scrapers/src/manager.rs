use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use ft_core::{ArticleContent, ArticleRecord, ArticleStorage, ArticleStub, Error, NewArticle, Result, SourceId};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::logging::Logger;
use crate::scrapers::ScraperRegistry;

/// Message returned when a batch has nothing to work on.
pub const EMPTY_BATCH_MESSAGE: &str = "No articles to scrape";

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub source: SourceId,
    /// Stubs considered after applying the limit.
    pub requested: usize,
    /// Records present at the end, fresh inserts and store hits alike.
    pub stored: usize,
    pub articles: Vec<ArticleRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IngestReport {
    fn empty(source: SourceId) -> Self {
        Self {
            source,
            requested: 0,
            stored: 0,
            articles: Vec::new(),
            message: Some(EMPTY_BATCH_MESSAGE.to_string()),
        }
    }
}

enum ItemOutcome {
    /// Already stored; nothing was fetched.
    Existing(ArticleRecord),
    Stored(ArticleRecord),
    /// Fetched, but the page had nothing extractable.
    Skipped,
}

/// Runs listing fetches and the ingestion pipeline against one store.
pub struct ScraperManager {
    storage: Arc<dyn ArticleStorage>,
    fetcher: Arc<dyn PageFetcher>,
    registry: ScraperRegistry,
    config: ScraperConfig,
}

impl ScraperManager {
    pub fn new(storage: Arc<dyn ArticleStorage>, fetcher: Arc<dyn PageFetcher>, config: ScraperConfig) -> Self {
        Self {
            storage,
            fetcher,
            registry: ScraperRegistry::with_defaults(),
            config,
        }
    }

    /// Builds a manager that fetches over HTTP with the given settings.
    pub fn from_config(storage: Arc<dyn ArticleStorage>, config: ScraperConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config)?);
        Ok(Self::new(storage, fetcher, config))
    }

    pub fn storage(&self) -> &Arc<dyn ArticleStorage> {
        &self.storage
    }

    pub fn registry(&self) -> &ScraperRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetches the listing page of `source` and extracts its stubs.
    pub async fn fetch_listing(&self, source: SourceId) -> Result<Vec<ArticleStub>> {
        let listing_url = self
            .registry
            .get(source)
            .map(|scraper| scraper.listing_url())
            .ok_or_else(|| Error::InvalidSource(source.to_string()))?;

        let html = self.fetcher.fetch(listing_url).await?;
        let mut stubs = self.registry.extract_listing(&html, source)?;
        let found = stubs.len();

        if self.config.dedupe_listings {
            let mut seen = HashSet::new();
            stubs.retain(|stub| seen.insert(stub.url.clone()));
        }

        info!(source = %source, found, kept = stubs.len(), "Listing extracted");
        Ok(stubs)
    }

    /// Fetches every registered listing concurrently.
    pub async fn fetch_all_listings(&self) -> Vec<(SourceId, Result<Vec<ArticleStub>>)> {
        let sources = self.registry.sources();
        let listings = join_all(sources.iter().map(|&source| self.fetch_listing(source))).await;
        sources.into_iter().zip(listings).collect()
    }

    /// Fetches one article page and runs the content rules for `source`.
    /// `Ok(None)` means the page held nothing extractable.
    pub async fn scrape_url(&self, url: &str, source: &str) -> Result<Option<ArticleContent>> {
        let html = self.fetcher.fetch(url).await?;
        Ok(self.registry.extract_content(&html, url, source))
    }

    /// Stores the first `limit` stubs, one at a time. Consecutive article
    /// fetches are spaced by `request_delay`; store hits never wait.
    /// Per-item failures are logged and skipped; the report always comes back.
    pub async fn ingest(&self, stubs: &[ArticleStub], source: SourceId, limit: usize) -> IngestReport {
        let batch = &stubs[..limit.min(stubs.len())];
        if batch.is_empty() {
            return IngestReport::empty(source);
        }

        let logger = Logger::new().with_new_prefixes(format!("[{}]", source));
        logger.info(&format!("Ingesting {} of {} stubs", batch.len(), stubs.len()));

        let mut articles: Vec<ArticleRecord> = Vec::new();
        let mut fetched_before = false;
        for stub in batch {
            match self.ingest_one(stub, source, &mut fetched_before).await {
                Ok(ItemOutcome::Existing(record)) => {
                    logger.debug(&format!("Already stored: {}", stub.url));
                    push_unique(&mut articles, record);
                }
                Ok(ItemOutcome::Stored(record)) => {
                    logger.info(&format!("Stored #{}: {}", record.id, record.title));
                    push_unique(&mut articles, record);
                }
                Ok(ItemOutcome::Skipped) => {
                    logger.warn(&format!("Nothing extracted from {}", stub.url));
                }
                Err(e) => {
                    logger.error(&format!("Failed {}: {}", stub.url, e));
                }
            }
        }

        logger.info(&format!("Batch done: {}/{} stored", articles.len(), batch.len()));
        IngestReport {
            source,
            requested: batch.len(),
            stored: articles.len(),
            articles,
            message: None,
        }
    }

    async fn ingest_one(&self, stub: &ArticleStub, source: SourceId, fetched_before: &mut bool) -> Result<ItemOutcome> {
        if let Some(existing) = self.storage.find_by_url(&stub.url).await? {
            return Ok(ItemOutcome::Existing(existing));
        }

        if *fetched_before && !self.config.request_delay.is_zero() {
            sleep(self.config.request_delay).await;
        }
        *fetched_before = true;

        debug!(url = %stub.url, source = %source, "Fetching article");
        let Some(extracted) = self.scrape_url(&stub.url, source.as_str()).await? else {
            return Ok(ItemOutcome::Skipped);
        };

        let article = NewArticle::from_extraction(source, stub, extracted);
        let record = self.storage.insert_article(article).await?;
        Ok(ItemOutcome::Stored(record))
    }

    /// Listing fetch followed by ingestion of its first `limit` stubs.
    pub async fn scrape_source(&self, source: SourceId, limit: Option<usize>) -> Result<IngestReport> {
        let stubs = self.fetch_listing(source).await?;
        let limit = limit.unwrap_or(self.config.default_limit);
        Ok(self.ingest(&stubs, source, limit).await)
    }
}

fn push_unique(articles: &mut Vec<ArticleRecord>, record: ArticleRecord) {
    if !articles.iter().any(|a| a.id == record.id) {
        articles.push(record);
    }
}
