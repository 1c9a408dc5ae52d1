use std::collections::HashMap;
use std::sync::Arc;

use ft_core::{ArticleStorage, ArticleStub, SourceId};
use ft_scrapers::ScraperManager;
use tokio::sync::RwLock;

/// Shared by every handler. Holds the most recent listing per source, which
/// is what a scrape request ingests from.
pub struct AppState {
    pub manager: Arc<ScraperManager>,
    listings: RwLock<HashMap<SourceId, Vec<ArticleStub>>>,
}

impl AppState {
    pub fn new(manager: Arc<ScraperManager>) -> Self {
        Self {
            manager,
            listings: RwLock::new(HashMap::new()),
        }
    }

    pub fn storage(&self) -> &Arc<dyn ArticleStorage> {
        self.manager.storage()
    }

    /// Replaces the cached listing for `source`.
    pub async fn set_listing(&self, source: SourceId, stubs: Vec<ArticleStub>) {
        self.listings.write().await.insert(source, stubs);
    }

    pub async fn listing(&self, source: SourceId) -> Vec<ArticleStub> {
        self.listings
            .read()
            .await
            .get(&source)
            .cloned()
            .unwrap_or_default()
    }
}
