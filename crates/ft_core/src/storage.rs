use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Category, SourceId};
use crate::types::{ArticleRecord, NewArticle};
use crate::Result;

/// Criteria shared by listing and counting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
    pub source: Option<SourceId>,
    pub category: Option<Category>,
    pub scraped_since: Option<DateTime<Utc>>,
}

impl ArticleFilter {
    pub fn matches(&self, record: &ArticleRecord) -> bool {
        self.source.map_or(true, |s| record.source == s)
            && self.category.map_or(true, |c| record.category == c)
            && self.scraped_since.map_or(true, |t| record.scraped_at >= t)
    }
}

/// A page of records, newest `scraped_at` first.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    pub filter: ArticleFilter,
    pub limit: u32,
    pub offset: u32,
    pub include_content: bool,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            filter: ArticleFilter::default(),
            limit: 20,
            offset: 0,
            include_content: false,
        }
    }
}

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Short backend name used in health reports.
    fn name(&self) -> &str;

    /// Inserts an article. If the URL is already stored the existing record
    /// is returned instead; this never creates a second row for one URL.
    async fn insert_article(&self, article: NewArticle) -> Result<ArticleRecord>;

    async fn find_by_url(&self, url: &str) -> Result<Option<ArticleRecord>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleRecord>>;

    async fn list_articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleRecord>>;

    async fn count_articles(&self, filter: &ArticleFilter) -> Result<u64>;
}
