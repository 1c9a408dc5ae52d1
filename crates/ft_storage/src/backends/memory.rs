use async_trait::async_trait;
use chrono::Utc;
use ft_core::{ArticleFilter, ArticleQuery, ArticleRecord, ArticleStorage, NewArticle, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

pub struct MemoryStore {
    articles: Vec<ArticleRecord>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            next_id: 1,
        }
    }

    pub fn insert_article(&mut self, article: NewArticle) -> Result<ArticleRecord> {
        let article = article.bounded()?;
        if let Some(existing) = self.articles.iter().find(|a| a.url == article.url) {
            return Ok(existing.clone());
        }

        let record = ArticleRecord::from_new(self.next_id, article, Utc::now());
        self.next_id += 1;
        self.articles.push(record.clone());
        Ok(record)
    }

    pub fn find_by_url(&self, url: &str) -> Option<ArticleRecord> {
        self.articles.iter().find(|a| a.url == url).cloned()
    }

    pub fn find_by_id(&self, id: i64) -> Option<ArticleRecord> {
        self.articles.iter().find(|a| a.id == id).cloned()
    }

    pub fn list_articles(&self, query: &ArticleQuery) -> Vec<ArticleRecord> {
        let mut articles = self.articles.iter()
            .filter(|a| query.filter.matches(a))
            .cloned()
            .collect::<Vec<_>>();
        articles.sort_by(|a, b| b.scraped_at.cmp(&a.scraped_at).then(b.id.cmp(&a.id)));
        articles.into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|a| if query.include_content { a } else { a.without_content() })
            .collect()
    }

    pub fn count_articles(&self, filter: &ArticleFilter) -> u64 {
        self.articles.iter().filter(|a| filter.matches(a)).count() as u64
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-local store, used for tests and as the degraded-mode fallback.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        }
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new() -> Result<Self> where Self: Sized {
        Ok(InMemoryStorage::new())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert_article(&self, article: NewArticle) -> Result<ArticleRecord> {
        let mut store = self.store.write().await;
        store.insert_article(article)
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<ArticleRecord>> {
        let store = self.store.read().await;
        Ok(store.find_by_url(url))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleRecord>> {
        let store = self.store.read().await;
        Ok(store.find_by_id(id))
    }

    async fn list_articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleRecord>> {
        let store = self.store.read().await;
        Ok(store.list_articles(query))
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> Result<u64> {
        let store = self.store.read().await;
        Ok(store.count_articles(filter))
    }
}
