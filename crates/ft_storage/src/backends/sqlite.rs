use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use ft_core::{
    ArticleFilter, ArticleQuery, ArticleRecord, ArticleStorage, Error, NewArticle, Result,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source TEXT NOT NULL,
        title TEXT NOT NULL,
        original_title TEXT,
        url TEXT NOT NULL UNIQUE,
        image TEXT,
        description TEXT,
        content TEXT,
        category TEXT NOT NULL DEFAULT 'general',
        published_at TEXT,
        word_count INTEGER NOT NULL DEFAULT 0,
        scraped_at TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_source_scraped ON articles (source, scraped_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_articles_category_scraped ON articles (category, scraped_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_articles_scraped ON articles (scraped_at DESC)",
    // Add future migrations here
];

const LIST_COLUMNS: &str = "id, source, title, original_title, url, image, description, \
    category, published_at, word_count, scraped_at, is_active, created_at, updated_at";

pub struct SQLiteStorage {
    pool: SqlitePool,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./articles.db"
    }

    async fn new() -> Result<Self> {
        let db_path = PathBuf::from("articles.db");
        Self::new_with_path(&db_path).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        debug!(path = %db_path.display(), "SQLite storage ready");
        Ok(Self { pool })
    }
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date {:?}: {}", raw, e)))
}

fn row_to_article(row: &SqliteRow) -> Result<ArticleRecord> {
    let get_err = |e: sqlx::Error| Error::Database(format!("Failed to read article row: {}", e));

    let source: String = row.try_get("source").map_err(get_err)?;
    let category: String = row.try_get("category").map_err(get_err)?;
    let published_at: Option<String> = row.try_get("published_at").map_err(get_err)?;
    let scraped_at: String = row.try_get("scraped_at").map_err(get_err)?;
    let created_at: String = row.try_get("created_at").map_err(get_err)?;
    let updated_at: String = row.try_get("updated_at").map_err(get_err)?;
    let word_count: i64 = row.try_get("word_count").map_err(get_err)?;

    Ok(ArticleRecord {
        id: row.try_get("id").map_err(get_err)?,
        source: source.parse()?,
        title: row.try_get("title").map_err(get_err)?,
        original_title: row.try_get("original_title").map_err(get_err)?,
        url: row.try_get("url").map_err(get_err)?,
        image: row.try_get("image").map_err(get_err)?,
        description: row.try_get("description").map_err(get_err)?,
        content: row.try_get("content").map_err(get_err)?,
        category: category.parse()?,
        published_at: published_at.as_deref().map(parse_time).transpose()?,
        word_count: u32::try_from(word_count).unwrap_or(0),
        scraped_at: parse_time(&scraped_at)?,
        is_active: row.try_get("is_active").map_err(get_err)?,
        created_at: parse_time(&created_at)?,
        updated_at: parse_time(&updated_at)?,
    })
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &ArticleFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(source) = filter.source {
        builder.push(" AND source = ").push_bind(source.as_str());
    }
    if let Some(category) = filter.category {
        builder.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(since) = filter.scraped_since {
        builder.push(" AND scraped_at >= ").push_bind(format_time(&since));
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn insert_article(&self, article: NewArticle) -> Result<ArticleRecord> {
        let article = article.bounded()?;
        let now = format_time(&Utc::now());

        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (source, title, original_title, url, image, description, content, category,
             published_at, word_count, scraped_at, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(article.source.as_str())
        .bind(&article.title)
        .bind(article.original_title.as_deref())
        .bind(&article.url)
        .bind(article.image.as_deref())
        .bind(article.description.as_deref())
        .bind(article.content.as_deref())
        .bind(article.category().as_str())
        .bind(article.published_at.as_ref().map(format_time))
        .bind(i64::from(article.word_count()))
        .bind(&now)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to store article: {}", e)))?;

        if result.rows_affected() == 0 {
            debug!(url = %article.url, "Article already stored, reusing existing row");
        }

        self.find_by_url(&article.url)
            .await?
            .ok_or_else(|| Error::Storage(format!("Article {} vanished after insert", article.url)))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<ArticleRecord>> {
        let row = sqlx::query("SELECT * FROM articles WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to find article by url: {}", e)))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleRecord>> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to find article by id: {}", e)))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn list_articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleRecord>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(LIST_COLUMNS);
        builder.push(if query.include_content { ", content" } else { ", NULL AS content" });
        builder.push(" FROM articles");
        push_filter(&mut builder, &query.filter);
        builder
            .push(" ORDER BY scraped_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(query.offset));

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to list articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM articles");
        push_filter(&mut builder, filter);

        let count: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to count articles: {}", e)))?;

        Ok(count.max(0) as u64)
    }
}
