use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Category, SourceId};
use crate::text;
use crate::{Error, Result};

/// Title used when an article page yields no usable heading.
pub const NO_TITLE: &str = "No title found";

pub const TITLE_MAX_LEN: usize = 300;
pub const DESCRIPTION_MAX_LEN: usize = 1_000;
pub const CONTENT_MAX_LEN: usize = 20_000;

/// A listing-page reference to an article, before its page is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStub {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
}

impl ArticleStub {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            image: None,
            short_description: None,
        }
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn with_short_description(mut self, description: Option<String>) -> Self {
        self.short_description = description;
        self
    }
}

/// Normalised fields pulled out of a single article page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleContent {
    pub title: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ArticleContent {
    /// False when the title is the "No title found" placeholder.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty() && self.title != NO_TITLE
    }

    pub fn is_empty(&self) -> bool {
        !self.has_title()
            && self.image.is_none()
            && self.description.is_none()
            && self.content.is_none()
    }
}

/// An article ready to be persisted. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub source: SourceId,
    pub title: String,
    pub original_title: Option<String>,
    pub url: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewArticle {
    /// Merges a listing stub with what was extracted from its page. Extracted
    /// fields win; stub fields fill the gaps.
    pub fn from_extraction(source: SourceId, stub: &ArticleStub, extracted: ArticleContent) -> Self {
        let title = if extracted.has_title() {
            extracted.title
        } else if !stub.title.trim().is_empty() {
            stub.title.clone()
        } else {
            NO_TITLE.to_string()
        };

        Self {
            source,
            title,
            original_title: Some(stub.title.clone()).filter(|t| !t.is_empty()),
            url: stub.url.clone(),
            image: extracted
                .image
                .filter(|img| text::is_http_url(img))
                .or_else(|| stub.image.clone()),
            description: extracted
                .description
                .or_else(|| stub.short_description.clone()),
            content: extracted.content,
            published_at: extracted.published_at,
        }
    }

    pub fn category(&self) -> Category {
        self.source.category()
    }

    pub fn word_count(&self) -> u32 {
        text::word_count(self.content.as_deref())
    }

    /// Validates the URL and applies the per-field length bounds.
    pub fn bounded(self) -> Result<Self> {
        if !text::is_http_url(&self.url) {
            return Err(Error::InvalidUrl(self.url));
        }

        let image = self.image.filter(|img| {
            let ok = text::is_http_url(img);
            if !ok {
                tracing::debug!(image = %img, url = %self.url, "Dropping non-http image");
            }
            ok
        });

        let title = text::truncate_chars(self.title.trim(), TITLE_MAX_LEN);
        if title.is_empty() {
            return Err(Error::Storage(format!("Article {} has an empty title", self.url)));
        }

        Ok(Self {
            title,
            original_title: self
                .original_title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            image,
            description: self
                .description
                .map(|d| text::truncate_chars(d.trim(), DESCRIPTION_MAX_LEN))
                .filter(|d| !d.is_empty()),
            content: self
                .content
                .map(|c| text::truncate_chars(&c, CONTENT_MAX_LEN))
                .filter(|c| !c.is_empty()),
            ..self
        })
    }
}

/// A persisted article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub id: i64,
    pub source: SourceId,
    pub title: String,
    pub original_title: Option<String>,
    pub url: String,
    pub image: Option<String>,
    pub description: Option<String>,
    /// Absent from listings, which never load the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub category: Category,
    pub published_at: Option<DateTime<Utc>>,
    pub word_count: u32,
    pub scraped_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleRecord {
    /// Builds the row a store writes for `article`. Category and word count
    /// are recomputed here, never taken from the caller.
    pub fn from_new(id: i64, article: NewArticle, now: DateTime<Utc>) -> Self {
        Self {
            id,
            category: article.category(),
            word_count: article.word_count(),
            source: article.source,
            title: article.title,
            original_title: article.original_title,
            url: article.url,
            image: article.image,
            description: article.description,
            content: article.content,
            published_at: article.published_at,
            scraped_at: now,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn reading_time(&self) -> u32 {
        text::reading_time(self.word_count)
    }

    pub fn without_content(mut self) -> Self {
        self.content = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub() -> ArticleStub {
        ArticleStub::new("Club X wins", "https://site/a")
            .with_image(Some("https://site/stub.jpg".to_string()))
            .with_short_description(Some("Short".to_string()))
    }

    fn extracted(title: &str) -> ArticleContent {
        ArticleContent {
            title: title.to_string(),
            image: None,
            description: None,
            content: Some("Para1\n\nPara2".to_string()),
            published_at: None,
        }
    }

    #[test]
    fn test_extracted_fields_win_over_stub() {
        let article = NewArticle::from_extraction(
            SourceId::FourFourTwoEpl,
            &stub(),
            extracted("Club X wins 3-0"),
        );
        assert_eq!(article.title, "Club X wins 3-0");
        assert_eq!(article.original_title.as_deref(), Some("Club X wins"));
        assert_eq!(article.image.as_deref(), Some("https://site/stub.jpg"));
        assert_eq!(article.description.as_deref(), Some("Short"));
        assert_eq!(article.word_count(), 2);
        assert_eq!(article.category(), Category::Epl);
    }

    #[test]
    fn test_placeholder_image_falls_back_to_stub() {
        let mut content = extracted("Club X wins 3-0");
        content.image = Some("data:image/gif;base64,R0lGODlhAQABAAAAACw=".to_string());
        let article = NewArticle::from_extraction(SourceId::Goal, &stub(), content)
            .bounded()
            .unwrap();
        assert_eq!(article.image.as_deref(), Some("https://site/stub.jpg"));
    }

    #[test]
    fn test_placeholder_title_falls_back_to_stub() {
        let article = NewArticle::from_extraction(SourceId::Goal, &stub(), extracted(NO_TITLE));
        assert_eq!(article.title, "Club X wins");
    }

    #[test]
    fn test_bounded_enforces_limits() {
        let mut article = NewArticle::from_extraction(SourceId::Espn, &stub(), extracted("T"));
        article.title = "t".repeat(TITLE_MAX_LEN + 10);
        article.description = Some("d".repeat(DESCRIPTION_MAX_LEN + 10));
        article.content = Some("c".repeat(CONTENT_MAX_LEN + 10));
        article.image = Some("/relative.jpg".to_string());

        let bounded = article.bounded().unwrap();
        assert_eq!(bounded.title.len(), TITLE_MAX_LEN);
        assert_eq!(bounded.description.unwrap().len(), DESCRIPTION_MAX_LEN);
        assert_eq!(bounded.content.unwrap().len(), CONTENT_MAX_LEN);
        assert!(bounded.image.is_none());
    }

    #[test]
    fn test_bounded_rejects_non_http_url() {
        let mut article = NewArticle::from_extraction(SourceId::Espn, &stub(), extracted("T"));
        article.url = "/story/1".to_string();
        assert!(matches!(article.bounded(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_record_derives_category_and_word_count() {
        let article = NewArticle::from_extraction(
            SourceId::FourFourTwoUcl,
            &stub(),
            extracted("Title"),
        );
        let record = ArticleRecord::from_new(7, article, Utc::now());
        assert_eq!(record.id, 7);
        assert_eq!(record.category, Category::Ucl);
        assert_eq!(record.word_count, 2);
        assert_eq!(record.reading_time(), 1);
        assert!(record.is_active);
    }

    #[test]
    fn test_stub_serializes_camel_case() {
        let json = serde_json::to_value(stub()).unwrap();
        assert_eq!(json["shortDescription"], "Short");
        let bare = serde_json::to_value(ArticleStub::new("t", "https://u")).unwrap();
        assert!(bare.get("image").is_none());
    }
}
