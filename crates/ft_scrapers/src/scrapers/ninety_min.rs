use ft_core::{ArticleStub, Result, SourceId};
use scraper::Html;

use super::{utils, ContentRules, Field, Scraper};

const RULES: ContentRules = ContentRules {
    title_suffix: " | 90min",
    image: &[
        Field::Attr("figure img", "src"),
        Field::Attr("img[data-src]", "data-src"),
        Field::Attr("meta[property=\"og:image\"]", "content"),
    ],
    description: &[
        Field::Attr("meta[name=\"description\"]", "content"),
        Field::Attr("meta[property=\"og:description\"]", "content"),
        Field::Text(".article-summary"),
    ],
    content: ".article-content p, .article-body p",
    published: &[
        Field::Attr("time", "datetime"),
        Field::Attr("meta[property=\"article:published_time\"]", "content"),
    ],
};

/// Article links are bare slugs, optionally under `/features/`.
const ARTICLE_URL_PATTERNS: [&str; 2] = [
    r"^https://www\.90min\.com/[a-z0-9-]+$",
    r"^https://www\.90min\.com/features/[a-z0-9-]+$",
];

#[derive(Debug, Clone, Default)]
pub struct NinetyMinScraper;

impl NinetyMinScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://www.90min.com";
    const LISTING_URL: &'static str = "https://www.90min.com/categories/football-news";
}

impl Scraper for NinetyMinScraper {
    fn source(&self) -> SourceId {
        SourceId::NinetyMin
    }

    fn listing_url(&self) -> &str {
        Self::LISTING_URL
    }

    fn base_url(&self) -> &str {
        Self::BASE_URL
    }

    fn extract_listing(&self, html: &str) -> Result<Vec<ArticleStub>> {
        let patterns = ARTICLE_URL_PATTERNS
            .iter()
            .map(|p| utils::pattern(p))
            .collect::<Result<Vec<_>>>()?;
        let link_selector = utils::selector("a")?;
        let heading_selector = utils::selector("header h3")?;

        let document = Html::parse_document(html);
        let mut stubs = Vec::new();
        for link in document.select(&link_selector) {
            let Some(url) = link.value().attr("href") else {
                continue;
            };
            if !patterns.iter().any(|p| p.is_match(url)) {
                continue;
            }
            let title = utils::text_of(link, &heading_selector).trim().to_string();
            if title.is_empty() {
                continue;
            }
            stubs.push(ArticleStub::new(title, url));
        }

        Ok(stubs)
    }

    fn content_rules(&self) -> &ContentRules {
        &RULES
    }
}
