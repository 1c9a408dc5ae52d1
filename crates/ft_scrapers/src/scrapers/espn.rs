use ft_core::text::resolve_url;
use ft_core::{ArticleStub, Result, SourceId};
use scraper::Html;

use super::{utils, ContentRules, Field, Scraper};

const RULES: ContentRules = ContentRules {
    title_suffix: " - ESPN",
    image: &[
        Field::Attr(".media-wrapper img", "src"),
        Field::Attr(".article-header img", "src"),
        Field::Attr("meta[property=\"og:image\"]", "content"),
    ],
    description: &[
        Field::Attr("meta[name=\"description\"]", "content"),
        Field::Text(".article-meta .description"),
    ],
    content: ".story-body p, .article-body p",
    published: &[
        Field::Attr("time", "datetime"),
        Field::Attr(".timestamp", "data-date"),
    ],
};

#[derive(Debug, Clone, Default)]
pub struct EspnScraper;

impl EspnScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://www.espn.in";
    const LISTING_URL: &'static str = "https://www.espn.in/football/";
}

impl Scraper for EspnScraper {
    fn source(&self) -> SourceId {
        SourceId::Espn
    }

    fn listing_url(&self) -> &str {
        Self::LISTING_URL
    }

    fn base_url(&self) -> &str {
        Self::BASE_URL
    }

    fn extract_listing(&self, html: &str) -> Result<Vec<ArticleStub>> {
        let link_selector = utils::selector("a")?;
        let title_selector = utils::selector("h2")?;
        let image_selector = utils::selector("img")?;

        let document = Html::parse_document(html);
        let mut stubs = Vec::new();
        for link in document.select(&link_selector) {
            let Some(url) = link
                .value()
                .attr("href")
                .and_then(|href| resolve_url(href, Self::LISTING_URL))
            else {
                continue;
            };
            if !url.contains("story") {
                continue;
            }
            let title = utils::text_of(link, &title_selector).trim().to_string();
            if title.is_empty() {
                continue;
            }
            let image = utils::attr_of(link, &image_selector, "data-default-src");
            stubs.push(ArticleStub::new(title, url).with_image(image));
        }

        Ok(stubs)
    }

    fn content_rules(&self) -> &ContentRules {
        &RULES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_listing_keeps_story_links() {
        let html = r#"
            <html><body>
              <a href="/football/story/_/id/39000001/liverpool-title-race">
                <img data-default-src="https://a.espncdn.com/photo/lfc.jpg">
                <h2>Liverpool in title race</h2>
              </a>
              <a href="/football/scoreboard"><h2>Scores</h2></a>
              <a href="https://www.espn.in/football/story/_/id/39000002/">
                <h2></h2>
              </a>
              <a href="https://www.espn.in/football/story/_/id/39000003/kane-record">
                <h2>Kane breaks record</h2>
              </a>
            </body></html>
        "#;
        let stubs = EspnScraper::new().extract_listing(html).unwrap();
        assert_eq!(stubs.len(), 2);
        assert_eq!(
            stubs[0].url,
            "https://www.espn.in/football/story/_/id/39000001/liverpool-title-race"
        );
        assert_eq!(stubs[0].image.as_deref(), Some("https://a.espncdn.com/photo/lfc.jpg"));
        assert_eq!(stubs[1].title, "Kane breaks record");
        assert!(stubs[1].image.is_none());
    }

    #[test]
    fn test_extract_content_falls_back_to_timestamp() {
        let html = r#"
            <html><head>
              <title>Kane breaks record - ESPN</title>
              <meta name="description" content="Harry Kane scored again.">
            </head><body>
              <div class="article-header"><img src="/i/kane.jpg"></div>
              <span class="timestamp" data-date="2024-02-10T20:30:00Z">Feb 10</span>
              <div class="story-body"><p>Kane scored twice.</p><p>Bayern won 3-1.</p></div>
            </body></html>
        "#;
        let content = EspnScraper::new()
            .extract_content(html, "https://www.espn.in/football/story/_/id/39000003/kane-record")
            .unwrap()
            .unwrap();
        assert_eq!(content.title, "Kane breaks record");
        assert_eq!(content.image.as_deref(), Some("https://www.espn.in/i/kane.jpg"));
        assert_eq!(content.description.as_deref(), Some("Harry Kane scored again."));
        assert_eq!(content.content.as_deref(), Some("Kane scored twice. Bayern won 3-1."));
        assert!(content.published_at.is_some());
    }
}
