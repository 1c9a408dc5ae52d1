use ft_core::text::{clean_optional, parse_published, resolve_url};
use ft_core::types::NO_TITLE;
use ft_core::{ArticleContent, ArticleStub, Error, Result, SourceId};
use scraper::Html;
use tracing::{debug, warn};

pub mod espn;
pub mod fourfourtwo;
pub mod generic;
pub mod goal;
pub mod ninety_min;
pub mod onefootball;

use espn::EspnScraper;
use fourfourtwo::FourFourTwoScraper;
use goal::GoalScraper;
use ninety_min::NinetyMinScraper;
use onefootball::OneFootballScraper;

pub type BoxedScraper = Box<dyn Scraper>;
pub type ScraperFactory = Box<dyn Fn() -> BoxedScraper + Send + Sync>;

/// One way of reading a single field out of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Attribute of the first element matching the selector.
    Attr(&'static str, &'static str),
    /// Text of every element matching the selector, concatenated.
    Text(&'static str),
}

/// Ordered selector fallbacks for an article page. For each field the first
/// non-empty match wins.
#[derive(Debug, Clone, Copy)]
pub struct ContentRules {
    /// Removed from the `<title>` text when there is no `h1`.
    pub title_suffix: &'static str,
    pub image: &'static [Field],
    pub description: &'static [Field],
    /// Paragraph selector list; matches are joined with blank lines.
    pub content: &'static str,
    pub published: &'static [Field],
}

pub trait Scraper: Send + Sync {
    fn source(&self) -> SourceId;

    /// Page the article stubs are read from.
    fn listing_url(&self) -> &str;

    /// Origin relative listing links are resolved against.
    fn base_url(&self) -> &str;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool {
        let host = |u: &str| utils::parse_url(u).ok().and_then(|u| u.host_str().map(str::to_string));
        match (host(url), host(self.base_url())) {
            (Some(candidate), Some(own)) => {
                let own = own.trim_start_matches("www.");
                candidate == own || candidate.ends_with(&format!(".{}", own))
            }
            _ => false,
        }
    }

    /// Reads article stubs out of a listing page, in document order.
    fn extract_listing(&self, html: &str) -> Result<Vec<ArticleStub>>;

    fn content_rules(&self) -> &ContentRules;

    /// Reads the article fields out of a single article page.
    fn extract_content(&self, html: &str, page_url: &str) -> Result<Option<ArticleContent>> {
        extract_with_rules(html, page_url, self.content_rules())
    }

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![self.source().as_str()]
    }
}

pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    vec![
        Box::new(|| Box::new(NinetyMinScraper::new()) as BoxedScraper) as ScraperFactory,
        Box::new(|| Box::new(OneFootballScraper::new()) as BoxedScraper) as ScraperFactory,
        Box::new(|| Box::new(EspnScraper::new()) as BoxedScraper) as ScraperFactory,
        Box::new(|| Box::new(GoalScraper::new()) as BoxedScraper) as ScraperFactory,
        Box::new(|| Box::new(FourFourTwoScraper::epl()) as BoxedScraper) as ScraperFactory,
        Box::new(|| Box::new(FourFourTwoScraper::laliga()) as BoxedScraper) as ScraperFactory,
        Box::new(|| Box::new(FourFourTwoScraper::ucl()) as BoxedScraper) as ScraperFactory,
        Box::new(|| Box::new(FourFourTwoScraper::bundesliga()) as BoxedScraper) as ScraperFactory,
    ]
}

/// Maps source identifiers to their scrapers.
pub struct ScraperRegistry {
    scrapers: Vec<BoxedScraper>,
}

impl Default for ScraperRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ScraperRegistry {
    pub fn new() -> Self {
        Self { scrapers: Vec::new() }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for factory in get_scraper_factories() {
            registry.register(factory());
        }
        registry
    }

    /// Adds a scraper, replacing any existing one for the same source.
    pub fn register(&mut self, scraper: BoxedScraper) {
        self.scrapers.retain(|s| s.source() != scraper.source());
        self.scrapers.push(scraper);
    }

    pub fn get(&self, source: SourceId) -> Option<&dyn Scraper> {
        self.scrapers
            .iter()
            .find(|s| s.source() == source)
            .map(|s| s.as_ref())
    }

    pub fn find(&self, name: &str) -> Option<&dyn Scraper> {
        self.scrapers
            .iter()
            .find(|s| s.cli_names().contains(&name))
            .map(|s| s.as_ref())
    }

    pub fn for_url(&self, url: &str) -> Option<&dyn Scraper> {
        self.scrapers
            .iter()
            .find(|s| s.can_handle(url))
            .map(|s| s.as_ref())
    }

    pub fn sources(&self) -> Vec<SourceId> {
        self.scrapers.iter().map(|s| s.source()).collect()
    }

    pub fn extract_listing(&self, html: &str, source: SourceId) -> Result<Vec<ArticleStub>> {
        let scraper = self
            .get(source)
            .ok_or_else(|| Error::InvalidSource(source.to_string()))?;
        scraper.extract_listing(html)
    }

    /// Runs the content rules registered under `source`, or the generic rules
    /// when nothing is registered under that name. Any failure, and a page
    /// with nothing extractable, yields `None`.
    pub fn extract_content(&self, html: &str, page_url: &str, source: &str) -> Option<ArticleContent> {
        let result = match self.find(source) {
            Some(scraper) => scraper.extract_content(html, page_url),
            None => {
                debug!(source, "No scraper registered, using generic rules");
                extract_with_rules(html, page_url, &generic::GENERIC_RULES)
            }
        };

        match result {
            Ok(Some(content)) => Some(content),
            Ok(None) => {
                warn!(url = %page_url, source, "Nothing extractable on page");
                None
            }
            Err(e) => {
                warn!(url = %page_url, source, error = %e, "Content extraction failed");
                None
            }
        }
    }
}

/// Applies `rules` to an article page and normalises the result.
pub fn extract_with_rules(html: &str, page_url: &str, rules: &ContentRules) -> Result<Option<ArticleContent>> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = match utils::first_text(root, "h1")? {
        Some(title) => Some(title),
        None => utils::first_text(root, "title")?
            .map(|t| t.replace(rules.title_suffix, "").trim().to_string()),
    };
    let title = clean_optional(title.as_deref()).unwrap_or_else(|| NO_TITLE.to_string());

    let image = utils::first_field(root, rules.image)?
        .and_then(|img| resolve_url(&img, page_url));
    let description = clean_optional(utils::first_field(root, rules.description)?.as_deref());
    let content = clean_optional(Some(utils::paragraphs(root, rules.content)?.as_str()));
    let published_at = utils::first_field(root, rules.published)?
        .and_then(|raw| parse_published(&raw));

    let extracted = ArticleContent {
        title,
        image,
        description,
        content,
        published_at,
    };

    if extracted.is_empty() {
        return Ok(None);
    }
    Ok(Some(extracted))
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;
    use regex::Regex;
    use scraper::{ElementRef, Selector};
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::Scraping(format!("Failed to parse URL: {}", e)))
    }

    pub fn pattern(pattern: &str) -> Result<Regex> {
        Regex::new(pattern)
            .map_err(|e| Error::Scraping(format!("Invalid pattern {:?}: {}", pattern, e)))
    }

    pub fn selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {:?}: {:?}", selector, e)))
    }

    /// Text of every descendant matching `sel`, concatenated.
    pub fn text_of(element: ElementRef<'_>, sel: &Selector) -> String {
        element
            .select(sel)
            .flat_map(|el| el.text())
            .collect::<String>()
    }

    pub fn attr_of(element: ElementRef<'_>, sel: &Selector, attr: &str) -> Option<String> {
        element
            .select(sel)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn first_text(element: ElementRef<'_>, sel: &str) -> Result<Option<String>> {
        let sel = selector(sel)?;
        Ok(element
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    pub fn first_field(element: ElementRef<'_>, fields: &[Field]) -> Result<Option<String>> {
        for field in fields {
            let value = match *field {
                Field::Attr(sel, attr) => attr_of(element, &selector(sel)?, attr),
                Field::Text(sel) => {
                    Some(text_of(element, &selector(sel)?).trim().to_string()).filter(|t| !t.is_empty())
                }
            };
            if value.is_some() {
                return Ok(value);
            }
        }
        Ok(None)
    }

    /// Trimmed text of each matching paragraph, joined with blank lines.
    pub fn paragraphs(element: ElementRef<'_>, sel: &str) -> Result<String> {
        let sel = selector(sel)?;
        Ok(element
            .select(&sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::utils;

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(utils::parse_url("invalid-url").is_err());
    }

    #[test]
    fn test_first_text_and_paragraphs() {
        let html = r#"
            <div class="title">Test Title</div>
            <div class="content"><p> One </p><p></p><p>Two</p></div>
        "#;
        let document = Html::parse_document(html);
        let root = document.root_element();

        assert_eq!(
            utils::first_text(root, ".title").unwrap().as_deref(),
            Some("Test Title")
        );
        assert_eq!(utils::first_text(root, ".invalid").unwrap(), None);
        assert_eq!(utils::paragraphs(root, ".content p").unwrap(), "One\n\nTwo");
        assert!(utils::first_text(root, "[[[").is_err());
    }

    #[test]
    fn test_first_field_takes_first_non_empty_match() {
        let html = r#"
            <html><head><meta property="og:image" content="/og.jpg"></head>
            <body><figure><img alt="no src"></figure><span class="s"> </span></body></html>
        "#;
        let document = Html::parse_document(html);
        let root = document.root_element();
        let fields = [
            Field::Attr("figure img", "src"),
            Field::Text(".s"),
            Field::Attr("meta[property=\"og:image\"]", "content"),
        ];
        assert_eq!(
            utils::first_field(root, &fields).unwrap().as_deref(),
            Some("/og.jpg")
        );
    }

    #[test]
    fn test_registry_extracts_listing_by_source() {
        let html = r#"
            <div class="small">
              <a href="/news/one"><h3 class="article-name">One</h3></a>
            </div>
        "#;
        let registry = ScraperRegistry::with_defaults();
        let stubs = registry
            .extract_listing(html, SourceId::FourFourTwoUcl)
            .unwrap();
        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].url, "https://www.fourfourtwo.com/news/one");

        let empty = ScraperRegistry::new();
        assert!(matches!(
            empty.extract_listing(html, SourceId::Goal),
            Err(Error::InvalidSource(_))
        ));
    }

    #[test]
    fn test_registry_has_every_source() {
        let registry = ScraperRegistry::with_defaults();
        assert_eq!(registry.sources().len(), SourceId::ALL.len());
        for source in SourceId::ALL {
            let scraper = registry.get(source).unwrap();
            assert_eq!(scraper.source(), source);
            assert!(registry.find(source.as_str()).is_some());
        }
        assert!(registry.find("bbc").is_none());
    }

    #[test]
    fn test_registry_resolves_urls() {
        let registry = ScraperRegistry::with_defaults();
        let goal = registry.for_url("https://www.goal.com/en-in/lists/x").unwrap();
        assert_eq!(goal.source(), SourceId::Goal);
        let espn = registry.for_url("https://www.espn.in/football/story/_/id/1").unwrap();
        assert_eq!(espn.source(), SourceId::Espn);
        assert!(registry.for_url("https://www.bbc.co.uk/sport").is_none());
    }

    #[test]
    fn test_register_replaces_existing_source() {
        let mut registry = ScraperRegistry::with_defaults();
        registry.register(Box::new(GoalScraper::new()));
        assert_eq!(registry.sources().len(), SourceId::ALL.len());
    }

    #[test]
    fn test_unknown_source_uses_generic_rules() {
        let html = r#"
            <html><head><title>Plain Page</title>
            <meta name="description" content="Generic description">
            <meta property="og:image" content="/cover.png"></head>
            <body><article><p>First paragraph.</p><p>Second paragraph.</p></article>
            <time datetime="2024-05-01T10:00:00Z">May 1</time></body></html>
        "#;
        let registry = ScraperRegistry::with_defaults();
        let content = registry
            .extract_content(html, "https://blog.example.com/posts/1", "somewhere-else")
            .unwrap();
        assert_eq!(content.title, "Plain Page");
        assert_eq!(content.image.as_deref(), Some("https://blog.example.com/cover.png"));
        assert_eq!(content.description.as_deref(), Some("Generic description"));
        assert_eq!(content.content.as_deref(), Some("First paragraph. Second paragraph."));
        assert!(content.published_at.is_some());
    }

    #[test]
    fn test_empty_page_yields_none() {
        let registry = ScraperRegistry::with_defaults();
        assert!(registry
            .extract_content("<html><body></body></html>", "https://www.goal.com/a", "goal")
            .is_none());
    }

    #[test]
    fn test_missing_title_uses_placeholder() {
        let html = r#"<html><body><div class="article-body"><p>Only body</p></div></body></html>"#;
        let registry = ScraperRegistry::with_defaults();
        let content = registry
            .extract_content(html, "https://www.goal.com/a", "goal")
            .unwrap();
        assert_eq!(content.title, NO_TITLE);
        assert_eq!(content.content.as_deref(), Some("Only body"));
    }
}
