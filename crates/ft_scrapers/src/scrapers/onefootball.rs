use ft_core::text::resolve_url;
use ft_core::{ArticleStub, Result, SourceId};
use scraper::Html;

use super::{utils, ContentRules, Field, Scraper};

const RULES: ContentRules = ContentRules {
    title_suffix: " | OneFootball",
    image: &[
        Field::Attr("img[data-testid=\"ArticleImage\"]", "src"),
        Field::Attr(".hero-image img", "src"),
        Field::Attr("meta[property=\"og:image\"]", "content"),
    ],
    description: &[
        Field::Attr("meta[name=\"description\"]", "content"),
        Field::Attr("meta[property=\"og:description\"]", "content"),
    ],
    content: ".article-body p, .content p",
    published: &[Field::Attr("time", "datetime")],
};

#[derive(Debug, Clone, Default)]
pub struct OneFootballScraper;

impl OneFootballScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://onefootball.com";
    const LISTING_URL: &'static str = "https://onefootball.com/en/home";
}

impl Scraper for OneFootballScraper {
    fn source(&self) -> SourceId {
        SourceId::OneFootball
    }

    fn listing_url(&self) -> &str {
        Self::LISTING_URL
    }

    fn base_url(&self) -> &str {
        Self::BASE_URL
    }

    fn extract_listing(&self, html: &str) -> Result<Vec<ArticleStub>> {
        let item_selector = utils::selector("li")?;
        let link_selector = utils::selector("a")?;
        let title_selector = utils::selector("p")?;
        let image_selector = utils::selector("img")?;

        let document = Html::parse_document(html);
        let mut stubs = Vec::new();
        for item in document.select(&item_selector) {
            // The first anchor of a teaser is the publisher badge.
            let Some(link) = item.select(&link_selector).nth(1) else {
                continue;
            };
            let title = link
                .select(&title_selector)
                .next()
                .map(|p| p.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let url = link
                .value()
                .attr("href")
                .and_then(|href| resolve_url(href, Self::BASE_URL));
            let Some(url) = url.filter(|_| !title.is_empty()) else {
                continue;
            };
            let image = utils::attr_of(item, &image_selector, "src");
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

    const LISTING: &str = r#"
        <html><body><ul>
          <li>
            <a href="/en/team/arsenal">Arsenal</a>
            <a href="/en/news/saka-injury-update-401">
              <img src="https://image-service.onefootball.com/saka.jpg">
              <p>Saka injury update</p><p>2 hours ago</p>
            </a>
          </li>
          <li><a href="/en/competition/premier-league">Only one link</a></li>
          <li>
            <a href="/en/team/psg">PSG</a>
            <a href="/en/news/empty"><p>  </p></a>
          </li>
          <li>
            <a href="/en/team/barca">Barcelona</a>
            <a href="https://onefootball.com/en/news/barca-win-402"><p>Barca win</p></a>
          </li>
        </ul></body></html>
    "#;

    #[test]
    fn test_extract_listing_uses_second_anchor() {
        let stubs = OneFootballScraper::new().extract_listing(LISTING).unwrap();
        assert_eq!(stubs.len(), 2);

        assert_eq!(stubs[0].title, "Saka injury update");
        assert_eq!(stubs[0].url, "https://onefootball.com/en/news/saka-injury-update-401");
        assert_eq!(
            stubs[0].image.as_deref(),
            Some("https://image-service.onefootball.com/saka.jpg")
        );

        assert_eq!(stubs[1].title, "Barca win");
        assert!(stubs[1].image.is_none());
    }

    #[test]
    fn test_extract_content_prefers_article_image() {
        let html = r#"
            <html><head>
              <meta property="og:image" content="https://cdn.onefootball.com/og.jpg">
              <meta property="og:description" content="Latest on Saka.">
            </head><body>
              <h1>Saka injury update</h1>
              <img data-testid="ArticleImage" src="https://cdn.onefootball.com/hero.jpg">
              <div class="article-body"><p>Saka trained on Friday.</p></div>
              <time datetime="2024-03-09T18:00:00+01:00">9 March</time>
            </body></html>
        "#;
        let content = OneFootballScraper::new()
            .extract_content(html, "https://onefootball.com/en/news/saka-injury-update-401")
            .unwrap()
            .unwrap();
        assert_eq!(content.title, "Saka injury update");
        assert_eq!(content.image.as_deref(), Some("https://cdn.onefootball.com/hero.jpg"));
        assert_eq!(content.description.as_deref(), Some("Latest on Saka."));
        assert_eq!(content.content.as_deref(), Some("Saka trained on Friday."));
        assert_eq!(
            content.published_at.map(|d| d.to_rfc3339()),
            Some("2024-03-09T17:00:00+00:00".to_string())
        );
    }
}
