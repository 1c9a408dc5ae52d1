use ft_core::text::resolve_url;
use ft_core::{ArticleStub, Result, SourceId};
use regex::Regex;
use scraper::Html;

use super::{utils, ContentRules, Field, Scraper};

const RULES: ContentRules = ContentRules {
    title_suffix: " | Goal.com",
    image: &[
        Field::Attr(".hero-image img", "src"),
        Field::Attr(".article-image img", "src"),
        Field::Attr("meta[property=\"og:image\"]", "content"),
    ],
    description: &[
        Field::Attr("meta[name=\"description\"]", "content"),
        Field::Text(".article-summary"),
    ],
    content: ".article-body p, .entry-content p",
    published: &[Field::Attr("time", "datetime")],
};

/// Image credits and punctuation that leak into teaser headings.
const TITLE_NOISE: &str = r"(?i)^\s+|(Getty|Images|/Goal|[^a-zA-Z0-9\s\-.])";

/// Caption fragments left behind once `TITLE_NOISE` is stripped.
const TITLE_LEFTOVERS: [&str; 2] = ["CC", "IG-leomessiIG-leomessiDear god"];

#[derive(Debug, Clone, Default)]
pub struct GoalScraper;

impl GoalScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://goal.com";
    const LISTING_URL: &'static str = "https://www.goal.com/en-in/news";
}

fn clean_title(noise: &Regex, raw: &str) -> String {
    let mut title = noise.replace_all(raw, "").into_owned();
    for leftover in TITLE_LEFTOVERS {
        title = title.replacen(leftover, "", 1);
    }
    title.trim().to_string()
}

impl Scraper for GoalScraper {
    fn source(&self) -> SourceId {
        SourceId::Goal
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
        let title_selector = utils::selector("h3")?;
        let image_selector = utils::selector("img")?;
        let noise = utils::pattern(TITLE_NOISE)?;

        let document = Html::parse_document(html);
        let mut stubs = Vec::new();
        for item in document.select(&item_selector) {
            let Some(url) = utils::attr_of(item, &link_selector, "href")
                .and_then(|href| resolve_url(&href, Self::BASE_URL))
            else {
                continue;
            };
            if !url.contains("lists") {
                continue;
            }
            let title = clean_title(&noise, &utils::text_of(item, &title_selector));
            if title.is_empty() {
                continue;
            }
            let image = utils::attr_of(item, &image_selector, "src");
            stubs.push(ArticleStub::new(title, url).with_image(image));
        }

        Ok(stubs)
    }

    fn content_rules(&self) -> &ContentRules {
        &RULES
    }
}
