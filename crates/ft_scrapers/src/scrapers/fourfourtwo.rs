use ft_core::text::resolve_url;
use ft_core::{ArticleStub, Result, SourceId};
use scraper::Html;

use super::{utils, ContentRules, Field, Scraper};

const RULES: ContentRules = ContentRules {
    title_suffix: " | FourFourTwo",
    image: &[
        Field::Attr(".hero-image img", "src"),
        Field::Attr(".article-hero img", "src"),
        Field::Attr(".lead-image img", "src"),
        Field::Attr("meta[property=\"og:image\"]", "content"),
    ],
    description: &[
        Field::Attr("meta[name=\"description\"]", "content"),
        Field::Text(".standfirst"),
        Field::Text(".synopsis"),
    ],
    content: ".article-body p, .text p",
    published: &[
        Field::Attr("time", "datetime"),
        Field::Text(".publish-date"),
    ],
};

const BASE_URL: &str = "https://www.fourfourtwo.com";

/// Section labels that prefix teaser synopses. Each league page strips the
/// first `noise` entries.
const SYNOPSIS_LABELS: [&str; 4] = [r"^La Liga\n", r"IN THE MAG\n", r"HOW TO WATCH\n", r"EXCLUSIVE\n"];

/// One FourFourTwo league section. All four share markup and differ only in
/// listing page and synopsis cleanup.
#[derive(Debug, Clone)]
pub struct FourFourTwoScraper {
    source: SourceId,
    listing_url: &'static str,
    noise: usize,
}

impl FourFourTwoScraper {
    pub fn epl() -> Self {
        Self {
            source: SourceId::FourFourTwoEpl,
            listing_url: "https://www.fourfourtwo.com/premier-league",
            noise: 0,
        }
    }

    pub fn laliga() -> Self {
        Self {
            source: SourceId::FourFourTwoLaLiga,
            listing_url: "https://www.fourfourtwo.com/la-liga",
            noise: 2,
        }
    }

    pub fn ucl() -> Self {
        Self {
            source: SourceId::FourFourTwoUcl,
            listing_url: "https://www.fourfourtwo.com/champions-league",
            noise: 3,
        }
    }

    pub fn bundesliga() -> Self {
        Self {
            source: SourceId::FourFourTwoBundesliga,
            listing_url: "https://www.fourfourtwo.com/bundesliga",
            noise: 4,
        }
    }

    fn clean_synopsis(&self, raw: &str) -> Result<Option<String>> {
        let trimmed = raw.trim();
        let cleaned = if self.noise == 0 {
            trimmed.to_string()
        } else {
            let labels = utils::pattern(&SYNOPSIS_LABELS[..self.noise].join("|"))?;
            labels.replace_all(trimmed, "").into_owned()
        };
        Ok(Some(cleaned).filter(|s| !s.is_empty()))
    }
}

impl Scraper for FourFourTwoScraper {
    fn source(&self) -> SourceId {
        self.source
    }

    fn listing_url(&self) -> &str {
        self.listing_url
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }

    fn extract_listing(&self, html: &str) -> Result<Vec<ArticleStub>> {
        let item_selector = utils::selector(".small")?;
        let link_selector = utils::selector("a")?;
        let title_selector = utils::selector("h3.article-name")?;
        let image_selector = utils::selector("img")?;
        let synopsis_selector = utils::selector("p.synopsis")?;

        let document = Html::parse_document(html);
        let mut stubs = Vec::new();
        for item in document.select(&item_selector) {
            let Some(url) = utils::attr_of(item, &link_selector, "href")
                .and_then(|href| resolve_url(&href, BASE_URL))
            else {
                continue;
            };
            let title = utils::text_of(item, &title_selector).trim().to_string();
            if title.is_empty() {
                continue;
            }
            // data-srcset is "<url> <width>w, ..."; the first URL is enough.
            let image = utils::attr_of(item, &image_selector, "data-srcset")
                .and_then(|srcset| srcset.split_whitespace().next().map(str::to_string));
            let synopsis = self.clean_synopsis(&utils::text_of(item, &synopsis_selector))?;

            stubs.push(
                ArticleStub::new(title, url)
                    .with_image(image)
                    .with_short_description(synopsis),
            );
        }

        Ok(stubs)
    }

    fn content_rules(&self) -> &ContentRules {
        &RULES
    }
}
