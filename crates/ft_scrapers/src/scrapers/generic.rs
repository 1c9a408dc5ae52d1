use super::{ContentRules, Field};

/// Rules for pages from a source without its own scraper.
pub const GENERIC_RULES: ContentRules = ContentRules {
    title_suffix: "",
    image: &[
        Field::Attr("meta[property=\"og:image\"]", "content"),
        Field::Attr("img", "src"),
    ],
    description: &[
        Field::Attr("meta[name=\"description\"]", "content"),
        Field::Attr("meta[property=\"og:description\"]", "content"),
    ],
    content: "article p, .content p, .post-content p",
    published: &[Field::Attr("time", "datetime")],
};
