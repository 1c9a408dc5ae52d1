//! Text and URL normalisation shared by the extractors and the stores.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use url::Url;

/// Maximum length, in characters, of any cleaned text field.
pub const MAX_TEXT_LEN: usize = 10_000;

const WORDS_PER_MINUTE: u32 = 200;

/// Collapses every whitespace run, newlines included, to a single space,
/// trims, and caps the result at [`MAX_TEXT_LEN`] characters.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, MAX_TEXT_LEN)
}

/// Like [`clean_text`] but maps an empty result to `None`.
pub fn clean_optional(text: Option<&str>) -> Option<String> {
    text.map(clean_text).filter(|t| !t.is_empty())
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub fn is_http_url(candidate: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        candidate.len() > scheme.len()
            && candidate
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Makes `link` absolute. Anything not already starting with `http` is joined
/// against the origin of `page_url`.
pub fn resolve_url(link: &str, page_url: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    if link.starts_with("http") {
        return Some(link.to_string());
    }
    let page = Url::parse(page_url).ok()?;
    let origin = Url::parse(&page.origin().ascii_serialization()).ok()?;
    origin.join(link).ok().map(|u| u.to_string())
}

/// Parses a published date as found in article markup. Returns `None` for
/// anything that is not a valid calendar date/time.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in ["%Y-%m-%d", "%d %B %Y", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

pub fn word_count(content: Option<&str>) -> u32 {
    content
        .map(|c| c.split_whitespace().count() as u32)
        .unwrap_or(0)
}

/// Minutes of reading at 200 words per minute, rounded up.
pub fn reading_time(word_count: u32) -> u32 {
    word_count.div_ceil(WORDS_PER_MINUTE)
}
