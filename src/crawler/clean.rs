//! Chapter page cleaning: cut out the article, drop the next/previous block, shift headings up a level.

use crate::crawler::error::CrawlError;
use crate::crawler::{parse_selector, PageLayout};
use regex::{Captures, Regex};
use scraper::Html;
use std::sync::LazyLock;

/// `<section class="" id="next_previous">...</section>`, shortest match, across lines.
static NAV_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<section\sclass=""\sid="next_previous">.+?</section>"#)
        .expect("next/previous pattern is valid")
});

/// Opening or closing h2/h3 tag.
static HEADING_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)h([23])\b").expect("heading pattern is valid"));

/// Turn a raw chapter page into the fragment that goes into the merged document.
pub fn clean_page(html: &str, layout: &PageLayout) -> Result<String, CrawlError> {
    let article = extract_content(html, layout)?;
    let stripped = strip_navigation(&article);
    Ok(remap_headings(&stripped))
}

/// Outer markup of the first element matching the layout's content selector.
pub fn extract_content(html: &str, layout: &PageLayout) -> Result<String, CrawlError> {
    let doc = Html::parse_document(html);
    let sel = parse_selector(&layout.content_selector)?;
    doc.select(&sel)
        .next()
        .map(|el| el.html())
        .ok_or_else(|| CrawlError::ContentNotFound {
            selector: layout.content_selector.clone(),
        })
}

/// Remove every next/previous navigation block; all other bytes are kept as-is.
pub fn strip_navigation(markup: &str) -> String {
    NAV_BLOCK_RE.replace_all(markup, "").into_owned()
}

/// h2 becomes h1 and h3 becomes h2, decided per original tag in a single pass.
pub fn remap_headings(markup: &str) -> String {
    HEADING_TAG_RE
        .replace_all(markup, |caps: &Captures| {
            let level = if &caps[2] == "2" { "1" } else { "2" };
            format!("<{}h{}", &caps[1], level)
        })
        .into_owned()
}
