//! Chapter link discovery: from the book's index page, or from a flat link-list file.

use crate::crawler::client::Fetch;
use crate::crawler::error::CrawlError;
use crate::crawler::{parse_selector, PageLayout};
use crate::model::LinkEntry;
use scraper::Html;
use std::path::Path;
use tracing::{debug, info};

/// Extract the ordered chapter links from the index page's navigation container.
///
/// Only anchors with an `href` inside the first matching container count; the
/// index of each entry is its position in document order.
pub fn discover_links(html: &str, layout: &PageLayout) -> Result<Vec<LinkEntry>, CrawlError> {
    let doc = Html::parse_document(html);
    let nav_sel = parse_selector(&layout.nav_selector)?;
    let anchor_sel = parse_selector("a")?;

    let nav = doc
        .select(&nav_sel)
        .next()
        .ok_or_else(|| CrawlError::NavigationNotFound {
            selector: layout.nav_selector.clone(),
        })?;

    let links: Vec<LinkEntry> = nav
        .select(&anchor_sel)
        .filter_map(|a| a.value().attr("href").map(|href| (href, a)))
        .enumerate()
        .map(|(index, (href, a))| LinkEntry {
            index,
            href: href.to_string(),
            title: a.text().collect::<String>().trim().to_string(),
        })
        .collect();
    debug!("Discovered {} chapter links", links.len());
    Ok(links)
}

/// Fetch the index page at `base_url` and discover its chapter links.
pub fn resolve_links<F: Fetch>(
    fetcher: &F,
    base_url: &str,
    layout: &PageLayout,
) -> Result<Vec<LinkEntry>, CrawlError> {
    info!("Reading table of contents from {}", base_url);
    let html = fetcher.fetch(base_url)?;
    discover_links(&html, layout)
}

/// One URL per line. Blank lines and `#` comments are skipped; the title is the URL itself.
pub fn parse_link_list(text: &str) -> Vec<LinkEntry> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .enumerate()
        .map(|(index, url)| LinkEntry {
            index,
            href: url.to_string(),
            title: url.to_string(),
        })
        .collect()
}

/// Read and parse a link-list file.
pub fn load_link_list(path: &Path) -> Result<Vec<LinkEntry>, CrawlError> {
    let text = std::fs::read_to_string(path).map_err(|e| CrawlError::LinkList {
        path: path.to_path_buf(),
        source: e,
    })?;
    let links = parse_link_list(&text);
    info!("Loaded {} links from {}", links.len(), path.display());
    Ok(links)
}
