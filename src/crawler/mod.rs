//! Book crawling: link discovery, page fetching and cleaning, and crawl coordination.

mod client;
mod error;

pub mod clean;
pub mod coordinator;
pub mod discover;

pub use clean::clean_page;
pub use client::{Fetch, PageClient, PageClientBuilder, DEFAULT_TIMEOUT_SECS};
pub use coordinator::{Coordinator, Strategy};
pub use discover::{discover_links, load_link_list, parse_link_list, resolve_links};
pub use error::CrawlError;

use crate::model::{Document, LinkEntry};
use scraper::Selector;
use tracing::info;

/// Table of contents for The Swift Programming Language.
pub const DEFAULT_BASE_URL: &str = "https://developer.apple.com/library/prerelease/ios/documentation/Swift/Conceptual/Swift_Programming_Language/";
/// Output file stem for the default book.
pub const DEFAULT_OUTPUT_STEM: &str = "swift";
pub const DEFAULT_NAV_SELECTOR: &str = "nav.book-parts.hideInXcode";
pub const DEFAULT_CONTENT_SELECTOR: &str = "article.chapter";

/// Where the chapter list and the chapter content live in the book's markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// Container on the index page whose anchors are the chapters.
    pub nav_selector: String,
    /// Content region kept from each chapter page.
    pub content_selector: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            nav_selector: DEFAULT_NAV_SELECTOR.to_string(),
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
        }
    }
}

/// Parse a CSS selector or return a selector error (avoids panics from Selector::parse).
pub(crate) fn parse_selector(sel: &str) -> Result<Selector, CrawlError> {
    Selector::parse(sel).map_err(|e| CrawlError::InvalidSelector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Options for turning a link list into one document.
pub struct CrawlOptions<'a> {
    pub base_url: &'a str,
    pub layout: &'a PageLayout,
    pub strategy: Strategy,
    pub progress: Option<coordinator::ProgressFn<'a>>,
}

/// Crawl every link with the chosen strategy and merge the pages in link order.
pub fn build_document<F: Fetch>(
    fetcher: &F,
    links: &[LinkEntry],
    options: &CrawlOptions<'_>,
) -> Result<Document, CrawlError> {
    let mut coordinator = Coordinator::new(fetcher, options.base_url, options.layout)?;
    if let Some(p) = options.progress {
        coordinator = coordinator.with_progress(p);
    }
    let results = coordinator.crawl(links, options.strategy)?;
    let document = Document::collate(results)?;
    info!(
        "Collated {} chapters ({} bytes)",
        links.len(),
        document.len()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::coordinator::tests::{book, chapter_html, FakeFetcher, BASE};
    use super::*;

    #[test]
    fn parse_selector_rejects_garbage() {
        assert!(matches!(
            parse_selector("div[["),
            Err(CrawlError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn default_layout_matches_book_markup() {
        let layout = PageLayout::default();
        assert_eq!(layout.nav_selector, "nav.book-parts.hideInXcode");
        assert_eq!(layout.content_selector, "article.chapter");
    }

    #[test]
    fn index_page_to_document() -> Result<(), CrawlError> {
        let index = r#"<html><body><nav class="book-parts hideInXcode">
            <a href="ch0.html">Zero</a><a href="ch1.html">One</a><a href="ch2.html">Two</a>
            </nav></body></html>"#;
        let fetcher = book(&[20, 0, 10]).page(BASE, index, 0);
        let layout = PageLayout::default();
        let links = resolve_links(&fetcher, BASE, &layout)?;
        assert_eq!(links.len(), 3);
        let options = CrawlOptions {
            base_url: BASE,
            layout: &layout,
            strategy: Strategy::default(),
            progress: None,
        };
        let doc = build_document(&fetcher, &links, &options)?;
        let first = doc.as_str().find("Chapter 0").unwrap();
        let second = doc.as_str().find("Chapter 1").unwrap();
        let third = doc.as_str().find("Chapter 2").unwrap();
        assert!(first < second && second < third);
        assert!(!doc.as_str().contains("next_previous"));
        Ok(())
    }

    #[test]
    fn link_list_with_absolute_urls() -> Result<(), CrawlError> {
        let fetcher = FakeFetcher::default()
            .page("https://mirror.example.org/a.html", &chapter_html(7), 0)
            .page("https://mirror.example.org/b.html", &chapter_html(8), 0);
        let links =
            parse_link_list("https://mirror.example.org/a.html\nhttps://mirror.example.org/b.html\n");
        let layout = PageLayout::default();
        let options = CrawlOptions {
            base_url: BASE,
            layout: &layout,
            strategy: Strategy::Sequential,
            progress: None,
        };
        let doc = build_document(&fetcher, &links, &options)?;
        assert!(doc.as_str().starts_with("<article class=\"chapter\"><h1>Chapter 7</h1>"));
        assert!(doc.as_str().contains("<h1>Chapter 8</h1>"));
        Ok(())
    }

    #[test]
    fn missing_index_nav_fails_before_any_chapter() {
        let fetcher = FakeFetcher::default().page(BASE, "<html><body></body></html>", 0);
        assert!(matches!(
            resolve_links(&fetcher, BASE, &PageLayout::default()),
            Err(CrawlError::NavigationNotFound { .. })
        ));
    }
}
