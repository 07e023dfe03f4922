//! Shared error type for the crawler: URL handling, HTTP, page structure, and coordination.

use std::path::PathBuf;
use thiserror::Error;

/// Crawler error for discovery, fetching, cleaning, and collation.
#[derive(Debug, Error)]
pub enum CrawlError {
    // Input
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Cannot read link list {path}: {source}")]
    LinkList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    // HTTP and network
    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Page structure
    #[error("Navigation container {selector:?} not found on the index page (page structure may have changed).")]
    NavigationNotFound { selector: String },

    #[error("Content region {selector:?} not found on the page.")]
    ContentNotFound { selector: String },

    /// One chapter failed; carries the link that failed and the underlying stage error.
    #[error("Chapter {} ({url}): {source}", .index + 1)]
    Page {
        index: usize,
        url: String,
        #[source]
        source: Box<CrawlError>,
    },

    // Coordination
    #[error("Chapter index {index} is outside the expected range 0..{expected}.")]
    UnexpectedIndex { index: usize, expected: usize },

    #[error("Chapter index {index} was produced twice.")]
    DuplicateResult { index: usize },

    #[error("Only {received} of {expected} chapters completed.")]
    IncompleteResults { received: usize, expected: usize },

    #[error("{count} crawl worker(s) panicked.")]
    WorkerPanicked { count: usize },
}

impl CrawlError {
    /// Index of the failing link, if this error is tied to one.
    pub fn link_index(&self) -> Option<usize> {
        match self {
            CrawlError::Page { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_error_reports_one_based_chapter_and_url() {
        let err = CrawlError::Page {
            index: 4,
            url: "https://example.com/book/ch5.html".to_string(),
            source: Box::new(CrawlError::HttpStatus {
                status: 404,
                url: "https://example.com/book/ch5.html".to_string(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Chapter 5 (https://example.com/book/ch5.html)"));
        assert!(msg.contains("HTTP 404"));
        assert_eq!(err.link_index(), Some(4));
    }

    #[test]
    fn link_index_absent_for_discovery_errors() {
        let err = CrawlError::NavigationNotFound {
            selector: "nav.toc".to_string(),
        };
        assert_eq!(err.link_index(), None);
    }
}
