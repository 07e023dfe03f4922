//! Data model for one crawl: discovered links, per-page results, and the merged document.
//!
//! Everything here is created once and never updated; the crawl is a single pass
//! from links to results to one document.

use crate::crawler::CrawlError;
use std::collections::BTreeMap;

/// One chapter link in table-of-contents order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// 0-based position; defines the order of the final document.
    pub index: usize,
    /// Link target, relative to the book's base URL or absolute.
    pub href: String,
    /// Visible link text.
    pub title: String,
}

/// Cleaned markup for one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub index: usize,
    pub content: String,
}

/// Index-keyed results awaiting collation. Holds at most one result per index.
#[derive(Debug, Default)]
pub struct ResultSet {
    expected: usize,
    pages: BTreeMap<usize, PageResult>,
}

impl ResultSet {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            pages: BTreeMap::new(),
        }
    }

    /// Record a page. Rejects indices outside `0..expected` and repeats.
    pub fn insert(&mut self, page: PageResult) -> Result<(), CrawlError> {
        if page.index >= self.expected {
            return Err(CrawlError::UnexpectedIndex {
                index: page.index,
                expected: self.expected,
            });
        }
        if self.pages.contains_key(&page.index) {
            return Err(CrawlError::DuplicateResult { index: page.index });
        }
        self.pages.insert(page.index, page);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn is_complete(&self) -> bool {
        self.pages.len() == self.expected
    }
}

/// Cleaned fragments in index order, ready to be written as one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    body: String,
}

impl Document {
    /// Merge a complete result set. Order comes from the index alone.
    pub fn collate(results: ResultSet) -> Result<Self, CrawlError> {
        if !results.is_complete() {
            return Err(CrawlError::IncompleteResults {
                received: results.len(),
                expected: results.expected(),
            });
        }
        let capacity = results.pages.values().map(|p| p.content.len()).sum();
        let mut body = String::with_capacity(capacity);
        for page in results.pages.into_values() {
            body.push_str(&page.content);
        }
        Ok(Self { body })
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
