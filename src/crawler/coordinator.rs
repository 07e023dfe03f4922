//! Crawl coordination: fetch and clean every link, concurrently or one at a time.
//!
//! Concurrent crawls use scoped worker threads that claim link indices from a
//! shared counter and send each outcome over a channel to the calling thread,
//! which alone owns the [`ResultSet`]. The crawl is finished when every worker
//! has exited (the channel closes) and has been joined.

use crate::crawler::clean::clean_page;
use crate::crawler::client::Fetch;
use crate::crawler::error::CrawlError;
use crate::crawler::PageLayout;
use crate::model::{LinkEntry, PageResult, ResultSet};
use reqwest::Url;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, error, info};

/// How the coordinator schedules page work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// All links in flight at once, or at most `max_workers` when set.
    Concurrent { max_workers: Option<usize> },
    /// One link after another, in order.
    Sequential,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Concurrent { max_workers: None }
    }
}

/// Called on the collecting thread after each page: (pages done, total, link).
pub type ProgressFn<'a> = &'a dyn Fn(usize, usize, &LinkEntry);

/// Owns the state of one crawl. Build one per run; nothing outlives it.
pub struct Coordinator<'a, F: Fetch> {
    fetcher: &'a F,
    base: Url,
    layout: &'a PageLayout,
    progress: Option<ProgressFn<'a>>,
}

impl<'a, F: Fetch> Coordinator<'a, F> {
    pub fn new(fetcher: &'a F, base_url: &str, layout: &'a PageLayout) -> Result<Self, CrawlError> {
        Ok(Self {
            fetcher,
            base: parse_base_url(base_url)?,
            layout,
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Fetch and clean every link. Returns a complete result set or the failure
    /// of the lowest-indexed link that failed.
    pub fn crawl(&self, links: &[LinkEntry], strategy: Strategy) -> Result<ResultSet, CrawlError> {
        info!("Crawling {} chapters ({:?})", links.len(), strategy);
        match strategy {
            Strategy::Sequential => self.crawl_sequential(links),
            Strategy::Concurrent { max_workers } => self.crawl_concurrent(links, max_workers),
        }
    }

    fn crawl_sequential(&self, links: &[LinkEntry]) -> Result<ResultSet, CrawlError> {
        let total = links.len();
        let mut results = ResultSet::new(total);
        for (done, link) in links.iter().enumerate() {
            let page = fetch_and_clean(self.fetcher, &self.base, self.layout, link)?;
            results.insert(page)?;
            self.report(done + 1, total, link);
        }
        Ok(results)
    }

    fn crawl_concurrent(
        &self,
        links: &[LinkEntry],
        max_workers: Option<usize>,
    ) -> Result<ResultSet, CrawlError> {
        let total = links.len();
        let mut results = ResultSet::new(total);
        if total == 0 {
            return Ok(results);
        }

        let workers = max_workers.unwrap_or(total).clamp(1, total);
        debug!("Starting {} workers for {} links", workers, total);

        let next = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel::<(usize, Result<PageResult, CrawlError>)>();
        let fetcher = self.fetcher;
        let base = &self.base;
        let layout = self.layout;

        let mut failures: Vec<CrawlError> = Vec::new();
        let mut panicked = 0usize;

        thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let tx = tx.clone();
                    let next = &next;
                    let abort = &abort;
                    s.spawn(move || loop {
                        if abort.load(Ordering::Acquire) {
                            break;
                        }
                        let i = next.fetch_add(1, Ordering::Relaxed);
                        let Some(link) = links.get(i) else {
                            break;
                        };
                        let outcome = fetch_and_clean(fetcher, base, layout, link);
                        if outcome.is_err() {
                            abort.store(true, Ordering::Release);
                        }
                        if tx.send((i, outcome)).is_err() {
                            break;
                        }
                    })
                })
                .collect();
            // Workers hold the only senders now; the loop below ends when they all exit.
            drop(tx);

            let mut done = 0usize;
            for (i, outcome) in rx.iter() {
                match outcome.and_then(|page| results.insert(page)) {
                    Ok(()) => {
                        done += 1;
                        self.report(done, total, &links[i]);
                    }
                    Err(e) => {
                        abort.store(true, Ordering::Release);
                        error!("{}", e);
                        failures.push(e);
                    }
                }
            }

            for handle in handles {
                if handle.join().is_err() {
                    panicked += 1;
                }
            }
        });

        if !failures.is_empty() {
            failures.sort_by_key(|e| e.link_index().unwrap_or(usize::MAX));
            return Err(failures.swap_remove(0));
        }
        if panicked > 0 {
            return Err(CrawlError::WorkerPanicked { count: panicked });
        }
        if !results.is_complete() {
            return Err(CrawlError::IncompleteResults {
                received: results.len(),
                expected: total,
            });
        }
        Ok(results)
    }

    fn report(&self, done: usize, total: usize, link: &LinkEntry) {
        debug!("{} {}", link.index + 1, link.title);
        if let Some(p) = self.progress {
            p(done, total, link);
        }
    }
}

/// Parse and validate the book's base URL.
pub fn parse_base_url(input: &str) -> Result<Url, CrawlError> {
    Url::parse(input).map_err(|e| CrawlError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve `href` against the base URL. Absolute links are returned unchanged.
pub fn chapter_url(base: &Url, href: &str) -> Result<Url, CrawlError> {
    base.join(href).map_err(|e| CrawlError::InvalidUrl {
        input: href.to_string(),
        reason: e.to_string(),
    })
}

/// One unit of work. Any failure is tagged with the link it belongs to.
fn fetch_and_clean<F: Fetch>(
    fetcher: &F,
    base: &Url,
    layout: &PageLayout,
    link: &LinkEntry,
) -> Result<PageResult, CrawlError> {
    let tag = |url: &str, source: CrawlError| CrawlError::Page {
        index: link.index,
        url: url.to_string(),
        source: Box::new(source),
    };
    let url = chapter_url(base, &link.href).map_err(|e| tag(&link.href, e))?;
    let html = fetcher.fetch(url.as_str()).map_err(|e| tag(url.as_str(), e))?;
    let content = clean_page(&html, layout).map_err(|e| tag(url.as_str(), e))?;
    Ok(PageResult {
        index: link.index,
        content,
    })
}
