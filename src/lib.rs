//! booksoup: download an online documentation book and merge its cleaned chapters into one file.

pub mod cli;
pub mod config;
pub mod crawler;
pub mod formats;
pub mod model;

// Re-exports for CLI and consumers.
pub use crawler::{
    build_document, clean_page, discover_links, CrawlError, CrawlOptions, Coordinator, Fetch,
    PageClient, PageClientBuilder, PageLayout, Strategy,
};
pub use formats::{write_document, FormatError, OutputFormat};
pub use model::{Document, LinkEntry, PageResult, ResultSet};
