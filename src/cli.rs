//! CLI parsing and orchestration. Parses args, resolves links, crawls, and writes one merged file. Maps errors to exit codes.

use crate::config::{self, Config};
use crate::crawler::coordinator::parse_base_url;
use crate::crawler::{
    build_document, load_link_list, resolve_links, CrawlError, CrawlOptions, PageClient,
    PageLayout, Strategy, DEFAULT_BASE_URL, DEFAULT_OUTPUT_STEM, DEFAULT_TIMEOUT_SECS,
};
use crate::formats::{write_document, FormatError, OutputFormat};
use crate::model::LinkEntry;
use clap::Parser;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Crawl(#[from] CrawlError),

    #[error("{0}")]
    Format(#[from] FormatError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Crawl(_) => 2,
            CliRunError::Format(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "booksoup")]
#[command(about = "Download an online documentation book and merge its chapters into one file")]
#[command(
    after_help = "Config file keys (base_url, output_dir, format, concurrency, user_agent, timeout_secs, nav_selector, content_selector) are read from ./booksoup.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// Index (table of contents) page of the book. Default: config base_url, else The Swift Programming Language.
    pub url: Option<String>,

    /// Output path. Default: ./swift.{ext} for the default book, else ./{last-url-segment}.{ext}.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output file kind: html or markdown. Both contain the merged chapter markup.
    #[arg(long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Read chapter URLs from this file (one per line) instead of the index page.
    #[arg(long)]
    pub links: Option<PathBuf>,

    /// Fetch chapters one at a time, in order.
    #[arg(long)]
    pub sequential: bool,

    /// Maximum chapters fetched at once (default: all of them).
    #[arg(short = 'j', long, conflicts_with = "sequential")]
    pub concurrency: Option<usize>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Resolve the chapter list, print it and the output path, and fetch nothing else.
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and verbose error chain.
    #[arg(long)]
    pub verbose: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "html" | "htm" => Ok(OutputFormat::Html),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid --format value: '{}'. Use html or markdown.",
            s
        )),
    }
}

/// Sanitize a name to a safe filename: lowercase, replace spaces/special with `-`.
fn sanitize_title(title: &str) -> String {
    let mut s = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>();
    while s.contains("--") {
        s = s.replace("--", "-");
    }
    s = s.trim_matches('-').to_string();
    if s.is_empty() {
        s = "book".to_string();
    }
    s
}

/// File stem derived from the book URL: `swift` for the default book, otherwise the
/// last non-empty path segment, else the host.
fn default_stem(base_url: &str) -> String {
    if base_url == DEFAULT_BASE_URL {
        return DEFAULT_OUTPUT_STEM.to_string();
    }
    let Ok(url) = parse_base_url(base_url) else {
        return sanitize_title("");
    };
    let segment = url
        .path_segments()
        .and_then(|mut segs| segs.rfind(|s| !s.is_empty()).map(String::from));
    let name = segment
        .map(|s| match s.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
            _ => s,
        })
        .or_else(|| url.host_str().map(String::from))
        .unwrap_or_default();
    sanitize_title(&name)
}

/// Ensure output path parent exists.
fn validate_output_path(path: &Path) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::InvalidInput(format!(
                "Cannot write output: {}: parent directory does not exist.",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Everything a run needs, after merging flags over config over defaults.
#[derive(Debug)]
pub struct Settings {
    pub base_url: String,
    pub format: OutputFormat,
    pub output_path: PathBuf,
    pub strategy: Strategy,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    pub layout: PageLayout,
}

/// Merge CLI flags, then config values, then built-in defaults. Touches no files or network.
pub fn resolve_settings(args: &Args, config: &Config) -> Result<Settings, CliRunError> {
    let base_url = args
        .url
        .clone()
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    parse_base_url(&base_url).map_err(|e| {
        CliRunError::InvalidInput(format!(
            "Expected the book's index page URL, e.g. {}. {}",
            DEFAULT_BASE_URL, e
        ))
    })?;

    let format = match (args.format, config.format.as_deref()) {
        (Some(f), _) => f,
        (None, Some(s)) => parse_format(s).map_err(|e| {
            CliRunError::InvalidInput(format!("Invalid config format: {}", e))
        })?,
        (None, None) => OutputFormat::default(),
    };

    let output_path = match &args.output {
        Some(p) => p.clone(),
        None => {
            let dir = config.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            dir.join(format!("{}.{}", default_stem(&base_url), format.extension()))
        }
    };

    let strategy = if args.sequential {
        Strategy::Sequential
    } else {
        Strategy::Concurrent {
            max_workers: args.concurrency.or(config.concurrency),
        }
    };

    let defaults = PageLayout::default();
    let layout = PageLayout {
        nav_selector: config.nav_selector.clone().unwrap_or(defaults.nav_selector),
        content_selector: config
            .content_selector
            .clone()
            .unwrap_or(defaults.content_selector),
    };

    Ok(Settings {
        base_url,
        format,
        output_path,
        strategy,
        timeout_secs: args
            .timeout
            .or(config.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        user_agent: args.user_agent.clone().or_else(|| config.user_agent.clone()),
        layout,
    })
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config()
        .map_err(CliRunError::InvalidInput)?
        .unwrap_or_default();
    let Settings {
        base_url,
        output_path,
        strategy,
        timeout_secs,
        user_agent,
        layout,
        ..
    } = resolve_settings(args, &config)?;

    let mut builder = PageClient::builder().timeout_secs(timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let links = match &args.links {
        Some(path) => load_link_list(path)?,
        None => resolve_links(&client, &base_url, &layout)?,
    };

    if args.dry_run {
        eprintln!("Chapters: {}", links.len());
        for link in &links {
            eprintln!("  {:>3}. {} ({})", link.index + 1, link.title, link.href);
        }
        eprintln!("Output: {}", output_path.display());
        return Ok(());
    }

    validate_output_path(&output_path)?;

    let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |done: usize, total: usize, link: &LinkEntry| {
        if total == 0 {
            return;
        }
        let mut state = progress_state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(total as u64);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
            {
                bar.set_style(
                    style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                        .progress_chars("█▉▊▋▌▍▎▏ "),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position(done as u64);
        pb.set_message(link.title.clone());
    };
    let progress: Option<&dyn Fn(usize, usize, &LinkEntry)> =
        if args.quiet { None } else { Some(&progress_cb) };

    let options = CrawlOptions {
        base_url: &base_url,
        layout: &layout,
        strategy,
        progress,
    };
    let result = build_document(&client, &links, &options);

    if let Some(pb) = progress_state.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }

    let document = result?;
    write_document(&document, &output_path)?;

    info!("All done");
    if !args.quiet {
        eprintln!("Wrote {}", output_path.display());
    }
    Ok(())
}
