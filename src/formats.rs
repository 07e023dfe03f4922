//! Single-file output. The merged document is written verbatim; the format only picks the file name.

use crate::model::Document;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Output format selector for the CLI. Both hold the raw concatenated markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Html,
    Markdown,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "md",
        }
    }
}

/// Errors from the document writer.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Create or truncate `path` and write the whole document in one go.
pub fn write_document(document: &Document, path: &Path) -> Result<(), FormatError> {
    let io_err = |e: std::io::Error| FormatError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    let mut f = File::create(path).map_err(io_err)?;
    f.write_all(document.as_bytes()).map_err(io_err)?;
    f.flush().map_err(io_err)?;
    info!("Wrote {} bytes to {}", document.len(), path.display());
    Ok(())
}
